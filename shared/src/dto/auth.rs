use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Password grant request (`POST /auth/v1/token?grant_type=password`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PasswordGrantRequest {
    pub email: String,
    pub password: String,
}

/// Refresh grant request (`POST /auth/v1/token?grant_type=refresh_token`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RefreshGrantRequest {
    pub refresh_token: String,
}

/// User update request (`PUT /auth/v1/user`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateUserRequest {
    pub password: String,
}

/// Authenticated user (public, safe to cache locally)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthUser {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// Signed-in session returned by the token endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Lifetime in seconds at issue time
    #[serde(default)]
    pub expires_in: i64,
    /// Unix timestamp (seconds) after which the access token is rejected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    pub refresh_token: String,
    pub user: AuthUser,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// Seconds before `expires_at` at which a session is already treated as expired.
const EXPIRY_MARGIN_SECS: i64 = 10;

impl Session {
    /// Fill in `expires_at` from `expires_in` when the backend omitted it.
    pub fn stamped(mut self, now: DateTime<Utc>) -> Self {
        if self.expires_at.is_none() && self.expires_in > 0 {
            self.expires_at = Some(now.timestamp() + self.expires_in);
        }
        self
    }

    /// Whether the access token should be refreshed before use.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(at) => now.timestamp() >= at - EXPIRY_MARGIN_SECS,
            None => false,
        }
    }
}

/// Error body returned by the backend.
///
/// The REST layer uses `message`, the auth layer uses `msg` or the OAuth-style
/// `error`/`error_description` pair depending on the endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
}

impl ErrorResponse {
    /// Most specific human-readable message, if any.
    pub fn describe(&self) -> Option<String> {
        self.message
            .clone()
            .or_else(|| self.msg.clone())
            .or_else(|| self.error_description.clone())
            .or_else(|| self.error.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn session(expires_at: Option<i64>, expires_in: i64) -> Session {
        Session {
            access_token: "access".to_string(),
            token_type: "bearer".to_string(),
            expires_in,
            expires_at,
            refresh_token: "refresh".to_string(),
            user: AuthUser {
                id: "u1".to_string(),
                email: Some("admin@store.com".to_string()),
                role: None,
            },
        }
    }

    #[test]
    fn test_session_from_token_response() {
        let session: Session = serde_json::from_value(json!({
            "access_token": "jwt",
            "token_type": "bearer",
            "expires_in": 3600,
            "expires_at": 1_700_003_600,
            "refresh_token": "r1",
            "user": {"id": "abc", "email": "admin@store.com", "aud": "authenticated"}
        }))
        .unwrap();
        assert_eq!(session.access_token, "jwt");
        assert_eq!(session.expires_at, Some(1_700_003_600));
        assert_eq!(session.user.email.as_deref(), Some("admin@store.com"));
    }

    #[test]
    fn test_session_expiry() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        assert!(!session(Some(1_700_000_100), 0).is_expired(now));
        assert!(session(Some(1_700_000_005), 0).is_expired(now));
        assert!(session(Some(1_699_999_000), 0).is_expired(now));
        assert!(!session(None, 0).is_expired(now));
    }

    #[test]
    fn test_stamped_uses_expires_in() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let stamped = session(None, 3600).stamped(now);
        assert_eq!(stamped.expires_at, Some(1_700_003_600));
        // Backend value wins
        let kept = session(Some(5), 3600).stamped(now);
        assert_eq!(kept.expires_at, Some(5));
    }

    #[test]
    fn test_error_response_describe() {
        let rest: ErrorResponse =
            serde_json::from_value(json!({"message": "permission denied", "code": "42501"})).unwrap();
        assert_eq!(rest.describe().as_deref(), Some("permission denied"));

        let auth: ErrorResponse = serde_json::from_value(json!({
            "error": "invalid_grant",
            "error_description": "Invalid login credentials"
        }))
        .unwrap();
        assert_eq!(auth.describe().as_deref(), Some("Invalid login credentials"));

        assert_eq!(ErrorResponse::default().describe(), None);
    }
}
