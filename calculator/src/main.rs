//! iStore Installment Calculator CLI
//!
//! Prints installment tables and administers the shared rate table and logo.

use calculator::app::admin::{self, StatusMessage};
use calculator::app::App;
use calculator::core::config::Settings;
use calculator::core::error::{AppError, Result};
use calculator::debug::LogConfig;
use calculator::services::database::Database;
use calculator::ui;
use calculator::AppEvent;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

/// Installment calculator with shared, admin-editable interest rates
#[derive(Parser, Debug)]
#[command(name = "calculator", version)]
#[command(about = "Installment calculator with shared interest rates", long_about = None)]
struct Cli {
    /// Ignore the configured backend and use cached values only
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the installment table for a product value (e.g. 1.299,90)
    Calc {
        product: String,
        /// Down payment (cash, Pix or trade-in)
        #[arg(long, default_value = "")]
        down: String,
    },
    /// Print the table and reprint it whenever rates change remotely
    Watch {
        product: String,
        #[arg(long, default_value = "")]
        down: String,
    },
    /// Show backend connectivity, session and logo
    Status,
    /// Sign in as the store admin
    Login {
        email: String,
        #[arg(long, env = "ISTORE_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Sign out
    Logout,
    /// Admin operations (requires login)
    #[command(subcommand)]
    Admin(AdminCommand),
}

#[derive(Subcommand, Debug)]
enum AdminCommand {
    /// Show every rate slot (blank = 0%)
    Rates,
    /// Edit rates and save, e.g. `set-rate 3=4,5 12=11 7=`
    SetRate {
        #[arg(required = true)]
        edits: Vec<String>,
    },
    /// Store logo
    #[command(subcommand)]
    Logo(LogoCommand),
    /// Change the admin password
    Password { new_password: String },
}

#[derive(Subcommand, Debug)]
enum LogoCommand {
    /// Upload an image file as the store logo
    Set { file: PathBuf },
    /// Remove the custom logo
    Remove,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let _log_guard = calculator::debug::init(&LogConfig::from_env());

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let mut settings = Settings::from_env().map_err(AppError::Validation)?;
    settings.validate().map_err(AppError::Validation)?;
    if cli.offline {
        settings = settings.offline();
    }

    let db = Arc::new(Database::from_settings(&settings)?);
    let app = App::new(db);

    match cli.command {
        Command::Calc { product, down } => {
            app.sync().await;
            let plan = app.set_inputs(&product, &down)?;
            print!("{}", ui::render_plan(&plan));
            Ok(ExitCode::SUCCESS)
        }
        Command::Watch { product, down } => watch(&app, &product, &down).await,
        Command::Status => {
            app.sync().await;
            let user = app.database().authenticated_user().await;
            app.state.write().admin.user = user;
            print!("{}", ui::render_overview(&app.state.read()));
            Ok(ExitCode::SUCCESS)
        }
        Command::Login { email, password } => match app.login(&email, &password).await {
            Ok(user) => {
                println!("Signed in as {}", user.email.unwrap_or(user.id));
                Ok(ExitCode::SUCCESS)
            }
            Err(AppError::Auth(detail)) => {
                tracing::warn!(error = %detail, "Login rejected");
                eprintln!("{}", admin::LOGIN_FAILURE);
                Ok(ExitCode::FAILURE)
            }
            Err(e) => Err(e),
        },
        Command::Logout => {
            app.logout().await;
            println!("Signed out");
            Ok(ExitCode::SUCCESS)
        }
        Command::Admin(command) => {
            app.open_admin().await?;
            run_admin(&app, command).await
        }
    }
}

async fn run_admin(app: &App, command: AdminCommand) -> Result<ExitCode> {
    let message = match command {
        AdminCommand::Rates => {
            app.sync().await;
            let state = app.state.read();
            println!("{}", state.connection_label());
            print!("{}", ui::render_rates(&state.rates));
            return Ok(ExitCode::SUCCESS);
        }
        AdminCommand::SetRate { edits } => {
            let edits = edits
                .iter()
                .map(|edit| admin::parse_rate_edit(edit))
                .collect::<Result<Vec<_>>>()?;
            app.sync().await;
            app.save_rates(&edits).await?
        }
        AdminCommand::Logo(LogoCommand::Set { file }) => app.set_logo(&file).await?,
        AdminCommand::Logo(LogoCommand::Remove) => app.remove_logo().await?,
        AdminCommand::Password { new_password } => app.change_password(&new_password).await?,
    };

    Ok(report(&message))
}

fn report(message: &StatusMessage) -> ExitCode {
    if message.is_error {
        eprintln!("{}", ui::render_status(message));
        ExitCode::FAILURE
    } else {
        println!("{}", ui::render_status(message));
        ExitCode::SUCCESS
    }
}

async fn watch(app: &App, product: &str, down: &str) -> Result<ExitCode> {
    app.sync().await;
    let plan = app.set_inputs(product, down)?;
    print!("{}", ui::render_plan(&plan));

    if !app.start_realtime() {
        eprintln!("Realtime unavailable (offline); showing cached rates only.");
        return Ok(ExitCode::SUCCESS);
    }

    loop {
        tokio::select! {
            event = app.next_event() => {
                let Some(event) = event else { break };
                let refresh = matches!(event, AppEvent::RemoteUpdate(_));
                let closed = matches!(event, AppEvent::RealtimeClosed);
                app.handle_event(event);

                if refresh {
                    if let Some(plan) = app.current_plan() {
                        println!();
                        print!("{}", ui::render_plan(&plan));
                    }
                }
                if closed {
                    eprintln!("Realtime connection lost; last table is still valid.");
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Watch interrupted");
                break;
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
