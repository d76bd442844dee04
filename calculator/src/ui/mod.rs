//! # Text Rendering
//!
//! Plain-text views printed by the command line. Functions return `String`s
//! so they can be tested without capturing stdout.
//!
//! - [`table`]: installment table, rate slots, status banners

pub mod table;

pub use table::{render_overview, render_plan, render_rates, render_status};
