//! Terminal output helpers
//!
//! Colors and symbols only when stdout is a terminal; plain bracketed
//! markers otherwise, so scripted callers get stable output.

mod context;
mod output;

pub use context::UiContext;
pub use output::{section, step_error_detail, step_ok_detail, step_warn_hint};
