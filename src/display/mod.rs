//! Terminal display and formatting utilities.
//!
//! Handles colorized JSON output and token status rendering for
//! human-readable terminal output.

pub mod json_printer;
pub mod token_status;
