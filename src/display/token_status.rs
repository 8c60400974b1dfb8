//! Token status display for temporal claims.
//!
//! Renders human-readable status information for a validated token's
//! temporal claims (`exp`, `iat`, `nbf`) including expiry status with
//! color coding.

use chrono::{DateTime, Utc};
use colored::Colorize;

use jwt_mint::Claims;
use jwt_mint::core::claims::{EXPIRATION, ISSUED_AT, NOT_BEFORE, NumericDate};

/// Display the temporal status of validated claims as of `now`.
///
/// - Expired tokens: red "EXPIRED (X ago)"
/// - Valid tokens: green "VALID (expires in X)"
/// - Issued-at and not-before instants when present
pub fn display_token_status(claims: &Claims, now: DateTime<Utc>) {
    for line in status_lines(claims, now) {
        println!("{line}");
    }
}

/// Build the status lines without printing them.
pub fn status_lines(claims: &Claims, now: DateTime<Utc>) -> Vec<String> {
    let now_seconds = NumericDate::from_datetime(now).seconds();
    let mut lines = Vec::new();

    if let Some(exp) = claims.expiration() {
        let delta = exp.seconds().saturating_sub(now_seconds);
        let status = if delta > 0 {
            format!("VALID (expires in {})", format_span(delta)).green()
        } else {
            format!("EXPIRED ({} ago)", format_span(delta.saturating_neg())).red()
        };
        lines.push(format!("Expires at:  {exp}  {status}"));
    }

    for (name, label) in [(ISSUED_AT, "Issued at:  "), (NOT_BEFORE, "Not before: ")] {
        if let Some(date) = claims.get(name).and_then(|v| v.as_timestamp()) {
            lines.push(format!("{label} {date}"));
        }
    }

    if lines.is_empty() {
        lines.push(format!("No '{EXPIRATION}' claim present"));
    }
    lines
}

/// Format a span of seconds as "1d 2h 3m", "5m 10s" or "42s".
fn format_span(seconds: i64) -> String {
    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3_600;
    let minutes = (seconds % 3_600) / 60;
    let secs = seconds % 60;

    match (days, hours, minutes) {
        (0, 0, 0) => format!("{secs}s"),
        (0, 0, _) => format!("{minutes}m {secs}s"),
        (0, _, _) => format!("{hours}h {minutes}m"),
        _ => format!("{days}d {hours}h {minutes}m"),
    }
}
