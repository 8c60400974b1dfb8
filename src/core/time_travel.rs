//! Time-travel evaluation for token expiry.
//!
//! Parses time expressions (relative like "+7d" or absolute like ISO 8601)
//! so a token can be validated as of a simulated instant, and so the
//! issuer can express an explicit lifetime.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};

use crate::error::InputError;

/// A parsed time target for time-travel evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeTarget {
    /// The resolved absolute timestamp.
    pub timestamp: DateTime<Utc>,
    /// The original expression provided by the user.
    pub expression: String,
}

/// Parse a time-travel expression relative to the current time.
///
/// See [`parse_time_expression_at`].
pub fn parse_time_expression(expression: &str) -> Result<TimeTarget, InputError> {
    parse_time_expression_at(expression, Utc::now())
}

/// Parse a time-travel expression into an absolute timestamp.
///
/// Supports the following formats:
/// - Relative to `now`: `+7d`, `-1h`, `+30m`, `+1y`, `-5s`, `+2w`
/// - Absolute ISO 8601: `2024-01-15T14:30:00Z` (no offset means UTC)
/// - Absolute Unix epoch: `1705312200`
///
/// # Errors
///
/// Returns an error if the expression doesn't match any known format.
pub fn parse_time_expression_at(
    expression: &str,
    now: DateTime<Utc>,
) -> Result<TimeTarget, InputError> {
    let trimmed = expression.trim();
    let invalid = |reason: &str| InputError::InvalidTimeExpression {
        expression: expression.to_string(),
        reason: reason.to_string(),
    };

    let timestamp = if trimmed.starts_with(['+', '-']) {
        let offset = parse_relative(trimmed)?;
        now.checked_add_signed(offset)
            .ok_or_else(|| invalid("resulting time is out of range"))?
    } else if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
        let seconds: i64 = trimmed
            .parse()
            .map_err(|_| invalid("epoch seconds out of range"))?;
        DateTime::from_timestamp(seconds, 0).ok_or_else(|| invalid("epoch seconds out of range"))?
    } else if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        parsed.with_timezone(&Utc)
    } else if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S") {
        naive.and_utc()
    } else {
        return Err(invalid(
            "expected a relative offset (+7d), ISO 8601 timestamp or Unix epoch seconds",
        ));
    };

    Ok(TimeTarget {
        timestamp,
        expression: expression.to_string(),
    })
}

/// Parse a signed relative offset such as `+7d` or `-30m`.
///
/// A missing sign means "in the future". Units: `s`, `m`, `h`, `d`, `w`,
/// `y` (365 days).
///
/// # Errors
///
/// Returns an error for a missing amount, an unknown unit, or an offset
/// too large to represent.
pub fn parse_relative(expression: &str) -> Result<Duration, InputError> {
    let invalid = |reason: String| InputError::InvalidTimeExpression {
        expression: expression.to_string(),
        reason,
    };

    let trimmed = expression.trim();
    let (negative, body) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let Some(unit) = body.chars().last() else {
        return Err(invalid("empty offset".to_string()));
    };
    if body.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid(
            "missing unit; epoch seconds cannot be negative, use an offset like '-100s'"
                .to_string(),
        ));
    }
    let amount_text = &body[..body.len() - unit.len_utf8()];
    if amount_text.is_empty() || !amount_text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid(format!("expected digits before unit '{unit}'")));
    }
    let amount: i64 = amount_text
        .parse()
        .map_err(|_| invalid("amount out of range".to_string()))?;

    let seconds_per_unit: i64 = match unit {
        's' => 1,
        'm' => 60,
        'h' => 3_600,
        'd' => 86_400,
        'w' => 604_800,
        'y' => 31_536_000,
        other => return Err(invalid(format!("unknown unit '{other}'"))),
    };

    let seconds = amount
        .checked_mul(seconds_per_unit)
        .ok_or_else(|| invalid("offset out of range".to_string()))?;
    let offset =
        Duration::try_seconds(seconds).ok_or_else(|| invalid("offset out of range".to_string()))?;

    Ok(if negative { -offset } else { offset })
}
