//! Claims carried inside a token.
//!
//! A [`Claims`] value is an insertion-ordered map from claim name to
//! [`ClaimValue`]. Insertion order is part of the canonical encoding, so
//! two maps with the same entries in a different order encode to
//! different bytes.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use indexmap::IndexMap;

/// Name of the expiration claim.
pub const EXPIRATION: &str = "exp";

/// Name of the issued-at claim.
pub const ISSUED_AT: &str = "iat";

/// Name of the not-before claim.
pub const NOT_BEFORE: &str = "nbf";

/// Claim names whose values are always [`ClaimValue::Timestamp`].
pub const TEMPORAL_CLAIMS: [&str; 3] = [EXPIRATION, ISSUED_AT, NOT_BEFORE];

/// Whether `name` is one of the reserved temporal claims.
pub fn is_temporal(name: &str) -> bool {
    TEMPORAL_CLAIMS.contains(&name)
}

/// Whole seconds since the Unix epoch (RFC 7519 `NumericDate`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NumericDate(i64);

impl NumericDate {
    /// Wrap a raw epoch-seconds value.
    pub const fn from_seconds(seconds: i64) -> Self {
        Self(seconds)
    }

    /// Truncate a timestamp to whole seconds.
    pub fn from_datetime(instant: DateTime<Utc>) -> Self {
        Self(instant.timestamp())
    }

    /// The current time, truncated to whole seconds.
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    /// Raw epoch seconds.
    pub const fn seconds(self) -> i64 {
        self.0
    }

    /// Convert back to a `DateTime`, if it is within chrono's range.
    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.0, 0)
    }

    /// Add a duration, returning `None` on overflow.
    pub fn checked_add(self, duration: Duration) -> Option<Self> {
        self.0.checked_add(duration.num_seconds()).map(Self)
    }
}

impl fmt::Display for NumericDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_datetime() {
            Some(instant) => write!(f, "{}", instant.to_rfc3339()),
            None => write!(f, "{}s since epoch", self.0),
        }
    }
}

/// A single claim value.
#[derive(Debug, Clone, PartialEq)]
pub enum ClaimValue {
    /// An opaque string.
    Text(String),
    /// A signed integer.
    Integer(i64),
    /// A finite floating-point number.
    Float(f64),
    /// An instant; only valid under `exp`, `iat` or `nbf`.
    Timestamp(NumericDate),
}

impl ClaimValue {
    /// The string payload, if this is a `Text` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// The instant, if this is a `Timestamp` value.
    pub fn as_timestamp(&self) -> Option<NumericDate> {
        match self {
            Self::Timestamp(date) => Some(*date),
            _ => None,
        }
    }
}

impl From<&str> for ClaimValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ClaimValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for ClaimValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for ClaimValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<NumericDate> for ClaimValue {
    fn from(value: NumericDate) -> Self {
        Self::Timestamp(value)
    }
}

/// An ordered set of uniquely named claims.
///
/// Equality is order-sensitive, matching the canonical encoding.
#[derive(Debug, Clone, Default)]
pub struct Claims {
    entries: IndexMap<String, ClaimValue>,
}

impl PartialEq for Claims {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len() && self.entries.iter().eq(other.entries.iter())
    }
}

impl Claims {
    /// An empty claim set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ClaimValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert or replace a claim, returning the previous value.
    ///
    /// Replacing keeps the claim's original position.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<ClaimValue>,
    ) -> Option<ClaimValue> {
        self.entries.insert(name.into(), value.into())
    }

    /// Look up a claim by name.
    pub fn get(&self, name: &str) -> Option<&ClaimValue> {
        self.entries.get(name)
    }

    /// Look up a text claim by name.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(ClaimValue::as_str)
    }

    /// Whether a claim with this name is present.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// The `exp` claim, if present and a timestamp.
    pub fn expiration(&self) -> Option<NumericDate> {
        self.get(EXPIRATION).and_then(ClaimValue::as_timestamp)
    }

    /// Set `exp`, replacing any existing value.
    pub fn set_expiration(&mut self, expires_at: NumericDate) {
        self.insert(EXPIRATION, expires_at);
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ClaimValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Claim names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of claims.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no claims.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<N: Into<String>, V: Into<ClaimValue>> FromIterator<(N, V)> for Claims {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut claims = Self::new();
        for (name, value) in iter {
            claims.insert(name, value);
        }
        claims
    }
}
