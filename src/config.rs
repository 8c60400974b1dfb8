//! Engine configuration.
//!
//! The defaults match the deployed behaviour: tokens live for 2880
//! minutes (48 hours) unless the caller supplies an explicit `exp`.
//! The CLI overrides these from flags or environment variables.

use chrono::Duration;

use crate::error::InputError;

/// Default validity window in minutes.
pub const DEFAULT_VALIDITY_MINUTES: i64 = 2880;

/// Default upper bound on the length of a presented token, in bytes.
pub const DEFAULT_MAX_TOKEN_LEN: usize = 8 * 1024;

/// Tunables for [`TokenEngine`](crate::core::engine::TokenEngine).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// How long an issued token stays valid when no `exp` is supplied.
    pub validity: Duration,
    /// Tokens longer than this are rejected before any decoding.
    pub max_token_len: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            validity: Duration::minutes(DEFAULT_VALIDITY_MINUTES),
            max_token_len: DEFAULT_MAX_TOKEN_LEN,
        }
    }
}

impl EngineConfig {
    /// Replace the validity window.
    ///
    /// # Errors
    ///
    /// Returns an error if `minutes` is zero or negative, or too large to
    /// represent as a duration.
    pub fn with_validity_minutes(mut self, minutes: i64) -> Result<Self, InputError> {
        if minutes <= 0 {
            return Err(InputError::InvalidValidity { minutes });
        }
        self.validity =
            Duration::try_minutes(minutes).ok_or(InputError::InvalidValidity { minutes })?;
        Ok(self)
    }

    /// Replace the maximum accepted token length.
    pub fn with_max_token_len(mut self, max_token_len: usize) -> Self {
        self.max_token_len = max_token_len;
        self
    }
}
