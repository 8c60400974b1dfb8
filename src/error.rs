//! Domain error types for jwt-mint.
//!
//! All business-logic errors are defined here using `thiserror`.
//! `TokenError` is the engine's taxonomy; `InputError` covers problems
//! with how the command-line front end was invoked. Both are converted
//! to user-friendly messages at the CLI boundary.
//!
//! Messages never include token contents or key material.

use thiserror::Error;

/// Errors produced by the token engine and the key provider.
///
/// `Key` and `Encoding` are issuer-side faults (bad key material or a
/// caller bug). The remaining variants are validation-time rejections:
/// every one of them means "deny access".
#[derive(Debug, Error)]
pub enum TokenError {
    /// Key material is missing, unreadable, or unusable for RS256.
    #[error("key error ({source_name}): {reason}")]
    Key {
        /// Where the key came from (file path, "memory", ...).
        source_name: String,
        /// Description of the failure.
        reason: String,
    },

    /// A claim value cannot be represented in the canonical encoding.
    #[error("cannot encode claim '{claim}': {reason}")]
    Encoding {
        /// Name of the offending claim.
        claim: String,
        /// Description of the failure.
        reason: String,
    },

    /// The token is not a well-formed `header.payload.signature` string.
    #[error("malformed token: {reason}")]
    MalformedToken {
        /// Description of the structural problem.
        reason: String,
    },

    /// The header declares an algorithm other than the trusted one.
    #[error("algorithm mismatch: expected {expected}, token declares '{found}'")]
    AlgorithmMismatch {
        /// The only algorithm the validator accepts.
        expected: &'static str,
        /// The algorithm named in the token header (sanitized).
        found: String,
    },

    /// The signature does not verify against the public key.
    #[error("signature validation failed")]
    SignatureInvalid,

    /// The token's `exp` instant has been reached.
    #[error("token expired at {expired_at}")]
    TokenExpired {
        /// RFC 3339 rendering of the `exp` claim.
        expired_at: String,
    },
}

impl TokenError {
    /// Build a `MalformedToken` error from any displayable reason.
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedToken {
            reason: reason.into(),
        }
    }

    /// Stable machine-readable name of the failure class.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Key { .. } => "key_error",
            Self::Encoding { .. } => "encoding_error",
            Self::MalformedToken { .. } => "malformed_token",
            Self::AlgorithmMismatch { .. } => "algorithm_mismatch",
            Self::SignatureInvalid => "signature_invalid",
            Self::TokenExpired { .. } => "token_expired",
        }
    }

    /// Whether this error is a validation-time rejection of a presented
    /// token, as opposed to an issuer or startup fault.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, Self::Key { .. } | Self::Encoding { .. })
    }
}

/// Errors caused by how the command-line front end was invoked.
#[derive(Debug, Error)]
pub enum InputError {
    /// No token was provided via any input method.
    #[error("no token provided: pass a token as an argument, via --token-env, or through stdin")]
    NoTokenProvided,

    /// The environment variable name is empty or contains `=` or NUL.
    #[error("invalid environment variable name '{name}'")]
    InvalidEnvVarName {
        /// The rejected name.
        name: String,
    },

    /// The specified environment variable is not set.
    #[error("environment variable '{name}' is not set")]
    EnvVarNotFound {
        /// Name of the missing environment variable.
        name: String,
    },

    /// Failed to parse a time expression.
    #[error("invalid time expression '{expression}': {reason}")]
    InvalidTimeExpression {
        /// The time expression that failed to parse.
        expression: String,
        /// Description of the parsing failure.
        reason: String,
    },

    /// A `--claim` argument is not of the form `NAME=VALUE`.
    #[error("invalid claim argument '{argument}': {reason}")]
    InvalidClaim {
        /// The argument as given.
        argument: String,
        /// Description of the problem.
        reason: String,
    },

    /// The validity window is not a positive number of minutes.
    #[error("invalid validity window: {minutes} minutes (must be positive)")]
    InvalidValidity {
        /// The rejected value.
        minutes: i64,
    },
}
