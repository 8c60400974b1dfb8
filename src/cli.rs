//! CLI argument definitions for jwt-mint.
//!
//! Uses `clap` derive macros to define the command-line interface.
//! Each subcommand has its own argument struct for type-safe parsing.
//! Key paths and the validity window can also come from environment
//! variables.
//!
//! # Security
//!
//! `ValidateArgs` implements custom `Debug` to redact the token and
//! prevent accidental leakage through debug formatting, error chains,
//! or logging.

use std::fmt;
use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use jwt_mint::InputError;
use jwt_mint::config::DEFAULT_VALIDITY_MINUTES;
use jwt_mint::core::claims::is_temporal;

/// Issue and validate RS256-signed JSON Web Tokens (JWTs)
/// from a fixed key pair.
#[derive(Debug, Parser)]
#[command(name = "jwt-mint")]
#[command(version, long_about = None)]
#[command(about = "Issue and validate RS256-signed JWTs from a fixed key pair")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Issue a signed token for a subject and print it.
    Issue(IssueArgs),

    /// Validate a token's structure, signature and expiry.
    Validate(ValidateArgs),
}

/// Arguments for the `issue` subcommand.
#[derive(Debug, clap::Args)]
pub struct IssueArgs {
    /// Path to the PEM-encoded RSA private key.
    #[arg(
        long,
        value_name = "FILE",
        env = "JWT_MINT_PRIVATE_KEY",
        default_value = "./keys/jwt.key"
    )]
    pub private_key: PathBuf,

    /// Value of the `subject-id` claim.
    #[arg(long, value_name = "ID", default_value = "abc123")]
    pub subject: String,

    /// Value of the `access-level` claim.
    #[arg(long, value_name = "LEVEL", default_value = "user")]
    pub access_level: String,

    /// Additional claim as NAME=VALUE. Integers become numbers,
    /// anything else is text. May be repeated.
    #[arg(long = "claim", value_name = "NAME=VALUE", value_parser = parse_claim)]
    pub claims: Vec<(String, String)>,

    /// Explicit lifetime such as "+30m" or "7d", overriding the
    /// validity window.
    #[arg(long, value_name = "EXPR", allow_hyphen_values = true)]
    pub expires_in: Option<String>,

    /// Default validity window in minutes.
    #[arg(
        long,
        value_name = "MINUTES",
        env = "JWT_MINT_VALIDITY_MINUTES",
        default_value_t = DEFAULT_VALIDITY_MINUTES
    )]
    pub validity_minutes: i64,
}

/// Arguments for the `validate` subcommand.
#[derive(clap::Args)]
pub struct ValidateArgs {
    /// The token to validate. If omitted, reads from stdin.
    pub token: Option<String>,

    /// Read the token from the specified environment variable.
    #[arg(long, value_name = "VAR_NAME")]
    pub token_env: Option<String>,

    /// Path to the PEM-encoded RSA public key.
    #[arg(
        long,
        value_name = "FILE",
        env = "JWT_MINT_PUBLIC_KEY",
        default_value = "./keys/jwt.key.pub"
    )]
    pub public_key: PathBuf,

    /// Validate as of a different time.
    ///
    /// Accepts relative expressions like "+7d", "-1h", "+30m" or
    /// absolute timestamps in ISO 8601 or Unix epoch format.
    #[arg(long, value_name = "EXPR", allow_hyphen_values = true)]
    pub time_travel: Option<String>,

    /// Output raw JSON without colors (machine-readable).
    #[arg(long)]
    pub json: bool,
}

/// Custom `Debug` that redacts the token field to prevent accidental
/// leakage.
impl fmt::Debug for ValidateArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidateArgs")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("token_env", &self.token_env)
            .field("public_key", &self.public_key)
            .field("time_travel", &self.time_travel)
            .field("json", &self.json)
            .finish()
    }
}

/// Parse a `NAME=VALUE` claim argument.
fn parse_claim(argument: &str) -> Result<(String, String), InputError> {
    let invalid = |reason: &str| InputError::InvalidClaim {
        argument: argument.to_string(),
        reason: reason.to_string(),
    };

    let (name, value) = argument
        .split_once('=')
        .ok_or_else(|| invalid("expected NAME=VALUE"))?;
    if name.is_empty() {
        return Err(invalid("claim name is empty"));
    }
    if is_temporal(name) {
        return Err(invalid("temporal claims are set by the issuer; use --expires-in"));
    }
    Ok((name.to_string(), value.to_string()))
}
