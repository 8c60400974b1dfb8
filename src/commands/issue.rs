//! Handler for the `issue` subcommand.
//!
//! Mints a token for a subject with the configured private key and
//! prints it on stdout, ready to use as a bearer credential.

use anyhow::{Context, Result};
use tracing::info;

use jwt_mint::core::keys::load_private_key_file;
use jwt_mint::core::time_travel::parse_relative;
use jwt_mint::{ClaimValue, Claims, EngineConfig, InputError, NumericDate, TokenEngine};

use crate::cli::IssueArgs;

/// Name of the subject claim.
pub const SUBJECT_CLAIM: &str = "subject-id";

/// Name of the access-level claim.
pub const ACCESS_LEVEL_CLAIM: &str = "access-level";

/// Execute the `issue` subcommand with the given arguments.
pub fn execute(args: &IssueArgs) -> Result<()> {
    let config = EngineConfig::default().with_validity_minutes(args.validity_minutes)?;
    let now = NumericDate::now();
    let claims = build_claims(args, now)?;

    let private_key = load_private_key_file(&args.private_key)?;
    let engine = TokenEngine::issuer(private_key, config);

    let token = engine
        .issue_at(claims, now)
        .context("failed to issue token")?;
    info!(subject = %args.subject, "token issued");

    println!("{token}");
    Ok(())
}

/// Assemble the claim set from the command-line arguments.
fn build_claims(args: &IssueArgs, now: NumericDate) -> Result<Claims, InputError> {
    let mut claims = Claims::new()
        .with(SUBJECT_CLAIM, args.subject.as_str())
        .with(ACCESS_LEVEL_CLAIM, args.access_level.as_str());

    for (name, value) in &args.claims {
        claims.insert(name.as_str(), claim_value(value));
    }

    if let Some(expression) = &args.expires_in {
        let lifetime = parse_relative(expression)?;
        let expires_at =
            now.checked_add(lifetime)
                .ok_or_else(|| InputError::InvalidTimeExpression {
                    expression: expression.clone(),
                    reason: "resulting time is out of range".to_string(),
                })?;
        claims.set_expiration(expires_at);
    }

    Ok(claims)
}

/// Integers become numeric claims; everything else stays text.
fn claim_value(raw: &str) -> ClaimValue {
    raw.parse::<i64>()
        .map(ClaimValue::Integer)
        .unwrap_or_else(|_| ClaimValue::Text(raw.to_string()))
}
