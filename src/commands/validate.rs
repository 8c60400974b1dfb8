//! Handler for the `validate` subcommand.
//!
//! Validates a token against the configured public key and reports
//! pass/fail. On success the verified claims and their expiry status are
//! shown. Supports time-travel validation at a simulated instant.

use anyhow::Result;
use chrono::{DateTime, Utc};
use colored::Colorize;
use serde_json::json;

use jwt_mint::core::codec::claims_to_json;
use jwt_mint::core::keys::load_public_key_file;
use jwt_mint::core::time_travel::parse_time_expression;
use jwt_mint::{Claims, EngineConfig, NumericDate, TokenEngine, TokenError};

use super::resolve_token;
use crate::cli::ValidateArgs;
use crate::display::json_printer::print_json;
use crate::display::token_status::display_token_status;

/// Execute the `validate` subcommand with the given arguments.
///
/// Returns `Ok(true)` if the token is valid and `Ok(false)` if it was
/// rejected. Problems with the invocation itself (no token, unreadable
/// key) are returned as errors.
pub fn execute(args: &ValidateArgs) -> Result<bool> {
    let token = resolve_token(args.token.as_deref(), args.token_env.as_deref())?;
    let now = match &args.time_travel {
        Some(expression) => parse_time_expression(expression)?.timestamp,
        None => Utc::now(),
    };

    let public_key = load_public_key_file(&args.public_key)?;
    let engine = TokenEngine::verifier(public_key, EngineConfig::default());

    match engine.validate_at(token.as_slice(), NumericDate::from_datetime(now)) {
        Ok(claims) => {
            report_valid(&claims, now, args)?;
            Ok(true)
        }
        Err(e) if e.is_rejection() => {
            report_rejected(&e, args);
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}

fn report_valid(claims: &Claims, now: DateTime<Utc>, args: &ValidateArgs) -> Result<()> {
    let claims_json = claims_to_json(claims)?;

    if args.json {
        let output = json!({
            "valid": true,
            "evaluated_at": now.to_rfc3339(),
            "claims": claims_json,
        });
        print_json(&output, false);
        return Ok(());
    }

    println!("{}", "token validated".green().bold());
    if let Some(expression) = &args.time_travel {
        println!("Evaluated at: {} ({expression})", now.to_rfc3339());
    }
    println!();
    println!("--- Claims ---");
    print_json(&claims_json, true);
    println!();
    println!("--- Token Status ---");
    display_token_status(claims, now);
    Ok(())
}

fn report_rejected(error: &TokenError, args: &ValidateArgs) {
    if args.json {
        let output = json!({
            "valid": false,
            "error": {
                "kind": error.kind(),
                "message": error.to_string(),
            },
        });
        print_json(&output, false);
        return;
    }

    println!("{} {error}", "error validating token:".red().bold());
}
