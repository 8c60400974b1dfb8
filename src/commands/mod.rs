//! Command handlers for each CLI subcommand.
//!
//! Each subcommand is implemented in its own module and exposes
//! a single `execute` function that receives the parsed arguments.

pub mod issue;
pub mod validate;

use std::io::{IsTerminal, Read};

use zeroize::Zeroizing;

use jwt_mint::InputError;

/// Upper bound on how much stdin is read when looking for a token.
const MAX_STDIN_BYTES: u64 = 64 * 1024;

/// Resolve the token from, in order: the positional argument, the named
/// environment variable, or stdin.
///
/// Tokens are kept as raw bytes: input that is not UTF-8 is left for the
/// engine to reject as malformed. Surrounding ASCII whitespace is trimmed
/// so piped tokens with a trailing newline are accepted. An empty result
/// is treated as "no token".
pub(crate) fn resolve_token(
    token: Option<&str>,
    token_env: Option<&str>,
) -> Result<Zeroizing<Vec<u8>>, InputError> {
    let raw = match (token, token_env) {
        (Some(token), _) => Zeroizing::new(token.as_bytes().to_vec()),
        (None, Some(name)) => read_env_var(name)?,
        (None, None) => read_stdin()?,
    };

    let trimmed = raw.trim_ascii();
    if trimmed.is_empty() {
        return Err(InputError::NoTokenProvided);
    }
    Ok(Zeroizing::new(trimmed.to_vec()))
}

fn read_env_var(name: &str) -> Result<Zeroizing<Vec<u8>>, InputError> {
    if name.is_empty() || name.contains('=') || name.contains('\0') {
        return Err(InputError::InvalidEnvVarName {
            name: name.to_string(),
        });
    }
    std::env::var_os(name)
        .map(|value| Zeroizing::new(value.into_encoded_bytes()))
        .ok_or_else(|| InputError::EnvVarNotFound {
            name: name.to_string(),
        })
}

fn read_stdin() -> Result<Zeroizing<Vec<u8>>, InputError> {
    let stdin = std::io::stdin();
    if stdin.is_terminal() {
        return Err(InputError::NoTokenProvided);
    }

    let mut buffer = Zeroizing::new(Vec::new());
    stdin
        .lock()
        .take(MAX_STDIN_BYTES)
        .read_to_end(&mut buffer)
        .map_err(|_| InputError::NoTokenProvided)?;
    Ok(buffer)
}
