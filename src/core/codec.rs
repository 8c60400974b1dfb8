//! Token encoding and decoding.
//!
//! Handles the compact `header.payload.signature` layout: base64url
//! segments, the fixed JSON header and the canonical claims encoding.
//!
//! The claims encoding is canonical: compact JSON, claims in insertion
//! order, numbers and strings exactly as `serde_json` writes them.
//! Decoding only accepts input that re-encodes to the same bytes, which
//! rules out trailing data, whitespace, duplicate names and any other
//! alternative spelling of the same claims.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::core::claims::{ClaimValue, Claims, NumericDate, is_temporal};
use crate::error::TokenError;

/// Separator between the three token segments.
pub const SEGMENT_SEPARATOR: char = '.';

/// Token type written into every header.
pub const TOKEN_TYPE: &str = "JWT";

/// The JOSE header of a token.
///
/// Unknown header fields are ignored when decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenHeader {
    /// Declared signing algorithm.
    pub alg: String,
    /// Declared token type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,
}

impl TokenHeader {
    /// Header for a token signed with `alg`.
    pub fn new(alg: &str) -> Self {
        Self {
            alg: alg.to_string(),
            typ: Some(TOKEN_TYPE.to_string()),
        }
    }
}

/// A token after the structural parse, before any trust decision.
///
/// Implements a custom `Debug` that redacts `claims` and `signature` to
/// prevent accidental leakage of claim data.
pub struct DecodedToken<'a> {
    /// The parsed header.
    pub header: TokenHeader,
    /// The decoded claims. Not yet authenticated.
    pub claims: Claims,
    /// The exact `header.payload` text the signature covers.
    pub signing_input: &'a str,
    /// The base64url-encoded signature segment.
    pub signature: &'a str,
}

impl fmt::Debug for DecodedToken<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodedToken")
            .field("header", &self.header)
            .field("claims", &"[REDACTED]")
            .field("signature", &"[REDACTED]")
            .finish()
    }
}

/// Split a raw token and decode its header and claims.
///
/// The signature segment is checked for valid base64url but not
/// verified.
///
/// # Errors
///
/// Returns `MalformedToken` if the token is not UTF-8, doesn't have
/// exactly three segments, if any segment isn't base64url, or if the
/// header or claims fail to decode.
pub fn decode_token(token: &[u8]) -> Result<DecodedToken<'_>, TokenError> {
    let token = std::str::from_utf8(token)
        .map_err(|_| TokenError::malformed("token is not valid UTF-8"))?;

    let parts: Vec<&str> = token.split(SEGMENT_SEPARATOR).collect();
    if parts.len() != 3 {
        return Err(TokenError::malformed(format!(
            "expected 'header.payload.signature' structure, found {} segment(s)",
            parts.len()
        )));
    }

    let header = decode_header(&decode_segment(parts[0], "header")?)?;
    let claims = decode_claims(&decode_segment(parts[1], "payload")?)?;

    if parts[2].is_empty() {
        return Err(TokenError::malformed("signature segment is empty"));
    }
    decode_segment(parts[2], "signature")?;

    let signing_input = &token[..parts[0].len() + 1 + parts[1].len()];

    Ok(DecodedToken {
        header,
        claims,
        signing_input,
        signature: parts[2],
    })
}

/// Base64url-encode a segment without padding.
pub fn encode_segment(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Base64url-decode a segment, rejecting padding and stray bits.
pub fn decode_segment(encoded: &str, segment_name: &str) -> Result<Vec<u8>, TokenError> {
    URL_SAFE_NO_PAD
        .decode(encoded)
        .map_err(|_| TokenError::malformed(format!("{segment_name} is not valid base64url")))
}

/// Serialize a header as compact JSON.
pub fn encode_header(header: &TokenHeader) -> Result<Vec<u8>, TokenError> {
    serde_json::to_vec(header).map_err(|e| TokenError::Encoding {
        claim: "header".to_string(),
        reason: e.to_string(),
    })
}

/// Parse a header; it must be a JSON object with a string `alg`.
pub fn decode_header(bytes: &[u8]) -> Result<TokenHeader, TokenError> {
    serde_json::from_slice(bytes)
        .map_err(|e| TokenError::malformed(format!("failed to parse header: {e}")))
}

/// Encode claims canonically.
///
/// # Errors
///
/// Returns `Encoding` if a value has no canonical representation: a
/// non-finite float, a timestamp under a non-temporal name, or a
/// non-timestamp under `exp`, `iat` or `nbf`.
pub fn encode_claims(claims: &Claims) -> Result<Vec<u8>, TokenError> {
    serde_json::to_vec(&claims_to_json(claims)?).map_err(|e| TokenError::Encoding {
        claim: "*".to_string(),
        reason: e.to_string(),
    })
}

/// Convert claims to the JSON object that [`encode_claims`] serializes.
///
/// # Errors
///
/// Same as [`encode_claims`].
pub fn claims_to_json(claims: &Claims) -> Result<Value, TokenError> {
    let mut object = Map::with_capacity(claims.len());
    for (name, value) in claims.iter() {
        object.insert(name.to_string(), claim_to_json(name, value)?);
    }
    Ok(Value::Object(object))
}

/// Decode canonically encoded claims.
///
/// # Errors
///
/// Returns `MalformedToken` if the bytes are not a JSON object of string
/// and number values, if a temporal claim isn't an integer, or if the
/// bytes are not the canonical encoding of the decoded claims.
pub fn decode_claims(bytes: &[u8]) -> Result<Claims, TokenError> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| TokenError::malformed(format!("failed to parse payload: {e}")))?;

    let Value::Object(object) = value else {
        return Err(TokenError::malformed("payload is not a JSON object"));
    };

    let mut claims = Claims::new();
    for (name, value) in object {
        let claim = claim_from_json(&name, value)?;
        claims.insert(name, claim);
    }

    let canonical =
        encode_claims(&claims).map_err(|_| TokenError::malformed("payload is not representable"))?;
    if canonical != bytes {
        return Err(TokenError::malformed("payload is not canonically encoded"));
    }

    Ok(claims)
}

fn claim_to_json(name: &str, value: &ClaimValue) -> Result<Value, TokenError> {
    let encoding_error = |reason: &str| TokenError::Encoding {
        claim: name.to_string(),
        reason: reason.to_string(),
    };

    match (is_temporal(name), value) {
        (true, ClaimValue::Timestamp(date)) => Ok(Value::from(date.seconds())),
        (true, _) => Err(encoding_error("reserved temporal claim must be a timestamp")),
        (false, ClaimValue::Timestamp(_)) => Err(encoding_error(
            "timestamps are only representable in exp, iat and nbf",
        )),
        (false, ClaimValue::Text(text)) => Ok(Value::String(text.clone())),
        (false, ClaimValue::Integer(n)) => Ok(Value::from(*n)),
        (false, ClaimValue::Float(n)) => Number::from_f64(*n)
            .map(Value::Number)
            .ok_or_else(|| encoding_error("non-finite number")),
    }
}

fn claim_from_json(name: &str, value: Value) -> Result<ClaimValue, TokenError> {
    if is_temporal(name) {
        return value
            .as_i64()
            .map(|seconds| ClaimValue::Timestamp(NumericDate::from_seconds(seconds)))
            .ok_or_else(|| {
                TokenError::malformed(format!("claim '{name}' must be an integer NumericDate"))
            });
    }

    match value {
        Value::String(text) => Ok(ClaimValue::Text(text)),
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(int), _) => Ok(ClaimValue::Integer(int)),
            (None, Some(float)) if n.is_f64() => Ok(ClaimValue::Float(float)),
            _ => Err(TokenError::malformed(format!(
                "claim '{name}' is out of range"
            ))),
        },
        _ => Err(TokenError::malformed(format!(
            "claim '{name}' must be a string or number"
        ))),
    }
}
