//! Token issuance and validation.
//!
//! [`TokenEngine`] owns shared handles to its keys and configuration and
//! is cheap to clone across threads. Both operations are pure apart from
//! reading the clock; the `*_at` variants take the clock as an argument.

use std::sync::Arc;

use tracing::debug;

use crate::config::EngineConfig;
use crate::core::claims::{Claims, EXPIRATION, NumericDate};
use crate::core::codec::{
    SEGMENT_SEPARATOR, TokenHeader, decode_token, encode_claims, encode_header, encode_segment,
};
use crate::core::keys::{ALGORITHM_NAME, KeyPair, PrivateKey, PublicKey};
use crate::error::TokenError;

/// Longest header `alg` value echoed back in an error.
const MAX_REPORTED_ALG_LEN: usize = 32;

/// Issues and validates RS256 tokens.
#[derive(Debug, Clone)]
pub struct TokenEngine {
    private_key: Option<Arc<PrivateKey>>,
    public_key: Option<Arc<PublicKey>>,
    config: Arc<EngineConfig>,
}

impl TokenEngine {
    /// An engine that can both issue and validate.
    pub fn new(keys: KeyPair, config: EngineConfig) -> Self {
        Self {
            private_key: Some(Arc::new(keys.private)),
            public_key: Some(Arc::new(keys.public)),
            config: Arc::new(config),
        }
    }

    /// An engine that can only validate.
    pub fn verifier(public_key: PublicKey, config: EngineConfig) -> Self {
        Self {
            private_key: None,
            public_key: Some(Arc::new(public_key)),
            config: Arc::new(config),
        }
    }

    /// An engine that can only issue.
    pub fn issuer(private_key: PrivateKey, config: EngineConfig) -> Self {
        Self {
            private_key: Some(Arc::new(private_key)),
            public_key: None,
            config: Arc::new(config),
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Whether this engine holds a private key.
    pub fn can_issue(&self) -> bool {
        self.private_key.is_some()
    }

    /// Whether this engine holds a public key.
    pub fn can_validate(&self) -> bool {
        self.public_key.is_some()
    }

    /// Issue a token at the current time.
    ///
    /// # Errors
    ///
    /// See [`TokenEngine::issue_at`].
    pub fn issue(&self, claims: Claims) -> Result<String, TokenError> {
        self.issue_at(claims, NumericDate::now())
    }

    /// Issue a token as if the current time were `now`.
    ///
    /// If `claims` has no `exp`, it is set to `now` plus the configured
    /// validity window. A caller-supplied `exp` is kept as is.
    ///
    /// # Errors
    ///
    /// Returns `Key` if this engine has no private key or signing fails,
    /// and `Encoding` if a claim cannot be encoded.
    pub fn issue_at(&self, mut claims: Claims, now: NumericDate) -> Result<String, TokenError> {
        let private_key = self.private_key.as_deref().ok_or_else(|| TokenError::Key {
            source_name: "engine".to_string(),
            reason: "no private key configured; this engine can only validate".to_string(),
        })?;

        if !claims.contains(EXPIRATION) {
            let expires_at =
                now.checked_add(self.config.validity)
                    .ok_or_else(|| TokenError::Encoding {
                        claim: EXPIRATION.to_string(),
                        reason: "expiry overflows the representable range".to_string(),
                    })?;
            claims.set_expiration(expires_at);
        }

        let header = encode_segment(&encode_header(&TokenHeader::new(ALGORITHM_NAME))?);
        let payload = encode_segment(&encode_claims(&claims)?);
        let signing_input = format!("{header}{SEGMENT_SEPARATOR}{payload}");
        let signature = private_key.sign(signing_input.as_bytes())?;

        debug!(
            claims = ?claims.names().collect::<Vec<_>>(),
            exp = ?claims.expiration().map(NumericDate::seconds),
            "issued token"
        );

        Ok(format!("{signing_input}{SEGMENT_SEPARATOR}{signature}"))
    }

    /// Validate a token at the current time.
    ///
    /// # Errors
    ///
    /// See [`TokenEngine::validate_at`].
    pub fn validate(&self, token: impl AsRef<[u8]>) -> Result<Claims, TokenError> {
        self.validate_at(token, NumericDate::now())
    }

    /// Validate a token as if the current time were `now`.
    ///
    /// Checks run in a fixed order, each with its own error: structure
    /// (`MalformedToken`), declared algorithm (`AlgorithmMismatch`),
    /// signature (`SignatureInvalid`), then expiry (`TokenExpired`).
    /// Claims are returned only if every check passes.
    pub fn validate_at(
        &self,
        token: impl AsRef<[u8]>,
        now: NumericDate,
    ) -> Result<Claims, TokenError> {
        let result = self.check(token.as_ref(), now);
        match &result {
            Ok(claims) => debug!(
                exp = ?claims.expiration().map(NumericDate::seconds),
                "token validated"
            ),
            Err(e) => debug!(kind = e.kind(), "token rejected"),
        }
        result
    }

    fn check(&self, token: &[u8], now: NumericDate) -> Result<Claims, TokenError> {
        let public_key = self.public_key.as_deref().ok_or_else(|| TokenError::Key {
            source_name: "engine".to_string(),
            reason: "no public key configured; this engine can only issue".to_string(),
        })?;

        if token.len() > self.config.max_token_len {
            return Err(TokenError::malformed(format!(
                "token exceeds maximum length of {} bytes",
                self.config.max_token_len
            )));
        }

        let decoded = decode_token(token)?;
        let expires_at = decoded
            .claims
            .expiration()
            .ok_or_else(|| TokenError::malformed("missing 'exp' claim"))?;

        if decoded.header.alg != ALGORITHM_NAME {
            return Err(TokenError::AlgorithmMismatch {
                expected: ALGORITHM_NAME,
                found: sanitize_alg(&decoded.header.alg),
            });
        }

        if !public_key.verify(decoded.signature, decoded.signing_input.as_bytes()) {
            return Err(TokenError::SignatureInvalid);
        }

        if now >= expires_at {
            return Err(TokenError::TokenExpired {
                expired_at: expires_at.to_string(),
            });
        }

        Ok(decoded.claims)
    }
}

/// Strip control characters and truncate an untrusted `alg` value so it
/// is safe to print.
fn sanitize_alg(alg: &str) -> String {
    let clean: String = alg
        .chars()
        .map(|c| if c.is_control() { '\u{FFFD}' } else { c })
        .collect();
    if clean.chars().count() > MAX_REPORTED_ALG_LEN {
        let truncated: String = clean.chars().take(MAX_REPORTED_ALG_LEN).collect();
        format!("{truncated}...(truncated)")
    } else {
        clean
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::core::claims::ClaimValue;

    const RSA_PRIVATE: &[u8] = include_bytes!("../../tests/fixtures/rsa_private.pem");
    const RSA_PUBLIC: &[u8] = include_bytes!("../../tests/fixtures/rsa_public.pem");
    const OTHER_PRIVATE: &[u8] = include_bytes!("../../tests/fixtures/rsa_other_private.pem");
    const OTHER_PUBLIC: &[u8] = include_bytes!("../../tests/fixtures/rsa_other_public.pem");

    const NOW: NumericDate = NumericDate::from_seconds(1_705_329_000);

    fn engine() -> TokenEngine {
        let keys = KeyPair::new(
            PrivateKey::from_rsa_pem(RSA_PRIVATE).unwrap(),
            PublicKey::from_rsa_pem(RSA_PUBLIC).unwrap(),
        )
        .unwrap();
        TokenEngine::new(keys, EngineConfig::default())
    }

    fn demo_claims() -> Claims {
        Claims::new()
            .with("subject-id", "abc123")
            .with("access-level", "user")
    }

    /// Rebuild a token with a replaced header, keeping payload and signature.
    fn with_header(token: &str, header_json: &str) -> String {
        let mut parts = token.splitn(2, '.');
        let _ = parts.next();
        format!(
            "{}.{}",
            encode_segment(header_json.as_bytes()),
            parts.next().unwrap()
        )
    }

    #[test]
    fn test_issue_sets_default_expiry() {
        let engine = engine();
        let token = engine.issue_at(demo_claims(), NOW).unwrap();
        let claims = engine
            .validate_at(&token, NumericDate::from_seconds(NOW.seconds() + 1))
            .unwrap();

        assert_eq!(
            claims.expiration(),
            Some(NumericDate::from_seconds(NOW.seconds() + 48 * 3600))
        );
        assert_eq!(claims.get_str("subject-id"), Some("abc123"));
        assert_eq!(claims.get_str("access-level"), Some("user"));
        assert_eq!(claims.len(), 3);
    }

    #[test]
    fn test_issue_uses_configured_validity() {
        let keys = KeyPair::new(
            PrivateKey::from_rsa_pem(RSA_PRIVATE).unwrap(),
            PublicKey::from_rsa_pem(RSA_PUBLIC).unwrap(),
        )
        .unwrap();
        let config = EngineConfig::default().with_validity_minutes(10).unwrap();
        let engine = TokenEngine::new(keys, config);

        let token = engine.issue_at(demo_claims(), NOW).unwrap();
        let claims = engine.validate_at(&token, NOW).unwrap();
        assert_eq!(
            claims.expiration(),
            NOW.checked_add(Duration::minutes(10))
        );
    }

    #[test]
    fn test_issue_keeps_explicit_expiry() {
        let engine = engine();
        let exp = NumericDate::from_seconds(NOW.seconds() + 60);
        let mut claims = demo_claims();
        claims.set_expiration(exp);

        let token = engine.issue_at(claims, NOW).unwrap();
        assert_eq!(
            engine.validate_at(&token, NOW).unwrap().expiration(),
            Some(exp)
        );
    }

    #[test]
    fn test_issue_rejects_non_timestamp_expiry() {
        let err = engine()
            .issue_at(demo_claims().with("exp", "soon"), NOW)
            .unwrap_err();
        assert!(matches!(err, TokenError::Encoding { claim, .. } if claim == "exp"));
    }

    #[test]
    fn test_issue_rejects_expiry_overflow() {
        let err = engine()
            .issue_at(demo_claims(), NumericDate::from_seconds(i64::MAX - 10))
            .unwrap_err();
        assert!(matches!(err, TokenError::Encoding { .. }));
    }

    #[test]
    fn test_verifier_cannot_issue() {
        let engine = TokenEngine::verifier(
            PublicKey::from_rsa_pem(RSA_PUBLIC).unwrap(),
            EngineConfig::default(),
        );
        assert!(!engine.can_issue());
        assert!(matches!(
            engine.issue_at(demo_claims(), NOW),
            Err(TokenError::Key { .. })
        ));
    }

    #[test]
    fn test_verifier_validates_issued_token() {
        let token = engine().issue_at(demo_claims(), NOW).unwrap();
        let verifier = TokenEngine::verifier(
            PublicKey::from_rsa_pem(RSA_PUBLIC).unwrap(),
            EngineConfig::default(),
        );
        assert!(verifier.validate_at(&token, NOW).is_ok());
    }

    #[test]
    fn test_issuer_cannot_validate() {
        let issuer = TokenEngine::issuer(
            PrivateKey::from_rsa_pem(RSA_PRIVATE).unwrap(),
            EngineConfig::default(),
        );
        assert!(issuer.can_issue());
        assert!(!issuer.can_validate());
        let token = issuer.issue_at(demo_claims(), NOW).unwrap();
        assert!(matches!(
            issuer.validate_at(&token, NOW),
            Err(TokenError::Key { .. })
        ));
        assert!(engine().validate_at(&token, NOW).is_ok());
    }

    #[test]
    fn test_header_is_fixed_rs256() {
        let token = engine().issue_at(demo_claims(), NOW).unwrap();
        assert!(token.starts_with("eyJhbGciOiJSUzI1NiIsInR5cCI6IkpXVCJ9."));
        assert_eq!(token.split('.').count(), 3);
    }

    #[test]
    fn test_expiry_is_exclusive() {
        let engine = engine();
        let exp = NumericDate::from_seconds(NOW.seconds() + 60);
        let token = engine
            .issue_at(demo_claims().with("exp", exp), NOW)
            .unwrap();

        assert!(
            engine
                .validate_at(&token, NumericDate::from_seconds(exp.seconds() - 1))
                .is_ok()
        );
        assert!(matches!(
            engine.validate_at(&token, exp),
            Err(TokenError::TokenExpired { .. })
        ));
    }

    #[test]
    fn test_alg_none_is_rejected_before_signature() {
        let token = engine().issue_at(demo_claims(), NOW).unwrap();
        let forged = with_header(&token, r#"{"alg":"none","typ":"JWT"}"#);
        let err = engine().validate_at(&forged, NOW).unwrap_err();
        assert!(matches!(
            err,
            TokenError::AlgorithmMismatch { expected: "RS256", found } if found == "none"
        ));
    }

    #[test]
    fn test_alg_name_is_case_sensitive() {
        let token = engine().issue_at(demo_claims(), NOW).unwrap();
        let forged = with_header(&token, r#"{"alg":"rs256"}"#);
        assert!(matches!(
            engine().validate_at(&forged, NOW),
            Err(TokenError::AlgorithmMismatch { .. })
        ));
    }

    #[test]
    fn test_changed_header_fails_signature() {
        let token = engine().issue_at(demo_claims(), NOW).unwrap();
        let altered = with_header(&token, r#"{"alg":"RS256","typ":"JWT","kid":"x"}"#);
        assert!(matches!(
            engine().validate_at(&altered, NOW),
            Err(TokenError::SignatureInvalid)
        ));
    }

    #[test]
    fn test_reported_alg_is_sanitized() {
        let token = engine().issue_at(demo_claims(), NOW).unwrap();
        let long_alg = format!(r#"{{"alg":"\u001b[31m{}"}}"#, "A".repeat(100));
        let forged = with_header(&token, &long_alg);
        let err = engine().validate_at(&forged, NOW).unwrap_err();
        let TokenError::AlgorithmMismatch { found, .. } = &err else {
            panic!("expected algorithm mismatch, got {err:?}");
        };
        assert!(!found.contains('\u{1b}'));
        assert!(found.ends_with("...(truncated)"));
    }

    #[test]
    fn test_wrong_key_fails_signature() {
        let other = TokenEngine::new(
            KeyPair::new(
                PrivateKey::from_rsa_pem(OTHER_PRIVATE).unwrap(),
                PublicKey::from_rsa_pem(OTHER_PUBLIC).unwrap(),
            )
            .unwrap(),
            EngineConfig::default(),
        );
        let token = other.issue_at(demo_claims(), NOW).unwrap();
        assert!(matches!(
            engine().validate_at(&token, NOW),
            Err(TokenError::SignatureInvalid)
        ));
    }

    #[test]
    fn test_signature_checked_before_expiry() {
        let other = TokenEngine::issuer(
            PrivateKey::from_rsa_pem(OTHER_PRIVATE).unwrap(),
            EngineConfig::default(),
        );
        let expired = other
            .issue_at(
                demo_claims().with("exp", NumericDate::from_seconds(NOW.seconds() - 1)),
                NOW,
            )
            .unwrap();
        assert!(matches!(
            engine().validate_at(&expired, NOW),
            Err(TokenError::SignatureInvalid)
        ));
    }

    #[test]
    fn test_missing_expiry_is_malformed() {
        let token = engine().issue_at(demo_claims(), NOW).unwrap();
        let parts: Vec<&str> = token.split('.').collect();
        let payload = encode_segment(br#"{"subject-id":"abc123"}"#);
        let stripped = format!("{}.{}.{}", parts[0], payload, parts[2]);
        assert!(matches!(
            engine().validate_at(&stripped, NOW),
            Err(TokenError::MalformedToken { reason }) if reason.contains("exp")
        ));
    }

    #[test]
    fn test_oversized_token_is_malformed() {
        let token = "a".repeat(EngineConfig::default().max_token_len + 1);
        assert!(matches!(
            engine().validate_at(&token, NOW),
            Err(TokenError::MalformedToken { reason }) if reason.contains("maximum length")
        ));
    }

    #[test]
    fn test_configured_length_cap_rejects_valid_token() {
        let token = engine().issue_at(demo_claims(), NOW).unwrap();
        let keys = KeyPair::new(
            PrivateKey::from_rsa_pem(RSA_PRIVATE).unwrap(),
            PublicKey::from_rsa_pem(RSA_PUBLIC).unwrap(),
        )
        .unwrap();
        let capped = TokenEngine::new(keys, EngineConfig::default().with_max_token_len(64));

        assert!(token.len() > 64);
        assert!(matches!(
            capped.validate_at(&token, NOW),
            Err(TokenError::MalformedToken { reason }) if reason.contains("maximum length")
        ));
        assert!(engine().validate_at(&token, NOW).is_ok());
    }

    #[test]
    fn test_trailing_newline_is_malformed() {
        let token = engine().issue_at(demo_claims(), NOW).unwrap();
        assert!(matches!(
            engine().validate_at(format!("{token}\n"), NOW),
            Err(TokenError::MalformedToken { .. })
        ));
    }

    #[test]
    fn test_validate_accepts_bytes() {
        let engine = engine();
        let token = engine.issue_at(demo_claims(), NOW).unwrap();
        let claims = engine.validate_at(token.as_bytes(), NOW).unwrap();
        assert_eq!(claims.get("subject-id"), Some(&ClaimValue::from("abc123")));
    }

    #[test]
    fn test_engine_is_send_sync_clone() {
        fn assert_traits<T: Send + Sync + Clone>() {}
        assert_traits::<TokenEngine>();
    }

    #[test]
    fn test_engine_shared_across_threads() {
        let engine = engine();
        let token = engine.issue_at(demo_claims(), NOW).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let engine = engine.clone();
                let token = token.clone();
                std::thread::spawn(move || engine.validate_at(&token, NOW).is_ok())
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }
}
