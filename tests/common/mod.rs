//! Shared test fixtures and helper utilities.
//!
//! Provides key fixture paths and helpers to mint tokens with known
//! claims for use in both engine and CLI integration tests.
#![allow(dead_code)]

use jwt_mint::{Claims, EngineConfig, KeyPair, PrivateKey, PublicKey, TokenEngine};

/// Path to the test RSA private key fixture (PKCS#1).
pub const RSA_PRIVATE_KEY_PATH: &str = "tests/fixtures/rsa_private.pem";

/// Path to the test RSA public key fixture (SPKI).
pub const RSA_PUBLIC_KEY_PATH: &str = "tests/fixtures/rsa_public.pem";

/// Path to a second, unrelated RSA private key.
pub const OTHER_PRIVATE_KEY_PATH: &str = "tests/fixtures/rsa_other_private.pem";

/// Path to the public half of the second RSA key.
pub const OTHER_PUBLIC_KEY_PATH: &str = "tests/fixtures/rsa_other_public.pem";

/// Path to the test EC private key fixture.
pub const EC_PRIVATE_KEY_PATH: &str = "tests/fixtures/ec_private.pem";

/// Path to the test EC public key fixture.
pub const EC_PUBLIC_KEY_PATH: &str = "tests/fixtures/ec_public.pem";

/// A malformed token with only two parts (missing signature).
pub const MALFORMED_TOKEN_TWO_PARTS: &str = "eyJhbGciOiJSUzI1NiJ9.eyJleHAiOjF9";

/// A completely invalid token string.
pub const INVALID_TOKEN: &str = "not-a-valid-jwt";

/// Load the primary private key fixture.
pub fn private_key() -> PrivateKey {
    PrivateKey::from_rsa_pem(&std::fs::read(RSA_PRIVATE_KEY_PATH).unwrap()).unwrap()
}

/// Load the primary public key fixture.
pub fn public_key() -> PublicKey {
    PublicKey::from_rsa_pem(&std::fs::read(RSA_PUBLIC_KEY_PATH).unwrap()).unwrap()
}

/// Engine over the primary key pair with default configuration.
pub fn engine() -> TokenEngine {
    TokenEngine::new(
        KeyPair::new(private_key(), public_key()).unwrap(),
        EngineConfig::default(),
    )
}

/// Engine over the second key pair.
pub fn other_engine() -> TokenEngine {
    let private =
        PrivateKey::from_rsa_pem(&std::fs::read(OTHER_PRIVATE_KEY_PATH).unwrap()).unwrap();
    let public = PublicKey::from_rsa_pem(&std::fs::read(OTHER_PUBLIC_KEY_PATH).unwrap()).unwrap();
    TokenEngine::new(KeyPair::new(private, public).unwrap(), EngineConfig::default())
}

/// The demo claims: a subject and an access level.
pub fn demo_claims() -> Claims {
    Claims::new()
        .with("subject-id", "abc123")
        .with("access-level", "user")
}

/// Split a token into its three segments.
pub fn segments(token: &str) -> (String, String, String) {
    let parts: Vec<&str> = token.split('.').collect();
    assert_eq!(parts.len(), 3, "token must have three segments");
    (
        parts[0].to_string(),
        parts[1].to_string(),
        parts[2].to_string(),
    )
}
