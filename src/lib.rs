//! jwt-mint: issue and validate RS256-signed JSON Web Tokens.
//!
//! The library exposes the token engine used by the `jwt-mint` binary.
//! Build a [`TokenEngine`] once from a [`KeyPair`] and share it; every
//! call to [`TokenEngine::issue`] or [`TokenEngine::validate`] is
//! independent and safe to run concurrently.
//!
//! ```no_run
//! use jwt_mint::{Claims, EngineConfig, KeyProvider, PemFileKeyProvider, TokenEngine};
//!
//! # fn main() -> Result<(), jwt_mint::TokenError> {
//! let keys = PemFileKeyProvider::new("keys/jwt.key", "keys/jwt.key.pub").load_key_pair()?;
//! let engine = TokenEngine::new(keys, EngineConfig::default());
//!
//! let token = engine.issue(
//!     Claims::new()
//!         .with("subject-id", "abc123")
//!         .with("access-level", "user"),
//! )?;
//! let claims = engine.validate(&token)?;
//! assert_eq!(claims.get_str("access-level"), Some("user"));
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod config;
pub mod core;
pub mod error;

pub use crate::config::EngineConfig;
pub use crate::core::claims::{ClaimValue, Claims, NumericDate};
pub use crate::core::engine::TokenEngine;
pub use crate::core::keys::{KeyPair, KeyProvider, PemFileKeyProvider, PrivateKey, PublicKey};
pub use crate::error::{InputError, TokenError};
