//! Key material and the key-provider seam.
//!
//! Wraps `jsonwebtoken`'s encoding and decoding keys in newtypes that
//! can only be built from RSA material, so the engine never has to ask
//! which family a key belongs to. Keys are loaded once and shared
//! read-only for the life of the process.
//!
//! # Security
//!
//! PEM buffers read from disk are held in `Zeroizing` and wiped on drop.
//! `Debug` output never includes key bytes.

use std::fmt;
use std::path::{Path, PathBuf};

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, crypto};
use tracing::info;
use zeroize::Zeroizing;

use crate::error::TokenError;

/// The only signing algorithm this crate issues or accepts.
pub const ALGORITHM: Algorithm = Algorithm::RS256;

/// Header spelling of [`ALGORITHM`].
pub const ALGORITHM_NAME: &str = "RS256";

/// Source name used for keys parsed from in-memory buffers.
const MEMORY_SOURCE: &str = "memory";

/// Message signed at load time to prove a key is usable.
const PROBE_MESSAGE: &[u8] = b"jwt-mint key probe";

/// Supplies parsed key material to the engine.
///
/// Implementations decide where keys come from; the engine only needs
/// the resulting key objects.
pub trait KeyProvider {
    /// Load the private signing key.
    fn load_private_key(&self) -> Result<PrivateKey, TokenError>;

    /// Load the public verification key.
    fn load_public_key(&self) -> Result<PublicKey, TokenError>;

    /// Load both keys and check that they belong together.
    fn load_key_pair(&self) -> Result<KeyPair, TokenError> {
        KeyPair::new(self.load_private_key()?, self.load_public_key()?)
    }
}

/// An RSA private key, usable for RS256 signing.
#[derive(Clone)]
pub struct PrivateKey {
    key: EncodingKey,
}

impl PrivateKey {
    /// Parse a PEM-encoded RSA private key (PKCS#1 or PKCS#8).
    ///
    /// # Errors
    ///
    /// Returns `Key` if the PEM is not an RSA private key or the key
    /// cannot produce an RS256 signature.
    pub fn from_rsa_pem(pem: &[u8]) -> Result<Self, TokenError> {
        Self::parse(pem, MEMORY_SOURCE)
    }

    fn parse(pem: &[u8], source_name: &str) -> Result<Self, TokenError> {
        let key = EncodingKey::from_rsa_pem(pem).map_err(|e| TokenError::Key {
            source_name: source_name.to_string(),
            reason: format!("not an RSA private key ({})", describe_jwt_error(e.kind())),
        })?;
        let private_key = Self { key };
        private_key
            .sign(PROBE_MESSAGE)
            .map_err(|_| TokenError::Key {
                source_name: source_name.to_string(),
                reason: "key cannot produce RS256 signatures".to_string(),
            })?;
        Ok(private_key)
    }

    /// Sign `message`, returning the base64url signature segment.
    pub(crate) fn sign(&self, message: &[u8]) -> Result<String, TokenError> {
        crypto::sign(message, &self.key, ALGORITHM).map_err(|e| TokenError::Key {
            source_name: "signing".to_string(),
            reason: describe_jwt_error(e.kind()).to_string(),
        })
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey([REDACTED])")
    }
}

/// An RSA public key, usable for RS256 verification.
#[derive(Clone)]
pub struct PublicKey {
    key: DecodingKey,
}

impl PublicKey {
    /// Parse a PEM-encoded RSA public key (SPKI or PKCS#1).
    ///
    /// # Errors
    ///
    /// Returns `Key` if the PEM is not an RSA key.
    pub fn from_rsa_pem(pem: &[u8]) -> Result<Self, TokenError> {
        Self::parse(pem, MEMORY_SOURCE)
    }

    fn parse(pem: &[u8], source_name: &str) -> Result<Self, TokenError> {
        DecodingKey::from_rsa_pem(pem)
            .map(|key| Self { key })
            .map_err(|e| TokenError::Key {
                source_name: source_name.to_string(),
                reason: format!("not an RSA public key ({})", describe_jwt_error(e.kind())),
            })
    }

    /// Check a base64url signature over `message`.
    ///
    /// Any failure, including an undecodable signature, is `false`.
    pub(crate) fn verify(&self, signature: &str, message: &[u8]) -> bool {
        matches!(crypto::verify(signature, message, &self.key, ALGORITHM), Ok(true))
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PublicKey(RS256)")
    }
}

/// A matching private/public key pair.
#[derive(Debug, Clone)]
pub struct KeyPair {
    /// Signing half.
    pub private: PrivateKey,
    /// Verification half.
    pub public: PublicKey,
}

impl KeyPair {
    /// Pair two keys, checking that the public key verifies signatures
    /// made by the private key.
    ///
    /// # Errors
    ///
    /// Returns `Key` if the keys do not belong together.
    pub fn new(private: PrivateKey, public: PublicKey) -> Result<Self, TokenError> {
        let signature = private.sign(PROBE_MESSAGE)?;
        if !public.verify(&signature, PROBE_MESSAGE) {
            return Err(TokenError::Key {
                source_name: "key pair".to_string(),
                reason: "public key does not match private key".to_string(),
            });
        }
        Ok(Self { private, public })
    }
}

/// Loads keys from PEM files on disk.
#[derive(Debug, Clone)]
pub struct PemFileKeyProvider {
    private_key_path: PathBuf,
    public_key_path: PathBuf,
}

impl PemFileKeyProvider {
    /// Provider reading the given private and public key files.
    pub fn new(private_key_path: impl Into<PathBuf>, public_key_path: impl Into<PathBuf>) -> Self {
        Self {
            private_key_path: private_key_path.into(),
            public_key_path: public_key_path.into(),
        }
    }
}

impl KeyProvider for PemFileKeyProvider {
    fn load_private_key(&self) -> Result<PrivateKey, TokenError> {
        load_private_key_file(&self.private_key_path)
    }

    fn load_public_key(&self) -> Result<PublicKey, TokenError> {
        load_public_key_file(&self.public_key_path)
    }
}

/// Read and parse a PEM-encoded RSA private key file.
pub fn load_private_key_file(path: &Path) -> Result<PrivateKey, TokenError> {
    let pem = read_key_file(path)?;
    let key = PrivateKey::parse(&pem, &path.display().to_string())?;
    info!(path = %path.display(), "loaded private key");
    Ok(key)
}

/// Read and parse a PEM-encoded RSA public key file.
pub fn load_public_key_file(path: &Path) -> Result<PublicKey, TokenError> {
    let pem = read_key_file(path)?;
    let key = PublicKey::parse(&pem, &path.display().to_string())?;
    info!(path = %path.display(), "loaded public key");
    Ok(key)
}

fn read_key_file(path: &Path) -> Result<Zeroizing<Vec<u8>>, TokenError> {
    std::fs::read(path)
        .map(Zeroizing::new)
        .map_err(|e| TokenError::Key {
            source_name: path.display().to_string(),
            reason: format!("failed to read key file: {}", e.kind()),
        })
}

/// Map a `jsonwebtoken` error to a short reason without internal detail.
fn describe_jwt_error(kind: &ErrorKind) -> &'static str {
    match kind {
        ErrorKind::InvalidKeyFormat => "invalid key format",
        ErrorKind::InvalidRsaKey(_) => "invalid RSA key",
        ErrorKind::RsaFailedSigning => "RSA signing failed",
        ErrorKind::InvalidAlgorithm => "key does not match algorithm",
        ErrorKind::Base64(_) => "invalid base64 encoding",
        _ => "unusable key material",
    }
}
