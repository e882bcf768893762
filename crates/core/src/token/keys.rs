//! RS256 signing key material
//!
//! Loaded from PEM (PKCS#8 or PKCS#1) or generated on the fly. The public
//! half is always derived from the private key so the two cannot drift.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header};
use keygate_domain::{AuthError, Result, TokenConfig};
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};
use tracing::warn;

const GENERATED_KEY_BITS: usize = 2048;

/// Public verification key in JWK form (RFC 7517)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicJwk {
    pub kty: String,
    #[serde(rename = "use")]
    pub key_use: String,
    pub alg: String,
    pub kid: String,
    /// Modulus, base64url without padding
    pub n: String,
    /// Exponent, base64url without padding
    pub e: String,
}

/// Private signing key plus the derived verification key.
#[derive(Clone)]
pub struct SigningKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    public_key_pem: String,
    jwk: PublicJwk,
    key_id: String,
    ephemeral: bool,
}

impl SigningKeys {
    /// Resolve key material from configuration.
    ///
    /// Without a configured private key an ephemeral key is generated and a
    /// warning logged, unless `require_key_material` is set.
    ///
    /// # Errors
    /// `AuthError::Config` when the PEM cannot be parsed, the public key does
    /// not match, or key material is required but missing.
    pub fn from_config(config: &TokenConfig) -> Result<Self> {
        match config.private_key_pem.as_deref() {
            Some(private_pem) => {
                Self::from_private_pem(private_pem, config.public_key_pem.as_deref(), &config.key_id)
            }
            None if config.require_key_material => {
                Err(AuthError::Config("token.private_key_pem is required".into()))
            }
            None => {
                warn!(
                    key_id = %config.key_id,
                    "No signing key configured; generated an ephemeral RSA key. Issued tokens will not verify after a restart"
                );
                Self::generate(&config.key_id)
            }
        }
    }

    /// Load a private key and optionally check it against a public key.
    pub fn from_private_pem(
        private_pem: &str,
        public_pem: Option<&str>,
        key_id: &str,
    ) -> Result<Self> {
        let private_key = RsaPrivateKey::from_pkcs8_pem(private_pem)
            .or_else(|_| RsaPrivateKey::from_pkcs1_pem(private_pem))
            .map_err(|e| AuthError::Config(format!("invalid RSA private key: {e}")))?;

        if let Some(public_pem) = public_pem {
            let public_key = RsaPublicKey::from_public_key_pem(public_pem)
                .or_else(|_| RsaPublicKey::from_pkcs1_pem(public_pem))
                .map_err(|e| AuthError::Config(format!("invalid RSA public key: {e}")))?;
            if public_key != private_key.to_public_key() {
                return Err(AuthError::Config(
                    "token.public_key_pem does not match token.private_key_pem".into(),
                ));
            }
        }

        let encoding = EncodingKey::from_rsa_pem(private_pem.as_bytes())
            .map_err(|e| AuthError::Config(format!("unusable RSA private key: {e}")))?;
        Self::assemble(&private_key, encoding, key_id, false)
    }

    /// Generate a fresh 2048-bit key.
    pub fn generate(key_id: &str) -> Result<Self> {
        let private_key = RsaPrivateKey::new(&mut rand::rngs::OsRng, GENERATED_KEY_BITS)
            .map_err(|e| AuthError::Internal(format!("RSA key generation failed: {e}")))?;
        let private_pem = private_key
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| AuthError::Internal(format!("RSA key encoding failed: {e}")))?;
        let encoding = EncodingKey::from_rsa_pem(private_pem.as_bytes())
            .map_err(|e| AuthError::Internal(format!("RSA key encoding failed: {e}")))?;
        Self::assemble(&private_key, encoding, key_id, true)
    }

    fn assemble(
        private_key: &RsaPrivateKey,
        encoding: EncodingKey,
        key_id: &str,
        ephemeral: bool,
    ) -> Result<Self> {
        let public_key = private_key.to_public_key();
        let public_key_pem = public_key
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| AuthError::Internal(format!("RSA public key encoding failed: {e}")))?;
        let decoding = DecodingKey::from_rsa_pem(public_key_pem.as_bytes())
            .map_err(|e| AuthError::Internal(format!("RSA public key unusable: {e}")))?;

        let jwk = PublicJwk {
            kty: "RSA".to_string(),
            key_use: "sig".to_string(),
            alg: "RS256".to_string(),
            kid: key_id.to_string(),
            n: URL_SAFE_NO_PAD.encode(public_key.n().to_bytes_be()),
            e: URL_SAFE_NO_PAD.encode(public_key.e().to_bytes_be()),
        };

        Ok(Self { encoding, decoding, public_key_pem, jwk, key_id: key_id.to_string(), ephemeral })
    }

    /// JWT header for tokens signed with this key.
    pub fn header(&self) -> Header {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(self.key_id.clone());
        header
    }

    pub fn encoding_key(&self) -> &EncodingKey {
        &self.encoding
    }

    pub fn decoding_key(&self) -> &DecodingKey {
        &self.decoding
    }

    /// SPKI ("PUBLIC KEY") PEM of the verification key
    pub fn public_key_pem(&self) -> &str {
        &self.public_key_pem
    }

    pub fn public_jwk(&self) -> &PublicJwk {
        &self.jwk
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// True when the key was generated at startup rather than configured.
    pub fn is_ephemeral(&self) -> bool {
        self.ephemeral
    }
}

impl std::fmt::Debug for SigningKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKeys")
            .field("key_id", &self.key_id)
            .field("ephemeral", &self.ephemeral)
            .finish_non_exhaustive()
    }
}
