//! URL-safe signed session tokens
//!
//! Tokens are `base64url(claims json) . base64url(sha256(secret || "." || payload))`
//! signed with a single process-wide random secret. Because the secret
//! never leaves the process, tokens implicitly expire on restart together
//! with the in-memory session store.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::error::AuthError;

/// Claims serialized into a session token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub device: String,
    pub user: String,
    pub session_id: Uuid,
    pub request_number: u64,
}

/// Signs and verifies session tokens with a process-wide secret
pub struct TokenSigner {
    secret: [u8; 32],
}

impl TokenSigner {
    /// Create a signer with a fresh random secret
    pub fn new() -> Self {
        let mut secret = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut secret);
        Self { secret }
    }

    /// Create a signer from a fixed secret (tests)
    pub fn with_secret(secret: [u8; 32]) -> Self {
        Self { secret }
    }

    fn signature(&self, payload: &str) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(self.secret);
        hasher.update(b".");
        hasher.update(payload.as_bytes());
        hasher.finalize().into()
    }

    /// Serialize and sign claims into an opaque URL-safe token
    pub fn sign(&self, claims: &TokenClaims) -> Result<String, AuthError> {
        let json = serde_json::to_vec(claims).map_err(|_| AuthError::InvalidToken)?;
        let payload = URL_SAFE_NO_PAD.encode(json);
        let signature = URL_SAFE_NO_PAD.encode(self.signature(&payload));
        Ok(format!("{}.{}", payload, signature))
    }

    /// Verify a token's signature (constant-time) and decode its claims
    pub fn verify(&self, token: &str) -> Result<TokenClaims, AuthError> {
        let (payload, signature_b64) = token.split_once('.').ok_or(AuthError::InvalidToken)?;

        let provided = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| AuthError::InvalidToken)?;
        let expected = self.signature(payload);

        if !bool::from(provided.as_slice().ct_eq(&expected)) {
            return Err(AuthError::InvalidToken);
        }

        let json = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| AuthError::InvalidToken)?;
        serde_json::from_slice(&json).map_err(|_| AuthError::InvalidToken)
    }
}

impl Default for TokenSigner {
    fn default() -> Self {
        Self::new()
    }
}
