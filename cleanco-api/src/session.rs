use cleanco_core::Document;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Session Claims
// ============================================================================

/// Claims carried by the `token` cookie: whatever identity payload the
/// client signed in with, plus issue and expiry timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    #[serde(flatten)]
    pub payload: Document,
    #[serde(default)]
    pub iat: i64,
    pub exp: i64,
}

impl SessionClaims {
    pub fn email(&self) -> Option<&Value> {
        self.payload.get("email")
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token cookie missing")]
    Missing,
    #[error("token rejected: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),
    #[error("token signing failed: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

// ============================================================================
// Signing & Verification
// ============================================================================

pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_seconds: u64,
}

impl TokenSigner {
    pub fn new(secret: &[u8], ttl_seconds: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl_seconds,
        }
    }

    /// Signs `payload` as HS256, valid from `now` for the configured TTL.
    /// Timestamps supplied by the client are replaced.
    pub fn issue(&self, mut payload: Document, now: i64) -> Result<String, TokenError> {
        payload.remove("iat");
        payload.remove("exp");

        let claims = SessionClaims {
            payload,
            iat: now,
            exp: now.saturating_add(self.ttl_seconds as i64),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(TokenError::Signing)
    }

    pub fn verify(&self, token: &str) -> Result<SessionClaims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_aud = false;

        decode::<SessionClaims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(TokenError::Invalid)
    }
}
