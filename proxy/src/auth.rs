//! Bearer token verification against a JWKS endpoint.
//!
//! Verification has exactly two outcomes: the decoded claim set, or an
//! error the handler maps to 401. The algorithm is fixed to RS256;
//! audience and issuer are checked against the configured values.

use jsonwebtoken::jwk::{Jwk, JwkSet};
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

/// Result type for token verification.
pub type AuthResult<T> = Result<T, AuthError>;

/// Reasons a token fails verification. All of them surface as 401.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Token header could not be decoded.
    #[error("malformed token: {0}")]
    Malformed(String),

    /// Token header carries no key id.
    #[error("token has no key id")]
    MissingKeyId,

    /// Token is signed with an algorithm other than RS256.
    #[error("unexpected signing algorithm")]
    WrongAlgorithm,

    /// JWKS endpoint could not be reached or parsed.
    #[error("jwks fetch failed: {0}")]
    JwksFetch(String),

    /// No key in the JWKS matches the token's key id.
    #[error("unknown signing key: {0}")]
    UnknownKey(String),

    /// Signature, expiry, audience, or issuer check failed.
    #[error("invalid token: {0}")]
    Invalid(String),
}

/// Token verification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// URL of the JWKS document publishing the signing keys.
    pub jwks_url: String,
    /// Expected `aud` claim.
    pub audience: String,
    /// Expected `iss` claim.
    pub issuer: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwks_url: "https://medisync.us.auth0.com/.well-known/jwks.json".to_string(),
            audience: "https://api.medisync.app".to_string(),
            issuer: "https://medisync.us.auth0.com/".to_string(),
        }
    }
}

/// Verifies bearer tokens against the configured JWKS endpoint.
///
/// Keys are cached by key id across requests as an optimization;
/// a cache miss refetches the JWKS, so correctness never depends on
/// the cache.
pub struct TokenVerifier {
    config: AuthConfig,
    client: Client,
    keys: RwLock<HashMap<String, Jwk>>,
}

impl TokenVerifier {
    /// Creates a verifier for `config`.
    pub fn new(config: AuthConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("failed to create HTTP client");

        Self {
            config,
            client,
            keys: RwLock::new(HashMap::new()),
        }
    }

    /// Verifies `token` and returns its decoded claim set.
    pub async fn verify(&self, token: &str) -> AuthResult<Value> {
        let header = decode_header(token).map_err(|e| AuthError::Malformed(e.to_string()))?;
        if header.alg != Algorithm::RS256 {
            return Err(AuthError::WrongAlgorithm);
        }
        let kid = header.kid.ok_or(AuthError::MissingKeyId)?;

        let jwk = self.signing_key(&kid).await?;
        let key = DecodingKey::from_jwk(&jwk).map_err(|e| AuthError::Invalid(e.to_string()))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[&self.config.audience]);
        validation.set_issuer(&[&self.config.issuer]);

        let data = decode::<Value>(token, &key, &validation)
            .map_err(|e| AuthError::Invalid(e.to_string()))?;

        Ok(data.claims)
    }

    /// Resolves `kid` to its JWK, consulting the cache first.
    async fn signing_key(&self, kid: &str) -> AuthResult<Jwk> {
        if let Some(jwk) = self.keys.read().await.get(kid) {
            return Ok(jwk.clone());
        }

        debug!("Key {kid} not cached, fetching JWKS");
        let response = self
            .client
            .get(&self.config.jwks_url)
            .send()
            .await
            .map_err(|e| AuthError::JwksFetch(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AuthError::JwksFetch(format!(
                "jwks endpoint returned {}",
                response.status()
            )));
        }

        let jwks: JwkSet = response
            .json()
            .await
            .map_err(|e| AuthError::JwksFetch(e.to_string()))?;

        let mut keys = self.keys.write().await;
        for jwk in &jwks.keys {
            if let Some(id) = &jwk.common.key_id {
                keys.insert(id.clone(), jwk.clone());
            }
        }

        keys.get(kid)
            .cloned()
            .ok_or_else(|| AuthError::UnknownKey(kid.to_string()))
    }
}
