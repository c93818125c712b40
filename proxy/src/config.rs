//! Proxy configuration.

use crate::auth::AuthConfig;
use serde::{Deserialize, Serialize};
use std::env;

/// Default allowed origin for the blob routes.
pub const DEFAULT_ALLOWED_ORIGIN: &str = "https://medisync.app";

/// Configuration for the blob proxy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// The single origin allowed to reach the blob routes. Requests
    /// must carry this exact `Origin`, or a `Referer` prefixed by it.
    pub allowed_origin: String,
    /// Token verification settings.
    pub auth: AuthConfig,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            allowed_origin: DEFAULT_ALLOWED_ORIGIN.to_string(),
            auth: AuthConfig::default(),
        }
    }
}

impl ProxyConfig {
    /// Builds a config from the environment, falling back to defaults:
    ///
    /// - `MEDISYNC_ALLOWED_ORIGIN` — the allowed origin
    /// - `MEDISYNC_AUTH_DOMAIN` — tenant domain; derives the JWKS URL
    ///   and expected issuer
    /// - `MEDISYNC_AUTH_AUDIENCE` — expected audience
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(origin) = env::var("MEDISYNC_ALLOWED_ORIGIN") {
            config.allowed_origin = origin;
        }
        if let Ok(domain) = env::var("MEDISYNC_AUTH_DOMAIN") {
            config.auth.jwks_url = format!("https://{domain}/.well-known/jwks.json");
            config.auth.issuer = format!("https://{domain}/");
        }
        if let Ok(audience) = env::var("MEDISYNC_AUTH_AUDIENCE") {
            config.auth.audience = audience;
        }

        config
    }
}
