// ABOUTME: Core type definitions for the authorization flow
// ABOUTME: Includes the client configuration, the OAuth token, and the provider token response

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Tokens expiring within this window are treated as expired
const EXPIRY_DELTA_SECS: i64 = 10;

/// Client configuration for one authorization flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub client_id: String,
    pub client_secret: String,
    pub auth_url: String,
    pub token_url: String,
    pub scopes: Vec<String>,
}

impl ClientConfig {
    /// Scopes as the provider expects them: one comma-separated string
    pub fn joined_scopes(&self) -> String {
        self.scopes.join(",")
    }
}

/// OAuth token as persisted in the token cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthToken {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub token_type: String,
    pub expiry: Option<DateTime<Utc>>,
}

impl OAuthToken {
    /// Token with only an access token and the default bearer type
    pub fn bearer(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            token_type: "Bearer".to_string(),
            expiry: None,
        }
    }

    /// Check if the token is expired or about to expire. Tokens without an expiry never expire.
    pub fn is_expired(&self) -> bool {
        match self.expiry {
            Some(expiry) => expiry < Utc::now() + Duration::seconds(EXPIRY_DELTA_SECS),
            None => false,
        }
    }

    /// Value for the `Authorization` header
    pub fn authorization_value(&self) -> String {
        let bearer = self.token_type.is_empty() || self.token_type.eq_ignore_ascii_case("bearer");
        let token_type = if bearer { "Bearer" } else { self.token_type.as_str() };
        format!("{} {}", token_type, self.access_token)
    }
}

/// OAuth token response from the provider token endpoint
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub token_type: Option<String>,
    pub expires_in: Option<i64>,  // Seconds
    pub expires_at: Option<i64>,  // Unix timestamp (Strava)
}

impl TokenResponse {
    /// Convert into a token, preferring the absolute expiry when the provider sends both
    pub fn into_token(self) -> OAuthToken {
        let expiry = match (self.expires_at, self.expires_in) {
            (Some(at), _) => Utc.timestamp_opt(at, 0).single(),
            (None, Some(secs)) => Some(Utc::now() + Duration::seconds(secs)),
            (None, None) => None,
        };

        OAuthToken {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            token_type: self.token_type.unwrap_or_else(|| "Bearer".to_string()),
            expiry,
        }
    }
}
