// ABOUTME: Token exchange with the provider token endpoint
// ABOUTME: Trait seam for code and refresh exchanges plus the default form-POST implementation

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, error};

use crate::{
    error::{AuthError, AuthResult},
    oauth::types::{ClientConfig, OAuthToken, TokenResponse},
};

/// Exchanges authorization codes and refresh tokens for access tokens
#[async_trait]
pub trait TokenExchanger: Send + Sync {
    /// Exchange an authorization code obtained through `redirect_uri`
    async fn exchange(
        &self,
        config: &ClientConfig,
        code: &str,
        redirect_uri: &str,
    ) -> AuthResult<OAuthToken>;

    /// Obtain a new token from refresh material
    async fn refresh(&self, config: &ClientConfig, refresh_token: &str) -> AuthResult<OAuthToken>;
}

/// Token exchange over HTTP against `ClientConfig::token_url`
#[derive(Debug, Clone)]
pub struct HttpTokenExchanger {
    client: Client,
}

impl HttpTokenExchanger {
    /// Fails when the TLS backend cannot be initialized
    pub fn new() -> AuthResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("strava-auth/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(20))
            .build()?;
        Ok(Self { client })
    }

    async fn post_form(&self, url: &str, form: &[(&str, &str)]) -> Result<TokenResponse, String> {
        let response = self
            .client
            .post(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(form)
            .send()
            .await
            .map_err(|e| format!("request failed: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            // Don't leak full response body - only log status for security
            error!("Token endpoint returned status {}", status);
            return Err(format!("token endpoint returned status {}", status));
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| format!("failed to parse token response: {}", e))
    }
}

#[async_trait]
impl TokenExchanger for HttpTokenExchanger {
    async fn exchange(
        &self,
        config: &ClientConfig,
        code: &str,
        redirect_uri: &str,
    ) -> AuthResult<OAuthToken> {
        debug!("Exchanging authorization code at {}", config.token_url);
        let form = [
            ("client_id", config.client_id.as_str()),
            ("client_secret", config.client_secret.as_str()),
            ("code", code),
            ("grant_type", "authorization_code"),
            ("redirect_uri", redirect_uri),
        ];

        self.post_form(&config.token_url, &form)
            .await
            .map(TokenResponse::into_token)
            .map_err(AuthError::TokenExchange)
    }

    async fn refresh(&self, config: &ClientConfig, refresh_token: &str) -> AuthResult<OAuthToken> {
        debug!("Refreshing token at {}", config.token_url);
        let form = [
            ("client_id", config.client_id.as_str()),
            ("client_secret", config.client_secret.as_str()),
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ];

        self.post_form(&config.token_url, &form)
            .await
            .map(TokenResponse::into_token)
            .map_err(AuthError::RefreshFailed)
    }
}
