// ABOUTME: Live token source and the authenticated context handed back to callers
// ABOUTME: Refreshes expired tokens through the exchanger and decorates outgoing requests

use std::sync::Arc;

use reqwest::RequestBuilder;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::{
    error::{AuthError, AuthResult},
    oauth::{
        exchange::TokenExchanger,
        types::{ClientConfig, OAuthToken},
    },
};

struct Inner {
    config: ClientConfig,
    exchanger: Arc<dyn TokenExchanger>,
    current: Mutex<OAuthToken>,
}

/// Supplies a currently valid token for one client configuration
///
/// Cloning is cheap; clones share the same current token.
#[derive(Clone)]
pub struct TokenSource {
    inner: Arc<Inner>,
}

impl TokenSource {
    pub fn new(config: ClientConfig, exchanger: Arc<dyn TokenExchanger>, token: OAuthToken) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                exchanger,
                current: Mutex::new(token),
            }),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Return the current token, refreshing it first when it has expired
    ///
    /// Expired tokens without refresh material are returned as they are and
    /// left for the remote API to reject.
    pub async fn token(&self) -> AuthResult<OAuthToken> {
        let mut current = self.inner.current.lock().await;
        if !current.is_expired() {
            return Ok(current.clone());
        }

        let Some(refresh_token) = current.refresh_token.clone() else {
            debug!("Token expired and no refresh token is available");
            return Ok(current.clone());
        };

        info!("Refreshing expired token");
        let mut refreshed = self
            .inner
            .exchanger
            .refresh(&self.inner.config, &refresh_token)
            .await?;
        if refreshed.refresh_token.is_none() {
            refreshed.refresh_token = Some(refresh_token);
        }

        *current = refreshed.clone();
        Ok(refreshed)
    }
}

/// Authenticated context returned by the authorization flow
#[derive(Clone)]
pub struct AuthContext {
    descriptor: String,
    source: TokenSource,
}

impl AuthContext {
    pub fn new(descriptor: impl Into<String>, source: TokenSource) -> Self {
        Self {
            descriptor: descriptor.into(),
            source,
        }
    }

    /// Descriptor the caller supplied when requesting the context
    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }

    pub fn token_source(&self) -> &TokenSource {
        &self.source
    }

    pub async fn token(&self) -> AuthResult<OAuthToken> {
        self.source.token().await
    }

    /// Add the `Authorization` header for the current token to a request
    pub async fn authorize(&self, request: RequestBuilder) -> AuthResult<RequestBuilder> {
        let token = self.source.token().await?;
        if token.access_token.is_empty() {
            return Err(AuthError::RefreshFailed("Token has no access token".to_string()));
        }
        Ok(request.header(reqwest::header::AUTHORIZATION, token.authorization_value()))
    }
}

impl std::fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthContext")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingExchanger {
        refreshes: AtomicUsize,
    }

    #[async_trait]
    impl TokenExchanger for CountingExchanger {
        async fn exchange(&self, _: &ClientConfig, _: &str, _: &str) -> AuthResult<OAuthToken> {
            Err(AuthError::TokenExchange("not used".to_string()))
        }

        async fn refresh(&self, _: &ClientConfig, refresh_token: &str) -> AuthResult<OAuthToken> {
            let n = self.refreshes.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(OAuthToken {
                access_token: format!("refreshed-{}-{}", refresh_token, n),
                refresh_token: None,
                token_type: "Bearer".to_string(),
                expiry: Some(Utc::now() + Duration::hours(6)),
            })
        }
    }

    fn config() -> ClientConfig {
        ClientConfig {
            client_id: "123".to_string(),
            client_secret: "shh".to_string(),
            auth_url: "https://www.strava.com/oauth/authorize".to_string(),
            token_url: "https://www.strava.com/oauth/token".to_string(),
            scopes: vec!["read".to_string()],
        }
    }

    fn source_with(token: OAuthToken) -> (TokenSource, Arc<CountingExchanger>) {
        let exchanger = Arc::new(CountingExchanger {
            refreshes: AtomicUsize::new(0),
        });
        (TokenSource::new(config(), exchanger.clone(), token), exchanger)
    }

    #[tokio::test]
    async fn test_valid_token_is_returned_as_is() {
        let (source, exchanger) = source_with(OAuthToken::bearer("T1"));
        assert_eq!(source.token().await.unwrap().access_token, "T1");
        assert_eq!(exchanger.refreshes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_expired_token_is_refreshed_once() {
        let (source, exchanger) = source_with(OAuthToken {
            access_token: "T1".to_string(),
            refresh_token: Some("R1".to_string()),
            token_type: "Bearer".to_string(),
            expiry: Some(Utc::now() - Duration::minutes(1)),
        });

        let first = source.token().await.unwrap();
        assert_eq!(first.access_token, "refreshed-R1-1");
        assert_eq!(first.refresh_token.as_deref(), Some("R1"));

        let second = source.clone().token().await.unwrap();
        assert_eq!(second, first);
        assert_eq!(exchanger.refreshes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_expired_token_without_refresh_material() {
        let mut token = OAuthToken::bearer("T1");
        token.expiry = Some(Utc::now() - Duration::minutes(1));
        let (source, exchanger) = source_with(token);

        assert_eq!(source.token().await.unwrap().access_token, "T1");
        assert_eq!(exchanger.refreshes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_authorize_sets_bearer_header() {
        let (source, _) = source_with(OAuthToken::bearer("T1"));
        let context = AuthContext::new("strava.ContextOAuth2 token", source);

        let request = context
            .authorize(reqwest::Client::new().get("http://127.0.0.1:1/athlete"))
            .await
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(
            request.headers().get(reqwest::header::AUTHORIZATION).unwrap(),
            "Bearer T1"
        );
        assert_eq!(context.descriptor(), "strava.ContextOAuth2 token");
    }
}
