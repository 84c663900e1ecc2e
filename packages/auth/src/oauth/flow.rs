// ABOUTME: Authorization flow orchestrating cache lookup, browser consent, and code exchange
// ABOUTME: Returns an authenticated context backed by a cached or freshly exchanged token

use std::{fmt::Display, sync::Arc};

use tracing::{debug, info, warn};
use url::Url;

use crate::{
    error::{AuthError, AuthResult},
    oauth::{
        browser::{SystemBrowser, UrlOpener},
        cache::TokenCache,
        exchange::{HttpTokenExchanger, TokenExchanger},
        server::CallbackServer,
        token_source::{AuthContext, TokenSource},
        types::{ClientConfig, OAuthToken},
    },
    settings::AuthSettings,
};

/// Orchestrates the local authorization code flow
pub struct OAuthFlow {
    settings: AuthSettings,
    exchanger: Arc<dyn TokenExchanger>,
    opener: Arc<dyn UrlOpener>,
}

impl OAuthFlow {
    /// Flow with the HTTP token exchanger and the system browser
    pub fn new(settings: AuthSettings) -> AuthResult<Self> {
        Ok(Self {
            settings,
            exchanger: Arc::new(HttpTokenExchanger::new()?),
            opener: Arc::new(SystemBrowser::new()),
        })
    }

    pub fn with_exchanger(mut self, exchanger: Arc<dyn TokenExchanger>) -> Self {
        self.exchanger = exchanger;
        self
    }

    pub fn with_opener(mut self, opener: Arc<dyn UrlOpener>) -> Self {
        self.opener = opener;
        self
    }

    pub fn settings(&self) -> &AuthSettings {
        &self.settings
    }

    /// Open the token cache described by the settings
    pub fn cache(&self) -> AuthResult<TokenCache> {
        TokenCache::open(self.settings.cache_dir.clone(), self.settings.cache_token)
    }

    /// Return an authenticated context for `scopes`.
    ///
    /// `descriptor` names the context the caller will use the token for; its
    /// string form must contain `"token"`. A cached token for the same client
    /// ID, secret, and scopes is reused without any network activity.
    /// Otherwise the user authorizes in the browser and the resulting code is
    /// exchanged. An exchange failure ends the flow; the code is single-use.
    pub async fn get_oauth_context(
        &self,
        descriptor: impl Display,
        scopes: &[&str],
    ) -> AuthResult<AuthContext> {
        if !self.settings.is_finalized() {
            return Err(AuthError::Usage(
                "Settings must be finalized before requesting an OAuth context".to_string(),
            ));
        }
        let descriptor = descriptor.to_string();
        if !descriptor.contains("token") {
            return Err(AuthError::Usage(format!(
                "Descriptor {:?} does not name a token-bearing context",
                descriptor
            )));
        }

        let config = self.settings.client_config(scopes)?;
        let token = self.get_token(&config).await?;

        let source = TokenSource::new(config, self.exchanger.clone(), token);
        Ok(AuthContext::new(descriptor, source))
    }

    async fn get_token(&self, config: &ClientConfig) -> AuthResult<OAuthToken> {
        let cache = self.cache()?;
        let fingerprint = TokenCache::fingerprint(config);
        let path = cache.entry_path(fingerprint);

        if let Some(token) = cache.load(fingerprint) {
            info!("Using cached token from {}", path.display());
            return Ok(token);
        }

        let token = self.token_from_web(config).await?;
        cache.store(fingerprint, &token);
        info!("Obtained new token (cache file {})", path.display());
        Ok(token)
    }

    async fn token_from_web(&self, config: &ClientConfig) -> AuthResult<OAuthToken> {
        let state = generate_state();
        let mut server = CallbackServer::start(state.clone()).await?;
        let redirect_url = server.redirect_url();

        let auth_url = build_auth_url(config, &redirect_url, &state)?;
        self.open_in_browser(auth_url.clone());
        info!("Authorize this app at: {}", auth_url);

        let waited = server.wait_for_code(self.settings.callback_timeout).await;
        server.shutdown().await;
        let code = waited?;
        debug!("Got authorization code");

        self.exchanger
            .exchange(config, &code, &redirect_url)
            .await
            .map_err(|e| match e {
                AuthError::TokenExchange(_) => e,
                other => AuthError::TokenExchange(other.to_string()),
            })
    }

    /// Launch on a detached thread; the flow and process exit never wait on it
    fn open_in_browser(&self, url: String) {
        let opener = self.opener.clone();
        std::thread::spawn(move || {
            if let Err(e) = opener.open(&url) {
                warn!("Error opening URL in browser: {}", e);
            }
        });
    }
}

/// Run the flow with the default exchanger and browser
pub async fn get_oauth_context(
    settings: AuthSettings,
    descriptor: impl Display,
    scopes: &[&str],
) -> AuthResult<AuthContext> {
    OAuthFlow::new(settings)?
        .get_oauth_context(descriptor, scopes)
        .await
}

/// Fresh state token for one flow
pub fn generate_state() -> String {
    format!("st{}", nanoid::nanoid!())
}

/// Build the authorization URL with the comma-joined scope string
pub fn build_auth_url(config: &ClientConfig, redirect_url: &str, state: &str) -> AuthResult<String> {
    let mut url = Url::parse(&config.auth_url)
        .map_err(|e| AuthError::Configuration(format!("Invalid auth URL: {}", e)))?;

    url.query_pairs_mut()
        .append_pair("client_id", &config.client_id)
        .append_pair("redirect_uri", redirect_url)
        .append_pair("response_type", "code")
        .append_pair("scope", &config.joined_scopes())
        .append_pair("state", state);

    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config() -> ClientConfig {
        ClientConfig {
            client_id: "123".to_string(),
            client_secret: "shh".to_string(),
            auth_url: "https://www.strava.com/oauth/authorize".to_string(),
            token_url: "https://www.strava.com/oauth/token".to_string(),
            scopes: vec!["read".to_string(), "activity:read".to_string()],
        }
    }

    #[test]
    fn test_build_auth_url() {
        let url = build_auth_url(&config(), "http://127.0.0.1:4321", "stS").unwrap();
        let parsed = Url::parse(&url).unwrap();
        assert_eq!(parsed.host_str(), Some("www.strava.com"));
        assert_eq!(parsed.path(), "/oauth/authorize");

        let pairs: Vec<(String, String)> = parsed.query_pairs().into_owned().collect();
        let keys: Vec<&str> = pairs.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["client_id", "redirect_uri", "response_type", "scope", "state"]);

        let params: HashMap<_, _> = pairs.into_iter().collect();
        assert_eq!(params["client_id"], "123");
        assert_eq!(params["redirect_uri"], "http://127.0.0.1:4321");
        assert_eq!(params["response_type"], "code");
        assert_eq!(params["scope"], "read,activity:read");
        assert_eq!(params["state"], "stS");
    }

    #[test]
    fn test_build_auth_url_rejects_bad_endpoint() {
        let mut config = config();
        config.auth_url = "not a url".to_string();
        let err = build_auth_url(&config, "http://127.0.0.1:1", "st").unwrap_err();
        assert!(matches!(err, AuthError::Configuration(_)));
    }

    #[test]
    fn test_generate_state_is_unique() {
        let a = generate_state();
        let b = generate_state();
        assert!(a.starts_with("st"));
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_unfinalized_settings_are_rejected() {
        let flow = OAuthFlow::new(AuthSettings::default()).unwrap();
        let err = flow.get_oauth_context("ContextOAuth2 token", &["read"]).await.unwrap_err();
        assert!(err.is_usage());
    }

    #[tokio::test]
    async fn test_descriptor_without_token_is_rejected() {
        let flow = OAuthFlow::new(AuthSettings::default().finalize()).unwrap();
        let err = flow.get_oauth_context("ContextAPIKey", &["read"]).await.unwrap_err();
        assert!(err.is_usage());
    }
}
