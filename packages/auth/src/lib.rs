// ABOUTME: strava-auth library providing a local OAuth 2.0 authorization code flow
// ABOUTME: Caches tokens per client configuration so later runs skip the browser step

pub mod error;
pub mod oauth;
pub mod settings;

// Re-export main types
pub use error::{AuthError, AuthResult};
pub use oauth::{
    get_oauth_context, AuthContext, CacheFingerprint, CallbackServer, ClientConfig,
    HttpTokenExchanger, NoopOpener, OAuthFlow, OAuthToken, SystemBrowser, TokenCache,
    TokenExchanger, TokenSource, UrlOpener,
};
pub use settings::AuthSettings;
