// ABOUTME: OAuth module providing the local authorization code flow
// ABOUTME: Includes the token cache, callback server, token exchange, browser opener, and orchestrator

pub mod browser;
pub mod cache;
pub mod exchange;
pub mod flow;
pub mod server;
pub mod token_source;
pub mod types;

pub use browser::{NoopOpener, SystemBrowser, UrlOpener};
pub use cache::{CacheFingerprint, TokenCache};
pub use exchange::{HttpTokenExchanger, TokenExchanger};
pub use flow::{get_oauth_context, OAuthFlow};
pub use server::CallbackServer;
pub use token_source::{AuthContext, TokenSource};
pub use types::{ClientConfig, OAuthToken};
