// ABOUTME: Default values for strava-auth settings
// ABOUTME: Provider endpoints, credential file names, and cache naming

/// Strava authorization endpoint
pub const AUTH_URL: &str = "https://www.strava.com/oauth/authorize";

/// Strava token endpoint
pub const TOKEN_URL: &str = "https://www.strava.com/oauth/token";

pub const CLIENT_ID_FILE: &str = "clientid.dat";
pub const CLIENT_SECRET_FILE: &str = "clientsecret.dat";

/// Application directory under the per-user cache dir
pub const CACHE_APP_DIR: &str = "strava-auth";
pub const CACHE_TOKENS_DIR: &str = "OAuthTokens";

/// Prefix of every cached token file name
pub const TOKEN_FILE_PREFIX: &str = "strava-auth-tok";

/// Scopes requested by the CLI when none are given
pub const DEFAULT_SCOPES: &[&str] = &["read", "activity:read"];
