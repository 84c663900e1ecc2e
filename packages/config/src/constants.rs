// ABOUTME: Environment variable name constants
// ABOUTME: Centralized definitions of all environment variable names used across strava-auth

// Client Credentials
pub const STRAVA_CLIENT_ID: &str = "STRAVA_CLIENT_ID";
pub const STRAVA_CLIENT_ID_FILE: &str = "STRAVA_CLIENT_ID_FILE";
pub const STRAVA_SECRET: &str = "STRAVA_SECRET";
pub const STRAVA_SECRET_FILE: &str = "STRAVA_SECRET_FILE";

// Token Cache
pub const STRAVA_CACHE_TOKEN: &str = "STRAVA_CACHE_TOKEN";
pub const STRAVA_CACHE_DIR: &str = "STRAVA_CACHE_DIR";

// Authorization Flow
pub const STRAVA_CALLBACK_TIMEOUT_SECS: &str = "STRAVA_CALLBACK_TIMEOUT_SECS";
pub const STRAVA_AUTH_URL: &str = "STRAVA_AUTH_URL";
pub const STRAVA_TOKEN_URL: &str = "STRAVA_TOKEN_URL";

// Logging
pub const RUST_LOG: &str = "RUST_LOG";
