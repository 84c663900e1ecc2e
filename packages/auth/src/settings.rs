// ABOUTME: Explicit settings for the authorization flow, replacing process-wide flags
// ABOUTME: Credential values or files, cache toggle and location, endpoints, and callback timeout

use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use strava_auth_config::{constants, defaults};

use crate::{
    error::{AuthError, AuthResult},
    oauth::types::ClientConfig,
};

/// Settings for one application using the authorization flow
///
/// A settings value must be [finalized](AuthSettings::finalize) before the
/// flow accepts it, which marks the end of flag or environment parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSettings {
    /// OAuth 2.0 client ID. If non-empty, overrides `client_id_file`
    pub client_id: String,
    /// File containing just the client ID
    pub client_id_file: PathBuf,
    /// OAuth 2.0 client secret. If non-empty, overrides `client_secret_file`
    pub client_secret: String,
    /// File containing just the client secret
    pub client_secret_file: PathBuf,
    /// Whether tokens are read from and written to the cache
    pub cache_token: bool,
    /// Cache directory override; the per-user cache directory when `None`
    pub cache_dir: Option<PathBuf>,
    /// Upper bound on waiting for the browser callback; unbounded when `None`
    pub callback_timeout: Option<Duration>,
    pub auth_url: String,
    pub token_url: String,
    finalized: bool,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_id_file: PathBuf::from(defaults::CLIENT_ID_FILE),
            client_secret: String::new(),
            client_secret_file: PathBuf::from(defaults::CLIENT_SECRET_FILE),
            cache_token: true,
            cache_dir: None,
            callback_timeout: None,
            auth_url: defaults::AUTH_URL.to_string(),
            token_url: defaults::TOKEN_URL.to_string(),
            finalized: false,
        }
    }
}

impl AuthSettings {
    /// Build finalized settings from the environment, falling back to defaults
    pub fn from_env() -> AuthResult<Self> {
        let mut settings = Self::default();

        if let Some(v) = env_var(constants::STRAVA_CLIENT_ID) {
            settings.client_id = v;
        }
        if let Some(v) = env_var(constants::STRAVA_CLIENT_ID_FILE) {
            settings.client_id_file = PathBuf::from(v);
        }
        if let Some(v) = env_var(constants::STRAVA_SECRET) {
            settings.client_secret = v;
        }
        if let Some(v) = env_var(constants::STRAVA_SECRET_FILE) {
            settings.client_secret_file = PathBuf::from(v);
        }
        if let Some(v) = env_var(constants::STRAVA_CACHE_TOKEN) {
            settings.cache_token = v.parse::<bool>().map_err(|_| {
                AuthError::Configuration(format!(
                    "{} must be true or false, got {:?}",
                    constants::STRAVA_CACHE_TOKEN,
                    v
                ))
            })?;
        }
        if let Some(v) = env_var(constants::STRAVA_CACHE_DIR) {
            settings.cache_dir = Some(PathBuf::from(v));
        }
        if let Some(v) = env_var(constants::STRAVA_CALLBACK_TIMEOUT_SECS) {
            let secs = v.parse::<u64>().map_err(|_| {
                AuthError::Configuration(format!(
                    "{} must be a number of seconds, got {:?}",
                    constants::STRAVA_CALLBACK_TIMEOUT_SECS,
                    v
                ))
            })?;
            settings.callback_timeout = Some(Duration::from_secs(secs));
        }
        if let Some(v) = env_var(constants::STRAVA_AUTH_URL) {
            settings.auth_url = v;
        }
        if let Some(v) = env_var(constants::STRAVA_TOKEN_URL) {
            settings.token_url = v;
        }

        Ok(settings.finalize())
    }

    /// Mark parsing as complete
    pub fn finalize(mut self) -> Self {
        self.finalized = true;
        self
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Resolve credentials and build the client configuration for `scopes`
    ///
    /// An unreadable credential file is a configuration error.
    pub fn client_config(&self, scopes: &[&str]) -> AuthResult<ClientConfig> {
        Ok(ClientConfig {
            client_id: value_or_file_contents(&self.client_id, &self.client_id_file)?,
            client_secret: value_or_file_contents(&self.client_secret, &self.client_secret_file)?,
            auth_url: self.auth_url.clone(),
            token_url: self.token_url.clone(),
            scopes: scopes.iter().map(|s| s.to_string()).collect(),
        })
    }
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

/// `value` when non-empty, otherwise the trimmed contents of `file`
pub fn value_or_file_contents(value: &str, file: &Path) -> AuthResult<String> {
    if !value.is_empty() {
        return Ok(value.to_string());
    }

    let contents = fs::read_to_string(file).map_err(|e| {
        AuthError::Configuration(format!("Error reading {}: {}", file.display(), e))
    })?;
    Ok(contents.trim().to_string())
}
