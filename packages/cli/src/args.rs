// ABOUTME: Command-line arguments for strava-auth
// ABOUTME: Credential, cache, and endpoint flags with environment fallbacks, plus subcommands

use std::{path::PathBuf, time::Duration};

use clap::{ArgAction, Args, Parser, Subcommand};
use strava_auth::AuthSettings;
use strava_auth_config::{constants, defaults};

#[derive(Parser, Debug)]
#[command(name = "strava-auth")]
#[command(about = "Authorize against Strava once and reuse the cached OAuth token")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub auth: AuthArgs,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Obtain a token, from the cache or through the browser
    Login {
        #[command(flatten)]
        scopes: ScopeArgs,

        /// Print the access token to stdout
        #[arg(long)]
        print_token: bool,
    },

    /// Show whether a cached token exists for the configuration
    Status {
        #[command(flatten)]
        scopes: ScopeArgs,
    },

    /// Delete the cached token for the configuration
    Clear {
        #[command(flatten)]
        scopes: ScopeArgs,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ScopeArgs {
    /// Scopes to request, in order (repeat or comma-separate)
    #[arg(long = "scope", value_delimiter = ',', default_values_t = default_scopes())]
    pub scopes: Vec<String>,
}

impl ScopeArgs {
    pub fn as_strs(&self) -> Vec<&str> {
        self.scopes.iter().map(String::as_str).collect()
    }
}

fn default_scopes() -> Vec<String> {
    defaults::DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect()
}

#[derive(Args, Debug, Clone)]
pub struct AuthArgs {
    /// OAuth 2.0 Client ID. If non-empty, overrides --strava-clientid-file
    #[arg(long = "strava-clientid", env = constants::STRAVA_CLIENT_ID, default_value = "", hide_env_values = true)]
    pub client_id: String,

    /// Name of a file containing just the project's OAuth 2.0 Client ID
    #[arg(long = "strava-clientid-file", env = constants::STRAVA_CLIENT_ID_FILE, default_value = defaults::CLIENT_ID_FILE)]
    pub client_id_file: PathBuf,

    /// OAuth 2.0 Client Secret. If non-empty, overrides --strava-secret-file
    #[arg(long = "strava-secret", env = constants::STRAVA_SECRET, default_value = "", hide_env_values = true)]
    pub client_secret: String,

    /// Name of a file containing just the project's OAuth 2.0 Client Secret
    #[arg(long = "strava-secret-file", env = constants::STRAVA_SECRET_FILE, default_value = defaults::CLIENT_SECRET_FILE)]
    pub client_secret_file: PathBuf,

    /// Cache the OAuth 2.0 token
    #[arg(long = "strava-cachetoken", env = constants::STRAVA_CACHE_TOKEN, default_value_t = true, action = ArgAction::Set)]
    pub cache_token: bool,

    /// Directory for cached tokens (defaults to the per-user cache directory)
    #[arg(long, env = constants::STRAVA_CACHE_DIR)]
    pub cache_dir: Option<PathBuf>,

    /// Give up waiting for the browser after this many seconds
    #[arg(long, env = constants::STRAVA_CALLBACK_TIMEOUT_SECS)]
    pub callback_timeout_secs: Option<u64>,

    /// Authorization endpoint
    #[arg(long, env = constants::STRAVA_AUTH_URL, default_value = defaults::AUTH_URL)]
    pub auth_url: String,

    /// Token endpoint
    #[arg(long, env = constants::STRAVA_TOKEN_URL, default_value = defaults::TOKEN_URL)]
    pub token_url: String,
}

impl From<AuthArgs> for AuthSettings {
    fn from(args: AuthArgs) -> Self {
        let mut settings = AuthSettings::default();
        settings.client_id = args.client_id;
        settings.client_id_file = args.client_id_file;
        settings.client_secret = args.client_secret;
        settings.client_secret_file = args.client_secret_file;
        settings.cache_token = args.cache_token;
        settings.cache_dir = args.cache_dir;
        settings.callback_timeout = args.callback_timeout_secs.map(Duration::from_secs);
        settings.auth_url = args.auth_url;
        settings.token_url = args.token_url;
        settings.finalize()
    }
}
