// ABOUTME: File-backed token cache keyed by a fingerprint of the client configuration
// ABOUTME: One JSON file per fingerprint under the per-user cache directory, no in-process layer

use sha2::{Digest, Sha256};
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use strava_auth_config::defaults::{CACHE_APP_DIR, CACHE_TOKENS_DIR, TOKEN_FILE_PREFIX};
use tracing::{debug, warn};

use crate::{
    error::{AuthError, AuthResult},
    oauth::types::{ClientConfig, OAuthToken},
};

/// 32-bit cache key derived from client ID, client secret, and joined scopes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheFingerprint(u32);

impl CacheFingerprint {
    /// Compute the fingerprint of a configuration.
    ///
    /// Scopes are hashed in their given order, so reordering them yields a
    /// different configuration.
    pub fn of(config: &ClientConfig) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(config.client_id.as_bytes());
        hasher.update([0u8]);
        hasher.update(config.client_secret.as_bytes());
        hasher.update([0u8]);
        hasher.update(config.joined_scopes().as_bytes());
        let digest = hasher.finalize();

        Self(u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]))
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for CacheFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Token cache rooted at a single directory
#[derive(Debug, Clone)]
pub struct TokenCache {
    dir: PathBuf,
    enabled: bool,
}

impl TokenCache {
    /// Open the cache in the per-user cache directory, or in `dir` when given.
    ///
    /// Missing directories are created with owner-only permissions; an
    /// existing directory keeps its mode. Failure to resolve or create it is
    /// an error; there is no fallback location.
    pub fn open(dir: Option<PathBuf>, enabled: bool) -> AuthResult<Self> {
        let dir = match dir {
            Some(dir) => dir,
            None => Self::default_dir()?,
        };

        create_private_dir(&dir).map_err(|e| {
            AuthError::Storage(format!(
                "Failed getting or making cache dir {}: {}",
                dir.display(),
                e
            ))
        })?;

        Ok(Self { dir, enabled })
    }

    /// `<user cache dir>/strava-auth/OAuthTokens`
    pub fn default_dir() -> AuthResult<PathBuf> {
        let cache_dir = dirs::cache_dir().ok_or_else(|| {
            AuthError::Storage("Could not determine user cache directory".to_string())
        })?;
        Ok(cache_dir.join(CACHE_APP_DIR).join(CACHE_TOKENS_DIR))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Compute the fingerprint of a configuration
    pub fn fingerprint(config: &ClientConfig) -> CacheFingerprint {
        CacheFingerprint::of(config)
    }

    /// Path of the cache file for a fingerprint
    pub fn entry_path(&self, fingerprint: CacheFingerprint) -> PathBuf {
        let name = format!("{}{}", TOKEN_FILE_PREFIX, fingerprint);
        self.dir.join(urlencoding::encode(&name).as_ref())
    }

    /// Load the cached token for a fingerprint.
    ///
    /// Returns `None` when caching is disabled, the entry is missing, or it
    /// cannot be read or decoded.
    pub fn load(&self, fingerprint: CacheFingerprint) -> Option<OAuthToken> {
        if !self.enabled {
            debug!("Token caching disabled, skipping cache lookup");
            return None;
        }

        let path = self.entry_path(fingerprint);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!("No cached token at {}: {}", path.display(), e);
                return None;
            }
        };

        match serde_json::from_slice::<OAuthToken>(&bytes) {
            Ok(token) => Some(token),
            Err(e) => {
                warn!("Ignoring unreadable cached token {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Store a token for a fingerprint. Failures are logged and otherwise ignored.
    pub fn store(&self, fingerprint: CacheFingerprint, token: &OAuthToken) {
        if !self.enabled {
            return;
        }

        let path = self.entry_path(fingerprint);
        match self.write_entry(&path, token) {
            Ok(()) => debug!("Saved token to {}", path.display()),
            Err(e) => warn!("Failed to cache oauth token at {}: {}", path.display(), e),
        }
    }

    /// Delete the cached token for a fingerprint. Returns whether an entry existed.
    pub fn remove(&self, fingerprint: CacheFingerprint) -> AuthResult<bool> {
        let path = self.entry_path(fingerprint);
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(AuthError::Storage(format!(
                "Failed to remove {}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn write_entry(&self, path: &Path, token: &OAuthToken) -> AuthResult<()> {
        let json = serde_json::to_vec(token)?;
        let tmp = path.with_extension("tmp");

        // A stale temp file may carry a wider mode; start from scratch
        let _ = fs::remove_file(&tmp);
        if let Err(e) = write_private_file(&tmp, &json) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }

        if let Err(e) = fs::rename(&tmp, path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }
}

/// Create the file owner-only (Unix) before any token bytes reach it
fn write_private_file(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(contents)?;
    file.sync_all()
}

/// Create missing directories owner-only (Unix); existing ones are left alone
fn create_private_dir(dir: &Path) -> std::io::Result<()> {
    if dir.is_dir() {
        return Ok(());
    }

    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder.create(dir)
}
