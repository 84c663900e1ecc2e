// ABOUTME: Best-effort browser launching for the authorization URL
// ABOUTME: Tries known launcher executables in order; a failure never stops the flow

use tracing::debug;

use crate::error::{AuthError, AuthResult};

/// Launchers tried by [`SystemBrowser`], in order
pub const DEFAULT_LAUNCHERS: &[&str] = &["xdg-open", "google-chrome", "open"];

/// Opens a URL for the user
pub trait UrlOpener: Send + Sync {
    fn open(&self, url: &str) -> AuthResult<()>;
}

/// Opens URLs with the first launcher that succeeds
#[derive(Debug, Clone)]
pub struct SystemBrowser {
    launchers: Vec<String>,
}

impl Default for SystemBrowser {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemBrowser {
    pub fn new() -> Self {
        Self::with_launchers(DEFAULT_LAUNCHERS.iter().map(|s| s.to_string()).collect())
    }

    pub fn with_launchers(launchers: Vec<String>) -> Self {
        Self { launchers }
    }

    pub fn launchers(&self) -> &[String] {
        &self.launchers
    }
}

impl UrlOpener for SystemBrowser {
    fn open(&self, url: &str) -> AuthResult<()> {
        for launcher in &self.launchers {
            match open::with_detached(url, launcher.as_str()) {
                Ok(()) => return Ok(()),
                Err(e) => debug!("Launcher {} failed: {}", launcher, e),
            }
        }
        Err(AuthError::BrowserOpen(format!(
            "none of [{}] could open the URL",
            self.launchers.join(", ")
        )))
    }
}

/// Never opens anything; the user visits the logged URL by hand
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopOpener;

impl UrlOpener for NoopOpener {
    fn open(&self, _url: &str) -> AuthResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_launcher_order() {
        let browser = SystemBrowser::default();
        assert_eq!(browser.launchers(), ["xdg-open", "google-chrome", "open"]);
    }

    #[test]
    fn test_all_launchers_failing_is_an_error() {
        let browser = SystemBrowser::with_launchers(vec![
            "strava-auth-no-such-launcher-1".to_string(),
            "strava-auth-no-such-launcher-2".to_string(),
        ]);
        let err = browser.open("http://127.0.0.1:1/").unwrap_err();
        assert!(matches!(err, AuthError::BrowserOpen(_)));
    }

    #[test]
    fn test_noop_opener_succeeds() {
        assert!(NoopOpener.open("http://127.0.0.1:1/").is_ok());
    }
}
