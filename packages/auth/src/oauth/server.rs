// ABOUTME: OAuth callback server for handling authorization redirects
// ABOUTME: Binds an ephemeral loopback port, checks the state token, and hands back one authorization code

use std::{collections::HashMap, net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    extract::{Query, State},
    http::{StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    Router,
};
use tokio::{
    net::TcpListener,
    sync::{oneshot, Mutex},
    task::JoinHandle,
};
use tracing::{debug, error, info, warn};

use crate::error::{AuthError, AuthResult};

/// State shared with the request handler for one flow
struct CallbackState {
    expected_state: String,
    code_tx: Mutex<Option<oneshot::Sender<String>>>,
}

/// Local callback listener for a single authorization flow
///
/// Serving starts as soon as the server is created and stops on
/// [`CallbackServer::shutdown`] or when the server is dropped.
pub struct CallbackServer {
    addr: SocketAddr,
    code_rx: Option<oneshot::Receiver<String>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl CallbackServer {
    /// Bind `127.0.0.1` on an OS-assigned port and start serving
    pub async fn start(expected_state: impl Into<String>) -> AuthResult<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| AuthError::CallbackServer(format!("Failed to bind loopback port: {}", e)))?;
        let addr = listener
            .local_addr()
            .map_err(|e| AuthError::CallbackServer(format!("Failed to read bound address: {}", e)))?;

        let (code_tx, code_rx) = oneshot::channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let state = Arc::new(CallbackState {
            expected_state: expected_state.into(),
            code_tx: Mutex::new(Some(code_tx)),
        });
        let app = Router::new().fallback(handle_callback).with_state(state);

        let handle = tokio::spawn(async move {
            let server = axum::serve(listener, app).with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            });
            if let Err(e) = server.await {
                error!("Callback server error: {}", e);
            }
            debug!("Callback server on {} stopped", addr);
        });

        info!("📡 Waiting for OAuth callback on {}", addr);

        Ok(Self {
            addr,
            code_rx: Some(code_rx),
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    /// Address the server is bound to
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Redirect URL to register with the authorization request
    pub fn redirect_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Wait for the authorization code.
    ///
    /// Blocks until a callback with a matching state and a code arrives. With
    /// `timeout` set, gives up after that long.
    pub async fn wait_for_code(&mut self, timeout: Option<Duration>) -> AuthResult<String> {
        let rx = self
            .code_rx
            .take()
            .ok_or_else(|| AuthError::CallbackServer("Authorization code already taken".to_string()))?;

        let received = match timeout {
            Some(limit) => tokio::time::timeout(limit, rx)
                .await
                .map_err(|_| AuthError::CallbackTimeout(limit))?,
            None => rx.await,
        };

        received.map_err(|_| {
            AuthError::CallbackServer("Callback server stopped before a code arrived".to_string())
        })
    }

    /// Stop serving and wait for in-flight responses to finish
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                error!("Callback server task failed: {}", e);
            }
        }
    }
}

impl Drop for CallbackServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

async fn handle_callback(
    State(state): State<Arc<CallbackState>>,
    uri: Uri,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if uri.path() == "/favicon.ico" {
        return StatusCode::NOT_FOUND.into_response();
    }

    if params.get("state").map(String::as_str) != Some(state.expected_state.as_str()) {
        warn!("State doesn't match: request = {}", uri);
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    if let Some(code) = params.get("code").filter(|c| !c.is_empty()) {
        match state.code_tx.lock().await.take() {
            Some(tx) => {
                if tx.send(code.clone()).is_err() {
                    warn!("Authorization code arrived after the flow stopped waiting");
                }
                info!("✅ Received authorization code");
            }
            None => debug!("Authorization code already delivered, ignoring repeat callback"),
        }
        return Html(SUCCESS_HTML).into_response();
    }

    warn!("no code");
    StatusCode::INTERNAL_SERVER_ERROR.into_response()
}

const SUCCESS_HTML: &str = r#"<html>
<head>
    <title>Authorized</title>
    <style>
        body { font-family: system-ui, -apple-system, sans-serif; max-width: 600px; margin: 100px auto; text-align: center; }
        h1 { color: #22c55e; }
        p { color: #64748b; }
    </style>
</head>
<body>
    <h1>Success</h1>
    <p>Authorized. You can now close this tab and return to your terminal.</p>
</body>
</html>"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_redirect_url_uses_loopback() {
        let server = CallbackServer::start("st1").await.unwrap();
        assert!(server.local_addr().ip().is_loopback());
        assert_ne!(server.local_addr().port(), 0);
        assert_eq!(
            server.redirect_url(),
            format!("http://127.0.0.1:{}", server.local_addr().port())
        );
        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_delivers_code_with_matching_state() {
        let mut server = CallbackServer::start("st1").await.unwrap();
        let url = format!("{}/?state=st1&code=abc123", server.redirect_url());

        let response = reqwest::get(&url).await.unwrap();
        assert_eq!(response.status(), 200);
        assert!(response.text().await.unwrap().contains("Success"));

        let code = server.wait_for_code(None).await.unwrap();
        assert_eq!(code, "abc123");
        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_wait_times_out() {
        let mut server = CallbackServer::start("st1").await.unwrap();
        let err = server
            .wait_for_code(Some(Duration::from_millis(50)))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::CallbackTimeout(_)));
        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_releases_port() {
        let server = CallbackServer::start("st1").await.unwrap();
        let addr = server.local_addr();
        server.shutdown().await;

        assert!(TcpListener::bind(addr).await.is_ok());
    }
}
