// crates/questionnaire-server/tests/common/mod.rs
// ============================================================================
// Module: Server Test Harness
// Description: Spawns the questionnaire server on an ephemeral port.
// Purpose: Drive the HTTP surface end to end with reqwest.
// ============================================================================

#![allow(
    dead_code,
    clippy::expect_used,
    clippy::unwrap_used,
    reason = "Test helpers are selectively used across suites."
)]

use std::sync::Arc;

use questionnaire_config::QuestionnaireConfig;
use questionnaire_server::InMemoryQuestionnaireStore;
use questionnaire_server::MemoryAuditSink;
use questionnaire_server::QuestionnaireServer;
use reqwest::Method;
use reqwest::RequestBuilder;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Running server bound to `127.0.0.1:0`.
pub struct TestServer {
    /// Base URL including the API prefix.
    pub base: String,
    /// Shared store, for seeding and inspection.
    pub store: InMemoryQuestionnaireStore,
    /// Recorded audit events.
    pub audit: Arc<MemoryAuditSink>,
    /// HTTP client.
    pub client: reqwest::Client,
    /// Shutdown trigger.
    shutdown: Option<oneshot::Sender<()>>,
    /// Server task.
    handle: Option<JoinHandle<()>>,
}

impl TestServer {
    /// Spawns a server with default configuration.
    pub async fn spawn() -> Self {
        Self::spawn_with(QuestionnaireConfig::default()).await
    }

    /// Spawns a server with the provided configuration.
    pub async fn spawn_with(config: QuestionnaireConfig) -> Self {
        let prefix = config.server.api_prefix.clone();
        let audit = Arc::new(MemoryAuditSink::new());
        let server = QuestionnaireServer::with_audit(config, audit.clone()).expect("server init");
        let store = server.state().store.clone();
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");
        let (tx, rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            let shutdown = async move {
                let _ = rx.await;
            };
            server.serve_with_listener(listener, shutdown).await.expect("server run");
        });
        let base = if prefix == "/" {
            format!("http://{addr}")
        } else {
            format!("http://{addr}{prefix}")
        };
        Self {
            base,
            store,
            audit,
            client: reqwest::Client::new(),
            shutdown: Some(tx),
            handle: Some(handle),
        }
    }

    /// Builds a request for a path relative to the API prefix.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, format!("{}{path}", self.base))
    }

    /// Builds a JSON write request carrying an If-Match header.
    pub fn write(&self, method: Method, path: &str, if_match: &str, body: &str) -> RequestBuilder {
        self.request(method, path)
            .header("content-type", "application/json")
            .header("if-match", if_match)
            .body(body.to_string())
    }

    /// Stops the server and waits for it to exit.
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle.await.expect("server task join");
        }
    }
}

/// Returns a header value as a string, or an empty string when absent.
pub fn header(response: &reqwest::Response, name: &str) -> String {
    response
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}
