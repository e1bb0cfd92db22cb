// crates/questionnaire-server/src/server.rs
// ============================================================================
// Module: Questionnaire Server
// Description: Router assembly and HTTP serving.
// Purpose: Mount handlers under the API prefix with guard, CORS, and limits.
// Dependencies: axum, questionnaire-config, tokio, tower-http
// ============================================================================

//! ## Overview
//! [`build_router`] mounts every route under the configured API prefix.
//! Guarded write routes share a route layer running
//! [`crate::middleware::precondition_guard`]; `POST /documents` is mounted
//! outside that layer because creation has no prior representation. CORS
//! allows `Content-Type` and `If-Match` request headers and exposes the full
//! ETag header family.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::future::Future;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderName;
use axum::http::HeaderValue;
use axum::http::Method;
use axum::http::header::CONTENT_TYPE;
use axum::http::header::IF_MATCH;
use axum::middleware;
use axum::routing::get;
use axum::routing::put;
use questionnaire_config::AuditConfig;
use questionnaire_config::CorsConfig;
use questionnaire_config::QuestionnaireConfig;
use questionnaire_config::ServerConfig;
use questionnaire_precondition::PreconditionGuard;
use questionnaire_precondition::exposed_header_names;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::cors::AllowHeaders;
use tower_http::cors::AllowMethods;
use tower_http::cors::AllowOrigin;
use tower_http::cors::Any;
use tower_http::cors::CorsLayer;
use tower_http::cors::ExposeHeaders;

use crate::audit::FileAuditSink;
use crate::audit::NoopAuditSink;
use crate::audit::PreconditionAuditSink;
use crate::audit::StderrAuditSink;
use crate::handlers;
use crate::middleware::precondition_guard;
use crate::store::InMemoryQuestionnaireStore;

// ============================================================================
// SECTION: State
// ============================================================================

/// Shared handler and middleware state.
#[derive(Clone)]
pub struct AppState {
    /// Questionnaire store and current-ETag collaborator.
    pub store: InMemoryQuestionnaireStore,
    /// Precondition guard.
    pub guard: Arc<PreconditionGuard>,
    /// Audit sink for guard decisions.
    pub audit: Arc<dyn PreconditionAuditSink>,
}

impl AppState {
    /// Builds state with the standard route rules.
    #[must_use]
    pub fn new(store: InMemoryQuestionnaireStore, audit: Arc<dyn PreconditionAuditSink>) -> Self {
        Self {
            store,
            guard: Arc::new(PreconditionGuard::default()),
            audit,
        }
    }
}

// ============================================================================
// SECTION: Server
// ============================================================================

/// Questionnaire HTTP server instance.
pub struct QuestionnaireServer {
    /// Server configuration.
    config: QuestionnaireConfig,
    /// Shared state.
    state: AppState,
}

impl QuestionnaireServer {
    /// Builds a server from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] when configuration or initialization fails.
    pub fn from_config(config: QuestionnaireConfig) -> Result<Self, ServerError> {
        let audit = build_audit_sink(&config.audit)?;
        Self::with_audit(config, audit)
    }

    /// Builds a server with an explicit audit sink.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] when configuration or initialization fails.
    pub fn with_audit(
        config: QuestionnaireConfig,
        audit: Arc<dyn PreconditionAuditSink>,
    ) -> Result<Self, ServerError> {
        config.validate().map_err(|err| ServerError::Config(err.to_string()))?;
        let store = InMemoryQuestionnaireStore::new();
        if config.store.seed_demo {
            store.seed_demo().map_err(|err| ServerError::Init(err.to_string()))?;
        }
        Ok(Self {
            config,
            state: AppState::new(store, audit),
        })
    }

    /// Returns the shared state.
    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    /// Builds the application router.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Config`] when CORS settings cannot be encoded.
    pub fn router(&self) -> Result<Router, ServerError> {
        build_router(self.state.clone(), &self.config.server)
    }

    /// Binds the configured address and serves until interrupted.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] when binding or serving fails.
    pub async fn serve(self) -> Result<(), ServerError> {
        let addr =
            self.config.server.bind_addr().map_err(|err| ServerError::Config(err.to_string()))?;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|_| ServerError::Transport("http bind failed".to_string()))?;
        self.serve_with_listener(listener, shutdown_signal()).await
    }

    /// Serves on an existing listener until `shutdown` resolves.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] when the router cannot be built or serving fails.
    pub async fn serve_with_listener<F>(
        self,
        listener: TcpListener,
        shutdown: F,
    ) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router()?;
        axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|_| ServerError::Transport("http server failed".to_string()))
    }
}

// ============================================================================
// SECTION: Router
// ============================================================================

/// Builds the application router for the given state and server settings.
///
/// # Errors
///
/// Returns [`ServerError::Config`] when CORS settings cannot be encoded.
pub fn build_router(state: AppState, server: &ServerConfig) -> Result<Router, ServerError> {
    let guarded = Router::new()
        .route(
            "/response-sets/{set}/answers/{question}",
            get(handlers::get_answer)
                .post(handlers::put_answer)
                .patch(handlers::put_answer)
                .delete(handlers::delete_answer),
        )
        .route("/documents/order", put(handlers::reorder_documents))
        .route("/documents/reorder", put(handlers::reorder_documents))
        .route(
            "/documents/{id}",
            get(handlers::get_document)
                .patch(handlers::update_document)
                .delete(handlers::delete_document),
        )
        .route("/documents/{id}/content", get(handlers::get_content).put(handlers::put_content))
        .route_layer(middleware::from_fn_with_state(state.clone(), precondition_guard));
    let open = Router::new().route(
        "/documents",
        get(handlers::list_documents).post(handlers::create_document),
    );
    let api = guarded.merge(open).with_state(state);

    let prefix = server.api_prefix.as_str();
    let app = if prefix == "/" { api } else { Router::new().nest(prefix, api) };
    Ok(app.layer(DefaultBodyLimit::max(server.max_body_bytes)).layer(cors_layer(&server.cors)?))
}

/// Builds the CORS layer.
fn cors_layer(config: &CorsConfig) -> Result<CorsLayer, ServerError> {
    let expose = exposed_header_names()
        .into_iter()
        .map(|name| HeaderName::from_bytes(name.as_bytes()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| ServerError::Config(format!("invalid expose header: {err}")))?;
    let origin = if config.allows_any_origin() {
        AllowOrigin::from(Any)
    } else {
        let origins = config
            .allowed_origins
            .iter()
            .map(|origin| HeaderValue::from_str(origin.trim()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| ServerError::Config(format!("invalid cors origin: {err}")))?;
        AllowOrigin::list(origins)
    };
    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([CONTENT_TYPE, IF_MATCH]))
        .expose_headers(ExposeHeaders::list(expose))
        .max_age(Duration::from_secs(config.max_age_secs)))
}

/// Builds the audit sink from configuration.
fn build_audit_sink(config: &AuditConfig) -> Result<Arc<dyn PreconditionAuditSink>, ServerError> {
    if !config.enabled {
        return Ok(Arc::new(NoopAuditSink));
    }
    match &config.path {
        Some(path) => {
            let sink = FileAuditSink::new(Path::new(path.trim()))
                .map_err(|err| ServerError::Init(format!("audit log open failed: {err}")))?;
            Ok(Arc::new(sink))
        }
        None => Ok(Arc::new(StderrAuditSink)),
    }
}

/// Resolves when the process receives Ctrl-C.
async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Questionnaire server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Configuration errors.
    #[error("config error: {0}")]
    Config(String),
    /// Initialization errors.
    #[error("init error: {0}")]
    Init(String),
    /// Transport errors.
    #[error("transport error: {0}")]
    Transport(String),
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions."
    )]

    use std::sync::Arc;

    use questionnaire_config::QuestionnaireConfig;

    use super::QuestionnaireServer;
    use super::build_audit_sink;
    use crate::audit::MemoryAuditSink;

    #[test]
    fn seeded_server_has_demo_documents() {
        let mut config = QuestionnaireConfig::default();
        config.store.seed_demo = true;
        let server = QuestionnaireServer::with_audit(config, Arc::new(MemoryAuditSink::new()))
            .unwrap();
        let list = server.state().store.list_documents().unwrap();
        assert_eq!(list.documents.len(), 2);
        assert!(server.router().is_ok());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = QuestionnaireConfig::default();
        config.server.max_body_bytes = 0;
        let result = QuestionnaireServer::with_audit(config, Arc::new(MemoryAuditSink::new()));
        assert!(result.is_err());
    }

    #[test]
    fn root_prefix_merges_routes() {
        let mut config = QuestionnaireConfig::default();
        config.server.api_prefix = "/".to_string();
        let server = QuestionnaireServer::with_audit(config, Arc::new(MemoryAuditSink::new()))
            .unwrap();
        assert!(server.router().is_ok());
    }

    #[test]
    fn file_audit_sink_is_opened_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = QuestionnaireConfig::default();
        config.audit.path = Some(dir.path().join("audit.jsonl").display().to_string());
        assert!(build_audit_sink(&config.audit).is_ok());
        assert!(dir.path().join("audit.jsonl").exists());
    }
}
