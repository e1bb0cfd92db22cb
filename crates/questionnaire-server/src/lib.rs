// crates/questionnaire-server/src/lib.rs
// ============================================================================
// Module: Questionnaire Server Library
// Description: HTTP surface for answers and documents.
// Purpose: Mount CRUD handlers behind the If-Match precondition guard.
// Dependencies: axum, questionnaire-config, questionnaire-precondition, tokio
// ============================================================================

//! ## Overview
//! `questionnaire-server` wires the precondition engine into an axum router.
//! Guarded write routes pass through [`middleware::precondition_guard`] before
//! any body is read; the in-memory store doubles as the current-ETag
//! collaborator. Every guard decision is recorded through an audit sink.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod etag;
pub mod handlers;
pub mod middleware;
pub mod server;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::FileAuditSink;
pub use audit::MemoryAuditSink;
pub use audit::NoopAuditSink;
pub use audit::PreconditionAuditEvent;
pub use audit::PreconditionAuditEventParams;
pub use audit::PreconditionAuditSink;
pub use audit::StderrAuditSink;
pub use etag::EtagError;
pub use etag::entity_etag;
pub use handlers::ProblemReply;
pub use middleware::ETAG_LOOKUP_FAILED;
pub use server::AppState;
pub use server::QuestionnaireServer;
pub use server::ServerError;
pub use server::build_router;
pub use store::AnswerRecord;
pub use store::DocumentList;
pub use store::DocumentRecord;
pub use store::DocumentSummary;
pub use store::InMemoryQuestionnaireStore;
pub use store::StoreError;
