// crates/questionnaire-server/src/middleware.rs
// ============================================================================
// Module: Precondition Middleware
// Description: Axum adapter for the If-Match precondition guard.
// Purpose: Reject unsafe writes before any request body is read.
// Dependencies: axum, questionnaire-precondition
// ============================================================================

//! ## Overview
//! [`precondition_guard`] is mounted as a route layer on guarded routes. It
//! builds a [`RawCondition`] from the request head only, asks the guard for a
//! decision using the store as the current-ETag collaborator, records exactly
//! one audit event per write request, and either forwards the untouched
//! request or returns the problem response. Reads are forwarded without an
//! audit event. Collaborator failures surface as a 500 with
//! [`ETAG_LOOKUP_FAILED`], never as a precondition outcome.

// ============================================================================
// SECTION: Imports
// ============================================================================

use axum::extract::OriginalUri;
use axum::extract::Request;
use axum::extract::State;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;
use questionnaire_precondition::ProblemResponse;
use questionnaire_precondition::RawCondition;
use questionnaire_precondition::ResourceKind;

use crate::audit::PreconditionAuditEvent;
use crate::audit::PreconditionAuditEventParams;
use crate::handlers::ProblemReply;
use crate::server::AppState;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Problem code for a failed current-ETag lookup.
pub const ETAG_LOOKUP_FAILED: &str = "INTERNAL_ETAG_LOOKUP_FAILED";
/// Audit outcome label for a failed current-ETag lookup.
const LOOKUP_FAILED_LABEL: &str = "lookup_failed";

// ============================================================================
// SECTION: Middleware
// ============================================================================

/// Evaluates the If-Match precondition for the request.
pub async fn precondition_guard(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let condition = RawCondition::from_parts(request.method(), request.uri(), request.headers());
    if !condition.is_write() {
        return next.run(request).await;
    }
    let audit_path = request
        .extensions()
        .get::<OriginalUri>()
        .map_or_else(|| condition.path.clone(), |original| original.path().to_string());

    match state.guard.evaluate(&condition, &state.store) {
        Ok(evaluation) => {
            record(
                &state,
                &condition,
                audit_path,
                AuditOutcome {
                    label: evaluation.outcome.label(),
                    resource_kind: evaluation.resource_kind,
                    http_status: evaluation.status().map(|status| status.as_u16()),
                    code: evaluation.code().map(str::to_string),
                },
            );
            match evaluation.into_decision() {
                Ok(_) => next.run(request).await,
                Err(problem) => ProblemReply(problem).into_response(),
            }
        }
        Err(err) => {
            let problem = ProblemResponse::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ETAG_LOOKUP_FAILED,
                "Internal Server Error",
                err.to_string(),
            );
            record(
                &state,
                &condition,
                audit_path,
                AuditOutcome {
                    label: LOOKUP_FAILED_LABEL,
                    resource_kind: state.guard.rules().classify(&condition.method, &condition.path),
                    http_status: Some(problem.status.as_u16()),
                    code: Some(ETAG_LOOKUP_FAILED.to_string()),
                },
            );
            ProblemReply(problem).into_response()
        }
    }
}

// ============================================================================
// SECTION: Audit
// ============================================================================

/// Decision fields recorded for one request.
struct AuditOutcome {
    /// Outcome label.
    label: &'static str,
    /// Classified resource kind.
    resource_kind: ResourceKind,
    /// HTTP status of a terminal decision.
    http_status: Option<u16>,
    /// Problem code of a terminal decision.
    code: Option<String>,
}

/// Records one audit event.
fn record(state: &AppState, condition: &RawCondition, path: String, outcome: AuditOutcome) {
    let event = PreconditionAuditEvent::new(PreconditionAuditEventParams {
        method: condition.method.to_string(),
        path,
        outcome: outcome.label,
        resource_kind: outcome.resource_kind,
        http_status: outcome.http_status,
        code: outcome.code,
    });
    state.audit.record(&event);
}
