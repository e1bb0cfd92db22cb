// crates/questionnaire-server/src/handlers.rs
// ============================================================================
// Module: Questionnaire Handlers
// Description: CRUD handlers for answers and documents.
// Purpose: Apply writes that already passed the precondition guard.
// Dependencies: axum, questionnaire-precondition, serde
// ============================================================================

//! ## Overview
//! Handlers read raw bytes and parse JSON themselves so that a missing
//! `Content-Type` (already accepted by the guard) never causes a second,
//! differently shaped rejection. Every success response carries the entity
//! tags a client needs for its next conditional write; every failure is a
//! problem response.

// ============================================================================
// SECTION: Imports
// ============================================================================

use axum::Json;
use axum::body::Bytes;
use axum::extract::Path;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use questionnaire_precondition::EtagScope;
use questionnaire_precondition::ProblemResponse;
use questionnaire_precondition::emit_etag_headers;
use questionnaire_precondition::emit_list_etag_headers;
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::server::AppState;
use crate::store::DocumentList;
use crate::store::DocumentRecord;
use crate::store::DocumentSummary;
use crate::store::StoreError;

// ============================================================================
// SECTION: Problem Replies
// ============================================================================

/// Problem code for an entity that does not exist.
pub const RESOURCE_NOT_FOUND: &str = "RESOURCE_NOT_FOUND";
/// Problem code for a write that conflicts with existing state.
pub const RESOURCE_CONFLICT: &str = "RESOURCE_CONFLICT";
/// Problem code for a malformed request body.
pub const REQUEST_INVALID: &str = "REQUEST_INVALID";
/// Problem code for unexpected server failures.
pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";

/// Axum response wrapper for [`ProblemResponse`].
#[derive(Debug)]
pub struct ProblemReply(pub ProblemResponse);

impl IntoResponse for ProblemReply {
    fn into_response(self) -> Response {
        let body = self.0.body_json();
        (self.0.status, self.0.headers, body).into_response()
    }
}

impl From<StoreError> for ProblemReply {
    fn from(err: StoreError) -> Self {
        let (status, code, title) = match &err {
            StoreError::NotFound(_) => (StatusCode::NOT_FOUND, RESOURCE_NOT_FOUND, "Not Found"),
            StoreError::Conflict(_) => (StatusCode::CONFLICT, RESOURCE_CONFLICT, "Conflict"),
            StoreError::Invalid(_) => (StatusCode::BAD_REQUEST, REQUEST_INVALID, "Bad Request"),
            StoreError::Hash(_) | StoreError::Unavailable(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR, "Internal Server Error")
            }
        };
        Self(ProblemResponse::new(status, code, title, err.to_string()))
    }
}

/// Result type returned by every handler.
type HandlerResult = Result<Response, ProblemReply>;

// ============================================================================
// SECTION: Request Bodies
// ============================================================================

/// Answer write payload.
#[derive(Debug, Deserialize)]
pub struct AnswerBody {
    /// Answer value.
    pub value: Value,
}

/// Document creation payload.
#[derive(Debug, Deserialize)]
pub struct CreateDocumentBody {
    /// Optional client-chosen id.
    #[serde(default)]
    pub id: Option<String>,
    /// Display title.
    pub title: String,
    /// Initial body.
    #[serde(default)]
    pub content: String,
}

/// Document metadata update payload.
#[derive(Debug, Deserialize)]
pub struct UpdateDocumentBody {
    /// New display title.
    pub title: String,
}

/// Document content replacement payload.
#[derive(Debug, Deserialize)]
pub struct ContentBody {
    /// New body.
    pub content: String,
}

/// Document reorder payload.
#[derive(Debug, Deserialize)]
pub struct ReorderBody {
    /// Complete new order of document ids.
    pub order: Vec<String>,
}

/// Document list response.
#[derive(Debug, Serialize)]
struct ListResponse {
    /// Documents in list order.
    documents: Vec<DocumentSummary>,
}

/// Document content response.
#[derive(Debug, Serialize)]
struct ContentResponse<'a> {
    /// Document identifier.
    id: &'a str,
    /// Document body.
    content: &'a str,
    /// Document version.
    version: u64,
}

// ============================================================================
// SECTION: Answers
// ============================================================================

/// `GET /response-sets/{set}/answers/{question}`.
pub async fn get_answer(
    State(state): State<AppState>,
    Path((set, question)): Path<(String, String)>,
) -> HandlerResult {
    let answer = state.store.answer(&set, &question)?;
    let headers = scoped_headers(EtagScope::Screen, &answer.etag)?;
    Ok((StatusCode::OK, headers, Json(answer)).into_response())
}

/// `POST`/`PATCH /response-sets/{set}/answers/{question}`.
pub async fn put_answer(
    State(state): State<AppState>,
    Path((set, question)): Path<(String, String)>,
    body: Bytes,
) -> HandlerResult {
    let body: AnswerBody = parse_json(&body)?;
    let answer = state.store.put_answer(&set, &question, body.value)?;
    let headers = scoped_headers(EtagScope::Screen, &answer.etag)?;
    Ok((StatusCode::OK, headers, Json(answer)).into_response())
}

/// `DELETE /response-sets/{set}/answers/{question}`.
pub async fn delete_answer(
    State(state): State<AppState>,
    Path((set, question)): Path<(String, String)>,
) -> HandlerResult {
    let etag = state.store.delete_answer(&set, &question)?;
    let headers = scoped_headers(EtagScope::Screen, &etag)?;
    Ok((StatusCode::NO_CONTENT, headers).into_response())
}

// ============================================================================
// SECTION: Documents
// ============================================================================

/// `GET /documents`.
pub async fn list_documents(State(state): State<AppState>) -> HandlerResult {
    list_response(state.store.list_documents()?)
}

/// `POST /documents`.
pub async fn create_document(State(state): State<AppState>, body: Bytes) -> HandlerResult {
    let body: CreateDocumentBody = parse_json(&body)?;
    let (record, etag) = state.store.create_document(body.id, &body.title, &body.content)?;
    document_response(StatusCode::CREATED, &record, &etag)
}

/// `GET /documents/{id}`.
pub async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> HandlerResult {
    let (record, etag) = state.store.document(&id)?;
    document_response(StatusCode::OK, &record, &etag)
}

/// `PATCH /documents/{id}`.
pub async fn update_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> HandlerResult {
    let body: UpdateDocumentBody = parse_json(&body)?;
    let (record, etag) = state.store.update_title(&id, &body.title)?;
    document_response(StatusCode::OK, &record, &etag)
}

/// `DELETE /documents/{id}`.
pub async fn delete_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> HandlerResult {
    state.store.delete_document(&id)?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

/// `GET /documents/{id}/content`.
pub async fn get_content(State(state): State<AppState>, Path(id): Path<String>) -> HandlerResult {
    let (record, etag) = state.store.document(&id)?;
    content_response(&record, &etag)
}

/// `PUT /documents/{id}/content`.
pub async fn put_content(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> HandlerResult {
    let body: ContentBody = parse_json(&body)?;
    let (record, etag) = state.store.put_content(&id, &body.content)?;
    content_response(&record, &etag)
}

/// `PUT /documents/order` and `PUT /documents/reorder`.
pub async fn reorder_documents(State(state): State<AppState>, body: Bytes) -> HandlerResult {
    let body: ReorderBody = parse_json(&body)?;
    list_response(state.store.reorder(body.order)?)
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Parses a JSON request body.
fn parse_json<T: DeserializeOwned>(bytes: &Bytes) -> Result<T, ProblemReply> {
    serde_json::from_slice(bytes).map_err(|err| {
        ProblemReply(ProblemResponse::new(
            StatusCode::BAD_REQUEST,
            REQUEST_INVALID,
            "Bad Request",
            format!("request body is not valid: {err}"),
        ))
    })
}

/// Builds headers carrying a scoped ETag and the generic `ETag`.
fn scoped_headers(scope: EtagScope, etag: &str) -> Result<HeaderMap, ProblemReply> {
    let mut headers = HeaderMap::new();
    emit_etag_headers(&mut headers, scope, etag, true).map_err(internal_error)?;
    Ok(headers)
}

/// Builds a document metadata response.
fn document_response(status: StatusCode, record: &DocumentRecord, etag: &str) -> HandlerResult {
    let headers = scoped_headers(EtagScope::Document, etag)?;
    Ok((status, headers, Json(record)).into_response())
}

/// Builds a document content response.
fn content_response(record: &DocumentRecord, etag: &str) -> HandlerResult {
    let headers = scoped_headers(EtagScope::Document, etag)?;
    let body = ContentResponse {
        id: &record.id,
        content: &record.content,
        version: record.version,
    };
    Ok((StatusCode::OK, headers, Json(body)).into_response())
}

/// Builds a list response with `ETag` and `X-List-ETag`.
fn list_response(list: DocumentList) -> HandlerResult {
    let mut headers = HeaderMap::new();
    emit_list_etag_headers(&mut headers, &list.etag).map_err(internal_error)?;
    let body = ListResponse {
        documents: list.documents,
    };
    Ok((StatusCode::OK, headers, Json(body)).into_response())
}

/// Maps an unexpected failure to a 500 problem.
fn internal_error(err: impl std::fmt::Display) -> ProblemReply {
    ProblemReply(ProblemResponse::new(
        StatusCode::INTERNAL_SERVER_ERROR,
        INTERNAL_ERROR,
        "Internal Server Error",
        err.to_string(),
    ))
}
