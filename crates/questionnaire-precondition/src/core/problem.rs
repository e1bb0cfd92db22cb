// crates/questionnaire-precondition/src/core/problem.rs
// ============================================================================
// Module: Problem Responses
// Description: application/problem+json bodies for terminal failures.
// Purpose: Carry a fully formed failure response back to the HTTP adapter.
// Dependencies: http, serde, serde_json
// ============================================================================

//! ## Overview
//! A [`ProblemResponse`] is the terminal value the guard hands to the HTTP
//! adapter: status, a machine-readable [`ProblemBody`], and any diagnostic
//! headers. The media type is always `application/problem+json`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use http::HeaderMap;
use http::HeaderValue;
use http::StatusCode;
use http::header::CONTENT_TYPE;
use serde::Deserialize;
use serde::Serialize;

use crate::core::mapping::ErrorMappingEntry;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Media type for problem responses.
pub const PROBLEM_JSON: &str = "application/problem+json";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Problem body serialized on every failure response.
///
/// # Invariants
/// - `status` equals the HTTP status of the enclosing response.
/// - `message` mirrors `detail` for clients that read either field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemBody {
    /// Short human-readable summary.
    pub title: String,
    /// HTTP status code.
    pub status: u16,
    /// Human-readable explanation.
    pub detail: String,
    /// Alias of `detail`.
    pub message: String,
    /// Stable machine-readable code.
    pub code: String,
}

/// Fully formed failure response.
#[derive(Debug, Clone)]
pub struct ProblemResponse {
    /// HTTP status.
    pub status: StatusCode,
    /// Problem body.
    pub body: ProblemBody,
    /// Response headers, including Content-Type and diagnostics.
    pub headers: HeaderMap,
}

impl ProblemResponse {
    /// Builds a problem response from explicit values.
    #[must_use]
    pub fn new(status: StatusCode, code: &str, title: &str, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(PROBLEM_JSON));
        Self {
            status,
            body: ProblemBody {
                title: title.to_string(),
                status: status.as_u16(),
                message: detail.clone(),
                detail,
                code: code.to_string(),
            },
            headers,
        }
    }

    /// Builds a problem response from an error mapping row.
    #[must_use]
    pub fn from_entry(entry: &ErrorMappingEntry, detail: impl Into<String>) -> Self {
        Self::new(entry.status, entry.code, entry.title, detail)
    }

    /// Returns the stable problem code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.body.code
    }

    /// Serializes the body as JSON bytes.
    #[must_use]
    pub fn body_json(&self) -> Vec<u8> {
        serde_json::to_vec(&self.body).unwrap_or_else(|_| {
            format!("{{\"status\":{},\"code\":\"{}\"}}", self.body.status, self.body.code)
                .into_bytes()
        })
    }
}
