// crates/questionnaire-precondition/src/runtime/headers.rs
// ============================================================================
// Module: Diagnostic Header Emitter
// Description: Writes ETag-family headers and maintains CORS exposure.
// Purpose: Keep header names and the exposed-header list in one place.
// Dependencies: crate::core, http, thiserror
// ============================================================================

//! ## Overview
//! All writes of ETag-family headers go through this module. After every
//! write the `Access-Control-Expose-Headers` value is recomputed from the
//! canonical name list, so repeated calls never duplicate entries.
//!
//! Exposure order is stable: `ETag`, the four domain headers, then the
//! reorder diagnostics once they have been emitted, then any names a caller
//! exposed earlier.

// ============================================================================
// SECTION: Imports
// ============================================================================

use http::HeaderMap;
use http::HeaderName;
use http::HeaderValue;
use http::header::ACCESS_CONTROL_EXPOSE_HEADERS;
use http::header::ETAG;
use thiserror::Error;

use crate::core::EtagScope;

// ============================================================================
// SECTION: Header Names
// ============================================================================

/// Display name of the generic ETag header.
pub const ETAG_HEADER: &str = "ETag";
/// Display name of the screen-scoped ETag header.
pub const SCREEN_ETAG_HEADER: &str = "Screen-ETag";
/// Display name of the question-scoped ETag header.
pub const QUESTION_ETAG_HEADER: &str = "Question-ETag";
/// Display name of the questionnaire-scoped ETag header.
pub const QUESTIONNAIRE_ETAG_HEADER: &str = "Questionnaire-ETag";
/// Display name of the document-scoped ETag header.
pub const DOCUMENT_ETAG_HEADER: &str = "Document-ETag";
/// Display name of the reorder list ETag diagnostic header.
pub const LIST_ETAG_HEADER: &str = "X-List-ETag";
/// Display name of the normalized If-Match diagnostic header.
pub const IF_MATCH_NORMALIZED_HEADER: &str = "X-If-Match-Normalized";

/// Wire name of [`SCREEN_ETAG_HEADER`].
const SCREEN_ETAG: HeaderName = HeaderName::from_static("screen-etag");
/// Wire name of [`QUESTION_ETAG_HEADER`].
const QUESTION_ETAG: HeaderName = HeaderName::from_static("question-etag");
/// Wire name of [`QUESTIONNAIRE_ETAG_HEADER`].
const QUESTIONNAIRE_ETAG: HeaderName = HeaderName::from_static("questionnaire-etag");
/// Wire name of [`DOCUMENT_ETAG_HEADER`].
const DOCUMENT_ETAG: HeaderName = HeaderName::from_static("document-etag");
/// Wire name of [`LIST_ETAG_HEADER`].
const LIST_ETAG: HeaderName = HeaderName::from_static("x-list-etag");
/// Wire name of [`IF_MATCH_NORMALIZED_HEADER`].
const IF_MATCH_NORMALIZED: HeaderName = HeaderName::from_static("x-if-match-normalized");

/// Generic and domain ETag header names in exposure order.
const ETAG_FAMILY: [&str; 5] = [
    ETAG_HEADER,
    SCREEN_ETAG_HEADER,
    QUESTION_ETAG_HEADER,
    QUESTIONNAIRE_ETAG_HEADER,
    DOCUMENT_ETAG_HEADER,
];

/// Reorder diagnostic header names in exposure order.
const REORDER_DIAGNOSTICS: [&str; 2] = [LIST_ETAG_HEADER, IF_MATCH_NORMALIZED_HEADER];

impl EtagScope {
    /// Returns the display name of this scope's header.
    #[must_use]
    pub const fn header_name(self) -> &'static str {
        match self {
            Self::Screen => SCREEN_ETAG_HEADER,
            Self::Question => QUESTION_ETAG_HEADER,
            Self::Questionnaire => QUESTIONNAIRE_ETAG_HEADER,
            Self::Document => DOCUMENT_ETAG_HEADER,
        }
    }

    /// Returns the wire header name for this scope.
    #[must_use]
    pub const fn wire_name(self) -> HeaderName {
        match self {
            Self::Screen => SCREEN_ETAG,
            Self::Question => QUESTION_ETAG,
            Self::Questionnaire => QUESTIONNAIRE_ETAG,
            Self::Document => DOCUMENT_ETAG,
        }
    }
}

/// Returns every header name a browser client may need to read.
///
/// Used to configure CORS layers so the static exposure list matches the
/// per-response list written by this module.
#[must_use]
pub fn exposed_header_names() -> Vec<&'static str> {
    ETAG_FAMILY.iter().chain(REORDER_DIAGNOSTICS.iter()).copied().collect()
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised when a header value cannot be encoded.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeaderEmitError {
    /// The value contains bytes not permitted in a header.
    #[error("invalid value for header {0}")]
    InvalidValue(&'static str),
}

// ============================================================================
// SECTION: Emission
// ============================================================================

/// Writes the scope header and optionally the generic `ETag` header.
///
/// Unquoted tokens are written as strong quoted validators; quoted or
/// `W/`-prefixed tokens are written as given.
///
/// # Errors
///
/// Returns [`HeaderEmitError`] when the token cannot be encoded.
pub fn emit_etag_headers(
    headers: &mut HeaderMap,
    scope: EtagScope,
    token: &str,
    include_generic: bool,
) -> Result<(), HeaderEmitError> {
    let value = HeaderValue::from_str(&format_etag(token))
        .map_err(|_| HeaderEmitError::InvalidValue(scope.header_name()))?;
    if include_generic {
        headers.insert(ETAG, value.clone());
    }
    headers.insert(scope.wire_name(), value);
    refresh_expose_headers(headers);
    Ok(())
}

/// Writes the document list validator as `ETag` and `X-List-ETag`.
///
/// Used for list reads, successful reorders, and reorder failures.
///
/// # Errors
///
/// Returns [`HeaderEmitError`] when the token cannot be encoded.
pub fn emit_list_etag_headers(
    headers: &mut HeaderMap,
    list_etag: &str,
) -> Result<(), HeaderEmitError> {
    let value = HeaderValue::from_str(&format_etag(list_etag))
        .map_err(|_| HeaderEmitError::InvalidValue(LIST_ETAG_HEADER))?;
    headers.insert(ETAG, value.clone());
    headers.insert(LIST_ETAG, value);
    refresh_expose_headers(headers);
    Ok(())
}

/// Writes reorder mismatch diagnostics.
///
/// `X-List-ETag` is written only when the list has a current ETag; both
/// names are exposed regardless.
///
/// # Errors
///
/// Returns [`HeaderEmitError`] when a value cannot be encoded.
pub fn emit_reorder_diagnostics(
    headers: &mut HeaderMap,
    list_etag: Option<&str>,
    normalized_if_match: &str,
) -> Result<(), HeaderEmitError> {
    let normalized = HeaderValue::from_str(normalized_if_match)
        .map_err(|_| HeaderEmitError::InvalidValue(IF_MATCH_NORMALIZED_HEADER))?;
    if let Some(list_etag) = list_etag {
        let value = HeaderValue::from_str(&format_etag(list_etag))
            .map_err(|_| HeaderEmitError::InvalidValue(LIST_ETAG_HEADER))?;
        headers.insert(LIST_ETAG, value);
    }
    headers.insert(IF_MATCH_NORMALIZED, normalized);
    refresh_expose_headers(headers);
    Ok(())
}

/// Returns the current `Access-Control-Expose-Headers` value, if any.
#[must_use]
pub fn expose_headers_value(headers: &HeaderMap) -> Option<String> {
    headers
        .get(ACCESS_CONTROL_EXPOSE_HEADERS)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

/// Formats a token as an ETag header value.
#[must_use]
pub fn format_etag(token: &str) -> String {
    let weak = token.get(.. 2).is_some_and(|prefix| prefix.eq_ignore_ascii_case("W/"));
    if weak || (token.len() >= 2 && token.starts_with('"') && token.ends_with('"')) {
        token.to_string()
    } else {
        format!("\"{token}\"")
    }
}

// ============================================================================
// SECTION: Exposure
// ============================================================================

/// Recomputes `Access-Control-Expose-Headers` from the canonical list.
fn refresh_expose_headers(headers: &mut HeaderMap) {
    let previous: Vec<String> = headers
        .get_all(ACCESS_CONTROL_EXPOSE_HEADERS)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect();
    let diagnostics = headers.contains_key(LIST_ETAG)
        || headers.contains_key(IF_MATCH_NORMALIZED)
        || previous.iter().any(|name| name.eq_ignore_ascii_case(IF_MATCH_NORMALIZED_HEADER));

    let mut names: Vec<String> = ETAG_FAMILY.iter().map(|name| (*name).to_string()).collect();
    if diagnostics {
        names.extend(REORDER_DIAGNOSTICS.iter().map(|name| (*name).to_string()));
    }
    for name in previous {
        if !names.iter().any(|known| known.eq_ignore_ascii_case(&name)) {
            names.push(name);
        }
    }

    if let Ok(value) = HeaderValue::from_str(&names.join(", ")) {
        headers.insert(ACCESS_CONTROL_EXPOSE_HEADERS, value);
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
