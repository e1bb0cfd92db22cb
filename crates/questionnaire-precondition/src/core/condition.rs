// crates/questionnaire-precondition/src/core/condition.rs
// ============================================================================
// Module: Raw Request Conditions
// Description: Per-request inputs to the precondition guard.
// Purpose: Capture the untrusted header and route values once per request.
// Dependencies: http
// ============================================================================

//! ## Overview
//! A [`RawCondition`] is built once per inbound request from the method,
//! path, and headers, and is never mutated afterwards. Header values are
//! untrusted and are not validated here.

// ============================================================================
// SECTION: Imports
// ============================================================================

use http::HeaderMap;
use http::Method;
use http::Uri;
use http::header::CONTENT_TYPE;
use http::header::IF_MATCH;

// ============================================================================
// SECTION: Raw Condition
// ============================================================================

/// Untrusted precondition inputs for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCondition {
    /// Raw If-Match header text, when present.
    pub if_match: Option<String>,
    /// Raw Content-Type header text, when present.
    pub content_type: Option<String>,
    /// Request method.
    pub method: Method,
    /// Request path, used only for route classification.
    pub path: String,
}

impl RawCondition {
    /// Builds a condition from explicit values.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            if_match: None,
            content_type: None,
            method,
            path: path.into(),
        }
    }

    /// Sets the raw If-Match header text.
    #[must_use]
    pub fn with_if_match(mut self, value: impl Into<String>) -> Self {
        self.if_match = Some(value.into());
        self
    }

    /// Sets the raw Content-Type header text.
    #[must_use]
    pub fn with_content_type(mut self, value: impl Into<String>) -> Self {
        self.content_type = Some(value.into());
        self
    }

    /// Captures a condition from request parts.
    ///
    /// Repeated If-Match headers are joined as one list. Only the first
    /// Content-Type header is considered.
    #[must_use]
    pub fn from_parts(method: &Method, uri: &Uri, headers: &HeaderMap) -> Self {
        let if_match_values: Vec<String> =
            headers.get_all(IF_MATCH).iter().map(|value| decode(value.as_bytes())).collect();
        let if_match = if if_match_values.is_empty() { None } else { Some(if_match_values.join(", ")) };
        let content_type = headers.get(CONTENT_TYPE).map(|value| decode(value.as_bytes()));
        Self {
            if_match,
            content_type,
            method: method.clone(),
            path: uri.path().to_string(),
        }
    }

    /// Returns true for methods that mutate resources.
    #[must_use]
    pub fn is_write(&self) -> bool {
        matches!(self.method, Method::POST | Method::PUT | Method::PATCH | Method::DELETE)
    }
}

/// Decodes header bytes, replacing invalid UTF-8 sequences.
fn decode(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only header construction.")]

    use http::HeaderMap;
    use http::HeaderValue;
    use http::Method;
    use http::Uri;
    use http::header::IF_MATCH;

    use super::RawCondition;

    #[test]
    fn repeated_if_match_headers_are_joined() {
        let mut headers = HeaderMap::new();
        headers.append(IF_MATCH, HeaderValue::from_static("\"a\""));
        headers.append(IF_MATCH, HeaderValue::from_static("\"b\""));
        let uri: Uri = "/api/v1/documents/7?x=1".parse().unwrap();
        let condition = RawCondition::from_parts(&Method::PATCH, &uri, &headers);
        assert_eq!(condition.if_match.as_deref(), Some("\"a\", \"b\""));
        assert_eq!(condition.path, "/api/v1/documents/7");
        assert!(condition.content_type.is_none());
    }

    #[test]
    fn read_methods_are_not_writes() {
        assert!(!RawCondition::new(Method::GET, "/").is_write());
        assert!(!RawCondition::new(Method::OPTIONS, "/").is_write());
        assert!(RawCondition::new(Method::DELETE, "/").is_write());
    }
}
