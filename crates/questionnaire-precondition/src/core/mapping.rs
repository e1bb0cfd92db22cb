// crates/questionnaire-precondition/src/core/mapping.rs
// ============================================================================
// Module: Precondition Error Mapping
// Description: Static outcome to (code, status, title) table.
// Purpose: Single source of truth for precondition failure wire values.
// Dependencies: http
// ============================================================================

//! ## Overview
//! The error mapping table is data, not behavior. Every precondition failure
//! response takes its `code`, HTTP status, and `title` from here; no other
//! module spells these values.

// ============================================================================
// SECTION: Imports
// ============================================================================

use http::StatusCode;
use serde::Serialize;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Row key of the error mapping table.
///
/// # Invariants
/// - Mismatch is split by resource family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorMappingKey {
    /// If-Match absent or blank.
    Missing,
    /// If-Match malformed.
    InvalidFormat,
    /// If-Match well formed but without usable validators.
    NoValidTokens,
    /// Answer validator mismatch.
    MismatchAnswers,
    /// Document validator mismatch (content, metadata, reorder).
    MismatchDocuments,
    /// Unsupported request media type.
    ContentTypeUnsupported,
}

/// Immutable wire values for one precondition failure kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorMappingEntry {
    /// Row key.
    pub key: ErrorMappingKey,
    /// Stable machine-readable code.
    pub code: &'static str,
    /// HTTP status.
    pub status: StatusCode,
    /// Problem title.
    pub title: &'static str,
}

// ============================================================================
// SECTION: Table
// ============================================================================

/// Row for [`ErrorMappingKey::Missing`].
const MISSING: ErrorMappingEntry = ErrorMappingEntry {
    key: ErrorMappingKey::Missing,
    code: "PRE_IF_MATCH_MISSING",
    status: StatusCode::PRECONDITION_REQUIRED,
    title: "Precondition Required",
};

/// Row for [`ErrorMappingKey::InvalidFormat`].
const INVALID_FORMAT: ErrorMappingEntry = ErrorMappingEntry {
    key: ErrorMappingKey::InvalidFormat,
    code: "PRE_IF_MATCH_INVALID_FORMAT",
    status: StatusCode::CONFLICT,
    title: "Invalid If-Match Header",
};

/// Row for [`ErrorMappingKey::NoValidTokens`].
const NO_VALID_TOKENS: ErrorMappingEntry = ErrorMappingEntry {
    key: ErrorMappingKey::NoValidTokens,
    code: "PRE_IF_MATCH_NO_VALID_TOKENS",
    status: StatusCode::CONFLICT,
    title: "No Valid If-Match Tokens",
};

/// Row for [`ErrorMappingKey::MismatchAnswers`].
const MISMATCH_ANSWERS: ErrorMappingEntry = ErrorMappingEntry {
    key: ErrorMappingKey::MismatchAnswers,
    code: "PRE_IF_MATCH_ETAG_MISMATCH",
    status: StatusCode::CONFLICT,
    title: "Entity Tag Mismatch",
};

/// Row for [`ErrorMappingKey::MismatchDocuments`].
const MISMATCH_DOCUMENTS: ErrorMappingEntry = ErrorMappingEntry {
    key: ErrorMappingKey::MismatchDocuments,
    code: "PRE_IF_MATCH_ETAG_MISMATCH",
    status: StatusCode::PRECONDITION_FAILED,
    title: "Precondition Failed",
};

/// Row for [`ErrorMappingKey::ContentTypeUnsupported`].
const CONTENT_TYPE_UNSUPPORTED: ErrorMappingEntry = ErrorMappingEntry {
    key: ErrorMappingKey::ContentTypeUnsupported,
    code: "PRE_REQUEST_CONTENT_TYPE_UNSUPPORTED",
    status: StatusCode::UNSUPPORTED_MEDIA_TYPE,
    title: "Unsupported Media Type",
};

/// The full error mapping table.
pub const ERROR_MAPPING: [ErrorMappingEntry; 6] = [
    MISSING,
    INVALID_FORMAT,
    NO_VALID_TOKENS,
    MISMATCH_ANSWERS,
    MISMATCH_DOCUMENTS,
    CONTENT_TYPE_UNSUPPORTED,
];

impl ErrorMappingKey {
    /// Returns the table row for this key.
    #[must_use]
    pub const fn entry(self) -> &'static ErrorMappingEntry {
        match self {
            Self::Missing => &MISSING,
            Self::InvalidFormat => &INVALID_FORMAT,
            Self::NoValidTokens => &NO_VALID_TOKENS,
            Self::MismatchAnswers => &MISMATCH_ANSWERS,
            Self::MismatchDocuments => &MISMATCH_DOCUMENTS,
            Self::ContentTypeUnsupported => &CONTENT_TYPE_UNSUPPORTED,
        }
    }
}

/// Looks up the table row for a key.
#[must_use]
pub const fn error_mapping(key: ErrorMappingKey) -> &'static ErrorMappingEntry {
    key.entry()
}

// ============================================================================
// SECTION: Tests
// ============================================================================
