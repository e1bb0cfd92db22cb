// crates/questionnaire-precondition/src/core/outcome.rs
// ============================================================================
// Module: Precondition Outcomes
// Description: The decision value produced by the precondition guard.
// Purpose: Represent exactly one result per evaluated write request.
// Dependencies: crate::core::{mapping, resource}, serde
// ============================================================================

//! ## Overview
//! [`PreconditionOutcome`] is the single decision value of the engine. Every
//! non-`Pass` outcome is terminal and maps to exactly one row of the error
//! mapping table.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;

use crate::core::mapping::ErrorMappingEntry;
use crate::core::mapping::ErrorMappingKey;
use crate::core::resource::ResourceKind;

// ============================================================================
// SECTION: Outcome
// ============================================================================

/// Result of evaluating the precondition checks for one request.
///
/// # Invariants
/// - Exactly one value is produced per evaluated request.
/// - `Mismatch` never carries [`ResourceKind::None`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "resource_kind", rename_all = "snake_case")]
pub enum PreconditionOutcome {
    /// All checks passed; the request may proceed.
    Pass,
    /// The Content-Type media type is present and not `application/json`.
    ContentTypeUnsupported,
    /// The If-Match header is absent or blank.
    Missing,
    /// The If-Match header is malformed.
    InvalidFormat,
    /// The If-Match list is well formed but holds no usable validators.
    NoValidTokens,
    /// No supplied validator matches the current ETag.
    Mismatch(ResourceKind),
}

impl PreconditionOutcome {
    /// Returns a stable label for the outcome.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::ContentTypeUnsupported => "content_type_unsupported",
            Self::Missing => "missing",
            Self::InvalidFormat => "invalid_format",
            Self::NoValidTokens => "no_valid_tokens",
            Self::Mismatch(_) => "mismatch",
        }
    }

    /// Returns true when the request may proceed.
    #[must_use]
    pub const fn is_pass(self) -> bool {
        matches!(self, Self::Pass)
    }

    /// Returns the error mapping key for terminal outcomes.
    #[must_use]
    pub const fn mapping_key(self) -> Option<ErrorMappingKey> {
        match self {
            Self::Pass => None,
            Self::ContentTypeUnsupported => Some(ErrorMappingKey::ContentTypeUnsupported),
            Self::Missing => Some(ErrorMappingKey::Missing),
            Self::InvalidFormat => Some(ErrorMappingKey::InvalidFormat),
            Self::NoValidTokens => Some(ErrorMappingKey::NoValidTokens),
            Self::Mismatch(kind) => {
                if kind.is_document() {
                    Some(ErrorMappingKey::MismatchDocuments)
                } else {
                    Some(ErrorMappingKey::MismatchAnswers)
                }
            }
        }
    }

    /// Returns the error mapping row for terminal outcomes.
    #[must_use]
    pub const fn mapping(self) -> Option<&'static ErrorMappingEntry> {
        match self.mapping_key() {
            Some(key) => Some(key.entry()),
            None => None,
        }
    }

    /// Returns the fixed human-readable detail for terminal outcomes.
    #[must_use]
    pub fn detail(self) -> Option<String> {
        let detail = match self {
            Self::Pass => return None,
            Self::ContentTypeUnsupported => {
                "request content type must be application/json".to_string()
            }
            Self::Missing => "If-Match header is required for this request".to_string(),
            Self::InvalidFormat => "If-Match header is malformed".to_string(),
            Self::NoValidTokens => {
                "If-Match header contains no valid quoted entity tags".to_string()
            }
            Self::Mismatch(kind) => {
                format!("If-Match does not match the current {} entity tag", kind.as_str())
            }
        };
        Some(detail)
    }
}
