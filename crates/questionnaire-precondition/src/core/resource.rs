// crates/questionnaire-precondition/src/core/resource.rs
// ============================================================================
// Module: Guarded Resource Kinds
// Description: Resource classification and ETag header scopes.
// Purpose: Name the resource families the precondition guard protects.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Every guarded write request is classified into a [`ResourceKind`]. The
//! kind selects the mismatch status, the diagnostic header scope, and the
//! identifiers handed to the current-ETag collaborator.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Resource Kind
// ============================================================================

/// Resource family targeted by a write request.
///
/// # Invariants
/// - Variants are stable for telemetry labeling.
/// - `None` means the precondition guard does not apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// A single answer within a response set.
    Answer,
    /// The content body of a document.
    DocumentContent,
    /// Document metadata (title, attributes, deletion).
    DocumentMetadata,
    /// The ordering of the document list.
    DocumentReorder,
    /// The route is not guarded.
    None,
}

impl ResourceKind {
    /// Returns a stable label for the resource kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Answer => "answer",
            Self::DocumentContent => "document_content",
            Self::DocumentMetadata => "document_metadata",
            Self::DocumentReorder => "document_reorder",
            Self::None => "none",
        }
    }

    /// Returns true for the document resource family.
    #[must_use]
    pub const fn is_document(self) -> bool {
        matches!(self, Self::DocumentContent | Self::DocumentMetadata | Self::DocumentReorder)
    }

    /// Returns the domain header scope used for this kind's diagnostics.
    ///
    /// Reorders have no domain scope; their validator is the list ETag,
    /// carried by `ETag` and `X-List-ETag`.
    #[must_use]
    pub const fn etag_scope(self) -> Option<EtagScope> {
        match self {
            Self::Answer => Some(EtagScope::Screen),
            Self::DocumentContent | Self::DocumentMetadata => Some(EtagScope::Document),
            Self::DocumentReorder | Self::None => None,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: ETag Scope
// ============================================================================

/// Domain scope of an ETag header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EtagScope {
    /// Screen-level validator (answers are screen-scoped).
    Screen,
    /// Question-level validator.
    Question,
    /// Questionnaire-level validator.
    Questionnaire,
    /// Document-level validator.
    Document,
}

impl EtagScope {
    /// All scopes in canonical exposure order.
    pub const ALL: [Self; 4] = [Self::Screen, Self::Question, Self::Questionnaire, Self::Document];
}

// ============================================================================
// SECTION: Resource Target
// ============================================================================

/// Identifiers extracted from a guarded route.
///
/// # Invariants
/// - Fields are `None` when the route shape carries no such segment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct ResourceIds {
    /// Parent collection identifier (response set for answers).
    pub parent_id: Option<String>,
    /// Leaf identifier (question for answers, document for documents).
    pub resource_id: Option<String>,
}

/// A classified route together with its identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ResourceTarget {
    /// Classified resource kind.
    pub kind: ResourceKind,
    /// Identifiers extracted from the path.
    pub ids: ResourceIds,
}

impl ResourceTarget {
    /// Builds a target with no identifiers.
    #[must_use]
    pub fn bare(kind: ResourceKind) -> Self {
        Self {
            kind,
            ids: ResourceIds::default(),
        }
    }
}
