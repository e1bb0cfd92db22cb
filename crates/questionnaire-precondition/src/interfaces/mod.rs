// crates/questionnaire-precondition/src/interfaces/mod.rs
// ============================================================================
// Module: Precondition Interfaces
// Description: Collaborator contracts consumed by the precondition guard.
// Purpose: Decouple the guard from storage and HTTP frameworks.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! The guard consumes exactly one capability from the outside world: the
//! current entity tag of a classified resource. Implementations may be backed
//! by a database or an in-memory store; the guard never computes ETags itself.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::ResourceTarget;

// ============================================================================
// SECTION: Current ETag Provider
// ============================================================================

/// Errors raised by current-ETag collaborators.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - These errors are never mapped through the precondition error table.
#[derive(Debug, Error)]
pub enum EtagLookupError {
    /// The backing store could not be read.
    #[error("etag lookup unavailable: {0}")]
    Unavailable(String),
    /// The collaborator rejected the target identifiers.
    #[error("etag lookup rejected target: {0}")]
    InvalidTarget(String),
}

/// Source of current entity tags for guarded resources.
pub trait CurrentEtagProvider: Send + Sync {
    /// Returns the current ETag for a target, or `None` when the resource has
    /// no current representation.
    ///
    /// # Errors
    ///
    /// Returns [`EtagLookupError`] when the lookup cannot be performed.
    fn current_etag(&self, target: &ResourceTarget) -> Result<Option<String>, EtagLookupError>;
}
