// crates/questionnaire-precondition/src/lib.rs
// ============================================================================
// Module: Questionnaire Precondition Library
// Description: Public API surface for the If-Match precondition engine.
// Purpose: Expose core types, collaborator interfaces, and the guard.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! The precondition engine enforces RFC 7232-style `If-Match` optimistic
//! concurrency for questionnaire answers and documents. It normalizes
//! incoming validators, compares them against the current ETag supplied by a
//! collaborator, and maps every failure to a stable problem response. The
//! engine is synchronous, stateless per request, and framework-agnostic.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::*;

pub use interfaces::CurrentEtagProvider;
pub use interfaces::EtagLookupError;
pub use runtime::Continue;
pub use runtime::Evaluation;
pub use runtime::HeaderEmitError;
pub use runtime::PreconditionGuard;
pub use runtime::RouteRule;
pub use runtime::RouteRules;
pub use runtime::RouteShape;
pub use runtime::emit_etag_headers;
pub use runtime::emit_list_etag_headers;
pub use runtime::emit_reorder_diagnostics;
pub use runtime::etag_matches;
pub use runtime::exposed_header_names;
pub use runtime::expose_headers_value;
