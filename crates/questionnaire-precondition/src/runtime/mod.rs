// crates/questionnaire-precondition/src/runtime/mod.rs
// ============================================================================
// Module: Precondition Runtime
// Description: Comparator, route classifier, header emitter, and guard.
// Purpose: Evaluate If-Match preconditions for guarded write requests.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Runtime components are synchronous and hold no shared mutable state; the
//! guard may be evaluated concurrently from any number of requests.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod comparator;
pub mod guard;
pub mod headers;
pub mod routes;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use comparator::etag_matches;
pub use guard::Continue;
pub use guard::Evaluation;
pub use guard::JSON_MEDIA_TYPE;
pub use guard::PreconditionGuard;
pub use guard::content_type_supported;
pub use guard::media_type;
pub use headers::HeaderEmitError;
pub use headers::emit_etag_headers;
pub use headers::emit_list_etag_headers;
pub use headers::emit_reorder_diagnostics;
pub use headers::exposed_header_names;
pub use headers::expose_headers_value;
pub use headers::format_etag;
pub use routes::RouteRule;
pub use routes::RouteRules;
pub use routes::RouteShape;
