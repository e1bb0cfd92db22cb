// crates/questionnaire-precondition/src/core/mod.rs
// ============================================================================
// Module: Precondition Core Types
// Description: Data model for the If-Match precondition engine.
// Purpose: Group tokens, outcomes, resources, mapping, and problem bodies.
// Dependencies: http, serde, thiserror
// ============================================================================

//! ## Overview
//! Core types are pure data with no I/O. They are shared by the guard,
//! the comparator, and the HTTP adapter.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod condition;
pub mod mapping;
pub mod outcome;
pub mod problem;
pub mod resource;
pub mod token;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use condition::RawCondition;
pub use mapping::ERROR_MAPPING;
pub use mapping::ErrorMappingEntry;
pub use mapping::ErrorMappingKey;
pub use mapping::error_mapping;
pub use outcome::PreconditionOutcome;
pub use problem::PROBLEM_JSON;
pub use problem::ProblemBody;
pub use problem::ProblemResponse;
pub use resource::EtagScope;
pub use resource::ResourceIds;
pub use resource::ResourceKind;
pub use resource::ResourceTarget;
pub use token::InvalidFormatSignal;
pub use token::NormalizedToken;
pub use token::WILDCARD;
pub use token::normalize;
pub use token::normalize_current;
