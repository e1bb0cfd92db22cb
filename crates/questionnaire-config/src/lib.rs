// crates/questionnaire-config/src/lib.rs
// ============================================================================
// Module: Questionnaire Config Library
// Description: Canonical config model and validation.
// Purpose: Single source of truth for questionnaire.toml semantics.
// Dependencies: serde, toml
// ============================================================================

//! ## Overview
//! `questionnaire-config` defines the configuration model for the
//! questionnaire backend. Loading is strict and fails closed: oversized,
//! non-UTF-8, or semantically invalid files are rejected before the server
//! starts.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod examples;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use examples::config_toml_example;
