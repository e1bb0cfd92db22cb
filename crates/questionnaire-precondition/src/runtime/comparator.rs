// crates/questionnaire-precondition/src/runtime/comparator.rs
// ============================================================================
// Module: ETag Comparator
// Description: Any-match comparison of If-Match tokens against current ETags.
// Purpose: Decide whether a precondition is satisfied.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Comparison follows RFC 7232 `If-Match` semantics with a relaxed validator
//! equality: weak prefixes, one layer of quotes, and letter case are all
//! ignored on both sides. The function is pure and deterministic.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::NormalizedToken;
use crate::core::normalize_current;

// ============================================================================
// SECTION: Comparison
// ============================================================================

/// Returns true when `incoming` is satisfied by the `current` ETag.
///
/// - `Wildcard` always matches, even without a current representation.
/// - `Empty` never matches.
/// - `TokenSet` matches when any member equals the normalized current value.
#[must_use]
pub fn etag_matches(current: Option<&str>, incoming: &NormalizedToken) -> bool {
    match incoming {
        NormalizedToken::Wildcard => true,
        NormalizedToken::Empty => false,
        NormalizedToken::TokenSet(tokens) => {
            let Some(current) = current else {
                return false;
            };
            let current = normalize_current(current);
            tokens.iter().any(|token| *token == current)
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
