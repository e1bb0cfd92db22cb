// crates/questionnaire-server/src/etag.rs
// ============================================================================
// Module: Entity Tag Derivation
// Description: RFC 8785 canonical JSON hashing for entity tags.
// Purpose: Derive deterministic strong ETags from entity state.
// Dependencies: serde, serde_jcs, sha2
// ============================================================================

//! ## Overview
//! Entity tags are the first [`ETAG_HEX_LENGTH`] hex characters of the
//! SHA-256 digest over the RFC 8785 canonical JSON of an entity's state,
//! rendered as a quoted strong validator. Equal states always produce equal
//! tags regardless of map ordering.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Number of hex characters kept from the digest.
pub const ETAG_HEX_LENGTH: usize = 32;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised when deriving entity tags.
#[derive(Debug, Error)]
pub enum EtagError {
    /// JSON canonicalization failed.
    #[error("failed to canonicalize json: {0}")]
    Canonicalization(String),
}

// ============================================================================
// SECTION: Derivation
// ============================================================================

/// Returns the quoted strong ETag for a serializable entity state.
///
/// # Errors
///
/// Returns [`EtagError::Canonicalization`] when serialization fails.
pub fn entity_etag<T: Serialize + ?Sized>(value: &T) -> Result<String, EtagError> {
    let bytes =
        serde_jcs::to_vec(value).map_err(|err| EtagError::Canonicalization(err.to_string()))?;
    let digest = Sha256::digest(&bytes);
    let mut hex = hex_encode(&digest);
    hex.truncate(ETAG_HEX_LENGTH);
    Ok(format!("\"{hex}\""))
}

/// Encodes bytes as a lowercase hex string.
fn hex_encode(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push(HEX[(byte >> 4) as usize] as char);
        out.push(HEX[(byte & 0x0f) as usize] as char);
    }
    out
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions.")]

    use serde_json::json;

    use super::ETAG_HEX_LENGTH;
    use super::entity_etag;
    use super::hex_encode;

    #[test]
    fn etag_is_quoted_and_truncated() {
        let etag = entity_etag(&json!({"q-1": "yes"})).unwrap();
        assert_eq!(etag.len(), ETAG_HEX_LENGTH + 2);
        assert!(etag.starts_with('"') && etag.ends_with('"'));
        assert!(etag[1 .. etag.len() - 1].chars().all(|ch| ch.is_ascii_hexdigit()));
    }

    #[test]
    fn etag_ignores_key_order() {
        let left = entity_etag(&json!({"a": 1, "b": [true, null]})).unwrap();
        let right = entity_etag(&json!({"b": [true, null], "a": 1})).unwrap();
        assert_eq!(left, right);
    }

    #[test]
    fn etag_changes_with_state() {
        let before = entity_etag(&json!({"q-1": "yes"})).unwrap();
        let after = entity_etag(&json!({"q-1": "no"})).unwrap();
        assert_ne!(before, after);
    }

    #[test]
    fn hex_encoding_is_lowercase() {
        assert_eq!(hex_encode(&[0x00, 0xab, 0xff]), "00abff");
    }
}
