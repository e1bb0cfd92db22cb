// crates/questionnaire-precondition/src/core/token.rs
// ============================================================================
// Module: If-Match Token Normalization
// Description: Parsing of raw If-Match header values into comparable tokens.
// Purpose: Produce a canonical, case-folded validator set for comparison.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! The normalizer turns a raw `If-Match` header value into a
//! [`NormalizedToken`]. Parsing is deliberately lenient about individual list
//! entries and strict about the overall list shape:
//!
//! - A trimmed `*` is the wildcard and is accepted before any other check,
//!   so ASCII whitespace controls around it (`"\t*"`) are trimmed rather
//!   than rejected.
//! - Control characters anywhere in the raw value reject the whole header.
//! - Commas inside double-quoted spans do not split the list; an unterminated
//!   quoted span rejects the whole header.
//! - A list whose non-empty entries are all unquoted yields
//!   [`NormalizedToken::Empty`] rather than an error.
//! - A list with no non-empty entries at all is rejected.
//!
//! Blank or absent headers are a presence failure and never reach
//! [`normalize`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Wildcard If-Match value matching any current representation.
pub const WILDCARD: &str = "*";

/// Case-insensitive prefix marking a weak validator.
const WEAK_PREFIX: &str = "W/";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Canonical, comparable form of an If-Match header value.
///
/// # Invariants
/// - `TokenSet` is never empty and holds no duplicates.
/// - Set members are quote-stripped, weak-prefix-stripped, and lower-cased.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "tokens", rename_all = "snake_case")]
pub enum NormalizedToken {
    /// The literal `*`.
    Wildcard,
    /// One or more normalized validator strings, in first-seen order.
    TokenSet(Vec<String>),
    /// A well-formed list that produced zero usable validators.
    Empty,
}

impl NormalizedToken {
    /// Renders the normalized form for diagnostics.
    ///
    /// Wildcards render as `*`, token sets as their members joined by `", "`,
    /// and empty lists as the empty string.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Wildcard => WILDCARD.to_string(),
            Self::TokenSet(tokens) => tokens.join(", "),
            Self::Empty => String::new(),
        }
    }

    /// Returns true when the token is the wildcard.
    #[must_use]
    pub const fn is_wildcard(&self) -> bool {
        matches!(self, Self::Wildcard)
    }
}

/// Reasons a raw If-Match value was rejected as malformed.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidFormatSignal {
    /// The value contains a control character.
    #[error("if-match contains a control character")]
    ControlCharacter,
    /// A double-quoted span was left open at the end of the value.
    #[error("if-match contains an unterminated quoted string")]
    UnterminatedQuote,
    /// The value contains no non-empty list entries.
    #[error("if-match contains no list entries")]
    NoEntries,
}

// ============================================================================
// SECTION: Normalization
// ============================================================================

/// Normalizes a raw If-Match header value.
///
/// Callers must reject absent or blank values as a presence failure before
/// calling this function.
///
/// # Errors
///
/// Returns [`InvalidFormatSignal`] when the value contains control characters,
/// an unterminated quoted span, or no non-empty list entries.
pub fn normalize(raw: &str) -> Result<NormalizedToken, InvalidFormatSignal> {
    if trim_ascii_whitespace(raw) == WILDCARD {
        return Ok(NormalizedToken::Wildcard);
    }
    if raw.chars().any(is_control) {
        return Err(InvalidFormatSignal::ControlCharacter);
    }

    let mut saw_entry = false;
    let mut tokens: Vec<String> = Vec::new();
    for part in split_list(raw)? {
        let part = trim_ascii_whitespace(part);
        if part.is_empty() {
            continue;
        }
        saw_entry = true;
        if let Some(token) = parse_entity_tag(part)
            && !tokens.contains(&token)
        {
            tokens.push(token);
        }
    }

    if !saw_entry {
        return Err(InvalidFormatSignal::NoEntries);
    }
    if tokens.is_empty() {
        return Ok(NormalizedToken::Empty);
    }
    Ok(NormalizedToken::TokenSet(tokens))
}

/// Normalizes a stored ETag with the same per-entry rules used for If-Match.
///
/// The weak prefix and one layer of surrounding quotes are removed when
/// present; unquoted values are accepted as opaque strings.
#[must_use]
pub fn normalize_current(current: &str) -> String {
    let opaque = strip_weak_prefix(trim_ascii_whitespace(current));
    let inner = strip_quotes(opaque).unwrap_or(opaque);
    inner.to_lowercase()
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns true for C0 control characters and DEL.
const fn is_control(ch: char) -> bool {
    (ch as u32) < 0x20 || ch as u32 == 0x7f
}

/// Trims ASCII whitespace from both ends.
fn trim_ascii_whitespace(value: &str) -> &str {
    value.trim_matches(|ch: char| ch.is_ascii_whitespace())
}

/// Splits a list on commas that are outside double-quoted spans.
fn split_list(raw: &str) -> Result<Vec<&str>, InvalidFormatSignal> {
    let mut parts = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;
    for (index, ch) in raw.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                parts.push(&raw[start .. index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    if in_quotes {
        return Err(InvalidFormatSignal::UnterminatedQuote);
    }
    parts.push(&raw[start ..]);
    Ok(parts)
}

/// Strips a case-insensitive `W/` prefix and any whitespace after it.
fn strip_weak_prefix(value: &str) -> &str {
    match value.get(.. WEAK_PREFIX.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(WEAK_PREFIX) => {
            trim_ascii_whitespace(&value[WEAK_PREFIX.len() ..])
        }
        _ => value,
    }
}

/// Removes exactly one layer of surrounding double quotes.
fn strip_quotes(value: &str) -> Option<&str> {
    value.strip_prefix('"')?.strip_suffix('"')
}

/// Parses one list entry into a normalized validator.
fn parse_entity_tag(part: &str) -> Option<String> {
    strip_quotes(strip_weak_prefix(part)).map(str::to_lowercase)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
