// crates/questionnaire-precondition/src/runtime/guard.rs
// ============================================================================
// Module: Precondition Guard
// Description: Ordered precondition state machine for guarded write requests.
// Purpose: Decide pass or terminal failure before any business logic runs.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! The guard runs a fixed, linear sequence of checks and stops at the first
//! failure:
//!
//! 1. Content-Type media type must be absent or `application/json`.
//! 2. If-Match must be present and non-blank.
//! 3. If-Match must normalize to a wildcard or a non-empty token set.
//! 4. The route is classified; unguarded routes pass.
//! 5. The current ETag is fetched and compared (any-match).
//!
//! Non-write methods pass before step 1. The collaborator lookup in step 5 is
//! the only external read, and nothing is looked up before steps 1-3 have
//! been decided. Evaluation is side-effect free; the adapter is responsible
//! for logging and for translating a [`ProblemResponse`] into its own
//! short-circuit.

// ============================================================================
// SECTION: Imports
// ============================================================================

use http::HeaderMap;
use http::StatusCode;

use crate::core::NormalizedToken;
use crate::core::PreconditionOutcome;
use crate::core::ProblemResponse;
use crate::core::RawCondition;
use crate::core::ResourceKind;
use crate::core::ResourceTarget;
use crate::core::normalize;
use crate::interfaces::CurrentEtagProvider;
use crate::interfaces::EtagLookupError;
use crate::runtime::comparator::etag_matches;
use crate::runtime::headers::HeaderEmitError;
use crate::runtime::headers::emit_etag_headers;
use crate::runtime::headers::emit_list_etag_headers;
use crate::runtime::headers::emit_reorder_diagnostics;
use crate::runtime::routes::RouteRules;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// The only accepted request media type.
pub const JSON_MEDIA_TYPE: &str = "application/json";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Marker returned when a request may proceed to business logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Continue;

/// Full record of one guard evaluation.
///
/// # Invariants
/// - `current_etag` is only populated after steps 1-3 have been decided.
/// - `normalized` is `Some` once step 3 succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    /// Decision value.
    pub outcome: PreconditionOutcome,
    /// Classified resource kind (`None` when unclassified or unguarded).
    pub resource_kind: ResourceKind,
    /// Classified target when the route is guarded.
    pub target: Option<ResourceTarget>,
    /// Current ETag reported by the collaborator.
    pub current_etag: Option<String>,
    /// Normalized If-Match value.
    pub normalized: Option<NormalizedToken>,
}

impl Evaluation {
    /// Builds an evaluation that stopped before route classification.
    const fn early(outcome: PreconditionOutcome) -> Self {
        Self {
            outcome,
            resource_kind: ResourceKind::None,
            target: None,
            current_etag: None,
            normalized: None,
        }
    }

    /// Returns the HTTP status of a terminal outcome.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        self.outcome.mapping().map(|entry| entry.status)
    }

    /// Returns the problem code of a terminal outcome.
    #[must_use]
    pub fn code(&self) -> Option<&'static str> {
        self.outcome.mapping().map(|entry| entry.code)
    }

    /// Converts the evaluation into a pass or a fully formed problem response.
    ///
    /// Diagnostic headers from [`Evaluation::diagnostic_headers`] are attached
    /// all-or-nothing. When a value cannot be encoded (for example a current
    /// ETag holding a newline) the problem is returned without them; the
    /// status and body are unaffected.
    ///
    /// # Errors
    ///
    /// Returns the [`ProblemResponse`] for every non-`Pass` outcome.
    pub fn into_decision(self) -> Result<Continue, ProblemResponse> {
        let (Some(entry), Some(detail)) = (self.outcome.mapping(), self.outcome.detail()) else {
            return Ok(Continue);
        };
        let mut problem = ProblemResponse::from_entry(entry, detail);
        if let Ok(diagnostics) = self.diagnostic_headers() {
            problem.headers.extend(diagnostics);
        }
        Err(problem)
    }

    /// Builds the diagnostic headers for a terminal outcome.
    ///
    /// `Mismatch` and `NoValidTokens` carry the resource's current ETag:
    /// the scoped header plus `ETag`, or `ETag` plus `X-List-ETag` for
    /// reorders. A reorder mismatch also carries `X-If-Match-Normalized`.
    /// Other outcomes yield an empty map.
    ///
    /// # Errors
    ///
    /// Returns [`HeaderEmitError`] when a value cannot be encoded.
    pub fn diagnostic_headers(&self) -> Result<HeaderMap, HeaderEmitError> {
        let mut headers = HeaderMap::new();
        if !matches!(
            self.outcome,
            PreconditionOutcome::Mismatch(_) | PreconditionOutcome::NoValidTokens
        ) {
            return Ok(headers);
        }
        if let Some(current) = self.current_etag.as_deref() {
            if self.resource_kind == ResourceKind::DocumentReorder {
                emit_list_etag_headers(&mut headers, current)?;
            } else if let Some(scope) = self.resource_kind.etag_scope() {
                emit_etag_headers(&mut headers, scope, current, true)?;
            }
        }
        if self.outcome == PreconditionOutcome::Mismatch(ResourceKind::DocumentReorder) {
            let normalized =
                self.normalized.as_ref().map(NormalizedToken::render).unwrap_or_default();
            emit_reorder_diagnostics(&mut headers, self.current_etag.as_deref(), &normalized)?;
        }
        Ok(headers)
    }
}

// ============================================================================
// SECTION: Guard
// ============================================================================

/// Ordered If-Match precondition guard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreconditionGuard {
    /// Route classification rules.
    rules: RouteRules,
}

impl PreconditionGuard {
    /// Builds a guard with explicit route rules.
    #[must_use]
    pub const fn new(rules: RouteRules) -> Self {
        Self {
            rules,
        }
    }

    /// Returns the route rules.
    #[must_use]
    pub const fn rules(&self) -> &RouteRules {
        &self.rules
    }

    /// Evaluates the precondition checks for a request.
    ///
    /// # Errors
    ///
    /// Returns [`EtagLookupError`] when the current-ETag collaborator fails
    /// during the compare step. Such failures are not precondition outcomes.
    pub fn evaluate(
        &self,
        condition: &RawCondition,
        provider: &dyn CurrentEtagProvider,
    ) -> Result<Evaluation, EtagLookupError> {
        if !condition.is_write() {
            return Ok(Evaluation::early(PreconditionOutcome::Pass));
        }
        if !content_type_supported(condition.content_type.as_deref()) {
            return Ok(Evaluation::early(PreconditionOutcome::ContentTypeUnsupported));
        }
        let Some(raw) = condition.if_match.as_deref().filter(|raw| !raw.trim().is_empty()) else {
            return Ok(Evaluation::early(PreconditionOutcome::Missing));
        };
        let normalized = match normalize(raw) {
            Ok(normalized) => normalized,
            Err(_) => return Ok(Evaluation::early(PreconditionOutcome::InvalidFormat)),
        };
        let target = self.rules.resolve(&condition.method, &condition.path);

        if normalized == NormalizedToken::Empty {
            // Diagnostic lookup only; a failing collaborator just omits the header.
            let current_etag = target
                .as_ref()
                .and_then(|target| provider.current_etag(target).ok().flatten());
            return Ok(Evaluation {
                outcome: PreconditionOutcome::NoValidTokens,
                resource_kind: target.as_ref().map_or(ResourceKind::None, |target| target.kind),
                target,
                current_etag,
                normalized: Some(normalized),
            });
        }

        let Some(target) = target.filter(|target| target.kind != ResourceKind::None) else {
            return Ok(Evaluation {
                normalized: Some(normalized),
                ..Evaluation::early(PreconditionOutcome::Pass)
            });
        };
        let current_etag = provider.current_etag(&target)?;
        let outcome = if etag_matches(current_etag.as_deref(), &normalized) {
            PreconditionOutcome::Pass
        } else {
            PreconditionOutcome::Mismatch(target.kind)
        };
        Ok(Evaluation {
            outcome,
            resource_kind: target.kind,
            target: Some(target),
            current_etag,
            normalized: Some(normalized),
        })
    }
}

// ============================================================================
// SECTION: Content Type
// ============================================================================

/// Returns the case-folded media type portion of a Content-Type value.
#[must_use]
pub fn media_type(content_type: &str) -> String {
    content_type.split(';').next().unwrap_or_default().trim().to_ascii_lowercase()
}

/// Returns true when the Content-Type is absent, blank, or `application/json`.
#[must_use]
pub fn content_type_supported(content_type: Option<&str>) -> bool {
    content_type.map(media_type).is_none_or(|media| media.is_empty() || media == JSON_MEDIA_TYPE)
}
