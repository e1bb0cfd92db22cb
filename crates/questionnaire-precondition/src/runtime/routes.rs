// crates/questionnaire-precondition/src/runtime/routes.rs
// ============================================================================
// Module: Route Classification
// Description: Ordered predicate rules mapping (method, path) to resources.
// Purpose: Classify guarded write routes without HTTP framework types.
// Dependencies: crate::core, http
// ============================================================================

//! ## Overview
//! Route classification is an ordered list of [`RouteRule`] values evaluated
//! top to bottom; the first rule whose method set and path shape both match
//! wins. Shapes match on path segments, so the classification is independent
//! of any API prefix. A path that matches no rule is [`ResourceKind::None`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use http::Method;

use crate::core::ResourceIds;
use crate::core::ResourceKind;
use crate::core::ResourceTarget;

// ============================================================================
// SECTION: Shapes
// ============================================================================

/// Path shape predicate for a route rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteShape {
    /// The path ends with these literal segments.
    EndsWith(&'static [&'static str]),
    /// The path ends with `{collection}/{id}/{suffix}`.
    ItemSuffix {
        /// Collection segment.
        collection: &'static str,
        /// Trailing literal segment.
        suffix: &'static str,
    },
    /// The path ends with `{collection}/{id}`.
    Item {
        /// Collection segment.
        collection: &'static str,
    },
    /// The path contains `{parent}/{collection}/{id}` anywhere.
    NestedItem {
        /// Collection segment.
        collection: &'static str,
    },
}

impl RouteShape {
    /// Returns extracted identifiers when the segments match this shape.
    fn extract(&self, segments: &[&str]) -> Option<ResourceIds> {
        let len = segments.len();
        match self {
            Self::EndsWith(literals) => {
                segments.ends_with(literals).then(ResourceIds::default)
            }
            Self::ItemSuffix {
                collection,
                suffix,
            } => {
                let [.., coll, id, last] = segments else {
                    return None;
                };
                (coll == collection && last == suffix).then(|| ResourceIds {
                    parent_id: None,
                    resource_id: Some((*id).to_string()),
                })
            }
            Self::Item {
                collection,
            } => {
                let [.., coll, id] = segments else {
                    return None;
                };
                (coll == collection).then(|| ResourceIds {
                    parent_id: None,
                    resource_id: Some((*id).to_string()),
                })
            }
            Self::NestedItem {
                collection,
            } => {
                let position = segments.iter().position(|segment| segment == collection)?;
                if position == 0 || position + 1 >= len {
                    return None;
                }
                Some(ResourceIds {
                    parent_id: Some(segments[position - 1].to_string()),
                    resource_id: Some(segments[position + 1].to_string()),
                })
            }
        }
    }
}

// ============================================================================
// SECTION: Rules
// ============================================================================

/// A single classification rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRule {
    /// Stable rule name for diagnostics.
    pub name: &'static str,
    /// Methods the rule applies to.
    pub methods: Vec<Method>,
    /// Path shape predicate.
    pub shape: RouteShape,
    /// Resource kind assigned on match.
    pub kind: ResourceKind,
}

impl RouteRule {
    /// Returns a target when the rule matches the request.
    fn apply(&self, method: &Method, segments: &[&str]) -> Option<ResourceTarget> {
        if !self.methods.contains(method) {
            return None;
        }
        self.shape.extract(segments).map(|ids| ResourceTarget {
            kind: self.kind,
            ids,
        })
    }
}

/// Ordered route classification rules.
///
/// # Invariants
/// - Rules are evaluated in insertion order; the first match wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRules {
    /// Ordered rule list.
    rules: Vec<RouteRule>,
}

impl RouteRules {
    /// Builds a rule set from an ordered list.
    #[must_use]
    pub const fn new(rules: Vec<RouteRule>) -> Self {
        Self {
            rules,
        }
    }

    /// Returns the standard questionnaire backend rules.
    ///
    /// Reorder rules precede the document item rule and accept every write
    /// method, so `documents/order` is never read as a document id.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(vec![
            RouteRule {
                name: "documents_order",
                methods: vec![Method::PUT, Method::PATCH, Method::POST, Method::DELETE],
                shape: RouteShape::EndsWith(&["documents", "order"]),
                kind: ResourceKind::DocumentReorder,
            },
            RouteRule {
                name: "reorder",
                methods: vec![Method::PUT, Method::PATCH, Method::POST, Method::DELETE],
                shape: RouteShape::EndsWith(&["reorder"]),
                kind: ResourceKind::DocumentReorder,
            },
            RouteRule {
                name: "document_content",
                methods: vec![Method::PUT],
                shape: RouteShape::ItemSuffix {
                    collection: "documents",
                    suffix: "content",
                },
                kind: ResourceKind::DocumentContent,
            },
            RouteRule {
                name: "document_metadata",
                methods: vec![Method::PATCH, Method::PUT, Method::DELETE],
                shape: RouteShape::Item {
                    collection: "documents",
                },
                kind: ResourceKind::DocumentMetadata,
            },
            RouteRule {
                name: "answer",
                methods: vec![Method::PATCH, Method::POST, Method::DELETE],
                shape: RouteShape::NestedItem {
                    collection: "answers",
                },
                kind: ResourceKind::Answer,
            },
        ])
    }

    /// Returns the ordered rules.
    #[must_use]
    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }

    /// Resolves a request into a guarded target, or `None` when unguarded.
    #[must_use]
    pub fn resolve(&self, method: &Method, path: &str) -> Option<ResourceTarget> {
        let segments = path_segments(path);
        self.rules.iter().find_map(|rule| rule.apply(method, &segments))
    }

    /// Classifies a request into a resource kind.
    #[must_use]
    pub fn classify(&self, method: &Method, path: &str) -> ResourceKind {
        self.resolve(method, path).map_or(ResourceKind::None, |target| target.kind)
    }
}

impl Default for RouteRules {
    fn default() -> Self {
        Self::standard()
    }
}

/// Splits a path into non-empty segments, ignoring any query string.
fn path_segments(path: &str) -> Vec<&str> {
    let path = path.split_once('?').map_or(path, |(head, _)| head);
    path.split('/').filter(|segment| !segment.is_empty()).collect()
}

// ============================================================================
// SECTION: Tests
// ============================================================================
