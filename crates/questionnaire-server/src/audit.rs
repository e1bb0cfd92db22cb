// crates/questionnaire-server/src/audit.rs
// ============================================================================
// Module: Precondition Audit Logging
// Description: Structured audit events for If-Match guard decisions.
// Purpose: Emit one JSON line per evaluated request without hard dependencies.
// Dependencies: questionnaire-precondition, serde
// ============================================================================

//! ## Overview
//! Every request that passes through the precondition guard produces exactly
//! one [`PreconditionAuditEvent`]. Sinks are lightweight so deployments can
//! route events to stderr, a JSON-lines file, or nowhere. Raw `If-Match`
//! values are never logged; only the outcome label and problem code are.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use questionnaire_precondition::ResourceKind;
use serde::Serialize;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Precondition audit event payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreconditionAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// HTTP method of the request.
    pub method: String,
    /// Request path (query string excluded).
    pub path: String,
    /// Outcome label (`pass`, `mismatch`, `lookup_failed`, ...).
    pub outcome: &'static str,
    /// Classified resource kind.
    pub resource_kind: ResourceKind,
    /// HTTP status of a terminal decision.
    pub http_status: Option<u16>,
    /// Problem code of a terminal decision.
    pub code: Option<String>,
}

/// Inputs required to construct a precondition audit event.
pub struct PreconditionAuditEventParams {
    /// HTTP method of the request.
    pub method: String,
    /// Request path.
    pub path: String,
    /// Outcome label.
    pub outcome: &'static str,
    /// Classified resource kind.
    pub resource_kind: ResourceKind,
    /// HTTP status of a terminal decision.
    pub http_status: Option<u16>,
    /// Problem code of a terminal decision.
    pub code: Option<String>,
}

impl PreconditionAuditEvent {
    /// Creates a new audit event with a consistent timestamp.
    #[must_use]
    pub fn new(params: PreconditionAuditEventParams) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event: "precondition_evaluated",
            timestamp_ms,
            method: params.method,
            path: params.path,
            outcome: params.outcome,
            resource_kind: params.resource_kind,
            http_status: params.http_status,
            code: params.code,
        }
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for precondition decisions.
pub trait PreconditionAuditSink: Send + Sync {
    /// Record an audit event.
    fn record(&self, event: &PreconditionAuditEvent);
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl PreconditionAuditSink for StderrAuditSink {
    fn record(&self, event: &PreconditionAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl PreconditionAuditSink for FileAuditSink {
    fn record(&self, event: &PreconditionAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl PreconditionAuditSink for NoopAuditSink {
    fn record(&self, _event: &PreconditionAuditEvent) {}
}

/// Audit sink that keeps events in memory for inspection.
#[derive(Default)]
pub struct MemoryAuditSink {
    /// Recorded events in arrival order.
    events: Mutex<Vec<PreconditionAuditEvent>>,
}

impl MemoryAuditSink {
    /// Creates an empty in-memory sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<PreconditionAuditEvent> {
        self.events.lock().map(|events| events.clone()).unwrap_or_default()
    }
}

impl PreconditionAuditSink for MemoryAuditSink {
    fn record(&self, event: &PreconditionAuditEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
