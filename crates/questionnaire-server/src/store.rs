// crates/questionnaire-server/src/store.rs
// ============================================================================
// Module: In-Memory Questionnaire Store
// Description: Answers, documents, and document ordering held in memory.
// Purpose: Back the HTTP handlers and supply current ETags to the guard.
// Dependencies: questionnaire-precondition, serde, serde_json
// ============================================================================

//! ## Overview
//! The store keeps response-set answers and documents behind a single mutex
//! and derives every entity tag from state via [`crate::etag::entity_etag`].
//! It implements [`CurrentEtagProvider`] so the precondition guard reads the
//! same validators the handlers emit.
//!
//! ETag scopes:
//! - Answers: one tag per response set, covering all of its answers.
//! - Documents: one tag per document, covering metadata and content.
//! - Document list: one tag covering the ordered ids and their versions.
//!
//! Each call takes the lock on its own. The guard's ETag lookup and the
//! handler's write are separate critical sections, so two writers holding
//! the same fresh ETag can both pass the precondition and both write; the
//! store offers no check-then-write atomicity.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use questionnaire_precondition::CurrentEtagProvider;
use questionnaire_precondition::EtagLookupError;
use questionnaire_precondition::ResourceKind;
use questionnaire_precondition::ResourceTarget;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::etag::entity_etag;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum length of a client-supplied identifier.
const MAX_ID_LENGTH: usize = 128;
/// Response set created by demo seeding.
pub const DEMO_RESPONSE_SET_ID: &str = "rs-demo";

// ============================================================================
// SECTION: Types
// ============================================================================

/// A single answer together with its response-set ETag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerRecord {
    /// Owning response set.
    pub response_set_id: String,
    /// Answered question.
    pub question_id: String,
    /// Answer value.
    pub value: Value,
    /// Current response-set ETag (screen scope).
    #[serde(skip)]
    pub etag: String,
}

/// Stored document state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentRecord {
    /// Document identifier.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Document body.
    pub content: String,
    /// Monotonic version, bumped on every change.
    pub version: u64,
}

/// Document list entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentSummary {
    /// Document identifier.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Monotonic version.
    pub version: u64,
}

impl From<&DocumentRecord> for DocumentSummary {
    fn from(record: &DocumentRecord) -> Self {
        Self {
            id: record.id.clone(),
            title: record.title.clone(),
            version: record.version,
        }
    }
}

/// Ordered document list together with its list ETag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentList {
    /// Documents in list order.
    pub documents: Vec<DocumentSummary>,
    /// Current list ETag.
    pub etag: String,
}

/// Mutable store state.
#[derive(Debug, Default)]
struct StoreState {
    /// Answers keyed by response set, then question.
    response_sets: BTreeMap<String, BTreeMap<String, Value>>,
    /// Documents keyed by id.
    documents: BTreeMap<String, DocumentRecord>,
    /// Document display order.
    order: Vec<String>,
    /// Next generated document number.
    next_document: u64,
}

/// Version pair hashed into the list ETag.
#[derive(Serialize)]
struct ListEntry<'a> {
    /// Document identifier.
    id: &'a str,
    /// Document version.
    version: u64,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Store errors.
///
/// # Invariants
/// - Variants are stable for problem mapping.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The addressed entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// The request conflicts with existing state.
    #[error("conflict: {0}")]
    Conflict(String),
    /// The request payload is invalid.
    #[error("invalid request: {0}")]
    Invalid(String),
    /// ETag derivation failed.
    #[error("etag derivation failed: {0}")]
    Hash(String),
    /// The store lock was poisoned.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// Shareable in-memory store.
///
/// Reads and writes are individually atomic; a lookup followed by a write
/// is not.
#[derive(Debug, Clone, Default)]
pub struct InMemoryQuestionnaireStore {
    /// Store state protected by a mutex.
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryQuestionnaireStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds one response set and two documents.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when seeding fails.
    pub fn seed_demo(&self) -> Result<(), StoreError> {
        self.put_answer(DEMO_RESPONSE_SET_ID, "q-name", Value::String("Ada".to_string()))?;
        self.create_document(Some("doc-intro".to_string()), "Introduction", "Welcome.")?;
        self.create_document(Some("doc-terms".to_string()), "Terms", "Be kind.")?;
        Ok(())
    }

    /// Clears all state.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] when the lock is poisoned.
    pub fn reset(&self) -> Result<(), StoreError> {
        *self.lock()? = StoreState::default();
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Answers
    // ------------------------------------------------------------------------

    /// Returns one answer.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when the answer does not exist.
    pub fn answer(&self, set: &str, question: &str) -> Result<AnswerRecord, StoreError> {
        let state = self.lock()?;
        let answers = state
            .response_sets
            .get(set)
            .ok_or_else(|| StoreError::NotFound(format!("response set {set}")))?;
        let value = answers
            .get(question)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("answer {set}/{question}")))?;
        Ok(AnswerRecord {
            response_set_id: set.to_string(),
            question_id: question.to_string(),
            value,
            etag: answers_etag(answers)?,
        })
    }

    /// Inserts or replaces an answer, creating the response set if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when identifiers are invalid or hashing fails.
    pub fn put_answer(
        &self,
        set: &str,
        question: &str,
        value: Value,
    ) -> Result<AnswerRecord, StoreError> {
        validate_id("response set id", set)?;
        validate_id("question id", question)?;
        let mut state = self.lock()?;
        let answers = state.response_sets.entry(set.to_string()).or_default();
        answers.insert(question.to_string(), value.clone());
        let etag = answers_etag(answers)?;
        drop(state);
        Ok(AnswerRecord {
            response_set_id: set.to_string(),
            question_id: question.to_string(),
            value,
            etag,
        })
    }

    /// Deletes an answer and returns the new response-set ETag.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when the answer does not exist.
    pub fn delete_answer(&self, set: &str, question: &str) -> Result<String, StoreError> {
        let mut state = self.lock()?;
        let answers = state
            .response_sets
            .get_mut(set)
            .ok_or_else(|| StoreError::NotFound(format!("response set {set}")))?;
        if answers.remove(question).is_none() {
            return Err(StoreError::NotFound(format!("answer {set}/{question}")));
        }
        answers_etag(answers)
    }

    /// Returns the response-set ETag, or `None` when the set does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the lock is poisoned or hashing fails.
    pub fn response_set_etag(&self, set: &str) -> Result<Option<String>, StoreError> {
        let state = self.lock()?;
        state.response_sets.get(set).map(answers_etag).transpose()
    }

    // ------------------------------------------------------------------------
    // Documents
    // ------------------------------------------------------------------------

    /// Creates a document and appends it to the list order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] when the id already exists.
    pub fn create_document(
        &self,
        id: Option<String>,
        title: &str,
        content: &str,
    ) -> Result<(DocumentRecord, String), StoreError> {
        validate_title(title)?;
        let mut state = self.lock()?;
        let id = match id {
            Some(id) => {
                validate_id("document id", &id)?;
                id
            }
            None => next_document_id(&mut state),
        };
        if state.documents.contains_key(&id) {
            return Err(StoreError::Conflict(format!("document {id} already exists")));
        }
        let record = DocumentRecord {
            id: id.clone(),
            title: title.to_string(),
            content: content.to_string(),
            version: 1,
        };
        let etag = document_etag(&record)?;
        state.documents.insert(id.clone(), record.clone());
        state.order.push(id);
        drop(state);
        Ok((record, etag))
    }

    /// Returns a document and its ETag.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when the document does not exist.
    pub fn document(&self, id: &str) -> Result<(DocumentRecord, String), StoreError> {
        let state = self.lock()?;
        let record = state
            .documents
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("document {id}")))?;
        drop(state);
        let etag = document_etag(&record)?;
        Ok((record, etag))
    }

    /// Updates a document title.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the document is missing or the title is invalid.
    pub fn update_title(
        &self,
        id: &str,
        title: &str,
    ) -> Result<(DocumentRecord, String), StoreError> {
        validate_title(title)?;
        self.modify_document(id, |record| title.clone_into(&mut record.title))
    }

    /// Replaces a document body.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when the document does not exist.
    pub fn put_content(
        &self,
        id: &str,
        content: &str,
    ) -> Result<(DocumentRecord, String), StoreError> {
        self.modify_document(id, |record| content.clone_into(&mut record.content))
    }

    /// Deletes a document and removes it from the list order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when the document does not exist.
    pub fn delete_document(&self, id: &str) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        if state.documents.remove(id).is_none() {
            return Err(StoreError::NotFound(format!("document {id}")));
        }
        state.order.retain(|entry| entry != id);
        Ok(())
    }

    /// Returns the current document ETag, or `None` when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the lock is poisoned or hashing fails.
    pub fn document_etag(&self, id: &str) -> Result<Option<String>, StoreError> {
        let state = self.lock()?;
        state.documents.get(id).map(document_etag).transpose()
    }

    /// Returns the documents in list order with the list ETag.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the lock is poisoned or hashing fails.
    pub fn list_documents(&self) -> Result<DocumentList, StoreError> {
        let state = self.lock()?;
        list_snapshot(&state)
    }

    /// Returns the current list ETag.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the lock is poisoned or hashing fails.
    pub fn list_etag(&self) -> Result<String, StoreError> {
        Ok(self.list_documents()?.etag)
    }

    /// Replaces the list order with a permutation of the current ids.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Invalid`] when `order` is not a permutation.
    pub fn reorder(&self, order: Vec<String>) -> Result<DocumentList, StoreError> {
        let mut state = self.lock()?;
        let mut requested = order.clone();
        requested.sort();
        let mut current = state.order.clone();
        current.sort();
        if requested != current {
            return Err(StoreError::Invalid(
                "order must be a permutation of the current document ids".to_string(),
            ));
        }
        state.order = order;
        list_snapshot(&state)
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    /// Applies a change to a document and bumps its version.
    fn modify_document(
        &self,
        id: &str,
        change: impl FnOnce(&mut DocumentRecord),
    ) -> Result<(DocumentRecord, String), StoreError> {
        let mut state = self.lock()?;
        let record = state
            .documents
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(format!("document {id}")))?;
        change(record);
        record.version += 1;
        let record = record.clone();
        drop(state);
        let etag = document_etag(&record)?;
        Ok((record, etag))
    }

    /// Locks the store state.
    fn lock(&self) -> Result<MutexGuard<'_, StoreState>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Unavailable("questionnaire store mutex poisoned".to_string()))
    }
}

impl CurrentEtagProvider for InMemoryQuestionnaireStore {
    fn current_etag(&self, target: &ResourceTarget) -> Result<Option<String>, EtagLookupError> {
        let result = match target.kind {
            ResourceKind::Answer => {
                let set = target.ids.parent_id.as_deref().ok_or_else(|| {
                    EtagLookupError::InvalidTarget("answer target missing response set".to_string())
                })?;
                self.response_set_etag(set)
            }
            ResourceKind::DocumentContent | ResourceKind::DocumentMetadata => {
                let id = target.ids.resource_id.as_deref().ok_or_else(|| {
                    EtagLookupError::InvalidTarget("document target missing id".to_string())
                })?;
                self.document_etag(id)
            }
            ResourceKind::DocumentReorder => self.list_etag().map(Some),
            ResourceKind::None => Ok(None),
        };
        result.map_err(|err| EtagLookupError::Unavailable(err.to_string()))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Derives the response-set ETag.
fn answers_etag(answers: &BTreeMap<String, Value>) -> Result<String, StoreError> {
    entity_etag(answers).map_err(|err| StoreError::Hash(err.to_string()))
}

/// Derives a document ETag.
fn document_etag(record: &DocumentRecord) -> Result<String, StoreError> {
    entity_etag(record).map_err(|err| StoreError::Hash(err.to_string()))
}

/// Builds the ordered list and its ETag from locked state.
fn list_snapshot(state: &StoreState) -> Result<DocumentList, StoreError> {
    let documents: Vec<DocumentSummary> = state
        .order
        .iter()
        .filter_map(|id| state.documents.get(id))
        .map(DocumentSummary::from)
        .collect();
    let entries: Vec<ListEntry<'_>> = documents
        .iter()
        .map(|summary| ListEntry {
            id: &summary.id,
            version: summary.version,
        })
        .collect();
    let etag = entity_etag(&entries).map_err(|err| StoreError::Hash(err.to_string()))?;
    Ok(DocumentList {
        documents,
        etag,
    })
}

/// Generates the next unused document id.
fn next_document_id(state: &mut StoreState) -> String {
    loop {
        state.next_document += 1;
        let candidate = format!("doc-{}", state.next_document);
        if !state.documents.contains_key(&candidate) {
            return candidate;
        }
    }
}

/// Validates a path-safe identifier.
fn validate_id(field: &str, value: &str) -> Result<(), StoreError> {
    if value.is_empty() || value.len() > MAX_ID_LENGTH {
        return Err(StoreError::Invalid(format!("{field} must be 1-{MAX_ID_LENGTH} characters")));
    }
    if !value.chars().all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.')) {
        return Err(StoreError::Invalid(format!("{field} contains unsupported characters")));
    }
    Ok(())
}

/// Validates a document title.
fn validate_title(title: &str) -> Result<(), StoreError> {
    if title.trim().is_empty() {
        return Err(StoreError::Invalid("title must be non-empty".to_string()));
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
