//! Storage contract for resolved character lists.
//!
//! Backends cache the output of one resolution run per document. Saving
//! replaces whatever was stored for that document; nothing is merged across
//! runs.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::character::{CharacterId, ResolvedCharacter};

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// No characters stored for the document.
    #[error("No characters cached for document {0}")]
    NotFound(DocumentId),

    /// Backend error.
    #[error("Storage backend error: {0}")]
    BackendError(String),

    /// Serialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Filesystem error.
    #[error("I/O error at {path}: {message}")]
    Io {
        /// Path being accessed.
        path: String,
        /// Underlying error message.
        message: String,
    },
}

/// Identifier of an uploaded document.
///
/// # Examples
///
/// ```
/// use castlist::DocumentId;
///
/// let id = DocumentId::new();
/// assert!(!id.is_nil());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(Uuid);

impl DocumentId {
    /// Creates a new random document ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a document ID from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Returns true if this is a nil (all zeros) UUID.
    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for DocumentId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// A stored character list together with what it was resolved from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedCharacters {
    /// Document the characters belong to.
    pub document_id: DocumentId,
    /// Resolved characters, in resolution order.
    pub characters: Vec<ResolvedCharacter>,
    /// Number of characters, kept alongside for readers of the raw file.
    pub character_count: usize,
    /// Fingerprint of the mention list the characters were resolved from.
    pub fingerprint: String,
    /// When the entry was written.
    pub cached_at: DateTime<Utc>,
}

impl CachedCharacters {
    /// Wraps a freshly resolved character list.
    #[must_use]
    pub fn new(
        document_id: DocumentId,
        fingerprint: impl Into<String>,
        characters: Vec<ResolvedCharacter>,
    ) -> Self {
        Self {
            document_id,
            character_count: characters.len(),
            characters,
            fingerprint: fingerprint.into(),
            cached_at: Utc::now(),
        }
    }

    /// Returns true if the entry was resolved from mentions with this fingerprint.
    #[must_use]
    pub fn is_fresh(&self, fingerprint: &str) -> bool {
        self.fingerprint == fingerprint
    }

    /// Looks up one character by id.
    #[must_use]
    pub fn character(&self, character_id: &CharacterId) -> Option<&ResolvedCharacter> {
        self.characters
            .iter()
            .find(|c| &c.character_id == character_id)
    }
}

/// Per-document cache of resolved characters.
///
/// Implementations must be safe to share across threads.
pub trait CharacterStore: Send + Sync {
    /// Stores the characters for a document, replacing any previous entry.
    fn save(
        &self,
        document_id: DocumentId,
        fingerprint: &str,
        characters: Vec<ResolvedCharacter>,
    ) -> Result<(), StorageError>;

    /// Loads the entry for a document, if any.
    fn load(&self, document_id: DocumentId) -> Result<Option<CachedCharacters>, StorageError>;

    /// Deletes the entry for a document. Deleting a missing entry succeeds.
    fn delete(&self, document_id: DocumentId) -> Result<(), StorageError>;

    /// Returns true if an entry exists for the document.
    fn exists(&self, document_id: DocumentId) -> Result<bool, StorageError> {
        Ok(self.load(document_id)?.is_some())
    }

    /// Loads one character of a document.
    fn get_character(
        &self,
        document_id: DocumentId,
        character_id: &CharacterId,
    ) -> Result<Option<ResolvedCharacter>, StorageError> {
        Ok(self
            .load(document_id)?
            .and_then(|cached| cached.character(character_id).cloned()))
    }

    /// Loads the entry for a document, failing with `NotFound` if absent.
    fn require(&self, document_id: DocumentId) -> Result<CachedCharacters, StorageError> {
        self.load(document_id)?
            .ok_or(StorageError::NotFound(document_id))
    }
}
