//! In-memory storage backend.
//!
//! Thread-safe, process-local. Intended for embedded usage and tests.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::character::ResolvedCharacter;
use crate::storage::traits::{CachedCharacters, CharacterStore, DocumentId, StorageError};

fn lock_err(context: &'static str) -> StorageError {
    StorageError::BackendError(format!("poisoned lock: {context}"))
}

/// [`CharacterStore`] backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct InMemoryCharacterStore {
    entries: RwLock<HashMap<DocumentId, CachedCharacters>>,
}

impl InMemoryCharacterStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents with cached characters.
    pub fn len(&self) -> Result<usize, StorageError> {
        let entries = self.entries.read().map_err(|_| lock_err("len"))?;
        Ok(entries.len())
    }

    /// Returns true if nothing is cached.
    pub fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.len()? == 0)
    }
}

impl CharacterStore for InMemoryCharacterStore {
    fn save(
        &self,
        document_id: DocumentId,
        fingerprint: &str,
        characters: Vec<ResolvedCharacter>,
    ) -> Result<(), StorageError> {
        let entry = CachedCharacters::new(document_id, fingerprint, characters);
        let mut entries = self.entries.write().map_err(|_| lock_err("save"))?;
        entries.insert(document_id, entry);
        Ok(())
    }

    fn load(&self, document_id: DocumentId) -> Result<Option<CachedCharacters>, StorageError> {
        let entries = self.entries.read().map_err(|_| lock_err("load"))?;
        Ok(entries.get(&document_id).cloned())
    }

    fn delete(&self, document_id: DocumentId) -> Result<(), StorageError> {
        let mut entries = self.entries.write().map_err(|_| lock_err("delete"))?;
        entries.remove(&document_id);
        Ok(())
    }

    fn exists(&self, document_id: DocumentId) -> Result<bool, StorageError> {
        let entries = self.entries.read().map_err(|_| lock_err("exists"))?;
        Ok(entries.contains_key(&document_id))
    }
}
