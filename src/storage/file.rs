//! JSON file storage backend.
//!
//! One file per document, `<dir>/<document_id>_characters.json`. Writes go
//! to a temporary sibling first and are renamed into place after `fsync`,
//! so a reader never observes a half-written file.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::character::ResolvedCharacter;
use crate::storage::traits::{CachedCharacters, CharacterStore, DocumentId, StorageError};

fn io_err(path: &Path, e: &io::Error) -> StorageError {
    StorageError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}

fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
    let temp_path = path.with_extension(format!("json.tmp.{}", Uuid::new_v4()));
    let result = (|| -> io::Result<()> {
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        fs::rename(&temp_path, path)
    })();

    if let Err(e) = result {
        let _ = fs::remove_file(&temp_path);
        return Err(io_err(path, &e));
    }
    Ok(())
}

/// [`CharacterStore`] persisting each document as a JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileCharacterStore {
    dir: PathBuf,
}

impl JsonFileCharacterStore {
    /// Opens a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| io_err(&dir, &e))?;
        Ok(Self { dir })
    }

    /// Root directory of the store.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding the characters of a document.
    #[must_use]
    pub fn path_for(&self, document_id: DocumentId) -> PathBuf {
        self.dir.join(format!("{document_id}_characters.json"))
    }
}

impl CharacterStore for JsonFileCharacterStore {
    fn save(
        &self,
        document_id: DocumentId,
        fingerprint: &str,
        characters: Vec<ResolvedCharacter>,
    ) -> Result<(), StorageError> {
        let entry = CachedCharacters::new(document_id, fingerprint, characters);
        let bytes = serde_json::to_vec_pretty(&entry)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        let path = self.path_for(document_id);
        write_atomically(&path, &bytes)?;
        info!(
            document = %document_id,
            characters = entry.character_count,
            path = %path.display(),
            "cached characters"
        );
        Ok(())
    }

    /// Loads the entry for a document.
    ///
    /// A file that no longer parses is treated as a cache miss; the next
    /// `save` overwrites it.
    fn load(&self, document_id: DocumentId) -> Result<Option<CachedCharacters>, StorageError> {
        let path = self.path_for(document_id);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(document = %document_id, "character cache miss");
                return Ok(None);
            }
            Err(e) => return Err(io_err(&path, &e)),
        };

        match serde_json::from_slice::<CachedCharacters>(&bytes) {
            Ok(entry) => Ok(Some(entry)),
            Err(e) => {
                warn!(
                    document = %document_id,
                    path = %path.display(),
                    error = %e,
                    "ignoring unreadable character cache"
                );
                Ok(None)
            }
        }
    }

    fn delete(&self, document_id: DocumentId) -> Result<(), StorageError> {
        let path = self.path_for(document_id);
        match fs::remove_file(&path) {
            Ok(()) => {
                info!(document = %document_id, "deleted character cache");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_err(&path, &e)),
        }
    }

    fn exists(&self, document_id: DocumentId) -> Result<bool, StorageError> {
        Ok(self.path_for(document_id).is_file())
    }
}
