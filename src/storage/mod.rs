//! Caching of resolved character lists per document.
//!
//! [`CharacterStore`] is the contract; [`InMemoryCharacterStore`] and
//! [`JsonFileCharacterStore`] are the provided backends.

mod file;
mod memory;
mod traits;

pub use file::JsonFileCharacterStore;
pub use memory::InMemoryCharacterStore;
pub use traits::{CachedCharacters, CharacterStore, DocumentId, StorageError};
