//! # castlist - Character Entity Resolution
//!
//! castlist turns the noisy character list an extraction step pulls out of a
//! book into a minimal list of unique characters. Nicknames, callsigns,
//! spelling variants and partial names of the same person are merged into
//! one character with a canonical name and a stable id, while insults, ranks
//! and collective nouns that are not characters at all are dropped.
//!
//! ## Core Concepts
//!
//! - **RawMention**: one extracted reference to a possible character
//! - **Blacklist**: literals and regexes naming things that are not characters
//! - **PatternGroup**: names known to refer to the same character
//! - **EntityResolver**: filter, link pairwise, cluster, merge
//! - **ResolvedCharacter**: the merged output with every alias
//!
//! ## Usage
//!
//! ```rust
//! use castlist::{EntityResolver, PatternGroup, RawMention, ResolverConfig};
//!
//! let config = ResolverConfig::default()
//!     .with_pattern_group(PatternGroup::new("shin", ["shin", "undertaker", "reaper"]));
//! let resolver = EntityResolver::new(config)?;
//!
//! let characters = resolver.resolve(&[
//!     RawMention::new("Shin"),
//!     RawMention::new("Undertaker"),
//!     RawMention::new("Shinei Nouzen"),
//!     RawMention::new("idiot"),
//! ]);
//!
//! assert_eq!(characters.len(), 1);
//! assert_eq!(characters[0].name, "Shinei Nouzen");
//! assert_eq!(characters[0].character_id.as_str(), "char_shinei_nouzen");
//! # Ok::<(), castlist::ConfigError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Core types
pub mod character;
pub mod config;
pub mod error;
pub mod mention;

// Resolution pipeline
pub mod filter;
pub mod naming;
pub mod normalize;
pub mod resolver;
pub mod similarity;

// Around the pipeline: payload parsing, caching, per-document runtime
pub mod extraction;
pub mod fingerprint;
pub mod runtime;
pub mod storage;

// Re-export primary types at crate root for convenience
pub use character::{CharacterId, PersonalityProfile, ResolvedCharacter};
pub use config::{Blacklist, PatternGroup, ResolverConfig};
pub use error::{CastlistError, CastlistResult, ConfigError, ExecutionError, ExtractionError};
pub use filter::{NoiseKind, NonCharacterFilter};
pub use mention::{RawMention, Role};
pub use resolver::{DropReason, DroppedMention, EntityResolver, Resolution, ResolutionSummary};
pub use similarity::{similarity_ratio, MatchReason, SimilarityMatcher};

pub use runtime::{ResolutionHandle, ResolutionRuntime, RuntimeConfig};
pub use storage::{
    CachedCharacters, CharacterStore, DocumentId, InMemoryCharacterStore, JsonFileCharacterStore,
    StorageError,
};
