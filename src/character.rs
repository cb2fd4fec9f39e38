//! Resolved character types.
//!
//! A `ResolvedCharacter` is the unit the downstream presentation and storage
//! layers consume. It is self-contained: nothing in it refers back to the
//! mentions it was merged from, so it serializes on its own.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::mention::Role;

/// Stable slug identifier of a resolved character, unique within one run.
///
/// # Examples
///
/// ```
/// use castlist::CharacterId;
///
/// let id = CharacterId::new("char_shinei_nouzen");
/// assert_eq!(id.as_str(), "char_shinei_nouzen");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CharacterId(String);

impl CharacterId {
    /// Wraps an already generated slug.
    #[must_use]
    pub fn new(slug: impl Into<String>) -> Self {
        Self(slug.into())
    }

    /// Returns the slug.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<CharacterId> for String {
    fn from(id: CharacterId) -> Self {
        id.0
    }
}

impl AsRef<str> for CharacterId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Personality profile attached by the external enrichment step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalityProfile {
    /// Physical appearance and personality traits.
    #[serde(default)]
    pub description: String,

    /// The character's personal story arc.
    #[serde(default)]
    pub story_summary: String,

    /// Narrative function (mentor, rival, ...), free text.
    #[serde(default)]
    pub role_in_story: String,

    /// Key relationships with other characters.
    #[serde(default)]
    pub relationships: String,

    /// How the character speaks.
    #[serde(default)]
    pub voice_and_tone: String,

    /// Representative lines from the text.
    #[serde(default)]
    pub key_quotes: Vec<String>,

    /// Short trait labels ("stoic", "reckless").
    #[serde(default)]
    pub personality_traits: Vec<String>,
}

/// A unique character after merging.
///
/// `aliases` is never empty and always contains `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedCharacter {
    /// Stable id derived from `name`, unique within one run.
    pub character_id: CharacterId,

    /// Canonical display name, one of `aliases`.
    pub name: String,

    /// Distinct raw names of the cluster in discovery order.
    pub aliases: Vec<String>,

    /// Longest description among the merged mentions.
    #[serde(default)]
    pub description: String,

    /// Highest-priority role hint among the merged mentions.
    pub role: Role,

    /// Enrichment added after resolution; never set by the resolver.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personality: Option<PersonalityProfile>,
}

impl ResolvedCharacter {
    /// Attaches a personality profile. Used by enrichment after resolution.
    #[must_use]
    pub fn with_personality(mut self, profile: PersonalityProfile) -> Self {
        self.personality = Some(profile);
        self
    }

    /// Returns the number of aliases, including the canonical name.
    #[must_use]
    pub fn alias_count(&self) -> usize {
        self.aliases.len()
    }

    /// Returns true if more than one name variant was merged into this character.
    #[must_use]
    pub fn has_merged_aliases(&self) -> bool {
        self.aliases.len() > 1
    }

    /// Returns true if `name` is one of this character's aliases, ignoring case
    /// and surrounding whitespace.
    #[must_use]
    pub fn answers_to(&self, name: &str) -> bool {
        let key = crate::normalize::normalize(name);
        self.aliases
            .iter()
            .any(|a| crate::normalize::normalize(a) == key)
    }
}
