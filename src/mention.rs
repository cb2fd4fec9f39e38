//! Raw character mentions as handed over by the extraction step.
//!
//! A mention is one character reference found in source text, before any
//! deduplication. Mentions are immutable and consumed once by the resolver.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Narrative role of a character.
///
/// Variants are declared in ascending priority so that `Ord` picks the
/// strongest role with `max()`: protagonist > antagonist > supporting > unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// No usable role hint.
    #[default]
    Unknown,
    /// A secondary character.
    Supporting,
    /// The main opposing character.
    Antagonist,
    /// The main character.
    Protagonist,
}

impl Role {
    /// Parses a free-text role hint. Anything unrecognized maps to `Unknown`.
    ///
    /// # Examples
    ///
    /// ```
    /// use castlist::Role;
    ///
    /// assert_eq!(Role::parse_hint(" Protagonist "), Role::Protagonist);
    /// assert_eq!(Role::parse_hint("supporting character"), Role::Supporting);
    /// assert_eq!(Role::parse_hint("mentor"), Role::Unknown);
    /// ```
    #[must_use]
    pub fn parse_hint(hint: &str) -> Self {
        match hint.trim().to_lowercase().as_str() {
            "protagonist" | "main" | "main character" | "hero" => Self::Protagonist,
            "antagonist" | "villain" => Self::Antagonist,
            "supporting" | "supporting character" | "side" | "side character" | "secondary" => {
                Self::Supporting
            }
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Protagonist => write!(f, "protagonist"),
            Self::Antagonist => write!(f, "antagonist"),
            Self::Supporting => write!(f, "supporting"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// One character reference as extracted from text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMention {
    /// The name as it appeared in the source text.
    pub name: String,

    /// Scene-local free text; may be empty.
    #[serde(default)]
    pub description: String,

    /// Role guess from the extraction step.
    #[serde(default, rename = "role")]
    pub role_hint: Role,
}

impl RawMention {
    /// Creates a mention with no description and an unknown role.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            role_hint: Role::Unknown,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the role hint.
    #[must_use]
    pub fn with_role(mut self, role: Role) -> Self {
        self.role_hint = role;
        self
    }

    /// Returns true if the name is empty after trimming.
    ///
    /// Such mentions are malformed and are dropped before filtering.
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        self.name.trim().is_empty()
    }
}
