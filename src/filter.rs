//! Non-character filter.
//!
//! Flags mentions that are not real characters: insults, ranks and titles,
//! collective nouns, generic placeholders. Flagged mentions are dropped before
//! clustering and never show up in any output, not even as aliases.

use std::collections::HashSet;
use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::Blacklist;
use crate::error::ConfigError;
use crate::normalize::normalize;

/// Why a name was classified as noise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseKind {
    /// Exactly matches a blacklist literal.
    Blacklisted,
    /// Matches a rank or title pattern.
    Title,
    /// Matches a collective-noun or group pattern.
    Group,
}

impl fmt::Display for NoiseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blacklisted => write!(f, "blacklisted"),
            Self::Title => write!(f, "title"),
            Self::Group => write!(f, "group"),
        }
    }
}

fn compile_all(patterns: &[String]) -> Result<Vec<Regex>, ConfigError> {
    patterns
        .iter()
        .map(|p| {
            Regex::new(p).map_err(|e| ConfigError::InvalidPattern {
                pattern: p.clone(),
                reason: e.to_string(),
            })
        })
        .collect()
}

/// Compiled, immutable form of a [`Blacklist`].
#[derive(Debug, Clone)]
pub struct NonCharacterFilter {
    terms: HashSet<String>,
    titles: Vec<Regex>,
    groups: Vec<Regex>,
}

impl NonCharacterFilter {
    /// Compiles a blacklist. Fails on the first invalid regex.
    pub fn new(blacklist: &Blacklist) -> Result<Self, ConfigError> {
        Ok(Self {
            terms: blacklist
                .terms
                .iter()
                .map(|t| normalize(t))
                .filter(|t| !t.is_empty())
                .collect(),
            titles: compile_all(&blacklist.title_patterns)?,
            groups: compile_all(&blacklist.group_patterns)?,
        })
    }

    /// A filter that lets every name through.
    #[must_use]
    pub fn permissive() -> Self {
        Self {
            terms: HashSet::new(),
            titles: Vec::new(),
            groups: Vec::new(),
        }
    }

    /// Classifies a name. Literals are checked first, then title patterns,
    /// then group patterns.
    #[must_use]
    pub fn classify(&self, name: &str) -> Option<NoiseKind> {
        let key = normalize(name);
        if self.terms.contains(&key) {
            return Some(NoiseKind::Blacklisted);
        }
        if self.titles.iter().any(|re| re.is_match(&key)) {
            return Some(NoiseKind::Title);
        }
        if self.groups.iter().any(|re| re.is_match(&key)) {
            return Some(NoiseKind::Group);
        }
        None
    }

    /// Returns true if the name is not a real character.
    #[must_use]
    pub fn is_non_character(&self, name: &str) -> bool {
        self.classify(name).is_some()
    }
}
