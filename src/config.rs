//! Resolver configuration.
//!
//! Blacklists and pattern groups are plain data supplied when a resolver is
//! built. They are read-only afterwards, so one resolver can serve many
//! concurrent runs.
//!
//! Configuration can be loaded from JSON; every field is optional:
//!
//! ```json
//! {
//!   "fuzzy_threshold": 0.85,
//!   "pattern_groups": [
//!     { "name": "shinei_nouzen", "tokens": ["shin", "undertaker", "reaper"] }
//!   ]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default minimum similarity ratio for a fuzzy match.
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.85;

/// Default literal tag for generated character ids.
pub const DEFAULT_ID_PREFIX: &str = "char";

const DEFAULT_TERMS: &[&str] = &[
    // insults and epithets
    "idiot",
    "fool",
    "moron",
    "bastard",
    "coward",
    "brat",
    "pig",
    "pigs",
    // generic person references
    "man",
    "woman",
    "boy",
    "girl",
    "person",
    "stranger",
    "narrator",
    "the man",
    "the woman",
    "the boy",
    "the girl",
    "the person",
    "the stranger",
    "the narrator",
    "a man",
    "a woman",
    "someone",
    "somebody",
    "nobody",
    "everyone",
    "everybody",
    "unknown",
    "he",
    "she",
    "they",
    "him",
    "her",
    "you",
    "i",
];

const DEFAULT_TITLE_PATTERNS: &[&str] = &[
    r"^(the\s+)?(second\s+|first\s+)?(captain|lieutenant|major|colonel|general|sergeant|corporal|private|commander|commandant|handler|officer|admiral|marshal)$",
    r"^(the\s+)?(king|queen|prince|princess|emperor|empress|lord|lady|sir|madam|duke|duchess|count|countess)$",
    r"^(the\s+)?(doctor|professor|director|president|chief|boss|master|teacher|priest)$",
];

const DEFAULT_GROUP_PATTERNS: &[&str] = &[
    r"^(the\s+)?(eighty[\s-]?six|86|soldiers|troops|army|squadron|squad|platoon|regiment|legion|battalion)$",
    r"^(the\s+)?(people|villagers|citizens|crowd|men|women|children|kids|family|guards|enemy|enemies|others|everyone|humans)$",
    r"^(the\s+)?[\p{L}\d]+\s+(squadron|squad|platoon|regiment|corps|unit|army|family|clan|council)$",
];

const DEFAULT_TITLE_WORDS: &[&str] = &[
    "the", "mr", "mrs", "ms", "miss", "dr", "sir", "lady", "lord", "madam", "captain",
    "lieutenant", "major", "colonel", "general", "sergeant", "commander", "handler", "king",
    "queen", "prince", "princess", "professor", "doctor", "father", "mother", "uncle", "aunt",
    "saint", "master", "von", "van", "de",
];

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

/// Terms and regex patterns describing non-character noise.
///
/// Patterns are matched against the normalized (lowercase) name.
///
/// When given in JSON, omitted lists are empty rather than the built-in
/// defaults; omit the whole `blacklist` object to keep the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blacklist {
    /// Literal names that are never characters.
    #[serde(default)]
    pub terms: Vec<String>,
    /// Rank and title patterns (e.g. "the captain").
    #[serde(default)]
    pub title_patterns: Vec<String>,
    /// Collective-noun and group patterns (e.g. "soldiers").
    #[serde(default)]
    pub group_patterns: Vec<String>,
}

impl Blacklist {
    /// A blacklist that filters nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            terms: Vec::new(),
            title_patterns: Vec::new(),
            group_patterns: Vec::new(),
        }
    }

    /// Returns true if there is nothing to filter.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty() && self.title_patterns.is_empty() && self.group_patterns.is_empty()
    }
}

impl Default for Blacklist {
    fn default() -> Self {
        Self {
            terms: to_strings(DEFAULT_TERMS),
            title_patterns: to_strings(DEFAULT_TITLE_PATTERNS),
            group_patterns: to_strings(DEFAULT_GROUP_PATTERNS),
        }
    }
}

/// A named set of tokens known to belong to one character, such as a
/// callsign and a given name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternGroup {
    /// Label used in logs and errors.
    pub name: String,
    /// Names or name parts, matched after normalization.
    pub tokens: Vec<String>,
}

impl PatternGroup {
    /// Creates a pattern group.
    #[must_use]
    pub fn new<I, S>(name: impl Into<String>, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }
}

/// Configuration for an [`EntityResolver`](crate::EntityResolver).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Minimum similarity ratio for the fuzzy rule. Raising it merges less.
    pub fuzzy_threshold: f64,
    /// Non-character noise to drop before clustering.
    pub blacklist: Blacklist,
    /// Known equivalences between names.
    pub pattern_groups: Vec<PatternGroup>,
    /// Words that never count as a shared name part.
    pub title_words: Vec<String>,
    /// Literal tag prefixed to every character id.
    pub id_prefix: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            blacklist: Blacklist::default(),
            pattern_groups: Vec::new(),
            title_words: to_strings(DEFAULT_TITLE_WORDS),
            id_prefix: DEFAULT_ID_PREFIX.to_string(),
        }
    }
}

impl ResolverConfig {
    /// Sets the fuzzy threshold.
    #[must_use]
    pub fn with_fuzzy_threshold(mut self, threshold: f64) -> Self {
        self.fuzzy_threshold = threshold;
        self
    }

    /// Replaces the blacklist.
    #[must_use]
    pub fn with_blacklist(mut self, blacklist: Blacklist) -> Self {
        self.blacklist = blacklist;
        self
    }

    /// Adds a pattern group.
    #[must_use]
    pub fn with_pattern_group(mut self, group: PatternGroup) -> Self {
        self.pattern_groups.push(group);
        self
    }

    /// Parses a configuration from JSON.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Reads and parses a JSON configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json_str(&raw)
    }

    /// Checks value ranges. Regex syntax is checked when the filter is compiled.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.fuzzy_threshold) {
            return Err(ConfigError::InvalidThreshold {
                value: self.fuzzy_threshold,
            });
        }
        for group in &self.pattern_groups {
            if group.tokens.iter().all(|t| t.trim().is_empty()) {
                return Err(ConfigError::EmptyPatternGroup {
                    name: group.name.clone(),
                });
            }
        }
        Ok(())
    }
}
