//! Name similarity.
//!
//! Two mentions denote the same entity if any one of six independent rules
//! holds: exact, fuzzy, substring, shared name part, pattern group, or a
//! cross-reference in a description. The rules form a pure OR; they run in
//! that order and stop at the first hit, which is reported as a
//! [`MatchReason`].

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::ResolverConfig;
use crate::error::ConfigError;
use crate::normalize::{name_parts, normalize};

/// Shorter name must be longer than this for the substring rule.
const MIN_SUBSTRING_LEN: usize = 2;

/// Shared name part must be longer than this for the name-parts rule.
const MIN_SHARED_PART_LEN: usize = 2;

/// The rule that linked two names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchReason {
    /// Normalized names are equal.
    Exact,
    /// Similarity ratio reached the threshold.
    Fuzzy,
    /// One name contains the other (nicknames).
    Substring,
    /// The names share a non-title part.
    NameParts,
    /// Both names hit the same configured pattern group.
    PatternGroup,
    /// One description mentions the other name.
    CrossReference,
}

impl fmt::Display for MatchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact => write!(f, "exact"),
            Self::Fuzzy => write!(f, "fuzzy"),
            Self::Substring => write!(f, "substring"),
            Self::NameParts => write!(f, "name_parts"),
            Self::PatternGroup => write!(f, "pattern_group"),
            Self::CrossReference => write!(f, "cross_reference"),
        }
    }
}

/// Similarity ratio of two strings in `[0, 1]`.
///
/// Twice the number of characters covered by the longest-matching-block
/// alignment, divided by the total length of both strings. Operates on
/// Unicode scalar values; two empty strings are identical.
///
/// # Examples
///
/// ```
/// use castlist::similarity::similarity_ratio;
///
/// assert_eq!(similarity_ratio("abcd", "abcd"), 1.0);
/// assert!(similarity_ratio("vladilena milizé", "vladilena milize") > 0.9);
/// ```
#[must_use]
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    ratio_of(&a, &b)
}

#[allow(clippy::cast_precision_loss)]
fn ratio_of(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_chars(a, b) as f64 / total as f64
}

/// Longest common block `(start_a, start_b, len)`; earliest in `a` on ties.
fn longest_match(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        for (j, cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb { prev[j] + 1 } else { 0 };
            let k = curr[j + 1];
            if k > best.2 {
                best = (i + 1 - k, j + 1 - k, k);
            }
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    best
}

/// Total size of all matching blocks, found by recursing on both sides of
/// the longest block.
fn matching_chars(a: &[char], b: &[char]) -> usize {
    let mut total = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];

    while let Some((a_lo, a_hi, b_lo, b_hi)) = pending.pop() {
        let (i, j, k) = longest_match(&a[a_lo..a_hi], &b[b_lo..b_hi]);
        if k == 0 {
            continue;
        }
        total += k;
        let (i, j) = (a_lo + i, b_lo + j);
        if a_lo < i && b_lo < j {
            pending.push((a_lo, i, b_lo, j));
        }
        if i + k < a_hi && j + k < b_hi {
            pending.push((i + k, a_hi, j + k, b_hi));
        }
    }
    total
}

#[derive(Debug, Clone)]
struct CompiledGroup {
    name: String,
    tokens: HashSet<String>,
}

/// A mention prepared once for repeated pairwise comparison.
#[derive(Debug, Clone)]
pub(crate) struct PreparedName {
    key: String,
    chars: Vec<char>,
    parts: HashSet<String>,
    description: String,
    groups: Vec<usize>,
}

impl PreparedName {
    pub(crate) fn key(&self) -> &str {
        &self.key
    }
}

/// Decides whether two names denote the same character.
#[derive(Debug, Clone)]
pub struct SimilarityMatcher {
    fuzzy_threshold: f64,
    title_words: HashSet<String>,
    groups: Vec<CompiledGroup>,
}

impl SimilarityMatcher {
    /// Builds a matcher from validated configuration.
    pub fn new(config: &ResolverConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let groups = config
            .pattern_groups
            .iter()
            .map(|g| CompiledGroup {
                name: g.name.clone(),
                tokens: g
                    .tokens
                    .iter()
                    .map(|t| normalize(t))
                    .filter(|t| !t.is_empty())
                    .collect(),
            })
            .collect();

        Ok(Self {
            fuzzy_threshold: config.fuzzy_threshold,
            title_words: config
                .title_words
                .iter()
                .map(|w| normalize(w))
                .filter(|w| !w.is_empty())
                .collect(),
            groups,
        })
    }

    /// Returns the configured fuzzy threshold.
    #[must_use]
    pub const fn fuzzy_threshold(&self) -> f64 {
        self.fuzzy_threshold
    }

    /// Names of the pattern groups a name falls into.
    #[must_use]
    pub fn groups_of(&self, name: &str) -> Vec<&str> {
        let prepared = self.prepare(name, "");
        prepared
            .groups
            .iter()
            .map(|&i| self.groups[i].name.as_str())
            .collect()
    }

    pub(crate) fn prepare(&self, name: &str, description: &str) -> PreparedName {
        let key = normalize(name);
        let parts: HashSet<String> = name_parts(&key).map(str::to_string).collect();
        let groups = self
            .groups
            .iter()
            .enumerate()
            .filter(|(_, g)| g.tokens.contains(&key) || parts.iter().any(|p| g.tokens.contains(p)))
            .map(|(i, _)| i)
            .collect();

        PreparedName {
            chars: key.chars().collect(),
            key,
            parts,
            description: normalize(description),
            groups,
        }
    }

    /// Returns the first rule linking the two names, if any.
    #[must_use]
    pub fn match_reason(
        &self,
        name_a: &str,
        name_b: &str,
        desc_a: &str,
        desc_b: &str,
    ) -> Option<MatchReason> {
        let a = self.prepare(name_a, desc_a);
        let b = self.prepare(name_b, desc_b);
        self.match_prepared(&a, &b)
    }

    /// Returns true if the two names denote the same entity.
    #[must_use]
    pub fn are_same(&self, name_a: &str, name_b: &str, desc_a: &str, desc_b: &str) -> bool {
        self.match_reason(name_a, name_b, desc_a, desc_b).is_some()
    }

    pub(crate) fn match_prepared(&self, a: &PreparedName, b: &PreparedName) -> Option<MatchReason> {
        if a.key == b.key {
            return Some(MatchReason::Exact);
        }
        if self.is_fuzzy_match(a, b) {
            return Some(MatchReason::Fuzzy);
        }
        if Self::is_substring_match(a, b) {
            return Some(MatchReason::Substring);
        }
        if self.shares_name_part(a, b) {
            return Some(MatchReason::NameParts);
        }
        if a.groups.iter().any(|g| b.groups.contains(g)) {
            return Some(MatchReason::PatternGroup);
        }
        if Self::is_cross_referenced(a, b) {
            return Some(MatchReason::CrossReference);
        }
        None
    }

    #[allow(clippy::cast_precision_loss)]
    fn is_fuzzy_match(&self, a: &PreparedName, b: &PreparedName) -> bool {
        let total = a.chars.len() + b.chars.len();
        if total == 0 {
            return true;
        }
        // The ratio can never exceed 2*min/total; skip the alignment when that bound fails.
        let bound = 2.0 * a.chars.len().min(b.chars.len()) as f64 / total as f64;
        if bound < self.fuzzy_threshold {
            return false;
        }
        ratio_of(&a.chars, &b.chars) >= self.fuzzy_threshold
    }

    fn is_substring_match(a: &PreparedName, b: &PreparedName) -> bool {
        let (short, long) = if a.chars.len() <= b.chars.len() {
            (a, b)
        } else {
            (b, a)
        };
        short.chars.len() > MIN_SUBSTRING_LEN && long.key.contains(&short.key)
    }

    fn shares_name_part(&self, a: &PreparedName, b: &PreparedName) -> bool {
        a.parts.iter().any(|p| {
            p.chars().count() > MIN_SHARED_PART_LEN
                && !self.title_words.contains(p)
                && b.parts.contains(p)
        })
    }

    fn is_cross_referenced(a: &PreparedName, b: &PreparedName) -> bool {
        (!a.description.is_empty() && a.description.contains(&b.key))
            || (!b.description.is_empty() && b.description.contains(&a.key))
    }
}
