//! Entity resolution.
//!
//! Turns a noisy list of raw mentions into a minimal list of unique
//! characters:
//!
//! 1. drop malformed mentions (blank names) and non-character noise;
//! 2. build a graph with an edge between every pair of matching mentions;
//! 3. take connected components as clusters;
//! 4. merge each cluster into a [`ResolvedCharacter`], choose its canonical
//!    name and allocate its id.
//!
//! The result is a partition: every surviving mention belongs to exactly one
//! character. Resolution is pure and synchronous; the resolver holds only
//! read-only configuration and can be shared across threads.

pub mod graph;
mod merge;

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::character::ResolvedCharacter;
use crate::config::ResolverConfig;
use crate::error::ConfigError;
use crate::filter::{NoiseKind, NonCharacterFilter};
use crate::mention::RawMention;
use crate::naming::{select_primary, IdAllocator};
use crate::similarity::SimilarityMatcher;

pub use graph::{Edge, MentionGraph};

/// Why a mention did not make it into any character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "noise", rename_all = "snake_case")]
pub enum DropReason {
    /// Empty or whitespace-only name.
    Malformed,
    /// Flagged by the non-character filter.
    NonCharacter(NoiseKind),
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => write!(f, "malformed"),
            Self::NonCharacter(kind) => write!(f, "non_character({kind})"),
        }
    }
}

/// A mention removed before clustering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DroppedMention {
    /// Position in the input list.
    pub index: usize,
    /// Name as given.
    pub name: String,
    /// Why it was dropped.
    pub reason: DropReason,
}

/// Counts describing one resolution run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionSummary {
    /// Mentions handed in.
    pub input: usize,
    /// Mentions dropped for a blank name.
    pub malformed: usize,
    /// Mentions dropped as non-character noise.
    pub filtered: usize,
    /// Mentions that reached clustering.
    pub clustered: usize,
    /// Characters produced.
    pub characters: usize,
}

impl ResolutionSummary {
    /// Mentions folded into a character they did not name.
    #[must_use]
    pub const fn names_merged(&self) -> usize {
        self.clustered.saturating_sub(self.characters)
    }
}

/// Full outcome of a resolution run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// Resolved characters, ordered by earliest mention.
    pub characters: Vec<ResolvedCharacter>,
    /// Mentions removed before clustering, in input order.
    pub dropped: Vec<DroppedMention>,
    /// Graph edges between surviving mentions, as input positions.
    pub edges: Vec<Edge>,
    /// Run counters.
    pub summary: ResolutionSummary,
}

/// Merges raw mentions into unique characters.
///
/// # Examples
///
/// ```
/// use castlist::{EntityResolver, RawMention, ResolverConfig};
///
/// let resolver = EntityResolver::new(ResolverConfig::default())?;
/// let characters = resolver.resolve(&[
///     RawMention::new("Lena"),
///     RawMention::new("Vladilena Milizé"),
///     RawMention::new("the Captain"),
/// ]);
/// assert_eq!(characters.len(), 1);
/// assert_eq!(characters[0].name, "Vladilena Milizé");
/// assert_eq!(characters[0].aliases, vec!["Lena", "Vladilena Milizé"]);
/// # Ok::<(), castlist::ConfigError>(())
/// ```
#[derive(Debug, Clone)]
pub struct EntityResolver {
    filter: NonCharacterFilter,
    matcher: SimilarityMatcher,
    id_prefix: String,
}

impl EntityResolver {
    /// Compiles a configuration into a resolver.
    ///
    /// Every configuration problem (bad regex, threshold out of range, empty
    /// pattern group) surfaces here; `resolve` itself cannot fail.
    pub fn new(config: ResolverConfig) -> Result<Self, ConfigError> {
        let matcher = SimilarityMatcher::new(&config)?;
        let filter = NonCharacterFilter::new(&config.blacklist)?;
        Ok(Self {
            filter,
            matcher,
            id_prefix: config.id_prefix,
        })
    }

    /// Returns the compiled non-character filter.
    #[must_use]
    pub const fn filter(&self) -> &NonCharacterFilter {
        &self.filter
    }

    /// Returns the compiled similarity matcher.
    #[must_use]
    pub const fn matcher(&self) -> &SimilarityMatcher {
        &self.matcher
    }

    /// Resolves mentions into characters. An empty input yields an empty list.
    #[must_use]
    pub fn resolve(&self, mentions: &[RawMention]) -> Vec<ResolvedCharacter> {
        self.resolve_detailed(mentions).characters
    }

    /// Resolves mentions and reports what was dropped and why.
    #[must_use]
    pub fn resolve_detailed(&self, mentions: &[RawMention]) -> Resolution {
        let mut summary = ResolutionSummary {
            input: mentions.len(),
            ..ResolutionSummary::default()
        };
        let mut dropped = Vec::new();
        let mut surviving: Vec<usize> = Vec::with_capacity(mentions.len());

        for (index, mention) in mentions.iter().enumerate() {
            let reason = if mention.is_malformed() {
                summary.malformed += 1;
                Some(DropReason::Malformed)
            } else if let Some(kind) = self.filter.classify(&mention.name) {
                summary.filtered += 1;
                Some(DropReason::NonCharacter(kind))
            } else {
                None
            };

            match reason {
                Some(reason) => {
                    debug!(index, name = %mention.name, %reason, "dropping mention");
                    dropped.push(DroppedMention {
                        index,
                        name: mention.name.clone(),
                        reason,
                    });
                }
                None => surviving.push(index),
            }
        }
        summary.clustered = surviving.len();

        let prepared: Vec<_> = surviving
            .iter()
            .map(|&i| self.matcher.prepare(&mentions[i].name, &mentions[i].description))
            .collect();

        let mut graph = MentionGraph::new(surviving.len());
        for i in 0..prepared.len() {
            for j in (i + 1)..prepared.len() {
                if let Some(reason) = self.matcher.match_prepared(&prepared[i], &prepared[j]) {
                    debug!(
                        a = prepared[i].key(),
                        b = prepared[j].key(),
                        %reason,
                        "linking mentions"
                    );
                    graph.add_edge(i, j, reason);
                }
            }
        }

        let mut ids = IdAllocator::new(self.id_prefix.clone());
        let mut characters = Vec::new();
        for component in graph.components() {
            let record = merge::merge_cluster(component.iter().map(|&n| &mentions[surviving[n]]));
            let Some(name) = select_primary(&record.aliases).map(str::to_string) else {
                continue;
            };
            let character_id = ids.generate_id(&name);
            characters.push(ResolvedCharacter {
                character_id,
                name,
                aliases: record.aliases,
                description: record.description,
                role: record.role,
                personality: None,
            });
        }

        summary.characters = characters.len();

        info!(
            input = summary.input,
            malformed = summary.malformed,
            filtered = summary.filtered,
            characters = summary.characters,
            names_merged = summary.names_merged(),
            "resolved characters"
        );

        let edges = graph
            .edges()
            .map(|e| Edge {
                a: surviving[e.a],
                b: surviving[e.b],
                reason: e.reason,
            })
            .collect();

        Resolution {
            characters,
            dropped,
            edges,
            summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Blacklist, PatternGroup};
    use crate::mention::Role;
    use crate::similarity::MatchReason;

    fn resolver() -> EntityResolver {
        EntityResolver::new(ResolverConfig::default()).unwrap()
    }

    fn names(mentions: &[&str]) -> Vec<RawMention> {
        mentions.iter().map(|n| RawMention::new(*n)).collect()
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        let res = resolver().resolve_detailed(&[]);
        assert!(res.characters.is_empty());
        assert_eq!(res.summary, ResolutionSummary::default());
    }

    #[test]
    fn test_identical_mentions_collapse_to_one_alias() {
        let out = resolver().resolve(&names(&["Kurena", "Kurena"]));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].aliases, vec!["Kurena"]);
        assert_eq!(out[0].name, "Kurena");
        assert_eq!(out[0].character_id.as_str(), "char_kurena");
    }

    #[test]
    fn test_malformed_and_noise_are_reported() {
        let res =
            resolver().resolve_detailed(&names(&["  ", "idiot", "the Captain", "Shinei Nouzen"]));
        assert_eq!(res.characters.len(), 1);
        assert_eq!(res.summary.malformed, 1);
        assert_eq!(res.summary.filtered, 2);
        assert_eq!(res.summary.clustered, 1);
        assert_eq!(res.dropped[0].reason, DropReason::Malformed);
        assert_eq!(res.dropped[1].reason, DropReason::NonCharacter(NoiseKind::Blacklisted));
        assert_eq!(res.dropped[2].reason, DropReason::NonCharacter(NoiseKind::Title));
        assert_eq!(res.dropped[2].index, 2);
    }

    #[test]
    fn test_chained_signals_merge_transitively() {
        let config = ResolverConfig::default()
            .with_pattern_group(PatternGroup::new("shin", ["shin", "undertaker", "reaper"]));
        let resolver = EntityResolver::new(config).unwrap();

        let res = resolver.resolve_detailed(&names(&["Undertaker", "Lena", "Shinei Nouzen", "Shin"]));
        assert_eq!(res.characters.len(), 2);

        let shin = &res.characters[0];
        assert_eq!(shin.name, "Shinei Nouzen");
        assert_eq!(shin.aliases, vec!["Undertaker", "Shinei Nouzen", "Shin"]);
        assert_eq!(res.characters[1].aliases, vec!["Lena"]);

        // Undertaker and Shinei Nouzen are only connected through Shin.
        assert!(!res.edges.iter().any(|e| (e.a, e.b) == (0, 2)));
        assert!(res.edges.contains(&Edge { a: 0, b: 3, reason: MatchReason::PatternGroup }));
        assert!(res.edges.contains(&Edge { a: 2, b: 3, reason: MatchReason::Substring }));
        assert_eq!(res.summary.names_merged(), 2);
    }

    #[test]
    fn test_merged_record_takes_best_fields() {
        let mentions = vec![
            RawMention::new("Lena").with_role(Role::Supporting),
            RawMention::new("Vladilena Milizé")
                .with_description("Handler One, a Republic major")
                .with_role(Role::Protagonist),
            RawMention::new("Aragorn").with_description("A ranger"),
        ];
        let out = resolver().resolve(&mentions);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].role, Role::Protagonist);
        assert_eq!(out[0].description, "Handler One, a Republic major");
        assert_eq!(out[0].character_id.as_str(), "char_vladilena_milizé");
        assert_eq!(out[1].role, Role::Unknown);
    }

    #[test]
    fn test_colliding_names_get_distinct_ids() {
        // Two-letter parts never link, so these stay apart but slug identically.
        let out = resolver().resolve(&names(&["Jo-Jo", "Jo Jo!"]));
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].character_id.as_str(), "char_jo_jo");
        assert_eq!(out[1].character_id.as_str(), "char_jo_jo_2");
    }

    #[test]
    fn test_empty_blacklist_keeps_everything() {
        let config = ResolverConfig::default().with_blacklist(Blacklist::empty());
        let resolver = EntityResolver::new(config).unwrap();
        let out = resolver.resolve(&names(&["idiot"]));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].aliases, vec!["idiot"]);
    }

    #[test]
    fn test_bad_pattern_fails_at_construction() {
        let config = ResolverConfig::default().with_blacklist(Blacklist {
            terms: Vec::new(),
            title_patterns: Vec::new(),
            group_patterns: vec!["[".to_string()],
        });
        assert!(matches!(
            EntityResolver::new(config),
            Err(ConfigError::InvalidPattern { .. })
        ));
    }
}
