//! Merging one cluster of mentions into a single record.

use std::collections::HashSet;

use crate::mention::{RawMention, Role};
use crate::normalize::{display_form, normalize};

/// Merged fields of a cluster, before naming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ClusterRecord {
    /// Distinct names in discovery order; first casing seen wins.
    pub aliases: Vec<String>,
    /// Longest non-empty description (first one on ties), or empty.
    pub description: String,
    /// Highest-priority role present.
    pub role: Role,
}

/// Merges mentions given in discovery order.
pub(crate) fn merge_cluster<'a>(mentions: impl IntoIterator<Item = &'a RawMention>) -> ClusterRecord {
    let mut seen = HashSet::new();
    let mut aliases = Vec::new();
    let mut description: &str = "";
    let mut description_len = 0usize;
    let mut role = Role::Unknown;

    for mention in mentions {
        if seen.insert(normalize(&mention.name)) {
            aliases.push(display_form(&mention.name));
        }

        let text = mention.description.trim();
        let len = text.chars().count();
        if len > description_len {
            description = text;
            description_len = len;
        }

        role = role.max(mention.role_hint);
    }

    ClusterRecord {
        aliases,
        description: description.to_string(),
        role,
    }
}
