//! Canonical name selection and character id generation.

use std::collections::HashSet;

use crate::character::CharacterId;

/// Slug used when a name has no alphanumeric characters at all.
const EMPTY_SLUG: &str = "unnamed";

fn is_all_uppercase(s: &str) -> bool {
    s.chars().any(char::is_alphabetic) && !s.chars().any(char::is_lowercase)
}

fn is_full_name_shaped(alias: &str) -> bool {
    alias.chars().any(char::is_whitespace) && !is_all_uppercase(alias) && alias.chars().count() > 3
}

/// Longest candidate by character count; the first one wins ties.
fn longest<'a>(candidates: impl Iterator<Item = &'a String>) -> Option<&'a String> {
    candidates.fold(None, |best: Option<&String>, alias| match best {
        Some(b) if b.chars().count() >= alias.chars().count() => Some(b),
        _ => Some(alias),
    })
}

/// Picks the canonical display name of a cluster.
///
/// Full-name-shaped aliases (containing whitespace, not all caps, longer
/// than three characters) are preferred over callsigns and nicknames; the
/// longest one wins. Without such an alias, the longest alias overall wins.
/// Returns `None` only for an empty slice.
///
/// # Examples
///
/// ```
/// use castlist::naming::select_primary;
///
/// let aliases = vec!["REAPER".to_string(), "Shinei Nouzen".to_string(), "Shin".to_string()];
/// assert_eq!(select_primary(&aliases), Some("Shinei Nouzen"));
/// ```
#[must_use]
pub fn select_primary(aliases: &[String]) -> Option<&str> {
    longest(aliases.iter().filter(|a| is_full_name_shaped(a)))
        .or_else(|| longest(aliases.iter()))
        .map(String::as_str)
}

/// Builds the slug for a name without collision handling:
/// `<prefix>_<lowercase name with non-alphanumeric runs as '_'>`.
///
/// # Examples
///
/// ```
/// use castlist::naming::slugify;
///
/// assert_eq!(slugify("char", "Shinei  Nouzen!"), "char_shinei_nouzen");
/// ```
#[must_use]
pub fn slugify(prefix: &str, name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_sep = false;
    for c in name.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            if pending_sep && !slug.is_empty() {
                slug.push('_');
            }
            pending_sep = false;
            slug.push(c);
        } else {
            pending_sep = true;
        }
    }
    if slug.is_empty() {
        slug.push_str(EMPTY_SLUG);
    }
    if prefix.is_empty() {
        slug
    } else {
        format!("{prefix}_{slug}")
    }
}

/// Hands out collision-free character ids for one resolution run.
///
/// The first character to claim a slug gets it verbatim; later ones get
/// `_2`, `_3`, ... skipping any id already handed out. Allocation order is
/// output order, so the same input always yields the same ids.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    prefix: String,
    taken: HashSet<String>,
}

impl IdAllocator {
    /// Creates an allocator for ids with the given literal tag.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            taken: HashSet::new(),
        }
    }

    /// Generates the id for a canonical name.
    pub fn generate_id(&mut self, name: &str) -> CharacterId {
        let base = slugify(&self.prefix, name);
        let mut candidate = base.clone();
        let mut n = 2u32;
        while self.taken.contains(&candidate) {
            candidate = format!("{base}_{n}");
            n = n.saturating_add(1);
        }
        self.taken.insert(candidate.clone());
        CharacterId::new(candidate)
    }
}
