//! Content fingerprint of a mention list.
//!
//! A cached character list is only valid for the exact mentions it was
//! resolved from. The fingerprint is a `blake3` digest over every field of
//! every mention, in order, so any edit to the extraction output changes it.

use blake3::Hasher;

use crate::mention::RawMention;

fn update_field(h: &mut Hasher, field: &str) {
    // Length prefix keeps ("ab", "c") and ("a", "bc") apart.
    h.update(&(field.len() as u64).to_le_bytes());
    h.update(field.as_bytes());
}

/// Hex digest identifying a mention list.
///
/// # Examples
///
/// ```
/// use castlist::fingerprint::mention_fingerprint;
/// use castlist::RawMention;
///
/// let a = mention_fingerprint(&[RawMention::new("Shin")]);
/// let b = mention_fingerprint(&[RawMention::new("Shin")]);
/// assert_eq!(a, b);
/// assert_eq!(a.len(), 64);
/// ```
#[must_use]
pub fn mention_fingerprint(mentions: &[RawMention]) -> String {
    let mut h = Hasher::new();
    h.update(&(mentions.len() as u64).to_le_bytes());
    for mention in mentions {
        update_field(&mut h, &mention.name);
        update_field(&mut h, &mention.description);
        update_field(&mut h, &mention.role_hint.to_string());
    }
    h.finalize().to_hex().to_string()
}
