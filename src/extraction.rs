//! Parsing of the upstream extraction payload.
//!
//! The extraction step is an LLM prompted to list characters as JSON. Its
//! reply is often wrapped in a Markdown code fence and comes in one of two
//! shapes:
//!
//! ```json
//! [{"name": "Shinei Nouzen", "description": "...", "role": "protagonist"}]
//! ```
//!
//! or
//!
//! ```json
//! {"characters": ["Shinei Nouzen", {"name": "Lena", "role": "supporting"}]}
//! ```
//!
//! Items without a usable name are skipped rather than rejected.

use serde::Deserialize;
use serde_json::Value;

use crate::error::ExtractionError;
use crate::mention::{RawMention, Role};

#[derive(Debug, Deserialize)]
struct WireMention {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    role: Option<String>,
}

/// Removes a surrounding ```` ``` ```` or ```` ```json ```` fence, if any.
#[must_use]
pub fn strip_code_fence(payload: &str) -> &str {
    let trimmed = payload.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json", "JSON", ...) on the opening line.
    let body = match rest.find('\n') {
        Some(pos) if rest[..pos].chars().all(char::is_alphanumeric) => &rest[pos + 1..],
        _ => rest,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

fn shape_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object without a 'characters' list",
    }
}

fn mention_from_item(item: Value) -> Option<RawMention> {
    let mention = match item {
        Value::String(name) => Some(RawMention::new(name)),
        Value::Object(_) => {
            let wire: WireMention = serde_json::from_value(item).ok()?;
            let name = wire.name?;
            Some(RawMention {
                name,
                description: wire.description.unwrap_or_default(),
                role_hint: wire.role.as_deref().map_or(Role::Unknown, Role::parse_hint),
            })
        }
        _ => None,
    };
    mention.filter(|m| !m.is_malformed())
}

/// Parses an extraction payload into raw mentions, in payload order.
///
/// # Examples
///
/// ```
/// use castlist::extraction::parse_mentions;
/// use castlist::Role;
///
/// let payload = "```json\n[{\"name\": \"Shin\", \"role\": \"Protagonist\"}]\n```";
/// let mentions = parse_mentions(payload)?;
/// assert_eq!(mentions[0].name, "Shin");
/// assert_eq!(mentions[0].role_hint, Role::Protagonist);
/// # Ok::<(), castlist::ExtractionError>(())
/// ```
pub fn parse_mentions(payload: &str) -> Result<Vec<RawMention>, ExtractionError> {
    let body = strip_code_fence(payload);
    let value: Value = serde_json::from_str(body).map_err(|e| ExtractionError::InvalidJson {
        message: e.to_string(),
    })?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("characters") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(ExtractionError::UnexpectedShape {
                    found: shape_of(&Value::Object(map)).to_string(),
                })
            }
        },
        other => {
            return Err(ExtractionError::UnexpectedShape {
                found: shape_of(&other).to_string(),
            })
        }
    };

    Ok(items.into_iter().filter_map(mention_from_item).collect())
}
