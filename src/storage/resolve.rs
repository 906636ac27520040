//! Normalisation of joined entity payloads coming back from the store

use crate::analytics::EntityMetadata;
use serde_json::Value;

/// Turn a joined entity payload into metadata.
///
/// Depending on the query shape the join yields an object, a list of objects,
/// or null. Lists resolve to their first element. Anything without a
/// non-empty string `id` resolves to `None`.
pub fn resolve_metadata(value: Value) -> Option<EntityMetadata> {
    let object = match value {
        Value::Array(items) => items.into_iter().next()?,
        other => other,
    };

    let Value::Object(fields) = object else {
        return None;
    };

    let text = |key: &str| match fields.get(key) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };

    let id = text("id").filter(|id| !id.is_empty())?;

    Some(EntityMetadata {
        id,
        title: text("title"),
        slug: text("slug"),
        published_at: text("published_at"),
    })
}

/// Parse the JSON text a SQL backend produced for the joined entity column
pub fn resolve_metadata_text(raw: Option<&str>) -> Option<EntityMetadata> {
    let raw = raw?;
    match serde_json::from_str(raw) {
        Ok(value) => resolve_metadata(value),
        Err(e) => {
            tracing::warn!("Discarding unparseable entity payload: {}", e);
            None
        }
    }
}
