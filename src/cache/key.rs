//! Cache Key Generation
//!
//! Builds the deterministic identity string of a remote operation.

use std::collections::BTreeMap;

use serde_json::Value;

/// Filter mapping attached to an operation.
///
/// Keys are kept sorted. Nested objects are re-sorted while the key is
/// written, so the encoding never depends on `serde_json`'s map ordering.
pub type Filters = BTreeMap<String, Value>;

/// Separator between the method, owner and repo components.
pub const KEY_SEPARATOR: char = ':';

/// Serialization used for absent or empty filters.
pub const EMPTY_FILTERS: &str = "{}";

/// Stand-in when the filters cannot be serialized.
pub const UNSERIALIZABLE_FILTERS: &str = "<unserializable>";

// == Generate Key ==
/// Returns the cache key for `method` on `owner/repo` with `filters`.
///
/// Identical inputs always produce identical keys. `None` and an empty map
/// produce the same key. Never fails.
pub fn generate_key(method: &str, owner: &str, repo: &str, filters: Option<&Filters>) -> String {
    let filters = match filters {
        Some(filters) if !filters.is_empty() => {
            let mut out = String::new();
            match write_object(filters.iter(), &mut out) {
                Ok(()) => out,
                Err(_) => UNSERIALIZABLE_FILTERS.to_string(),
            }
        }
        _ => EMPTY_FILTERS.to_string(),
    };

    format!(
        "{method}{sep}{owner}{sep}{repo}{sep}{filters}",
        sep = KEY_SEPARATOR
    )
}

/// Writes `value` as compact JSON with every object's keys sorted.
fn write_canonical(value: &Value, out: &mut String) -> serde_json::Result<()> {
    match value {
        Value::Object(map) => write_object(map.iter(), out),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out)?;
            }
            out.push(']');
            Ok(())
        }
        scalar => {
            out.push_str(&serde_json::to_string(scalar)?);
            Ok(())
        }
    }
}

fn write_object<'a>(
    entries: impl Iterator<Item = (&'a String, &'a Value)>,
    out: &mut String,
) -> serde_json::Result<()> {
    let sorted: BTreeMap<&String, &Value> = entries.collect();

    out.push('{');
    for (i, (key, value)) in sorted.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&serde_json::to_string(key)?);
        out.push(':');
        write_canonical(value, out)?;
    }
    out.push('}');
    Ok(())
}
