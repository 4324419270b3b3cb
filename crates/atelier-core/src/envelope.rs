use serde_json::Value;
use tracing::warn;

/// Tagged outcome of list-envelope normalization.
///
/// The backend is inconsistent about list responses: some endpoints return a
/// bare array, some wrap it as `{data: [...]}`, and paginated endpoints nest
/// it as `{data: {data: [...]}}`. Normalization makes that ambiguity explicit
/// and observable instead of sniffing shapes at every call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedList {
    /// The body matched a known envelope and produced items.
    Items(Vec<Value>),
    /// The body matched a known envelope but carried no items.
    Empty,
    /// The body matched none of the known envelopes. Callers treat this as an
    /// empty result; the raw body is retained for diagnostics.
    Unrecognized(Value),
}

impl NormalizedList {
    /// Flatten to the item list, mapping `Empty`/`Unrecognized` to no items.
    pub fn into_items(self) -> Vec<Value> {
        match self {
            Self::Items(items) => items,
            Self::Empty | Self::Unrecognized(_) => Vec::new(),
        }
    }
}

/// Normalize a raw list-endpoint body to the item array.
///
/// Shape precedence: bare array, then nested paginated `data.data`, then flat
/// `data`. The paginated shape must be checked before flat `data`, otherwise a
/// paginated envelope would classify as a flat object `data` and be dropped.
/// An unrecognized shape is logged under the resource tag and never escalates
/// to an error.
pub fn normalize_list(resource: &str, body: Value) -> NormalizedList {
    let body = match body {
        Value::Array(items) => return items_or_empty(items),
        other => other,
    };

    if let Some(Value::Array(items)) = body.pointer("/data/data") {
        return items_or_empty(items.clone());
    }

    if let Some(Value::Array(items)) = body.get("data") {
        return items_or_empty(items.clone());
    }

    warn!(resource, "unrecognized list envelope shape");
    NormalizedList::Unrecognized(body)
}

/// Unwrap a single-record envelope (`{data: {...}}`), falling back to the
/// bare body when there is no wrapper.
pub fn normalize_record(body: Value) -> Value {
    match body {
        Value::Object(mut map) => match map.remove("data") {
            Some(inner @ Value::Object(_)) => inner,
            Some(other) => {
                map.insert("data".to_owned(), other);
                Value::Object(map)
            }
            None => Value::Object(map),
        },
        other => other,
    }
}

fn items_or_empty(items: Vec<Value>) -> NormalizedList {
    if items.is_empty() {
        NormalizedList::Empty
    } else {
        NormalizedList::Items(items)
    }
}
