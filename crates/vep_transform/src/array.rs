//! Array shaping helpers
//!
//! Every function treats a non-array input as `[]`.

use std::cmp::Ordering;

use serde_json::{Map, Value};

use crate::path;

/// How an item is reduced to its grouping/sorting key
#[derive(Debug, Clone, PartialEq)]
pub enum KeySelector {
    /// The item itself
    Identity,
    /// Dot path into each item
    Path(Vec<String>),
    /// Keys already evaluated by the caller, aligned with the item order
    Computed(Vec<Value>),
}

impl KeySelector {
    /// Resolve the key of the item at `index`
    pub fn key_of<'a>(&'a self, index: usize, item: &'a Value) -> Option<&'a Value> {
        match self {
            KeySelector::Identity => Some(item),
            KeySelector::Path(segments) => path::get(item, segments),
            KeySelector::Computed(keys) => keys.get(index),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

fn items(value: &Value) -> &[Value] {
    value.as_array().map(Vec::as_slice).unwrap_or_default()
}

/// JavaScript truthiness of a JSON value
pub fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_) | Value::Object(_)) => true,
    }
}

/// String form used when a key becomes an object property name
pub fn key_string(value: Option<&Value>) -> String {
    match value {
        None => "undefined".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

pub fn group_by(value: &Value, key: &KeySelector) -> Value {
    let mut groups = Map::new();
    for (i, item) in items(value).iter().enumerate() {
        let group = groups
            .entry(key_string(key.key_of(i, item)))
            .or_insert_with(|| Value::Array(Vec::new()));
        if let Value::Array(members) = group {
            members.push(item.clone());
        }
    }
    Value::Object(groups)
}

fn compare_keys(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), _) => Ordering::Greater,
        (_, None | Some(Value::Null)) => Ordering::Less,
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}

/// Stable sort by key; missing/null keys always sort last
pub fn sort_by(value: &Value, key: &KeySelector, order: SortOrder) -> Value {
    let mut indexed: Vec<(usize, &Value)> = items(value).iter().enumerate().collect();
    indexed.sort_by(|(ia, a), (ib, b)| {
        let (ka, kb) = (key.key_of(*ia, a), key.key_of(*ib, b));
        let nulls = (
            matches!(ka, None | Some(Value::Null)),
            matches!(kb, None | Some(Value::Null)),
        );
        let ordering = compare_keys(ka, kb);
        match (order, nulls) {
            (SortOrder::Desc, (false, false)) => ordering.reverse(),
            _ => ordering,
        }
    });
    Value::Array(indexed.into_iter().map(|(_, v)| v.clone()).collect())
}

/// Keep the first item for each distinct key
pub fn uniq_by(value: &Value, key: &KeySelector) -> Value {
    let mut seen: Vec<Option<&Value>> = Vec::new();
    let mut out = Vec::new();
    for (i, item) in items(value).iter().enumerate() {
        let k = key.key_of(i, item);
        if !seen.contains(&k) {
            seen.push(k);
            out.push(item.clone());
        }
    }
    Value::Array(out)
}

pub fn flatten(value: &Value, depth: usize) -> Value {
    fn walk(values: &[Value], depth: usize, out: &mut Vec<Value>) {
        for v in values {
            match v {
                Value::Array(inner) if depth > 0 => walk(inner, depth - 1, out),
                other => out.push(other.clone()),
            }
        }
    }

    let mut out = Vec::new();
    walk(items(value), depth, &mut out);
    Value::Array(out)
}

pub fn chunk(value: &Value, size: usize) -> Value {
    if size == 0 {
        return Value::Array(Vec::new());
    }
    Value::Array(
        items(value)
            .chunks(size)
            .map(|c| Value::Array(c.to_vec()))
            .collect(),
    )
}

/// Split into `[matching, rest]` by the truthiness of each item's key
pub fn partition(value: &Value, predicate: &KeySelector) -> Value {
    let (pass, fail): (Vec<_>, Vec<_>) = items(value)
        .iter()
        .enumerate()
        .partition(|(i, item)| truthy(predicate.key_of(*i, item)));
    let strip = |v: Vec<(usize, &Value)>| Value::Array(v.into_iter().map(|(_, x)| x.clone()).collect());
    Value::Array(vec![strip(pass), strip(fail)])
}
