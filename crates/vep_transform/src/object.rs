//! Object shaping helpers
//!
//! Every function treats a non-object input as `{}`.

use serde_json::{Map, Value};

fn entries(value: &Value) -> impl Iterator<Item = (&String, &Value)> {
    value.as_object().into_iter().flat_map(|m| m.iter())
}

/// Shallow merge, later objects winning; non-object arguments are skipped
pub fn merge(objects: &[Value]) -> Value {
    let mut out = Map::new();
    for (k, v) in objects.iter().flat_map(entries) {
        out.insert(k.clone(), v.clone());
    }
    Value::Object(out)
}

pub fn pick(value: &Value, keys: &[String]) -> Value {
    let Some(map) = value.as_object() else {
        return Value::Object(Map::new());
    };
    Value::Object(
        keys.iter()
            .filter_map(|k| map.get(k).map(|v| (k.clone(), v.clone())))
            .collect(),
    )
}

pub fn omit(value: &Value, keys: &[String]) -> Value {
    Value::Object(
        entries(value)
            .filter(|(k, _)| !keys.contains(*k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
    )
}

pub fn map_keys(value: &Value, mut f: impl FnMut(&str, &Value) -> String) -> Value {
    Value::Object(
        entries(value)
            .map(|(k, v)| (f(k, v), v.clone()))
            .collect(),
    )
}

pub fn map_values(value: &Value, mut f: impl FnMut(&Value, &str) -> Value) -> Value {
    Value::Object(entries(value).map(|(k, v)| (k.clone(), f(v, k))).collect())
}

/// Rename keys per `mapping` (`{ old: "new" }`); unmapped keys pass through
pub fn rename_keys(value: &Value, mapping: &Value) -> Value {
    map_keys(value, |k, _| {
        mapping
            .get(k)
            .and_then(Value::as_str)
            .map_or_else(|| k.to_string(), str::to_string)
    })
}

pub fn filter_object(value: &Value, mut keep: impl FnMut(&Value, &str) -> bool) -> Value {
    Value::Object(
        entries(value)
            .filter(|(k, v)| keep(v, k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
    )
}

/// Recursive merge of `sources` into a copy of `target`.
///
/// Nested objects merge key by key; any other value (arrays included) replaces.
pub fn deep_merge(target: &Value, sources: &[Value]) -> Value {
    let mut out = if target.is_object() {
        target.clone()
    } else {
        Value::Object(Map::new())
    };
    for source in sources.iter().filter(|s| s.is_object()) {
        merge_into(&mut out, source);
    }
    out
}

fn merge_into(target: &mut Value, source: &Value) {
    let (Value::Object(dst), Value::Object(src)) = (target, source) else {
        return;
    };
    for (k, v) in src {
        let nested = v.is_object() && dst.get(k).is_some_and(Value::is_object);
        if nested {
            if let Some(existing) = dst.get_mut(k) {
                merge_into(existing, v);
            }
        } else {
            dst.insert(k.clone(), v.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn keys(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_merge_skips_non_objects() {
        let merged = merge(&[json!({ "a": 1 }), Value::Null, json!({ "a": 2, "b": 3 })]);
        assert_eq!(merged, json!({ "a": 2, "b": 3 }));
    }

    #[test]
    fn test_pick_and_omit() {
        let user = json!({ "id": 1, "name": "Ada", "password": "x" });
        assert_eq!(pick(&user, &keys(&["id", "name", "nope"])), json!({ "id": 1, "name": "Ada" }));
        assert_eq!(omit(&user, &keys(&["password"])), json!({ "id": 1, "name": "Ada" }));
    }

    #[test]
    fn test_rename_keys() {
        let renamed = rename_keys(&json!({ "first_name": "Ada", "age": 36 }), &json!({ "first_name": "firstName" }));
        assert_eq!(renamed, json!({ "firstName": "Ada", "age": 36 }));
    }

    #[test]
    fn test_map_and_filter() {
        let doc = json!({ "a": 1, "b": 2, "c": 3 });
        let doubled = map_values(&doc, |v, _| json!(v.as_i64().unwrap_or(0) * 2));
        assert_eq!(doubled, json!({ "a": 2, "b": 4, "c": 6 }));

        let odd = filter_object(&doc, |v, _| v.as_i64().unwrap_or(0) % 2 == 1);
        assert_eq!(odd, json!({ "a": 1, "c": 3 }));

        let upper = map_keys(&doc, |k, _| k.to_uppercase());
        assert_eq!(upper, json!({ "A": 1, "B": 2, "C": 3 }));
    }

    #[test]
    fn test_deep_merge() {
        let base = json!({ "db": { "host": "a", "port": 1 }, "tags": [1] });
        let merged = deep_merge(&base, &[json!({ "db": { "port": 2 }, "tags": [2] })]);
        assert_eq!(merged, json!({ "db": { "host": "a", "port": 2 }, "tags": [2] }));
    }

    #[test]
    fn test_null_inputs() {
        assert_eq!(pick(&Value::Null, &keys(&["a"])), json!({}));
        assert_eq!(omit(&Value::Null, &keys(&["a"])), json!({}));
        assert_eq!(deep_merge(&Value::Null, &[Value::Null]), json!({}));
        assert_eq!(rename_keys(&Value::Null, &Value::Null), json!({}));
    }
}
