use serde_json::{Map, Value};

/// Split a key path into segments.
///
/// Accepts `"a.b.0"`, `"a.b[0]"` or a pre-split sequence `["a", "b", 0]`.
/// Anything else yields no segments.
pub fn segments(path: &Value) -> Vec<String> {
    match path {
        Value::String(s) => split(s),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        Value::Number(n) => vec![n.to_string()],
        _ => Vec::new(),
    }
}

pub fn split(path: &str) -> Vec<String> {
    path.replace('[', ".")
        .replace(']', "")
        .split('.')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Walk `value` along `path`; arrays are indexed by numeric segments
pub fn get<'a>(value: &'a Value, path: &[String]) -> Option<&'a Value> {
    path.iter().try_fold(value, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Write `new_value` at `path` inside `value`, creating intermediate objects as needed.
///
/// Non-container roots and empty paths are left untouched.
pub fn set(value: &mut Value, path: &[String], new_value: Value) {
    let Some((last, parents)) = path.split_last() else {
        return;
    };
    if !value.is_object() && !value.is_array() {
        return;
    }

    let mut current = value;
    for segment in parents {
        current = match current {
            Value::Array(items) => match segment.parse::<usize>() {
                Ok(i) if i < items.len() => {
                    if !items[i].is_object() && !items[i].is_array() {
                        items[i] = Value::Object(Map::new());
                    }
                    &mut items[i]
                }
                _ => return,
            },
            Value::Object(map) => {
                let slot = map
                    .entry(segment.clone())
                    .or_insert_with(|| Value::Object(Map::new()));
                if !slot.is_object() && !slot.is_array() {
                    *slot = Value::Object(Map::new());
                }
                slot
            }
            _ => return,
        };
    }

    match current {
        Value::Object(map) => {
            map.insert(last.clone(), new_value);
        }
        Value::Array(items) => {
            if let Ok(i) = last.parse::<usize>() {
                if i < items.len() {
                    items[i] = new_value;
                } else if i == items.len() {
                    items.push(new_value);
                }
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_segments() {
        assert_eq!(segments(&json!("a.b[0].c")), vec!["a", "b", "0", "c"]);
        assert_eq!(segments(&json!(["a", 1])), vec!["a", "1"]);
        assert!(segments(&Value::Null).is_empty());
    }

    #[test]
    fn test_get_nested() {
        let doc = json!({ "user": { "tags": ["x", "y"] } });
        assert_eq!(get(&doc, &split("user.tags.1")), Some(&json!("y")));
        assert_eq!(get(&doc, &split("user.missing.deep")), None);
    }

    #[test]
    fn test_set_creates_intermediates() {
        let mut doc = json!({ "a": 1 });
        set(&mut doc, &split("b.c.d"), json!(true));
        assert_eq!(doc, json!({ "a": 1, "b": { "c": { "d": true } } }));

        set(&mut doc, &split("a.x"), json!(2));
        assert_eq!(doc["a"], json!({ "x": 2 }));
    }
}
