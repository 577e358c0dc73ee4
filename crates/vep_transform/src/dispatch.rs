//! Name-based entry point used by the script runtime.
//!
//! Arguments arrive as the positional JSON array the script passed. Function-valued
//! arguments (key selectors, predicates) are evaluated script-side and arrive as
//! `{ "$computed": [...] }`, one entry per item in input order.

use serde_json::{Map, Value};

use crate::array::{self, KeySelector, SortOrder};
use crate::math::number;
use crate::{date, encoding, http, math, object, path, string, validate};

#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("utils.{0} is not a function")]
    UnknownHelper(String),
}

/// Every helper name accepted by [`dispatch`]
pub const HELPERS: &[&str] = &[
    "merge",
    "pick",
    "omit",
    "mapKeys",
    "mapValues",
    "renameKeys",
    "filterObject",
    "deepMerge",
    "get",
    "set",
    "groupBy",
    "sortBy",
    "uniqBy",
    "flatten",
    "chunk",
    "partition",
    "camelCase",
    "snakeCase",
    "kebabCase",
    "capitalize",
    "slugify",
    "truncate",
    "formatDate",
    "addDays",
    "diffDays",
    "isToday",
    "isAfter",
    "isEmail",
    "isUrl",
    "isEmpty",
    "isNumeric",
    "jsonParse",
    "jsonStringify",
    "base64Encode",
    "base64Decode",
    "hash",
    "buildUrl",
    "parseQuery",
    "buildQuery",
    "sum",
    "avg",
    "min",
    "max",
    "round",
];

const COMPUTED: &str = "$computed";

struct Args<'a>(&'a [Value]);

impl Args<'_> {
    fn value(&self, i: usize) -> &Value {
        self.0.get(i).unwrap_or(&Value::Null)
    }

    fn owned(&self, i: usize) -> Value {
        self.value(i).clone()
    }

    fn text(&self, i: usize) -> &str {
        self.value(i).as_str().unwrap_or_default()
    }

    fn opt_text(&self, i: usize) -> Option<&str> {
        self.value(i).as_str()
    }

    fn num(&self, i: usize) -> Option<f64> {
        math::as_number(self.value(i))
    }

    fn count(&self, i: usize, default: usize) -> usize {
        self.num(i).map_or(default, |n| n.max(0.0) as usize)
    }

    fn key(&self, i: usize) -> KeySelector {
        key_selector(self.value(i))
    }

    fn computed(&self, i: usize) -> Vec<Value> {
        match key_selector(self.value(i)) {
            KeySelector::Computed(keys) => keys,
            _ => Vec::new(),
        }
    }

    /// Remaining arguments flattened into a list of key names
    fn keys_from(&self, i: usize) -> Vec<String> {
        self.0
            .iter()
            .skip(i)
            .flat_map(|v| match v {
                Value::Array(items) => items.iter().filter_map(http::scalar_string).collect(),
                other => http::scalar_string(other).into_iter().collect::<Vec<_>>(),
            })
            .collect()
    }
}

/// Interpret a key argument: absent means the item itself, a string or
/// array is a path, `{ "$computed": [...] }` carries precomputed keys.
pub fn key_selector(value: &Value) -> KeySelector {
    match value {
        Value::Null => KeySelector::Identity,
        Value::Object(map) => match map.get(COMPUTED) {
            Some(Value::Array(keys)) => KeySelector::Computed(keys.clone()),
            _ => KeySelector::Identity,
        },
        other => KeySelector::Path(path::segments(other)),
    }
}

/// Run the helper `name` over positional `args`.
///
/// Helpers never fail on malformed arguments; they return a neutral value instead.
pub fn dispatch(name: &str, args: &[Value]) -> Result<Value, TransformError> {
    let a = Args(args);
    let out = match name {
        // objects
        "merge" => object::merge(args),
        "pick" => object::pick(a.value(0), &a.keys_from(1)),
        "omit" => object::omit(a.value(0), &a.keys_from(1)),
        "mapKeys" => {
            let keys = a.computed(1);
            let mut i = 0;
            object::map_keys(a.value(0), |k, _| {
                let key = keys.get(i).map_or_else(|| k.to_string(), |v| array::key_string(Some(v)));
                i += 1;
                key
            })
        }
        "mapValues" => {
            let values = a.computed(1);
            let mut i = 0;
            object::map_values(a.value(0), |_, _| {
                let v = values.get(i).cloned().unwrap_or(Value::Null);
                i += 1;
                v
            })
        }
        "renameKeys" => object::rename_keys(a.value(0), a.value(1)),
        "filterObject" => {
            let verdicts = a.computed(1);
            let mut i = 0;
            object::filter_object(a.value(0), |_, _| {
                let keep = array::truthy(verdicts.get(i));
                i += 1;
                keep
            })
        }
        "deepMerge" => object::deep_merge(a.value(0), args.get(1..).unwrap_or_default()),
        "get" => path::get(a.value(0), &path::segments(a.value(1)))
            .cloned()
            .unwrap_or_else(|| a.owned(2)),
        "set" => {
            let mut target = a.owned(0);
            path::set(&mut target, &path::segments(a.value(1)), a.owned(2));
            target
        }

        // arrays
        "groupBy" => array::group_by(a.value(0), &a.key(1)),
        "sortBy" => {
            let order = match a.opt_text(2) {
                Some(o) if o.eq_ignore_ascii_case("desc") => SortOrder::Desc,
                _ => SortOrder::Asc,
            };
            array::sort_by(a.value(0), &a.key(1), order)
        }
        "uniqBy" => array::uniq_by(a.value(0), &a.key(1)),
        "flatten" => array::flatten(a.value(0), a.count(1, 1)),
        "chunk" => array::chunk(a.value(0), a.count(1, 1)),
        "partition" => array::partition(a.value(0), &a.key(1)),

        // strings
        "camelCase" => Value::from(string::camel_case(a.text(0))),
        "snakeCase" => Value::from(string::snake_case(a.text(0))),
        "kebabCase" => Value::from(string::kebab_case(a.text(0))),
        "capitalize" => Value::from(string::capitalize(a.text(0))),
        "slugify" => Value::from(string::slugify(a.text(0))),
        "truncate" => Value::from(string::truncate(
            a.text(0),
            a.count(1, string::DEFAULT_TRUNCATE_LENGTH),
            a.opt_text(2).unwrap_or(string::DEFAULT_TRUNCATE_SUFFIX),
        )),

        // dates
        "formatDate" => date::parse_date(a.value(0)).map_or_else(
            || Value::from(""),
            |d| Value::from(date::format_date(&d, a.opt_text(1).unwrap_or(date::DEFAULT_DATE_FORMAT))),
        ),
        "addDays" => {
            let days = a.num(1).unwrap_or(0.0) as i64;
            date::parse_date(a.value(0))
                .and_then(|d| date::add_days(&d, days))
                .map_or(Value::Null, |d| Value::from(date::to_iso(&d)))
        }
        "diffDays" => match (date::parse_date(a.value(0)), date::parse_date(a.value(1))) {
            (Some(x), Some(y)) => Value::from(date::diff_days(&x, &y)),
            _ => Value::from(0),
        },
        "isToday" => Value::from(date::parse_date(a.value(0)).is_some_and(|d| date::is_today(&d))),
        "isAfter" => Value::from(
            match (date::parse_date(a.value(0)), date::parse_date(a.value(1))) {
                (Some(x), Some(y)) => date::is_after(&x, &y),
                _ => false,
            },
        ),

        // validation
        "isEmail" => Value::from(a.opt_text(0).is_some_and(validate::is_email)),
        "isUrl" => Value::from(a.opt_text(0).is_some_and(validate::is_url)),
        "isEmpty" => Value::from(validate::is_empty(a.value(0))),
        "isNumeric" => Value::from(validate::is_numeric(a.value(0))),

        // encoding
        "jsonParse" => match a.opt_text(0) {
            Some(s) => encoding::json_parse(s, a.owned(1)),
            None => a.owned(1),
        },
        "jsonStringify" => match args.first() {
            Some(v) => {
                let indent = a.num(1).map(|n| n.max(0.0) as usize);
                Value::from(encoding::json_stringify(v, indent))
            }
            None => Value::from(""),
        },
        "base64Encode" => Value::from(encoding::base64_encode(a.text(0))),
        "base64Decode" => Value::from(encoding::base64_decode(a.text(0))),
        "hash" => Value::from(encoding::hash(a.text(0))),

        // http
        "buildUrl" => Value::from(http::build_url(a.text(0), a.value(1), a.value(2))),
        "parseQuery" => http::parse_query(a.text(0)),
        "buildQuery" => Value::from(http::build_query(a.value(0))),

        // math
        "sum" => number(math::sum(a.value(0), &a.key(1))),
        "avg" => number(math::avg(a.value(0), &a.key(1))),
        "min" => number(math::min(a.value(0), &a.key(1))),
        "max" => number(math::max(a.value(0), &a.key(1))),
        "round" => {
            let decimals = a.num(1).unwrap_or(0.0) as i32;
            number(math::round(a.num(0).unwrap_or(0.0), decimals))
        }

        other => return Err(TransformError::UnknownHelper(other.to_string())),
    };
    Ok(out)
}

/// Wrap precomputed keys the way the script runtime sends them
pub fn computed(keys: Vec<Value>) -> Value {
    let mut map = Map::new();
    map.insert(COMPUTED.to_string(), Value::Array(keys));
    Value::Object(map)
}
