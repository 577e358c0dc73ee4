//! Numeric aggregation over arrays of numbers or of objects (via a [`KeySelector`])

use serde_json::{Number, Value};

use crate::array::KeySelector;

/// JSON number for `n`; integral values are emitted as integers, non-finite ones as `0`
pub fn number(n: f64) -> Value {
    if !n.is_finite() {
        return Value::from(0);
    }
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        return Value::from(n as i64);
    }
    Number::from_f64(n).map_or(Value::from(0), Value::Number)
}

/// Finite number behind a value, accepting numeric strings
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
}

fn values(input: &Value, key: &KeySelector) -> Vec<f64> {
    input
        .as_array()
        .map(|items| {
            items
                .iter()
                .enumerate()
                .filter_map(|(i, item)| key.key_of(i, item).and_then(as_number))
                .collect()
        })
        .unwrap_or_default()
}

pub fn sum(input: &Value, key: &KeySelector) -> f64 {
    values(input, key).iter().sum()
}

pub fn avg(input: &Value, key: &KeySelector) -> f64 {
    let nums = values(input, key);
    if nums.is_empty() {
        return 0.0;
    }
    let len = nums.len() as f64;
    nums.iter().sum::<f64>() / len
}

pub fn min(input: &Value, key: &KeySelector) -> f64 {
    values(input, key).into_iter().reduce(f64::min).unwrap_or(0.0)
}

pub fn max(input: &Value, key: &KeySelector) -> f64 {
    values(input, key).into_iter().reduce(f64::max).unwrap_or(0.0)
}

/// Round to `decimals` places, halves rounding up like `Math.round`
pub fn round(n: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals.clamp(0, 15));
    ((n * factor) + 0.5).floor() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::split;
    use serde_json::json;

    #[test]
    fn test_aggregates() {
        let nums = json!([3, 1, "4", null, 2]);
        let id = KeySelector::Identity;
        assert_eq!(sum(&nums, &id), 10.0);
        assert_eq!(avg(&nums, &id), 2.5);
        assert_eq!(min(&nums, &id), 1.0);
        assert_eq!(max(&nums, &id), 4.0);
    }

    #[test]
    fn test_aggregates_by_key() {
        let orders = json!([{ "total": 10.5 }, { "total": 4.5 }, { "other": 1 }]);
        let total = KeySelector::Path(split("total"));
        assert_eq!(sum(&orders, &total), 15.0);
        assert_eq!(avg(&orders, &total), 7.5);

        let computed = KeySelector::Computed(vec![json!(1), json!(2), json!(3)]);
        assert_eq!(max(&orders, &computed), 3.0);
    }

    #[test]
    fn test_empty_is_zero() {
        let id = KeySelector::Identity;
        for input in [Value::Null, json!([]), json!({ "a": 1 })] {
            assert_eq!(sum(&input, &id), 0.0);
            assert_eq!(avg(&input, &id), 0.0);
            assert_eq!(min(&input, &id), 0.0);
            assert_eq!(max(&input, &id), 0.0);
        }
    }

    #[test]
    fn test_round_and_number() {
        assert_eq!(round(1.2345, 2), 1.23);
        assert_eq!(round(2.5, 0), 3.0);
        assert_eq!(round(-2.5, 0), -2.0);
        assert_eq!(number(3.0), json!(3));
        assert_eq!(number(0.5), json!(0.5));
        assert_eq!(number(f64::NAN), json!(0));
    }
}
