//! Accessors over parsed blkx data.
//!
//! Datamine blkx files are JSON renderings of the game's BLK format. They are
//! kept as `serde_json::Value` and read through [`BlkExt`]; repeated BLK
//! blocks come out either as a single object or as a list, which
//! [`one_or_many`] flattens into one shape.

use serde_json::{Map, Value};

pub trait BlkExt {
    fn as_table(&self) -> Option<&Map<String, Value>>;
    fn get_num(&self, key: &str) -> Option<f64>;
    fn get_str(&self, key: &str) -> Option<&str>;
    fn get_bool(&self, key: &str) -> Option<bool>;
    fn get_table(&self, key: &str) -> Option<&Value>;
    /// First two numbers of a list field, e.g. `"pitch": [-10.0, 20.0]`.
    fn get_pair(&self, key: &str) -> Option<[f64; 2]>;
}

impl BlkExt for Value {
    fn as_table(&self) -> Option<&Map<String, Value>> {
        self.as_object()
    }

    fn get_num(&self, key: &str) -> Option<f64> {
        self.get(key)
            .and_then(Value::as_f64)
            .filter(|n| n.is_finite())
    }

    fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    fn get_bool(&self, key: &str) -> Option<bool> {
        match self.get(key)? {
            Value::Bool(b) => Some(*b),
            Value::Number(n) => n.as_f64().map(|n| n != 0.0),
            _ => None,
        }
    }

    fn get_table(&self, key: &str) -> Option<&Value> {
        self.get(key).filter(|v| v.is_object())
    }

    fn get_pair(&self, key: &str) -> Option<[f64; 2]> {
        self.get(key).and_then(as_pair)
    }
}

/// First two numbers of a list value.
pub fn as_pair(value: &Value) -> Option<[f64; 2]> {
    match value.as_array()?.as_slice() {
        [a, b, ..] => Some([a.as_f64()?, b.as_f64()?]),
        _ => None,
    }
}

/// Normalize a field that holds either one object or a list of them.
/// Absent and `null` give an empty list; non-object list items are dropped.
pub fn one_or_many(value: Option<&Value>) -> Vec<&Value> {
    match value {
        Some(Value::Array(items)) => items.iter().filter(|v| v.is_object()).collect(),
        Some(v @ Value::Object(_)) => vec![v],
        _ => Vec::new(),
    }
}

/// Depth-first search for the first node (the root included) matching `pred`.
pub fn find_any<'a, F>(value: &'a Value, pred: &mut F) -> Option<&'a Value>
where
    F: FnMut(&Value) -> bool,
{
    if pred(value) {
        return Some(value);
    }
    match value {
        Value::Object(map) => map.values().find_map(|v| find_any(v, pred)),
        Value::Array(items) => items.iter().find_map(|v| find_any(v, pred)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn typed_getters() {
        let v = json!({"speed": 1650.0, "name": "dm53", "flag": true, "n": 1, "tbl": {"a": 1}});
        assert_eq!(v.get_num("speed"), Some(1650.0));
        assert_eq!(v.get_str("name"), Some("dm53"));
        assert_eq!(v.get_bool("flag"), Some(true));
        assert_eq!(v.get_bool("n"), Some(true));
        assert!(v.get_table("tbl").is_some());
        assert!(v.get_table("name").is_none());
        assert_eq!(v.get_num("name"), None);
    }

    #[test]
    fn pair_needs_two_numbers() {
        let v = json!({"pitch": [-6.0, 15.0], "short": [1.0], "mixed": ["a", 2.0]});
        assert_eq!(v.get_pair("pitch"), Some([-6.0, 15.0]));
        assert_eq!(v.get_pair("short"), None);
        assert_eq!(v.get_pair("mixed"), None);
    }

    #[test]
    fn one_or_many_shapes_agree() {
        let single = json!({"w": {"trigger": "gunner0"}});
        let list = json!({"w": [{"trigger": "gunner0"}]});
        assert_eq!(one_or_many(single.get("w")), one_or_many(list.get("w")));
        assert!(one_or_many(None).is_empty());
        assert!(one_or_many(Some(&Value::Null)).is_empty());
    }

    #[test]
    fn find_any_walks_nested_lists() {
        let v = json!({"a": {"b": [1, {"c": "grd_cannon_autoloader"}]}});
        let hit = find_any(&v, &mut |n: &Value| {
            n.as_str().map(|s| s.contains("autoloader")).unwrap_or(false)
        });
        assert_eq!(hit, Some(&json!("grd_cannon_autoloader")));
        assert!(find_any(&v, &mut |n: &Value| n == &json!(42)).is_none());
    }
}
