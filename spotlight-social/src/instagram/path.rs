//! Declarative key-paths over untyped JSON, plus the scalar readers shared by the
//! walker and the media builder.

use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hop {
    Key(&'static str),
    Index(usize),
}

/// A named chain of hops from some starting node.
#[derive(Debug, Clone, Copy)]
pub struct KeyPath {
    pub name: &'static str,
    pub hops: &'static [Hop],
}

impl KeyPath {
    pub const fn new(name: &'static str, hops: &'static [Hop]) -> Self {
        Self { name, hops }
    }

    /// Follow every hop, checking the container kind before each descent.
    /// Any missing key, out-of-range index or wrong kind resolves to `None`.
    pub fn resolve<'a>(&self, start: &'a Value) -> Option<&'a Value> {
        self.hops.iter().try_fold(start, |node, hop| match (hop, node) {
            (Hop::Key(k), Value::Object(map)) => map.get(*k),
            (Hop::Index(i), Value::Array(items)) => items.get(*i),
            _ => None,
        })
    }
}

/// Members of a collection container: array elements, or object values for
/// map-shaped collections. Scalars and `null` have none.
pub fn entries(v: &Value) -> Option<Vec<&Value>> {
    match v {
        Value::Array(items) => Some(items.iter().collect()),
        Value::Object(map) => Some(map.values().collect()),
        _ => None,
    }
}

/// GraphQL connections wrap each entry as `{"node": {...}}`.
pub fn unwrap_node(v: &Value) -> &Value {
    match v.get("node") {
        Some(node) if node.is_object() => node,
        _ => v,
    }
}

/// Non-empty string or number rendered as a string.
pub fn scalar_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// First key of `node` holding a usable scalar.
pub fn first_string(node: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| node.get(*k))
        .find_map(scalar_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const DEEP: KeyPath = KeyPath::new(
        "a.b[1].c",
        &[Hop::Key("a"), Hop::Key("b"), Hop::Index(1), Hop::Key("c")],
    );

    #[test]
    fn resolves_full_path() {
        let v = json!({"a": {"b": [{}, {"c": 7}]}});
        assert_eq!(DEEP.resolve(&v), Some(&json!(7)));
    }

    #[test]
    fn wrong_kind_or_missing_hop_is_none() {
        assert!(DEEP.resolve(&json!({"a": {"b": {"1": {"c": 7}}}})).is_none());
        assert!(DEEP.resolve(&json!({"a": {"b": [{}]}})).is_none());
        assert!(DEEP.resolve(&json!({"a": null})).is_none());
        assert!(DEEP.resolve(&json!("a")).is_none());
    }

    #[test]
    fn scalars() {
        assert_eq!(scalar_string(&json!("  x ")), Some("x".into()));
        assert_eq!(scalar_string(&json!(17890)), Some("17890".into()));
        assert_eq!(scalar_string(&json!("")), None);
        assert_eq!(scalar_string(&json!(null)), None);
        assert_eq!(scalar_string(&json!(["x"])), None);

        let node = json!({"id": "", "pk": 42});
        assert_eq!(first_string(&node, &["id", "pk"]), Some("42".into()));
        assert_eq!(first_string(&node, &["missing"]), None);
    }

    #[test]
    fn node_wrappers() {
        let wrapped = json!({"node": {"id": "1"}});
        assert_eq!(unwrap_node(&wrapped)["id"], "1");
        let bare = json!({"node": "not an object", "id": "2"});
        assert_eq!(unwrap_node(&bare)["id"], "2");
        assert_eq!(entries(&json!({"a": 1, "b": 2})).map(|e| e.len()), Some(2));
        assert!(entries(&json!(3)).is_none());
    }
}
