//! The execution [`Context`] threaded between nodes.
//!
//! A workflow execution has exactly one data channel: an unordered
//! key/value mapping that each node reads from and returns a (possibly
//! modified) copy of. Nodes must never mutate their input in place —
//! see [`Context::with`].

use std::collections::HashMap;

use serde_json::Value;

/// The context flowing between nodes in a single workflow execution.
///
/// Cloning is intentionally cheap-ish (a `HashMap` clone) rather than
/// `Arc`-shared, so that "return a fresh context" is the only way to
/// make a change stick — there is no way to accidentally observe a
/// downstream node's mutation from an upstream one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context(HashMap<String, Value>);

impl Context {
    /// An empty context.
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Build a context from a single JSON object (or `null`/empty for no seed).
    ///
    /// A non-object, non-null value is rejected — the workflow's initial
    /// data must be a map, matching spec's "unordered mapping" contract.
    pub fn from_initial_data(value: Option<Value>) -> Self {
        match value {
            None | Some(Value::Null) => Self::new(),
            Some(Value::Object(map)) => Self(map.into_iter().collect()),
            Some(other) => {
                let mut map = HashMap::new();
                map.insert("value".to_string(), other);
                Self(map)
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Return a new context equal to `self` with `key` set to `value`.
    ///
    /// This is the idiomatic way for an executor to produce its return
    /// value: `context.with("httpResponse", response)`.
    pub fn with(&self, key: impl Into<String>, value: Value) -> Self {
        let mut next = self.0.clone();
        next.insert(key.into(), value);
        Self(next)
    }

    /// Merge `other` on top of `self`, `other`'s keys winning on conflict.
    pub fn merged_with(&self, other: &Context) -> Self {
        let mut next = self.0.clone();
        for (k, v) in &other.0 {
            next.insert(k.clone(), v.clone());
        }
        Self(next)
    }

    /// Whether every key in `self` is also present (with equal value) in `other`.
    ///
    /// Used by tests to enforce the "context monotonicity" invariant.
    pub fn is_subset_of(&self, other: &Context) -> bool {
        self.0.iter().all(|(k, v)| other.0.get(k) == Some(v))
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0.into_iter().collect())
    }

    pub fn as_map(&self) -> &HashMap<String, Value> {
        &self.0
    }
}

impl From<HashMap<String, Value>> for Context {
    fn from(map: HashMap<String, Value>) -> Self {
        Self(map)
    }
}
