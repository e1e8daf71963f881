//! Request parameters attached to an outbound upload.
//!
//! Values are held exactly as the caller supplied them: literals and nested
//! maps as data, lazy values as shared closures. A `Lazy` value is never
//! invoked when it is stored, only when the request is materialized at send
//! time.

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Zero-argument producer evaluated once per request materialization.
pub type LazyParam = Arc<dyn Fn() -> ParamValue + Send + Sync>;

/// A single request parameter value.
#[derive(Clone)]
pub enum ParamValue {
    /// Plain JSON scalar or array, forwarded as-is.
    Literal(Value),
    /// Nested parameter map, materialized recursively.
    Nested(HashMap<String, ParamValue>),
    /// Deferred value, produced at send time.
    Lazy(LazyParam),
}

impl ParamValue {
    /// Convenience constructor for string literals.
    pub fn text(s: impl Into<String>) -> Self {
        Self::Literal(Value::String(s.into()))
    }

    /// Wrap a closure as a lazily-evaluated value.
    pub fn lazy(f: impl Fn() -> ParamValue + Send + Sync + 'static) -> Self {
        Self::Lazy(Arc::new(f))
    }

    /// Resolve this value to plain JSON, invoking lazy producers.
    pub fn materialize(&self) -> Value {
        match self {
            Self::Literal(value) => value.clone(),
            Self::Nested(map) => {
                let mut out = Map::with_capacity(map.len());
                for (key, value) in map {
                    out.insert(key.clone(), value.materialize());
                }
                Value::Object(out)
            }
            Self::Lazy(producer) => producer().materialize(),
        }
    }
}

impl From<Value> for ParamValue {
    fn from(value: Value) -> Self {
        Self::Literal(value)
    }
}

impl From<HashMap<String, ParamValue>> for ParamValue {
    fn from(map: HashMap<String, ParamValue>) -> Self {
        Self::Nested(map)
    }
}

// Literals and nested maps compare structurally; lazy values compare by
// producer identity, since closure results are unknown until send time.
impl PartialEq for ParamValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Literal(a), Self::Literal(b)) => a == b,
            (Self::Nested(a), Self::Nested(b)) => a == b,
            (Self::Lazy(a), Self::Lazy(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => write!(f, "Literal({value})"),
            Self::Nested(map) => f.debug_tuple("Nested").field(map).finish(),
            Self::Lazy(_) => write!(f, "Lazy(..)"),
        }
    }
}

/// Parameter map for an upload request (name -> value).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestParams(HashMap<String, ParamValue>);

impl RequestParams {
    /// Create an empty parameter map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a parameter.
    pub fn insert(&mut self, name: impl Into<String>, value: ParamValue) {
        self.0.insert(name.into(), value);
    }

    /// Look up a parameter by name.
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over (name, value) pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParamValue)> {
        self.0.iter()
    }

    /// Resolve the whole map to a plain JSON object, invoking lazy
    /// producers. This is the send-time step; the stored map is unchanged.
    pub fn materialize(&self) -> Value {
        let mut out = Map::with_capacity(self.0.len());
        for (name, value) in &self.0 {
            out.insert(name.clone(), value.materialize());
        }
        Value::Object(out)
    }
}

impl From<HashMap<String, Value>> for RequestParams {
    fn from(map: HashMap<String, Value>) -> Self {
        Self(
            map.into_iter()
                .map(|(name, value)| (name, ParamValue::Literal(value)))
                .collect(),
        )
    }
}

impl FromIterator<(String, ParamValue)> for RequestParams {
    fn from_iter<I: IntoIterator<Item = (String, ParamValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
