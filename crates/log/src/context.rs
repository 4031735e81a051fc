//! Ordered key/value context attached to log entries

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Ordered context map
///
/// Keys keep their insertion order in every output format. Inserting an
/// existing key replaces its value in place.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Context {
    fields: IndexMap<String, Value>,
}

impl Context {
    /// Create a new empty context
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field
    ///
    /// Values that fail to serialize are dropped.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert a field, replacing an existing value for the same key
    pub fn insert(&mut self, key: impl Into<String>, value: impl Serialize) {
        if let Ok(v) = serde_json::to_value(value) {
            self.fields.insert(key.into(), v);
        }
    }

    /// Look up a field
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether there are no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate fields in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Merge `overrides` into `base`; `overrides` wins on key collisions
    #[must_use]
    pub fn merge(base: &Context, overrides: &Context) -> Context {
        let mut merged = base.clone();
        merged.extend(overrides);
        merged
    }

    /// Merge two optional contexts, see [`Context::merge`]
    pub fn merge_optional(base: Option<&Context>, overrides: Option<&Context>) -> Context {
        match (base, overrides) {
            (Some(base), Some(overrides)) => Self::merge(base, overrides),
            (Some(only), None) | (None, Some(only)) => only.clone(),
            (None, None) => Context::new(),
        }
    }

    /// Copy every field of `other` into `self`
    pub fn extend(&mut self, other: &Context) {
        for (k, v) in &other.fields {
            self.fields.insert(k.clone(), v.clone());
        }
    }
}

/// Renders as `{a=1, b=text}`; strings are written without quotes
impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (k, v)) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match v {
                Value::String(s) => write!(f, "{k}={s}")?,
                other => write!(f, "{k}={other}")?,
            }
        }
        f.write_str("}")
    }
}

impl<K, V> FromIterator<(K, V)> for Context
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Build a [`Context`] from `key => value` pairs
///
/// ```rust
/// let ctx = lab_log::context! { "host" => "lab-01", "attempt" => 2 };
/// assert_eq!(ctx.len(), 2);
/// ```
#[macro_export]
macro_rules! context {
    () => { $crate::Context::new() };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut ctx = $crate::Context::new();
        $( ctx.insert($key, $value); )+
        ctx
    }};
}
