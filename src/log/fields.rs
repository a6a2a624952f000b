//! Field maps and the request-scoped context that carries them.
//!
//! # Responsibilities
//! - `Fields`: named, pre-encoded values for one log line
//! - `LogCtx`: an immutable snapshot of context fields for one logical scope
//!
//! # Design Decisions
//! - A `LogCtx` never changes after creation; `with_fields` copies then merges
//!   into a new snapshot, so siblings derived from one parent never see each
//!   other's fields
//! - The context is an explicit value passed along (request extensions in the
//!   HTTP stack), not hidden global state

use std::collections::btree_map::{self, BTreeMap};
use std::sync::Arc;

use axum::http::Extensions;

use crate::log::value::Value;

/// Key under which encoding and context diagnostics are reported.
pub const ERROR_KEY: &str = "logerror";

/// Mapping of field name to encoded value.
///
/// Iteration is ordered by key, which keeps human-readable output stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields(BTreeMap<String, Value>);

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, replacing any previous value under `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.0.iter()
    }

    /// Overwrite entries in `self` with every entry of `other`.
    pub fn merge(&mut self, other: Fields) {
        self.0.extend(other.0);
    }
}

impl<'a> IntoIterator for &'a Fields {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for Fields {
    type Item = (String, Value);
    type IntoIter = btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Fields {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Context fields for one logical scope (usually one inbound request).
///
/// Cloning is cheap: the snapshot is shared and never mutated.
#[derive(Debug, Clone, Default)]
pub struct LogCtx {
    fields: Arc<Fields>,
}

impl LogCtx {
    /// An empty root context.
    pub fn new() -> Self {
        Self::default()
    }

    /// The context stored on a request, or an empty one when none was attached.
    pub fn from_extensions(extensions: &Extensions) -> Self {
        extensions.get::<LogCtx>().cloned().unwrap_or_default()
    }

    /// The snapshot associated with this context.
    pub fn get_fields(&self) -> &Fields {
        &self.fields
    }

    /// An independent copy of the snapshot.
    pub fn copy_fields(&self) -> Fields {
        Fields::clone(&self.fields)
    }

    /// Derive a child context holding a copy of this snapshot merged with
    /// `fields`. New keys win on collision; `self` is left untouched.
    pub fn with_fields(&self, fields: Fields) -> LogCtx {
        let mut merged = self.copy_fields();
        merged.merge(fields);
        LogCtx {
            fields: Arc::new(merged),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one(key: &str, val: &str) -> Fields {
        [(key, Value::string(val))].into_iter().collect()
    }

    #[test]
    fn siblings_do_not_share_fields() {
        let root = LogCtx::new();
        let ctx1 = root.with_fields(one("a", "1"));
        let ctx2 = root.with_fields(one("b", "2"));

        assert!(ctx1.get_fields().contains_key("a"));
        assert!(!ctx1.get_fields().contains_key("b"));
        assert!(ctx2.get_fields().contains_key("b"));
        assert!(!ctx2.get_fields().contains_key("a"));
        assert!(root.get_fields().is_empty());
    }

    #[test]
    fn child_accumulates_and_overwrites() {
        let parent = LogCtx::new().with_fields(one("a", "1"));
        let child = parent.with_fields(one("a", "one"));
        let grandchild = child.with_fields(one("b", "2"));

        assert_eq!(parent.get_fields().get("a"), Some(&Value::string("1")));
        assert_eq!(child.get_fields().get("a"), Some(&Value::string("one")));
        assert_eq!(grandchild.get_fields().len(), 2);
    }

    #[test]
    fn copy_is_independent() {
        let ctx = LogCtx::new().with_fields(one("a", "1"));
        let mut copy = ctx.copy_fields();
        copy.insert("b", Value::string("2"));

        assert_eq!(copy.len(), 2);
        assert_eq!(ctx.get_fields().len(), 1);
    }

    #[test]
    fn missing_extension_gives_empty_context() {
        let ext = Extensions::new();
        assert!(LogCtx::from_extensions(&ext).get_fields().is_empty());
    }
}
