//! Lookup tables: key → scalar or list value, with a duplicate-key policy.
//!
//! A table fixes its value shape when it is created. Tables built with a value
//! separator split every incoming value into a [`TableValue::List`]; tables
//! built without one keep each value as a single [`TableValue::Scalar`]. The two
//! shapes never mix inside one table.

use std::borrow::Cow;
use std::collections::hash_map::Entry;
use std::fmt;
use std::str::FromStr;

use ahash::AHashMap;

use crate::error::{ExpandoError, Result};

/// Separator used when merging duplicate scalar values, and when rendering a
/// list that came from a table without its own separator.
pub const MERGE_SEPARATOR: &str = "|";

/// A stored expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableValue {
    Scalar(String),
    List(Vec<String>),
}

impl TableValue {
    /// Render as a single token, joining list items with `separator`.
    pub fn render(&self, separator: &str) -> Cow<'_, str> {
        match self {
            TableValue::Scalar(s) => Cow::Borrowed(s.as_str()),
            TableValue::List(items) => Cow::Owned(items.join(separator)),
        }
    }

    fn merge(&mut self, incoming: TableValue) {
        match self {
            TableValue::Scalar(existing) => {
                existing.push_str(MERGE_SEPARATOR);
                existing.push_str(&incoming.render(MERGE_SEPARATOR));
            }
            TableValue::List(existing) => match incoming {
                TableValue::List(items) => existing.extend(items),
                TableValue::Scalar(item) => existing.push(item),
            },
        }
    }
}

impl From<&str> for TableValue {
    fn from(value: &str) -> Self {
        TableValue::Scalar(value.to_string())
    }
}

impl From<Vec<&str>> for TableValue {
    fn from(items: Vec<&str>) -> Self {
        TableValue::List(items.into_iter().map(str::to_string).collect())
    }
}

/// What happens when a key is inserted into a table that already holds it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Reject the second insertion with [`ExpandoError::DuplicateKey`].
    #[default]
    Strict,
    /// Append the new value after the existing one(s).
    Merge,
    /// Replace the existing value.
    Overwrite,
}

impl DuplicatePolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            DuplicatePolicy::Strict => "strict",
            DuplicatePolicy::Merge => "merge",
            DuplicatePolicy::Overwrite => "overwrite",
        }
    }
}

impl fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DuplicatePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(DuplicatePolicy::Strict),
            "merge" => Ok(DuplicatePolicy::Merge),
            "overwrite" => Ok(DuplicatePolicy::Overwrite),
            other => Err(format!(
                "unknown duplicate policy `{other}` (expected strict, merge or overwrite)"
            )),
        }
    }
}

/// A named key → value mapping.
#[derive(Debug, Clone)]
pub struct LookupTable {
    name: String,
    value_separator: Option<String>,
    entries: AHashMap<String, TableValue>,
}

impl LookupTable {
    /// An empty table. With `value_separator` set, values are stored as lists.
    pub fn new(name: impl Into<String>, value_separator: Option<String>) -> Self {
        Self {
            name: name.into(),
            value_separator,
            entries: AHashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value_separator(&self) -> Option<&str> {
        self.value_separator.as_deref()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&TableValue> {
        self.entries.get(key)
    }

    /// Render a value from this table as one token.
    pub fn render<'v>(&self, value: &'v TableValue) -> Cow<'v, str> {
        value.render(self.value_separator().unwrap_or(MERGE_SEPARATOR))
    }

    /// Insert `raw` under `key`, splitting it first if the table stores lists.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        raw: &str,
        policy: DuplicatePolicy,
    ) -> Result<()> {
        let value = match &self.value_separator {
            Some(sep) => TableValue::List(raw.split(sep.as_str()).map(str::to_string).collect()),
            None => TableValue::Scalar(raw.to_string()),
        };

        match self.entries.entry(key.into()) {
            Entry::Vacant(slot) => {
                slot.insert(value);
            }
            Entry::Occupied(mut slot) => match policy {
                DuplicatePolicy::Strict => {
                    return Err(ExpandoError::DuplicateKey {
                        table: self.name.clone(),
                        key: slot.key().clone(),
                    });
                }
                DuplicatePolicy::Merge => slot.get_mut().merge(value),
                DuplicatePolicy::Overwrite => {
                    slot.insert(value);
                }
            },
        }
        Ok(())
    }
}
