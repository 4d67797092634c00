//! Column-wise expansion of delimited rows.
//!
//! The first row fixes the column names (unless `auto_header` is set, in which
//! case columns are named `c1`, `c2`, ...). Header cells are renamed rather than
//! expanded: `name_<table>` under a column map, `name_expanded` without one.

use std::borrow::Cow;
use std::collections::BTreeMap;

use csv::StringRecord;

use crate::error::{ExpandoError, Result};
use crate::expander::Expander;

/// Suffix given to header cells when every column expands against the default table.
pub const EXPANDED_SUFFIX: &str = "expanded";

/// Separates the original cell from its expansion in unmapped in-place output.
pub const IN_PLACE_MARKER: &str = " ! ";

/// Column name → lookup table name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    columns: BTreeMap<String, String>,
}

impl ColumnMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `column:table` specs.
    pub fn parse_specs<I, S>(specs: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut map = Self::new();
        for spec in specs {
            let spec = spec.as_ref();
            let (column, table) = split_pair(spec)
                .ok_or_else(|| ExpandoError::InvalidColumnMap(spec.to_string()))?;
            map.insert(column, table);
        }
        Ok(map)
    }

    pub fn insert(&mut self, column: impl Into<String>, table: impl Into<String>) {
        self.columns.insert(column.into(), table.into());
    }

    pub fn table_for(&self, column: &str) -> Option<&str> {
        self.columns.get(column).map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ColumnMap {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = Self::new();
        for (column, table) in iter {
            map.insert(column, table);
        }
        map
    }
}

/// Split `left:right` on its single colon.
pub fn split_pair(spec: &str) -> Option<(&str, &str)> {
    let mut parts = spec.split(':');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(left), Some(right), None) => Some((left, right)),
        _ => None,
    }
}

/// Validate a delimiter for the CSV reader: exactly one ASCII character.
pub fn single_byte_separator(separator: &str) -> Result<u8> {
    match separator.as_bytes() {
        [b] if b.is_ascii() => Ok(*b),
        [] => Err(ExpandoError::invalid_separator(separator, "separator is empty")),
        _ => Err(ExpandoError::invalid_separator(
            separator,
            "column separator must be a single ASCII character",
        )),
    }
}

#[derive(Debug, Clone)]
pub struct TsvOptions {
    /// Absent: every column expands against the default table.
    pub column_map: Option<ColumnMap>,
    /// Input has no header row; columns are named `c1`, `c2`, ...
    pub auto_header: bool,
    pub in_place: bool,
    pub separator: u8,
}

impl Default for TsvOptions {
    fn default() -> Self {
        Self {
            column_map: None,
            auto_header: false,
            in_place: true,
            separator: b'\t',
        }
    }
}

#[derive(Debug)]
enum Header {
    Pending,
    Named(Vec<String>),
    Positional,
}

impl Header {
    fn column_name(&self, index: usize) -> Cow<'_, str> {
        match self {
            Header::Named(names) => names
                .get(index)
                .map(|n| Cow::Borrowed(n.as_str()))
                .unwrap_or(Cow::Borrowed("")),
            Header::Positional => Cow::Owned(format!("c{}", index + 1)),
            Header::Pending => Cow::Borrowed(""),
        }
    }
}

/// Rewrites one row at a time; holds the header seen on the first row.
pub(crate) struct RowRewriter<'a> {
    expander: &'a Expander,
    options: &'a TsvOptions,
    header: Header,
}

impl<'a> RowRewriter<'a> {
    pub(crate) fn new(expander: &'a Expander, options: &'a TsvOptions) -> Self {
        let header = if options.auto_header {
            Header::Positional
        } else {
            Header::Pending
        };
        Self {
            expander,
            options,
            header,
        }
    }

    pub(crate) fn rewrite(&mut self, record: &StringRecord) -> Result<Vec<String>> {
        let is_header = matches!(self.header, Header::Pending);
        if is_header {
            self.header = Header::Named(record.iter().map(str::to_string).collect());
        }

        let mut cells = Vec::with_capacity(record.len() * 2);
        for (index, original) in record.iter().enumerate() {
            let column = self.header.column_name(index);
            let table = match &self.options.column_map {
                Some(map) => match map.table_for(&column) {
                    Some(table) => Some(table),
                    None => {
                        cells.push(original.to_string());
                        continue;
                    }
                },
                None => None,
            };

            let rewritten = if is_header {
                format!("{original}_{}", table.unwrap_or(EXPANDED_SUFFIX))
            } else {
                self.expander.expand_token(original, table)?.into_owned()
            };

            if self.options.column_map.is_none() && self.options.in_place {
                if rewritten != original {
                    cells.push(format!("{original}{IN_PLACE_MARKER}{rewritten}"));
                } else {
                    cells.push(rewritten);
                }
            } else {
                cells.push(original.to_string());
                cells.push(rewritten);
            }
        }
        Ok(cells)
    }
}
