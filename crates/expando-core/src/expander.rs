//! The expansion session: named lookup tables plus the operations that apply them.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::Path;

use crate::error::{ExpandoError, Result};
use crate::table::{DuplicatePolicy, LookupTable, TableValue};
use crate::tsv::{RowRewriter, TsvOptions};

pub const DEFAULT_TABLE: &str = "default";

/// How a table source is read and merged.
#[derive(Debug, Clone)]
pub struct TableLoadOptions {
    /// Delimiter between key and value columns (table files only).
    pub column_separator: u8,
    /// When set, values are split into lists on this separator.
    pub value_separator: Option<String>,
    pub duplicates: DuplicatePolicy,
}

impl Default for TableLoadOptions {
    fn default() -> Self {
        Self {
            column_separator: b'\t',
            value_separator: None,
            duplicates: DuplicatePolicy::Strict,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TextOptions {
    pub separator: String,
    /// Replace tokens (true) or append expansions after them (false).
    pub in_place: bool,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            separator: " ".to_string(),
            in_place: true,
        }
    }
}

/// Owns the lookup tables for one invocation.
///
/// Operations that take `table: Option<&str>` address the default table when
/// given `None`.
#[derive(Debug, Clone)]
pub struct Expander {
    tables: BTreeMap<String, LookupTable>,
    default_table: String,
}

impl Default for Expander {
    fn default() -> Self {
        Self {
            tables: BTreeMap::new(),
            default_table: DEFAULT_TABLE.to_string(),
        }
    }
}

impl Expander {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn default_table(&self) -> &str {
        &self.default_table
    }

    pub fn set_default_table(&mut self, name: impl Into<String>) {
        self.default_table = name.into();
    }

    pub fn tables(&self) -> impl Iterator<Item = &LookupTable> + '_ {
        self.tables.values()
    }

    pub fn table(&self, name: Option<&str>) -> Result<&LookupTable> {
        let name = name.unwrap_or(&self.default_table);
        self.tables
            .get(name)
            .ok_or_else(|| ExpandoError::UnknownTable(name.to_string()))
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Build a table from a two-column delimited file, replacing any table of
    /// the same name.
    pub fn load_table(
        &mut self,
        path: impl AsRef<Path>,
        table: Option<&str>,
        options: &TableLoadOptions,
    ) -> Result<()> {
        let file = File::open(path.as_ref())?;
        self.load_table_from_reader(file, table, options)
    }

    pub fn load_table_from_reader<R: Read>(
        &mut self,
        reader: R,
        table: Option<&str>,
        options: &TableLoadOptions,
    ) -> Result<()> {
        let name = table.unwrap_or(&self.default_table).to_string();
        let mut lookup = LookupTable::new(name.clone(), options.value_separator.clone());

        let mut rows = csv::ReaderBuilder::new()
            .delimiter(options.column_separator)
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut record = csv::StringRecord::new();
        while rows.read_record(&mut record)? {
            if record.len() < 2 {
                return Err(ExpandoError::MalformedRow {
                    line: record.position().map(|p| p.line()).unwrap_or(0),
                    found: record.len(),
                });
            }
            lookup.insert(&record[0], &record[1], options.duplicates)?;
        }

        tracing::debug!(table = %name, entries = lookup.len(), "loaded lookup table");
        self.tables.insert(name, lookup);
        Ok(())
    }

    /// Insert `(key, value)` pairs, creating the table if needed. Unlike
    /// [`Expander::load_table`] this augments an existing table.
    ///
    /// A failed load leaves the table as it was.
    pub fn load_pairs<I, K, V>(
        &mut self,
        pairs: I,
        table: Option<&str>,
        options: &TableLoadOptions,
    ) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        let name = table.unwrap_or(&self.default_table).to_string();
        let mut lookup = match self.tables.get(&name) {
            Some(existing) => existing.clone(),
            None => LookupTable::new(name.clone(), options.value_separator.clone()),
        };

        if lookup.value_separator() != options.value_separator.as_deref() {
            return Err(ExpandoError::ValueShapeMismatch {
                table: name,
                existing: lookup.value_separator().map(str::to_string),
                requested: options.value_separator.clone(),
            });
        }

        let before = lookup.len();
        for (key, value) in pairs {
            lookup.insert(key, value.as_ref(), options.duplicates)?;
        }
        tracing::debug!(
            table = %name,
            added = lookup.len() - before,
            entries = lookup.len(),
            "loaded pairs"
        );
        self.tables.insert(name, lookup);
        Ok(())
    }

    // ========================================================================
    // Expansion
    // ========================================================================

    /// The stored value for `term`, or `term` itself when the table lacks it.
    pub fn expand_term(&self, term: &str, table: Option<&str>) -> Result<TableValue> {
        let lookup = self.table(table)?;
        Ok(lookup
            .get(term)
            .cloned()
            .unwrap_or_else(|| TableValue::Scalar(term.to_string())))
    }

    /// Like [`Expander::expand_term`], rendered as a single token.
    pub fn expand_token<'a>(&'a self, token: &'a str, table: Option<&str>) -> Result<Cow<'a, str>> {
        let lookup = self.table(table)?;
        Ok(match lookup.get(token) {
            Some(value) => lookup.render(value),
            None => Cow::Borrowed(token),
        })
    }

    pub fn expand_text(&self, text: &str, table: Option<&str>, options: &TextOptions) -> Result<String> {
        let sep = options.separator.as_str();
        if sep.is_empty() {
            return Err(ExpandoError::invalid_separator(sep, "separator is empty"));
        }

        let mut tokens: Vec<Cow<'_, str>> = Vec::new();
        for token in text.split(sep) {
            let expanded = self.expand_token(token, table)?;
            if options.in_place {
                tokens.push(expanded);
            } else {
                let changed = expanded != token;
                tokens.push(Cow::Borrowed(token));
                if changed {
                    tokens.push(expanded);
                }
            }
        }
        Ok(tokens.join(sep))
    }

    /// Expand each line of `reader`, writing one output line per input line.
    pub fn expand_lines<R: BufRead, W: Write>(
        &self,
        reader: R,
        mut out: W,
        table: Option<&str>,
        options: &TextOptions,
    ) -> Result<()> {
        for line in reader.lines() {
            let line = line?;
            let expanded = self.expand_text(line.trim_end(), table, options)?;
            writeln!(out, "{expanded}")?;
        }
        Ok(())
    }

    pub fn expand_file<W: Write>(
        &self,
        path: impl AsRef<Path>,
        out: W,
        table: Option<&str>,
        options: &TextOptions,
    ) -> Result<()> {
        let file = File::open(path.as_ref())?;
        self.expand_lines(BufReader::new(file), out, table, options)
    }

    /// Expand the columns of delimited rows; see [`crate::tsv`] for the layout.
    ///
    /// Writes one line per input line. Blank lines come out blank and do not
    /// count as the header.
    pub fn expand_tsv_reader<R: Read, W: Write>(
        &self,
        reader: R,
        mut out: W,
        options: &TsvOptions,
    ) -> Result<()> {
        let mut builder = csv::ReaderBuilder::new();
        builder
            .delimiter(options.separator)
            .has_headers(false)
            .flexible(true);

        let sep = char::from(options.separator).to_string();
        let mut rewriter = RowRewriter::new(self, options);
        let mut record = csv::StringRecord::new();
        for line in BufReader::new(reader).lines() {
            let line = line?;
            let line = line.strip_suffix('\r').unwrap_or(&line);
            if line.is_empty() {
                writeln!(out)?;
                continue;
            }
            let mut row = builder.from_reader(line.as_bytes());
            if !row.read_record(&mut record)? {
                writeln!(out)?;
                continue;
            }
            let cells = rewriter.rewrite(&record)?;
            writeln!(out, "{}", cells.join(&sep))?;
        }
        Ok(())
    }

    pub fn expand_tsv<W: Write>(
        &self,
        path: impl AsRef<Path>,
        out: W,
        options: &TsvOptions,
    ) -> Result<()> {
        let file = File::open(path.as_ref())?;
        self.expand_tsv_reader(file, out, options)
    }
}
