//! term-expando core: dictionary-based term expansion.
//!
//! An [`Expander`] owns named [`LookupTable`]s and applies them to:
//! - single terms (`expand_term`),
//! - separator-delimited text, line by line (`expand_text`, `expand_file`),
//! - columns of delimited files (`expand_tsv`).
//!
//! Unknown tokens always pass through unchanged; only the table being
//! addressed has to exist.

pub mod error;
pub mod expander;
pub mod table;
pub mod tsv;

pub use error::{ExpandoError, Result};
pub use expander::{Expander, TableLoadOptions, TextOptions, DEFAULT_TABLE};
pub use table::{DuplicatePolicy, LookupTable, TableValue, MERGE_SEPARATOR};
pub use tsv::{single_byte_separator, split_pair, ColumnMap, TsvOptions};
