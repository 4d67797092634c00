//! Ontology indexes for term-expando.
//!
//! Builds `(source, targets)` pairs from an ontology graph:
//! - `closure`: class id → ancestor ids (optionally restricted to relations)
//! - `id2name`: class id → label
//! - `id2alias`: class id → synonyms and label
//! - `name2id`: label → class id
//!
//! The graph is reached through the [`Ontology`] trait. [`Obograph`] loads OBO
//! Graphs JSON into memory and is what the CLI uses.

pub mod error;
pub mod graph;
pub mod indexer;
pub mod obograph;

pub use error::{OntologyError, Result};
pub use graph::Ontology;
pub use indexer::{IndexOp, OntolIndexer, TARGET_SEPARATOR};
pub use obograph::{contract_iri, load_from_files, normalize_relation, Obograph, OntologyNode};
