//! Index generation: ontology → `(source, targets)` pairs.
//!
//! Every generator appends `(source, targets.join("|"))`. Pairs are kept in
//! traversal order and never deduplicated here; the lookup table that
//! consumes them decides what a repeated key means.

use std::fmt;
use std::io::Write;
use std::str::FromStr;

use crate::error::{OntologyError, Result};
use crate::graph::Ontology;

pub const TARGET_SEPARATOR: &str = "|";

/// The index kinds an [`OntolIndexer`] can generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexOp {
    /// id → transitive ancestors
    Closure,
    /// id → label
    Id2Name,
    /// id → synonyms + label
    Id2Alias,
    /// label → id
    Name2Id,
}

impl IndexOp {
    pub const ALL: [IndexOp; 4] = [
        IndexOp::Closure,
        IndexOp::Id2Name,
        IndexOp::Id2Alias,
        IndexOp::Name2Id,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            IndexOp::Closure => "closure",
            IndexOp::Id2Name => "id2name",
            IndexOp::Id2Alias => "id2alias",
            IndexOp::Name2Id => "name2id",
        }
    }
}

impl fmt::Display for IndexOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IndexOp {
    type Err = OntologyError;

    fn from_str(s: &str) -> Result<Self> {
        IndexOp::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| OntologyError::UnknownOperation(s.to_string()))
    }
}

/// Generates index pairs from a borrowed ontology.
#[derive(Debug)]
pub struct OntolIndexer<'o, G: Ontology> {
    ontology: &'o G,
    relations: Vec<String>,
    pairs: Vec<(String, String)>,
}

impl<'o, G: Ontology> OntolIndexer<'o, G> {
    pub fn new(ontology: &'o G) -> Self {
        Self {
            ontology,
            relations: Vec::new(),
            pairs: Vec::new(),
        }
    }

    /// Restrict closure traversal to these relations; empty means all.
    pub fn with_relations(mut self, relations: Vec<String>) -> Self {
        self.relations = relations;
        self
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn into_pairs(self) -> Vec<(String, String)> {
        self.pairs
    }

    pub fn run(&mut self, op: IndexOp) {
        let before = self.pairs.len();
        match op {
            IndexOp::Closure => self.gen_closure(),
            IndexOp::Id2Name => self.gen_id2name(),
            IndexOp::Id2Alias => self.gen_id2alias(),
            IndexOp::Name2Id => self.gen_name2id(),
        }
        tracing::debug!(op = %op, pairs = self.pairs.len() - before, "generated index");
    }

    pub fn gen_closure(&mut self) {
        let restricted;
        let ont: &G = if self.relations.is_empty() {
            self.ontology
        } else {
            restricted = self.ontology.restrict_to_relations(&self.relations);
            &restricted
        };
        for node in ont.nodes() {
            if ont.node_is_class(node) {
                let ancestors = ont.ancestors(node);
                push_pair(&mut self.pairs, node, &ancestors);
            }
        }
    }

    pub fn gen_id2name(&mut self) {
        let ont = self.ontology;
        for node in ont.nodes() {
            if !ont.node_is_class(node) {
                continue;
            }
            if let Some(label) = ont.label(node) {
                push_pair(&mut self.pairs, node, &[label]);
            }
        }
    }

    pub fn gen_id2alias(&mut self) {
        let ont = self.ontology;
        for node in ont.nodes() {
            if !ont.node_is_class(node) {
                continue;
            }
            let mut aliases = ont.synonyms(node);
            aliases.extend(ont.label(node));
            push_pair(&mut self.pairs, node, &aliases);
        }
    }

    pub fn gen_name2id(&mut self) {
        let ont = self.ontology;
        for node in ont.nodes() {
            if !ont.node_is_class(node) {
                continue;
            }
            if let Some(label) = ont.label(node) {
                push_pair(&mut self.pairs, label, &[node]);
            }
        }
    }

    /// Write the pairs as a two-column TSV lookup table.
    pub fn save<W: Write>(&self, mut out: W) -> Result<()> {
        for (source, targets) in &self.pairs {
            writeln!(out, "{source}\t{targets}")?;
        }
        Ok(())
    }
}

fn push_pair(pairs: &mut Vec<(String, String)>, source: &str, targets: &[&str]) {
    pairs.push((source.to_string(), targets.join(TARGET_SEPARATOR)));
}
