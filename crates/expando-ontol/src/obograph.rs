//! OBO Graphs JSON ingestion and the in-memory ontology graph.
//!
//! Only the parts of the format the indexes need are modelled: node ids,
//! labels, node types, synonyms and edges. Everything else in the document is
//! ignored.
//!
//! Identifiers are contracted to CURIEs when they are OBO PURLs
//! (`http://purl.obolibrary.org/obo/GO_0005623` → `GO:0005623`), and the
//! `is_a` edge predicate is normalized to `subClassOf`.

use std::borrow::Cow;
use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use ahash::{AHashMap, AHashSet};
use serde::Deserialize;

use crate::error::{OntologyError, Result};
use crate::graph::Ontology;

pub const OBO_PURL_PREFIX: &str = "http://purl.obolibrary.org/obo/";
pub const SUBCLASS_OF: &str = "subClassOf";

const RDFS_SUBCLASS_OF_IRI: &str = "http://www.w3.org/2000/01/rdf-schema#subClassOf";

// ============================================================================
// JSON model
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GraphDocument {
    #[serde(default)]
    pub graphs: Vec<GraphJson>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GraphJson {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub nodes: Vec<NodeJson>,
    #[serde(default)]
    pub edges: Vec<EdgeJson>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NodeJson {
    pub id: String,
    #[serde(default)]
    pub lbl: Option<String>,
    #[serde(default, rename = "type")]
    pub node_type: Option<String>,
    #[serde(default)]
    pub meta: Option<MetaJson>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetaJson {
    #[serde(default)]
    pub synonyms: Vec<SynonymJson>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SynonymJson {
    #[serde(default)]
    pub pred: Option<String>,
    pub val: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EdgeJson {
    pub sub: String,
    pub pred: String,
    pub obj: String,
}

// ============================================================================
// Identifiers
// ============================================================================

/// `http://purl.obolibrary.org/obo/GO_0005623` → `GO:0005623`; other IRIs unchanged.
pub fn contract_iri(iri: &str) -> Cow<'_, str> {
    if let Some(local) = iri.strip_prefix(OBO_PURL_PREFIX) {
        if let Some((prefix, rest)) = local.split_once('_') {
            let plain = |s: &str| !s.is_empty() && !s.contains(['/', '#']);
            if plain(prefix) && plain(rest) {
                return Cow::Owned(format!("{prefix}:{rest}"));
            }
        }
    }
    Cow::Borrowed(iri)
}

/// Canonical relation name for an edge predicate or a user-supplied relation.
pub fn normalize_relation(pred: &str) -> String {
    match pred {
        "is_a" | SUBCLASS_OF | RDFS_SUBCLASS_OF_IRI | "rdfs:subClassOf" => SUBCLASS_OF.to_string(),
        other => contract_iri(other).into_owned(),
    }
}

// ============================================================================
// In-memory graph
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Class,
    Property,
    Individual,
    Other,
}

impl NodeKind {
    fn from_json(node_type: &str) -> Self {
        match node_type {
            "CLASS" => NodeKind::Class,
            "PROPERTY" => NodeKind::Property,
            "INDIVIDUAL" => NodeKind::Individual,
            _ => NodeKind::Other,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OntologyNode {
    pub kind: Option<NodeKind>,
    pub label: Option<String>,
    pub synonyms: Vec<String>,
}

impl OntologyNode {
    pub fn class(label: Option<&str>, synonyms: &[&str]) -> Self {
        Self {
            kind: Some(NodeKind::Class),
            label: label.map(str::to_string),
            synonyms: synonyms.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Fields set on `other` win; synonyms accumulate.
    fn absorb(&mut self, other: OntologyNode) {
        if other.kind.is_some() {
            self.kind = other.kind;
        }
        if other.label.is_some() {
            self.label = other.label;
        }
        for syn in other.synonyms {
            if !self.synonyms.contains(&syn) {
                self.synonyms.push(syn);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ParentEdge {
    relation: String,
    object: String,
}

/// An ontology held in memory, with nodes kept in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct Obograph {
    order: Vec<String>,
    nodes: AHashMap<String, OntologyNode>,
    parents: AHashMap<String, Vec<ParentEdge>>,
    edge_count: usize,
}

impl Obograph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.order.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Insert a node, or fold it into an existing node with the same id.
    pub fn add_node(&mut self, id: impl Into<String>, node: OntologyNode) {
        let id = id.into();
        match self.nodes.get_mut(&id) {
            Some(existing) => existing.absorb(node),
            None => {
                self.order.push(id.clone());
                self.nodes.insert(id, node);
            }
        }
    }

    /// Add `subject --relation--> object`; repeated edges are ignored.
    pub fn add_edge(&mut self, subject: &str, relation: &str, object: &str) {
        let edge = ParentEdge {
            relation: normalize_relation(relation),
            object: object.to_string(),
        };
        let edges = self.parents.entry(subject.to_string()).or_default();
        if !edges.contains(&edge) {
            edges.push(edge);
            self.edge_count += 1;
        }
    }

    /// Fold `other` into this graph.
    pub fn merge(&mut self, other: Obograph) {
        let Obograph {
            order,
            mut nodes,
            parents,
            ..
        } = other;
        for id in order {
            if let Some(node) = nodes.remove(&id) {
                self.add_node(id, node);
            }
        }
        for (subject, edges) in parents {
            for edge in edges {
                self.add_edge(&subject, &edge.relation, &edge.object);
            }
        }
    }

    pub fn from_document(doc: GraphDocument) -> Self {
        let mut graph = Self::new();
        for g in doc.graphs {
            for n in g.nodes {
                let node = OntologyNode {
                    kind: n.node_type.as_deref().map(NodeKind::from_json),
                    label: n.lbl,
                    synonyms: n
                        .meta
                        .map(|m| m.synonyms.into_iter().map(|s| s.val).collect())
                        .unwrap_or_default(),
                };
                graph.add_node(contract_iri(&n.id).into_owned(), node);
            }
            for e in g.edges {
                graph.add_edge(&contract_iri(&e.sub), &e.pred, &contract_iri(&e.obj));
            }
        }
        graph
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let doc: GraphDocument = serde_json::from_reader(reader)?;
        Ok(Self::from_document(doc))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| OntologyError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let doc: GraphDocument =
            serde_json::from_reader(BufReader::new(file)).map_err(|source| {
                OntologyError::Parse {
                    path: path.to_path_buf(),
                    source,
                }
            })?;
        let graph = Self::from_document(doc);
        tracing::info!(
            path = %path.display(),
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "loaded ontology"
        );
        Ok(graph)
    }
}

/// Load each file and merge later files into the first.
pub fn load_from_files<P: AsRef<Path>>(files: &[P]) -> Result<Obograph> {
    let mut merged: Option<Obograph> = None;
    for file in files {
        let graph = Obograph::from_path(file)?;
        match merged.as_mut() {
            Some(base) => base.merge(graph),
            None => merged = Some(graph),
        }
    }
    Ok(merged.unwrap_or_default())
}

impl Ontology for Obograph {
    fn nodes(&self) -> Vec<&str> {
        self.order.iter().map(String::as_str).collect()
    }

    fn node_is_class(&self, node: &str) -> bool {
        matches!(
            self.nodes.get(node).and_then(|n| n.kind),
            Some(NodeKind::Class)
        )
    }

    fn label(&self, node: &str) -> Option<&str> {
        self.nodes.get(node).and_then(|n| n.label.as_deref())
    }

    fn synonyms(&self, node: &str) -> Vec<&str> {
        self.nodes
            .get(node)
            .map(|n| n.synonyms.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    // Breadth-first over parent edges, in discovery order.
    fn ancestors(&self, node: &str) -> Vec<&str> {
        let mut seen: AHashSet<&str> = AHashSet::new();
        seen.insert(node);
        let mut queue = VecDeque::from([node]);
        let mut found = Vec::new();

        while let Some(current) = queue.pop_front() {
            for edge in self.parents.get(current).into_iter().flatten() {
                let object = edge.object.as_str();
                if seen.insert(object) {
                    found.push(object);
                    queue.push_back(object);
                }
            }
        }
        found
    }

    fn restrict_to_relations(&self, relations: &[String]) -> Self {
        let keep: AHashSet<String> = relations.iter().map(|r| normalize_relation(r)).collect();
        let mut restricted = Obograph {
            order: self.order.clone(),
            nodes: self.nodes.clone(),
            parents: AHashMap::new(),
            edge_count: 0,
        };
        for (subject, edges) in &self.parents {
            for edge in edges.iter().filter(|e| keep.contains(&e.relation)) {
                restricted.add_edge(subject, &edge.relation, &edge.object);
            }
        }
        restricted
    }
}
