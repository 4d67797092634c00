//! The ontology capabilities the indexer relies on.
//!
//! Any graph that can enumerate its nodes, classify them, report labels and
//! synonyms, and compute ancestors can back an [`crate::OntolIndexer`].
//! [`crate::Obograph`] is the in-memory implementation shipped with this crate.

pub trait Ontology {
    /// All node identifiers, in a stable order.
    fn nodes(&self) -> Vec<&str>;

    fn node_is_class(&self, node: &str) -> bool;

    fn label(&self, node: &str) -> Option<&str>;

    fn synonyms(&self, node: &str) -> Vec<&str>;

    /// Transitive ancestors of `node`, excluding `node` itself.
    fn ancestors(&self, node: &str) -> Vec<&str>;

    /// A view of this graph keeping only edges whose relation is in `relations`.
    fn restrict_to_relations(&self, relations: &[String]) -> Self
    where
        Self: Sized;
}
