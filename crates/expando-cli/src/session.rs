//! Per-invocation setup: lookup tables, ontology, generated indexes.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use expando_core::{split_pair, DuplicatePolicy, Expander, TableLoadOptions};
use expando_ontol::{load_from_files, IndexOp, Obograph, OntolIndexer};

#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Ontology file in OBO Graphs JSON (repeatable; later files merge into the first).
    #[arg(short = 'l', long = "load")]
    pub load: Vec<PathBuf>,

    /// Index to generate from the loaded ontology: closure, id2name, id2alias, name2id.
    ///
    /// Defaults to id2name when `--load` is given.
    #[arg(short = 'e', long = "operation")]
    pub operation: Vec<IndexOp>,

    /// Relation to follow when generating a closure index (repeatable; default: all).
    #[arg(short = 'r', long = "relation")]
    pub relation: Vec<String>,

    /// Default lookup table (two-column TSV).
    #[arg(short = 't', long)]
    pub table: Option<PathBuf>,

    /// Named lookup table, as NAME:FILE (repeatable).
    #[arg(short = 'T', long = "named-table", value_parser = parse_named_table)]
    pub named_table: Vec<NamedTable>,

    /// Split table values into lists on this separator.
    #[arg(long)]
    pub value_separator: Option<String>,

    /// What to do when a key repeats: strict, merge or overwrite.
    #[arg(long, default_value_t = DuplicatePolicy::Strict)]
    pub duplicates: DuplicatePolicy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedTable {
    pub name: String,
    pub path: PathBuf,
}

fn parse_named_table(spec: &str) -> Result<NamedTable, String> {
    let (name, path) =
        split_pair(spec).ok_or_else(|| format!("expected NAME:FILE, got `{spec}`"))?;
    Ok(NamedTable {
        name: name.to_string(),
        path: PathBuf::from(path),
    })
}

impl SourceArgs {
    pub fn table_options(&self) -> TableLoadOptions {
        TableLoadOptions {
            value_separator: self.value_separator.clone(),
            duplicates: self.duplicates,
            ..Default::default()
        }
    }

    /// Operations to run, applying the id2name default.
    pub fn operations(&self) -> Result<Vec<IndexOp>> {
        if self.load.is_empty() {
            if !self.operation.is_empty() {
                bail!("--operation requires at least one --load ontology");
            }
            return Ok(Vec::new());
        }
        if self.operation.is_empty() {
            tracing::warn!("no --operation supplied, assuming id2name");
            return Ok(vec![IndexOp::Id2Name]);
        }
        Ok(self.operation.clone())
    }
}

pub fn load_tables(expander: &mut Expander, args: &SourceArgs) -> Result<()> {
    let options = args.table_options();
    if let Some(path) = &args.table {
        expander
            .load_table(path, None, &options)
            .with_context(|| format!("loading lookup table {}", path.display()))?;
    }
    for named in &args.named_table {
        expander
            .load_table(&named.path, Some(&named.name), &options)
            .with_context(|| {
                format!("loading lookup table {} from {}", named.name, named.path.display())
            })?;
    }
    Ok(())
}

pub fn load_ontology(args: &SourceArgs) -> Result<Option<Obograph>> {
    if args.load.is_empty() {
        return Ok(None);
    }
    let graph = load_from_files(&args.load).context("loading ontology")?;
    Ok(Some(graph))
}

pub fn build_indexer<'g>(
    graph: &'g Obograph,
    args: &SourceArgs,
) -> Result<OntolIndexer<'g, Obograph>> {
    let mut indexer = OntolIndexer::new(graph).with_relations(args.relation.clone());
    for op in args.operations()? {
        indexer.run(op);
    }
    Ok(indexer)
}

/// Merge generated pairs into the default table.
pub fn load_generated(
    expander: &mut Expander,
    indexer: &OntolIndexer<'_, Obograph>,
    args: &SourceArgs,
) -> Result<()> {
    let pairs = indexer
        .pairs()
        .iter()
        .map(|(source, targets)| (source.as_str(), targets.as_str()));
    expander
        .load_pairs(pairs, None, &args.table_options())
        .context("loading ontology index into the default table")
}
