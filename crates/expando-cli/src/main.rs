//! term-expando CLI
//!
//! Loads lookup tables (and optionally builds one from an ontology), then
//! expands terms in:
//! - delimited files, column by column (`tsv`)
//! - free text, token by token (`text`)
//!
//! `index` writes the ontology-derived table itself, for reuse with `--table`.
//! Logs go to stderr (`RUST_LOG`, default `info`); stdout carries only output.

use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use expando_core::{single_byte_separator, ColumnMap, Expander, TextOptions, TsvOptions};
use expando_ontol::{Obograph, OntolIndexer};
use tracing_subscriber::EnvFilter;

mod session;

use session::SourceArgs;

#[derive(Parser)]
#[command(name = "term-expando")]
#[command(
    author,
    version,
    about = "Expand terms in text and TSV files using lookup tables"
)]
struct Cli {
    #[command(flatten)]
    source: SourceArgs,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Expand terms in the columns of delimited files.
    ///
    /// Without a column map every column is expanded against the default table
    /// and its header renamed to `<name>_expanded`. With `-C COLUMN:TABLE`, only
    /// mapped columns are expanded and the expansion is added as a new column
    /// `<name>_<table>` next to the original.
    Tsv {
        /// Column to expand, as COLUMN:TABLE (repeatable).
        #[arg(short = 'C', long = "column_map", visible_alias = "column-map")]
        column_map: Vec<String>,
        /// Column separator.
        #[arg(short = 's', long, default_value = "\t")]
        separator: String,
        /// Unmapped columns: write `original ! expansion` into the cell instead of
        /// adding a column.
        #[arg(short = 'x', long, overrides_with = "no_in_place")]
        in_place: bool,
        /// Add expansion columns (the default).
        #[arg(long, overrides_with = "in_place")]
        no_in_place: bool,
        /// Input has no header row; columns are named c1, c2, ...
        #[arg(short = 'A', long)]
        auto_header: bool,
        files: Vec<PathBuf>,
    },

    /// Expand terms in text files, line by line.
    Text {
        /// Token separator.
        #[arg(short = 's', long, default_value = " ")]
        separator: String,
        /// Replace tokens rather than appending expansions after them.
        #[arg(short = 'x', long, overrides_with = "no_in_place")]
        in_place: bool,
        /// Append expansions after tokens (the default).
        #[arg(long, overrides_with = "in_place")]
        no_in_place: bool,
        files: Vec<PathBuf>,
    },

    /// Write the ontology-derived index as a two-column TSV.
    Index,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let graph = session::load_ontology(&cli.source)?;
    let indexer = match &graph {
        Some(graph) => Some(session::build_indexer(graph, &cli.source)?),
        None => {
            // Validates operations given without an ontology.
            cli.source.operations()?;
            None
        }
    };

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    match cli.command {
        Commands::Index => {
            let Some(indexer) = indexer else {
                bail!("index requires at least one --load ontology");
            };
            cmd_index(&indexer, &mut out)?;
        }
        Commands::Tsv {
            column_map,
            separator,
            in_place,
            auto_header,
            files,
            ..
        } => {
            let expander = build_expander(&cli.source, indexer.as_ref())?;
            cmd_tsv(
                &expander,
                &column_map,
                &separator,
                in_place,
                auto_header,
                &files,
                &mut out,
            )?;
        }
        Commands::Text {
            separator,
            in_place,
            files,
            ..
        } => {
            let expander = build_expander(&cli.source, indexer.as_ref())?;
            cmd_text(&expander, separator, in_place, &files, &mut out)?;
        }
    }

    out.flush()?;
    Ok(())
}

fn build_expander(
    source: &SourceArgs,
    indexer: Option<&OntolIndexer<'_, Obograph>>,
) -> Result<Expander> {
    let mut expander = Expander::new();
    session::load_tables(&mut expander, source)?;
    if let Some(indexer) = indexer {
        session::load_generated(&mut expander, indexer, source)?;
    }
    for table in expander.tables() {
        tracing::info!(table = %table.name(), size = table.len(), "lookup table ready");
    }
    Ok(expander)
}

fn cmd_tsv<W: Write>(
    expander: &Expander,
    column_map: &[String],
    separator: &str,
    in_place: bool,
    auto_header: bool,
    files: &[PathBuf],
    out: &mut W,
) -> Result<()> {
    let column_map = if column_map.is_empty() {
        None
    } else {
        Some(ColumnMap::parse_specs(column_map)?)
    };
    let options = TsvOptions {
        column_map,
        auto_header,
        in_place,
        separator: single_byte_separator(separator)?,
    };
    for file in files {
        expander
            .expand_tsv(file, &mut *out, &options)
            .with_context(|| format!("expanding {}", file.display()))?;
    }
    Ok(())
}

fn cmd_text<W: Write>(
    expander: &Expander,
    separator: String,
    in_place: bool,
    files: &[PathBuf],
    out: &mut W,
) -> Result<()> {
    let options = TextOptions {
        separator,
        in_place,
    };
    for file in files {
        expander
            .expand_file(file, &mut *out, None, &options)
            .with_context(|| format!("expanding {}", file.display()))?;
    }
    Ok(())
}

fn cmd_index<W: Write>(indexer: &OntolIndexer<'_, Obograph>, out: &mut W) -> Result<()> {
    indexer.save(out).context("writing index")?;
    Ok(())
}
