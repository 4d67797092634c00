//! Integration tests for the complete term-expando pipeline
//!
//! These tests verify end-to-end functionality across crates:
//! - lookup table files → Expander → text / TSV output
//! - OBO Graphs JSON → OntolIndexer → Expander
//!
//! Run with: cargo test --test integration_tests

use std::path::PathBuf;

use expando_core::{
    ColumnMap, DuplicatePolicy, Expander, ExpandoError, TableLoadOptions, TableValue,
    TextOptions, TsvOptions,
};
use expando_ontol::{load_from_files, IndexOp, OntolIndexer};
use tempfile::tempdir;

fn datafile(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/data")
        .join(name)
}

fn tsv_output(expander: &Expander, file: &str, options: &TsvOptions) -> String {
    let mut out = Vec::new();
    expander
        .expand_tsv(datafile(file), &mut out, options)
        .expect("expand tsv");
    String::from_utf8(out).expect("utf8 output")
}

// ============================================================================
// Lookup tables from files
// ============================================================================

#[test]
fn test_table_values_split_into_lists() {
    let mut x = Expander::new();
    let options = TableLoadOptions {
        value_separator: Some("|".to_string()),
        ..Default::default()
    };
    x.load_table(datafile("basic.tsv"), Some("my"), &options)
        .unwrap();

    assert_eq!(
        x.expand_term("a", Some("my")).unwrap(),
        TableValue::List(vec!["a1".into(), "a2".into(), "a3".into()])
    );
    assert_eq!(
        x.expand_term("unknown", Some("my")).unwrap(),
        TableValue::Scalar("unknown".into())
    );
}

#[test]
fn test_table_values_stay_scalar_without_separator() {
    let mut x = Expander::new();
    x.load_table(datafile("basic.tsv"), Some("my"), &TableLoadOptions::default())
        .unwrap();

    assert_eq!(
        x.expand_term("a", Some("my")).unwrap(),
        TableValue::Scalar("a1|a2|a3".into())
    );
}

#[test]
fn test_expand_text_with_default_table() {
    let mut x = Expander::new();
    x.load_table(datafile("basic.tsv"), None, &TableLoadOptions::default())
        .unwrap();

    let txt = x
        .expand_text("foo a bar b boz c biz", None, &TextOptions::default())
        .unwrap();
    assert_eq!(txt, "foo a1|a2|a3 bar b1|b2|b3 boz c biz");
}

#[test]
fn test_expand_file_writes_one_line_per_line() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.txt");
    std::fs::write(&input, "a b c\nnothing here\n\nb\n").unwrap();

    let mut x = Expander::new();
    x.load_table(datafile("basic.tsv"), None, &TableLoadOptions::default())
        .unwrap();

    let options = TextOptions {
        in_place: false,
        ..Default::default()
    };
    let mut out = Vec::new();
    x.expand_file(&input, &mut out, None, &options).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "a a1|a2|a3 b b1|b2|b3 c\nnothing here\n\nb b1|b2|b3\n"
    );
}

#[test]
fn test_duplicate_rows_in_table_file() {
    let dir = tempdir().unwrap();
    let table = dir.path().join("dups.tsv");
    std::fs::write(&table, "k\tv1\nk\tv2\n").unwrap();

    let mut x = Expander::new();
    let err = x
        .load_table(&table, None, &TableLoadOptions::default())
        .unwrap_err();
    assert!(matches!(err, ExpandoError::DuplicateKey { ref key, .. } if key == "k"));

    let merge = TableLoadOptions {
        duplicates: DuplicatePolicy::Merge,
        ..Default::default()
    };
    x.load_table(&table, None, &merge).unwrap();
    assert_eq!(x.expand_term("k", None).unwrap(), TableValue::Scalar("v1|v2".into()));

    let overwrite = TableLoadOptions {
        duplicates: DuplicatePolicy::Overwrite,
        ..Default::default()
    };
    x.load_table(&table, None, &overwrite).unwrap();
    assert_eq!(x.expand_term("k", None).unwrap(), TableValue::Scalar("v2".into()));
}

#[test]
fn test_missing_table_file_is_io_error() {
    let mut x = Expander::new();
    let err = x
        .load_table(datafile("no-such-table.tsv"), None, &TableLoadOptions::default())
        .unwrap_err();
    assert!(matches!(err, ExpandoError::Io(_)));
}

// ============================================================================
// TSV expansion
// ============================================================================

#[test]
fn test_expand_tsv_with_column_map() {
    let mut x = Expander::new();
    x.load_table(datafile("basic.tsv"), Some("basic"), &TableLoadOptions::default())
        .unwrap();

    let options = TsvOptions {
        column_map: Some(ColumnMap::parse_specs(["c1:basic"]).unwrap()),
        in_place: true,
        ..Default::default()
    };
    assert_eq!(
        tsv_output(&x, "src.tsv", &options),
        "c1\tc1_basic\tc2\tc3\n\
         a\ta1|a2|a3\tx\tb\n\
         b\tb1|b2|b3\ta\tz\n\
         q\tq\tb\ta\n"
    );

    // in_place does not change the mapped layout
    let appended = TsvOptions {
        in_place: false,
        ..options
    };
    assert_eq!(
        tsv_output(&x, "src.tsv", &appended),
        tsv_output(&x, "src.tsv", &TsvOptions { in_place: true, ..appended.clone() })
    );
}

#[test]
fn test_expand_tsv_all_columns_in_place() {
    let mut x = Expander::new();
    x.load_table(datafile("basic.tsv"), None, &TableLoadOptions::default())
        .unwrap();

    let options = TsvOptions {
        in_place: true,
        ..Default::default()
    };
    assert_eq!(
        tsv_output(&x, "src.tsv", &options),
        "c1 ! c1_expanded\tc2 ! c2_expanded\tc3 ! c3_expanded\n\
         a ! a1|a2|a3\tx\tb ! b1|b2|b3\n\
         b ! b1|b2|b3\ta ! a1|a2|a3\tz\n\
         q\tb ! b1|b2|b3\ta ! a1|a2|a3\n"
    );
}

#[test]
fn test_expand_tsv_all_columns_appended() {
    let mut x = Expander::new();
    x.load_table(datafile("basic.tsv"), None, &TableLoadOptions::default())
        .unwrap();

    let options = TsvOptions {
        in_place: false,
        ..Default::default()
    };
    let output = tsv_output(&x, "src.tsv", &options);
    let mut lines = output.lines();
    assert_eq!(
        lines.next(),
        Some("c1\tc1_expanded\tc2\tc2_expanded\tc3\tc3_expanded")
    );
    assert_eq!(lines.next(), Some("a\ta1|a2|a3\tx\tx\tb\tb1|b2|b3"));
}

#[test]
fn test_expand_gaf_by_position() {
    let mut x = Expander::new();
    x.load_table(
        datafile("go-small-id2name.tsv"),
        Some("id2name"),
        &TableLoadOptions::default(),
    )
    .unwrap();

    let options = TsvOptions {
        column_map: Some(ColumnMap::parse_specs(["c5:id2name"]).unwrap()),
        auto_header: true,
        ..Default::default()
    };
    let output = tsv_output(&x, "pombase-small.gaf", &options);
    let rows: Vec<Vec<&str>> = output.lines().map(|l| l.split('\t').collect()).collect();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0][4..6], ["GO:0005634", "nucleus"]);
    assert_eq!(rows[1][4..6], ["GO:0005737", "cytoplasm"]);
    assert_eq!(rows[2][4..6], ["GO:0099999", "GO:0099999"]);
    assert_eq!(rows[0].len(), 8);
}

// ============================================================================
// Ontology → index → expansion
// ============================================================================

#[test]
fn test_name2id_index_expands_labels() {
    let graph = load_from_files(&[datafile("nucleus.json")]).unwrap();
    let mut indexer = OntolIndexer::new(&graph);
    indexer.run(IndexOp::Name2Id);

    let mut x = Expander::new();
    let pairs = indexer
        .pairs()
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()));
    x.load_pairs(pairs, Some("my"), &TableLoadOptions::default())
        .unwrap();
    x.set_default_table("my");

    assert_eq!(x.expand_term("cell", None).unwrap(), TableValue::Scalar("GO:0005623".into()));
    assert_eq!(x.expand_term("u", None).unwrap(), TableValue::Scalar("u".into()));

    let txt = "blah cell nucleus intracellular foo cell part intracellular organelle";
    let options = TextOptions {
        separator: " ".to_string(),
        in_place: true,
    };
    assert_eq!(
        x.expand_text(txt, None, &options).unwrap(),
        "blah GO:0005623 GO:0005634 GO:0005622 foo GO:0005623 part GO:0005622 GO:0043226"
    );
}

#[test]
fn test_closure_index_from_file() {
    let graph = load_from_files(&[datafile("nucleus.json")]).unwrap();

    let mut all = OntolIndexer::new(&graph);
    all.run(IndexOp::Closure);
    let nucleus = all
        .pairs()
        .iter()
        .find(|(id, _)| id == "GO:0005634")
        .map(|(_, ancestors)| ancestors.as_str());
    assert_eq!(
        nucleus,
        Some("GO:0043231|GO:0043229|GO:0043226|GO:0005622|GO:0005575|GO:0005623")
    );
    // one pair per class, the property node is skipped
    assert_eq!(all.pairs().len(), 7);

    let mut isa = OntolIndexer::new(&graph).with_relations(vec!["is_a".to_string()]);
    isa.run(IndexOp::Closure);
    let nucleus = isa
        .pairs()
        .iter()
        .find(|(id, _)| id == "GO:0005634")
        .map(|(_, ancestors)| ancestors.as_str());
    assert_eq!(nucleus, Some("GO:0043231|GO:0043229|GO:0043226|GO:0005575"));
}

#[test]
fn test_id2alias_index_as_list_table() {
    let graph = load_from_files(&[datafile("nucleus.json")]).unwrap();
    let mut indexer = OntolIndexer::new(&graph);
    indexer.run(IndexOp::Id2Alias);

    let mut x = Expander::new();
    let options = TableLoadOptions {
        value_separator: Some("|".to_string()),
        ..Default::default()
    };
    x.load_pairs(indexer.into_pairs(), None, &options).unwrap();

    assert_eq!(
        x.expand_term("GO:0005634", None).unwrap(),
        TableValue::List(vec![
            "cell nucleus".into(),
            "horsetail nucleus".into(),
            "nucleus".into()
        ])
    );
}

#[test]
fn test_saved_index_loads_back_as_table() {
    let graph = load_from_files(&[datafile("nucleus.json")]).unwrap();
    let mut indexer = OntolIndexer::new(&graph);
    indexer.run(IndexOp::Id2Name);

    let dir = tempdir().unwrap();
    let saved = dir.path().join("id2name.tsv");
    indexer
        .save(std::fs::File::create(&saved).unwrap())
        .unwrap();

    let mut x = Expander::new();
    x.load_table(&saved, None, &TableLoadOptions::default())
        .unwrap();
    assert_eq!(x.table(None).unwrap().len(), 7);
    assert_eq!(
        x.expand_text("GO:0005634 GO:0000000", None, &TextOptions::default())
            .unwrap(),
        "nucleus GO:0000000"
    );
}

#[test]
fn test_merged_pairs_keep_insertion_order() {
    let mut x = Expander::new();
    let merge = TableLoadOptions {
        duplicates: DuplicatePolicy::Merge,
        ..Default::default()
    };
    x.load_pairs([("cell", "GO:0005623")], None, &merge).unwrap();
    x.load_pairs([("cell", "CL:0000000")], None, &merge).unwrap();
    assert_eq!(
        x.expand_term("cell", None).unwrap(),
        TableValue::Scalar("GO:0005623|CL:0000000".into())
    );
}
