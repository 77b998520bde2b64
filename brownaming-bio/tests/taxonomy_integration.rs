use brownaming_bio::TaxonomyIndex;
use brownaming_core::{BrownamingError, TaxonId};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_tables(dir: &Path) {
    fs::write(
        dir.join("parent.json"),
        r#"{"1": 1, "131567": 1, "2759": 131567, "40674": 2759, "9606": 40674, "10090": 40674}"#,
    )
    .unwrap();
    fs::write(
        dir.join("rank.json"),
        r#"{"1": "no rank", "131567": "cellular root", "2759": "domain", "40674": "class", "9606": "species"}"#,
    )
    .unwrap();
    fs::write(
        dir.join("children.json"),
        r#"{"1": [1, 131567], "131567": [2759], "2759": [40674], "40674": [9606, 10090]}"#,
    )
    .unwrap();
    fs::write(
        dir.join("taxid2scientific_name.json"),
        r#"{"1": "root", "131567": "cellular organisms", "2759": "Eukaryota", "40674": "Mammalia", "9606": "Homo sapiens", "10090": "Mus musculus"}"#,
    )
    .unwrap();
}

#[test]
fn test_load_tables_with_root_self_loop() {
    let dir = TempDir::new().unwrap();
    write_tables(dir.path());

    let index = TaxonomyIndex::load(dir.path()).unwrap();

    assert_eq!(index.ancestor(TaxonId(9606)), Some(TaxonId(40674)));
    // 1 -> 1 is tolerated and treated as "no parent"
    assert_eq!(index.ancestor(TaxonId(1)), None);
    assert_eq!(index.rank(TaxonId(10090)), "unknown");
    assert_eq!(index.name(TaxonId(40674)), "Mammalia");

    let mut mammals: Vec<TaxonId> = index.children(TaxonId(40674)).to_vec();
    mammals.sort();
    assert_eq!(mammals, vec![TaxonId(9606), TaxonId(10090)]);

    assert_eq!(
        index.descendants(TaxonId(40674)),
        HashSet::from([TaxonId(40674), TaxonId(9606), TaxonId(10090)])
    );
    assert_eq!(index.descendants(TaxonId(1)).len(), 6);
}

#[test]
fn test_missing_table_is_taxonomy_error() {
    let dir = TempDir::new().unwrap();
    write_tables(dir.path());
    fs::remove_file(dir.path().join("children.json")).unwrap();

    match TaxonomyIndex::load(dir.path()).unwrap_err() {
        BrownamingError::Taxonomy(msg) => assert!(msg.contains("children.json")),
        other => panic!("Expected Taxonomy error, got {:?}", other),
    }
}

#[test]
fn test_malformed_table_is_taxonomy_error() {
    let dir = TempDir::new().unwrap();
    write_tables(dir.path());
    fs::write(dir.path().join("rank.json"), "{\"9606\": ").unwrap();

    assert!(matches!(
        TaxonomyIndex::load(dir.path()),
        Err(BrownamingError::Taxonomy(_))
    ));

    fs::write(dir.path().join("rank.json"), r#"{"human": "species"}"#).unwrap();
    assert!(matches!(
        TaxonomyIndex::load(dir.path()),
        Err(BrownamingError::Taxonomy(_))
    ));
}
