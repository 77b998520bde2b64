//! Read-only taxonomy lookups backed by the JSON tables under `<local_db>/taxonomy/`

pub mod ncbi;

use brownaming_core::{BrownamingError, BrownamingResult, TaxonId};
use serde::de::DeserializeOwned;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::Path;

pub const PARENT_TABLE: &str = "parent.json";
pub const RANK_TABLE: &str = "rank.json";
pub const CHILDREN_TABLE: &str = "children.json";
pub const NAME_TABLE: &str = "taxid2scientific_name.json";

const UNKNOWN: &str = "unknown";

/// Raw lookup tables, as produced by the NCBI dump loader and stored on disk
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaxonomyTables {
    pub parent: BTreeMap<u32, u32>,
    pub rank: BTreeMap<u32, String>,
    pub children: BTreeMap<u32, Vec<u32>>,
    pub names: BTreeMap<u32, String>,
}

/// Immutable taxonomy tree. Built once per process and passed by reference.
#[derive(Debug, Clone, Default)]
pub struct TaxonomyIndex {
    parent: HashMap<TaxonId, TaxonId>,
    children: HashMap<TaxonId, Vec<TaxonId>>,
    rank: HashMap<TaxonId, String>,
    names: HashMap<TaxonId, String>,
}

fn read_table<T: DeserializeOwned>(dir: &Path, file: &str) -> BrownamingResult<HashMap<TaxonId, T>> {
    let path = dir.join(file);
    let contents = fs::read_to_string(&path).map_err(|e| {
        BrownamingError::Taxonomy(format!(
            "'{}' could not be read ({}). Build it with `brownaming taxonomy build`",
            path.display(),
            e
        ))
    })?;
    let raw: HashMap<String, T> = serde_json::from_str(&contents).map_err(|e| {
        BrownamingError::Taxonomy(format!("'{}' is malformed: {}", path.display(), e))
    })?;

    raw.into_iter()
        .map(|(key, value)| {
            key.parse::<TaxonId>()
                .map(|taxon| (taxon, value))
                .map_err(|_| {
                    BrownamingError::Taxonomy(format!(
                        "'{}' has a non-numeric taxon key {:?}",
                        path.display(),
                        key
                    ))
                })
        })
        .collect()
}

impl TaxonomyIndex {
    /// Load the four lookup tables from a taxonomy directory
    pub fn load<P: AsRef<Path>>(dir: P) -> BrownamingResult<Self> {
        let dir = dir.as_ref();
        let parent: HashMap<TaxonId, u32> = read_table(dir, PARENT_TABLE)?;
        let rank: HashMap<TaxonId, String> = read_table(dir, RANK_TABLE)?;
        let children: HashMap<TaxonId, Vec<u32>> = read_table(dir, CHILDREN_TABLE)?;
        let names: HashMap<TaxonId, String> = read_table(dir, NAME_TABLE)?;

        let index = Self {
            parent: parent
                .into_iter()
                .filter(|(taxon, parent)| taxon.0 != *parent)
                .map(|(taxon, parent)| (taxon, TaxonId(parent)))
                .collect(),
            children: children
                .into_iter()
                .map(|(taxon, kids)| {
                    let kids = kids.into_iter().filter(|k| *k != taxon.0).map(TaxonId).collect();
                    (taxon, kids)
                })
                .collect(),
            rank,
            names,
        };

        tracing::debug!(
            dir = %dir.display(),
            taxa = index.parent.len(),
            "Loaded taxonomy tables"
        );
        Ok(index)
    }

    pub fn from_tables(tables: TaxonomyTables) -> Self {
        let mut children: HashMap<TaxonId, Vec<TaxonId>> = HashMap::new();
        for (taxon, kids) in tables.children {
            children.insert(
                TaxonId(taxon),
                kids.into_iter().filter(|k| *k != taxon).map(TaxonId).collect(),
            );
        }

        Self {
            parent: tables
                .parent
                .into_iter()
                .filter(|(taxon, parent)| taxon != parent)
                .map(|(taxon, parent)| (TaxonId(taxon), TaxonId(parent)))
                .collect(),
            children,
            rank: tables
                .rank
                .into_iter()
                .map(|(taxon, rank)| (TaxonId(taxon), rank))
                .collect(),
            names: tables
                .names
                .into_iter()
                .map(|(taxon, name)| (TaxonId(taxon), name))
                .collect(),
        }
    }

    /// Parent of `taxon`; `None` for the root or an unknown taxon
    pub fn ancestor(&self, taxon: TaxonId) -> Option<TaxonId> {
        self.parent.get(&taxon).copied()
    }

    pub fn children(&self, taxon: TaxonId) -> &[TaxonId] {
        self.children.get(&taxon).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn rank(&self, taxon: TaxonId) -> &str {
        self.rank.get(&taxon).map(String::as_str).unwrap_or(UNKNOWN)
    }

    pub fn name(&self, taxon: TaxonId) -> &str {
        self.names.get(&taxon).map(String::as_str).unwrap_or(UNKNOWN)
    }

    pub fn contains(&self, taxon: TaxonId) -> bool {
        self.parent.contains_key(&taxon) || self.children.contains_key(&taxon) || taxon.is_root()
    }

    /// `taxon` and every taxon below it
    pub fn descendants(&self, taxon: TaxonId) -> HashSet<TaxonId> {
        let mut seen = HashSet::from([taxon]);
        let mut stack = vec![taxon];

        while let Some(current) = stack.pop() {
            for &child in self.children(current) {
                if seen.insert(child) {
                    stack.push(child);
                }
            }
        }

        seen
    }

    /// Union of the descendants of every taxon in `roots`
    pub fn descendants_of_all(&self, roots: &[TaxonId]) -> HashSet<TaxonId> {
        roots
            .iter()
            .flat_map(|root| self.descendants(*root))
            .collect()
    }

    /// Path from `taxon` up to the root, `taxon` first
    pub fn lineage(&self, taxon: TaxonId) -> Vec<TaxonId> {
        let mut lineage = vec![taxon];
        let mut current = taxon;
        while let Some(parent) = self.ancestor(current) {
            if lineage.contains(&parent) {
                break;
            }
            lineage.push(parent);
            current = parent;
        }
        lineage
    }

    pub fn taxa_count(&self) -> usize {
        self.parent.len()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    /// 1 -> 131567 -> 2759 -> {33208, 4751}; 33208 -> 9606
    pub(crate) fn small_tables() -> TaxonomyTables {
        let mut tables = TaxonomyTables::default();
        for (taxon, parent, rank, name) in [
            (1, 1, "no rank", "root"),
            (131567, 1, "cellular root", "cellular organisms"),
            (2759, 131567, "domain", "Eukaryota"),
            (33208, 2759, "kingdom", "Metazoa"),
            (4751, 2759, "kingdom", "Fungi"),
            (9606, 33208, "species", "Homo sapiens"),
        ] {
            tables.parent.insert(taxon, parent);
            tables.rank.insert(taxon, rank.to_string());
            tables.names.insert(taxon, name.to_string());
            tables.children.entry(parent).or_default().push(taxon);
        }
        tables
    }

    #[test]
    fn test_lookups() {
        let index = TaxonomyIndex::from_tables(small_tables());

        assert_eq!(index.ancestor(TaxonId(9606)), Some(TaxonId(33208)));
        assert_eq!(index.ancestor(TaxonId(1)), None);
        assert_eq!(index.ancestor(TaxonId(424242)), None);
        assert_eq!(index.name(TaxonId(4751)), "Fungi");
        assert_eq!(index.rank(TaxonId(9606)), "species");
        assert_eq!(index.rank(TaxonId(424242)), "unknown");
        assert_eq!(index.name(TaxonId(424242)), "unknown");
        assert!(index.children(TaxonId(9606)).is_empty());
    }

    #[test]
    fn test_root_self_loop_is_dropped() {
        let index = TaxonomyIndex::from_tables(small_tables());
        assert_eq!(index.children(TaxonId(1)), &[TaxonId(131567)]);
        assert_eq!(
            index.lineage(TaxonId(9606)),
            vec![
                TaxonId(9606),
                TaxonId(33208),
                TaxonId(2759),
                TaxonId(131567),
                TaxonId(1)
            ]
        );
    }

    #[test]
    fn test_descendants_include_self() {
        let index = TaxonomyIndex::from_tables(small_tables());

        assert_eq!(index.descendants(TaxonId(9606)), HashSet::from([TaxonId(9606)]));
        assert_eq!(
            index.descendants(TaxonId(2759)),
            HashSet::from([TaxonId(2759), TaxonId(33208), TaxonId(4751), TaxonId(9606)])
        );
        assert_eq!(index.descendants(TaxonId(1)).len(), 6);
        assert_eq!(
            index.descendants_of_all(&[TaxonId(33208), TaxonId(4751)]),
            HashSet::from([TaxonId(33208), TaxonId(4751), TaxonId(9606)])
        );
    }

    #[test]
    fn test_descendants_terminates_on_self_loop_in_children() {
        // Tables loaded verbatim from an unfiltered dump keep 1 in children[1]
        let mut index = TaxonomyIndex::from_tables(small_tables());
        index.children.get_mut(&TaxonId(1)).unwrap().push(TaxonId(1));
        assert_eq!(index.descendants(TaxonId(1)).len(), 6);
    }

    #[test]
    fn test_deep_chain_does_not_recurse() {
        let mut tables = TaxonomyTables::default();
        for taxon in 2..100_000u32 {
            tables.parent.insert(taxon, taxon - 1);
            tables.children.insert(taxon - 1, vec![taxon]);
        }
        let index = TaxonomyIndex::from_tables(tables);
        assert_eq!(index.descendants(TaxonId(1)).len(), 100_000);
    }

    proptest! {
        #[test]
        fn prop_rank_is_stable(taxon in 0u32..200_000) {
            let index = TaxonomyIndex::from_tables(small_tables());
            let first = index.rank(TaxonId(taxon)).to_string();
            prop_assert_eq!(index.rank(TaxonId(taxon)), first.as_str());
        }

        #[test]
        fn prop_descendants_contain_root_of_random_tree(parents in proptest::collection::vec(0usize..1000, 1..200)) {
            // Node i + 1 hangs under some earlier node
            let mut tables = TaxonomyTables::default();
            for (i, p) in parents.iter().enumerate() {
                let child = (i + 2) as u32;
                let parent = (p % (i + 1) + 1) as u32;
                tables.parent.insert(child, parent);
                tables.children.entry(parent).or_default().push(child);
            }
            let index = TaxonomyIndex::from_tables(tables);
            let all = index.descendants(TaxonId(1));
            prop_assert!(all.contains(&TaxonId(1)));
            prop_assert_eq!(all.len(), parents.len() + 1);
        }
    }
}
