//! NCBI taxdump (`nodes.dmp`, `names.dmp`) to lookup-table conversion

use super::{TaxonomyTables, CHILDREN_TABLE, NAME_TABLE, PARENT_TABLE, RANK_TABLE};
use brownaming_core::{BrownamingError, BrownamingResult};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

pub const NODES_DUMP: &str = "nodes.dmp";
pub const NAMES_DUMP: &str = "names.dmp";

fn open_dump(path: &Path) -> BrownamingResult<BufReader<File>> {
    File::open(path).map(BufReader::new).map_err(|e| {
        BrownamingError::Taxonomy(format!("{} could not be opened: {}", path.display(), e))
    })
}

fn split_fields(line: &str) -> Vec<&str> {
    line.trim_end_matches("\t|")
        .split("\t|\t")
        .map(str::trim)
        .collect()
}

/// Parse `nodes.dmp` into taxon -> (parent, rank)
pub fn load_nodes<P: AsRef<Path>>(path: P) -> BrownamingResult<BTreeMap<u32, (u32, String)>> {
    let reader = open_dump(path.as_ref())?;
    let mut nodes = BTreeMap::new();

    for line in reader.lines() {
        let line = line?;
        let parts = split_fields(&line);

        if parts.len() >= 3 {
            if let (Ok(taxon_id), Ok(parent_id)) = (parts[0].parse::<u32>(), parts[1].parse::<u32>()) {
                nodes.insert(taxon_id, (parent_id, parts[2].to_string()));
            }
        }
    }

    Ok(nodes)
}

/// Parse the scientific names out of `names.dmp`
pub fn load_names<P: AsRef<Path>>(path: P) -> BrownamingResult<BTreeMap<u32, String>> {
    let reader = open_dump(path.as_ref())?;
    let mut names = BTreeMap::new();

    for line in reader.lines() {
        let line = line?;
        let parts = split_fields(&line);

        if parts.len() >= 4 && parts[3] == "scientific name" {
            if let Ok(taxon_id) = parts[0].parse::<u32>() {
                names.insert(taxon_id, parts[1].to_string());
            }
        }
    }

    Ok(names)
}

/// Build the lookup tables. The root's self-parent is dropped.
pub fn build_tables<P: AsRef<Path>>(nodes_path: P, names_path: P) -> BrownamingResult<TaxonomyTables> {
    let nodes = load_nodes(nodes_path)?;
    let names = load_names(names_path)?;

    let mut tables = TaxonomyTables {
        names,
        ..Default::default()
    };

    for (taxon_id, (parent_id, rank)) in nodes {
        tables.rank.insert(taxon_id, rank);
        if parent_id == taxon_id {
            continue;
        }
        tables.parent.insert(taxon_id, parent_id);
        tables.children.entry(parent_id).or_default().push(taxon_id);
    }

    tracing::info!(
        taxa = tables.rank.len(),
        names = tables.names.len(),
        "Built taxonomy lookup tables"
    );
    Ok(tables)
}

fn write_json<T: Serialize>(dir: &Path, file: &str, table: &T) -> BrownamingResult<()> {
    let path = dir.join(file);
    let mut writer = BufWriter::new(File::create(&path)?);
    serde_json::to_writer(&mut writer, table)?;
    writer.flush()?;
    tracing::debug!(path = %path.display(), "Wrote taxonomy table");
    Ok(())
}

/// Write the four JSON tables (keys are decimal strings) into `dir`
pub fn write_tables<P: AsRef<Path>>(tables: &TaxonomyTables, dir: P) -> BrownamingResult<()> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    write_json(dir, PARENT_TABLE, &tables.parent)?;
    write_json(dir, RANK_TABLE, &tables.rank)?;
    write_json(dir, CHILDREN_TABLE, &tables.children)?;
    write_json(dir, NAME_TABLE, &tables.names)?;
    Ok(())
}
