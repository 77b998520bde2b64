use super::load_taxonomy;
use crate::cli::output::{create_standard_table, header_cell, number_cell, section_header, success};
use crate::cli::GlobalArgs;
use crate::logging::init_logging;
use brownaming_bio::taxonomy::ncbi::{build_tables, write_tables, NAMES_DUMP, NODES_DUMP};
use brownaming_core::{BrownamingError, TaxonId};
use clap::{Args, Subcommand};
use comfy_table::Cell;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct TaxonomyArgs {
    #[command(subcommand)]
    pub command: TaxonomyCommand,
}

#[derive(Subcommand, Debug)]
pub enum TaxonomyCommand {
    /// Build the lookup tables from NCBI nodes.dmp and names.dmp
    Build {
        /// Directory holding nodes.dmp and names.dmp (default: <local_db>/taxonomy)
        #[arg(long, value_name = "DIR")]
        dump_dir: Option<PathBuf>,

        /// Where to write the tables (default: <local_db>/taxonomy)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
    },

    /// Print the ancestors the walk would climb from a taxon
    Lineage {
        #[arg(value_name = "TAXID")]
        taxon: TaxonId,
    },
}

pub fn run(args: TaxonomyArgs, global: &GlobalArgs) -> anyhow::Result<()> {
    let _guard = init_logging(global.verbose, None)?;
    let config = global.load_config()?;

    match args.command {
        TaxonomyCommand::Build { dump_dir, output } => {
            let default_dir = || -> anyhow::Result<PathBuf> {
                Ok(global.local_db(&config)?.join("taxonomy"))
            };
            let dump_dir = match dump_dir {
                Some(dir) => dir,
                None => default_dir()?,
            };
            let output = match output {
                Some(dir) => dir,
                None => default_dir()?,
            };

            let tables = build_tables(dump_dir.join(NODES_DUMP), dump_dir.join(NAMES_DUMP))?;
            write_tables(&tables, &output)?;
            success(&format!(
                "Wrote lookup tables for {} taxa to {}",
                tables.rank.len(),
                output.display()
            ));
        }
        TaxonomyCommand::Lineage { taxon } => {
            let taxonomy = load_taxonomy(&global.local_db(&config)?)?;
            if !taxonomy.contains(taxon) {
                return Err(BrownamingError::NotFound(format!("Taxon {}", taxon)).into());
            }

            let mut table = create_standard_table();
            table.set_header(vec![
                header_cell("Taxon"),
                header_cell("Name"),
                header_cell("Rank"),
                header_cell("Children"),
            ]);
            for ancestor in taxonomy.lineage(taxon) {
                table.add_row(vec![
                    number_cell(ancestor.to_string()),
                    Cell::new(taxonomy.name(ancestor)),
                    Cell::new(taxonomy.rank(ancestor)),
                    number_cell(taxonomy.children(ancestor).len().to_string()),
                ]);
            }
            section_header(&format!("Lineage of {}", taxon));
            println!("{}", table);
        }
    }
    Ok(())
}
