use crate::cli::output::{create_standard_table, header_cell, number_cell};
use brownaming_search::RunState;
use comfy_table::{Cell, Table};

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * part as f64 / total as f64
    }
}

/// One row per step: where the walk searched and how many proteins had a hit afterwards
pub fn step_table(state: &RunState) -> Table {
    let total = state.query_ids.len();
    let mut table = create_standard_table();
    table.set_header(vec![
        header_cell("Step"),
        header_cell("Taxon"),
        header_cell("Rank"),
        header_cell("DB size"),
        header_cell("Submitted"),
        header_cell("With hit"),
        header_cell("Elapsed (min)"),
    ]);

    for stats in &state.statistics {
        let taxon = if stats.aligner_ran {
            format!("{} ({})", stats.taxon_name, stats.taxon)
        } else {
            format!("{} ({}) - skipped", stats.taxon_name, stats.taxon)
        };
        table.add_row(vec![
            number_cell(stats.step.to_string()),
            Cell::new(taxon),
            Cell::new(&stats.rank),
            number_cell(stats.dbsize.to_string()),
            number_cell(stats.queries_submitted.to_string()),
            number_cell(format!(
                "{} ({:.0}%)",
                stats.queries_with_hit,
                percent(stats.queries_with_hit, total)
            )),
            number_cell(format!("{:.2}", stats.elapsed_minutes)),
        ]);
    }
    table
}
