use clap::Parser;
use colored::*;
use std::process;

mod cli;
mod logging;
mod report;

use crate::cli::{Cli, Commands};
use brownaming_core::BrownamingError;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(exit_code(&e));
    }
}

fn exit_code(error: &anyhow::Error) -> i32 {
    match error.downcast_ref::<BrownamingError>() {
        Some(BrownamingError::Configuration(_)) | Some(BrownamingError::Taxonomy(_)) => 2,
        Some(BrownamingError::Io(_)) => 3,
        Some(BrownamingError::Parse(_)) | Some(BrownamingError::Alignment(_)) => 4,
        Some(BrownamingError::ToolNotFound(_)) => 5,
        Some(BrownamingError::Checkpoint(_)) => 6,
        _ => 1,
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Run(args) => crate::cli::commands::run::run(args, &cli.global),
        Commands::Resume(args) => crate::cli::commands::resume::run(args, &cli.global),
        Commands::Estimate(args) => crate::cli::commands::estimate::run(args, &cli.global),
        Commands::Taxonomy(args) => crate::cli::commands::taxonomy::run(args, &cli.global),
        Commands::Model(args) => crate::cli::commands::model::run(args, &cli.global),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let code = |e: BrownamingError| exit_code(&anyhow::Error::from(e));
        assert_eq!(code(BrownamingError::Taxonomy("x".into())), 2);
        assert_eq!(code(BrownamingError::Configuration("x".into())), 2);
        assert_eq!(code(BrownamingError::Parse("x".into())), 4);
        assert_eq!(code(BrownamingError::Alignment("x".into())), 4);
        assert_eq!(code(BrownamingError::ToolNotFound("diamond".into())), 5);
        assert_eq!(code(BrownamingError::Checkpoint("x".into())), 6);
        assert_eq!(code(BrownamingError::Other("x".into())), 1);
        assert_eq!(exit_code(&anyhow::anyhow!("plain")), 1);

        // Context does not hide the typed error
        let wrapped = anyhow::Error::from(BrownamingError::Checkpoint("x".into()))
            .context("resuming run");
        assert_eq!(exit_code(&wrapped), 6);
    }
}
