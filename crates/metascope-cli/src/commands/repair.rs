use anyhow::Result;
use clap::Subcommand;

use metascope_core::CollectionId;
use metascope_service::RepairOutcome;

use super::{print_applied, print_findings, print_plan};
use crate::backend::Backend;

#[derive(Subcommand, Debug)]
pub enum RepairCommand {
    /// Drop index params a DISKANN or HNSW index does not recognize
    IndexParams {
        /// Collection to repair (0 for all)
        #[arg(long, default_value_t = 0)]
        collection: i64,

        /// Actually write; dry run otherwise
        #[arg(long, default_value_t = false)]
        run: bool,
    },

    /// Fold embedded segment records of legacy channels into ID lists
    Vchannel {
        /// Collection to repair (0 for all)
        #[arg(long, default_value_t = 0)]
        collection: i64,

        /// Actually write; dry run otherwise
        #[arg(long, default_value_t = false)]
        run: bool,
    },
}

pub async fn run(backend: &Backend, command: RepairCommand) -> Result<()> {
    let console = backend.console();
    let outcome = match command {
        RepairCommand::IndexParams { collection, run } => {
            console
                .repair_index_params(CollectionId::new(collection), run)
                .await?
        }
        RepairCommand::Vchannel { collection, run } => {
            console
                .repair_vchannels(CollectionId::new(collection), run)
                .await?
        }
    };
    report(&outcome);
    backend.persist(&outcome.applied).await?;
    outcome.applied.into_result()?;
    Ok(())
}

fn report(outcome: &RepairOutcome) {
    print_findings(&outcome.findings);
    if outcome.skipped > 0 {
        println!("{} undecodable record(s) skipped", outcome.skipped);
    }
    print_plan(&outcome.plan);
    print_applied(&outcome.applied);
    if let Some(remaining) = outcome.remaining {
        println!("{remaining} finding(s) remain after repair");
    }
}
