use anyhow::{Context, Result};
use clap::Subcommand;

use metascope_core::CollectionId;

use super::{print_applied, print_findings, print_plan};
use crate::backend::Backend;

#[derive(Subcommand, Debug)]
pub enum RemoveCommand {
    /// Remove a collection with its partitions, segments, indexes and channels
    Collection {
        /// Collection to remove
        #[arg(long)]
        collection: i64,

        /// Actually remove; dry run otherwise
        #[arg(long, default_value_t = false)]
        run: bool,
    },

    /// Remove importing segments with zero rows older than a timestamp
    DirtyImportingSegment {
        /// Collection to scan (0 for all)
        #[arg(long, default_value_t = 0)]
        collection: i64,

        /// Only segments whose timestamp is below this hybrid timestamp
        #[arg(long, default_value_t = 0)]
        ts: u64,

        /// Actually remove; dry run otherwise
        #[arg(long, default_value_t = false)]
        run: bool,
    },
}

pub async fn run(backend: &Backend, command: RemoveCommand) -> Result<()> {
    match command {
        RemoveCommand::Collection { collection, run } => {
            let outcome = backend
                .console()
                .remove_collection(CollectionId::new(collection), run)
                .await
                .with_context(|| format!("cannot remove collection {collection}"))?;

            let dependents = &outcome.dependents;
            println!(
                "collection {} ({}): {} partition(s), {} segment(s), {} index(es), {} channel(s)",
                collection,
                dependents.collection.value.name(),
                dependents.partitions,
                dependents.segments,
                dependents.field_indexes,
                dependents.channels,
            );
            if dependents.undecodable > 0 {
                println!("{} undecodable record(s) removed by key", dependents.undecodable);
            }
            print_plan(dependents.plan());
            print_applied(&outcome.applied);
            backend.persist(&outcome.applied).await?;
            outcome.applied.into_result()?;
            Ok(())
        }
        RemoveCommand::DirtyImportingSegment {
            collection,
            ts,
            run,
        } => {
            let outcome = backend
                .console()
                .remove_dirty_importing_segments(CollectionId::new(collection), ts, run)
                .await?;
            print_findings(&outcome.findings);
            println!("found {} dirty importing segment(s)", outcome.findings.len());
            print_applied(&outcome.applied);
            backend.persist(&outcome.applied).await?;
            outcome.applied.into_result()?;
            Ok(())
        }
    }
}
