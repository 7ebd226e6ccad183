use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod backend;
mod commands;

use backend::Backend;
use commands::{remove, repair, show, tools};

#[derive(Parser, Debug)]
#[command(name = "metascope")]
#[command(about = "Inspect and repair vector database cluster metadata", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Configuration file (defaults to METASCOPE_CONFIG or ./config/metascope.*)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Metadata snapshot file backing the store
    #[arg(long, global = true, env = "METASCOPE_SNAPSHOT")]
    snapshot: Option<PathBuf>,

    /// Root path of the metadata keys (e.g. by-dev/meta)
    #[arg(long, global = true)]
    base_path: Option<String>,

    /// Newest schema generation the cluster may have written (2.0, 2.2)
    #[arg(long, global = true)]
    cluster_version: Option<String>,

    /// Reject writes to keys modified since they were read
    #[arg(long, global = true)]
    guard_revisions: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Remove metadata records
    #[command(subcommand)]
    Remove(remove::RemoveCommand),

    /// Detect and repair inconsistent metadata
    #[command(subcommand)]
    Repair(repair::RepairCommand),

    /// List metadata records
    #[command(subcommand)]
    Show(show::ShowCommand),

    /// Run every report-only detector
    Check {
        /// Collection to check (0 for all)
        #[arg(long, default_value_t = 0)]
        collection: i64,
    },

    /// Split hybrid timestamps into physical time and logical counter
    ParseTs {
        /// Timestamps to decode
        #[arg(required = true)]
        ts: Vec<u64>,
    },

    /// Resolve the primary-key binlog files of a collection
    DownloadPk {
        /// Collection to resolve
        #[arg(long)]
        collection: i64,
    },

    /// Show what an index file holds (index params, slice meta or index data)
    InspectIndexFile {
        /// Index file copied from object storage
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();

    match cli.command {
        Commands::ParseTs { ts } => tools::parse_ts(&ts),
        Commands::InspectIndexFile { path } => tools::inspect_index_file(&path).await,
        Commands::Remove(cmd) => remove::run(&Backend::open(&cli.global).await?, cmd).await,
        Commands::Repair(cmd) => repair::run(&Backend::open(&cli.global).await?, cmd).await,
        Commands::Show(cmd) => show::run(&Backend::open(&cli.global).await?, cmd).await,
        Commands::Check { collection } => {
            tools::check(&Backend::open(&cli.global).await?, collection).await
        }
        Commands::DownloadPk { collection } => {
            tools::download_pk(&Backend::open(&cli.global).await?, collection).await
        }
    }
}

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(env_filter).with_target(false).init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inspect_index_file_takes_a_path() {
        let cli = Cli::try_parse_from(["metascope", "inspect-index-file", "/tmp/SLICE_META"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::InspectIndexFile { path } if path == PathBuf::from("/tmp/SLICE_META")
        ));
    }
}
