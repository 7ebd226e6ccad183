use anyhow::Result;
use clap::Subcommand;
use serde_json::json;

use metascope_core::{CollectionId, CollectionState, DatabaseId};
use metascope_metadata::{CollectionFilter, SegmentFilter};

use super::print_findings;
use crate::backend::Backend;

#[derive(Subcommand, Debug)]
pub enum ShowCommand {
    /// List collections
    Collections {
        /// Only this collection (0 for all)
        #[arg(long, default_value_t = 0)]
        collection: i64,

        /// Only collections in this database
        #[arg(long)]
        database: Option<i64>,

        /// Only collections whose name contains this text
        #[arg(long)]
        name: Option<String>,

        /// Only collections in this state (e.g. created, dropping)
        #[arg(long)]
        state: Option<String>,

        /// Print JSON lines instead of text
        #[arg(long)]
        json: bool,
    },

    /// List segments grouped by collection
    Segments {
        /// Only segments of this collection (0 for all)
        #[arg(long, default_value_t = 0)]
        collection: i64,

        /// Only segments of this partition (0 for all)
        #[arg(long, default_value_t = 0)]
        partition: i64,

        /// Only this segment (0 for all)
        #[arg(long, default_value_t = 0)]
        segment: i64,

        /// Only segments in this state (e.g. Flushed, Importing)
        #[arg(long)]
        state: Option<String>,

        /// Only segments at this compaction level (e.g. L1)
        #[arg(long)]
        level: Option<String>,

        /// Only segments whose timestamp is below this hybrid timestamp
        #[arg(long, default_value_t = 0)]
        max_ts: u64,

        /// Print JSON lines instead of text
        #[arg(long)]
        json: bool,
    },

    /// List registered coordinator and node sessions
    Sessions {
        /// Print JSON lines instead of text
        #[arg(long)]
        json: bool,
    },

    /// List indexes built with an index type the current release no longer serves
    LegacyIndexes,
}

pub async fn run(backend: &Backend, command: ShowCommand) -> Result<()> {
    let console = backend.console();
    match command {
        ShowCommand::Collections {
            collection,
            database,
            name,
            state,
            json,
        } => {
            let filter = CollectionFilter {
                collection_id: (collection != 0).then(|| CollectionId::new(collection)),
                database_id: database.map(DatabaseId::new),
                name_contains: name.filter(|n| !n.is_empty()),
                state: state.as_deref().map(str::parse::<CollectionState>).transpose()?,
            };
            let listing = console.show_collections(&filter).await?;
            for stored in &listing.entities {
                let c = &stored.value;
                if json {
                    println!(
                        "{}",
                        json!({
                            "key": stored.key,
                            "version": stored.version.to_string(),
                            "collection_id": c.collection_id.get(),
                            "database_id": c.database_id.get(),
                            "name": c.name(),
                            "state": c.state.as_str(),
                            "shards": c.shards_num,
                            "fields": c.schema.fields.len(),
                        })
                    );
                } else {
                    println!(
                        "{}  {}  db={}  state={}  shards={}  fields={}  ({})",
                        c.collection_id,
                        c.name(),
                        c.database_id,
                        c.state,
                        c.shards_num,
                        c.schema.fields.len(),
                        stored.version,
                    );
                }
            }
            if !json {
                println!("{} collection(s)", listing.len());
            }
            report_skipped(listing.skipped());
        }
        ShowCommand::Segments {
            collection,
            partition,
            segment,
            state,
            level,
            max_ts,
            json,
        } => {
            let filter = SegmentFilter::from_args(
                collection,
                partition,
                segment,
                state.as_deref(),
                level.as_deref(),
                max_ts,
            )?;
            let listing = console.show_segments(&filter).await?;
            for (collection_id, segments) in &listing.groups {
                if !json {
                    println!("collection {collection_id}: {} segment(s)", segments.len());
                }
                for stored in segments {
                    let s = &stored.value;
                    if json {
                        println!(
                            "{}",
                            json!({
                                "key": stored.key,
                                "version": stored.version.to_string(),
                                "collection_id": s.collection_id.get(),
                                "partition_id": s.partition_id.get(),
                                "segment_id": s.segment_id.get(),
                                "state": s.state.to_string(),
                                "level": s.level.to_string(),
                                "rows": s.num_of_rows,
                                "ts": s.effective_ts(),
                                "channel": s.insert_channel,
                                "binlogs": s.binlog_count(),
                            })
                        );
                    } else {
                        println!(
                            "  {}  partition={}  {}  {}  rows={}  ts={}  binlogs={}  channel={}",
                            s.segment_id,
                            s.partition_id,
                            s.state,
                            s.level,
                            s.num_of_rows,
                            s.effective_ts(),
                            s.binlog_count(),
                            s.insert_channel,
                        );
                    }
                }
            }
            if !json {
                println!("{} segment(s) total", listing.total());
            }
            report_skipped(listing.skipped);
        }
        ShowCommand::Sessions { json } => {
            let listing = console.show_sessions().await?;
            for stored in &listing.entities {
                if json {
                    println!("{}", serde_json::to_string(&stored.value)?);
                } else {
                    let s = &stored.value;
                    println!(
                        "{}  id={}  {}{}",
                        s.server_name,
                        s.server_id,
                        s.address,
                        if s.exclusive { "  exclusive" } else { "" },
                    );
                }
            }
            report_skipped(listing.skipped());
        }
        ShowCommand::LegacyIndexes => {
            print_findings(&console.show_legacy_indexes().await?);
        }
    }
    Ok(())
}

fn report_skipped(skipped: usize) {
    if skipped > 0 {
        eprintln!("{skipped} undecodable record(s) skipped");
    }
}
