use std::path::Path;

use anyhow::{Context, Result};
use chrono::SecondsFormat;

use metascope_core::timestamp;
use metascope_core::CollectionId;
use metascope_service::{inspect, plan_pk_download, BinlogIndexDecoder, IndexFileContent};

use super::print_findings;
use crate::backend::Backend;

pub fn parse_ts(values: &[u64]) -> Result<()> {
    for &ts in values {
        let (physical, logical) =
            timestamp::parse_ts(ts).with_context(|| format!("cannot decode timestamp {ts}"))?;
        println!(
            "{ts}  time={}  logical={logical}",
            physical.to_rfc3339_opts(SecondsFormat::Millis, true)
        );
    }
    Ok(())
}

pub async fn check(backend: &Backend, collection: i64) -> Result<()> {
    let findings = backend
        .console()
        .check(CollectionId::new(collection))
        .await?;
    print_findings(&findings);
    let repairable = findings.iter().filter(|f| f.is_repairable()).count();
    println!(
        "{} finding(s), {repairable} repairable with `metascope repair`",
        findings.len()
    );
    Ok(())
}

/// Prints where each primary-key binlog of the collection lives and where a
/// download would place it. Fetching from object storage is left to the operator.
pub async fn download_pk(backend: &Backend, collection: i64) -> Result<()> {
    let plan = plan_pk_download(backend.console().accessor(), CollectionId::new(collection))
        .await
        .with_context(|| format!("cannot resolve primary key binlogs of collection {collection}"))?;

    println!(
        "collection {}: primary key field {} ({}), {} file(s)",
        plan.collection_id,
        plan.pk_field,
        plan.pk_field_name,
        plan.files.len()
    );
    for file in &plan.files {
        println!("  segment {}  {} -> {}", file.segment_id, file.log_path, plan.target_dir(file));
    }
    Ok(())
}

async fn read_index_file(path: &Path) -> Result<IndexFileContent> {
    let raw = tokio::fs::read(path)
        .await
        .with_context(|| format!("cannot read {}", path.display()))?;
    inspect(&BinlogIndexDecoder, &raw).with_context(|| format!("cannot inspect index file {}", path.display()))
}

pub async fn inspect_index_file(path: &Path) -> Result<()> {
    match read_index_file(path).await? {
        IndexFileContent::IndexParams(params) => {
            println!("index params ({} entries)", params.len());
            for (key, value) in &params {
                println!("  {key} = {value}");
            }
        }
        IndexFileContent::SliceMeta(meta) => {
            println!(
                "slice meta: name={}  slices={}  total_len={}",
                meta.name, meta.slice_num, meta.total_length
            );
        }
        IndexFileContent::IndexData { key } => println!("index data file (key {key})"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn index_file_errors_name_the_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("indexParams");
        tokio::fs::write(&path, b"not a binlog").await.unwrap();

        let err = read_index_file(&path).await.unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("indexParams"), "{message}");
        assert!(message.contains("bad magic number"), "{message}");

        assert!(read_index_file(&dir.path().join("absent")).await.is_err());
    }
}
