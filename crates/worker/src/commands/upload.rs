use anyhow::{bail, Context};
use artgrid_cloud::{upload_batch, R2Config, S3ObjectStore, UploadError, UploadMode};
use artgrid_core::batch_dir::BatchDirs;
use artgrid_core::batch_name::BatchName;
use clap::Args;

use crate::config::WorkerConfig;

/// Images per batch uploaded in test mode unless `--limit` says otherwise.
const DEFAULT_TEST_LIMIT: usize = 3;

#[derive(Args, Debug)]
pub struct UploadArgs {
    /// Batch to upload (e.g. 20250102-014551). All batches when omitted.
    #[arg(short, long)]
    pub batch: Option<String>,
    /// Upload only the first `--limit` images into the test remap table.
    #[arg(long)]
    pub test: bool,
    #[arg(long, default_value_t = DEFAULT_TEST_LIMIT, requires = "test")]
    pub limit: usize,
}

pub async fn handle(config: &WorkerConfig, args: UploadArgs) -> anyhow::Result<()> {
    // Credentials are checked before any batch is touched.
    let r2 = R2Config::from_env().context("Object storage is not configured")?;
    let concurrency = r2.upload_concurrency;
    let store = S3ObjectStore::new(r2);

    let dirs = BatchDirs::new(&config.static_root);
    if !dirs.root().is_dir() {
        bail!("Batch root not found: {}", dirs.root().display());
    }

    let mode = if args.test {
        UploadMode::Test { limit: args.limit }
    } else {
        UploadMode::Full
    };

    let batches = match args.batch {
        Some(raw) => {
            let batch = BatchName::parse(&raw)?;
            if !dirs.batch_path(&batch).is_dir() {
                bail!("Batch does not exist: {}", dirs.batch_path(&batch).display());
            }
            vec![batch]
        }
        None => {
            let mut all = dirs.list_batches().await?;
            all.reverse();
            tracing::info!(count = all.len(), "No batch named, uploading every batch");
            all
        }
    };
    let single = batches.len() == 1;

    for batch in batches {
        let batch_dir = dirs.batch_path(&batch);
        match upload_batch(&store, &batch_dir, &batch, mode, concurrency).await {
            Ok(report) => {
                println!(
                    "{}: uploaded {}/{} ({} failed, {} missing on disk)",
                    batch,
                    report.uploaded.len(),
                    report.attempted,
                    report.failed.len(),
                    report.missing_files.len()
                );
                if let Some(path) = report.table_path {
                    println!("  remap table: {}", path.display());
                }
            }
            Err(UploadError::MissingRecordStore(dir)) if !single => {
                tracing::warn!(batch = %batch, dir = %dir, "No record store, skipping batch");
            }
            Err(e) => return Err(e).with_context(|| format!("Upload of batch {batch} failed")),
        }
    }
    Ok(())
}
