use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use artgrid_core::batch_dir::BatchDirs;
use artgrid_core::input_list::{list_input_files, load_input_list};
use artgrid_pipeline::{BatchRunner, FailurePolicy, RunOptions};
use artgrid_sdwebui::api::Txt2ImgApi;
use clap::Args;

use crate::config::WorkerConfig;

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Artist list: a file name in the artists folder, its 1-based number
    /// from `inputs`, or a path.
    #[arg(short, long)]
    pub artists: String,
    /// Prompt list, selected the same way as `--artists`.
    #[arg(short, long)]
    pub prompts: String,
    /// Override `FAILURE_POLICY` (`abort` or `skip`).
    #[arg(long)]
    pub policy: Option<FailurePolicy>,
    /// Renders in flight at once.
    #[arg(short, long, default_value_t = 1)]
    pub concurrency: usize,
}

pub async fn handle(config: &WorkerConfig, args: GenerateArgs) -> anyhow::Result<()> {
    let artists_path = select_input(&config.artists_dir, &args.artists)?;
    let prompts_path = select_input(&config.prompts_dir, &args.prompts)?;
    let styles = load_input_list(&artists_path)
        .with_context(|| format!("Failed to load artists from {}", artists_path.display()))?;
    let prompts = load_input_list(&prompts_path)
        .with_context(|| format!("Failed to load prompts from {}", prompts_path.display()))?;

    tracing::info!(
        artists = styles.fragments.len(),
        prompts = prompts.fragments.len(),
        total = styles.fragments.len() * prompts.fragments.len(),
        server = %config.sd_api.base_url(),
        "Loaded input lists"
    );

    let api = Txt2ImgApi::new(&config.sd_api).context("Failed to build generation client")?;
    let runner = BatchRunner::new(
        Arc::new(api),
        RunOptions {
            failure_policy: args.policy.unwrap_or(config.failure_policy),
            concurrency: args.concurrency,
            ..RunOptions::default()
        },
    );

    let dirs = BatchDirs::new(&config.generate_root);
    let report = runner
        .run(&dirs, &styles, &prompts)
        .await
        .context("Generation run failed")?;

    println!(
        "Batch {} complete: {}/{} images in {}",
        report.batch,
        report.generated.len(),
        report.total,
        report.batch_dir.display()
    );
    for skipped in &report.skipped {
        println!(
            "  skipped #{} ({} × {}) at {}: {}",
            skipped.task_index, skipped.style, skipped.prompt, skipped.step, skipped.reason
        );
    }
    Ok(())
}

/// Resolve an input selector against the files listed in `dir`.
///
/// Accepts a 1-based index into the sorted listing, a file name inside
/// `dir`, or a path to an existing file.
pub fn select_input(dir: &Path, selector: &str) -> anyhow::Result<PathBuf> {
    let files = list_input_files(dir).unwrap_or_else(|e| {
        tracing::warn!(dir = %dir.display(), error = %e, "Cannot list input folder");
        Vec::new()
    });

    if let Ok(n) = selector.parse::<usize>() {
        return match n.checked_sub(1).and_then(|i| files.get(i)) {
            Some(path) => Ok(path.clone()),
            None => bail!(
                "Input #{n} does not exist in {} ({} files)",
                dir.display(),
                files.len()
            ),
        };
    }

    if let Some(path) = files
        .iter()
        .find(|p| p.file_name().is_some_and(|name| name == selector))
    {
        return Ok(path.clone());
    }

    let path = PathBuf::from(selector);
    if path.is_file() {
        return Ok(path);
    }
    bail!("No input list '{selector}' in {}", dir.display())
}
