//! Batch run orchestration.
//!
//! Tasks are rendered by up to `concurrency` workers (one by default, which
//! keeps rendering order identical to enumeration order). Workers only render
//! and save; a single consumer appends records in completion order, so a
//! record's `id` reflects completion, not submission.

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use artgrid_core::batch_dir::BatchDirs;
use artgrid_core::batch_name::BatchName;
use artgrid_core::combinations::{enumerate_tasks, GenerationTask, InputList};
use artgrid_core::error::CoreError;
use artgrid_core::naming::image_filename;
use artgrid_core::prompt::GenerationSettings;
use artgrid_core::types::DbId;
use artgrid_db::models::image_record::CreateImageRecord;
use artgrid_db::repositories::ImageRecordRepo;
use futures::stream::{self, StreamExt};
use serde::Serialize;

use crate::error::{GenerationStep, PipelineError};
use crate::generator::ImageGenerator;
use crate::image_store::save_as_webp;

/// What to do when one task fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop the run with an error. Already-saved images keep their records.
    #[default]
    Abort,
    /// Record the failure in the report and continue with the next task.
    Skip,
}

impl FromStr for FailurePolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" => Ok(Self::Abort),
            "skip" => Ok(Self::Skip),
            other => Err(CoreError::Configuration(format!(
                "Unknown failure policy '{other}'. Must be one of: abort, skip"
            ))),
        }
    }
}

/// Knobs for one run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub settings: GenerationSettings,
    pub failure_policy: FailurePolicy,
    /// Maximum renders in flight. Clamped to at least 1.
    pub concurrency: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            settings: GenerationSettings::default(),
            failure_policy: FailurePolicy::Abort,
            concurrency: 1,
        }
    }
}

/// A task that produced an image and a record.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedCell {
    pub record_id: DbId,
    pub task_index: usize,
    pub image_path: String,
}

/// A task that failed under [`FailurePolicy::Skip`].
#[derive(Debug, Clone, Serialize)]
pub struct SkippedTask {
    pub task_index: usize,
    pub style: String,
    pub prompt: String,
    pub step: GenerationStep,
    pub reason: String,
}

/// Summary of a finished run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub batch: BatchName,
    pub batch_dir: PathBuf,
    pub total: usize,
    pub generated: Vec<GeneratedCell>,
    pub skipped: Vec<SkippedTask>,
}

/// Outcome of one worker.
enum TaskOutcome {
    Saved { task: GenerationTask, image_path: String },
    Failed { task: GenerationTask, step: GenerationStep, reason: String },
    NotStarted,
}

/// Drives one generation run against an [`ImageGenerator`].
pub struct BatchRunner {
    generator: Arc<dyn ImageGenerator>,
    options: RunOptions,
}

impl BatchRunner {
    pub fn new(generator: Arc<dyn ImageGenerator>, options: RunOptions) -> Self {
        Self { generator, options }
    }

    /// Run every combination of `styles` × `prompts` into a new batch under `dirs`.
    ///
    /// Inputs are validated before the batch directory is created or any
    /// render is attempted.
    pub async fn run(
        &self,
        dirs: &BatchDirs,
        styles: &InputList,
        prompts: &InputList,
    ) -> Result<BatchReport, PipelineError> {
        let tasks = enumerate_tasks(styles, prompts, &self.options.settings.quality_prefix)?;
        let (batch, batch_dir) = dirs.create_batch().await?;
        self.run_tasks(batch, batch_dir, tasks).await
    }

    /// Run pre-enumerated tasks into an existing batch directory.
    pub async fn run_tasks(
        &self,
        batch: BatchName,
        batch_dir: PathBuf,
        tasks: Vec<GenerationTask>,
    ) -> Result<BatchReport, PipelineError> {
        let total = tasks.len();
        if total == 0 {
            return Err(CoreError::Input("No combinations to generate".into()).into());
        }

        let pool = artgrid_db::open_record_store(&batch_dir).await?;
        tracing::info!(
            batch = %batch,
            dir = %batch_dir.display(),
            total,
            concurrency = self.options.concurrency.max(1),
            policy = ?self.options.failure_policy,
            "Starting generation run"
        );

        let stop = Arc::new(AtomicBool::new(false));
        let mut outcomes = stream::iter(tasks)
            .map(|task| self.render_task(task, &batch_dir, total, Arc::clone(&stop)))
            .buffer_unordered(self.options.concurrency.max(1));

        let mut report = BatchReport {
            batch,
            batch_dir: batch_dir.clone(),
            total,
            generated: Vec::new(),
            skipped: Vec::new(),
        };
        let mut abort: Option<PipelineError> = None;

        while let Some(outcome) = outcomes.next().await {
            match outcome {
                TaskOutcome::Saved { task, image_path } => {
                    let record_id =
                        match ImageRecordRepo::create(&pool, &record_for(&task, &image_path)).await
                        {
                            Ok(id) => id,
                            Err(e) => {
                                tracing::error!(index = task.index, error = %e, "Failed to append record");
                                // In-flight renders still finish; nothing new starts.
                                stop.store(true, Ordering::SeqCst);
                                abort.get_or_insert(PipelineError::Store(e));
                                continue;
                            }
                        };
                    report.generated.push(GeneratedCell {
                        record_id,
                        task_index: task.index,
                        image_path,
                    });
                }
                TaskOutcome::Failed { task, step, reason } => {
                    tracing::error!(
                        index = task.index,
                        style = %task.style_text,
                        prompt = %task.prompt_text,
                        %step,
                        error = %reason,
                        "Task failed"
                    );
                    match self.options.failure_policy {
                        FailurePolicy::Abort => {
                            stop.store(true, Ordering::SeqCst);
                            abort.get_or_insert(PipelineError::Generation {
                                index: task.index,
                                style: task.style_text,
                                prompt: task.prompt_text,
                                step,
                                reason,
                            });
                        }
                        FailurePolicy::Skip => report.skipped.push(SkippedTask {
                            task_index: task.index,
                            style: task.style_text,
                            prompt: task.prompt_text,
                            step,
                            reason,
                        }),
                    }
                }
                TaskOutcome::NotStarted => {}
            }
        }

        pool.close().await;

        if let Some(err) = abort {
            tracing::error!(
                batch = %report.batch,
                generated = report.generated.len(),
                total,
                "Generation run aborted"
            );
            return Err(err);
        }

        tracing::info!(
            batch = %report.batch,
            generated = report.generated.len(),
            skipped = report.skipped.len(),
            total,
            "Generation run complete"
        );
        Ok(report)
    }

    /// Render and save one task. Never touches the record store.
    async fn render_task(
        &self,
        task: GenerationTask,
        batch_dir: &std::path::Path,
        total: usize,
        stop: Arc<AtomicBool>,
    ) -> TaskOutcome {
        if stop.load(Ordering::SeqCst) {
            return TaskOutcome::NotStarted;
        }

        tracing::info!(
            task = task.index + 1,
            total,
            style = %task.style_text,
            prompt = %task.prompt_text,
            "Generating image"
        );

        let rendered = match self
            .generator
            .generate(&task.composed_prompt, None, &self.options.settings)
            .await
        {
            Ok(rendered) => rendered,
            Err(e) => {
                return TaskOutcome::Failed {
                    task,
                    step: GenerationStep::Render,
                    reason: e.to_string(),
                }
            }
        };

        let file_name = image_filename(chrono::Local::now().time(), task.index);
        match save_as_webp(batch_dir, &file_name, rendered.bytes).await {
            Ok(_) => {
                tracing::debug!(index = task.index, seed = rendered.seed, file = %file_name, "Image saved");
                TaskOutcome::Saved {
                    task,
                    image_path: file_name,
                }
            }
            Err(e) => TaskOutcome::Failed {
                task,
                step: GenerationStep::Save,
                reason: e.to_string(),
            },
        }
    }
}

fn record_for(task: &GenerationTask, image_path: &str) -> CreateImageRecord {
    CreateImageRecord {
        image_path: image_path.to_string(),
        artist_file: task.style_source_id.clone(),
        artist_prompt: task.style_text.clone(),
        prompt_file: task.prompt_source_id.clone(),
        prompt_text: task.prompt_text.clone(),
        combined_prompt: task.composed_prompt.clone(),
    }
}
