use artgrid_core::batch_dir::BatchDirs;
use artgrid_core::input_list::list_input_files;

use crate::config::WorkerConfig;

pub async fn sync(config: &WorkerConfig) -> anyhow::Result<()> {
    let source = BatchDirs::new(&config.generate_root);
    let target = BatchDirs::new(&config.static_root);
    let report = target.sync_from(&source).await?;

    if !report.source_found {
        println!("Generation root not found: {}", source.root().display());
        return Ok(());
    }
    for batch in &report.copied {
        println!("copied  {batch}");
    }
    println!(
        "{} copied, {} already present",
        report.copied.len(),
        report.skipped.len()
    );
    Ok(())
}

pub async fn list(config: &WorkerConfig, generated: bool) -> anyhow::Result<()> {
    let root = if generated {
        &config.generate_root
    } else {
        &config.static_root
    };
    for batch in BatchDirs::new(root).list_batches().await? {
        println!("{batch}  {}", batch.started_at());
    }
    Ok(())
}

pub fn inputs(config: &WorkerConfig) -> anyhow::Result<()> {
    for (label, dir) in [
        ("Artists", &config.artists_dir),
        ("Prompts", &config.prompts_dir),
    ] {
        println!("{label} ({}):", dir.display());
        for (i, path) in list_input_files(dir)?.iter().enumerate() {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy())
                .unwrap_or_default();
            println!("  {}. {name}", i + 1);
        }
    }
    Ok(())
}
