use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::config::Config;
use crate::error::AuditError;
use crate::models::{Ecosystem, ValidationResult};
use crate::registry;
use crate::scanner;

/// Discover every dependency under `root` and classify each against its
/// registry.
///
/// Fails only when `root` cannot be walked or the HTTP client cannot be
/// built; every per-file and per-package problem ends up in the results.
pub async fn run_audit(
    root: &Path,
    config: &Config,
    show_progress: bool,
) -> Result<Vec<ValidationResult>, AuditError> {
    // The walk is synchronous and runs on the blocking pool.
    let (walk_root, scan_config) = (root.to_path_buf(), config.scan.clone());
    let scan = tokio::task::spawn_blocking(move || {
        scanner::scan_dependencies(&walk_root, &scan_config)
    })
    .await??;
    if scan.is_empty() {
        return Ok(Vec::new());
    }
    for ecosystem in Ecosystem::ALL {
        if let Some(deps) = scan.get(ecosystem) {
            info!("{}: {} unique dependencies", ecosystem, deps.len());
        }
    }
    let records = scan.into_records();

    let client = registry::build_client(&config.network)?;

    let pb = show_progress.then(|| progress_bar(records.len() as u64));
    let results = registry::validate_all(&client, config, &records, pb.as_ref()).await;
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    Ok(results)
}

fn progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb.set_message("checking registries");
    pb
}
