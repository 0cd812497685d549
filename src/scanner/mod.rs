//! Filesystem walk and filename dispatch.
//!
//! Each ecosystem gets its own full walk of the project tree. Excluded
//! directories are pruned (descent stops) unless vendored code is requested,
//! recognized file names are handed to the ecosystem's parser, and every
//! per-entry failure is logged and skipped. Only an unusable scan root is
//! fatal.

use std::fs;
use std::path::Path;

use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::analyzer::{analyzer_for, Analyzer, FileKind, ManifestFile};
use crate::config::ScanConfig;
use crate::error::AuditError;
use crate::models::Ecosystem;

pub mod aggregate;

pub use aggregate::{DependencyMap, ScanResult};

/// Never worth descending into, whatever the ecosystem.
const ALWAYS_PRUNED: [&str; 1] = [".git"];

/// Walk `root` once per ecosystem and aggregate everything found.
pub fn scan_dependencies(root: &Path, opts: &ScanConfig) -> Result<ScanResult, AuditError> {
    check_root(root)?;

    let mut result = ScanResult::default();
    for ecosystem in Ecosystem::ALL {
        let deps = scan_ecosystem(root, analyzer_for(ecosystem), opts);
        result.add(ecosystem, deps);
    }

    Ok(result)
}

fn check_root(root: &Path) -> Result<(), AuditError> {
    let to_error = |source| AuditError::ScanRoot {
        path: root.to_path_buf(),
        source,
    };

    let metadata = fs::metadata(root).map_err(to_error)?;
    if metadata.is_dir() {
        fs::read_dir(root).map_err(to_error)?;
    }
    Ok(())
}

/// Walk `root` for one ecosystem's manifests.
pub fn scan_ecosystem(root: &Path, analyzer: &dyn Analyzer, opts: &ScanConfig) -> DependencyMap {
    debug!("scanning {}", analyzer.ecosystem());
    let mut deps = DependencyMap::default();

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_pruned(entry, analyzer, opts));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                debug!("skipping unreadable entry: {}", err);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let Some(manifest) = entry.file_name().to_str().and_then(|n| analyzer.parser_for(n))
        else {
            continue;
        };
        if manifest.kind == FileKind::Lockfile && !opts.include_lockfiles {
            debug!("lockfile {} ignored", entry.path().display());
            continue;
        }

        match extract_file(entry.path(), manifest) {
            Ok(names) => {
                debug!("{}: {} entries", entry.path().display(), names.len());
                for name in names {
                    deps.record(name, entry.path());
                }
            }
            Err(err @ AuditError::Parse { .. }) => warn!("{}", err),
            Err(err) => debug!("{}", err),
        }
    }

    debug!("{}: {} dependencies", analyzer.ecosystem(), deps.len());
    deps
}

fn is_pruned(entry: &DirEntry, analyzer: &dyn Analyzer, opts: &ScanConfig) -> bool {
    // The root is always walked, whatever it is called.
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let Some(name) = entry.file_name().to_str() else {
        return false;
    };

    if ALWAYS_PRUNED.contains(&name) || opts.extra_excluded_dirs.iter().any(|d| d == name) {
        return true;
    }
    !opts.include_vendor && analyzer.excluded_dirs().contains(&name)
}

fn extract_file(path: &Path, manifest: &ManifestFile) -> Result<Vec<String>, AuditError> {
    let content = fs::read_to_string(path).map_err(|source| AuditError::FileAccess {
        path: path.to_path_buf(),
        source,
    })?;

    (manifest.extract)(&content).map_err(|err| AuditError::Parse {
        path: path.to_path_buf(),
        reason: format!("{:#}", err),
    })
}
