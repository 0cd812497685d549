use anyhow::Result;
use serde::Deserialize;
use serde_json::Value;

use super::{object_keys, Analyzer, FileKind, ManifestFile};
use crate::models::Ecosystem;

pub struct PhpAnalyzer;

static FILES: [ManifestFile; 2] = [
    ManifestFile {
        file_name: "composer.json",
        kind: FileKind::Manifest,
        extract: parse_composer_json,
    },
    ManifestFile {
        file_name: "composer.lock",
        kind: FileKind::Lockfile,
        extract: parse_composer_lock,
    },
];

impl Analyzer for PhpAnalyzer {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Php
    }

    fn excluded_dirs(&self) -> &'static [&'static str] {
        &["vendor"]
    }

    fn files(&self) -> &'static [ManifestFile] {
        &FILES
    }
}

/// Parse `composer.json`: keys of `require` and `require-dev`.
///
/// Platform requirements (`php`, `ext-*`) are keys like any other and are
/// reported as such.
fn parse_composer_json(content: &str) -> Result<Vec<String>> {
    let json: Value = serde_json::from_str(content)?;
    Ok(object_keys(&json, &["require", "require-dev"]))
}

#[derive(Debug, Deserialize)]
struct ComposerLock {
    #[serde(default)]
    packages: Vec<ComposerLockPackage>,
    #[serde(default, rename = "packages-dev")]
    packages_dev: Vec<ComposerLockPackage>,
}

#[derive(Debug, Deserialize)]
struct ComposerLockPackage {
    name: String,
}

/// Parse `composer.lock`: names under `packages` and `packages-dev`.
fn parse_composer_lock(content: &str) -> Result<Vec<String>> {
    let lock: ComposerLock = serde_json::from_str(content)?;
    Ok(lock
        .packages
        .into_iter()
        .chain(lock.packages_dev)
        .map(|p| p.name)
        .collect())
}
