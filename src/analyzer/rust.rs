use anyhow::Result;
use toml::Value;

use super::{Analyzer, FileKind, ManifestFile};
use crate::models::Ecosystem;

pub struct RustAnalyzer;

static FILES: [ManifestFile; 2] = [
    ManifestFile {
        file_name: "Cargo.toml",
        kind: FileKind::Manifest,
        extract: parse_cargo_toml,
    },
    ManifestFile {
        file_name: "Cargo.lock",
        kind: FileKind::Lockfile,
        extract: parse_cargo_lock,
    },
];

impl Analyzer for RustAnalyzer {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Rust
    }

    fn excluded_dirs(&self) -> &'static [&'static str] {
        &["target"]
    }

    fn files(&self) -> &'static [ManifestFile] {
        &FILES
    }
}

const DEPENDENCY_TABLES: [&str; 3] = ["dependencies", "dev-dependencies", "build-dependencies"];

/// Parse `Cargo.toml`: every dependency table, including
/// `[workspace.dependencies]` and `[target.'cfg(..)'.dependencies]`.
fn parse_cargo_toml(content: &str) -> Result<Vec<String>> {
    let manifest: Value = toml::from_str(content)?;
    let mut names = Vec::new();

    collect_tables(&manifest, &mut names);

    if let Some(deps) = manifest
        .get("workspace")
        .and_then(|w| w.get("dependencies"))
        .and_then(Value::as_table)
    {
        collect_table(deps, &mut names);
    }

    if let Some(targets) = manifest.get("target").and_then(Value::as_table) {
        for target in targets.values() {
            collect_tables(target, &mut names);
        }
    }

    Ok(names)
}

fn collect_tables(parent: &Value, names: &mut Vec<String>) {
    for table in DEPENDENCY_TABLES {
        if let Some(deps) = parent.get(table).and_then(Value::as_table) {
            collect_table(deps, names);
        }
    }
}

/// Renamed dependencies (`alias = { package = "real" }`) are recorded under
/// the name the registry knows.
fn collect_table(deps: &toml::map::Map<String, Value>, names: &mut Vec<String>) {
    for (key, spec) in deps {
        let name = spec
            .get("package")
            .and_then(Value::as_str)
            .unwrap_or(key.as_str());
        names.push(name.to_string());
    }
}

/// Parse `Cargo.lock` block by block.
///
/// A `[[package]]` header opens a block that ends at the next blank line,
/// table header, or end of file. Blocks without a `source` line are local
/// workspace members and are not registry packages.
fn parse_cargo_lock(content: &str) -> Result<Vec<String>> {
    let mut names = Vec::new();
    let mut in_package = false;
    let mut current: Option<String> = None;
    let mut has_source = false;

    for line in content.lines() {
        let line = line.trim();

        if line == "[[package]]" {
            finish_package(&mut names, current.take(), has_source);
            in_package = true;
            has_source = false;
            continue;
        }
        if !in_package {
            continue;
        }
        if line.is_empty() || line.starts_with('[') {
            finish_package(&mut names, current.take(), has_source);
            in_package = false;
            continue;
        }

        if let Some(value) = line.strip_prefix("name = ") {
            current = Some(value.trim_matches('"').to_string());
        } else if line.starts_with("source = ") {
            has_source = true;
        }
    }
    finish_package(&mut names, current.take(), has_source);

    Ok(names)
}

fn finish_package(names: &mut Vec<String>, name: Option<String>, has_source: bool) {
    if let Some(name) = name {
        if has_source && !name.is_empty() {
            names.push(name);
        }
    }
}
