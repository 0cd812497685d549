use anyhow::Result;
use serde_json::Value;

use super::{object_keys, Analyzer, FileKind, ManifestFile};
use crate::models::Ecosystem;

/// Analyzer for Python projects: `requirements.txt` and `Pipfile.lock`.
pub struct PythonAnalyzer;

static FILES: [ManifestFile; 2] = [
    ManifestFile {
        file_name: "requirements.txt",
        kind: FileKind::Manifest,
        extract: parse_requirements_txt,
    },
    ManifestFile {
        file_name: "Pipfile.lock",
        kind: FileKind::Lockfile,
        extract: parse_pipfile_lock,
    },
];

impl Analyzer for PythonAnalyzer {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Python
    }

    fn excluded_dirs(&self) -> &'static [&'static str] {
        &[".venv", "venv", "env", "__pycache__"]
    }

    fn files(&self) -> &'static [ManifestFile] {
        &FILES
    }
}

/// Markers that end a requirement's package name.
const NAME_TERMINATORS: [&str; 10] = [">=", "==", "<=", "~=", "!=", ">", "<", "[", ";", "@"];

/// Strip version specifiers, extras and markers from a requirement line.
///
/// `"flask==2.0.1"` → `"flask"`, `"pkg[extra]>=1.0"` → `"pkg"`.
pub fn requirement_name(line: &str) -> &str {
    let end = NAME_TERMINATORS
        .iter()
        .filter_map(|sep| line.find(sep))
        .min()
        .unwrap_or(line.len());
    let name = line[..end].trim();
    // `name 1.0` or `name  # comment`
    name.split_whitespace().next().unwrap_or("")
}

/// Parse `requirements.txt`, one requirement per line.
fn parse_requirements_txt(content: &str) -> Result<Vec<String>> {
    let mut names = Vec::new();

    for line in content.lines() {
        let line = line.trim();
        // Options such as `-r base.txt`, `-e .` or `--index-url` are not packages.
        if line.is_empty() || line.starts_with('#') || line.starts_with('-') {
            continue;
        }
        let name = requirement_name(line);
        if !name.is_empty() {
            names.push(name.to_string());
        }
    }

    Ok(names)
}

/// Parse `Pipfile.lock`: JSON with `default` and `develop` sections.
fn parse_pipfile_lock(content: &str) -> Result<Vec<String>> {
    let json: Value = serde_json::from_str(content)?;
    Ok(object_keys(&json, &["default", "develop"]))
}
