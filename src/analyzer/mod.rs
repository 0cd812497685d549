//! Per-ecosystem manifest and lockfile parsers.
//!
//! Each ecosystem implements [`Analyzer`], which names the directories the
//! walker prunes and the files it recognizes. A recognized file maps to a
//! [`ManifestFile`] whose `extract` turns file content into the package
//! names it declares, in file order, duplicates included.

use anyhow::Result;
use serde_json::Value;

use crate::models::Ecosystem;

pub mod go;
pub mod node;
pub mod php;
pub mod python;
pub mod ruby;
pub mod rust;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Direct dependencies, always parsed.
    Manifest,
    /// Resolved dependency set, parsed only with `--include-lockfiles`.
    Lockfile,
}

/// A recognized file name and the parser for its content.
pub struct ManifestFile {
    pub file_name: &'static str,
    pub kind: FileKind,
    pub extract: fn(&str) -> Result<Vec<String>>,
}

pub trait Analyzer: Sync {
    fn ecosystem(&self) -> Ecosystem;

    /// Directory names whose subtree is skipped unless vendored code is requested.
    fn excluded_dirs(&self) -> &'static [&'static str];

    fn files(&self) -> &'static [ManifestFile];

    fn parser_for(&self, file_name: &str) -> Option<&'static ManifestFile> {
        self.files().iter().find(|f| f.file_name == file_name)
    }
}

pub fn analyzer_for(ecosystem: Ecosystem) -> &'static dyn Analyzer {
    match ecosystem {
        Ecosystem::Python => &python::PythonAnalyzer,
        Ecosystem::Npm => &node::NodeAnalyzer,
        Ecosystem::Go => &go::GoAnalyzer,
        Ecosystem::Php => &php::PhpAnalyzer,
        Ecosystem::Ruby => &ruby::RubyAnalyzer,
        Ecosystem::Rust => &rust::RustAnalyzer,
    }
}

/// Every key of each named top-level JSON object, section by section.
pub(crate) fn object_keys(json: &Value, sections: &[&str]) -> Vec<String> {
    sections
        .iter()
        .filter_map(|section| json.get(*section).and_then(Value::as_object))
        .flat_map(|table| table.keys().cloned())
        .collect()
}
