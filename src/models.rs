use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// The packaging systems the scanner understands.
///
/// Declaration order is the order ecosystems are walked, validated and
/// reported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ecosystem {
    Python,
    Npm,
    Go,
    Php,
    Ruby,
    Rust,
}

impl Ecosystem {
    pub const ALL: [Ecosystem; 6] = [
        Ecosystem::Python,
        Ecosystem::Npm,
        Ecosystem::Go,
        Ecosystem::Php,
        Ecosystem::Ruby,
        Ecosystem::Rust,
    ];
}

impl std::fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Ecosystem::Python => write!(f, "python"),
            Ecosystem::Npm => write!(f, "npm"),
            Ecosystem::Go => write!(f, "go"),
            Ecosystem::Php => write!(f, "php"),
            Ecosystem::Ruby => write!(f, "ruby"),
            Ecosystem::Rust => write!(f, "rust"),
        }
    }
}

/// A declared package and every file it was observed in.
///
/// `origins` is never empty and keeps duplicates: the same file may list a
/// name more than once (nested lockfile trees), and a manifest and its
/// lockfile each contribute their own entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyRecord {
    pub name: String,
    pub ecosystem: Ecosystem,
    pub origins: Vec<PathBuf>,
}

/// Outcome of a registry lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Safe,
    Investigate,
    NotFound,
    Unknown,
}

impl Status {
    /// Report marker for the status.
    pub fn icon(&self) -> &'static str {
        match self {
            Status::Safe => "[✓]",
            Status::Investigate => "[~]",
            Status::NotFound => "[✗]",
            Status::Unknown => "[?]",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Safe => write!(f, "safe"),
            Status::Investigate => write!(f, "investigate"),
            Status::NotFound => write!(f, "not_found"),
            Status::Unknown => write!(f, "unknown"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub name: String,
    pub ecosystem: Ecosystem,
    pub status: Status,
    /// Human explanation; empty or `-` when there is nothing to say.
    pub details: String,
    pub origins: Vec<PathBuf>,
}

impl ValidationResult {
    pub fn new(record: &DependencyRecord, status: Status, details: impl Into<String>) -> Self {
        Self {
            name: record.name.clone(),
            ecosystem: record.ecosystem,
            status,
            details: details.into(),
            origins: record.origins.clone(),
        }
    }

    /// Details as displayed: empty strings render as `-`.
    pub fn display_details(&self) -> &str {
        if self.details.is_empty() {
            "-"
        } else {
            &self.details
        }
    }
}
