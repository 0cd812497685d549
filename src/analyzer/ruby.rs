use anyhow::Result;
use regex::Regex;

use super::{Analyzer, FileKind, ManifestFile};
use crate::models::Ecosystem;

pub struct RubyAnalyzer;

static FILES: [ManifestFile; 2] = [
    ManifestFile {
        file_name: "Gemfile",
        kind: FileKind::Manifest,
        extract: parse_gemfile,
    },
    ManifestFile {
        file_name: "Gemfile.lock",
        kind: FileKind::Lockfile,
        extract: parse_gemfile_lock,
    },
];

impl Analyzer for RubyAnalyzer {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Ruby
    }

    fn excluded_dirs(&self) -> &'static [&'static str] {
        &["vendor"]
    }

    fn files(&self) -> &'static [ManifestFile] {
        &FILES
    }
}

/// Parse a `Gemfile`: the first string literal of each `gem` line.
fn parse_gemfile(content: &str) -> Result<Vec<String>> {
    let gem_re = Regex::new(r#"^gem\s*\(?\s*["']([^"']+)["']"#)?;
    let mut names = Vec::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(caps) = gem_re.captures(line) {
            names.push(caps[1].to_string());
        }
    }

    Ok(names)
}

/// Parse `Gemfile.lock`: spec entries of the `GEM` section.
///
/// Entries are the four-space-indented `name (version)` lines; deeper lines
/// are the requirements of the entry above them. The section closes at the
/// first blank line once an entry has been seen, so `PATH`/`GIT` specs and
/// the `DEPENDENCIES` list that follow are never mixed in.
fn parse_gemfile_lock(content: &str) -> Result<Vec<String>> {
    let spec_re = Regex::new(r"^ {4}([^\s(]+) \(")?;
    let mut names = Vec::new();
    let mut in_gem_section = false;
    let mut seen_entry = false;

    for line in content.lines() {
        if line.trim_end() == "GEM" {
            in_gem_section = true;
            seen_entry = false;
            continue;
        }
        if !in_gem_section {
            continue;
        }
        if line.trim().is_empty() {
            if seen_entry {
                in_gem_section = false;
            }
            continue;
        }
        if let Some(caps) = spec_re.captures(line) {
            names.push(caps[1].to_string());
            seen_entry = true;
        }
    }

    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_gemfile() {
        let content = r#"source "https://rubygems.org"

ruby "3.2.2"

gem "rails", "~> 7.0"
gem 'pg', '>= 0.18'
# gem "commented"
group :development do
  gem "pry"
end
gem("puma")
"#;
        let names = parse_gemfile(content).unwrap();
        assert_eq!(names, vec!["rails", "pg", "pry", "puma"]);
    }

    #[test]
    fn test_parse_gemfile_lock() {
        let content = "\
GEM
  remote: https://rubygems.org/
  specs:
    actionpack (7.0.8)
      rack (~> 2.0)
    rack (2.2.8)

PLATFORMS
  ruby

DEPENDENCIES
  actionpack
";
        let names = parse_gemfile_lock(content).unwrap();
        assert_eq!(names, vec!["actionpack", "rack"]);
    }

    #[test]
    fn test_blank_line_closes_gem_section() {
        let content = "\
GEM
  remote: https://rubygems.org/
  specs:
    rack (2.2.8)

PATH
  remote: .
  specs:
    local_gem (0.1.0)
";
        let names = parse_gemfile_lock(content).unwrap();
        assert_eq!(names, vec!["rack"]);
    }

    #[test]
    fn test_section_runs_to_end_of_file() {
        let content = "GEM\n  remote: https://rubygems.org/\n  specs:\n    rack (2.2.8)\n    rake (13.0.6)";
        let names = parse_gemfile_lock(content).unwrap();
        assert_eq!(names, vec!["rack", "rake"]);
    }

    #[test]
    fn test_no_gem_section() {
        let names = parse_gemfile_lock("PLATFORMS\n  ruby\n").unwrap();
        assert!(names.is_empty());
    }
}
