use anyhow::{bail, Result};

use super::{Analyzer, FileKind, ManifestFile};
use crate::models::Ecosystem;

pub struct GoAnalyzer;

static FILES: [ManifestFile; 1] = [ManifestFile {
    file_name: "go.mod",
    kind: FileKind::Manifest,
    extract: parse_go_mod,
}];

impl Analyzer for GoAnalyzer {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Go
    }

    fn excluded_dirs(&self) -> &'static [&'static str] {
        &["vendor", "Godeps"]
    }

    fn files(&self) -> &'static [ManifestFile] {
        &FILES
    }
}

/// Parse `go.mod`: module paths of every `require` directive.
///
/// Both `require example.com/mod v1.2.3` and the parenthesized block form
/// are accepted; `// indirect` requirements count like any other.
fn parse_go_mod(content: &str) -> Result<Vec<String>> {
    let mut names = Vec::new();
    let mut in_require_block = false;

    for (lineno, raw) in content.lines().enumerate() {
        let line = strip_comment(raw).trim();
        if line.is_empty() {
            continue;
        }

        if in_require_block {
            if line == ")" {
                in_require_block = false;
                continue;
            }
            names.push(module_path(line, lineno)?);
            continue;
        }

        let Some(rest) = line.strip_prefix("require") else {
            continue;
        };
        // `requirements` or similar is not a directive
        if !rest.is_empty() && !rest.starts_with([' ', '\t', '(']) {
            continue;
        }

        let rest = rest.trim();
        if rest == "(" {
            in_require_block = true;
        } else if let Some(single) = rest.strip_prefix('(') {
            // `require ( example.com/mod v1.0.0 )` on one line
            let single = single.trim_end_matches(')').trim();
            if !single.is_empty() {
                names.push(module_path(single, lineno)?);
            }
        } else {
            names.push(module_path(rest, lineno)?);
        }
    }

    if in_require_block {
        bail!("unterminated require block");
    }

    Ok(names)
}

fn strip_comment(line: &str) -> &str {
    match line.find("//") {
        Some(idx) => &line[..idx],
        None => line,
    }
}

/// `example.com/mod v1.2.3` → `example.com/mod`; quoted paths are unquoted.
fn module_path(spec: &str, lineno: usize) -> Result<String> {
    let mut fields = spec.split_whitespace();
    match (fields.next(), fields.next()) {
        (Some(path), Some(_version)) => Ok(path.trim_matches('"').to_string()),
        _ => bail!("line {}: malformed requirement {:?}", lineno + 1, spec),
    }
}
