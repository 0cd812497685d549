use anyhow::Result;
use regex::Regex;
use serde_json::{Map, Value};

use super::{object_keys, Analyzer, FileKind, ManifestFile};
use crate::models::Ecosystem;

pub struct NodeAnalyzer;

static FILES: [ManifestFile; 4] = [
    ManifestFile {
        file_name: "package.json",
        kind: FileKind::Manifest,
        extract: parse_package_json,
    },
    ManifestFile {
        file_name: "package-lock.json",
        kind: FileKind::Lockfile,
        extract: parse_package_lock_json,
    },
    ManifestFile {
        file_name: "yarn.lock",
        kind: FileKind::Lockfile,
        extract: parse_yarn_lock,
    },
    ManifestFile {
        file_name: "pnpm-lock.yaml",
        kind: FileKind::Lockfile,
        extract: parse_pnpm_lock,
    },
];

impl Analyzer for NodeAnalyzer {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Npm
    }

    fn excluded_dirs(&self) -> &'static [&'static str] {
        &["node_modules"]
    }

    fn files(&self) -> &'static [ManifestFile] {
        &FILES
    }
}

/// Parse `package.json`: keys of the dependency tables.
fn parse_package_json(content: &str) -> Result<Vec<String>> {
    let json: Value = serde_json::from_str(content)?;
    Ok(object_keys(
        &json,
        &["dependencies", "devDependencies", "optionalDependencies"],
    ))
}

/// Parse `package-lock.json`.
///
/// v2/v3 lockfiles carry a flat `packages` map keyed by install path; v1
/// lockfiles only have the nested `dependencies` tree, which is walked
/// recursively so every transitive entry is recorded. Workspace links are
/// local code and never looked up.
fn parse_package_lock_json(content: &str) -> Result<Vec<String>> {
    const NODE_MODULES: &str = "node_modules/";

    let json: Value = serde_json::from_str(content)?;
    let mut names = Vec::new();

    if let Some(packages) = json.get("packages").and_then(Value::as_object) {
        for (pkg_path, info) in packages {
            if info.get("link").and_then(Value::as_bool) == Some(true) {
                continue;
            }
            // "node_modules/a/node_modules/@scope/b" → "@scope/b"; the root
            // entry ("") and workspace sources have no node_modules segment.
            if let Some(idx) = pkg_path.rfind(NODE_MODULES) {
                let name = &pkg_path[idx + NODE_MODULES.len()..];
                if !name.is_empty() {
                    names.push(name.to_string());
                }
            }
        }
        return Ok(names);
    }

    if let Some(deps) = json.get("dependencies").and_then(Value::as_object) {
        collect_nested(deps, &mut names);
    }

    Ok(names)
}

fn collect_nested(deps: &Map<String, Value>, names: &mut Vec<String>) {
    for (name, info) in deps {
        names.push(name.clone());
        if let Some(nested) = info.get("dependencies").and_then(Value::as_object) {
            collect_nested(nested, names);
        }
    }
}

/// Protocols that resolve to code inside the repository rather than the
/// registry.
const LOCAL_PROTOCOLS: [&str; 4] = ["@workspace:", "@link:", "@portal:", "@file:"];

/// Parse `yarn.lock` (classic and berry): one name per entry header.
fn parse_yarn_lock(content: &str) -> Result<Vec<String>> {
    // Header like `foo@^1.0.0:`, `"@scope/foo@^1.0.0", "@scope/foo@^1.1.0":`
    // or `"foo@npm:^1.0.0":`; the first spec names the package.
    let header_re = Regex::new(r#"^"?(@?[^@"\s,]+)@"#)?;
    let mut names = Vec::new();

    for line in content.lines() {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line.starts_with(' ') || line.starts_with('\t') || !line.trim_end().ends_with(':') {
            continue;
        }
        if LOCAL_PROTOCOLS.iter().any(|p| line.contains(p)) {
            continue;
        }
        if let Some(caps) = header_re.captures(line) {
            names.push(caps[1].to_string());
        }
    }

    Ok(names)
}

/// Parse `pnpm-lock.yaml`: keys of the `packages` mapping.
fn parse_pnpm_lock(content: &str) -> Result<Vec<String>> {
    let doc: serde_yaml::Value = serde_yaml::from_str(content)?;
    let mut names = Vec::new();

    if let Some(packages) = doc.get("packages").and_then(|p| p.as_mapping()) {
        for (key, _) in packages.iter() {
            if let Some(name) = key.as_str().and_then(pnpm_package_name) {
                names.push(name);
            }
        }
    }

    Ok(names)
}

/// Package name from a pnpm `packages` key.
///
/// Handles `/foo/1.0.0` and `/@scope/foo/1.0.0_peer@2` (v5),
/// `/foo@1.0.0(peer@2)` (v6) and `@scope/foo@1.0.0` (v9).
fn pnpm_package_name(key: &str) -> Option<String> {
    let key = key.trim_start_matches('/');
    let key = key.split('(').next().unwrap_or(key);

    let mut segments = key.split('/');
    let first = segments.next()?;
    let (scope, bare) = if first.starts_with('@') {
        (Some(first), segments.next()?)
    } else {
        (None, first)
    };

    let bare = bare.split('@').next().unwrap_or(bare);
    if bare.is_empty() {
        return None;
    }

    Some(match scope {
        Some(scope) => format!("{}/{}", scope, bare),
        None => bare.to_string(),
    })
}
