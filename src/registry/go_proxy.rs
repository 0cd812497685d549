use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{decode, Registry};
use crate::error::LookupError;
use crate::models::Status;

/// Go module proxy `@latest` endpoint: a single version and its time.
pub struct GoProxy;

#[derive(Debug, Deserialize)]
struct ModuleInfo {
    #[serde(rename = "Time")]
    time: DateTime<Utc>,
}

impl Registry for GoProxy {
    fn name(&self) -> &'static str {
        "Go proxy"
    }

    fn url(&self, base: &str, package: &str) -> String {
        format!("{}/{}/@latest", base, escape_module_path(package))
    }

    /// The timestamp is part of the decoded shape, so a bad `Time` surfaces
    /// as a decode failure.
    fn reference_time(&self, _package: &str, body: &str) -> Result<DateTime<Utc>, LookupError> {
        let info: ModuleInfo = decode(body)?;
        Ok(info.time)
    }

    fn not_found_details(&self) -> String {
        "Not found in Go proxy".to_string()
    }

    fn decode_failure(&self) -> (Status, String) {
        (Status::Unknown, "Unable to parse module metadata".to_string())
    }

    fn recent_details(&self, age: &str) -> String {
        format!("Recently added ({})", age)
    }
}

/// Module paths are case-encoded for the proxy: each uppercase letter is
/// written as `!` plus its lowercase form.
fn escape_module_path(path: &str) -> String {
    let mut escaped = String::with_capacity(path.len());
    for c in path.chars() {
        if c.is_ascii_uppercase() {
            escaped.push('!');
            escaped.push(c.to_ascii_lowercase());
        } else {
            escaped.push(c);
        }
    }
    escaped
}
