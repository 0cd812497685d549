use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use super::{decode, earliest, Registry};
use crate::error::LookupError;

/// Packagist metadata: every version of the package with its release time.
pub struct Packagist;

#[derive(Debug, Deserialize)]
struct PackagistResponse {
    #[serde(default)]
    packages: HashMap<String, Value>,
}

impl Registry for Packagist {
    fn name(&self) -> &'static str {
        "Packagist"
    }

    fn url(&self, base: &str, package: &str) -> String {
        format!("{}/p/{}.json", base, package)
    }

    /// Earliest `time` across all versions. Versions come either as a list
    /// or as a map keyed by version string.
    fn reference_time(&self, package: &str, body: &str) -> Result<DateTime<Utc>, LookupError> {
        let data: PackagistResponse = decode(body)?;

        let versions: Vec<&Value> = match data.packages.get(package) {
            Some(Value::Array(list)) => list.iter().collect(),
            Some(Value::Object(map)) => map.values().collect(),
            Some(_) => return Err(LookupError::Decode("versions are not a list".to_string())),
            None => Vec::new(),
        };
        if versions.is_empty() {
            return Err(LookupError::Missing(
                "No versions found on Packagist".to_string(),
            ));
        }

        earliest(
            versions
                .into_iter()
                .filter_map(|v| v.get("time").and_then(Value::as_str)),
        )
    }
}
