use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use super::{decode, parse_timestamp, Registry};
use crate::error::LookupError;

/// npm registry packument; `time` maps each version plus `created` and
/// `modified` to a timestamp.
pub struct Npm;

#[derive(Debug, Deserialize)]
struct NpmMetadata {
    #[serde(default)]
    time: HashMap<String, Value>,
}

impl Registry for Npm {
    fn name(&self) -> &'static str {
        "npm"
    }

    /// Scoped packages need the slash encoded: `@scope/pkg` → `@scope%2Fpkg`.
    fn url(&self, base: &str, package: &str) -> String {
        format!("{}/{}", base, package.replace('/', "%2F"))
    }

    fn reference_time(&self, _package: &str, body: &str) -> Result<DateTime<Utc>, LookupError> {
        let data: NpmMetadata = decode(body)?;
        let created = data
            .time
            .get("created")
            .and_then(Value::as_str)
            .unwrap_or_default();
        parse_timestamp(created)
    }
}
