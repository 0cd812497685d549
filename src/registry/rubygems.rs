use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{decode, parse_timestamp, Registry};
use crate::error::LookupError;

/// RubyGems gem info: a single creation timestamp.
pub struct RubyGems;

#[derive(Debug, Deserialize)]
struct GemInfo {
    created_at: Option<String>,
    /// Present on every gem; used when `created_at` is absent.
    version_created_at: Option<String>,
}

impl Registry for RubyGems {
    fn name(&self) -> &'static str {
        "RubyGems"
    }

    fn url(&self, base: &str, package: &str) -> String {
        format!("{}/api/v1/gems/{}.json", base, package)
    }

    fn reference_time(&self, _package: &str, body: &str) -> Result<DateTime<Utc>, LookupError> {
        let info: GemInfo = decode(body)?;
        let created = info
            .created_at
            .or(info.version_created_at)
            .unwrap_or_default();
        parse_timestamp(&created)
    }
}
