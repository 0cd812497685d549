use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{decode, parse_timestamp, Registry};
use crate::error::LookupError;

/// crates.io crate endpoint: `crate.created_at`.
pub struct CratesIo;

#[derive(Debug, Deserialize)]
struct CrateResponse {
    #[serde(rename = "crate")]
    krate: CrateInfo,
}

#[derive(Debug, Deserialize)]
struct CrateInfo {
    #[serde(default)]
    created_at: String,
}

impl Registry for CratesIo {
    fn name(&self) -> &'static str {
        "crates.io"
    }

    fn url(&self, base: &str, package: &str) -> String {
        format!("{}/api/v1/crates/{}", base, package)
    }

    fn reference_time(&self, _package: &str, body: &str) -> Result<DateTime<Utc>, LookupError> {
        let data: CrateResponse = decode(body)?;
        parse_timestamp(&data.krate.created_at)
    }
}
