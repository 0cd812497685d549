use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{decode, earliest, Registry};
use crate::error::LookupError;

/// PyPI JSON API: full release history, each release a list of uploaded files.
pub struct PyPi;

#[derive(Debug, Deserialize)]
struct PypiMetadata {
    #[serde(default)]
    releases: HashMap<String, Vec<PypiFile>>,
}

#[derive(Debug, Deserialize)]
struct PypiFile {
    upload_time_iso_8601: Option<String>,
}

impl Registry for PyPi {
    fn name(&self) -> &'static str {
        "PyPI"
    }

    fn url(&self, base: &str, package: &str) -> String {
        format!("{}/pypi/{}/json", base, package)
    }

    /// Earliest upload across every file of every release.
    fn reference_time(&self, _package: &str, body: &str) -> Result<DateTime<Utc>, LookupError> {
        let data: PypiMetadata = decode(body)?;
        earliest(
            data.releases
                .values()
                .flatten()
                .filter_map(|file| file.upload_time_iso_8601.as_deref()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::parse_timestamp;

    #[test]
    fn test_url() {
        assert_eq!(
            PyPi.url("https://pypi.org", "requests"),
            "https://pypi.org/pypi/requests/json"
        );
    }

    #[test]
    fn test_earliest_release_is_reference() {
        let body = r#"{
  "info": { "name": "requests" },
  "releases": {
    "2.31.0": [
      { "upload_time_iso_8601": "2023-05-22T15:12:42.313790Z" },
      { "upload_time_iso_8601": "2023-05-22T15:12:44.175903Z" }
    ],
    "0.2.0": [
      { "upload_time_iso_8601": "2011-02-14T00:00:00.000000Z" }
    ],
    "0.0.1": []
  }
}"#;
        let t = PyPi.reference_time("requests", body).unwrap();
        assert_eq!(t, parse_timestamp("2011-02-14T00:00:00Z").unwrap());
    }

    #[test]
    fn test_no_uploaded_files_is_a_timestamp_error() {
        let body = r#"{ "info": {}, "releases": { "0.0.1": [] } }"#;
        assert!(matches!(
            PyPi.reference_time("empty", body),
            Err(LookupError::Timestamp(_))
        ));
    }

    #[test]
    fn test_wrong_shape_is_a_decode_error() {
        let body = r#"{ "releases": ["0.1.0"] }"#;
        assert!(matches!(
            PyPi.reference_time("odd", body),
            Err(LookupError::Decode(_))
        ));
    }
}
