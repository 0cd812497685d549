//! Async registry lookups that classify dependencies by publication age.
//!
//! Every ecosystem's registry implements [`Registry`]: where to send the one
//! GET request for a package, and how to pull the reference timestamp out of
//! the response. [`classify`] turns the outcome into a [`ValidationResult`]
//! the same way for all of them.

use chrono::{DateTime, Duration, Utc};
use futures::stream::{self, StreamExt};
use indicatif::ProgressBar;
use reqwest::Client;
use tracing::debug;

use crate::config::{Config, NetworkConfig};
use crate::error::LookupError;
use crate::models::{DependencyRecord, Ecosystem, Status, ValidationResult};

pub mod crates_io;
pub mod go_proxy;
pub mod npm;
pub mod packagist;
pub mod pypi;
pub mod rubygems;

pub trait Registry: Sync {
    /// Display name used in result details, e.g. `PyPI`.
    fn name(&self) -> &'static str;

    /// Lookup URL for `package` under the registry's `base` URL.
    fn url(&self, base: &str, package: &str) -> String;

    /// Reference timestamp from a successful response body: the first-ever
    /// release when the registry exposes history, otherwise the single
    /// creation time it reports.
    fn reference_time(&self, package: &str, body: &str) -> Result<DateTime<Utc>, LookupError>;

    fn not_found_details(&self) -> String {
        format!("Not found on {}", self.name())
    }

    /// Classification when the response body has an unexpected shape.
    fn decode_failure(&self) -> (Status, String) {
        (
            Status::Investigate,
            format!("Unable to decode {} metadata", self.name()),
        )
    }

    fn recent_details(&self, age: &str) -> String {
        format!("Very new package (published {})", age)
    }
}

pub fn registry_for(ecosystem: Ecosystem) -> &'static dyn Registry {
    match ecosystem {
        Ecosystem::Python => &pypi::PyPi,
        Ecosystem::Npm => &npm::Npm,
        Ecosystem::Go => &go_proxy::GoProxy,
        Ecosystem::Php => &packagist::Packagist,
        Ecosystem::Ruby => &rubygems::RubyGems,
        Ecosystem::Rust => &crates_io::CratesIo,
    }
}

pub fn build_client(network: &NetworkConfig) -> reqwest::Result<Client> {
    Client::builder()
        .timeout(network.timeout())
        .user_agent(network.user_agent.clone())
        .build()
}

/// Validate every record with at most `concurrency` lookups in flight.
///
/// Results come back ordered by ecosystem, then name.
pub async fn validate_all(
    client: &Client,
    config: &Config,
    records: &[DependencyRecord],
    progress: Option<&ProgressBar>,
) -> Vec<ValidationResult> {
    let concurrency = config.network.concurrency.max(1);

    let mut results: Vec<ValidationResult> = stream::iter(records)
        .map(|record| validate(client, config, record))
        .buffer_unordered(concurrency)
        .inspect(|_| {
            if let Some(pb) = progress {
                pb.inc(1);
            }
        })
        .collect()
        .await;

    results.sort_by(|a, b| (a.ecosystem, &a.name).cmp(&(b.ecosystem, &b.name)));
    results
}

/// One registry lookup for one dependency.
pub async fn validate(client: &Client, config: &Config, record: &DependencyRecord) -> ValidationResult {
    let registry = registry_for(record.ecosystem);
    let base = config.registries.base_for(record.ecosystem);

    let outcome = lookup(client, registry, base, &record.name).await;
    if let Err(err) = &outcome {
        debug!("{} {}: {}", record.ecosystem, record.name, err);
    }

    classify(
        registry,
        record,
        outcome,
        Utc::now(),
        config.network.age_threshold(),
    )
}

async fn lookup(
    client: &Client,
    registry: &dyn Registry,
    base: &str,
    package: &str,
) -> Result<DateTime<Utc>, LookupError> {
    let url = registry.url(base, package);

    let response = client
        .get(&url)
        .header("Accept", "application/json")
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(LookupError::Status(response.status()));
    }

    let body = response.text().await?;
    registry.reference_time(package, &body)
}

/// Map a lookup outcome to a status. Packages younger than `threshold` are
/// flagged; a package exactly `threshold` old is safe.
pub fn classify(
    registry: &dyn Registry,
    record: &DependencyRecord,
    outcome: Result<DateTime<Utc>, LookupError>,
    now: DateTime<Utc>,
    threshold: Duration,
) -> ValidationResult {
    let (status, details) = match outcome {
        Err(LookupError::Network(_)) | Err(LookupError::Status(_)) => {
            (Status::NotFound, registry.not_found_details())
        }
        Err(LookupError::Missing(details)) => (Status::NotFound, details),
        Err(LookupError::Decode(_)) => registry.decode_failure(),
        Err(LookupError::Timestamp(_)) => {
            (Status::Investigate, "Invalid publish timestamp".to_string())
        }
        Ok(reference) => {
            let age = now - reference;
            if age < threshold {
                (Status::Investigate, registry.recent_details(&human_age(age)))
            } else {
                (Status::Safe, "-".to_string())
            }
        }
    };

    ValidationResult::new(record, status, details)
}

/// Friendly relative age such as `3 days ago`.
pub fn human_age(age: Duration) -> String {
    let days = age.num_days();
    if days > 0 {
        return format!("{} day{} ago", days, plural(days));
    }
    let hours = age.num_hours();
    if hours > 0 {
        return format!("{} hour{} ago", hours, plural(hours));
    }
    let minutes = age.num_minutes();
    if minutes > 0 {
        return format!("{} minute{} ago", minutes, plural(minutes));
    }
    "just now".to_string()
}

fn plural(n: i64) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, LookupError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|err| LookupError::Timestamp(format!("{:?}: {}", raw, err)))
}

/// Earliest of several release timestamps. Unparseable entries are skipped;
/// it is an error only when none parse.
pub(crate) fn earliest<'a>(
    raw: impl IntoIterator<Item = &'a str>,
) -> Result<DateTime<Utc>, LookupError> {
    raw.into_iter()
        .filter_map(|t| parse_timestamp(t).ok())
        .min()
        .ok_or_else(|| LookupError::Timestamp("no parseable release time".to_string()))
}

pub(crate) fn decode<'a, T: serde::Deserialize<'a>>(body: &'a str) -> Result<T, LookupError> {
    serde_json::from_str(body).map_err(|err| LookupError::Decode(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RegistryUrls;
    use std::path::PathBuf;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn record(name: &str, ecosystem: Ecosystem) -> DependencyRecord {
        DependencyRecord {
            name: name.to_string(),
            ecosystem,
            origins: vec![PathBuf::from("manifest")],
        }
    }

    fn now() -> DateTime<Utc> {
        parse_timestamp("2024-06-01T12:00:00Z").unwrap()
    }

    fn classify_age(ecosystem: Ecosystem, age: Duration) -> ValidationResult {
        classify(
            registry_for(ecosystem),
            &record("pkg", ecosystem),
            Ok(now() - age),
            now(),
            Duration::days(30),
        )
    }

    /// Answer the first request on a local socket with a canned response.
    async fn serve_once(status_line: &'static str, body: String) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = vec![0u8; 8192];
                let _ = socket.read(&mut buf).await;
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status_line,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });
        format!("http://{}", addr)
    }

    fn config_for(base: &str) -> Config {
        Config {
            registries: RegistryUrls::all(base),
            ..Config::default()
        }
    }

    #[test]
    fn test_age_boundary() {
        let exact = classify_age(Ecosystem::Npm, Duration::days(30));
        assert_eq!(exact.status, Status::Safe);
        assert_eq!(exact.details, "-");

        let young = classify_age(Ecosystem::Npm, Duration::days(29));
        assert_eq!(young.status, Status::Investigate);
        assert_eq!(young.details, "Very new package (published 29 days ago)");
    }

    #[test]
    fn test_go_wording_for_recent_modules() {
        let result = classify_age(Ecosystem::Go, Duration::days(3));
        assert_eq!(result.status, Status::Investigate);
        assert_eq!(result.details, "Recently added (3 days ago)");
    }

    #[test]
    fn test_failures_map_to_statuses() {
        let rec = record("pkg", Ecosystem::Rust);
        let threshold = Duration::days(30);
        let crates = registry_for(Ecosystem::Rust);

        let missing = classify(
            crates,
            &rec,
            Err(LookupError::Status(reqwest::StatusCode::NOT_FOUND)),
            now(),
            threshold,
        );
        assert_eq!(missing.status, Status::NotFound);
        assert_eq!(missing.details, "Not found on crates.io");

        let garbled = classify(crates, &rec, Err(LookupError::Decode("eof".into())), now(), threshold);
        assert_eq!(garbled.status, Status::Investigate);
        assert_eq!(garbled.details, "Unable to decode crates.io metadata");

        let bad_time = classify(
            crates,
            &rec,
            Err(LookupError::Timestamp("yesterday".into())),
            now(),
            threshold,
        );
        assert_eq!(bad_time.status, Status::Investigate);
        assert_eq!(bad_time.details, "Invalid publish timestamp");
        assert_eq!(bad_time.origins, rec.origins);
    }

    #[test]
    fn test_go_decode_failure_is_unknown() {
        let result = classify(
            registry_for(Ecosystem::Go),
            &record("example.com/mod", Ecosystem::Go),
            Err(LookupError::Decode("eof".into())),
            now(),
            Duration::days(30),
        );
        assert_eq!(result.status, Status::Unknown);
        assert_eq!(result.details, "Unable to parse module metadata");
    }

    #[test]
    fn test_human_age() {
        assert_eq!(human_age(Duration::days(1)), "1 day ago");
        assert_eq!(human_age(Duration::days(12) + Duration::hours(5)), "12 days ago");
        assert_eq!(human_age(Duration::hours(5)), "5 hours ago");
        assert_eq!(human_age(Duration::minutes(1)), "1 minute ago");
        assert_eq!(human_age(Duration::seconds(20)), "just now");
    }

    #[test]
    fn test_earliest_skips_unparseable() {
        let t = earliest(["2020-05-01T00:00:00Z", "garbage", "2019-01-01T00:00:00+02:00"]).unwrap();
        assert_eq!(t, parse_timestamp("2018-12-31T22:00:00Z").unwrap());
        assert!(earliest(["garbage"]).is_err());
        assert!(earliest(std::iter::empty()).is_err());
    }

    #[tokio::test]
    async fn test_registry_404_is_not_found() {
        let base = serve_once("404 Not Found", String::new()).await;
        let config = config_for(&base);
        let client = build_client(&config.network).unwrap();

        let result = validate(&client, &config, &record("no-such-pkg", Ecosystem::Python)).await;
        assert_eq!(result.status, Status::NotFound);
        assert_eq!(result.details, "Not found on PyPI");
    }

    #[tokio::test]
    async fn test_recent_release_is_flagged() {
        let first = (Utc::now() - Duration::days(10)).to_rfc3339();
        let later = (Utc::now() - Duration::days(2)).to_rfc3339();
        let body = format!(
            r#"{{ "info": {{}}, "releases": {{
                "0.1.0": [{{ "upload_time_iso_8601": "{}" }}],
                "0.2.0": [{{ "upload_time_iso_8601": "{}" }}]
            }} }}"#,
            first, later
        );
        let base = serve_once("200 OK", body).await;
        let config = config_for(&base);
        let client = build_client(&config.network).unwrap();

        let result = validate(&client, &config, &record("fresh", Ecosystem::Python)).await;
        assert_eq!(result.status, Status::Investigate);
        assert!(result.details.contains("10 days ago"), "{}", result.details);
    }

    #[tokio::test]
    async fn test_old_package_is_safe() {
        let created = (Utc::now() - Duration::days(400)).to_rfc3339();
        let body = format!(r#"{{ "crate": {{ "name": "serde", "created_at": "{}" }} }}"#, created);
        let base = serve_once("200 OK", body).await;
        let config = config_for(&base);
        let client = build_client(&config.network).unwrap();

        let result = validate(&client, &config, &record("serde", Ecosystem::Rust)).await;
        assert_eq!(result.status, Status::Safe);
        assert_eq!(result.display_details(), "-");
    }

    #[tokio::test]
    async fn test_timeout_is_not_found() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            // Accept and hold the connection without answering.
            if let Ok((socket, _)) = listener.accept().await {
                tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                drop(socket);
            }
        });

        let mut config = config_for(&base);
        config.network.timeout_secs = 1;
        let client = build_client(&config.network).unwrap();

        let result = validate(&client, &config, &record("slow", Ecosystem::Ruby)).await;
        assert_eq!(result.status, Status::NotFound);
        assert_eq!(result.details, "Not found on RubyGems");
    }

    #[tokio::test]
    async fn test_validate_all_orders_results() {
        // Nothing listens on port 9 locally; every lookup fails fast.
        let config = config_for("http://127.0.0.1:9");
        let client = build_client(&config.network).unwrap();
        let records = vec![
            record("zeta", Ecosystem::Python),
            record("serde", Ecosystem::Rust),
            record("alpha", Ecosystem::Python),
        ];

        let results = validate_all(&client, &config, &records, None).await;
        let keys: Vec<_> = results.iter().map(|r| (r.ecosystem, r.name.as_str())).collect();
        assert_eq!(
            keys,
            vec![
                (Ecosystem::Python, "alpha"),
                (Ecosystem::Python, "zeta"),
                (Ecosystem::Rust, "serde"),
            ]
        );
        assert!(results.iter().all(|r| r.status == Status::NotFound));
    }
}
