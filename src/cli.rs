use std::path::PathBuf;

use clap::Parser;

use crate::config::Config;

#[derive(Parser, Debug)]
#[command(
    name = "vibe-validator",
    about = "Scan project dependencies for sketchy vibes",
    version
)]
pub struct Cli {
    /// Project path to scan
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Also scan lockfiles (Pipfile.lock, package-lock.json, yarn.lock, pnpm-lock.yaml, composer.lock, Gemfile.lock, Cargo.lock)
    #[arg(long)]
    pub include_lockfiles: bool,

    /// Descend into vendored directories (node_modules, vendor, .venv, target, ...)
    #[arg(long)]
    pub include_vendor: bool,

    /// Increase verbosity: -v lists safe packages, -vv logs every scanned file
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Config file [default: ./.vibe-validator/config.toml, fallback ~/.config/vibe-validator/config.toml]
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Report format
    #[arg(long, default_value = "terminal", value_name = "FORMAT")]
    pub report: ReportFormat,

    /// Maximum registry lookups in flight
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    pub concurrency: Option<u64>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Exit with status 1 if any dependency is not safe
    #[arg(long)]
    pub strict: bool,
}

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum ReportFormat {
    Terminal,
    Json,
}

impl Cli {
    /// Layer command-line flags over the loaded config. Switches can only
    /// turn features on; numeric options replace the configured value.
    pub fn apply_to(&self, config: &mut Config) {
        config.scan.include_lockfiles |= self.include_lockfiles;
        config.scan.include_vendor |= self.include_vendor;
        config.scan.verbosity = self.verbose;
        if let Some(n) = self.concurrency {
            config.network.concurrency = usize::try_from(n).unwrap_or(usize::MAX);
        }
        if let Some(secs) = self.timeout {
            config.network.timeout_secs = secs;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::parse_from([
            "vibe-validator",
            "some/project",
            "--include-lockfiles",
            "-vv",
            "--timeout",
            "3",
        ]);
        let mut config = Config::default();
        config.scan.include_vendor = true;
        cli.apply_to(&mut config);

        assert_eq!(cli.path, PathBuf::from("some/project"));
        assert!(config.scan.include_lockfiles);
        assert!(config.scan.include_vendor);
        assert_eq!(config.scan.verbosity, 2);
        assert_eq!(config.network.timeout_secs, 3);
        assert_eq!(config.network.concurrency, 8);
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["vibe-validator"]);
        assert_eq!(cli.path, PathBuf::from("."));
        assert_eq!(cli.verbose, 0);
        assert!(matches!(cli.report, ReportFormat::Terminal));
    }

    #[test]
    fn test_zero_timeout_and_concurrency_rejected() {
        assert!(Cli::try_parse_from(["vibe-validator", "--timeout", "0"]).is_err());
        assert!(Cli::try_parse_from(["vibe-validator", "--concurrency", "0"]).is_err());

        let cli = Cli::parse_from(["vibe-validator", "--concurrency", "2"]);
        let mut config = Config::default();
        cli.apply_to(&mut config);
        assert_eq!(config.network.concurrency, 2);
        assert!(config.network.validate().is_ok());
    }
}
