//! Report renderers for validation results.
//!
//! - [`terminal`]: per-ecosystem tables with status icons and a summary line;
//!   `safe` rows appear from `-v` up.
//! - JSON output is a plain `serde_json` dump of the results and lives in `main`.

pub mod terminal;
