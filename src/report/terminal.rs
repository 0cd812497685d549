use std::path::{Path, PathBuf};

use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use crate::models::{Ecosystem, Status, ValidationResult};

/// Print the grouped terminal report to stdout.
pub fn render(results: &[ValidationResult], root: &Path, verbosity: u8) {
    print!("{}", format_report(results, root, verbosity));
}

/// Build the grouped terminal report.
///
/// `safe` rows are only listed from verbosity 1 up; they are always counted
/// in the summary.
pub fn format_report(results: &[ValidationResult], root: &Path, verbosity: u8) -> String {
    if results.is_empty() {
        return "No dependencies found.\n".to_string();
    }

    let mut out = format!(
        "\n {} v{}\n Dependency vibe report for {}\n\n",
        "vibe-validator".bold(),
        env!("CARGO_PKG_VERSION"),
        root.display()
    );

    for ecosystem in Ecosystem::ALL {
        let rows = rows_for(results, ecosystem, verbosity);
        if rows.is_empty() {
            continue;
        }
        out.push_str(&format!(" {}:\n", ecosystem.to_string().bold()));
        out.push_str(&format!("{}\n\n", build_table(&rows, root)));
    }

    out.push_str(&format!(" {}\n", summary_line(results)));
    out
}

/// Rows shown for one ecosystem, sorted by name.
fn rows_for(results: &[ValidationResult], ecosystem: Ecosystem, verbosity: u8) -> Vec<&ValidationResult> {
    let mut rows: Vec<&ValidationResult> = results
        .iter()
        .filter(|r| r.ecosystem == ecosystem)
        .filter(|r| verbosity > 0 || r.status != Status::Safe)
        .collect();
    rows.sort_by(|a, b| a.name.cmp(&b.name));
    rows
}

fn build_table(rows: &[&ValidationResult], root: &Path) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Status").add_attribute(Attribute::Bold),
            Cell::new("Name").add_attribute(Attribute::Bold),
            Cell::new("Details").add_attribute(Attribute::Bold),
            Cell::new("Path").add_attribute(Attribute::Bold),
        ]);

    for result in rows {
        table.add_row(vec![
            Cell::new(result.status.icon()).fg(status_color(result.status)),
            Cell::new(&result.name),
            Cell::new(result.display_details()),
            Cell::new(join_origins(&result.origins, root)),
        ]);
    }

    table
}

fn status_color(status: Status) -> Color {
    match status {
        Status::Safe => Color::Green,
        Status::Investigate => Color::Yellow,
        Status::NotFound => Color::Red,
        Status::Unknown => Color::DarkGrey,
    }
}

/// Comma-joined origins, shown relative to the scan root when possible.
fn join_origins(origins: &[PathBuf], root: &Path) -> String {
    origins
        .iter()
        .map(|p| p.strip_prefix(root).unwrap_or(p).display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn summary_line(results: &[ValidationResult]) -> String {
    let count = |status: Status| results.iter().filter(|r| r.status == status).count();
    format!(
        "Total: {}  Safe: {}  Investigate: {}  Not found: {}  Unknown: {}",
        results.len(),
        count(Status::Safe).to_string().green(),
        count(Status::Investigate).to_string().yellow(),
        count(Status::NotFound).to_string().red(),
        count(Status::Unknown).to_string().dimmed(),
    )
}
