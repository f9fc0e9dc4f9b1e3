//! Subcommand implementations

pub mod instagram;
pub mod stamp;
pub mod youtube;

use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, Color, Table};

/// Print a key-value summary table on stderr.
pub(crate) fn print_summary(title: &str, rows: &[(&str, String)]) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new(title).fg(Color::Cyan),
            Cell::new("Value").fg(Color::Cyan),
        ]);
    for (label, value) in rows {
        table.add_row(vec![Cell::new(label), Cell::new(value)]);
    }
    eprintln!("\n{table}");
}

/// Render a batch report for the summary table.
pub(crate) fn report_row(report: &takeback_core::BatchReport) -> String {
    format!(
        "{} fetched, {} failed of {} attempted{}",
        report.fetched,
        report.failed,
        report.attempted,
        if report.interrupted {
            " (interrupted)"
        } else {
            ""
        }
    )
}
