//! Console summary for a finished batch.

use crate::models::BatchReport;

pub fn format_kb(bytes: i64) -> String {
    format!("{:.2} KB", bytes as f64 / 1024.0)
}

/// How a summary line should be emphasised on a terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Plain,
    Original,
    Converted,
    Saved,
    Problem,
}

/// Summary lines for `report` with their tone, in display order.
pub fn summary_entries(report: &BatchReport) -> Vec<(Tone, String)> {
    let mut entries = vec![
        (
            Tone::Plain,
            format!(
                "Converted {} of {} image(s) to {}",
                report.converted_count, report.candidate_count, report.target_format
            ),
        ),
        (
            Tone::Original,
            format!(
                "Total original size: {}",
                format_kb(report.total_original_bytes as i64)
            ),
        ),
        (
            Tone::Converted,
            format!("Total new size: {}", format_kb(report.total_new_bytes as i64)),
        ),
        (
            Tone::Saved,
            format!(
                "Total size saved: {} = {:.2}% savings",
                format_kb(report.bytes_saved()),
                report.percent_saved()
            ),
        ),
    ];

    if !report.skipped.is_empty() {
        entries.push((
            Tone::Problem,
            format!("Skipped {} file(s):", report.skipped.len()),
        ));
        for skipped in &report.skipped {
            entries.push((
                Tone::Plain,
                format!("  {}: {}", skipped.path.display(), skipped.reason),
            ));
        }
    }

    if !report.failures.is_empty() {
        entries.push((
            Tone::Problem,
            format!("Failed to convert {} file(s):", report.failures.len()),
        ));
        for failure in &report.failures {
            entries.push((
                Tone::Plain,
                format!(
                    "  {} ({}): {}",
                    failure.path.display(),
                    failure.kind,
                    failure.message
                ),
            ));
        }
    }

    entries
}

/// Plain-text summary lines, in display order.
pub fn summary_lines(report: &BatchReport) -> Vec<String> {
    summary_entries(report)
        .into_iter()
        .map(|(_, line)| line)
        .collect()
}
