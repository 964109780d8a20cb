//! Formatting utilities for sizes, durations and run summaries.

use owo_colors::OwoColorize;
use std::time::Duration;

/// Format file size in human-readable format.
///
/// ```
/// use poolpack_cli::ui::format_size;
///
/// assert_eq!(format_size(0), "0 B");
/// assert_eq!(format_size(500), "500 B");
/// assert_eq!(format_size(1024), "1.00 KB");
/// ```
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{} {}", size as u64, UNITS[unit_idx])
    } else {
        format!("{:.2} {}", size, UNITS[unit_idx])
    }
}

/// Format duration in human-readable format.
///
/// ```
/// use std::time::Duration;
/// use poolpack_cli::ui::format_duration;
///
/// assert_eq!(format_duration(Duration::from_millis(50)), "50ms");
/// assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
/// assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let total_ms = duration.as_millis();

    if total_ms < 1000 {
        format!("{}ms", total_ms)
    } else if total_ms < 60_000 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        let secs = duration.as_secs();
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

/// Print the artifacts a run left on disk, with their sizes.
///
/// Missing files are skipped.
pub fn print_artifact_summary(artifacts: &[(String, Option<u64>)]) {
    for (name, size) in artifacts {
        let Some(size) = size else { continue };
        if super::colors_enabled() {
            eprintln!(
                "  {} {} {}",
                "▸".blue(),
                name.bright_white().bold(),
                format_size(*size).dimmed()
            );
        } else {
            eprintln!("  ▸ {} {}", name, format_size(*size));
        }
    }
}
