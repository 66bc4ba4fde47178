//! Run summary rendering

use anyhow::Result;
use owo_colors::OwoColorize;
use std::fmt::Write;
use sweeper::RunSummary;

/// Format a byte count in human-readable binary units
pub fn format_size(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = KIB * 1024;
    const GIB: u64 = MIB * 1024;

    if bytes >= GIB {
        format!("{:.2} GiB", bytes as f64 / GIB as f64)
    } else if bytes >= MIB {
        format!("{:.2} MiB", bytes as f64 / MIB as f64)
    } else if bytes >= KIB {
        format!("{:.2} KiB", bytes as f64 / KIB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Render the summary as colored text
pub fn render_text(summary: &RunSummary) -> String {
    let mut out = String::new();

    let heading = match (summary.dry_run, summary.cancelled) {
        (_, true) => "Snapshot Cleanup Cancelled".yellow().bold().to_string(),
        (true, false) => "Snapshot Cleanup Dry Run Complete".cyan().bold().to_string(),
        (false, false) => "Snapshot Cleanup Complete".green().bold().to_string(),
    };
    let deleted_label = if summary.dry_run { "Would delete" } else { "Deleted" };

    let _ = writeln!(out, "{heading}");
    let _ = writeln!(out, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    let _ = writeln!(
        out,
        "Volumes:             {} processed, {} skipped, {} failed ({} total)",
        summary.volumes_processed,
        summary.volumes_skipped.dimmed(),
        failed(summary.volumes_failed),
        summary.volumes_total
    );
    let _ = writeln!(out, "Snapshots seen:      {}", summary.snapshots_seen);
    let _ = writeln!(out, "Snapshots kept:      {}", summary.snapshots_kept);
    let _ = writeln!(
        out,
        "{:<21}{} (orphaned {}, stale {}, invalid date {})",
        format!("{deleted_label}:"),
        summary.deleted().to_string().yellow(),
        summary.deleted_orphaned,
        summary.deleted_stale,
        summary.deleted_invalid_timestamp
    );
    let _ = writeln!(out, "Space released:      {}", format_size(summary.bytes_deleted).green());
    let _ = writeln!(
        out,
        "Purges:              {} ({} failed)",
        summary.purges,
        failed(summary.purge_failures)
    );
    let _ = writeln!(out, "Deletion failures:   {}", failed(summary.deletion_failures));
    let _ = writeln!(out, "Unparseable dates:   {}", failed(summary.classification_errors));

    if summary.deleted() == 0 && !summary.has_errors() {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", "No snapshots matched - cluster is already clean".dimmed());
    }

    out
}

fn failed(count: u64) -> String {
    if count == 0 {
        count.to_string()
    } else {
        count.red().to_string()
    }
}

/// Render the summary as pretty JSON
pub fn render_json(summary: &RunSummary) -> Result<String> {
    Ok(serde_json::to_string_pretty(summary)?)
}
