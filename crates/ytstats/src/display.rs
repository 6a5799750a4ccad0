//! Plain-text rendering of an analysis report

use crate::analysis::AnalysisReport;
use std::fmt::Write;

/// Summary table, followed by any skipped statistics batches
pub fn format_report(report: &AnalysisReport) -> String {
    let mut out = String::new();

    let Some(summary) = report.summary() else {
        let _ = writeln!(
            out,
            "No video statistics available for {}.",
            report.channel.title
        );
        write_skipped(&mut out, report);
        return out;
    };

    let rows = [
        ("Channel", report.channel.title.clone()),
        ("Channel ID", report.channel.channel_id.clone()),
        ("Requested", report.requested.to_string()),
        ("Video IDs collected", report.video_ids_collected.to_string()),
        ("Videos analysed", summary.videos.to_string()),
        ("Total views", group_thousands(summary.total_views)),
        ("Mean views", format!("{:.1}", summary.mean_views)),
        (
            "Most viewed",
            format!(
                "{} ({} views)",
                summary.most_viewed_title,
                group_thousands(summary.most_viewed_count)
            ),
        ),
        (
            "First upload",
            summary.first_upload.format("%Y-%m-%d").to_string(),
        ),
        (
            "Last upload",
            summary.last_upload.format("%Y-%m-%d").to_string(),
        ),
        ("Moving average window", summary.window.to_string()),
    ];

    let width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    for (label, value) in rows {
        let _ = writeln!(out, "{label:<width$}  {value}");
    }

    write_skipped(&mut out, report);
    out
}

fn write_skipped(out: &mut String, report: &AnalysisReport) {
    if report.is_complete() {
        return;
    }
    let _ = writeln!(
        out,
        "\nSkipped {} statistics batch(es), {} videos:",
        report.failed_batches.len(),
        report.skipped_videos()
    );
    for batch in &report.failed_batches {
        let _ = writeln!(
            out,
            "  batch {} ({} videos from {}): {}",
            batch.index + 1,
            batch.size,
            batch.first_video_id,
            batch.message
        );
    }
}

/// `1234567` as `1,234,567`
fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}
