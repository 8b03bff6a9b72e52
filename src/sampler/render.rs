use std::fmt::Write;

use colored::Colorize;

use super::{SamplerView, Status};

/// Render the live view as terminal text.
pub fn render(view: &SamplerView) -> String {
    let mut out = String::new();

    let status = match &view.status {
        Status::Waiting => "● waiting for first response".yellow().to_string(),
        Status::Measuring { total, last_rtt_ms } => format!(
            "● measuring (#{total}, latest {last_rtt_ms:.2}ms)"
        )
        .green()
        .to_string(),
        Status::Error { message } => format!("● connection error: {message}").red().to_string(),
    };
    let _ = writeln!(out, "client {}  {}", view.client_id.bold(), status);

    let Some(stats) = &view.stats else {
        return out;
    };

    let _ = writeln!(
        out,
        "RTT over last {} samples (ms)",
        stats.window_size
    );
    let rows = [
        ("current", stats.current),
        ("mean", stats.mean),
        ("median", stats.median),
        ("std dev", stats.std_dev),
        ("min", stats.min),
        ("max", stats.max),
    ];
    for (label, value) in rows {
        let _ = writeln!(out, "  {label:<8} {value:>10.2}");
    }
    let _ = writeln!(out, "  {:<8} {:>10}", "total", stats.total);
    let _ = writeln!(out, "  {:<8} {:>10}", "window", stats.window_size);

    let _ = writeln!(out, "recent");
    for entry in &view.recent {
        let _ = writeln!(out, "  #{}: {:.2}ms", entry.seq, entry.rtt_ms);
    }

    out
}
