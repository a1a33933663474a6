use std::fmt::Write;

use crate::mem::stats::UcmStats;

const WIDTH: usize = 48;

fn rule(out: &mut String, left: char, right: char) {
    let _ = writeln!(out, "{}{}{}", left, "═".repeat(WIDTH), right);
}

fn row(out: &mut String, text: &str) {
    let _ = writeln!(out, "║ {:<width$} ║", text, width = WIDTH - 2);
}

/// Box-drawn summary of a run's memory traffic.
pub fn render_text(stats: &UcmStats) -> String {
    let mut out = String::new();
    rule(&mut out, '╔', '╗');
    row(&mut out, "       MEMORY HIERARCHY STATISTICS");
    rule(&mut out, '╠', '╣');
    row(&mut out, &format!("Total Memory Accesses: {:>8}", stats.total_accesses));
    row(&mut out, &format!("Total Cache Hits:      {:>8}", stats.total_hits));
    row(&mut out, &format!("Total Cache Misses:    {:>8}", stats.total_misses));

    for level in &stats.levels {
        rule(&mut out, '╠', '╣');
        row(
            &mut out,
            &format!("{} Cache ({} lines, {} cycles):", level.name, level.lines, level.latency),
        );
        row(&mut out, &format!("  Hits: {:>8}   Misses: {:>8}", level.hits, level.misses));
        if let Some(rate) = level.hit_rate_percent() {
            row(&mut out, &format!("  Hit Rate: {:.2}%", rate));
        }
    }

    rule(&mut out, '╠', '╣');
    row(&mut out, &format!("Overall Hit Rate: {:.2}%", stats.hit_rate() * 100.0));
    row(&mut out, &format!("Total Time (cycles): {}", stats.total_time));
    if let Some(avg) = stats.avg_time_per_access() {
        row(&mut out, &format!("Average Time per Access: {:.2} cycles", avg));
    }
    rule(&mut out, '╚', '╝');
    out
}

pub fn render_json(stats: &UcmStats) -> serde_json::Result<String> {
    serde_json::to_string_pretty(stats)
}
