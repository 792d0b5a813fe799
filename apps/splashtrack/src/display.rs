//! Terminal rendering for samples, plans, and run progress

use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use console::style;
use splashtrack_types::{NetworkQualitySample, Phase, RunState};
use std::io::Write;
use std::time::Duration;

const BAR_WIDTH: usize = 28;

/// Renders command output in either human or JSON form
#[derive(Debug, Clone)]
pub struct OutputRenderer {
    json: bool,
}

impl OutputRenderer {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    pub fn json(&self) -> bool {
        self.json
    }

    /// Print a network quality sample.
    pub fn render_sample(&self, sample: &NetworkQualitySample) {
        if self.json {
            println!("{}", serde_json::to_string_pretty(sample).unwrap_or_default());
            return;
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec!["Field", "Value"]);
        table.add_row(vec![Cell::new("Tier"), Cell::new(sample.tier)]);
        table.add_row(vec![
            Cell::new("Latency"),
            Cell::new(format!("{:.0} ms", sample.latency_ms)),
        ]);
        table.add_row(vec![
            Cell::new("Est. throughput"),
            Cell::new(format!("{:.0} Mbps", sample.estimated_throughput_mbps)),
        ]);
        table.add_row(vec![Cell::new("Quality"), Cell::new(sample.quality)]);
        table.add_row(vec![Cell::new("Connection"), Cell::new(sample.kind)]);
        table.add_row(vec![
            Cell::new("Captured"),
            Cell::new(sample.captured_at.to_rfc3339()),
        ]);
        println!("{table}");
    }

    /// Print a planned phase list.
    pub fn render_plan(&self, phases: &[Phase]) {
        if self.json {
            println!("{}", serde_json::to_string_pretty(phases).unwrap_or_default());
            return;
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec!["#", "Phase", "Category", "Planned"]);
        for (index, phase) in phases.iter().enumerate() {
            table.add_row(vec![
                Cell::new(index + 1),
                Cell::new(&phase.display_name),
                Cell::new(&phase.category),
                Cell::new(format_duration(phase.planned_duration)),
            ]);
        }
        table.add_row(vec![
            Cell::new(""),
            Cell::new(style("Total").bold().to_string()),
            Cell::new(""),
            Cell::new(format_duration(
                phases.iter().map(|p| p.planned_duration).sum(),
            )),
        ]);
        println!("{table}");
    }

    /// Overwrite the current line with the run's progress.
    pub fn render_tick(&self, state: &RunState) {
        if self.json {
            return;
        }

        let label = state
            .current_phase
            .as_ref()
            .map_or_else(|| "Finishing".to_string(), |p| p.short_display_name.clone());

        let line = format!(
            "{} {:>5.1}%  {}  ({} left)",
            progress_bar(state.overall_progress_percent, BAR_WIDTH),
            state.overall_progress_percent,
            style(label).cyan(),
            format_duration(state.time_remaining),
        );
        print!("\r\x1b[2K{line}");
        let _ = std::io::stdout().flush();
    }

    /// Print the completion line.
    pub fn render_complete(&self, elapsed: Duration) {
        if self.json {
            return;
        }
        println!(
            "\r\x1b[2K{} loading complete in {}",
            style("✓").green().bold(),
            format_duration(elapsed),
        );
    }
}

/// Fixed-width progress bar string.
fn progress_bar(percent: f64, width: usize) -> String {
    let clamped = percent.clamp(0.0, 100.0);
    let filled = ((clamped / 100.0) * width as f64).round() as usize;
    let filled = filled.min(width);
    format!(
        "[{}{}]",
        "=".repeat(filled),
        " ".repeat(width - filled)
    )
}

/// Compact human duration: "850ms", "12.4s", "1m 05s".
fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis < 1000 {
        format!("{millis}ms")
    } else if millis < 60_000 {
        format!("{:.1}s", duration.as_secs_f64())
    } else {
        let total_seconds = duration.as_secs();
        format!("{}m {:02}s", total_seconds / 60, total_seconds % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_bar_bounds() {
        assert_eq!(progress_bar(0.0, 10), "[          ]");
        assert_eq!(progress_bar(50.0, 10), "[=====     ]");
        assert_eq!(progress_bar(100.0, 10), "[==========]");
        // Out-of-range input is clamped
        assert_eq!(progress_bar(150.0, 10), "[==========]");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(850)), "850ms");
        assert_eq!(format_duration(Duration::from_millis(12_400)), "12.4s");
        assert_eq!(format_duration(Duration::from_secs(65)), "1m 05s");
    }
}
