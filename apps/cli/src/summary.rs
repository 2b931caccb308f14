use std::time::Duration;

use console::style;
use flowcalc_core::StageStats;

use crate::runner::RunReport;

pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    // 59.95s and up would print as "60.0s"
    if secs < 59.95 {
        format!("{:.1}s", secs)
    } else {
        let whole = secs.round() as u64;
        format!("{}m {}s", whole / 60, whole % 60)
    }
}

pub fn format_summary(report: &RunReport, stats: &[StageStats]) -> String {
    let mut output = String::new();
    output.push_str(&format!("{}\n", style("─".repeat(60)).dim()));
    output.push_str(&format!(
        "{} {} events in {} {}\n",
        style("✓").green().bold(),
        report.emitted,
        style(format_duration(report.elapsed)).cyan(),
        style(format!("({} lines, {} skipped)", report.lines, report.skipped)).dim()
    ));

    for s in stats {
        output.push_str(&format!(
            "  {:<18} enriched {}  unchanged {}  failed {}\n",
            style(s.stage).bold(),
            style(s.enriched).green(),
            s.unchanged,
            if s.failed > 0 {
                style(s.failed).yellow()
            } else {
                style(s.failed).dim()
            }
        ));
    }
    output
}
