use std::fmt::Write;

use crate::types::Plan;

/// Renders one line per plan entry:
/// `2 bar(s) -> 2x722mm, 1x210mm  (used 1654 mm, scrap 346 mm)`.
pub fn render_plan(plan: &Plan) -> String {
    let mut out = String::new();
    for e in &plan.entries {
        let breakdown = e
            .pattern
            .counts
            .iter()
            .zip(&plan.piece_lengths)
            .filter(|(&c, _)| c > 0)
            .map(|(&c, &l)| format!("{c}x{l}mm"))
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(
            out,
            "{} bar(s) -> {}  (used {} mm, scrap {} mm)",
            e.count, breakdown, e.used, e.scrap
        );
    }
    out
}

pub fn render_summary(plan: &Plan) -> String {
    let bars = plan.bar_count();
    format!(
        "Summary: {} bar{} used, {} mm scrap ({:.1}% waste)",
        bars,
        if bars == 1 { "" } else { "s" },
        plan.total_scrap(),
        plan.waste_percent(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Pattern, PlanEntry};

    fn sample_plan() -> Plan {
        let lengths = vec![722, 210, 140];
        let pattern = Pattern::new(vec![2, 1, 0]);
        let used = pattern.used_length(&lengths);
        Plan {
            entries: vec![PlanEntry {
                scrap: 2000 - used,
                used,
                pattern,
                count: 2,
            }],
            stock_length: 2000,
            piece_lengths: lengths,
        }
    }

    #[test]
    fn test_render_breakdown_skips_zero_counts() {
        let output = render_plan(&sample_plan());
        assert!(output.contains("2x722mm"));
        assert!(output.contains("1x210mm"));
        assert!(!output.contains("140mm"));
        assert!(output.contains("used 1654 mm"));
        assert!(output.contains("scrap 346 mm"));
    }

    #[test]
    fn test_render_empty_plan() {
        let plan = Plan {
            entries: vec![],
            stock_length: 2000,
            piece_lengths: vec![],
        };
        assert!(render_plan(&plan).is_empty());
        assert!(render_summary(&plan).contains("0 bars"));
    }

    #[test]
    fn test_summary_singular_bar() {
        let mut plan = sample_plan();
        plan.entries[0].count = 1;
        let summary = render_summary(&plan);
        assert!(summary.contains("1 bar used"), "{summary}");
    }
}
