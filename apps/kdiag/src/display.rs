//! Output rendering and formatting

use comfy_table::{presets::UTF8_FULL, Attribute, Cell, ContentArrangement, Table};
use console::Style;
use kdiag_handler::HandleOutcome;
use kdiag_metrics::ErrorMetrics;
use kdiag_types::ActionId;
use serde_json::json;
use std::io;

/// Output renderer for the end-of-run summary
#[derive(Clone)]
pub struct OutputRenderer {
    json_output: bool,
}

impl OutputRenderer {
    pub fn new(json_output: bool) -> Self {
        Self { json_output }
    }

    /// Render error counts and what happened to each report
    pub fn render_summary(
        &self,
        metrics: &ErrorMetrics,
        outcomes: &[HandleOutcome],
    ) -> io::Result<()> {
        if self.json_output {
            Self::render_json(metrics, outcomes)
        } else {
            Self::render_table(metrics, outcomes);
            Ok(())
        }
    }

    fn render_json(metrics: &ErrorMetrics, outcomes: &[HandleOutcome]) -> io::Result<()> {
        let value = json!({
            "total": metrics.total(),
            "counts": metrics.summary(),
            "outcomes": outcomes.iter().map(|o| outcome_label(*o)).collect::<Vec<_>>(),
        });
        let json = serde_json::to_string_pretty(&value).map_err(io::Error::other)?;
        println!("{json}");
        Ok(())
    }

    fn render_table(metrics: &ErrorMetrics, outcomes: &[HandleOutcome]) {
        let summary = metrics.summary();
        if summary.is_empty() {
            println!("No errors recorded.");
            return;
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec![
            Cell::new("Kind").add_attribute(Attribute::Bold),
            Cell::new("Count").add_attribute(Attribute::Bold),
        ]);
        for (kind, count) in &summary {
            table.add_row(vec![Cell::new(kind.as_str()), Cell::new(count)]);
        }
        table.add_row(vec![
            Cell::new("Total").add_attribute(Attribute::Bold),
            Cell::new(metrics.total()).add_attribute(Attribute::Bold),
        ]);
        println!("{table}");

        let suppressed = outcomes
            .iter()
            .filter(|o| matches!(o, HandleOutcome::Suppressed))
            .count();
        if suppressed > 0 {
            let dim = Style::new().dim();
            println!(
                "{}",
                dim.apply_to(format!("{suppressed} repeated report(s) were not shown"))
            );
        }
    }
}

fn outcome_label(outcome: HandleOutcome) -> String {
    match outcome {
        HandleOutcome::Suppressed => "suppressed".to_string(),
        HandleOutcome::Dismissed => "dismissed".to_string(),
        HandleOutcome::Resolved(ActionId::Custom(index)) => format!("resolved:custom:{index}"),
        HandleOutcome::Resolved(id) => {
            format!("resolved:{}", id.builtin_label().unwrap_or("unknown"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_labels() {
        assert_eq!(outcome_label(HandleOutcome::Suppressed), "suppressed");
        assert_eq!(
            outcome_label(HandleOutcome::Resolved(ActionId::Custom(1))),
            "resolved:custom:1"
        );
        assert_eq!(
            outcome_label(HandleOutcome::Resolved(ActionId::ViewLogs)),
            "resolved:View Logs"
        );
    }
}
