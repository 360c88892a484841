//! Console and JSON reporting of a preprocessing run.

use popp::{CountReport, Diagnostic, Report};
use serde::Serialize;

/// What a run produced, for `--json`.
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub result: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expanded: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unexpandable: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub references: Option<usize>,
    pub warnings: usize,
    pub diagnostics: &'a [Diagnostic],
}

impl<'a> JsonReport<'a> {
    pub fn from_process(
        result: i32,
        report: Option<&Report>,
        diagnostics: &'a [Diagnostic],
    ) -> Self {
        JsonReport {
            result,
            expanded: report.map(|r| r.expanded),
            unexpandable: report.map(|r| r.unexpandable),
            references: None,
            warnings: warning_count(diagnostics),
            diagnostics,
        }
    }

    pub fn from_count(
        result: i32,
        report: Option<&CountReport>,
        diagnostics: &'a [Diagnostic],
    ) -> Self {
        JsonReport {
            result,
            expanded: None,
            unexpandable: None,
            references: report.map(|r| r.references),
            warnings: warning_count(diagnostics),
            diagnostics,
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| {
            format!("{{\"result\": {}, \"error\": \"{}\"}}", self.result, e)
        })
    }
}

fn warning_count(diagnostics: &[Diagnostic]) -> usize {
    diagnostics.iter().filter(|d| d.is_warning()).count()
}

/// Lines printed after a successful expansion.
pub fn process_summary(report: &Report) -> Vec<String> {
    let mut lines = vec![format!("Done - Expanded {} references", report.expanded)];
    if report.unexpandable > 0 {
        lines.push(format!(
            "Failed to expand {} references",
            report.unexpandable
        ));
    }
    lines
}

/// Line printed after counting.
pub fn count_summary(report: &CountReport) -> String {
    format!("{} references were found.", report.references)
}

pub fn print_diagnostics(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        eprintln!("{}", diagnostic);
    }
}
