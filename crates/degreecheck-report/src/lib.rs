//! degreecheck-report — Rendering audit reports for people and tools.

pub mod html;
pub mod markdown;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};

use degreecheck_core::report::AuditReport;

/// Output format for a rendered audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
    Markdown,
    Html,
}

impl ReportFormat {
    /// File extension used when saving this format.
    pub fn extension(self) -> &'static str {
        match self {
            ReportFormat::Text => "txt",
            ReportFormat::Json => "json",
            ReportFormat::Markdown => "md",
            ReportFormat::Html => "html",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportFormat::Text => write!(f, "text"),
            ReportFormat::Json => write!(f, "json"),
            ReportFormat::Markdown => write!(f, "markdown"),
            ReportFormat::Html => write!(f, "html"),
        }
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            "markdown" | "md" => Ok(ReportFormat::Markdown),
            "html" => Ok(ReportFormat::Html),
            other => Err(format!("unknown report format: {other}")),
        }
    }
}

/// Render a report to a string. `Text` renders as markdown, which reads
/// fine in a terminal.
pub fn render(report: &AuditReport, format: ReportFormat) -> Result<String> {
    Ok(match format {
        ReportFormat::Json => {
            serde_json::to_string_pretty(report).context("failed to serialize report")?
        }
        ReportFormat::Text | ReportFormat::Markdown => markdown::generate_markdown(report),
        ReportFormat::Html => html::generate_html(report),
    })
}

/// File name for a saved report, e.g. `degreecheck-CS.html`.
pub fn report_file_name(report: &AuditReport, format: ReportFormat) -> String {
    format!("degreecheck-{}.{}", report.student.major, format.extension())
}

/// Render a report into `dir`, creating it if needed. Returns the written path.
pub fn write_report(report: &AuditReport, format: ReportFormat, dir: &Path) -> Result<PathBuf> {
    let path = dir.join(report_file_name(report, format));
    match format {
        ReportFormat::Json => report.save_json(&path)?,
        ReportFormat::Html => html::write_html_report(report, &path)?,
        ReportFormat::Text | ReportFormat::Markdown => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
            std::fs::write(&path, render(report, format)?)
                .with_context(|| format!("failed to write report to {}", path.display()))?;
        }
    }
    Ok(path)
}
