//! Audit report types with JSON persistence.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::audit::{MajorOutcome, MinorOutcome};
use crate::totals::{CreditTotals, SemesterTotals};

/// A complete degree audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Who was audited.
    pub student: StudentSummary,
    /// Per-semester rollups against the major catalog.
    pub semesters: Vec<SemesterTotals>,
    /// Curriculum totals against the major catalog.
    pub totals: CreditTotals,
    pub major: MajorOutcome,
    pub double_major: Option<MajorOutcome>,
    pub minors: Vec<MinorOutcome>,
    /// Major and second major both satisfied. Minors do not affect this.
    pub ok: bool,
}

/// Summary of the audited plan (without the course lists).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentSummary {
    pub major: String,
    pub entry_term: String,
    pub double_major: Option<String>,
    pub minors: Vec<String>,
    pub semester_count: usize,
    pub course_count: usize,
}

impl AuditReport {
    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: AuditReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Every program outcome as `(program, ok)`, major first.
    pub fn program_status(&self) -> Vec<(String, bool)> {
        let mut status = vec![(self.major.program.clone(), self.major.ok)];
        if let Some(dm) = &self.double_major {
            status.push((format!("{} (double major)", dm.program), dm.ok));
        }
        for minor in &self.minors {
            status.push((minor.minor.clone(), minor.ok));
        }
        status
    }
}
