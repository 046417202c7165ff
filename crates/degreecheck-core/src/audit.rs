//! Graduation checks for majors and minors.
//!
//! A major is checked against its published credit limits using the plain
//! catalog-tag totals. A minor runs the allocation engine and the
//! satisfaction evaluator against its requirement specification, then
//! applies a GPA threshold.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::allocation::{allocate_with, Allocation, AllocationOptions};
use crate::evaluation::{evaluate, SatisfactionReport};
use crate::model::{Catalog, MajorRequirements, RequirementSpec, TakenCourse};
use crate::totals::CreditTotals;

/// One graduation check for a major, in the order checks are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MajorCheck {
    University,
    Internship,
    Total,
    Science,
    Engineering,
    Ects,
    Required,
    Core,
    Area,
    Free,
    Gpa,
}

impl fmt::Display for MajorCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MajorCheck::University => "university",
            MajorCheck::Internship => "internship",
            MajorCheck::Total => "total",
            MajorCheck::Science => "science",
            MajorCheck::Engineering => "engineering",
            MajorCheck::Ects => "ects",
            MajorCheck::Required => "required",
            MajorCheck::Core => "core",
            MajorCheck::Area => "area",
            MajorCheck::Free => "free",
            MajorCheck::Gpa => "gpa",
        };
        f.write_str(name)
    }
}

/// A failed major check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shortfall {
    pub check: MajorCheck,
    pub have: f64,
    pub need: f64,
    /// The missing course, for course-presence checks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course: Option<String>,
}

impl fmt::Display for Shortfall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.check, &self.course) {
            (MajorCheck::Internship, Some(code)) => write!(f, "internship: {code} not taken"),
            (MajorCheck::Gpa, _) => write!(f, "gpa: {:.2}/{:.2}", self.have, self.need),
            (check, _) => write!(f, "{check}: {}/{} credits", self.have, self.need),
        }
    }
}

/// Result of checking a major (or a second major).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MajorOutcome {
    pub program: String,
    pub ok: bool,
    /// Failed checks in report order.
    pub shortfalls: Vec<Shortfall>,
    /// GPA used for the check, when any graded credit exists.
    pub gpa: Option<f64>,
    #[serde(default)]
    pub diagnostics: Vec<String>,
}

impl MajorOutcome {
    /// Outcome for a major whose limits could not be found.
    pub fn missing_data(program: &str, reason: impl Into<String>) -> Self {
        Self {
            program: program.to_string(),
            ok: false,
            shortfalls: Vec::new(),
            gpa: None,
            diagnostics: vec![reason.into()],
        }
    }
}

/// Check curriculum totals against a major's graduation limits.
///
/// Every failing check is listed. The GPA check only applies once some
/// credit has been graded.
pub fn check_major(
    totals: &CreditTotals,
    limits: &MajorRequirements,
    taken: &[TakenCourse],
    gpa_threshold: f64,
) -> MajorOutcome {
    let below = |check: MajorCheck, have: f64, need: f64| {
        (have < need).then_some(Shortfall {
            check,
            have,
            need,
            course: None,
        })
    };

    let mut shortfalls: Vec<Shortfall> = Vec::new();
    shortfalls.extend(below(MajorCheck::University, totals.university, limits.university));

    if let Some(code) = &limits.internship_course {
        if !taken.iter().any(|c| &c.code == code && !c.is_failed()) {
            shortfalls.push(Shortfall {
                check: MajorCheck::Internship,
                have: 0.0,
                need: 1.0,
                course: Some(code.clone()),
            });
        }
    }

    shortfalls.extend(
        [
            below(MajorCheck::Total, totals.total, limits.total),
            below(MajorCheck::Science, totals.science, limits.science),
            below(MajorCheck::Engineering, totals.engineering, limits.engineering),
            below(MajorCheck::Ects, totals.ects, limits.ects),
            below(MajorCheck::Required, totals.required, limits.required),
            below(MajorCheck::Core, totals.core, limits.core),
            below(MajorCheck::Area, totals.area, limits.area),
            below(MajorCheck::Free, totals.free, limits.free),
        ]
        .into_iter()
        .flatten(),
    );

    let gpa = totals.gpa_if_graded();
    if let Some(gpa) = gpa {
        shortfalls.extend(below(MajorCheck::Gpa, gpa, gpa_threshold));
    }

    MajorOutcome {
        program: limits.major.clone(),
        ok: shortfalls.is_empty(),
        shortfalls,
        gpa,
        diagnostics: Vec::new(),
    }
}

/// Result of auditing one minor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinorOutcome {
    pub minor: String,
    pub ok: bool,
    pub allocation: Option<Allocation>,
    pub report: Option<SatisfactionReport>,
    pub gpa: Option<f64>,
    pub gpa_threshold: f64,
    pub gpa_ok: bool,
    #[serde(default)]
    pub diagnostics: Vec<String>,
}

impl MinorOutcome {
    /// Outcome for a minor with no usable specification or catalog.
    pub fn missing_data(minor: &str, gpa_threshold: f64) -> Self {
        Self {
            minor: minor.to_string(),
            ok: false,
            allocation: None,
            report: None,
            gpa: None,
            gpa_threshold,
            gpa_ok: false,
            diagnostics: vec!["missing minor data".to_string()],
        }
    }
}

/// Allocate, evaluate and GPA-check one minor.
///
/// `gpa` is the student's overall GPA; `None` (nothing graded yet) passes
/// the threshold.
pub fn audit_minor(
    minor: &str,
    spec: &RequirementSpec,
    catalog: &Catalog,
    taken: &[TakenCourse],
    gpa: Option<f64>,
    gpa_threshold: f64,
    options: &AllocationOptions,
) -> MinorOutcome {
    let allocation = allocate_with(taken, catalog, spec, options);
    let report = evaluate(&allocation, catalog, spec);
    let gpa_ok = gpa.map_or(true, |g| g >= gpa_threshold);

    let mut diagnostics = report.diagnostics.clone();
    if !gpa_ok {
        diagnostics.push(format!(
            "GPA {:.2} is below the {:.2} required for {}",
            gpa.unwrap_or_default(),
            gpa_threshold,
            minor
        ));
    }

    MinorOutcome {
        minor: minor.to_string(),
        ok: report.ok && gpa_ok,
        allocation: Some(allocation),
        report: Some(report),
        gpa,
        gpa_threshold,
        gpa_ok,
        diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, CategoryKey, CourseRecord, RequirementCategory};

    fn limits() -> MajorRequirements {
        MajorRequirements {
            major: "CS".into(),
            total: 12.0,
            ects: 24.0,
            university: 3.0,
            required: 3.0,
            core: 3.0,
            internship_course: Some("CS395".into()),
            ..Default::default()
        }
    }

    fn totals(total: f64, gpa_points: f64, gpa_credits: f64) -> CreditTotals {
        CreditTotals {
            total,
            ects: total * 2.0,
            university: 3.0,
            required: 3.0,
            core: 3.0,
            gpa_points,
            gpa_credits,
            ..Default::default()
        }
    }

    #[test]
    fn major_passes_when_all_limits_met() {
        let taken = vec![TakenCourse::new("CS395", Some("S"))];
        let outcome = check_major(&totals(12.0, 36.0, 12.0), &limits(), &taken, 2.0);
        assert!(outcome.ok, "{:?}", outcome.shortfalls);
        assert_eq!(outcome.gpa, Some(3.0));
    }

    #[test]
    fn shortfalls_listed_in_check_order() {
        let taken = vec![TakenCourse::new("CS395", Some("F"))];
        let outcome = check_major(&totals(9.0, 9.0, 9.0), &limits(), &taken, 2.0);
        assert!(!outcome.ok);
        let checks: Vec<MajorCheck> = outcome.shortfalls.iter().map(|s| s.check).collect();
        assert_eq!(
            checks,
            vec![MajorCheck::Internship, MajorCheck::Total, MajorCheck::Ects, MajorCheck::Gpa]
        );
        assert_eq!(outcome.shortfalls[0].to_string(), "internship: CS395 not taken");
        assert_eq!(outcome.shortfalls[1].to_string(), "total: 9/12 credits");
        assert_eq!(outcome.shortfalls[3].to_string(), "gpa: 1.00/2.00");
    }

    #[test]
    fn gpa_check_skipped_without_graded_credit() {
        let taken = vec![TakenCourse::new("CS395", None)];
        let outcome = check_major(&totals(12.0, 0.0, 0.0), &limits(), &taken, 2.0);
        assert!(outcome.ok);
        assert_eq!(outcome.gpa, None);
    }

    #[test]
    fn double_major_limits_raise_the_bar() {
        let taken = vec![TakenCourse::new("CS395", None)];
        let dm = limits().for_double_major(30.0, 60.0);
        let outcome = check_major(&totals(12.0, 0.0, 0.0), &dm, &taken, 2.0);
        let checks: Vec<MajorCheck> = outcome.shortfalls.iter().map(|s| s.check).collect();
        assert_eq!(checks, vec![MajorCheck::Total, MajorCheck::Ects]);
    }

    fn minor_fixture() -> (Catalog, RequirementSpec) {
        let catalog: Catalog = [("BA101", Category::Required), ("BA201", Category::Core)]
            .into_iter()
            .map(|(code, category)| CourseRecord {
                code: code.into(),
                name: String::new(),
                credit_su: 3.0,
                credit_ects: 6.0,
                category,
                basic_science: 0.0,
                engineering: 0.0,
            })
            .collect();
        let spec = RequirementSpec::new("Business Analytics")
            .with_category(CategoryKey::Required, RequirementCategory::new(1, 3.0))
            .with_category(CategoryKey::Core, RequirementCategory::new(1, 3.0));
        (catalog, spec)
    }

    #[test]
    fn minor_requires_requirements_and_gpa() {
        let (catalog, spec) = minor_fixture();
        let taken = vec![
            TakenCourse::new("BA101", Some("A")),
            TakenCourse::new("BA201", Some("B")),
        ];
        let options = AllocationOptions::default();

        let passed = audit_minor("BA-MINOR", &spec, &catalog, &taken, Some(3.5), 2.72, &options);
        assert!(passed.ok);
        assert!(passed.gpa_ok);

        let low = audit_minor("BA-MINOR", &spec, &catalog, &taken, Some(2.6), 2.72, &options);
        assert!(!low.ok);
        assert!(low.report.as_ref().unwrap().ok);
        assert!(low.diagnostics[0].contains("below the 2.72"));

        let ungraded = audit_minor("BA-MINOR", &spec, &catalog, &taken, None, 2.72, &options);
        assert!(ungraded.ok);
    }

    #[test]
    fn minor_missing_data() {
        let outcome = MinorOutcome::missing_data("X-MINOR", 2.72);
        assert!(!outcome.ok);
        assert_eq!(outcome.diagnostics, vec!["missing minor data"]);
    }
}
