//! Central audit orchestrator.
//!
//! Loads the programs a plan names, rolls up semester totals, checks the
//! major (and any second major) against its limits and audits each minor.

use std::collections::BTreeMap;

use anyhow::Result;
use chrono::Utc;
use uuid::Uuid;

use crate::allocation::AllocationOptions;
use crate::audit::{audit_minor, check_major, MajorOutcome, MinorOutcome};
use crate::config::DegreecheckConfig;
use crate::error::DataError;
use crate::model::{Catalog, TakenCourse};
use crate::plan::{Plan, StudentProgram};
use crate::report::{AuditReport, StudentSummary};
use crate::totals::{curriculum_totals, semester_totals, CreditTotals};
use crate::traits::{CourseSource, ProgramData};

/// Configuration for the audit engine.
#[derive(Debug, Clone)]
pub struct AuditEngineConfig {
    pub allocation: AllocationOptions,
    pub major_gpa_threshold: f64,
    pub minor_gpa_threshold: f64,
    pub minor_gpa_overrides: BTreeMap<String, f64>,
    pub double_major_extra_su: f64,
    pub double_major_extra_ects: f64,
}

impl Default for AuditEngineConfig {
    fn default() -> Self {
        Self::from(&DegreecheckConfig::default())
    }
}

impl From<&DegreecheckConfig> for AuditEngineConfig {
    fn from(config: &DegreecheckConfig) -> Self {
        Self {
            allocation: AllocationOptions {
                retake_policy: config.retake_policy,
            },
            major_gpa_threshold: config.major_gpa_threshold,
            minor_gpa_threshold: config.minor_gpa_threshold,
            minor_gpa_overrides: config.minor_gpa_overrides.clone(),
            double_major_extra_su: config.double_major_extra_su,
            double_major_extra_ects: config.double_major_extra_ects,
        }
    }
}

impl AuditEngineConfig {
    fn minor_gpa_for(&self, minor: &str) -> f64 {
        self.minor_gpa_overrides
            .get(minor)
            .copied()
            .unwrap_or(self.minor_gpa_threshold)
    }
}

/// The central audit engine.
pub struct AuditEngine<'a> {
    data: &'a dyn ProgramData,
    config: AuditEngineConfig,
}

impl<'a> AuditEngine<'a> {
    pub fn new(data: &'a dyn ProgramData, config: AuditEngineConfig) -> Self {
        Self { data, config }
    }

    /// Audit a loaded plan.
    pub fn run(&self, plan: &Plan) -> Result<AuditReport> {
        self.audit(&plan.student, plan)
    }

    /// Audit the programs in `student` against the courses from `source`.
    ///
    /// Fails only when the major's catalog cannot be loaded; missing data for
    /// a second major or a minor marks that program incomplete instead.
    pub fn audit(&self, student: &StudentProgram, source: &dyn CourseSource) -> Result<AuditReport> {
        tracing::info!(
            "auditing {} (entry term {}) with {} minor(s)",
            student.major,
            student.entry_term,
            student.minors.len()
        );
        let catalog = self.data.catalog(&student.major)?;
        let semesters = source.semesters();
        let taken = source.taken_courses();

        let semester_rollups: Vec<_> = semesters
            .iter()
            .map(|(term, courses)| semester_totals(term, courses, &catalog))
            .collect();
        let totals = curriculum_totals(&semester_rollups);

        let major = self.check_program(&student.major, &student.entry_term, &totals, &taken, false)?;

        let double_major = match &student.double_major {
            Some(dm) => Some(self.check_double_major(dm, student, &semesters)?),
            None => None,
        };

        let gpa = totals.gpa_if_graded();
        let minors: Vec<MinorOutcome> = student
            .minors
            .iter()
            .map(|minor| self.audit_minor(minor, &taken, gpa))
            .collect();

        let ok = major.ok && double_major.as_ref().map_or(true, |dm| dm.ok);

        tracing::info!(
            "audited {}: major {}, {} minor(s), {} of {} courses",
            student.major,
            if major.ok { "complete" } else { "incomplete" },
            minors.len(),
            taken.iter().filter(|c| catalog.contains(&c.code)).count(),
            taken.len()
        );

        Ok(AuditReport {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            student: StudentSummary {
                major: student.major.clone(),
                entry_term: student.entry_term.clone(),
                double_major: student.double_major.clone(),
                minors: student.minors.clone(),
                semester_count: semesters.len(),
                course_count: taken.len(),
            },
            semesters: semester_rollups,
            totals,
            major,
            double_major,
            minors,
            ok,
        })
    }

    fn check_program(
        &self,
        program: &str,
        entry_term: &str,
        totals: &CreditTotals,
        taken: &[TakenCourse],
        as_double_major: bool,
    ) -> Result<MajorOutcome> {
        let Some(limits) = self.data.major_requirements(program, entry_term)? else {
            tracing::warn!("no graduation requirements for {} ({})", program, entry_term);
            return Ok(MajorOutcome::missing_data(
                program,
                format!("no graduation requirements published for {program} ({entry_term})"),
            ));
        };
        let limits = if as_double_major {
            limits.for_double_major(
                self.config.double_major_extra_su,
                self.config.double_major_extra_ects,
            )
        } else {
            limits
        };
        Ok(check_major(totals, &limits, taken, self.config.major_gpa_threshold))
    }

    fn check_double_major(
        &self,
        program: &str,
        student: &StudentProgram,
        semesters: &[(String, Vec<TakenCourse>)],
    ) -> Result<MajorOutcome> {
        let catalog = match self.data.catalog(program) {
            Ok(catalog) => catalog,
            Err(e) => return Ok(missing_catalog(program, e)),
        };
        let rollups: Vec<_> = semesters
            .iter()
            .map(|(term, courses)| semester_totals(term, courses, &catalog))
            .collect();
        let totals = curriculum_totals(&rollups);
        let taken: Vec<_> = semesters.iter().flat_map(|(_, c)| c.iter().cloned()).collect();
        self.check_program(program, &student.entry_term, &totals, &taken, true)
    }

    fn audit_minor(
        &self,
        minor: &str,
        taken: &[TakenCourse],
        gpa: Option<f64>,
    ) -> MinorOutcome {
        let threshold = self.config.minor_gpa_for(minor);
        let spec = match self.data.minor_spec(minor) {
            Ok(Some(spec)) => spec,
            Ok(None) => {
                tracing::warn!("no requirement specification for minor {}", minor);
                return MinorOutcome::missing_data(minor, threshold);
            }
            Err(e) => {
                tracing::warn!("failed to load minor {}: {:#}", minor, e);
                return MinorOutcome::missing_data(minor, threshold);
            }
        };
        let catalog: Catalog = match self.data.catalog(minor) {
            Ok(catalog) if !catalog.is_empty() => catalog,
            Ok(_) => {
                tracing::warn!("empty catalog for minor {}", minor);
                return MinorOutcome::missing_data(minor, threshold);
            }
            Err(e) => {
                tracing::warn!("failed to load catalog for minor {}: {:#}", minor, e);
                return MinorOutcome::missing_data(minor, threshold);
            }
        };
        tracing::debug!("auditing minor {} against {} catalog courses", minor, catalog.len());
        audit_minor(minor, &spec, &catalog, taken, gpa, threshold, &self.config.allocation)
    }
}

fn missing_catalog(program: &str, err: anyhow::Error) -> MajorOutcome {
    let reason = match err.downcast_ref::<DataError>() {
        Some(data_err) if data_err.is_missing() => data_err.to_string(),
        _ => format!("{err:#}"),
    };
    tracing::warn!("cannot check {}: {}", program, reason);
    MajorOutcome::missing_data(program, reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocation::RetakePolicy;
    use crate::model::{
        Category, CategoryKey, CourseRecord, MajorRequirements, RequirementCategory,
        RequirementSpec,
    };
    use crate::traits::InMemoryData;

    fn record(code: &str, credit: f64, category: Category) -> CourseRecord {
        CourseRecord {
            code: code.into(),
            name: String::new(),
            credit_su: credit,
            credit_ects: credit * 2.0,
            category,
            basic_science: 0.0,
            engineering: 0.0,
        }
    }

    fn data() -> InMemoryData {
        let cs: Catalog = vec![
            record("CS201", 3.0, Category::Required),
            record("CS210", 3.0, Category::Core),
            record("HUM201", 3.0, Category::University),
        ]
        .into_iter()
        .collect();
        let ba: Catalog = vec![
            record("CS201", 3.0, Category::Required),
            record("BA301", 3.0, Category::Core),
        ]
        .into_iter()
        .collect();
        InMemoryData::default()
            .with_catalog("CS", cs.clone())
            .with_catalog("MATH", cs)
            .with_catalog("BA-MINOR", ba)
            .with_minor(
                "BA-MINOR",
                RequirementSpec::new("Business Analytics")
                    .with_category(CategoryKey::Required, RequirementCategory::new(1, 3.0))
                    .with_category(CategoryKey::Core, RequirementCategory::new(1, 3.0)),
            )
            .with_major(MajorRequirements {
                major: "CS".into(),
                total: 9.0,
                ects: 18.0,
                university: 3.0,
                ..Default::default()
            })
            .with_major(MajorRequirements {
                major: "MATH".into(),
                total: 9.0,
                ..Default::default()
            })
    }

    fn plan(courses: &str, extra: &str) -> Plan {
        Plan::parse(&format!(
            "[student]\nmajor = \"CS\"\nentry_term = \"202301\"\n{extra}\n\n[[semesters]]\nterm = \"Fall\"\ncourses = [{courses}]\n"
        ))
        .unwrap()
    }

    #[test]
    fn complete_major_with_minor() {
        let data = data();
        let engine = AuditEngine::new(&data, AuditEngineConfig::default());
        let report = engine
            .run(&plan(
                r#"{ code = "CS201", grade = "A" }, { code = "CS210", grade = "A" }, { code = "HUM201", grade = "A" }, { code = "BA301", grade = "A" }"#,
                r#"minors = ["BA-MINOR"]"#,
            ))
            .unwrap();

        assert!(report.ok);
        assert!(report.major.ok);
        assert_eq!(report.totals.total, 9.0);
        assert_eq!(report.student.course_count, 4);
        assert_eq!(report.semesters.len(), 1);
        assert_eq!(report.minors.len(), 1);
        assert!(report.minors[0].ok, "{:?}", report.minors[0].diagnostics);
    }

    #[test]
    fn minors_do_not_affect_overall_status() {
        let data = data();
        let engine = AuditEngine::new(&data, AuditEngineConfig::default());
        let report = engine
            .run(&plan(
                r#""CS201", "CS210", "HUM201""#,
                r#"minors = ["BA-MINOR", "GHOST-MINOR"]"#,
            ))
            .unwrap();
        assert!(report.ok);
        assert!(!report.minors[0].ok);
        assert_eq!(report.minors[1].diagnostics, vec!["missing minor data"]);
    }

    #[test]
    fn double_major_uses_raised_limits() {
        let data = data();
        let engine = AuditEngine::new(&data, AuditEngineConfig::default());
        let report = engine
            .run(&plan(r#""CS201", "CS210", "HUM201""#, r#"double_major = "MATH""#))
            .unwrap();
        assert!(report.major.ok);
        let dm = report.double_major.as_ref().unwrap();
        assert!(!dm.ok);
        assert_eq!(dm.shortfalls[0].need, 39.0);
        assert!(!report.ok);
    }

    #[test]
    fn missing_major_limits_is_incomplete() {
        let data = InMemoryData::default().with_catalog(
            "CS",
            vec![record("CS201", 3.0, Category::Required)].into_iter().collect(),
        );
        let engine = AuditEngine::new(&data, AuditEngineConfig::default());
        let report = engine.run(&plan(r#""CS201""#, "")).unwrap();
        assert!(!report.ok);
        assert!(report.major.diagnostics[0].contains("no graduation requirements"));
    }

    #[test]
    fn config_carries_retake_policy_and_overrides() {
        let config = DegreecheckConfig {
            retake_policy: RetakePolicy::CountEach,
            ..Default::default()
        };
        let engine_config = AuditEngineConfig::from(&config);
        assert_eq!(engine_config.allocation.retake_policy, RetakePolicy::CountEach);
        assert_eq!(engine_config.minor_gpa_for("ENTREP-MINOR"), 2.50);
        assert_eq!(engine_config.minor_gpa_for("BA-MINOR"), 2.72);
    }
}
