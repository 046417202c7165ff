//! Core trait definitions for program data and course sources.
//!
//! The audit engine never reaches for global lookups: catalogs, requirement
//! specifications and the student's courses are injected through these
//! traits. `parser::DataDir` and `plan::Plan` are the file-backed
//! implementations; tests use in-memory ones.

use std::collections::BTreeMap;

use anyhow::Result;

use crate::model::{Catalog, MajorRequirements, RequirementSpec, TakenCourse};

// ---------------------------------------------------------------------------
// Program data
// ---------------------------------------------------------------------------

/// Read-only access to catalogs and requirement records.
pub trait ProgramData {
    /// Course catalog for a major or minor program.
    fn catalog(&self, program: &str) -> Result<Catalog>;

    /// Requirement specification for a minor, if one is published.
    fn minor_spec(&self, minor: &str) -> Result<Option<RequirementSpec>>;

    /// Graduation limits for a major under the given entry term.
    fn major_requirements(&self, major: &str, entry_term: &str) -> Result<Option<MajorRequirements>>;
}

/// Program data held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryData {
    pub catalogs: BTreeMap<String, Catalog>,
    pub minors: BTreeMap<String, RequirementSpec>,
    pub majors: BTreeMap<String, MajorRequirements>,
}

impl InMemoryData {
    pub fn with_catalog(mut self, program: &str, catalog: Catalog) -> Self {
        self.catalogs.insert(program.to_string(), catalog);
        self
    }

    pub fn with_minor(mut self, minor: &str, spec: RequirementSpec) -> Self {
        self.minors.insert(minor.to_string(), spec);
        self
    }

    pub fn with_major(mut self, requirements: MajorRequirements) -> Self {
        self.majors.insert(requirements.major.clone(), requirements);
        self
    }
}

impl ProgramData for InMemoryData {
    fn catalog(&self, program: &str) -> Result<Catalog> {
        Ok(self.catalogs.get(program).cloned().unwrap_or_default())
    }

    fn minor_spec(&self, minor: &str) -> Result<Option<RequirementSpec>> {
        Ok(self.minors.get(minor).cloned())
    }

    fn major_requirements(&self, major: &str, _entry_term: &str) -> Result<Option<MajorRequirements>> {
        Ok(self.majors.get(major).cloned())
    }
}

// ---------------------------------------------------------------------------
// Course source
// ---------------------------------------------------------------------------

/// Supplies the student's normalized enrollments, grouped by semester.
pub trait CourseSource {
    /// `(term, courses)` pairs in plan order.
    fn semesters(&self) -> Vec<(String, Vec<TakenCourse>)>;

    /// Every enrollment across all semesters, in plan order.
    fn taken_courses(&self) -> Vec<TakenCourse> {
        self.semesters()
            .into_iter()
            .flat_map(|(_, courses)| courses)
            .collect()
    }
}
