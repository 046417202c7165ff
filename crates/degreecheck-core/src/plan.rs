//! Student plan files.
//!
//! A plan is a TOML document naming the student's programs and listing the
//! courses taken (or planned) per semester:
//!
//! ```toml
//! [student]
//! major = "CS"
//! entry_term = "202301"
//! minors = ["BA-MINOR"]
//!
//! [[semesters]]
//! term = "Fall 2023-2024"
//! courses = [{ code = "CS 201", grade = "A" }, "MATH101"]
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::model::{normalize_code, TakenCourse};
use crate::traits::CourseSource;

/// The programs a student is enrolled in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudentProgram {
    pub major: String,
    /// Entry term used to pick the major's graduation limits.
    #[serde(default)]
    pub entry_term: String,
    #[serde(default)]
    pub double_major: Option<String>,
    #[serde(default)]
    pub minors: Vec<String>,
}

/// One semester of normalized enrollments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Semester {
    pub term: String,
    pub courses: Vec<TakenCourse>,
}

/// A loaded student plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub student: StudentProgram,
    pub semesters: Vec<Semester>,
}

#[derive(Debug, Deserialize)]
struct TomlPlan {
    student: StudentProgram,
    #[serde(default)]
    semesters: Vec<TomlSemester>,
}

#[derive(Debug, Deserialize)]
struct TomlSemester {
    term: String,
    #[serde(default)]
    courses: Vec<TomlCourse>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TomlCourse {
    Code(String),
    Graded {
        code: String,
        #[serde(default)]
        grade: Option<String>,
    },
}

impl TomlCourse {
    fn into_taken(self) -> Option<TakenCourse> {
        let (code, grade) = match self {
            TomlCourse::Code(code) => (code, None),
            TomlCourse::Graded { code, grade } => (code, grade),
        };
        let code = normalize_code(&code);
        if code.is_empty() {
            return None;
        }
        let grade = grade
            .map(|g| g.trim().to_uppercase())
            .filter(|g| !g.is_empty());
        Some(TakenCourse { code, grade })
    }
}

impl Plan {
    /// Load a plan from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read plan: {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("failed to parse plan: {}", path.display()))
    }

    /// Parse a plan from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        let raw: TomlPlan = toml::from_str(content).context("invalid plan TOML")?;

        let mut student = raw.student;
        student.major = student.major.trim().to_string();
        if student.major.is_empty() {
            anyhow::bail!("plan has no major");
        }
        student.entry_term = student.entry_term.trim().to_string();
        student.double_major = student
            .double_major
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty());
        student.minors = student
            .minors
            .into_iter()
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .collect();

        let semesters = raw
            .semesters
            .into_iter()
            .map(|s| Semester {
                term: s.term,
                courses: s.courses.into_iter().filter_map(TomlCourse::into_taken).collect(),
            })
            .collect();

        Ok(Plan { student, semesters })
    }
}

impl CourseSource for Plan {
    fn semesters(&self) -> Vec<(String, Vec<TakenCourse>)> {
        self.semesters
            .iter()
            .map(|s| (s.term.clone(), s.courses.clone()))
            .collect()
    }
}
