//! Core data model types for degreecheck.
//!
//! These are the fundamental types that the whole system uses to represent
//! catalog courses, taken courses and requirement specifications.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Normalize a course code: uppercase with all whitespace removed.
pub fn normalize_code(raw: &str) -> String {
    raw.split_whitespace()
        .flat_map(|part| part.chars())
        .flat_map(char::to_uppercase)
        .collect()
}

/// The category tag a catalog record carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Required,
    Core,
    Area,
    Free,
    University,
    Other,
}

impl Category {
    /// Lenient tag lookup used for catalog data. Unknown tags map to `Other`.
    pub fn from_tag(tag: &str) -> Self {
        tag.parse().unwrap_or(Category::Other)
    }

    /// The requirement category this tag starts its allocation walk in.
    ///
    /// Tags outside the chain (university, other) default to `free`.
    pub fn base_key(self) -> CategoryKey {
        match self {
            Category::Required => CategoryKey::Required,
            Category::Core => CategoryKey::Core,
            Category::Area => CategoryKey::Area,
            Category::Free | Category::University | Category::Other => CategoryKey::Free,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Required => write!(f, "required"),
            Category::Core => write!(f, "core"),
            Category::Area => write!(f, "area"),
            Category::Free => write!(f, "free"),
            Category::University => write!(f, "university"),
            Category::Other => write!(f, "other"),
        }
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "required" => Ok(Category::Required),
            "core" => Ok(Category::Core),
            "area" => Ok(Category::Area),
            "free" => Ok(Category::Free),
            "university" => Ok(Category::University),
            "other" => Ok(Category::Other),
            other => Err(format!("unknown category: {other}")),
        }
    }
}

/// A requirement category on the fixed priority chain
/// `required > core > area > free`.
///
/// The derived ordering is the chain order, so `BTreeMap<CategoryKey, _>`
/// iterates from highest to lowest priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKey {
    Required,
    Core,
    Area,
    Free,
}

impl CategoryKey {
    /// The whole chain, highest priority first.
    pub const CHAIN: [CategoryKey; 4] = [
        CategoryKey::Required,
        CategoryKey::Core,
        CategoryKey::Area,
        CategoryKey::Free,
    ];

    /// Position on the chain; lower is higher priority.
    pub fn rank(self) -> usize {
        self as usize
    }

    /// The next category down the chain, or `None` at the terminal category.
    pub fn next(self) -> Option<CategoryKey> {
        Self::CHAIN.get(self.rank() + 1).copied()
    }
}

impl fmt::Display for CategoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryKey::Required => write!(f, "required"),
            CategoryKey::Core => write!(f, "core"),
            CategoryKey::Area => write!(f, "area"),
            CategoryKey::Free => write!(f, "free"),
        }
    }
}

impl FromStr for CategoryKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "required" => Ok(CategoryKey::Required),
            "core" => Ok(CategoryKey::Core),
            "area" => Ok(CategoryKey::Area),
            "free" => Ok(CategoryKey::Free),
            other => Err(format!("not a requirement category: {other}")),
        }
    }
}

/// A catalog course. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseRecord {
    /// Normalized code (e.g. "CS201").
    pub code: String,
    /// Human-readable course title.
    #[serde(default)]
    pub name: String,
    /// SU credit.
    pub credit_su: f64,
    /// ECTS credit.
    #[serde(default)]
    pub credit_ects: f64,
    /// Category tag.
    pub category: Category,
    /// Basic-science credit share.
    #[serde(default)]
    pub basic_science: f64,
    /// Engineering credit share.
    #[serde(default)]
    pub engineering: f64,
}

/// A program's course catalog keyed by normalized code.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    records: BTreeMap<String, CourseRecord>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record. A later record with the same code replaces the earlier one.
    pub fn insert(&mut self, record: CourseRecord) {
        self.records.insert(record.code.clone(), record);
    }

    pub fn get(&self, code: &str) -> Option<&CourseRecord> {
        self.records.get(code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.records.contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &CourseRecord> {
        self.records.values()
    }

    /// Codes of every record tagged with `category`, in code order.
    pub fn codes_in(&self, category: Category) -> Vec<&str> {
        self.records
            .values()
            .filter(|r| r.category == category)
            .map(|r| r.code.as_str())
            .collect()
    }
}

impl FromIterator<CourseRecord> for Catalog {
    fn from_iter<I: IntoIterator<Item = CourseRecord>>(iter: I) -> Self {
        let mut catalog = Catalog::new();
        for record in iter {
            catalog.insert(record);
        }
        catalog
    }
}

/// A course on the student's plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TakenCourse {
    /// Normalized course code.
    pub code: String,
    /// Letter grade, `None` when not graded yet.
    #[serde(default)]
    pub grade: Option<String>,
}

impl TakenCourse {
    pub fn new(code: impl Into<String>, grade: Option<&str>) -> Self {
        Self {
            code: code.into(),
            grade: grade.map(str::to_string),
        }
    }

    /// A failed course is excluded from requirement allocation.
    pub fn is_failed(&self) -> bool {
        self.grade.as_deref().map(str::trim) == Some("F")
    }
}

/// Rules for one category of a requirement specification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequirementCategory {
    /// Minimum number of courses (0 = no minimum).
    #[serde(default)]
    pub min_course_count: u32,
    /// Minimum SU credit sum (0 = no minimum).
    #[serde(default)]
    pub min_credit_sum: f64,
    /// Interchangeable course groups; at most one member counts here.
    #[serde(default)]
    pub equivalence_groups: Vec<Vec<String>>,
    /// Every listed course must be taken. Only meaningful on `required`.
    #[serde(default)]
    pub all_listed_required: bool,
}

impl RequirementCategory {
    pub fn new(min_course_count: u32, min_credit_sum: f64) -> Self {
        Self {
            min_course_count,
            min_credit_sum,
            ..Default::default()
        }
    }

    pub fn with_equivalents(mut self, groups: Vec<Vec<&str>>) -> Self {
        self.equivalence_groups = groups
            .into_iter()
            .map(|g| g.into_iter().map(str::to_string).collect())
            .collect();
        self
    }

    pub fn all_listed(mut self) -> Self {
        self.all_listed_required = true;
        self
    }

    /// True if at least one minimum is set.
    pub fn has_minimums(&self) -> bool {
        self.min_course_count > 0 || self.min_credit_sum > 0.0
    }

    /// True if `courses`/`credits` reach both minimums. Unset minimums pass.
    pub fn minimums_met(&self, courses: u32, credits: f64) -> bool {
        courses >= self.min_course_count && credits >= self.min_credit_sum
    }

    /// Group index of `code`, if it belongs to an equivalence group.
    ///
    /// When a code is listed in several groups the last one wins.
    pub fn group_of(&self, code: &str) -> Option<usize> {
        self.equivalence_groups
            .iter()
            .rposition(|group| group.iter().any(|c| c == code))
    }

    /// All codes that appear in any equivalence group.
    pub fn grouped_codes(&self) -> BTreeSet<&str> {
        self.equivalence_groups
            .iter()
            .flatten()
            .map(String::as_str)
            .collect()
    }
}

/// A declarative requirement specification for one program.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequirementSpec {
    /// Program identifier or display name.
    pub program_name: String,
    /// Configured categories. Absent categories have zero minimums.
    #[serde(default)]
    pub categories: BTreeMap<CategoryKey, RequirementCategory>,
    /// Minimum number of allocated courses across all categories.
    #[serde(default)]
    pub overall_min_course_count: u32,
    /// Minimum allocated SU credit across all categories.
    #[serde(default)]
    pub overall_min_credit_sum: f64,
}

impl RequirementSpec {
    pub fn new(program_name: impl Into<String>) -> Self {
        Self {
            program_name: program_name.into(),
            ..Default::default()
        }
    }

    pub fn with_category(mut self, key: CategoryKey, category: RequirementCategory) -> Self {
        self.categories.insert(key, category);
        self
    }

    pub fn with_overall(mut self, min_courses: u32, min_credits: f64) -> Self {
        self.overall_min_course_count = min_courses;
        self.overall_min_credit_sum = min_credits;
        self
    }

    pub fn category(&self, key: CategoryKey) -> Option<&RequirementCategory> {
        self.categories.get(&key)
    }

    pub fn has_overall_minimums(&self) -> bool {
        self.overall_min_course_count > 0 || self.overall_min_credit_sum > 0.0
    }
}

/// Graduation limits for a major, as published per entry term.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MajorRequirements {
    pub major: String,
    #[serde(default)]
    pub total: f64,
    #[serde(default)]
    pub ects: f64,
    #[serde(default)]
    pub university: f64,
    #[serde(default)]
    pub required: f64,
    #[serde(default)]
    pub core: f64,
    #[serde(default)]
    pub area: f64,
    #[serde(default)]
    pub free: f64,
    #[serde(default)]
    pub science: f64,
    #[serde(default)]
    pub engineering: f64,
    /// Course that must appear on the plan (e.g. an internship).
    #[serde(default)]
    pub internship_course: Option<String>,
}

impl MajorRequirements {
    /// Limits for the same program taken as a second major.
    pub fn for_double_major(&self, extra_su: f64, extra_ects: f64) -> Self {
        Self {
            total: self.total + extra_su,
            ects: self.ects + extra_ects,
            ..self.clone()
        }
    }
}
