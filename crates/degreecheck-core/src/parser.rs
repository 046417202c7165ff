//! Catalog and requirement data parser.
//!
//! Loads course catalogs and requirement records from a data directory of
//! JSON-lines files, and validates requirement specifications against their
//! catalogs. Parsing is lenient the way the published data needs it to be:
//! numbers may arrive as strings, malformed equivalence lists read as empty,
//! and a broken line is skipped rather than failing the whole file.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::DataError;
use crate::model::{
    normalize_code, Catalog, Category, CategoryKey, CourseRecord, MajorRequirements,
    RequirementCategory, RequirementSpec,
};
use crate::traits::ProgramData;

// ---------------------------------------------------------------------------
// Raw record shapes
// ---------------------------------------------------------------------------

/// Intermediate structure for one catalog line.
#[derive(Debug, Deserialize)]
struct RawCourse {
    #[serde(rename = "Major", default, deserialize_with = "lenient_string")]
    major: String,
    #[serde(rename = "Code", default, deserialize_with = "lenient_string")]
    code: String,
    #[serde(rename = "Course_Name", default, deserialize_with = "lenient_string")]
    name: String,
    #[serde(rename = "SU_credit", default, deserialize_with = "lenient_f64")]
    su_credit: f64,
    #[serde(rename = "ECTS", default, deserialize_with = "lenient_f64")]
    ects: f64,
    #[serde(rename = "EL_Type", default, deserialize_with = "lenient_string")]
    el_type: String,
    #[serde(rename = "Basic_Science", default, deserialize_with = "lenient_f64")]
    basic_science: f64,
    #[serde(rename = "Engineering", default, deserialize_with = "lenient_f64")]
    engineering: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMinor {
    minor: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient_u32")]
    min_courses: u32,
    #[serde(rename = "minSU", default, deserialize_with = "lenient_f64")]
    min_su: f64,
    #[serde(default, deserialize_with = "lenient_object")]
    categories: BTreeMap<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCategory {
    #[serde(default, deserialize_with = "lenient_u32")]
    min_courses: u32,
    #[serde(rename = "minSU", default, deserialize_with = "lenient_f64")]
    min_su: f64,
    #[serde(default, deserialize_with = "lenient_groups")]
    equivalents: Vec<Vec<String>>,
    #[serde(default, deserialize_with = "lenient_bool")]
    all_listed_required: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMajor {
    major: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    total: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    ects: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    university: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    required: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    core: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    area: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    free: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    science: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    engineering: f64,
    #[serde(default)]
    internship_course: Option<String>,
}

// ---------------------------------------------------------------------------
// Lenient field readers
// ---------------------------------------------------------------------------

/// Numbers or numeric strings ("3", "2,5"); anything else reads as 0.
fn number_from_value(value: &Value) -> f64 {
    let n = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().replace(',', ".").parse().unwrap_or(0.0),
        _ => 0.0,
    };
    if n.is_finite() {
        n
    } else {
        0.0
    }
}

fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(number_from_value(&Value::deserialize(deserializer)?))
}

fn lenient_u32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let n = number_from_value(&Value::deserialize(deserializer)?);
    Ok(if n > 0.0 { n.trunc().min(u32::MAX as f64) as u32 } else { 0 })
}

fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => b,
        Value::String(s) => s.trim().eq_ignore_ascii_case("true"),
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        _ => false,
    })
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

/// A JSON object as a map; anything else reads as empty.
fn lenient_object<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BTreeMap<String, Value>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Object(map) => map.into_iter().collect(),
        _ => BTreeMap::new(),
    })
}

/// A list of lists of codes. A non-list reads as no groups; a member that is
/// not a list reads as an empty group.
fn lenient_groups<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Vec<String>>, D::Error> {
    let Value::Array(groups) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(groups
        .iter()
        .map(|group| match group {
            Value::Array(codes) => codes
                .iter()
                .filter_map(|code| match code {
                    Value::String(s) => Some(normalize_code(s)),
                    Value::Number(n) => Some(normalize_code(&n.to_string())),
                    _ => None,
                })
                .filter(|code| !code.is_empty())
                .collect(),
            _ => Vec::new(),
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

impl RawCourse {
    fn into_record(self) -> Option<CourseRecord> {
        let code = normalize_code(&format!("{}{}", self.major, self.code));
        if code.is_empty() {
            return None;
        }
        Some(CourseRecord {
            code,
            name: self.name,
            credit_su: self.su_credit.max(0.0),
            credit_ects: self.ects.max(0.0),
            category: Category::from_tag(&self.el_type),
            basic_science: self.basic_science.max(0.0),
            engineering: self.engineering.max(0.0),
        })
    }
}

impl RawMinor {
    fn into_spec(self) -> (String, RequirementSpec) {
        let code = self.minor.trim().to_string();
        let mut spec = RequirementSpec::new(self.name.clone().unwrap_or_else(|| code.clone()))
            .with_overall(self.min_courses, self.min_su.max(0.0));
        for (key, value) in self.categories {
            let key = match key.parse::<CategoryKey>() {
                Ok(key) => key,
                Err(e) => {
                    tracing::warn!("minor {}: ignoring category: {}", code, e);
                    continue;
                }
            };
            let raw = match value {
                Value::Null => continue,
                Value::Object(_) => match serde_json::from_value::<RawCategory>(value) {
                    Ok(raw) => raw,
                    Err(e) => {
                        tracing::warn!("minor {}: ignoring {} category: {}", code, key, e);
                        continue;
                    }
                },
                other => {
                    tracing::warn!(
                        "minor {}: ignoring {} category: expected an object, got {}",
                        code,
                        key,
                        other
                    );
                    continue;
                }
            };
            spec.categories.insert(
                key,
                RequirementCategory {
                    min_course_count: raw.min_courses,
                    min_credit_sum: raw.min_su.max(0.0),
                    equivalence_groups: raw.equivalents,
                    all_listed_required: raw.all_listed_required,
                },
            );
        }
        (code, spec)
    }
}

impl From<RawMajor> for MajorRequirements {
    fn from(raw: RawMajor) -> Self {
        MajorRequirements {
            major: raw.major.trim().to_string(),
            total: raw.total,
            ects: raw.ects,
            university: raw.university,
            required: raw.required,
            core: raw.core,
            area: raw.area,
            free: raw.free,
            science: raw.science,
            engineering: raw.engineering,
            internship_course: raw
                .internship_course
                .map(|c| normalize_code(&c))
                .filter(|c| !c.is_empty()),
        }
    }
}

// ---------------------------------------------------------------------------
// File reading
// ---------------------------------------------------------------------------

/// Records read from one file, plus the lines that had to be skipped.
#[derive(Debug)]
pub struct Parsed<T> {
    pub records: Vec<T>,
    pub issues: Vec<DataError>,
}

impl<T> Parsed<T> {
    fn log_issues(&self) {
        for issue in &self.issues {
            tracing::warn!("skipping record: {}", issue);
        }
    }
}

/// Parse JSON-lines (or a single JSON array) text into records.
pub fn parse_records_str<T: DeserializeOwned>(content: &str, source_path: &Path) -> Parsed<T> {
    let mut records = Vec::new();
    let mut issues = Vec::new();
    let trimmed = content.trim();

    let mut push = |line: usize, value: std::result::Result<T, serde_json::Error>| match value {
        Ok(record) => records.push(record),
        Err(e) => issues.push(DataError::MalformedRecord {
            path: source_path.to_path_buf(),
            line,
            message: e.to_string(),
        }),
    };

    if trimmed.starts_with('[') {
        match serde_json::from_str::<Vec<Value>>(trimmed) {
            Ok(values) => {
                for (i, value) in values.into_iter().enumerate() {
                    push(i + 1, serde_json::from_value(value));
                }
            }
            Err(e) => push(1, Err(e)),
        }
    } else {
        for (i, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            push(i + 1, serde_json::from_str(line));
        }
    }

    Parsed { records, issues }
}

/// Read and parse a JSON-lines file.
pub fn parse_records<T: DeserializeOwned>(path: &Path) -> Result<Parsed<T>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read data file: {}", path.display()))?;
    Ok(parse_records_str(&content, path))
}

/// Parse catalog text into a `Catalog`.
pub fn parse_catalog_str(content: &str, source_path: &Path) -> Parsed<CourseRecord> {
    let raw: Parsed<RawCourse> = parse_records_str(content, source_path);
    Parsed {
        records: raw.records.into_iter().filter_map(RawCourse::into_record).collect(),
        issues: raw.issues,
    }
}

/// Parse minor requirement text into `(minor code, spec)` pairs.
pub fn parse_minor_specs_str(content: &str, source_path: &Path) -> Parsed<(String, RequirementSpec)> {
    let raw: Parsed<RawMinor> = parse_records_str(content, source_path);
    Parsed {
        records: raw.records.into_iter().map(RawMinor::into_spec).collect(),
        issues: raw.issues,
    }
}

/// Parse major requirement text.
pub fn parse_major_requirements_str(content: &str, source_path: &Path) -> Parsed<MajorRequirements> {
    let raw: Parsed<RawMajor> = parse_records_str(content, source_path);
    Parsed {
        records: raw.records.into_iter().map(MajorRequirements::from).collect(),
        issues: raw.issues,
    }
}

fn read_to_string(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("failed to read data file: {}", path.display()))
}

/// First existing file among `<stem>.jsonl` and `<stem>.json` in `dir`.
fn find_data_file(dir: &Path, stem: &str) -> Option<PathBuf> {
    ["jsonl", "json"]
        .iter()
        .map(|ext| dir.join(format!("{stem}.{ext}")))
        .find(|p| p.is_file())
}

// ---------------------------------------------------------------------------
// Data directory
// ---------------------------------------------------------------------------

/// A data directory laid out as `courses/<PROGRAM>.jsonl`,
/// `requirements/minors.jsonl` and `requirements/<TERM>.jsonl`.
#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn courses_dir(&self) -> PathBuf {
        self.root.join("courses")
    }

    pub fn requirements_dir(&self) -> PathBuf {
        self.root.join("requirements")
    }

    /// Load one program's catalog, keeping the skipped-line report.
    pub fn load_catalog(&self, program: &str) -> Result<(Catalog, Vec<DataError>)> {
        let dir = self.courses_dir();
        let path = find_data_file(&dir, program).ok_or_else(|| DataError::ProgramNotFound {
            program: program.to_string(),
            dir: dir.clone(),
        })?;
        let parsed = parse_catalog_str(&read_to_string(&path)?, &path);
        parsed.log_issues();
        if parsed.records.is_empty() {
            return Err(DataError::EmptyCatalog(program.to_string()).into());
        }
        Ok((parsed.records.into_iter().collect(), parsed.issues))
    }

    /// Load every minor specification, keyed by minor code.
    pub fn load_minor_specs(&self) -> Result<(BTreeMap<String, RequirementSpec>, Vec<DataError>)> {
        let Some(path) = find_data_file(&self.requirements_dir(), "minors") else {
            return Ok((BTreeMap::new(), Vec::new()));
        };
        let parsed = parse_minor_specs_str(&read_to_string(&path)?, &path);
        parsed.log_issues();
        Ok((parsed.records.into_iter().collect(), parsed.issues))
    }

    /// Load the major limits for an entry term, falling back to `default`.
    pub fn load_major_requirements(&self, entry_term: &str) -> Result<Vec<MajorRequirements>> {
        let dir = self.requirements_dir();
        let path = [entry_term, "default"]
            .iter()
            .filter(|stem| !stem.is_empty())
            .find_map(|stem| find_data_file(&dir, stem));
        let Some(path) = path else {
            return Ok(Vec::new());
        };
        let parsed = parse_major_requirements_str(&read_to_string(&path)?, &path);
        parsed.log_issues();
        Ok(parsed.records)
    }

    /// Program codes that have a catalog file, sorted.
    pub fn catalog_programs(&self) -> Result<Vec<String>> {
        let dir = self.courses_dir();
        if !dir.is_dir() {
            anyhow::bail!("not a directory: {}", dir.display());
        }
        let mut programs = BTreeSet::new();
        for entry in std::fs::read_dir(&dir)
            .with_context(|| format!("failed to read directory: {}", dir.display()))?
        {
            let path = entry?.path();
            let is_data = path
                .extension()
                .is_some_and(|ext| ext == "jsonl" || ext == "json");
            if let (true, Some(stem)) = (is_data, path.file_stem().and_then(|s| s.to_str())) {
                programs.insert(stem.to_string());
            }
        }
        Ok(programs.into_iter().collect())
    }
}

impl ProgramData for DataDir {
    fn catalog(&self, program: &str) -> Result<Catalog> {
        self.load_catalog(program).map(|(catalog, _)| catalog)
    }

    fn minor_spec(&self, minor: &str) -> Result<Option<RequirementSpec>> {
        let (mut specs, _) = self.load_minor_specs()?;
        Ok(specs.remove(minor))
    }

    fn major_requirements(&self, major: &str, entry_term: &str) -> Result<Option<MajorRequirements>> {
        Ok(self
            .load_major_requirements(entry_term)?
            .into_iter()
            .find(|r| r.major == major))
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// A warning from requirement validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The category concerned (if applicable).
    pub category: Option<CategoryKey>,
    /// Warning message.
    pub message: String,
}

/// Validate a requirement specification against its catalog.
pub fn validate_spec(spec: &RequirementSpec, catalog: &Catalog) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if spec.categories.is_empty() {
        warnings.push(ValidationWarning {
            category: None,
            message: "no requirement categories configured; this program can never be completed"
                .into(),
        });
    }

    for (&key, rules) in &spec.categories {
        let warn = |message: String| ValidationWarning {
            category: Some(key),
            message,
        };

        if rules.all_listed_required && key != CategoryKey::Required {
            warnings.push(warn(
                "allListedRequired is only honoured on the required category".into(),
            ));
        }

        let mut seen = BTreeSet::new();
        for (i, group) in rules.equivalence_groups.iter().enumerate() {
            if group.is_empty() {
                warnings.push(warn(format!("equivalence group {} is empty", i + 1)));
            }
            for code in group {
                if !catalog.contains(code) {
                    warnings.push(warn(format!("equivalence code {code} is not in the catalog")));
                }
                if !seen.insert(code.as_str()) {
                    warnings.push(warn(format!(
                        "{code} appears in more than one equivalence group"
                    )));
                }
            }
        }
    }

    warnings
}
