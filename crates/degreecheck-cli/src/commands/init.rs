//! The `degreecheck init` command.

use std::path::Path;

use anyhow::{Context, Result};

/// Files written by `init`, relative to the current directory.
const STARTER_FILES: &[(&str, &str)] = &[
    ("degreecheck.toml", SAMPLE_CONFIG),
    ("data/courses/CS.jsonl", SAMPLE_CS_CATALOG),
    ("data/courses/BA-MINOR.jsonl", SAMPLE_MINOR_CATALOG),
    ("data/requirements/default.jsonl", SAMPLE_MAJOR_REQUIREMENTS),
    ("data/requirements/minors.jsonl", SAMPLE_MINORS),
    ("plan.toml", SAMPLE_PLAN),
];

pub fn execute() -> Result<()> {
    for (path, content) in STARTER_FILES {
        let path = Path::new(path);
        if path.exists() {
            println!("{} already exists, skipping.", path.display());
            continue;
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        std::fs::write(path, content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Created {}", path.display());
    }

    println!("\nNext steps:");
    println!("  1. Replace data/ with your program catalogs and requirements");
    println!("  2. Run: degreecheck validate");
    println!("  3. Run: degreecheck check --plan plan.toml");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# degreecheck configuration

data_dir = "./data"
output_dir = "./degreecheck-results"

# count_once: a retaken course counts a single time; count_each: every enrollment counts
retake_policy = "count_once"

major_gpa_threshold = 2.00
minor_gpa_threshold = 2.72
double_major_extra_su = 30
double_major_extra_ects = 60

[minor_gpa_overrides]
ENTREP-MINOR = 2.50
"#;

const SAMPLE_CS_CATALOG: &str = r#"{"Major": "CS", "Code": "201", "Course_Name": "Introduction to Computing", "ECTS": "6", "SU_credit": "3", "EL_Type": "required", "Basic_Science": "0", "Engineering": "3", "Faculty_Course": "No"}
{"Major": "CS", "Code": "204", "Course_Name": "Advanced Programming", "ECTS": "6", "SU_credit": "3", "EL_Type": "required", "Basic_Science": "0", "Engineering": "3", "Faculty_Course": "No"}
{"Major": "CS", "Code": "300", "Course_Name": "Data Structures", "ECTS": "6", "SU_credit": "3", "EL_Type": "core", "Basic_Science": "0", "Engineering": "3", "Faculty_Course": "No"}
{"Major": "CS", "Code": "306", "Course_Name": "Database Systems", "ECTS": "6", "SU_credit": "3", "EL_Type": "core", "Basic_Science": "0", "Engineering": "3", "Faculty_Course": "No"}
{"Major": "CS", "Code": "395", "Course_Name": "Summer Internship", "ECTS": "4", "SU_credit": "0", "EL_Type": "required", "Basic_Science": "0", "Engineering": "0", "Faculty_Course": "No"}
{"Major": "CS", "Code": "408", "Course_Name": "Computer Networks", "ECTS": "6", "SU_credit": "3", "EL_Type": "area", "Basic_Science": "0", "Engineering": "3", "Faculty_Course": "No"}
{"Major": "CS", "Code": "412", "Course_Name": "Machine Learning", "ECTS": "6", "SU_credit": "3", "EL_Type": "area", "Basic_Science": "0", "Engineering": "3", "Faculty_Course": "No"}
{"Major": "MATH", "Code": "101", "Course_Name": "Calculus I", "ECTS": "6", "SU_credit": "3", "EL_Type": "university", "Basic_Science": "3", "Engineering": "0", "Faculty_Course": "No"}
{"Major": "MATH", "Code": "102", "Course_Name": "Calculus II", "ECTS": "6", "SU_credit": "3", "EL_Type": "university", "Basic_Science": "3", "Engineering": "0", "Faculty_Course": "No"}
{"Major": "HUM", "Code": "201", "Course_Name": "Major Works of Literature", "ECTS": "5", "SU_credit": "3", "EL_Type": "university", "Basic_Science": "0", "Engineering": "0", "Faculty_Course": "No"}
{"Major": "ART", "Code": "101", "Course_Name": "Drawing Studio", "ECTS": "5", "SU_credit": "3", "EL_Type": "free", "Basic_Science": "0", "Engineering": "0", "Faculty_Course": "No"}
"#;

const SAMPLE_MINOR_CATALOG: &str = r#"{"Major": "MGMT", "Code": "201", "Course_Name": "Introduction to Management", "ECTS": "6", "SU_credit": "3", "EL_Type": "required"}
{"Major": "CS", "Code": "201", "Course_Name": "Introduction to Computing", "ECTS": "6", "SU_credit": "3", "EL_Type": "required"}
{"Major": "OPIM", "Code": "302", "Course_Name": "Business Analytics", "ECTS": "6", "SU_credit": "3", "EL_Type": "core"}
{"Major": "OPIM", "Code": "390", "Course_Name": "Decision Models", "ECTS": "6", "SU_credit": "3", "EL_Type": "core"}
{"Major": "MKTG", "Code": "301", "Course_Name": "Marketing Research", "ECTS": "6", "SU_credit": "3", "EL_Type": "area"}
"#;

const SAMPLE_MAJOR_REQUIREMENTS: &str = r#"{"major": "CS", "total": 125, "ects": 240, "university": 41, "required": 6, "core": 31, "area": 9, "free": 15, "science": 60, "engineering": 90, "internshipCourse": "CS395"}
"#;

const SAMPLE_MINORS: &str = r#"{"minor": "BA-MINOR", "name": "Business Analytics", "minCourses": 4, "minSU": 12, "categories": {"required": {"minCourses": 1, "minSU": 3, "equivalents": [["MGMT201", "CS201"]]}, "core": {"minCourses": 1, "minSU": 3}, "area": {"minCourses": 1, "minSU": 3}}}
"#;

const SAMPLE_PLAN: &str = r#"[student]
major = "CS"
entry_term = "202301"
minors = ["BA-MINOR"]

[[semesters]]
term = "Fall 2023-2024"
courses = [
    { code = "CS 201", grade = "A" },
    { code = "MATH 101", grade = "B+" },
    { code = "HUM 201", grade = "A-" },
    { code = "MGMT 201", grade = "B" },
]

[[semesters]]
term = "Spring 2023-2024"
courses = [
    { code = "CS 204", grade = "B" },
    { code = "MATH 102", grade = "C+" },
    { code = "OPIM 302", grade = "A" },
    { code = "MKTG 301", grade = "S" },
]
"#;
