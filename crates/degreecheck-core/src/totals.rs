//! Per-semester and per-curriculum credit and GPA rollups.
//!
//! Unlike the allocation engine there is no overflow and no equivalence
//! handling here: every enrolled course lands in the bucket of its catalog tag.

use serde::{Deserialize, Serialize};

use crate::model::{Catalog, Category, TakenCourse};

/// Grade point for a letter grade, or `None` for ungraded marks
/// (S, T, blank, or anything outside the table).
pub fn grade_points(grade: &str) -> Option<f64> {
    match grade.trim() {
        "A+" | "A" => Some(4.0),
        "A-" => Some(3.7),
        "B+" => Some(3.3),
        "B" => Some(3.0),
        "B-" => Some(2.7),
        "C+" => Some(2.3),
        "C" => Some(2.0),
        "C-" => Some(1.7),
        "D+" => Some(1.3),
        "D" => Some(1.0),
        "F" => Some(0.0),
        _ => None,
    }
}

/// Credit sums by catalog tag plus GPA inputs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreditTotals {
    pub total: f64,
    pub ects: f64,
    pub required: f64,
    pub core: f64,
    pub area: f64,
    pub free: f64,
    pub university: f64,
    pub science: f64,
    pub engineering: f64,
    /// Sum of grade point × credit over graded courses.
    pub gpa_points: f64,
    /// Credit of graded courses.
    pub gpa_credits: f64,
}

impl CreditTotals {
    /// GPA over graded credit; 0 when nothing is graded yet.
    pub fn gpa(&self) -> f64 {
        if self.gpa_credits > 0.0 {
            self.gpa_points / self.gpa_credits
        } else {
            0.0
        }
    }

    /// GPA only when there is graded credit to compute it from.
    pub fn gpa_if_graded(&self) -> Option<f64> {
        (self.gpa_credits > 0.0).then(|| self.gpa())
    }

    fn add_course(&mut self, course: &TakenCourse, catalog: &Catalog) {
        let Some(record) = catalog.get(&course.code) else {
            return;
        };
        let credit = record.credit_su;
        self.total += credit;
        self.ects += record.credit_ects;
        self.science += record.basic_science;
        self.engineering += record.engineering;
        match record.category {
            Category::Required => self.required += credit,
            Category::Core => self.core += credit,
            Category::Area => self.area += credit,
            Category::Free => self.free += credit,
            Category::University => self.university += credit,
            Category::Other => {}
        }
        if let Some(points) = course.grade.as_deref().and_then(grade_points) {
            self.gpa_points += points * credit;
            self.gpa_credits += credit;
        }
    }

    fn absorb(&mut self, other: &CreditTotals) {
        self.total += other.total;
        self.ects += other.ects;
        self.required += other.required;
        self.core += other.core;
        self.area += other.area;
        self.free += other.free;
        self.university += other.university;
        self.science += other.science;
        self.engineering += other.engineering;
        self.gpa_points += other.gpa_points;
        self.gpa_credits += other.gpa_credits;
    }
}

/// Totals for one semester of the plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemesterTotals {
    pub term: String,
    pub course_count: usize,
    pub credits: CreditTotals,
}

/// Roll up one semester's courses.
pub fn semester_totals(term: &str, courses: &[TakenCourse], catalog: &Catalog) -> SemesterTotals {
    let mut credits = CreditTotals::default();
    for course in courses {
        credits.add_course(course, catalog);
    }
    SemesterTotals {
        term: term.to_string(),
        course_count: courses.iter().filter(|c| catalog.contains(&c.code)).count(),
        credits,
    }
}

/// Sum semester rollups into curriculum totals.
pub fn curriculum_totals<'a, I>(semesters: I) -> CreditTotals
where
    I: IntoIterator<Item = &'a SemesterTotals>,
{
    let mut totals = CreditTotals::default();
    for semester in semesters {
        totals.absorb(&semester.credits);
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CourseRecord;

    fn catalog() -> Catalog {
        let rec = |code: &str, credit: f64, category: Category| CourseRecord {
            code: code.into(),
            name: String::new(),
            credit_su: credit,
            credit_ects: credit * 2.0,
            category,
            basic_science: if code.starts_with("MATH") { credit } else { 0.0 },
            engineering: 0.0,
        };
        vec![
            rec("CS201", 3.0, Category::Required),
            rec("CS300", 3.0, Category::Core),
            rec("CS412", 3.0, Category::Area),
            rec("ART101", 2.0, Category::Free),
            rec("HUM201", 3.0, Category::University),
            rec("MATH101", 3.0, Category::University),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn grade_point_table() {
        assert_eq!(grade_points("A+"), Some(4.0));
        assert_eq!(grade_points("A-"), Some(3.7));
        assert_eq!(grade_points("D"), Some(1.0));
        assert_eq!(grade_points("F"), Some(0.0));
        assert_eq!(grade_points("S"), None);
        assert_eq!(grade_points("T"), None);
        assert_eq!(grade_points(""), None);
    }

    #[test]
    fn buckets_follow_catalog_tags() {
        let courses = vec![
            TakenCourse::new("CS201", Some("A")),
            TakenCourse::new("CS300", Some("B")),
            TakenCourse::new("CS412", None),
            TakenCourse::new("ART101", Some("S")),
            TakenCourse::new("HUM201", Some("T")),
            TakenCourse::new("MATH101", Some("C+")),
            TakenCourse::new("NOPE100", Some("A")),
        ];
        let sem = semester_totals("Fall 2023-2024", &courses, &catalog());
        assert_eq!(sem.course_count, 6);
        let c = &sem.credits;
        assert_eq!(c.total, 17.0);
        assert_eq!(c.ects, 34.0);
        assert_eq!(c.required, 3.0);
        assert_eq!(c.core, 3.0);
        assert_eq!(c.area, 3.0);
        assert_eq!(c.free, 2.0);
        assert_eq!(c.university, 6.0);
        assert_eq!(c.science, 3.0);
        assert_eq!(c.gpa_credits, 9.0);
        assert!((c.gpa() - (4.0 * 3.0 + 3.0 * 3.0 + 2.3 * 3.0) / 9.0).abs() < 1e-9);
    }

    #[test]
    fn ungraded_courses_never_touch_gpa() {
        let courses = vec![
            TakenCourse::new("CS201", Some("S")),
            TakenCourse::new("CS300", Some("T")),
            TakenCourse::new("CS412", None),
        ];
        let sem = semester_totals("Spring", &courses, &catalog());
        assert_eq!(sem.credits.gpa_points, 0.0);
        assert_eq!(sem.credits.gpa_credits, 0.0);
        assert_eq!(sem.credits.gpa(), 0.0);
        assert_eq!(format!("{:.3}", sem.credits.gpa()), "0.000");
        assert_eq!(sem.credits.gpa_if_graded(), None);
    }

    #[test]
    fn failed_course_counts_zero_points() {
        let courses = vec![
            TakenCourse::new("CS201", Some("A")),
            TakenCourse::new("CS300", Some("F")),
        ];
        let sem = semester_totals("Fall", &courses, &catalog());
        assert_eq!(sem.credits.total, 6.0);
        assert_eq!(sem.credits.gpa(), 2.0);
    }

    #[test]
    fn curriculum_totals_sum_semesters() {
        let cat = catalog();
        let s1 = semester_totals("Fall", &[TakenCourse::new("CS201", Some("A"))], &cat);
        let s2 = semester_totals("Spring", &[TakenCourse::new("CS300", Some("C"))], &cat);
        let total = curriculum_totals([&s1, &s2]);
        assert_eq!(total.total, 6.0);
        assert_eq!(total.required, 3.0);
        assert_eq!(total.core, 3.0);
        assert_eq!(total.gpa(), 3.0);
        assert_eq!(total.gpa_if_graded(), Some(3.0));
    }
}
