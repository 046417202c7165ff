//! Satisfaction evaluator.
//!
//! Turns allocation buckets into a per-category pass/fail report, applying
//! the strict-list rule on `required` and the overall minimums.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::allocation::Allocation;
use crate::model::{Catalog, Category, CategoryKey, RequirementCategory, RequirementSpec};

/// Have/need figures for one configured category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryLine {
    pub category: CategoryKey,
    pub have_courses: u32,
    pub need_courses: u32,
    pub have_credits: f64,
    pub need_credits: f64,
    /// Listed courses not on the plan (strict-list rule only).
    #[serde(default)]
    pub missing_courses: Vec<String>,
    /// Equivalence groups with no member on the plan (strict-list rule only).
    #[serde(default)]
    pub missing_groups: Vec<Vec<String>>,
    pub ok: bool,
}

impl fmt::Display for CategoryLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}/{} courses, {}/{} credits",
            self.category, self.have_courses, self.need_courses, self.have_credits, self.need_credits
        )?;
        if !self.missing_courses.is_empty() || !self.missing_groups.is_empty() {
            let mut missing: Vec<String> = self.missing_courses.clone();
            missing.extend(
                self.missing_groups
                    .iter()
                    .map(|g| format!("one of {}", g.join("/"))),
            );
            write!(f, "; missing {}", missing.join(", "))?;
        }
        Ok(())
    }
}

/// Have/need figures across all categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateLine {
    pub have_courses: u32,
    pub need_courses: u32,
    pub have_credits: f64,
    pub need_credits: f64,
    pub ok: bool,
}

impl fmt::Display for AggregateLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "overall: {}/{} courses, {}/{} credits",
            self.have_courses, self.need_courses, self.have_credits, self.need_credits
        )
    }
}

/// Outcome of evaluating one program's requirements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SatisfactionReport {
    pub program: String,
    /// One line per configured category, in chain order.
    pub lines: Vec<CategoryLine>,
    /// Present when overall minimums are configured.
    pub aggregate: Option<AggregateLine>,
    /// Human-readable notes about unusable configuration.
    #[serde(default)]
    pub diagnostics: Vec<String>,
    pub ok: bool,
}

impl SatisfactionReport {
    pub fn line(&self, key: CategoryKey) -> Option<&CategoryLine> {
        self.lines.iter().find(|l| l.category == key)
    }

    /// Categories that failed, in chain order.
    pub fn unsatisfied(&self) -> Vec<CategoryKey> {
        self.lines
            .iter()
            .filter(|l| !l.ok)
            .map(|l| l.category)
            .collect()
    }
}

/// Evaluate an allocation against `spec`.
///
/// `catalog` supplies the listed `required` courses for the strict-list rule,
/// which is checked against the taken set directly rather than the buckets.
pub fn evaluate(allocation: &Allocation, catalog: &Catalog, spec: &RequirementSpec) -> SatisfactionReport {
    let mut diagnostics = Vec::new();
    let mut ok = true;

    if spec.categories.is_empty() {
        diagnostics.push(format!(
            "no requirement categories configured for {}",
            spec.program_name
        ));
        ok = false;
    }

    let lines: Vec<CategoryLine> = spec
        .categories
        .iter()
        .map(|(&key, rules)| category_line(key, rules, allocation, catalog))
        .collect();
    if lines.iter().any(|l| !l.ok) {
        ok = false;
    }

    let aggregate = spec.has_overall_minimums().then(|| {
        let have_courses = allocation.total_courses();
        let have_credits = allocation.total_credits();
        AggregateLine {
            have_courses,
            need_courses: spec.overall_min_course_count,
            have_credits,
            need_credits: spec.overall_min_credit_sum,
            ok: have_courses >= spec.overall_min_course_count
                && have_credits >= spec.overall_min_credit_sum,
        }
    });
    if aggregate.as_ref().is_some_and(|a| !a.ok) {
        ok = false;
    }

    SatisfactionReport {
        program: spec.program_name.clone(),
        lines,
        aggregate,
        diagnostics,
        ok,
    }
}

fn category_line(
    key: CategoryKey,
    rules: &RequirementCategory,
    allocation: &Allocation,
    catalog: &Catalog,
) -> CategoryLine {
    let bucket = allocation.bucket(key);
    let mut ok = rules.minimums_met(bucket.course_count, bucket.credit_sum);

    let (missing_courses, missing_groups) = if key == CategoryKey::Required && rules.all_listed_required {
        strict_list_gaps(rules, allocation, catalog)
    } else {
        (Vec::new(), Vec::new())
    };
    if !missing_courses.is_empty() || !missing_groups.is_empty() {
        ok = false;
    }

    CategoryLine {
        category: key,
        have_courses: bucket.course_count,
        need_courses: rules.min_course_count,
        have_credits: bucket.credit_sum,
        need_credits: rules.min_credit_sum,
        missing_courses,
        missing_groups,
        ok,
    }
}

/// Listed required courses outside any group that were not taken, and
/// non-empty groups with no taken member.
fn strict_list_gaps(
    rules: &RequirementCategory,
    allocation: &Allocation,
    catalog: &Catalog,
) -> (Vec<String>, Vec<Vec<String>>) {
    let grouped = rules.grouped_codes();

    let missing_courses = catalog
        .codes_in(Category::Required)
        .into_iter()
        .filter(|code| !grouped.contains(code) && !allocation.taken.contains(*code))
        .map(str::to_string)
        .collect();

    let missing_groups = rules
        .equivalence_groups
        .iter()
        .filter(|group| !group.is_empty() && !group.iter().any(|c| allocation.taken.contains(c)))
        .cloned()
        .collect();

    (missing_courses, missing_groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocation::allocate;
    use crate::model::{CourseRecord, TakenCourse};

    fn record(code: &str, credit: f64, category: Category) -> CourseRecord {
        CourseRecord {
            code: code.into(),
            name: String::new(),
            credit_su: credit,
            credit_ects: 0.0,
            category,
            basic_science: 0.0,
            engineering: 0.0,
        }
    }

    fn taken(codes: &[&str]) -> Vec<TakenCourse> {
        codes.iter().map(|c| TakenCourse::new(*c, Some("B+"))).collect()
    }

    fn run(codes: &[&str], catalog: &Catalog, spec: &RequirementSpec) -> SatisfactionReport {
        evaluate(&allocate(&taken(codes), catalog, spec), catalog, spec)
    }

    #[test]
    fn equivalence_pair_leaves_required_short() {
        let catalog: Catalog = vec![
            record("CS201", 3.0, Category::Required),
            record("CS205", 3.0, Category::Required),
            record("CS210", 3.0, Category::Core),
        ]
        .into_iter()
        .collect();
        let spec = RequirementSpec::new("CS")
            .with_category(
                CategoryKey::Required,
                RequirementCategory::new(2, 6.0).with_equivalents(vec![vec!["CS201", "CS205"]]),
            )
            .with_category(CategoryKey::Core, RequirementCategory::new(1, 3.0));

        let report = run(&["CS201", "CS205", "CS210"], &catalog, &spec);
        assert!(!report.ok);

        let required = report.line(CategoryKey::Required).unwrap();
        assert!(!required.ok);
        assert_eq!((required.have_courses, required.need_courses), (1, 2));
        assert_eq!((required.have_credits, required.need_credits), (3.0, 6.0));

        let core = report.line(CategoryKey::Core).unwrap();
        assert!(core.ok);
        assert_eq!((core.have_courses, core.have_credits), (1, 3.0));
        assert_eq!(core.to_string(), "core: 1/1 courses, 3/3 credits");
        assert!(report.line(CategoryKey::Area).is_none());
        assert_eq!(report.unsatisfied(), vec![CategoryKey::Required]);
    }

    #[test]
    fn strict_list_requires_every_listed_course() {
        let catalog: Catalog = vec![
            record("R1", 3.0, Category::Required),
            record("R2", 3.0, Category::Required),
        ]
        .into_iter()
        .collect();
        let spec = RequirementSpec::new("MINOR")
            .with_category(CategoryKey::Required, RequirementCategory::new(1, 3.0).all_listed());

        let report = run(&["R1"], &catalog, &spec);
        let line = report.line(CategoryKey::Required).unwrap();
        assert_eq!(line.have_courses, 1);
        assert!(!line.ok);
        assert_eq!(line.missing_courses, vec!["R2"]);
        assert!(!report.ok);

        let report = run(&["R1", "R2"], &catalog, &spec);
        assert!(report.ok);
    }

    #[test]
    fn strict_list_accepts_any_group_member() {
        let catalog: Catalog = vec![
            record("R1", 3.0, Category::Required),
            record("G1", 3.0, Category::Required),
            record("G2", 3.0, Category::Required),
        ]
        .into_iter()
        .collect();
        let spec = RequirementSpec::new("MINOR").with_category(
            CategoryKey::Required,
            RequirementCategory::new(0, 0.0)
                .with_equivalents(vec![vec!["G1", "G2"]])
                .all_listed(),
        );

        assert!(run(&["R1", "G2"], &catalog, &spec).ok);

        let report = run(&["R1"], &catalog, &spec);
        let line = report.line(CategoryKey::Required).unwrap();
        assert!(line.missing_courses.is_empty());
        assert_eq!(line.missing_groups, vec![vec!["G1".to_string(), "G2".to_string()]]);
        assert_eq!(
            line.to_string(),
            "required: 1/0 courses, 3/0 credits; missing one of G1/G2"
        );
    }

    #[test]
    fn strict_list_uses_taken_set_not_allocation() {
        // R2 is on the plan but the catalog does not know it, so it is
        // never allocated; the listed-course check still sees it as taken.
        let catalog: Catalog = vec![record("R1", 3.0, Category::Required)].into_iter().collect();
        let mut full = catalog.clone();
        full.insert(record("R2", 3.0, Category::Required));
        let spec = RequirementSpec::new("MINOR")
            .with_category(CategoryKey::Required, RequirementCategory::default().all_listed());

        let alloc = allocate(&taken(&["R1", "R2"]), &catalog, &spec);
        assert_eq!(alloc.total_courses(), 1);
        let report = evaluate(&alloc, &full, &spec);
        assert!(report.ok);
    }

    #[test]
    fn empty_category_set_is_never_satisfied() {
        let catalog: Catalog = vec![record("R1", 3.0, Category::Required)].into_iter().collect();
        let spec = RequirementSpec::new("BROKEN");
        let report = run(&["R1"], &catalog, &spec);
        assert!(!report.ok);
        assert!(report.lines.is_empty());
        assert_eq!(report.diagnostics.len(), 1);
        assert!(report.diagnostics[0].contains("BROKEN"));
    }

    #[test]
    fn aggregate_minimums_fail_the_report() {
        let catalog: Catalog = vec![
            record("C1", 3.0, Category::Core),
            record("F1", 3.0, Category::Free),
        ]
        .into_iter()
        .collect();
        let spec = RequirementSpec::new("MINOR")
            .with_category(CategoryKey::Core, RequirementCategory::new(1, 3.0))
            .with_overall(3, 9.0);

        let report = run(&["C1", "F1"], &catalog, &spec);
        assert!(report.line(CategoryKey::Core).unwrap().ok);
        let aggregate = report.aggregate.as_ref().unwrap();
        assert_eq!(aggregate.have_courses, 2);
        assert_eq!(aggregate.have_credits, 6.0);
        assert!(!aggregate.ok);
        assert!(!report.ok);
        assert_eq!(aggregate.to_string(), "overall: 2/3 courses, 6/9 credits");
    }

    #[test]
    fn no_aggregate_line_without_overall_minimums() {
        let catalog: Catalog = vec![record("C1", 3.0, Category::Core)].into_iter().collect();
        let spec = RequirementSpec::new("P").with_category(CategoryKey::Core, RequirementCategory::new(1, 3.0));
        let report = run(&["C1"], &catalog, &spec);
        assert!(report.aggregate.is_none());
        assert!(report.ok);
    }

    #[test]
    fn evaluation_is_idempotent() {
        let catalog: Catalog = vec![
            record("R1", 3.0, Category::Required),
            record("C1", 4.0, Category::Core),
        ]
        .into_iter()
        .collect();
        let spec = RequirementSpec::new("P")
            .with_category(CategoryKey::Required, RequirementCategory::new(1, 3.0).all_listed())
            .with_category(CategoryKey::Core, RequirementCategory::new(2, 6.0))
            .with_overall(3, 10.0);
        let first = serde_json::to_string(&run(&["C1", "R1"], &catalog, &spec)).unwrap();
        let second = serde_json::to_string(&run(&["C1", "R1"], &catalog, &spec)).unwrap();
        assert_eq!(first, second);
    }
}
