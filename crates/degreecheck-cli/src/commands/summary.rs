//! The `degreecheck summary` command.

use std::path::PathBuf;

use anyhow::Result;

use degreecheck_core::plan::Plan;
use degreecheck_core::totals::{curriculum_totals, semester_totals, CreditTotals};
use degreecheck_core::traits::{CourseSource, ProgramData};

pub fn execute(plan_path: PathBuf, data: Option<PathBuf>, config_path: Option<PathBuf>) -> Result<()> {
    use comfy_table::{Cell, Table};

    let (_, data_dir) = super::load_data(data, config_path)?;
    let plan = Plan::load(&plan_path)?;
    let catalog = data_dir.catalog(&plan.student.major)?;

    let semesters: Vec<_> = plan
        .semesters()
        .iter()
        .map(|(term, courses)| semester_totals(term, courses, &catalog))
        .collect();
    let totals = curriculum_totals(&semesters);

    let mut table = Table::new();
    table.set_header(vec![
        "Term", "Courses", "Credits", "ECTS", "Required", "Core", "Area", "Free", "University", "GPA",
    ]);

    let row = |label: &str, courses: usize, c: &CreditTotals| {
        vec![
            Cell::new(label),
            Cell::new(courses),
            Cell::new(c.total),
            Cell::new(c.ects),
            Cell::new(c.required),
            Cell::new(c.core),
            Cell::new(c.area),
            Cell::new(c.free),
            Cell::new(c.university),
            Cell::new(
                c.gpa_if_graded()
                    .map(|g| format!("{g:.2}"))
                    .unwrap_or_else(|| "-".to_string()),
            ),
        ]
    };

    for semester in &semesters {
        table.add_row(row(&semester.term, semester.course_count, &semester.credits));
    }
    let course_count = semesters.iter().map(|s| s.course_count).sum();
    table.add_row(row("Total", course_count, &totals));

    println!("{} ({})", plan.student.major, plan.student.entry_term);
    println!("{table}");

    Ok(())
}
