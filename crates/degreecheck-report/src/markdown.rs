//! Markdown report generator.

use std::fmt::Write as _;

use degreecheck_core::report::AuditReport;

fn status_word(ok: bool) -> &'static str {
    if ok {
        "complete"
    } else {
        "incomplete"
    }
}

fn mark(ok: bool) -> &'static str {
    if ok {
        "[x]"
    } else {
        "[ ]"
    }
}

/// Format an audit report as markdown.
pub fn generate_markdown(report: &AuditReport) -> String {
    let mut md = String::new();
    let _ = writeln!(md, "# Degree Audit: {}\n", report.student.major);
    let _ = writeln!(
        md,
        "**Entry term:** {} | **Semesters:** {} | **Courses:** {} | **Status:** {}\n",
        report.student.entry_term,
        report.student.semester_count,
        report.student.course_count,
        status_word(report.ok)
    );

    md.push_str("## Totals\n\n");
    md.push_str("| Total | ECTS | University | Required | Core | Area | Free | Science | Engineering | GPA |\n");
    md.push_str("|-------|------|------------|----------|------|------|------|---------|-------------|-----|\n");
    let t = &report.totals;
    let _ = writeln!(
        md,
        "| {} | {} | {} | {} | {} | {} | {} | {} | {} | {:.2} |\n",
        t.total, t.ects, t.university, t.required, t.core, t.area, t.free, t.science,
        t.engineering, t.gpa()
    );

    if !report.semesters.is_empty() {
        md.push_str("## Semesters\n\n");
        md.push_str("| Term | Courses | Credits | ECTS | GPA |\n");
        md.push_str("|------|---------|---------|------|-----|\n");
        for semester in &report.semesters {
            let gpa = semester
                .credits
                .gpa_if_graded()
                .map(|g| format!("{g:.2}"))
                .unwrap_or_else(|| "-".to_string());
            let _ = writeln!(
                md,
                "| {} | {} | {} | {} | {} |",
                semester.term,
                semester.course_count,
                semester.credits.total,
                semester.credits.ects,
                gpa
            );
        }
        md.push('\n');
    }

    for outcome in std::iter::once(&report.major).chain(report.double_major.as_ref()) {
        let _ = writeln!(md, "## {} ({})\n", outcome.program, status_word(outcome.ok));
        for shortfall in &outcome.shortfalls {
            let _ = writeln!(md, "- {shortfall}");
        }
        for note in &outcome.diagnostics {
            let _ = writeln!(md, "- {note}");
        }
        md.push('\n');
    }

    for minor in &report.minors {
        let _ = writeln!(md, "## {} ({})\n", minor.minor, status_word(minor.ok));
        if let Some(r) = &minor.report {
            for line in &r.lines {
                let _ = writeln!(md, "- {} {}", mark(line.ok), line);
            }
            if let Some(aggregate) = &r.aggregate {
                let _ = writeln!(md, "- {} {}", mark(aggregate.ok), aggregate);
            }
        }
        for note in &minor.diagnostics {
            let _ = writeln!(md, "- {note}");
        }
        md.push('\n');
    }

    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use degreecheck_core::audit::{MajorCheck, MajorOutcome, MinorOutcome, Shortfall};
    use degreecheck_core::report::StudentSummary;
    use degreecheck_core::totals::CreditTotals;

    fn make_report() -> AuditReport {
        AuditReport {
            id: uuid::Uuid::nil(),
            created_at: chrono::Utc::now(),
            student: StudentSummary {
                major: "CS".into(),
                entry_term: "202301".into(),
                double_major: Some("MATH".into()),
                minors: vec!["BA-MINOR".into()],
                semester_count: 0,
                course_count: 2,
            },
            semesters: Vec::new(),
            totals: CreditTotals {
                total: 6.0,
                gpa_points: 21.0,
                gpa_credits: 6.0,
                ..Default::default()
            },
            major: MajorOutcome {
                program: "CS".into(),
                ok: false,
                shortfalls: vec![Shortfall {
                    check: MajorCheck::Total,
                    have: 6.0,
                    need: 125.0,
                    course: None,
                }],
                gpa: Some(3.5),
                diagnostics: Vec::new(),
            },
            double_major: Some(MajorOutcome::missing_data("MATH", "no data found for program 'MATH'")),
            minors: vec![MinorOutcome::missing_data("BA-MINOR", 2.72)],
            ok: false,
        }
    }

    #[test]
    fn markdown_output() {
        let md = generate_markdown(&make_report());
        assert!(md.contains("# Degree Audit: CS"));
        assert!(md.contains("## CS (incomplete)"));
        assert!(md.contains("- total: 6/125 credits"));
        assert!(md.contains("## MATH (incomplete)"));
        assert!(md.contains("## BA-MINOR (incomplete)"));
        assert!(md.contains("missing minor data"));
        assert!(md.contains("| 3.50 |"));
        assert!(!md.contains("## Semesters"));
    }
}
