//! HTML report generator.
//!
//! Produces a self-contained HTML file with all CSS/JS inlined.

use anyhow::Result;
use std::path::Path;

use degreecheck_core::allocation::Placement;
use degreecheck_core::audit::{MajorOutcome, MinorOutcome};
use degreecheck_core::report::AuditReport;

/// Escape a string for safe HTML insertion.
pub(crate) fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn status_cell(ok: bool) -> &'static str {
    if ok {
        "<td class=\"pass\">complete</td>"
    } else {
        "<td class=\"fail\">incomplete</td>"
    }
}

/// Generate an HTML report from an audit report.
pub fn generate_html(report: &AuditReport) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>degreecheck audit: {}</title>\n",
        html_escape(&report.student.major)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str("<h1>degreecheck audit</h1>\n");
    html.push_str(&format!(
        "<p class=\"meta\">Major: <strong>{}</strong> | entry term {} | {} semesters | {} courses | {}</p>\n",
        html_escape(&report.student.major),
        html_escape(&report.student.entry_term),
        report.student.semester_count,
        report.student.course_count,
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    // Program status
    html.push_str("<section class=\"dashboard\">\n");
    html.push_str("<h2>Programs</h2>\n");
    html.push_str("<table class=\"summary\">\n");
    html.push_str("<thead><tr><th>Program</th><th>Status</th></tr></thead>\n<tbody>\n");
    for (program, ok) in report.program_status() {
        html.push_str(&format!(
            "<tr><td>{}</td>{}</tr>\n",
            html_escape(&program),
            status_cell(ok)
        ));
    }
    html.push_str("</tbody></table>\n");

    let t = &report.totals;
    html.push_str("<table class=\"summary\">\n");
    html.push_str("<thead><tr><th>Total</th><th>ECTS</th><th>University</th><th>Required</th><th>Core</th><th>Area</th><th>Free</th><th>Science</th><th>Engineering</th><th>GPA</th></tr></thead>\n");
    html.push_str(&format!(
        "<tbody><tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{:.2}</td></tr></tbody></table>\n",
        t.total, t.ects, t.university, t.required, t.core, t.area, t.free, t.science, t.engineering, t.gpa()
    ));
    html.push_str("</section>\n");

    // Majors
    html.push_str("<section class=\"majors\">\n");
    for outcome in std::iter::once(&report.major).chain(report.double_major.as_ref()) {
        html.push_str(&major_section(outcome));
    }
    html.push_str("</section>\n");

    // Minors
    if !report.minors.is_empty() {
        html.push_str("<section class=\"minors\">\n");
        for minor in &report.minors {
            html.push_str(&minor_section(minor));
        }
        html.push_str("</section>\n");
    }

    // Semesters
    html.push_str("<section class=\"results\">\n");
    html.push_str("<h2>Semesters</h2>\n");
    html.push_str("<table class=\"results-table\" id=\"results\">\n");
    html.push_str("<thead><tr><th onclick=\"sortTable(0)\">Term</th><th onclick=\"sortTable(1)\">Courses</th><th onclick=\"sortTable(2)\">Credits</th><th onclick=\"sortTable(3)\">ECTS</th><th onclick=\"sortTable(4)\">GPA</th></tr></thead>\n");
    html.push_str("<tbody>\n");
    for semester in &report.semesters {
        let gpa = semester
            .credits
            .gpa_if_graded()
            .map(|g| format!("{g:.2}"))
            .unwrap_or_else(|| "-".to_string());
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            html_escape(&semester.term),
            semester.course_count,
            semester.credits.total,
            semester.credits.ects,
            gpa
        ));
    }
    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(
        &serde_json::to_string_pretty(report)
            .unwrap_or_default()
            .replace('<', "&lt;")
            .replace('>', "&gt;"),
    );
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    // JavaScript for sorting
    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write an HTML report to a file.
pub fn write_html_report(report: &AuditReport, path: &Path) -> Result<()> {
    let html = generate_html(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)?;
    Ok(())
}

fn major_section(outcome: &MajorOutcome) -> String {
    let mut html = format!(
        "<h2>{} <span class=\"{}\">{}</span></h2>\n",
        html_escape(&outcome.program),
        if outcome.ok { "pass" } else { "fail" },
        if outcome.ok { "complete" } else { "incomplete" }
    );
    if !outcome.shortfalls.is_empty() || !outcome.diagnostics.is_empty() {
        html.push_str("<ul>\n");
        for shortfall in &outcome.shortfalls {
            html.push_str(&format!("<li>{}</li>\n", html_escape(&shortfall.to_string())));
        }
        for note in &outcome.diagnostics {
            html.push_str(&format!("<li>{}</li>\n", html_escape(note)));
        }
        html.push_str("</ul>\n");
    }
    html
}

fn minor_section(minor: &MinorOutcome) -> String {
    let mut html = format!(
        "<h2>{} <span class=\"{}\">{}</span></h2>\n",
        html_escape(&minor.minor),
        if minor.ok { "pass" } else { "fail" },
        if minor.ok { "complete" } else { "incomplete" }
    );

    if let Some(report) = &minor.report {
        let bars: Vec<(String, f64)> = report
            .lines
            .iter()
            .map(|line| (line.category.to_string(), progress(line.have_credits, line.need_credits)))
            .collect();
        if !bars.is_empty() {
            html.push_str(&generate_bar_chart(&bars));
        }

        html.push_str("<table class=\"summary\">\n");
        html.push_str("<thead><tr><th>Category</th><th>Courses</th><th>Credits</th><th>Missing</th><th>Status</th></tr></thead>\n<tbody>\n");
        for line in &report.lines {
            let mut missing = line.missing_courses.clone();
            missing.extend(line.missing_groups.iter().map(|g| format!("one of {}", g.join("/"))));
            html.push_str(&format!(
                "<tr><td>{}</td><td>{}/{}</td><td>{}/{}</td><td>{}</td>{}</tr>\n",
                line.category,
                line.have_courses,
                line.need_courses,
                line.have_credits,
                line.need_credits,
                html_escape(&missing.join(", ")),
                status_cell(line.ok)
            ));
        }
        if let Some(aggregate) = &report.aggregate {
            html.push_str(&format!(
                "<tr><td>overall</td><td>{}/{}</td><td>{}/{}</td><td></td>{}</tr>\n",
                aggregate.have_courses,
                aggregate.need_courses,
                aggregate.have_credits,
                aggregate.need_credits,
                status_cell(aggregate.ok)
            ));
        }
        html.push_str("</tbody></table>\n");
    }

    if let Some(allocation) = &minor.allocation {
        html.push_str("<details>\n<summary>Course placements</summary>\n");
        html.push_str("<table class=\"placements\">\n");
        html.push_str("<thead><tr><th>Course</th><th>Catalog category</th><th>Counted as</th></tr></thead>\n<tbody>\n");
        for placement in &allocation.placements {
            let counted = match placement.placement {
                Placement::Assigned(key) => key.to_string(),
                Placement::Dropped => "not counted".to_string(),
            };
            html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                html_escape(&placement.code),
                placement.base,
                counted
            ));
        }
        html.push_str("</tbody></table>\n</details>\n");
    }

    if !minor.diagnostics.is_empty() {
        html.push_str("<ul>\n");
        for note in &minor.diagnostics {
            html.push_str(&format!("<li>{}</li>\n", html_escape(note)));
        }
        html.push_str("</ul>\n");
    }
    html
}

/// Fraction of a credit minimum reached, capped at 1. No minimum counts as done.
fn progress(have: f64, need: f64) -> f64 {
    if need <= 0.0 {
        1.0
    } else {
        (have / need).clamp(0.0, 1.0)
    }
}

fn generate_bar_chart(bars: &[(String, f64)]) -> String {
    let bar_height = 24;
    let max_width = 400;
    let padding = 8;
    let label_width = 120;

    let total_height = bars.len() * (bar_height + padding) + padding;

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        label_width + max_width + 60,
        total_height
    );

    for (i, (label, score)) in bars.iter().enumerate() {
        let y = i * (bar_height + padding) + padding;
        let width = (*score * max_width as f64) as usize;

        let color = if *score >= 1.0 {
            "#22c55e"
        } else if *score >= 0.5 {
            "#eab308"
        } else {
            "#ef4444"
        };

        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"14\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>\n",
            label_width - 10,
            y + bar_height / 2,
            html_escape(label)
        ));
        svg.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" rx=\"4\"/>\n",
            label_width, y, width, bar_height, color
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" dominant-baseline=\"middle\">{:.0}%</text>\n",
            label_width + width + 8,
            y + bar_height / 2,
            score * 100.0
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --pass: #dcfce7; --fail: #fde2e2; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --pass: #064e3b; --fail: #7f1d1d; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
h2 span { font-size: 0.8rem; padding: 0.2rem 0.6rem; border-radius: 999px; vertical-align: middle; }
.meta { color: #6b7280; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); cursor: pointer; }
.pass { background: var(--pass); }
.fail { background: var(--fail); }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;

const JS: &str = r#"
function sortTable(col) {
  const table = document.getElementById('results');
  const tbody = table.querySelector('tbody');
  const rows = Array.from(tbody.querySelectorAll('tr'));
  const asc = table.dataset.sortCol == col && table.dataset.sortDir == 'asc' ? false : true;
  rows.sort((a, b) => {
    const va = a.cells[col].textContent;
    const vb = b.cells[col].textContent;
    return asc ? va.localeCompare(vb) : vb.localeCompare(va);
  });
  table.dataset.sortCol = col;
  table.dataset.sortDir = asc ? 'asc' : 'desc';
  rows.forEach(r => tbody.appendChild(r));
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use degreecheck_core::allocation::allocate;
    use degreecheck_core::audit::{audit_minor, MajorCheck, Shortfall};
    use degreecheck_core::allocation::AllocationOptions;
    use degreecheck_core::model::{
        Catalog, Category, CategoryKey, CourseRecord, RequirementCategory, RequirementSpec,
        TakenCourse,
    };
    use degreecheck_core::report::StudentSummary;
    use degreecheck_core::totals::{semester_totals, CreditTotals};

    fn make_test_report() -> AuditReport {
        let catalog: Catalog = [("BA101", Category::Required), ("BA<201>", Category::Core)]
            .into_iter()
            .map(|(code, category)| CourseRecord {
                code: code.into(),
                name: String::new(),
                credit_su: 3.0,
                credit_ects: 6.0,
                category,
                basic_science: 0.0,
                engineering: 0.0,
            })
            .collect();
        let spec = RequirementSpec::new("Business")
            .with_category(CategoryKey::Required, RequirementCategory::new(1, 3.0))
            .with_category(CategoryKey::Core, RequirementCategory::new(2, 6.0));
        let taken = vec![
            TakenCourse::new("BA101", Some("A")),
            TakenCourse::new("BA<201>", Some("B")),
        ];
        let minor = audit_minor(
            "BA-MINOR",
            &spec,
            &catalog,
            &taken,
            Some(3.5),
            2.72,
            &AllocationOptions::default(),
        );
        assert_eq!(allocate(&taken, &catalog, &spec), minor.allocation.clone().unwrap());

        AuditReport {
            id: uuid::Uuid::nil(),
            created_at: chrono::Utc::now(),
            student: StudentSummary {
                major: "CS".into(),
                entry_term: "202301".into(),
                double_major: None,
                minors: vec!["BA-MINOR".into()],
                semester_count: 1,
                course_count: 2,
            },
            semesters: vec![semester_totals("Fall 2023-2024", &taken, &catalog)],
            totals: CreditTotals::default(),
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
            double_major: None,
            minors: vec![minor],
            ok: false,
        }
    }

    #[test]
    fn html_report_contains_required_elements() {
        let report = make_test_report();
        let html = generate_html(&report);

        assert!(html.contains("<html"));
        assert!(html.contains("</html>"));
        assert!(html.contains("BA-MINOR"));
        assert!(html.contains("Fall 2023-2024"));
        assert!(html.contains("total: 6/125 credits"));
        assert!(html.contains("<svg"));
        assert!(html.contains("BA&lt;201&gt;"));
        assert!(!html.contains("BA<201>"));
    }

    #[test]
    fn html_report_write_to_file() {
        let report = make_test_report();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.html");

        write_html_report(&report, &path).unwrap();
        assert!(path.exists());

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("<html"));
    }

    #[test]
    fn progress_is_capped() {
        assert_eq!(progress(6.0, 3.0), 1.0);
        assert_eq!(progress(0.0, 0.0), 1.0);
        assert_eq!(progress(1.5, 3.0), 0.5);
    }
}
