//! The `degreecheck check` command.

use std::path::PathBuf;

use anyhow::Result;

use degreecheck_core::engine::{AuditEngine, AuditEngineConfig};
use degreecheck_core::plan::Plan;
use degreecheck_core::report::AuditReport;
use degreecheck_report::{render, write_report, ReportFormat};

pub fn execute(
    plan_path: PathBuf,
    data: Option<PathBuf>,
    config_path: Option<PathBuf>,
    format: String,
    output: Option<PathBuf>,
    fail_on_incomplete: bool,
) -> Result<()> {
    let format: ReportFormat = format.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let (config, data_dir) = super::load_data(data, config_path)?;
    let plan = Plan::load(&plan_path)?;

    let engine = AuditEngine::new(&data_dir, AuditEngineConfig::from(&config));
    let report = engine.run(&plan)?;

    match format {
        ReportFormat::Text => {
            print_summary(&report);
            print_details(&report);
        }
        ReportFormat::Markdown if output.is_none() => {
            println!("{}", render(&report, format)?);
        }
        _ => {
            let dir = output.unwrap_or_else(|| config.output_dir.clone());
            let path = write_report(&report, format, &dir)?;
            eprintln!("Report saved to {}", path.display());
            print_summary(&report);
        }
    }

    if fail_on_incomplete && !report.ok {
        std::process::exit(1);
    }

    Ok(())
}

fn status(ok: bool) -> &'static str {
    if ok {
        "complete"
    } else {
        "incomplete"
    }
}

fn print_summary(report: &AuditReport) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["Program", "Status", "Open items"]);

    for outcome in std::iter::once(&report.major).chain(report.double_major.as_ref()) {
        table.add_row(vec![
            Cell::new(&outcome.program),
            Cell::new(status(outcome.ok)),
            Cell::new(outcome.shortfalls.len() + outcome.diagnostics.len()),
        ]);
    }
    for minor in &report.minors {
        let open = minor
            .report
            .as_ref()
            .map_or(0, |r| r.unsatisfied().len() + usize::from(r.aggregate.as_ref().is_some_and(|a| !a.ok)))
            + usize::from(!minor.gpa_ok);
        table.add_row(vec![
            Cell::new(&minor.minor),
            Cell::new(status(minor.ok)),
            Cell::new(if minor.report.is_none() { "missing data".to_string() } else { open.to_string() }),
        ]);
    }

    println!("{table}");
    println!(
        "Overall: {} | {} credits | GPA {:.2}",
        status(report.ok),
        report.totals.total,
        report.totals.gpa()
    );
}

fn print_details(report: &AuditReport) {
    for outcome in std::iter::once(&report.major).chain(report.double_major.as_ref()) {
        if outcome.shortfalls.is_empty() && outcome.diagnostics.is_empty() {
            continue;
        }
        println!("\n{}:", outcome.program);
        for shortfall in &outcome.shortfalls {
            println!("  {shortfall}");
        }
        for note in &outcome.diagnostics {
            println!("  {note}");
        }
    }

    for minor in &report.minors {
        println!("\n{}:", minor.minor);
        if let Some(r) = &minor.report {
            for line in &r.lines {
                println!("  [{}] {}", if line.ok { "x" } else { " " }, line);
            }
            if let Some(aggregate) = &r.aggregate {
                println!("  [{}] {}", if aggregate.ok { "x" } else { " " }, aggregate);
            }
        }
        for note in &minor.diagnostics {
            println!("  {note}");
        }
    }
}
