//! The `degreecheck validate` command.

use std::path::PathBuf;

use anyhow::Result;

use degreecheck_core::model::Catalog;
use degreecheck_core::parser::validate_spec;

pub fn execute(data: Option<PathBuf>, config_path: Option<PathBuf>) -> Result<()> {
    let (_, data_dir) = super::load_data(data, config_path)?;

    let mut total_warnings = 0;

    let programs = data_dir.catalog_programs()?;
    for program in &programs {
        match data_dir.load_catalog(program) {
            Ok((catalog, issues)) => {
                println!("Catalog: {} ({} courses)", program, catalog.len());
                for issue in &issues {
                    println!("  WARNING: {issue}");
                }
                total_warnings += issues.len();
            }
            Err(e) => {
                println!("Catalog: {program}");
                println!("  WARNING: {e:#}");
                total_warnings += 1;
            }
        }
    }

    let (minors, issues) = data_dir.load_minor_specs()?;
    for issue in &issues {
        println!("Minors: WARNING: {issue}");
    }
    total_warnings += issues.len();

    for (code, spec) in &minors {
        println!("Minor: {} ({} categories)", code, spec.categories.len());

        let catalog = if programs.contains(code) {
            data_dir.load_catalog(code).map(|(c, _)| c).unwrap_or_default()
        } else {
            println!("  WARNING: no catalog file for {code}");
            total_warnings += 1;
            Catalog::new()
        };

        let warnings = validate_spec(spec, &catalog);
        for w in &warnings {
            let prefix = w
                .category
                .map(|c| format!("  [{c}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All data files valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
