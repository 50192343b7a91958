//! CLI command for schema diagnostics

use std::path::PathBuf;

use serde::Serialize;

use super::OutputFormat;
use crate::cli::output::{LOOKING_GLASS, print_problem, print_status, print_summary};
use crate::config::Config;
use crate::diagnostics::{DiagnosticsEngine, Problem, ProblemCollection, TextDocument};

#[derive(Serialize)]
struct FileReport<'a> {
    uri: &'a str,
    problems: &'a [Problem],
}

/// Check files against every applicable built-in schema
///
/// Exits with status 1 when any problem was found.
pub fn execute(files: &[PathBuf], format: OutputFormat, config: &Config) -> anyhow::Result<()> {
    let engines: Vec<DiagnosticsEngine> = DiagnosticsEngine::builtin()?
        .into_iter()
        .map(|engine| engine.with_source(config.diagnostics_source.as_str()))
        .collect();

    let mut collection = ProblemCollection::new();
    let mut skipped = Vec::new();

    for path in files {
        let doc = TextDocument::from_path(path)?;
        if !collection.update(&engines, &doc) {
            skipped.push(path);
        }
    }

    match format {
        OutputFormat::Text => {
            for path in &skipped {
                print_status(
                    &LOOKING_GLASS,
                    &format!("{}: no schema applies, skipped", path.display()),
                );
            }
            for (uri, problems) in collection.iter() {
                for problem in problems {
                    print_problem(uri, problem);
                }
            }
            print_summary(collection.len(), collection.problem_count());
        }
        OutputFormat::Json => {
            let reports: Vec<FileReport<'_>> = collection
                .iter()
                .map(|(uri, problems)| FileReport { uri, problems })
                .collect();
            println!("{}", serde_json::to_string_pretty(&reports)?);
        }
    }

    if collection.problem_count() > 0 {
        std::process::exit(1);
    }
    Ok(())
}
