//! `validate` command handler.
//!
//! Loads each game file through the same loader as `play`, also checking
//! that its word catalog can be built, and reports every issue found.

use std::path::Path;

use crate::cli::args::{OutputFormat, ValidateArgs};
use crate::config::{ConfigLoader, LoadResult};
use crate::error::{ConfigError, Severity, ValidationIssue, WordmonError};

/// Validate game files without playing.
///
/// Every file is checked even after a failure; the first failure is
/// returned once all files were reported.
///
/// # Errors
///
/// Returns a config error if any file fails to load or validate, or if
/// `--strict` is set and any file has warnings.
pub fn run(args: &ValidateArgs) -> Result<(), WordmonError> {
    let loader = ConfigLoader::with_defaults();
    let mut first_failure: Option<WordmonError> = None;
    let mut reports = Vec::with_capacity(args.files.len());

    for path in &args.files {
        tracing::info!(file = %path.display(), "validating game file");
        let outcome = check(&loader, path, args.strict);

        match args.format {
            OutputFormat::Human => print_human(path, &outcome),
            OutputFormat::Json => reports.push(json_report(path, &outcome)),
        }

        if let Err(e) = outcome
            && first_failure.is_none()
        {
            first_failure = Some(e);
        }
    }

    if args.format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }

    first_failure.map_or(Ok(()), Err)
}

fn check(loader: &ConfigLoader, path: &Path, strict: bool) -> Result<LoadResult, WordmonError> {
    let loaded = loader.load(Some(path))?;
    loaded.config.catalog()?;

    if strict && !loaded.warnings.is_empty() {
        let errors = loaded
            .warnings
            .iter()
            .map(|w| ValidationIssue {
                severity: Severity::Error,
                ..w.clone()
            })
            .collect();
        return Err(ConfigError::ValidationError {
            path: path.display().to_string(),
            errors,
        }
        .into());
    }
    Ok(loaded)
}

fn issues(outcome: &Result<LoadResult, WordmonError>) -> Vec<String> {
    match outcome {
        Ok(loaded) => loaded.warnings.iter().map(ToString::to_string).collect(),
        Err(WordmonError::Config(ConfigError::ValidationError { errors, .. })) => {
            errors.iter().map(ToString::to_string).collect()
        }
        Err(e) => vec![format!("error: {e}")],
    }
}

fn print_human(path: &Path, outcome: &Result<LoadResult, WordmonError>) {
    let status = if outcome.is_ok() { "ok" } else { "invalid" };
    println!("{}: {status}", path.display());
    for issue in issues(outcome) {
        println!("  {issue}");
    }
}

fn json_report(path: &Path, outcome: &Result<LoadResult, WordmonError>) -> serde_json::Value {
    serde_json::json!({
        "file": path.display().to_string(),
        "valid": outcome.is_ok(),
        "issues": issues(outcome),
    })
}
