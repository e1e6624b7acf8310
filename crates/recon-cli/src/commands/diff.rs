//! Diff command
//!
//! Usage: recon diff <BEFORE> <AFTER> [--rules <FILE>] [--consolidate <EXPR>]...
//!        [--display-key <EXPR=FIELD>]... [--format text|json] [--output <FILE>]

use clap::{Args, ValueEnum};
use recon_core::config::{self, ConsolidateStep, DisplayKeyStep, ReportPlan, RulesFile};
use recon_core::errors::ReconcileError;
use recon_core::{reconcile, DiffResult};
use serde_json::Value;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct DiffArgs {
    /// JSON document before the change
    pub before: PathBuf,

    /// JSON document after the change
    pub after: PathBuf,

    /// TOML rules file (remove/add/ignore/rename plus report steps)
    #[arg(short, long)]
    pub rules: Option<PathBuf>,

    /// Consolidation expression, applied after those of the rules file
    #[arg(short, long = "consolidate", value_name = "EXPR")]
    pub consolidate: Vec<String>,

    /// Display key as EXPR=FIELD, applied after those of the rules file
    #[arg(short, long = "display-key", value_name = "EXPR=FIELD", value_parser = parse_display_key)]
    pub display_key: Vec<DisplayKeyStep>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Output file path (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One `<path> -> <lhs> <rhs>` line per entry
    Text,
    /// JSON array of `{path, lhs, rhs, times}` rows
    Json,
}

fn parse_display_key(raw: &str) -> Result<DisplayKeyStep, String> {
    match raw.rsplit_once('=') {
        Some((expression, field)) if !expression.is_empty() && !field.is_empty() => {
            Ok(DisplayKeyStep {
                expression: expression.to_string(),
                field: field.to_string(),
            })
        }
        _ => Err(format!("expected EXPR=FIELD, got '{}'", raw)),
    }
}

/// Execute diff command
pub fn execute(args: DiffArgs) -> Result<(), Box<dyn std::error::Error>> {
    let rules_file = match &args.rules {
        Some(path) => config::load_rules_file(path)?,
        None => RulesFile::default(),
    };

    let before = read_json(&args.before)?;
    let after = read_json(&args.after)?;

    let result = reconcile(&rules_file.to_rules(), &before, &after)?;
    let result = report_plan(&rules_file, &args).apply(result)?;

    let rendered = render(&result, args.format)?;

    if let Some(output_path) = args.output {
        std::fs::write(&output_path, rendered)?;
        println!("✓ Wrote {} entries to {}", result.len(), output_path.display());
    } else if !rendered.is_empty() {
        println!("{}", rendered);
    }

    Ok(())
}

/// Rules file steps first, then command-line steps in the order given.
fn report_plan(rules_file: &RulesFile, args: &DiffArgs) -> ReportPlan {
    let mut plan = rules_file.report_plan();
    plan.consolidate
        .extend(args.consolidate.iter().map(|expression| ConsolidateStep {
            expression: expression.clone(),
        }));
    plan.display_key.extend(args.display_key.iter().cloned());
    plan
}

fn read_json(path: &Path) -> Result<Value, ReconcileError> {
    let text = std::fs::read_to_string(path).map_err(|e| ReconcileError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    serde_json::from_str(&text).map_err(|e| ReconcileError::Serialization {
        message: format!("{}: {}", path.display(), e),
    })
}

fn render(result: &DiffResult, format: OutputFormat) -> Result<String, ReconcileError> {
    match format {
        OutputFormat::Text => Ok(result.print_diff()),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&result.report_rows())?),
    }
}
