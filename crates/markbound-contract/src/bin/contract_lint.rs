use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use markbound_contract::validation::ContractIssue;
use markbound_contract::{ContractDocument, schema_json_pretty};
use markbound_template::parse_template;

#[derive(Parser)]
#[command(
    name = "contract-lint",
    about = "Validate report contracts and inspect template marks."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate a contract document (YAML, or JSON for `.json` files).
    Check {
        /// Path to the contract document.
        file: PathBuf,
        /// Emit the result as JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// List the marks found in a spreadsheet template.
    Marks {
        /// Path to the template workbook.
        template: PathBuf,
    },
    /// Print the JSON Schema for contract documents.
    Schema,
}

#[derive(Serialize)]
struct CheckReport<'a> {
    ok: bool,
    issues: &'a [ContractIssue],
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Check { file, json } => check(&file, json),
        Command::Marks { template } => marks(&template),
        Command::Schema => {
            println!("{}", schema_json_pretty()?);
            Ok(())
        }
    }
}

fn check(path: &Path, json: bool) -> Result<()> {
    let document = load_document(path)?;
    match document.validate() {
        Ok(()) => {
            if json {
                let report = CheckReport {
                    ok: true,
                    issues: &[],
                };
                println!("{}", serde_json::to_string(&report)?);
            } else {
                println!(
                    "{}: ok ({} binding(s), {} data source(s))",
                    path.display(),
                    document.contract.bindings.len(),
                    document.contract.data_sources.len()
                );
            }
            Ok(())
        }
        Err(err) => {
            if json {
                let report = CheckReport {
                    ok: false,
                    issues: &err.issues,
                };
                println!("{}", serde_json::to_string(&report)?);
            } else {
                eprintln!("{}: invalid", path.display());
                for issue in &err.issues {
                    eprintln!("  {issue}");
                }
            }
            std::process::exit(1);
        }
    }
}

fn marks(path: &Path) -> Result<()> {
    let marks = parse_template(path).with_context(|| format!("scan {}", path.display()))?;
    if marks.is_empty() {
        println!("no marks found");
        return Ok(());
    }
    for item in &marks {
        println!("{}\t{}", item.kind, item.mark);
    }
    Ok(())
}

fn load_document(path: &Path) -> Result<ContractDocument> {
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        let text =
            std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        ContractDocument::from_json_str(&text)
            .with_context(|| format!("parse {}", path.display()))
    } else {
        let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
        ContractDocument::from_yaml_reader(file)
            .with_context(|| format!("parse {}", path.display()))
    }
}
