use std::path::PathBuf;

use clap::Args;

use crate::cli::{export_table, CatalogSourceArgs, OutputFormat};
use crate::matching::{BatchMatch, MatchingEngine};
use crate::parsing::batch::read_batch_file;
use crate::parsing::table::TableFormat;
use crate::report::{ResultTable, DEFAULT_EXPORT_FILENAME};

#[derive(Args)]
pub struct BatchArgs {
    /// SKU file(s): a 'SKU' column plus BOM component columns (e.g. BOM1..BOM4)
    #[arg(required = true, num_args = 1..)]
    pub inputs: Vec<PathBuf>,

    /// Input format (detected from .csv, .tsv or .xlsx extensions; required
    /// for other files such as .txt)
    #[arg(long, value_enum)]
    pub input_format: Option<TableFormat>,

    /// Export the results as CSV (default file: matching_pkgs.csv)
    #[arg(long, num_args = 0..=1, default_missing_value = DEFAULT_EXPORT_FILENAME)]
    pub export: Option<PathBuf>,

    #[command(flatten)]
    pub source: CatalogSourceArgs,
}

/// Execute batch subcommand
///
/// Each input file is processed independently: a file that cannot be read or
/// lacks a `SKU` column is reported and skipped, and the command fails after
/// the remaining files are done.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded or any input file failed.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: BatchArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let catalog = args.source.load()?;
    let engine = MatchingEngine::new(&catalog);

    let mut results: Vec<BatchMatch> = Vec::new();
    let mut failed = Vec::new();

    for input in &args.inputs {
        match read_batch_file(input, args.input_format) {
            Ok(queries) => {
                if verbose {
                    eprintln!("{}: {} SKU rows", input.display(), queries.len());
                }
                results.extend(engine.match_batch(&queries));
            }
            Err(e) => {
                tracing::error!("{}: {}", input.display(), e);
                eprintln!("Error: {}: {e}", input.display());
                failed.push(input.display().to_string());
            }
        }
    }

    if verbose {
        let matched = results.iter().filter(|r| r.result.is_found()).count();
        eprintln!("{matched} of {} SKUs matched a PKG", results.len());
    }

    let table = ResultTable::from_batch(&results);

    // Nothing to show if every file failed
    if failed.len() < args.inputs.len() {
        match format {
            OutputFormat::Text => print!("{}", table.render_text()),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&results)?),
            OutputFormat::Csv => print!("{}", table.to_csv_string()?),
        }
        export_table(&table, args.export.as_deref())?;
    }

    if failed.is_empty() {
        Ok(())
    } else {
        anyhow::bail!(
            "{} of {} file(s) could not be processed: {}",
            failed.len(),
            args.inputs.len(),
            failed.join(", ")
        )
    }
}
