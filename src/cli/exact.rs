use std::path::PathBuf;

use clap::Args;

use crate::cli::{export_table, read_query, CatalogSourceArgs, OutputFormat};
use crate::core::query::BomQuery;
use crate::matching::{ExactMatch, MatchingEngine};
use crate::report::{ResultTable, DEFAULT_EXPORT_FILENAME};

#[derive(Args)]
pub struct MatchArgs {
    /// BOM component identifiers
    #[arg(required_unless_present = "input")]
    pub components: Vec<String>,

    /// Read components from a file, one per line ('-' for stdin)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Export the result as CSV (default file: matching_pkgs.csv)
    #[arg(long, num_args = 0..=1, default_missing_value = DEFAULT_EXPORT_FILENAME)]
    pub export: Option<PathBuf>,

    #[command(flatten)]
    pub source: CatalogSourceArgs,
}

/// Execute match subcommand
///
/// # Errors
///
/// Returns an error if the catalog or input cannot be read.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: MatchArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let query = read_query(&args.components, args.input.as_deref())?;
    let catalog = args.source.load()?;

    if verbose {
        eprintln!(
            "Matching {} BOM items ({} distinct) against {} packages",
            query.items.len(),
            query.len(),
            catalog.len()
        );
    }

    let engine = MatchingEngine::new(&catalog);
    let result = engine.find_exact_match(&query);
    tracing::debug!("Exact match result: {}", result);

    match format {
        OutputFormat::Text => println!("The matching PKG is: {result}"),
        OutputFormat::Json => print_json_result(&query, &result)?,
        OutputFormat::Csv => print!("{}", ResultTable::from_exact(&result).to_csv_string()?),
    }

    export_table(&ResultTable::from_exact(&result), args.export.as_deref())
}

fn print_json_result(query: &BomQuery, result: &ExactMatch) -> anyhow::Result<()> {
    let output = serde_json::json!({
        "query": query.items,
        "distinct_components": query.len(),
        "found": result.is_found(),
        "matching_pkg": result.display_value(),
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
