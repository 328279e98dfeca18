use std::path::PathBuf;

use clap::Args;

use crate::cli::{export_table, read_query, CatalogSourceArgs, OutputFormat};
use crate::core::query::BomQuery;
use crate::matching::{MatchingEngine, WhereUsed};
use crate::report::{ResultTable, DEFAULT_EXPORT_FILENAME};

#[derive(Args)]
pub struct WhereUsedArgs {
    /// BOM items that every listed package must contain
    #[arg(required_unless_present = "input")]
    pub components: Vec<String>,

    /// Read items from a file, one per line ('-' for stdin)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Export the result as CSV (default file: matching_pkgs.csv)
    #[arg(long, num_args = 0..=1, default_missing_value = DEFAULT_EXPORT_FILENAME)]
    pub export: Option<PathBuf>,

    #[command(flatten)]
    pub source: CatalogSourceArgs,
}

/// Execute where-used subcommand
///
/// # Errors
///
/// Returns an error if the catalog or input cannot be read.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: WhereUsedArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let query = read_query(&args.components, args.input.as_deref())?;
    let catalog = args.source.load()?;

    let engine = MatchingEngine::new(&catalog);
    let result = engine.find_packages_containing(&query);

    if verbose {
        eprintln!(
            "{} of {} packages use all {} item(s)",
            result.packages().len(),
            catalog.len(),
            query.len()
        );
    }

    let table = ResultTable::from_where_used(&result);

    match format {
        OutputFormat::Text => {
            println!("The following PKG files use all the specified BOM items:");
            print!("{}", table.render_text());
        }
        OutputFormat::Json => print_json_result(&query, &result)?,
        OutputFormat::Csv => print!("{}", table.to_csv_string()?),
    }

    export_table(&table, args.export.as_deref())
}

fn print_json_result(query: &BomQuery, result: &WhereUsed) -> anyhow::Result<()> {
    let output = serde_json::json!({
        "query": query.items,
        "found": result.is_found(),
        "matching_pkgs": result.display_values(),
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
