use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::catalog::store::PackageCatalog;
use crate::cli::{CatalogSourceArgs, OutputFormat};
use crate::core::package::Package;
use crate::report::ResultTable;

#[derive(Args)]
pub struct CatalogArgs {
    #[command(subcommand)]
    pub command: CatalogCommands,
}

#[derive(Subcommand)]
pub enum CatalogCommands {
    /// List all packages in the catalog
    List {
        #[command(flatten)]
        source: CatalogSourceArgs,
    },

    /// Show the components of a package
    Show {
        /// Package name
        #[arg(required = true)]
        name: String,

        #[command(flatten)]
        source: CatalogSourceArgs,
    },

    /// Export the catalog to a JSON file
    Export {
        /// Output file path
        #[arg(required = true)]
        output: PathBuf,

        #[command(flatten)]
        source: CatalogSourceArgs,
    },
}

/// Execute catalog subcommand
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded, the package does not
/// exist, or the export cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: CatalogArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    match args.command {
        CatalogCommands::List { source } => {
            let catalog = source.load()?;
            list_packages(&catalog, format)
        }
        CatalogCommands::Show { name, source } => {
            let catalog = source.load()?;
            let package = catalog
                .get(&name)
                .ok_or_else(|| anyhow::anyhow!("Package '{name}' not found in catalog"))?;
            show_package(package, format)
        }
        CatalogCommands::Export { output, source } => {
            let catalog = source.load()?;
            std::fs::write(&output, catalog.to_json()?)?;
            if verbose {
                eprintln!("Exported {} packages", catalog.len());
            }
            println!("Catalog exported to {}", output.display());
            Ok(())
        }
    }
}

fn list_packages(catalog: &PackageCatalog, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            println!("Packages in catalog: {}", catalog.len());
            println!();
            print!("{}", summary_table(catalog).render_text());
        }
        OutputFormat::Json => {
            let packages: Vec<serde_json::Value> = catalog
                .packages()
                .map(|p| {
                    serde_json::json!({
                        "name": p.name,
                        "component_count": p.len(),
                    })
                })
                .collect();
            let output = serde_json::json!({
                "count": packages.len(),
                "packages": packages,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Csv => print!("{}", summary_table(catalog).to_csv_string()?),
    }
    Ok(())
}

fn summary_table(catalog: &PackageCatalog) -> ResultTable {
    ResultTable::new(
        vec!["PKG".to_string(), "Components".to_string()],
        catalog
            .packages()
            .map(|p| vec![p.name.to_string(), p.len().to_string()])
            .collect(),
    )
}

fn show_package(package: &Package, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            println!("{}", package.name);
            println!("{}", "=".repeat(package.name.as_str().chars().count().max(3)));
            println!("Components: {}", package.len());
            for component in &package.components {
                println!("  {component}");
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(package)?),
        OutputFormat::Csv => {
            let table = ResultTable::new(
                vec![package.name.to_string()],
                package.components.iter().map(|c| vec![c.clone()]).collect(),
            );
            print!("{}", table.to_csv_string()?);
        }
    }
    Ok(())
}
