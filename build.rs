use std::collections::HashSet;
use std::path::Path;

const CATALOG_PATH: &str = "catalogs/default_pkgs.csv";

fn main() {
    let catalog_path = Path::new(CATALOG_PATH);
    validate_catalog_file(catalog_path);
    set_build_dependencies();
}

fn validate_catalog_file(catalog_path: &Path) {
    // Ensure catalog exists at build time
    assert!(
        catalog_path.exists(),
        "\n\nCATALOG BUILD ERROR: File not found\n\
         Path: {}\n\
         Please create the catalog file before building.\n",
        catalog_path.display()
    );

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(catalog_path)
        .unwrap_or_else(|e| {
            panic!(
                "\n\nCATALOG BUILD ERROR: Failed to open file\n\
                 Path: {}\n\
                 Error: {e}\n",
                catalog_path.display()
            );
        });

    let mut records = reader.records();

    let header = records
        .next()
        .unwrap_or_else(|| {
            panic!(
                "\n\nCATALOG BUILD ERROR: Missing header row\n\
                 The first row must list package names.\n"
            );
        })
        .unwrap_or_else(|e| {
            panic!("\n\nCATALOG BUILD ERROR: Unreadable header row\nError: {e}\n");
        });

    let names = validate_header(&header);

    let mut components = 0usize;
    for (i, record) in records.enumerate() {
        let record = record.unwrap_or_else(|e| {
            // Row numbers are 1-based and the header is row 1
            panic!("\n\nCATALOG BUILD ERROR: Unreadable row {}\nError: {e}\n", i + 2);
        });
        components += record.iter().filter(|cell| !cell.trim().is_empty()).count();
    }

    println!(
        "cargo:warning=Validated catalog: {} packages, {components} total component cells",
        names.len()
    );
}

fn validate_header(header: &csv::StringRecord) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut names = Vec::new();

    for (i, cell) in header.iter().enumerate() {
        let name = cell.trim();
        assert!(
            !name.is_empty(),
            "\n\nCATALOG BUILD ERROR: Package name in column {} is blank\n",
            i + 1
        );
        assert!(
            seen.insert(name.to_string()),
            "\n\nCATALOG BUILD ERROR: Package '{name}' is defined more than once\n\
             The embedded catalog must not rely on last-write-wins.\n"
        );
        names.push(name.to_string());
    }

    assert!(
        !names.is_empty(),
        "\n\nCATALOG BUILD ERROR: Header row has no package names\n"
    );

    names
}

fn set_build_dependencies() {
    // Tell cargo to rerun if catalog changes
    println!("cargo:rerun-if-changed={CATALOG_PATH}");

    // Tell cargo to rerun if build.rs changes
    println!("cargo:rerun-if-changed=build.rs");
}
