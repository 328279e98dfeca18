//! Web server for browser-based package matching.
//!
//! ## Starting the Server
//!
//! ```text
//! # Start on default port 8080
//! pkg-matcher serve
//!
//! # Custom port, custom catalog, auto-open browser
//! pkg-matcher serve --port 3000 --catalog pkgs.xlsx --open
//! ```
//!
//! ## API Endpoints
//!
//! - `GET /` - Main page with manual entry and file upload
//! - `POST /api/match` - Exact match of a BOM (JSON body)
//! - `POST /api/where-used` - Packages containing every given item (JSON body)
//! - `POST /api/batch` - Match an uploaded SKU file (multipart form, field `file`)
//! - `GET /api/catalog` - List all packages in the catalog
//!
//! The match endpoints accept `?format=csv` to download the result as
//! `matching_pkgs.csv`.

pub mod server;
