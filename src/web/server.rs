use axum::http::header;
use axum::{
    extract::{DefaultBodyLimit, Multipart, Query, State},
    http::{HeaderName, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::limit::ConcurrencyLimitLayer;
use tower::ServiceBuilder;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::timeout::TimeoutLayer;

use crate::catalog::store::PackageCatalog;
use crate::cli::ServeArgs;
use crate::core::query::BomQuery;
use crate::matching::MatchingEngine;
use crate::parsing::batch::{read_batch_bytes, BatchError};
use crate::parsing::table::TableFormat;
use crate::report::{ResultTable, DEFAULT_EXPORT_FILENAME};
use crate::utils::validation::{sniff_table_format, validate_upload, ValidationError};

/// Security configuration constants to prevent `DoS` attacks
pub const MAX_MULTIPART_FIELDS: usize = 10;
pub const MAX_FILE_FIELD_SIZE: usize = 16 * 1024 * 1024; // 16MB
pub const MAX_TEXT_FIELD_SIZE: usize = 1024 * 1024; // 1MB

/// Shared application state
pub struct AppState {
    pub catalog: PackageCatalog,
}

/// Enhanced error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_type: String,
    pub details: Option<String>,
}

/// Body of `/api/match` and `/api/where-used`
///
/// Items may arrive as a list, as newline-separated text, or both.
#[derive(Debug, Default, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub components: Vec<String>,
    #[serde(default)]
    pub text: Option<String>,
}

impl QueryRequest {
    fn into_query(self) -> BomQuery {
        let lines = self
            .text
            .as_deref()
            .map(|t| t.lines().map(str::to_string).collect::<Vec<_>>())
            .unwrap_or_default();
        BomQuery::new(self.components.into_iter().chain(lines))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    #[default]
    Json,
    Csv,
}

#[derive(Debug, Default, Deserialize)]
pub struct FormatParams {
    #[serde(default)]
    pub format: ResponseFormat,
}

/// Create a safe error response that prevents information disclosure
/// while logging detailed errors server-side for debugging
pub fn create_safe_error_response(
    error_type: &str,
    user_message: &str,
    internal_error: Option<&str>,
) -> ErrorResponse {
    if let Some(internal_msg) = internal_error {
        tracing::error!("Internal error ({}): {}", error_type, internal_msg);
    }

    ErrorResponse {
        error: user_message.to_string(),
        error_type: error_type.to_string(),
        details: None,
    }
}

fn error_response(status: StatusCode, body: ErrorResponse) -> Response {
    (status, Json(body)).into_response()
}

/// Run the web server
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded, the tokio runtime cannot
/// be created, or the server fails to start.
pub fn run(args: ServeArgs) -> anyhow::Result<()> {
    let catalog = args.source.load()?;
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move { run_server(args, catalog).await })
}

/// Create the application router with all routes and security middleware.
///
/// Rate limiting is keyed on the peer address and is added by the server
/// itself, so the router can be driven directly in tests.
pub fn create_router(catalog: PackageCatalog) -> Router {
    let state = Arc::new(AppState { catalog });

    Router::new()
        .route("/", get(index_handler))
        .route("/api/match", post(match_handler))
        .route("/api/where-used", post(where_used_handler))
        .route("/api/batch", post(batch_handler))
        .route("/api/catalog", get(catalog_handler))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                // Security headers for browser protection
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("x-content-type-options"),
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("x-frame-options"),
                    HeaderValue::from_static("DENY"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("x-xss-protection"),
                    HeaderValue::from_static("1; mode=block"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("referrer-policy"),
                    HeaderValue::from_static("strict-origin-when-cross-origin"),
                ))
                // Request timeout to prevent slow client attacks
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    Duration::from_secs(30),
                ))
                .layer(ConcurrencyLimitLayer::new(100))
                // Largest file plus multipart overhead
                .layer(DefaultBodyLimit::max(20 * 1024 * 1024)),
        )
}

async fn run_server(args: ServeArgs, catalog: PackageCatalog) -> anyhow::Result<()> {
    // IP-based rate limiting: 10 requests per second, bursts of 50
    let governor_conf = GovernorConfigBuilder::default()
        .per_second(10)
        .burst_size(50)
        .finish()
        .ok_or_else(|| anyhow::anyhow!("Invalid rate limiter configuration"))?;

    let app = create_router(catalog).layer(GovernorLayer {
        config: Arc::new(governor_conf),
    });

    let addr = format!("{}:{}", args.address, args.port);
    println!("Starting pkg-matcher web server at http://{addr}");

    if args.open {
        let _ = open::that(format!("http://{addr}"));
    }

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Main page handler
async fn index_handler() -> Html<&'static str> {
    Html(include_str!("templates/index.html"))
}

/// Serve a table as a `matching_pkgs.csv` download
fn csv_attachment(table: &ResultTable) -> Response {
    match table.to_csv_string() {
        Ok(csv) => (
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{DEFAULT_EXPORT_FILENAME}\""),
                ),
            ],
            csv,
        )
            .into_response(),
        Err(e) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            create_safe_error_response(
                "export_failed",
                "Unable to export results",
                Some(&e.to_string()),
            ),
        ),
    }
}

fn check_text_size(request: &QueryRequest) -> Result<(), Response> {
    let text_len = request.text.as_deref().map_or(0, str::len);
    let list_len: usize = request.components.iter().map(String::len).sum();
    if text_len + list_len > MAX_TEXT_FIELD_SIZE {
        return Err(error_response(
            StatusCode::PAYLOAD_TOO_LARGE,
            ErrorResponse {
                error: "Text field size exceeds limit".to_string(),
                error_type: "text_too_large".to_string(),
                details: None,
            },
        ));
    }
    Ok(())
}

/// Exact match of a single BOM
async fn match_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FormatParams>,
    Json(request): Json<QueryRequest>,
) -> Response {
    if let Err(response) = check_text_size(&request) {
        return response;
    }

    let query = request.into_query();
    let result = MatchingEngine::new(&state.catalog).find_exact_match(&query);
    tracing::debug!("Exact match for {} items: {}", query.len(), result);

    match params.format {
        ResponseFormat::Csv => csv_attachment(&ResultTable::from_exact(&result)),
        ResponseFormat::Json => Json(serde_json::json!({
            "query": query.items,
            "found": result.is_found(),
            "matching_pkg": result.display_value(),
        }))
        .into_response(),
    }
}

/// Packages containing every queried item
async fn where_used_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FormatParams>,
    Json(request): Json<QueryRequest>,
) -> Response {
    if let Err(response) = check_text_size(&request) {
        return response;
    }

    let query = request.into_query();
    let result = MatchingEngine::new(&state.catalog).find_packages_containing(&query);

    match params.format {
        ResponseFormat::Csv => csv_attachment(&ResultTable::from_where_used(&result)),
        ResponseFormat::Json => Json(serde_json::json!({
            "query": query.items,
            "found": result.is_found(),
            "matching_pkgs": result.display_values(),
        }))
        .into_response(),
    }
}

/// An uploaded SKU file
struct Upload {
    filename: Option<String>,
    content: Vec<u8>,
}

/// Pull the `file` field out of a multipart body
async fn extract_upload(multipart: &mut Multipart) -> Result<Upload, Response> {
    let mut upload = None;
    let mut fields_received = 0usize;
    let mut had_parse_error = false;

    loop {
        if fields_received >= MAX_MULTIPART_FIELDS {
            return Err(error_response(
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error: "Too many form fields".to_string(),
                    error_type: "field_limit_exceeded".to_string(),
                    details: None,
                },
            ));
        }

        match multipart.next_field().await {
            Ok(Some(field)) => {
                fields_received += 1;
                if field.name() != Some("file") {
                    continue;
                }

                let filename = field.file_name().map(ToString::to_string);
                match field.bytes().await {
                    Ok(bytes) => {
                        if bytes.len() > MAX_FILE_FIELD_SIZE {
                            return Err(error_response(
                                StatusCode::PAYLOAD_TOO_LARGE,
                                ErrorResponse {
                                    error: "File size exceeds limit".to_string(),
                                    error_type: "file_too_large".to_string(),
                                    details: None,
                                },
                            ));
                        }
                        upload = Some(Upload {
                            filename,
                            content: bytes.to_vec(),
                        });
                    }
                    Err(_) => had_parse_error = true,
                }
            }
            Ok(None) => break,
            Err(_) => {
                had_parse_error = true;
                break;
            }
        }
    }

    upload.ok_or_else(|| {
        let error_msg = if had_parse_error {
            "Failed to parse upload. Please check the file format."
        } else {
            "No file received. Please upload a SKU file."
        };
        error_response(
            StatusCode::BAD_REQUEST,
            create_safe_error_response("missing_input", error_msg, None),
        )
    })
}

fn validation_error_response(error: &ValidationError) -> Response {
    let (error_type, message) = match error {
        ValidationError::FilenameTooLong => (
            "filename_too_long",
            "Filename exceeds maximum length limit",
        ),
        ValidationError::InvalidFilename | ValidationError::EmptyFilename => (
            "invalid_filename",
            "Filename contains invalid or dangerous characters",
        ),
        ValidationError::FormatValidationFailed => (
            "format_mismatch",
            "File content does not match the expected format based on filename",
        ),
        ValidationError::InvalidFileContent => (
            "invalid_content",
            "File content appears malformed or corrupted",
        ),
    };
    error_response(
        StatusCode::BAD_REQUEST,
        create_safe_error_response(error_type, message, Some(&error.to_string())),
    )
}

/// Match every row of an uploaded SKU file
async fn batch_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FormatParams>,
    mut multipart: Multipart,
) -> Response {
    let upload = match extract_upload(&mut multipart).await {
        Ok(upload) => upload,
        Err(response) => return response,
    };

    let format = upload
        .filename
        .as_deref()
        .and_then(TableFormat::from_filename)
        .unwrap_or_else(|| sniff_table_format(&upload.content));

    if let Err(e) = validate_upload(upload.filename.as_deref(), &upload.content, format) {
        return validation_error_response(&e);
    }

    let queries = match read_batch_bytes(&upload.content, format) {
        Ok(queries) => queries,
        Err(e @ BatchError::MissingRequiredColumn(_)) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                create_safe_error_response("missing_required_column", &e.to_string(), None),
            );
        }
        Err(BatchError::Table(e)) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                create_safe_error_response(
                    "parse_failed",
                    "Unable to process file content. Please check the file format and try again.",
                    Some(&e.to_string()),
                ),
            );
        }
    };

    let results = MatchingEngine::new(&state.catalog).match_batch(&queries);
    tracing::info!(
        "Matched {} SKU rows from {}",
        results.len(),
        upload.filename.as_deref().unwrap_or("upload")
    );

    match params.format {
        ResponseFormat::Csv => csv_attachment(&ResultTable::from_batch(&results)),
        ResponseFormat::Json => {
            let rows: Vec<serde_json::Value> = results
                .iter()
                .map(|r| {
                    serde_json::json!({
                        "sku": r.sku,
                        "matching_pkg": r.result.display_value(),
                    })
                })
                .collect();
            Json(serde_json::json!({
                "count": rows.len(),
                "matched": results.iter().filter(|r| r.result.is_found()).count(),
                "detected_format": format.display_name(),
                "results": rows,
            }))
            .into_response()
        }
    }
}

/// Return list of packages in catalog
async fn catalog_handler(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let packages: Vec<serde_json::Value> = state
        .catalog
        .packages()
        .map(|p| {
            serde_json::json!({
                "name": p.name,
                "component_count": p.len(),
                "components": p.components,
            })
        })
        .collect();

    Json(serde_json::json!({
        "count": packages.len(),
        "packages": packages,
    }))
}
