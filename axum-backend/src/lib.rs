use axum::{
    extract::{DefaultBodyLimit, Json, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use floorplan_document::{import_document, Document};
use region_detection::{find_closed_regions_with_config, Edge, Point, Region, RegionConfig, Vertex};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub mod config;

use config::ServerConfig;

// Security limits to prevent DoS attacks
pub const MAX_VERTICES: usize = 10_000;
pub const MAX_EDGES: usize = 10_000;
const MAX_COORDINATE_VALUE: f64 = 1_000_000.0;
const MIN_COORDINATE_VALUE: f64 = -1_000_000.0;

/// Validate that point coordinates are within reasonable bounds
fn is_valid_point(point: &Point) -> bool {
    point.x.is_finite()
        && point.y.is_finite()
        && point.x >= MIN_COORDINATE_VALUE
        && point.x <= MAX_COORDINATE_VALUE
        && point.y >= MIN_COORDINATE_VALUE
        && point.y <= MAX_COORDINATE_VALUE
}

#[derive(Clone)]
pub struct AppState {
    pub region_config: RegionConfig,
}

#[derive(Debug, Deserialize)]
pub struct RegionsRequest {
    #[serde(default)]
    pub vertices: Vec<Vertex>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub edge_tolerance: Option<f64>,
    #[serde(default)]
    pub min_region_area: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegionsResponse {
    pub regions: Vec<Region>,
    pub total_regions: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ImportResponse {
    pub document: Document,
    pub regions: Vec<Region>,
    pub total_regions: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: &str, message: String) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
            message,
        }),
    )
}

fn validate_topology(vertices: &[Vertex], edges: &[Edge]) -> Result<(), ApiError> {
    if vertices.len() > MAX_VERTICES || edges.len() > MAX_EDGES {
        warn!(
            "Request rejected: too large ({} vertices, {} edges)",
            vertices.len(),
            edges.len()
        );
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "INPUT_TOO_LARGE",
            format!(
                "Too many vertices or edges. Maximum allowed: {} vertices, {} edges. Received: {}, {}",
                MAX_VERTICES,
                MAX_EDGES,
                vertices.len(),
                edges.len()
            ),
        ));
    }

    if let Some(vertex) = vertices.iter().find(|v| !is_valid_point(&v.position)) {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "INVALID_POINT",
            format!(
                "Invalid position for vertex {}: coordinates must be finite and within [{}, {}]",
                vertex.id, MIN_COORDINATE_VALUE, MAX_COORDINATE_VALUE
            ),
        ));
    }

    Ok(())
}

fn resolve_config(defaults: &RegionConfig, request: &RegionsRequest) -> Result<RegionConfig, ApiError> {
    let config = RegionConfig {
        edge_tolerance: request.edge_tolerance.unwrap_or(defaults.edge_tolerance),
        min_region_area: request.min_region_area.unwrap_or(defaults.min_region_area),
    };

    for (name, value) in [
        ("edge_tolerance", config.edge_tolerance),
        ("min_region_area", config.min_region_area),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(api_error(
                StatusCode::BAD_REQUEST,
                "INVALID_THRESHOLD",
                format!("{} must be a non-negative finite number", name),
            ));
        }
    }

    Ok(config)
}

/// Run extraction off the async runtime; dense graphs can take a while
async fn compute_regions(
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
    config: RegionConfig,
) -> Result<Vec<Region>, ApiError> {
    tokio::task::spawn_blocking(move || find_closed_regions_with_config(&vertices, &edges, &config))
        .await
        .map_err(|e| {
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                format!("Region extraction failed: {}", e),
            )
        })
}

async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn regions_handler(
    State(state): State<AppState>,
    Json(request): Json<RegionsRequest>,
) -> Result<Json<RegionsResponse>, ApiError> {
    info!(
        "Received region request with {} vertices and {} edges",
        request.vertices.len(),
        request.edges.len()
    );

    validate_topology(&request.vertices, &request.edges)?;
    let config = resolve_config(&state.region_config, &request)?;

    let regions = compute_regions(request.vertices, request.edges, config).await?;
    info!("Found {} closed regions", regions.len());

    Ok(Json(RegionsResponse {
        total_regions: regions.len(),
        regions,
    }))
}

/// Lenient import: malformed JSON still answers 200 with an empty document and the error
async fn import_handler(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<ImportResponse>, ApiError> {
    let imported = import_document(&body);
    let error = imported.error.map(|e| e.to_string());
    let document = imported.document;

    let vertices = document.vertices();
    let edges = document.edges();
    validate_topology(&vertices, &edges)?;

    let regions = compute_regions(vertices, edges, state.region_config).await?;
    info!(
        "Imported document {} with {} topology records, {} regions",
        document.id,
        document.topology.len(),
        regions.len()
    );

    Ok(Json(ImportResponse {
        document,
        total_regions: regions.len(),
        regions,
        error,
    }))
}

/// Normalize a document for download: fill defaults and drop malformed records
async fn export_handler(body: String) -> Result<impl IntoResponse, ApiError> {
    let document = Document::from_json_str(&body).map_err(|e| {
        api_error(StatusCode::BAD_REQUEST, "INVALID_DOCUMENT", e.to_string())
    })?;

    let text = document.to_json_string().map_err(|e| {
        api_error(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", e.to_string())
    })?;

    Ok(([(header::CONTENT_TYPE, "application/json")], text))
}

/// Create the Axum app with all routes and middleware
pub fn create_app(config: &ServerConfig) -> Router {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|s| s.parse().ok())
        .collect();

    let cors = if origins.is_empty() {
        // Fallback to Any only if no valid origins configured (not recommended for production)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE])
    } else {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE])
    };

    let state = AppState {
        region_config: config.region_config,
    };

    Router::new()
        .route("/health", get(health_check))
        .route("/regions", post(regions_handler))
        .route("/documents/import", post(import_handler))
        .route("/documents/export", post(export_handler))
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
