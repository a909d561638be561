// 🌐 REST API - read-only JSON views over a loaded Dataset
// Every route wraps its payload in ApiResponse; bad query values are 400s.

use crate::config::DashboardConfig;
use crate::dataset::{Dataset, DatasetSummary};
use crate::error::DashboardError;
use crate::records::{Direction, Measure};
use crate::views::{country_focus, filter_options, overview, product_focus, OverviewQuery, ProductQuery};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::{debug, warn};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub dataset: Arc<Dataset>,
    pub config: Arc<DashboardConfig>,
}

impl AppState {
    pub fn new(dataset: Dataset, config: DashboardConfig) -> Self {
        AppState {
            dataset: Arc::new(dataset),
            config: Arc::new(config),
        }
    }
}

/// API Response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn failure(message: String) -> Self {
        Self {
            success: false,
            data: (),
            error: Some(message),
        }
    }
}

fn bad_request(err: DashboardError) -> Response {
    warn!(error = %err, "rejected query");
    (StatusCode::BAD_REQUEST, Json(ApiResponse::failure(err.to_string()))).into_response()
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    dataset: DatasetSummary,
}

// ============================================================================
// Query Parameters
// ============================================================================
// Everything arrives as raw strings so malformed values surface as
// DashboardError (and the JSON envelope) instead of an extractor rejection.

#[derive(Debug, Default, Deserialize)]
pub struct OverviewParams {
    pub year: Option<String>,
    pub measure: Option<String>,
    pub top_n: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProductParams {
    pub year: Option<String>,
    pub measure: Option<String>,
    pub product: Option<String>,
    pub top_n: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CountryParams {
    pub partner: Option<String>,
    pub direction: Option<String>,
    pub year: Option<String>,
}

fn invalid(name: &str, reason: impl Into<String>) -> DashboardError {
    DashboardError::InvalidQuery {
        name: name.to_string(),
        reason: reason.into(),
    }
}

fn non_blank(raw: Option<&String>) -> Option<&str> {
    raw.map(|s| s.trim()).filter(|s| !s.is_empty())
}

/// Explicit year, or the latest year in the snapshot
fn parse_year(raw: Option<&String>, dataset: &Dataset) -> Result<i32, DashboardError> {
    match non_blank(raw) {
        Some(s) => s.parse().map_err(|_| invalid("year", format!("'{}' is not a year", s))),
        None => dataset
            .years()
            .last()
            .copied()
            .ok_or_else(|| invalid("year", "dataset has no trade rows")),
    }
}

fn parse_optional_year(raw: Option<&String>) -> Result<Option<i32>, DashboardError> {
    non_blank(raw)
        .map(|s| s.parse().map_err(|_| invalid("year", format!("'{}' is not a year", s))))
        .transpose()
}

fn parse_measure(raw: Option<&String>) -> Result<Measure, DashboardError> {
    non_blank(raw).map_or(Ok(Measure::Export), str::parse)
}

fn parse_direction(raw: Option<&String>) -> Result<Direction, DashboardError> {
    non_blank(raw).map_or(Ok(Direction::Import), str::parse)
}

fn parse_top_n(raw: Option<&String>, default: usize) -> Result<usize, DashboardError> {
    match non_blank(raw) {
        None => Ok(default),
        Some(s) => match s.parse::<usize>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(invalid("top_n", format!("'{}' is not a positive integer", s))),
        },
    }
}

fn required<'a>(raw: Option<&'a String>, name: &str) -> Result<&'a str, DashboardError> {
    non_blank(raw).ok_or_else(|| invalid(name, "is required"))
}

impl OverviewParams {
    fn to_query(&self, state: &AppState) -> Result<OverviewQuery, DashboardError> {
        Ok(OverviewQuery {
            year: parse_year(self.year.as_ref(), &state.dataset)?,
            measure: parse_measure(self.measure.as_ref())?,
            top_n: parse_top_n(self.top_n.as_ref(), state.config.top_n)?,
            wrap_width: state.config.wrap_width,
        })
    }
}

impl ProductParams {
    fn to_query(&self, state: &AppState) -> Result<ProductQuery, DashboardError> {
        Ok(ProductQuery {
            year: parse_year(self.year.as_ref(), &state.dataset)?,
            measure: parse_measure(self.measure.as_ref())?,
            product: required(self.product.as_ref(), "product")?.to_string(),
            top_n: parse_top_n(self.top_n.as_ref(), state.config.top_n)?,
        })
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check plus snapshot summary
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::ok(HealthResponse {
        status: "OK",
        version: crate::VERSION,
        dataset: state.dataset.summary(),
    }))
}

/// GET /api/filters - Values for the selection widgets
async fn get_filters(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::ok(filter_options(&state.dataset)))
}

/// GET /api/overview?year&measure&top_n
async fn get_overview(State(state): State<AppState>, Query(params): Query<OverviewParams>) -> Response {
    let query = match params.to_query(&state) {
        Ok(q) => q,
        Err(e) => return bad_request(e),
    };
    debug!(year = query.year, measure = %query.measure, top_n = query.top_n, "overview");

    (StatusCode::OK, Json(ApiResponse::ok(overview(&state.dataset, &query)))).into_response()
}

/// GET /api/product?year&measure&product&top_n
async fn get_product(State(state): State<AppState>, Query(params): Query<ProductParams>) -> Response {
    let query = match params.to_query(&state) {
        Ok(q) => q,
        Err(e) => return bad_request(e),
    };
    debug!(year = query.year, measure = %query.measure, product = %query.product, "product focus");

    (StatusCode::OK, Json(ApiResponse::ok(product_focus(&state.dataset, &query)))).into_response()
}

/// GET /api/country?partner&direction&year
async fn get_country(State(state): State<AppState>, Query(params): Query<CountryParams>) -> Response {
    let parsed = required(params.partner.as_ref(), "partner").and_then(|partner| {
        let direction = parse_direction(params.direction.as_ref())?;
        let year = parse_optional_year(params.year.as_ref())?;
        Ok((partner, direction, year))
    });
    let (partner, direction, year) = match parsed {
        Ok(p) => p,
        Err(e) => return bad_request(e),
    };
    debug!(partner, direction = %direction, "country focus");

    let view = country_focus(&state.dataset, partner, direction, year);
    (StatusCode::OK, Json(ApiResponse::ok(view))).into_response()
}

// ============================================================================
// Router
// ============================================================================

pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/filters", get(get_filters))
        .route("/overview", get(get_overview))
        .route("/product", get(get_product))
        .route("/country", get(get_country))
        .with_state(state)
}

/// Full application: /api routes, optional /static assets, permissive CORS
pub fn router(state: AppState) -> Router {
    let static_dir = state.config.static_dir.clone();
    let mut app = Router::new().nest("/api", api_routes(state));

    if let Some(dir) = static_dir {
        app = app.nest_service("/static", ServeDir::new(dir));
    }

    app.layer(CorsLayer::permissive())
}
