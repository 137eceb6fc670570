use axum::{
    extract::{Json, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use foodbridge_match_engine::{
    error::MatchEngineError,
    plan_notifications,
    quality::{predict_quality, QualityPrediction},
    scoring, Donation, EngineConfig, GeoLocation, MatchEngine, MatchResult, NgoCandidate,
    NgoNotification, QualityLabel, SqliteDirectory, Unit,
};

#[derive(Clone)]
struct AppState {
    engine: Arc<MatchEngine>,
    directory: Arc<SqliteDirectory>,
}

#[derive(Debug, Deserialize)]
struct MatchRequestDto {
    food_name: String,
    quantity: u32,
    unit: Unit,
    quality: QualityLabel,
    expiry_date: NaiveDate,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    donor_name: Option<String>,
    /// Explicit donor coordinates win over `donor_city`
    #[serde(default)]
    donor_location: Option<GeoLocation>,
    #[serde(default)]
    donor_city: Option<String>,
    #[serde(default)]
    max_distance_km: Option<f64>,
}

#[derive(Debug, Serialize)]
struct MatchResponse {
    result: MatchResult,
    notifications: Vec<NgoNotification>,
    latency_ms: f64,
}

#[derive(Debug, Deserialize)]
struct NgosQuery {
    #[serde(default = "default_min_capacity")]
    min_capacity: u32,
}

fn default_min_capacity() -> u32 { 1 }

#[derive(Debug, Deserialize)]
struct QualityRequest {
    food_name: String,
    expiry_date: NaiveDate,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

#[derive(Debug, Serialize)]
struct StatsResponse {
    total_ngos: u64,
    active_ngos: u64,
    located_ngos: u64,
    total_capacity: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "match_engine_server=debug,foodbridge_match_engine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = EngineConfig::from_env();

    tracing::info!("🚀 Starting FoodBridge Match Engine Server");
    tracing::info!("📦 Database: {}", config.db_path);
    tracing::info!("🔌 Port: {}", config.port);
    tracing::info!("📍 Search radius: {}km", config.options.max_distance_km);

    let directory = Arc::new(SqliteDirectory::new(&config.db_path).await?);
    let engine = MatchEngine::with_ai_settings(directory.clone(), config.options.clone(), &config.ai);

    let state = AppState {
        engine: Arc::new(engine),
        directory,
    };

    // Build router
    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/v1/match", post(match_handler))
        .route("/v1/ngos", get(ngos_handler))
        .route("/v1/quality", post(quality_handler))
        .route("/v1/stats", get(stats_handler))
        .layer(CorsLayer::permissive())
        .with_state(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("🍲 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: foodbridge_match_engine::VERSION.to_string(),
    })
}

async fn match_handler(
    State(state): State<AppState>,
    Json(req): Json<MatchRequestDto>,
) -> Result<Json<MatchResponse>, AppError> {
    tracing::debug!("Match request: {:?}", req);
    let start = std::time::Instant::now();

    let mut donation = Donation::new(req.food_name, req.quantity, req.unit, req.quality, req.expiry_date)?;
    donation.description = req.description;
    donation.donor_name = req.donor_name;

    let donor = match (req.donor_location, req.donor_city) {
        (Some(location), _) => {
            location.validate()?;
            Some(location)
        }
        (None, Some(city)) => Some(
            scoring::locate(&city)
                .ok_or_else(|| MatchEngineError::InvalidLocation(format!("Unknown city: {}", city)))?,
        ),
        (None, None) => None,
    };

    let request = state.engine.checked_request(donation, donor, req.max_distance_km)?;

    let result = state.engine.match_donation(&request).await;
    let notifications = plan_notifications(&request.donation, &result);

    Ok(Json(MatchResponse {
        result,
        notifications,
        latency_ms: start.elapsed().as_secs_f64() * 1000.0,
    }))
}

async fn ngos_handler(
    State(state): State<AppState>,
    Query(query): Query<NgosQuery>,
) -> Result<Json<Vec<NgoCandidate>>, AppError> {
    let ngos = state.engine.candidates(query.min_capacity).await?;
    Ok(Json(ngos))
}

async fn quality_handler(Json(req): Json<QualityRequest>) -> Json<QualityPrediction> {
    let today = Utc::now().date_naive();
    Json(predict_quality(req.expiry_date, today, &req.food_name))
}

async fn stats_handler(
    State(state): State<AppState>,
) -> Result<Json<StatsResponse>, AppError> {
    let stats = state.directory.stats().await?;

    Ok(Json(StatsResponse {
        total_ngos: stats.total_ngos,
        active_ngos: stats.active_ngos,
        located_ngos: stats.located_ngos,
        total_capacity: stats.total_capacity,
    }))
}

// Error handling
struct AppError(MatchEngineError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            MatchEngineError::InvalidDonation(_) | MatchEngineError::InvalidLocation(_) => {
                StatusCode::BAD_REQUEST
            }
            MatchEngineError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let message = self.0.to_string();

        tracing::error!("❌ Error: {} - {}", status, message);

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<MatchEngineError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
