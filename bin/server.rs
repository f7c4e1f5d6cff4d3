// Airport Luggage Locker Service - Web Server
// REST API with Axum over the shared SQLite locker store

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::json;
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use luggage_locker::{dashboard, db, lifecycle, Dashboard, FeeQuote, LockerError, SizeClass};

/// Shared application state
///
/// One connection behind a mutex: every request serializes on it, which is
/// the mutual-exclusion scope the claim-and-mark and bill-and-release
/// sequences rely on.
#[derive(Clone)]
struct AppState {
    db: Arc<Mutex<Connection>>,
}

// ============================================================================
// Error mapping
// ============================================================================

/// Boundary wrapper translating the domain taxonomy to HTTP statuses
struct ApiError(LockerError);

impl From<LockerError> for ApiError {
    fn from(err: LockerError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            LockerError::Validation(_) => StatusCode::BAD_REQUEST,
            LockerError::LockerNotFound(_) => StatusCode::NOT_FOUND,
            LockerError::LockerAlreadyFree(_)
            | LockerError::LockerOccupied(_)
            | LockerError::NoLockerAvailable(_) => StatusCode::CONFLICT,
            LockerError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            eprintln!("Storage error: {}", self.0);
            "Internal Server Error".to_string()
        } else {
            self.0.to_string()
        };

        (status, Json(json!({ "success": false, "message": message }))).into_response()
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "ok", "version": luggage_locker::VERSION }))
}

/// GET /api/dashboard - Stats, full locker list, recent receipts
async fn get_dashboard(State(state): State<AppState>) -> Result<Json<Dashboard>, ApiError> {
    let conn = state.db.lock().unwrap();
    Ok(Json(dashboard::load(&conn)?))
}

#[derive(Deserialize)]
struct CheckinRequest {
    #[serde(rename = "luggageType")]
    luggage_type: Option<String>,
}

/// POST /api/checkin - Assign a free locker of the requested class
async fn post_checkin(
    State(state): State<AppState>,
    Json(req): Json<CheckinRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let luggage_type = req
        .luggage_type
        .filter(|t| !t.is_empty())
        .ok_or_else(|| LockerError::Validation("Luggage type is required.".to_string()))?;
    let size: SizeClass = luggage_type.parse()?;

    let mut conn = state.db.lock().unwrap();
    let locker = lifecycle::check_in(&mut conn, size, Utc::now())?;

    Ok(Json(json!({
        "success": true,
        "assigned_locker": locker.number,
    })))
}

#[derive(Deserialize)]
struct CheckoutRequest {
    id: Option<i64>,
}

/// POST /api/checkout - Bill and free an occupied locker (atomic unit)
async fn post_checkout(
    State(state): State<AppState>,
    Json(req): Json<CheckoutRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = req
        .id
        .ok_or_else(|| LockerError::Validation("Locker ID is required.".to_string()))?;

    let mut conn = state.db.lock().unwrap();
    let receipt = lifecycle::check_out(&mut conn, id, Utc::now())?;

    Ok(Json(json!({
        "success": true,
        "message": format!("Locker {} is now free.", receipt.locker_number),
        "receipt": receipt,
    })))
}

/// GET /api/quote/:id - Advisory fee preview from the authoritative rule
async fn get_quote(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<FeeQuote>, ApiError> {
    let conn = state.db.lock().unwrap();
    Ok(Json(lifecycle::quote(&conn, id, Utc::now())?))
}

/// GET / - Serve the dashboard page
async fn serve_index() -> impl IntoResponse {
    Html(include_str!("../web/index.html"))
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() {
    println!("🛄 Airport Luggage Locker Service");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let db_path = std::env::var("LUGGAGE_DB").unwrap_or_else(|_| "luggage.db".to_string());
    let conn = db::open(std::path::Path::new(&db_path)).expect("Failed to open database");
    println!("✓ Database ready: {} (catalog version {})", db_path, db::CATALOG_VERSION);

    let state = AppState {
        db: Arc::new(Mutex::new(conn)),
    };

    // Build API routes
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/dashboard", get(get_dashboard))
        .route("/checkin", post(post_checkin))
        .route("/checkout", post(post_checkout))
        .route("/quote/:id", get(get_quote))
        .with_state(state.clone());

    // Build main router
    let app = Router::new()
        .route("/", get(serve_index))
        .nest("/api", api_routes)
        .nest_service("/static", ServeDir::new("web"))
        .layer(CorsLayer::permissive());

    let port = std::env::var("PORT").unwrap_or_else(|_| "3001".to_string());
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    println!("\n🚀 Server running on http://localhost:{port}");
    println!("   API: http://localhost:{port}/api/dashboard");
    println!("   UI:  http://localhost:{port}");
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
