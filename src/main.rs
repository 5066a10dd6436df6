use axum::{
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use staff_registry::database::manager::DatabaseManager;
use staff_registry::handlers::users;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL etc.
    let _ = dotenvy::dotenv();

    // Initialize configuration (this loads the config singleton)
    let config = staff_registry::config::config();

    tracing_subscriber::fmt::init();
    tracing::info!("Starting staff-registry in {:?} mode", config.environment);

    let app = app();

    // Allow tests or deployments to override port via env
    let port = std::env::var("STAFF_REGISTRY_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("staff-registry listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app() -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        // User record operations, one route per trigger
        .route("/users/create", post(users::create_user))
        .route("/users/get", post(users::get_users))
        .route("/users/delete", post(users::delete_user))
        .route("/users/update", post(users::update_users))
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "staff-registry",
        "version": version,
        "endpoints": {
            "create": "POST /users/create",
            "get": "POST /users/get",
            "delete": "POST /users/delete",
            "update": "POST /users/update",
            "health": "GET /health",
        }
    }))
}

async fn health() -> (StatusCode, Json<Value>) {
    match DatabaseManager::health_check().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "healthy" }))),
        Err(err) => {
            tracing::error!("Health check failed: {}", err);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unhealthy" })),
            )
        }
    }
}
