use crate::infrastructure::state::AppState;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

/// Health check endpoint with database connectivity test
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let Some(pool) = state.pool.as_ref() else {
        return (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "database": "not configured"
            })),
        );
    };

    match sqlx::query("SELECT 1").fetch_one(pool).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "database": "connected"
            })),
        ),
        Err(e) => {
            tracing::error!("Database health check failed: {:?}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unhealthy",
                    "database": "disconnected"
                })),
            )
        }
    }
}
