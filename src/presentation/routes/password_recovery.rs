use crate::infrastructure::state::AppState;
use crate::presentation::handlers::password_recovery;
use axum::{
    Router,
    routing::{get, post},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/request", post(password_recovery::request_recovery))
        .route("/verify", get(password_recovery::verify_reset_token))
        .route("/reset", post(password_recovery::reset_password))
}
