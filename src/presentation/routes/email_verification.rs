use crate::infrastructure::state::AppState;
use crate::presentation::handlers::email_verification;
use axum::{
    Router,
    routing::{get, post},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/verify", get(email_verification::verify_email))
        .route("/resend", post(email_verification::resend_verification))
}
