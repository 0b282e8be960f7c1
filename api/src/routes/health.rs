use actix_web::{web, HttpResponse};

use crate::state::AppState;

/// Handler for GET /health
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "tokenkeep-api",
        "version": env!("CARGO_PKG_VERSION"),
        "storage": state.manager.repository().kind().as_str(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
