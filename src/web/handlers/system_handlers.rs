// src/web/handlers/system_handlers.rs
use crate::core::database::Database;
use crate::web::types::{DataResponse, HealthStatus, ServerConfig};

use rocket::serde::json::Json;
use rocket::State;
use tracing::error;

pub async fn health_handler(
    config: &State<ServerConfig>,
    db: &State<Database>,
) -> Json<DataResponse<HealthStatus>> {
    let (status, database) = match db.health_check().await {
        Ok(()) => ("ok", "ok".to_string()),
        Err(e) => {
            error!("Health check failed: {:#}", e);
            ("degraded", format!("unavailable: {}", e))
        }
    };

    Json(DataResponse::success(
        "OK".to_string(),
        HealthStatus {
            status: status.to_string(),
            environment: config.environment.clone(),
            database,
            llm_configured: config.llm_configured,
            llm_api_url: config.llm_api_url.clone(),
        },
    ))
}
