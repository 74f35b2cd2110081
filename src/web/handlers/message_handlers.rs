// src/web/handlers/message_handlers.rs
use crate::linkedin_analysis::{GeneratedMessage, ProfileAnalyzer};
use crate::web::error::ApiError;
use crate::web::validation::parse_message_request;

use rocket::serde::json::Json;
use rocket::State;
use serde_json::Value;
use tracing::{info, warn};

pub async fn generate_message_handler(
    body: Json<Value>,
    analyzer: &State<ProfileAnalyzer>,
) -> Result<Json<GeneratedMessage>, ApiError> {
    let request = parse_message_request(&body).map_err(|details| {
        warn!("Rejected generate-message request: {:?}", details);
        ApiError::validation("Invalid message request", details)
    })?;

    let message = analyzer
        .generate_message(request.message_type, &request.query, &request.profile)
        .await
        .map_err(|e| ApiError::from_analysis("Failed to generate message", e))?;

    info!(
        "Generated {} message for {}",
        request.message_type,
        request.profile.name.as_deref().unwrap_or("unknown")
    );
    Ok(Json(message))
}
