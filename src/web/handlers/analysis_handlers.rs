// src/web/handlers/analysis_handlers.rs
use crate::linkedin_analysis::{ProfileAnalysis, ProfileAnalyzer};
use crate::web::error::ApiError;
use crate::web::validation::parse_analysis_request;

use rocket::serde::json::Json;
use rocket::State;
use serde_json::Value;
use tracing::{info, warn};

pub async fn analyze_profile_handler(
    body: Json<Value>,
    analyzer: &State<ProfileAnalyzer>,
) -> Result<Json<ProfileAnalysis>, ApiError> {
    let profile = parse_analysis_request(&body).map_err(|details| {
        warn!("Rejected analyze-profile request: {:?}", details);
        ApiError::validation("Invalid profile data", details)
    })?;

    info!(
        "Analyze request for {} ({} posts)",
        profile.name.as_deref().unwrap_or("unknown"),
        profile.posts.len()
    );

    let analysis = analyzer
        .analyze_profile(&profile)
        .await
        .map_err(|e| ApiError::from_analysis("Failed to analyze profile", e))?;

    Ok(Json(analysis))
}
