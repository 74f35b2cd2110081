// src/web/handlers/profile_handlers.rs
use crate::core::database::{
    AnalyzedProfile, Database, ProfileFilter, ProfileService, RawData, SaveAction,
};
use crate::linkedin_analysis::resolve_lookup_key;
use crate::web::error::ApiError;
use crate::web::types::{DataResponse, SaveProfileResponse};
use crate::web::validation::{parse_save_request, FieldErrors, MISSING_PROFILE_ID};

use rocket::http::Status;
use rocket::response::status;
use rocket::serde::json::Json;
use rocket::State;
use serde_json::Value;
use tracing::{info, warn};

pub const DEFAULT_PAGE_SIZE: i64 = 50;
pub const MAX_PAGE_SIZE: i64 = 200;

pub async fn save_profile_handler(
    body: Json<Value>,
    db: &State<Database>,
) -> Result<status::Custom<Json<SaveProfileResponse>>, ApiError> {
    let save = parse_save_request(&body).map_err(|details| {
        warn!("Rejected save request: {:?}", details);
        ApiError::validation("Invalid profile data", details)
    })?;

    let outcome = ProfileService::new(db.pool()).save(save).await?;

    let status = match outcome.action {
        SaveAction::Created => Status::Created,
        SaveAction::Updated => Status::Ok,
    };

    Ok(status::Custom(
        status,
        Json(SaveProfileResponse::new(outcome.action, outcome.profile)),
    ))
}

fn lookup_key(raw: &str) -> Result<String, ApiError> {
    resolve_lookup_key(raw).ok_or_else(|| {
        let mut details = FieldErrors::default();
        details.add("profile_id", MISSING_PROFILE_ID);
        ApiError::validation("Invalid profile identifier", details)
    })
}

pub async fn get_raw_data_handler(
    profile_id: &str,
    db: &State<Database>,
) -> Result<Json<RawData>, ApiError> {
    let key = lookup_key(profile_id)?;

    ProfileService::new(db.pool())
        .raw_data(&key)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("No raw data found for profile: {}", key)))
}

pub async fn get_analyzed_data_handler(
    profile_id: &str,
    db: &State<Database>,
) -> Result<Json<AnalyzedProfile>, ApiError> {
    let key = lookup_key(profile_id)?;

    ProfileService::new(db.pool())
        .analyzed_profile(&key)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("No analyzed data found for profile: {}", key)))
}

pub async fn list_profiles_handler(
    search: Option<String>,
    disc_primary: Option<String>,
    limit: Option<i64>,
    offset: Option<i64>,
    db: &State<Database>,
) -> Result<Json<DataResponse<Vec<AnalyzedProfile>>>, ApiError> {
    let filter = ProfileFilter {
        search,
        disc_primary,
        limit: limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        offset: offset.unwrap_or(0).max(0),
    };

    let profiles = ProfileService::new(db.pool()).list_profiles(&filter).await?;
    info!("Listed {} analyzed profiles", profiles.len());

    Ok(Json(DataResponse::success(
        format!("Found {} profiles", profiles.len()),
        profiles,
    )))
}
