// src/web/types.rs
use crate::core::database::{AnalyzedProfile, SaveAction};
use crate::web::validation::FieldErrors;
use rocket::serde::Serialize;
use uuid::Uuid;

pub const ALREADY_EXISTS_MESSAGE: &str = "Profile already exists in database; record updated";
pub const CREATED_MESSAGE: &str = "Profile saved successfully";

pub struct ServerConfig {
    pub environment: String,
    pub llm_api_url: String,
    pub llm_configured: bool,
}

#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde", rename_all = "lowercase")]
pub enum ResponseType {
    Data,
    Action,
    Error,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct DataResponse<T> {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub message: String,
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn success(message: String, data: T) -> Self {
        Self {
            response_type: ResponseType::Data,
            success: true,
            message,
            data,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct StandardErrorResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<FieldErrors>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl StandardErrorResponse {
    pub fn new(error: String, error_code: String, suggestions: Vec<String>) -> Self {
        Self {
            response_type: ResponseType::Error,
            success: false,
            error,
            error_code,
            message: None,
            details: None,
            suggestions,
        }
    }
}

/// Reply to save-analyzed-data / save-profile.
#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct SaveProfileResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub action: SaveAction,
    pub message: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub already_exists: bool,
    pub profile_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_data_id: Option<Uuid>,
    pub profile: AnalyzedProfile,
}

impl SaveProfileResponse {
    pub fn new(action: SaveAction, profile: AnalyzedProfile) -> Self {
        let already_exists = action == SaveAction::Updated;
        Self {
            response_type: ResponseType::Action,
            success: true,
            action,
            message: if already_exists {
                ALREADY_EXISTS_MESSAGE.to_string()
            } else {
                CREATED_MESSAGE.to_string()
            },
            already_exists,
            profile_id: profile.profile_id.clone(),
            raw_data_id: profile.raw_data_id,
            profile,
        }
    }
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct HealthStatus {
    pub status: String,
    pub environment: String,
    pub database: String,
    pub llm_configured: bool,
    pub llm_api_url: String,
}
