// src/web/mod.rs

pub mod error;
pub mod handlers;
pub mod types;
pub mod validation;

pub use error::ApiError;
pub use types::*;

use crate::core::config_manager::ConfigManager;
use crate::core::database::{AnalyzedProfile, Database, RawData};
use crate::linkedin_analysis::{
    GeminiClient, GeneratedMessage, ProfileAnalysis, ProfileAnalyzer,
};
use anyhow::Result;
use rocket::data::{Limits, ToByteUnit};
use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::{Header, Status};
use rocket::response::status;
use rocket::serde::json::Json;
use rocket::{catchers, get, options, post, routes, Build, Request, Response, Rocket, State};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info};

// CORS Fairing
pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "POST, GET, OPTIONS",
        ));
        response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
        response.set_header(Header::new("Access-Control-Allow-Credentials", "true"));
    }
}

// Extension-facing routes

#[post("/analyze-profile", data = "<body>")]
pub async fn analyze_profile(
    body: Json<Value>,
    analyzer: &State<ProfileAnalyzer>,
) -> Result<Json<ProfileAnalysis>, ApiError> {
    handlers::analyze_profile_handler(body, analyzer).await
}

#[post("/save-analyzed-data", data = "<body>")]
pub async fn save_analyzed_data(
    body: Json<Value>,
    db: &State<Database>,
) -> Result<status::Custom<Json<SaveProfileResponse>>, ApiError> {
    handlers::save_profile_handler(body, db).await
}

#[post("/save-profile", data = "<body>")]
pub async fn save_profile(
    body: Json<Value>,
    db: &State<Database>,
) -> Result<status::Custom<Json<SaveProfileResponse>>, ApiError> {
    handlers::save_profile_handler(body, db).await
}

#[post("/generate-message", data = "<body>")]
pub async fn generate_message(
    body: Json<Value>,
    analyzer: &State<ProfileAnalyzer>,
) -> Result<Json<GeneratedMessage>, ApiError> {
    handlers::generate_message_handler(body, analyzer).await
}

#[get("/get-raw-data/<profile_id>")]
pub async fn get_raw_data(
    profile_id: &str,
    db: &State<Database>,
) -> Result<Json<RawData>, ApiError> {
    handlers::get_raw_data_handler(profile_id, db).await
}

#[get("/get-analyzed-data/<profile_id>")]
pub async fn get_analyzed_data(
    profile_id: &str,
    db: &State<Database>,
) -> Result<Json<AnalyzedProfile>, ApiError> {
    handlers::get_analyzed_data_handler(profile_id, db).await
}

// Read API and system routes

#[get("/profiles?<search>&<disc_primary>&<limit>&<offset>")]
pub async fn list_profiles(
    search: Option<String>,
    disc_primary: Option<String>,
    limit: Option<i64>,
    offset: Option<i64>,
    db: &State<Database>,
) -> Result<Json<DataResponse<Vec<AnalyzedProfile>>>, ApiError> {
    handlers::list_profiles_handler(search, disc_primary, limit, offset, db).await
}

#[get("/health")]
pub async fn health(
    config: &State<ServerConfig>,
    db: &State<Database>,
) -> Json<DataResponse<HealthStatus>> {
    handlers::health_handler(config, db).await
}

#[options("/<_..>")]
pub async fn options() -> Status {
    Status::Ok
}

// Error catchers
#[rocket::catch(400)]
pub fn bad_request() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Invalid request format".to_string(),
        "BAD_REQUEST".to_string(),
        vec!["Check your request JSON format".to_string()],
    ))
}

#[rocket::catch(404)]
pub fn not_found(request: &Request<'_>) -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        format!("No route for {} {}", request.method(), request.uri()),
        "NOT_FOUND".to_string(),
        Vec::new(),
    ))
}

#[rocket::catch(422)]
pub fn unprocessable_entity() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Request body could not be processed".to_string(),
        "UNPROCESSABLE_ENTITY".to_string(),
        vec!["Send a JSON object body".to_string()],
    ))
}

#[rocket::catch(500)]
pub fn internal_error() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Internal server error".to_string(),
        "INTERNAL_ERROR".to_string(),
        vec![
            "Try again in a few moments".to_string(),
            "Contact support if the problem persists".to_string(),
        ],
    ))
}

/// Assemble the Rocket instance around already-initialized dependencies.
pub fn build_rocket(
    config: &ConfigManager,
    database: Database,
    analyzer: ProfileAnalyzer,
) -> Rocket<Build> {
    let figment = rocket::Config::figment()
        .merge(("address", config.server.address.clone()))
        .merge(("port", config.server.port))
        .merge(("limits", Limits::default().limit("json", 5.mebibytes())));

    let server_config = ServerConfig {
        environment: config.environment_name.clone(),
        llm_api_url: config.llm.api_url.clone(),
        llm_configured: config.llm.api_key.is_some(),
    };

    rocket::custom(figment)
        .attach(Cors)
        .manage(server_config)
        .manage(database)
        .manage(analyzer)
        .register(
            "/",
            catchers![bad_request, not_found, unprocessable_entity, internal_error],
        )
        .mount(
            "/api",
            routes![
                analyze_profile,
                save_analyzed_data,
                save_profile,
                generate_message,
                get_raw_data,
                get_analyzed_data,
                list_profiles,
                health,
                options,
            ],
        )
}

// Main server start function
pub async fn start_web_server(config: ConfigManager) -> Result<()> {
    config.ensure_directories().await?;

    let database = match Database::connect(&config.environment.database_path).await {
        Ok(database) => database,
        Err(e) => {
            error!("Failed to initialize database: {:#}", e);
            return Err(e);
        }
    };

    let analyzer = ProfileAnalyzer::new(Arc::new(GeminiClient::new(&config.llm)?));

    info!("Starting profile insights API server");
    info!("Environment: {}", config.environment_name);
    info!("Database: {}", config.environment.database_path.display());
    info!(
        "Server: http://{}:{}",
        config.server.address, config.server.port
    );
    info!("LLM endpoint: {}", config.llm.api_url);

    if let Err(e) = build_rocket(&config, database, analyzer).launch().await {
        error!("Rocket server failed: {}", e);
        return Err(anyhow::anyhow!("Rocket server failed: {}", e));
    }

    Ok(())
}
