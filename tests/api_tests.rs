use std::sync::Arc;

use rocket::http::{Header, Status};
use rocket::local::asynchronous::Client;
use serde_json::{json, Value};

use profile_insights::linkedin_analysis::{Generation, LlmError};
use profile_insights::{build_rocket, ConfigManager, Database, ProfileAnalyzer, TextGenerator};

struct CannedGenerator {
    text: String,
    truncated: bool,
}

#[rocket::async_trait]
impl TextGenerator for CannedGenerator {
    async fn generate(&self, _prompt: &str) -> Result<Generation, LlmError> {
        Ok(Generation {
            text: self.text.clone(),
            truncated: self.truncated,
        })
    }
}

struct FailingGenerator;

#[rocket::async_trait]
impl TextGenerator for FailingGenerator {
    async fn generate(&self, _prompt: &str) -> Result<Generation, LlmError> {
        Err(LlmError::Upstream {
            status: 503,
            body: "model overloaded".to_string(),
        })
    }
}

const ANALYSIS_REPLY: &str = r#"Sure! Here is the analysis:
```json
{
  "dominance": 25, "influence": 45, "steadiness": 20, "compliance": 10,
  "primaryType": "Influence (I)", "confidence": 82,
  "description": "Outgoing connector",
  "keyInsights": ["Posts weekly", "Talks about teams"],
  "communicationStyle": "Warm and energetic",
  "salesApproach": "Lead with stories",
  "painPoints": ["Scaling hiring"],
  "idealPitch": "Show how peers succeeded",
  "communicationDos": ["Be enthusiastic"],
  "communicationDonts": ["Drown them in data"],
  "bestApproach": "Short call"
}
```"#;

async fn client_with(generator: Arc<dyn TextGenerator>) -> Client {
    let database = Database::in_memory().await.expect("in-memory database");
    let rocket = build_rocket(
        &ConfigManager::defaults(),
        database,
        ProfileAnalyzer::new(generator),
    );
    Client::tracked(rocket).await.expect("valid rocket instance")
}

async fn client_replying(text: &str, truncated: bool) -> Client {
    client_with(Arc::new(CannedGenerator {
        text: text.to_string(),
        truncated,
    }))
    .await
}

async fn post_json(client: &Client, uri: &'static str, body: &Value) -> (Status, Value) {
    let response = client.post(uri).json(body).dispatch().await;
    let status = response.status();
    let body = response.into_json::<Value>().await.expect("json body");
    (status, body)
}

async fn get_json(client: &Client, uri: &str) -> (Status, Value) {
    let response = client.get(uri).dispatch().await;
    let status = response.status();
    let body = response.into_json::<Value>().await.expect("json body");
    (status, body)
}

fn jane_payload(url: &str, name: &str) -> Value {
    json!({
        "name": name,
        "headline": "VP Sales",
        "linkedinUrl": url,
        "primaryType": "Influence (I)",
        "dominance": 25,
        "influence": 45,
        "steadiness": 20,
        "compliance": 10,
        "confidence": 82,
        "keyInsights": ["Posts weekly"],
        "profileData": {
            "name": name,
            "about": "Building teams",
            "connectionsCount": 500,
            "posts": [{"text": "Hiring!", "time": "1w", "reactions": "12", "comments": "3"}]
        }
    })
}

#[rocket::async_test]
async fn test_same_profile_saved_twice_is_updated_not_duplicated() {
    let client = client_replying("{}", false).await;

    let (status, first) = post_json(
        &client,
        "/api/save-analyzed-data",
        &jane_payload("https://www.linkedin.com/in/jane-doe-123/?trk=x", "Jane Doe"),
    )
    .await;
    assert_eq!(status, Status::Created);
    assert_eq!(first["action"], "created");
    assert_eq!(first["profile_id"], "jane-doe-123");
    assert!(first.get("already_exists").is_none());

    let (status, second) = post_json(
        &client,
        "/api/save-profile",
        &jane_payload("https://linkedin.com/in/Jane-Doe-123", "Jane D."),
    )
    .await;
    assert_eq!(status, Status::Ok);
    assert_eq!(second["action"], "updated");
    assert_eq!(second["already_exists"], true);
    assert_eq!(
        second["message"],
        "Profile already exists in database; record updated"
    );
    assert_eq!(second["profile"]["id"], first["profile"]["id"]);
    assert_eq!(second["profile"]["revision"], 2);

    let (status, stored) = get_json(&client, "/api/get-analyzed-data/Jane-Doe-123").await;
    assert_eq!(status, Status::Ok);
    assert_eq!(stored["name"], "Jane D.");
    assert_eq!(stored["disc_primary"], "Influence (I)");
    assert_eq!(stored["key_insights"], json!(["Posts weekly"]));

    let (status, listing) = get_json(&client, "/api/profiles").await;
    assert_eq!(status, Status::Ok);
    assert_eq!(listing["data"].as_array().unwrap().len(), 1);
}

#[rocket::async_test]
async fn test_raw_data_is_stored_with_the_analysis() {
    let client = client_replying("{}", false).await;

    let (status, saved) = post_json(
        &client,
        "/api/save-analyzed-data",
        &jane_payload("https://www.linkedin.com/in/jane-doe-123/", "Jane Doe"),
    )
    .await;
    assert_eq!(status, Status::Created);

    let (status, raw) = get_json(&client, "/api/get-raw-data/jane-doe-123").await;
    assert_eq!(status, Status::Ok);
    assert_eq!(raw["about"], "Building teams");
    assert_eq!(raw["connections_count"], "500");
    assert_eq!(raw["posts"][0]["text"], "Hiring!");
    assert_eq!(raw["linkedin_url"], "https://www.linkedin.com/in/jane-doe-123");
    assert_eq!(saved["raw_data_id"], raw["id"]);
}

#[rocket::async_test]
async fn test_save_without_profile_identifier_is_rejected() {
    let client = client_replying("{}", false).await;

    let (status, body) = post_json(
        &client,
        "/api/save-analyzed-data",
        &json!({"name": "Acme", "linkedin_profile": "https://www.linkedin.com/company/acme"}),
    )
    .await;

    assert_eq!(status, Status::BadRequest);
    assert_eq!(body["success"], false);
    assert_eq!(body["error_code"], "VALIDATION_ERROR");
    assert!(body["details"]["linkedin_profile"][0]
        .as_str()
        .unwrap()
        .contains("/in/"));
}

#[rocket::async_test]
async fn test_save_reports_field_errors() {
    let client = client_replying("{}", false).await;

    let (status, body) = post_json(
        &client,
        "/api/save-profile",
        &json!({
            "linkedin_profile": "https://linkedin.com/in/ana",
            "dominance": 101,
            "user_id": "abc"
        }),
    )
    .await;

    assert_eq!(status, Status::BadRequest);
    assert_eq!(body["details"]["name"][0], "This field is required.");
    assert_eq!(
        body["details"]["dominance"][0],
        "Ensure this value is less than or equal to 100."
    );
    assert_eq!(body["details"]["user_id"][0], "Must be a valid UUID.");
}

#[rocket::async_test]
async fn test_lookup_of_unknown_profile_is_not_found() {
    let client = client_replying("{}", false).await;

    let (status, body) = get_json(&client, "/api/get-raw-data/nobody-here").await;
    assert_eq!(status, Status::NotFound);
    assert_eq!(body["error_code"], "NOT_FOUND");

    let (status, _) = get_json(&client, "/api/get-analyzed-data/nobody-here").await;
    assert_eq!(status, Status::NotFound);
}

#[rocket::async_test]
async fn test_analyze_profile_returns_parsed_analysis() {
    let client = client_replying(ANALYSIS_REPLY, false).await;

    let (status, body) = post_json(
        &client,
        "/api/analyze-profile",
        &json!({"name": "Jane Doe", "headline": "VP Sales", "followersCount": 1200}),
    )
    .await;

    assert_eq!(status, Status::Ok);
    assert_eq!(body["primaryType"], "Influence (I)");
    assert_eq!(body["confidence"], 82);
    assert_eq!(body["painPoints"], json!(["Scaling hiring"]));
}

#[rocket::async_test]
async fn test_analyze_profile_without_json_fails_with_parse_error() {
    let client = client_replying("I'm sorry, I can't analyze this profile.", false).await;

    let (status, body) = post_json(&client, "/api/analyze-profile", &json!({"name": "Jane"})).await;

    assert_eq!(status, Status::InternalServerError);
    assert_eq!(body["error_code"], "AI_RESPONSE_NOT_JSON");
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("Could not parse AI response as JSON"));
}

#[rocket::async_test]
async fn test_analyze_profile_truncated_output_is_reported() {
    let client = client_replying("{\"dominance\": 25, \"influ", true).await;

    let (status, body) = post_json(&client, "/api/analyze-profile", &json!({"name": "Jane"})).await;

    assert_eq!(status, Status::InternalServerError);
    assert_eq!(body["error_code"], "AI_RESPONSE_TRUNCATED");
}

#[rocket::async_test]
async fn test_analyze_profile_requires_name() {
    let client = client_replying(ANALYSIS_REPLY, false).await;

    let (status, body) = post_json(&client, "/api/analyze-profile", &json!({"headline": "CTO"})).await;

    assert_eq!(status, Status::BadRequest);
    assert_eq!(body["details"]["name"][0], "This field is required.");
}

#[rocket::async_test]
async fn test_upstream_failure_surfaces_status_and_body() {
    let client = client_with(Arc::new(FailingGenerator)).await;

    let (status, body) = post_json(&client, "/api/analyze-profile", &json!({"name": "Jane"})).await;

    assert_eq!(status, Status::InternalServerError);
    assert_eq!(body["error_code"], "LLM_API_ERROR");
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("503 - model overloaded"));
}

#[rocket::async_test]
async fn test_generate_message_shapes() {
    let client = client_replying(r#"{"message": "Hi Jane, loved your post on hiring."}"#, false).await;

    let (status, body) = post_json(
        &client,
        "/api/generate-message",
        &json!({
            "messageType": "linkedin",
            "query": "Invite to our webinar",
            "profileData": {"name": "Jane"}
        }),
    )
    .await;
    assert_eq!(status, Status::Ok);
    assert_eq!(body, json!({"message": "Hi Jane, loved your post on hiring."}));

    let (status, body) = post_json(
        &client,
        "/api/generate-message",
        &json!({"messageType": "carrier-pigeon", "query": "hi", "profileData": {"name": "Jane"}}),
    )
    .await;
    assert_eq!(status, Status::BadRequest);
    assert_eq!(
        body["details"]["messageType"][0],
        "\"carrier-pigeon\" is not a valid choice."
    );
}

#[rocket::async_test]
async fn test_generate_message_requires_non_empty_profile_data() {
    let client = client_replying(r#"{"message": "unused"}"#, false).await;

    let (status, body) = post_json(
        &client,
        "/api/generate-message",
        &json!({"messageType": "followup", "query": "Check in", "profileData": {}}),
    )
    .await;
    assert_eq!(status, Status::BadRequest);
    assert_eq!(body["details"]["profileData"][0], "Profile data is required.");
}

#[rocket::async_test]
async fn test_analyze_profile_accepts_loose_scores_and_keeps_extra_keys() {
    let reply = ANALYSIS_REPLY
        .replace("\"dominance\": 25", "\"dominance\": 25.0")
        .replace("\"confidence\": 82", "\"confidence\": \"82\", \"industryFit\": \"SaaS\"");
    let client = client_replying(&reply, false).await;

    let (status, body) = post_json(&client, "/api/analyze-profile", &json!({"name": "Jane Doe"})).await;

    assert_eq!(status, Status::Ok);
    assert_eq!(body["dominance"], 25);
    assert_eq!(body["confidence"], 82);
    assert_eq!(body["industryFit"], "SaaS");
}

#[rocket::async_test]
async fn test_percent_encoded_profile_url_is_found_by_decoded_slug() {
    let client = client_replying("{}", false).await;

    let (status, saved) = post_json(
        &client,
        "/api/save-analyzed-data",
        &jane_payload("https://www.linkedin.com/in/jos%C3%A9-garc%C3%ADa/", "José García"),
    )
    .await;
    assert_eq!(status, Status::Created);
    assert_eq!(saved["profile_id"], "josé-garcía");

    let (status, raw) = get_json(&client, "/api/get-raw-data/jos%C3%A9-garc%C3%ADa").await;
    assert_eq!(status, Status::Ok);
    assert_eq!(raw["profile_id"], "josé-garcía");

    let (status, stored) = get_json(&client, "/api/get-analyzed-data/Jos%C3%A9-Garc%C3%ADa").await;
    assert_eq!(status, Status::Ok);
    assert_eq!(stored["name"], "José García");

    let (status, again) = post_json(
        &client,
        "/api/save-profile",
        &jane_payload("https://www.linkedin.com/in/josé-garcía", "José García"),
    )
    .await;
    assert_eq!(status, Status::Ok);
    assert_eq!(again["action"], "updated");
}

#[rocket::async_test]
async fn test_profiles_listing_filters() {
    let client = client_replying("{}", false).await;

    for (slug, name, disc) in [
        ("ana", "Ana Cloud", "Dominance (D)"),
        ("ben", "Ben Data", "Influence (I)"),
        ("cat", "Cat Cloud", "Influence (I)"),
    ] {
        let (status, _) = post_json(
            &client,
            "/api/save-analyzed-data",
            &json!({
                "name": name,
                "linkedin_profile": format!("https://linkedin.com/in/{}", slug),
                "disc_primary": disc
            }),
        )
        .await;
        assert_eq!(status, Status::Created);
    }

    let (_, body) = get_json(&client, "/api/profiles?search=cloud").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (_, body) = get_json(&client, "/api/profiles?search=cloud&disc_primary=Influence%20(I)")
    .await;
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["profile_id"], "cat");

    let (_, body) = get_json(&client, "/api/profiles?limit=1&offset=2").await;
    assert_eq!(body["data"][0]["profile_id"], "ana");
}

#[rocket::async_test]
async fn test_health_and_preflight() {
    let client = client_replying("{}", false).await;

    let (status, body) = get_json(&client, "/api/health").await;
    assert_eq!(status, Status::Ok);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["database"], "ok");
    assert_eq!(body["data"]["llm_configured"], false);

    let response = client
        .options("/api/save-analyzed-data")
        .header(Header::new("Origin", "chrome-extension://abc"))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(
        response.headers().get_one("Access-Control-Allow-Origin"),
        Some("*")
    );
}

#[rocket::async_test]
async fn test_malformed_json_body_uses_error_shape() {
    let client = client_replying("{}", false).await;

    let response = client
        .post("/api/save-analyzed-data")
        .header(rocket::http::ContentType::JSON)
        .body("{not json")
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::BadRequest);
    let body = response.into_json::<Value>().await.expect("json body");
    assert_eq!(body["error_code"], "BAD_REQUEST");
    assert_eq!(body["type"], "error");
    assert_eq!(body["success"], false);
}
