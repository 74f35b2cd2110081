// src/web/validation.rs
//! Request-edge validation: turns loosely typed extension payloads into
//! typed inputs, collecting field-level messages on the way.

use crate::core::database::{AnalysisFields, AnalyzedProfileInput, ProfileSave, RawDataInput};
use crate::linkedin_analysis::{
    extract_profile_id, lenient_integer, normalize_profile_url, MessageType, Post, ProfileData,
};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use uuid::Uuid;

pub const REQUIRED: &str = "This field is required.";
pub const BLANK: &str = "This field may not be blank.";
pub const INVALID_URL: &str = "Enter a valid URL.";
pub const INVALID_INTEGER: &str = "A valid integer is required.";
pub const INVALID_UUID: &str = "Must be a valid UUID.";
pub const NOT_A_STRING: &str = "Not a valid string.";
pub const SCORE_TOO_HIGH: &str = "Ensure this value is less than or equal to 100.";
pub const SCORE_TOO_LOW: &str = "Ensure this value is greater than or equal to 0.";
pub const PROFILE_DATA_REQUIRED: &str = "Profile data is required.";
pub const MISSING_PROFILE_ID: &str =
    "Could not extract a profile identifier; expected a LinkedIn URL containing /in/<identifier>.";

const SCORE_FIELDS: [&str; 5] = [
    "confidence",
    "dominance",
    "influence",
    "steadiness",
    "compliance",
];

// camelCase key -> snake_case key; the snake_case key wins when both are sent.
const SAVE_ALIASES: [(&str, &str); 16] = [
    ("linkedinProfile", "linkedin_profile"),
    ("linkedin_url", "linkedin_profile"),
    ("linkedinUrl", "linkedin_profile"),
    ("primaryType", "disc_primary"),
    ("discPrimary", "disc_primary"),
    ("keyInsights", "key_insights"),
    ("painPoints", "pain_points"),
    ("communicationStyle", "communication_style"),
    ("salesApproach", "sales_approach"),
    ("bestApproach", "best_approach"),
    ("idealPitch", "ideal_pitch"),
    ("communicationDos", "communication_dos"),
    ("communicationDonts", "communication_donts"),
    ("userId", "user_id"),
    ("profileData", "profile_data"),
    ("rawData", "profile_data"),
];

/// Field name -> messages, serialized as a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&Vec<String>> {
        self.0.get(field)
    }

    /// Fold another set of errors in under `prefix.`.
    pub fn merge_nested(&mut self, prefix: &str, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0
                .entry(format!("{}.{}", prefix, field))
                .or_default()
                .extend(messages);
        }
    }
}

/// Validated `generate-message` request.
#[derive(Debug, Clone)]
pub struct MessageRequest {
    pub message_type: MessageType,
    pub query: String,
    pub profile: ProfileData,
}

// ===== primitive readers =====

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

/// Optional text; numbers and booleans are coerced to strings.
fn optional_string(
    obj: &Map<String, Value>,
    key: &str,
    errors: &mut FieldErrors,
) -> Option<String> {
    match obj.get(key) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        Some(_) => {
            errors.add(key, NOT_A_STRING);
            None
        }
    }
}

fn required_string(obj: &Map<String, Value>, key: &str, errors: &mut FieldErrors) -> Option<String> {
    match obj.get(key) {
        None | Some(Value::Null) => {
            errors.add(key, REQUIRED);
            None
        }
        Some(_) => {
            let value = optional_string(obj, key, errors)?;
            if value.trim().is_empty() {
                errors.add(key, BLANK);
                None
            } else {
                Some(value)
            }
        }
    }
}

fn is_valid_url(candidate: &str) -> bool {
    match reqwest::Url::parse(candidate.trim()) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.host_str().is_some(),
        Err(_) => false,
    }
}

/// Blank counts as absent; anything else must be an absolute http(s) URL.
fn optional_url(obj: &Map<String, Value>, key: &str, errors: &mut FieldErrors) -> Option<String> {
    let value = optional_string(obj, key, errors)?;
    if value.trim().is_empty() {
        return None;
    }
    if !is_valid_url(&value) {
        errors.add(key, INVALID_URL);
        return None;
    }
    Some(value.trim().to_string())
}

fn optional_score(obj: &Map<String, Value>, key: &str, errors: &mut FieldErrors) -> Option<i64> {
    let value = obj.get(key).filter(|v| !v.is_null())?;

    let Some(score) = lenient_integer(value) else {
        errors.add(key, INVALID_INTEGER);
        return None;
    };

    if score > 100 {
        errors.add(key, SCORE_TOO_HIGH);
        None
    } else if score < 0 {
        errors.add(key, SCORE_TOO_LOW);
        None
    } else {
        Some(score)
    }
}

fn string_list(obj: &Map<String, Value>, key: &str, errors: &mut FieldErrors) -> Vec<String> {
    match obj.get(key) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::String(s) => out.push(s.clone()),
                    Value::Number(n) => out.push(n.to_string()),
                    other => {
                        errors.add(key, format!("Not a valid string: got {}.", type_name(other)));
                    }
                }
            }
            out
        }
        Some(other) => {
            errors.add(
                key,
                format!("Expected a list of items but got type \"{}\".", type_name(other)),
            );
            Vec::new()
        }
    }
}

fn optional_uuid(obj: &Map<String, Value>, key: &str, errors: &mut FieldErrors) -> Option<Uuid> {
    let value = optional_string(obj, key, errors)?;
    if value.trim().is_empty() {
        return None;
    }
    match Uuid::parse_str(value.trim()) {
        Ok(id) => Some(id),
        Err(_) => {
            errors.add(key, INVALID_UUID);
            None
        }
    }
}

fn as_object<'v>(value: &'v Value, errors: &mut FieldErrors) -> Option<&'v Map<String, Value>> {
    match value {
        Value::Object(obj) => Some(obj),
        other => {
            errors.add(
                "non_field_errors",
                format!("Invalid data. Expected a dictionary, but got {}.", type_name(other)),
            );
            None
        }
    }
}

fn parse_posts(obj: &Map<String, Value>, errors: &mut FieldErrors) -> Vec<Post> {
    let items = match obj.get("posts") {
        None | Some(Value::Null) => return Vec::new(),
        Some(Value::Array(items)) => items,
        Some(other) => {
            errors.add(
                "posts",
                format!("Expected a list of items but got type \"{}\".", type_name(other)),
            );
            return Vec::new();
        }
    };

    let mut posts = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let Value::Object(post) = item else {
            errors.add(format!("posts.{}", index), "Expected an object.");
            continue;
        };

        let mut post_errors = FieldErrors::default();
        let text = |key: &str, errs: &mut FieldErrors| {
            optional_string(post, key, errs).unwrap_or_default()
        };
        let parsed = Post {
            text: text("text", &mut post_errors),
            time: text("time", &mut post_errors),
            reactions: text("reactions", &mut post_errors),
            comments: text("comments", &mut post_errors),
        };

        if post_errors.is_empty() {
            posts.push(parsed);
        } else {
            errors.merge_nested(&format!("posts.{}", index), post_errors);
        }
    }
    posts
}

// ===== payloads =====

/// Validate a scraped profile object as sent by the browser extension.
pub fn parse_profile_data(value: &Value, require_name: bool) -> Result<ProfileData, FieldErrors> {
    let mut errors = FieldErrors::default();
    let Some(obj) = as_object(value, &mut errors) else {
        return Err(errors);
    };

    let name = if require_name {
        required_string(obj, "name", &mut errors)
    } else {
        optional_string(obj, "name", &mut errors)
    };

    let url_key = if obj.contains_key("linkedin_url") {
        "linkedin_url"
    } else {
        "linkedinUrl"
    };

    let profile = ProfileData {
        name,
        headline: optional_string(obj, "headline", &mut errors),
        location: optional_string(obj, "location", &mut errors),
        about: optional_string(obj, "about", &mut errors),
        experience: optional_string(obj, "experience", &mut errors),
        education: optional_string(obj, "education", &mut errors),
        skills: optional_string(obj, "skills", &mut errors),
        connections_count: optional_string(obj, "connectionsCount", &mut errors),
        followers_count: optional_string(obj, "followersCount", &mut errors),
        current_company: optional_string(obj, "currentCompany", &mut errors),
        highlights: optional_string(obj, "highlights", &mut errors),
        services: optional_string(obj, "services", &mut errors),
        licenses_and_certifications: optional_string(obj, "licensesAndCertifications", &mut errors),
        activity: optional_string(obj, "activity", &mut errors),
        linkedin_url: optional_url(obj, url_key, &mut errors),
        posts: parse_posts(obj, &mut errors),
    };

    if errors.is_empty() {
        Ok(profile)
    } else {
        Err(errors)
    }
}

/// `analyze-profile` accepts the profile object itself or wrapped in `profileData`.
pub fn parse_analysis_request(body: &Value) -> Result<ProfileData, FieldErrors> {
    let profile = body
        .get("profileData")
        .or_else(|| body.get("profile_data"))
        .filter(|v| v.is_object())
        .unwrap_or(body);
    parse_profile_data(profile, true)
}

pub fn parse_message_request(body: &Value) -> Result<MessageRequest, FieldErrors> {
    let mut errors = FieldErrors::default();
    let Some(obj) = as_object(body, &mut errors) else {
        return Err(errors);
    };

    let type_key = if obj.contains_key("message_type") && !obj.contains_key("messageType") {
        "message_type"
    } else {
        "messageType"
    };
    let message_type = required_string(obj, type_key, &mut errors).and_then(|raw| {
        raw.trim()
            .to_lowercase()
            .parse::<MessageType>()
            .map_err(|_| errors.add(type_key, format!("\"{}\" is not a valid choice.", raw)))
            .ok()
    });

    let query = required_string(obj, "query", &mut errors);

    let profile_key = if obj.contains_key("profile_data") && !obj.contains_key("profileData") {
        "profile_data"
    } else {
        "profileData"
    };
    let profile = match obj.get(profile_key) {
        None | Some(Value::Null) => {
            errors.add(profile_key, REQUIRED);
            None
        }
        Some(Value::Object(fields)) if fields.is_empty() => {
            errors.add(profile_key, PROFILE_DATA_REQUIRED);
            None
        }
        Some(value) => match parse_profile_data(value, false) {
            Ok(profile) => Some(profile),
            Err(nested) => {
                errors.merge_nested(profile_key, nested);
                None
            }
        },
    };

    match (message_type, query, profile) {
        (Some(message_type), Some(query), Some(profile)) if errors.is_empty() => {
            Ok(MessageRequest {
                message_type,
                query,
                profile,
            })
        }
        _ => Err(errors),
    }
}

/// Map the camelCase spellings the extension sends onto snake_case keys.
pub fn normalize_save_payload(body: &Map<String, Value>) -> Map<String, Value> {
    let mut normalized = body.clone();
    for (alias, target) in SAVE_ALIASES {
        if normalized.contains_key(target) {
            continue;
        }
        if let Some(value) = body.get(alias) {
            normalized.insert(target.to_string(), value.clone());
        }
    }
    normalized
}

/// Validate a save request and resolve the profile identifier it targets.
pub fn parse_save_request(body: &Value) -> Result<ProfileSave, FieldErrors> {
    let mut errors = FieldErrors::default();
    let Some(raw_obj) = as_object(body, &mut errors) else {
        return Err(errors);
    };
    let obj = normalize_save_payload(raw_obj);

    let profile_data = match obj.get("profile_data") {
        None | Some(Value::Null) => None,
        Some(value) => match parse_profile_data(value, false) {
            Ok(profile) => Some((profile, value.clone())),
            Err(nested) => {
                errors.merge_nested("profile_data", nested);
                None
            }
        },
    };

    let mut linkedin_profile = optional_url(&obj, "linkedin_profile", &mut errors);
    if linkedin_profile.is_none() && errors.get("linkedin_profile").is_none() {
        linkedin_profile = profile_data
            .as_ref()
            .and_then(|(profile, _)| profile.linkedin_url.clone());
    }

    let profile_id = match &linkedin_profile {
        Some(url) => {
            let id = extract_profile_id(url);
            if id.is_none() {
                errors.add("linkedin_profile", MISSING_PROFILE_ID);
            }
            id
        }
        None => {
            if errors.get("linkedin_profile").is_none() {
                errors.add("linkedin_profile", REQUIRED);
            }
            None
        }
    };

    let mut fields = AnalysisFields {
        name: required_string(&obj, "name", &mut errors).unwrap_or_default(),
        headline: optional_string(&obj, "headline", &mut errors),
        disc_primary: optional_string(&obj, "disc_primary", &mut errors),
        description: optional_string(&obj, "description", &mut errors),
        key_insights: string_list(&obj, "key_insights", &mut errors),
        pain_points: string_list(&obj, "pain_points", &mut errors),
        communication_style: optional_string(&obj, "communication_style", &mut errors),
        sales_approach: optional_string(&obj, "sales_approach", &mut errors),
        best_approach: optional_string(&obj, "best_approach", &mut errors),
        ideal_pitch: optional_string(&obj, "ideal_pitch", &mut errors),
        communication_dos: string_list(&obj, "communication_dos", &mut errors),
        communication_donts: string_list(&obj, "communication_donts", &mut errors),
        ..Default::default()
    };
    for key in SCORE_FIELDS {
        let score = optional_score(&obj, key, &mut errors);
        match key {
            "confidence" => fields.confidence = score,
            "dominance" => fields.dominance = score,
            "influence" => fields.influence = score,
            "steadiness" => fields.steadiness = score,
            _ => fields.compliance = score,
        }
    }

    let user_id = optional_uuid(&obj, "user_id", &mut errors);

    let (Some(profile_id), true) = (profile_id, errors.is_empty()) else {
        return Err(errors);
    };

    let normalized_url = linkedin_profile.as_deref().map(normalize_profile_url);

    let raw_data = profile_data.map(|(profile, raw_json)| RawDataInput {
        profile_id: profile_id.clone(),
        linkedin_url: profile
            .linkedin_url
            .as_deref()
            .map(normalize_profile_url)
            .or_else(|| normalized_url.clone()),
        profile,
        raw_json,
        user_id,
    });

    Ok(ProfileSave {
        analysis: AnalyzedProfileInput {
            profile_id,
            linkedin_profile: normalized_url,
            user_id,
            fields,
            raw_backup: body.clone(),
        },
        raw_data,
    })
}
