use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

// ===== Scraped profile data (as sent by the browser extension) =====

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub text: String,
    pub time: String,
    pub reactions: String,
    pub comments: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileData {
    pub name: Option<String>,
    pub headline: Option<String>,
    pub location: Option<String>,
    pub about: Option<String>,
    pub experience: Option<String>,
    pub education: Option<String>,
    pub skills: Option<String>,
    pub connections_count: Option<String>,
    pub followers_count: Option<String>,
    pub current_company: Option<String>,
    pub highlights: Option<String>,
    pub services: Option<String>,
    pub licenses_and_certifications: Option<String>,
    pub activity: Option<String>,
    #[serde(rename = "linkedin_url", alias = "linkedinUrl")]
    pub linkedin_url: Option<String>,
    #[serde(default)]
    pub posts: Vec<Post>,
}

// ===== Model output shapes =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailTemplate {
    pub subject: String,
    pub body: String,
}

/// Integer that may arrive as a whole float (`35.0`) or a numeric string (`"78"`).
pub fn lenient_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn deserialize_lenient_integer<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    lenient_integer(&value)
        .ok_or_else(|| D::Error::custom(format!("expected an integer, got {}", value)))
}

/// DISC personality and sales analysis returned by the model.
///
/// Keys the model adds beyond the known ones are kept in `extra` and
/// returned to the caller unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileAnalysis {
    #[serde(deserialize_with = "deserialize_lenient_integer")]
    pub dominance: i64,
    #[serde(deserialize_with = "deserialize_lenient_integer")]
    pub influence: i64,
    #[serde(deserialize_with = "deserialize_lenient_integer")]
    pub steadiness: i64,
    #[serde(deserialize_with = "deserialize_lenient_integer")]
    pub compliance: i64,
    pub primary_type: String,
    #[serde(deserialize_with = "deserialize_lenient_integer")]
    pub confidence: i64,
    pub description: String,
    pub key_insights: Vec<String>,
    pub communication_style: String,
    pub sales_approach: String,
    pub pain_points: Vec<String>,
    pub ideal_pitch: String,
    pub communication_dos: Vec<String>,
    pub communication_donts: Vec<String>,
    pub best_approach: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_template: Option<EmailTemplate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follow_up_message: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextMessage {
    pub message: String,
}

/// Output of a message generation request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum GeneratedMessage {
    Email(EmailMessage),
    Text(TextMessage),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Email,
    Linkedin,
    Followup,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Email => "email",
            MessageType::Linkedin => "linkedin",
            MessageType::Followup => "followup",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "email" => Ok(MessageType::Email),
            "linkedin" => Ok(MessageType::Linkedin),
            "followup" => Ok(MessageType::Followup),
            other => Err(format!("Unknown message type: {}", other)),
        }
    }
}

// ===== Gemini generateContent wire format =====

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentRequest {
    pub contents: Vec<RequestContent>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct RequestContent {
    pub parts: Vec<RequestPart>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct RequestPart {
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerationConfig {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Candidate {
    pub content: Option<CandidateContent>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ResponsePart {
    pub text: Option<String>,
}
