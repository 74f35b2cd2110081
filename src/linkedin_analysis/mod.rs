// src/linkedin_analysis/mod.rs
//! LinkedIn profile analysis: identity, prompts, model access and output parsing

pub mod gemini_client;
pub mod profile_analyzer;
pub mod profile_identity;
pub mod prompts;
pub mod response_parser;
pub mod types;

pub use gemini_client::{GeminiClient, Generation, LlmError, TextGenerator};
pub use profile_analyzer::{AnalysisError, ProfileAnalyzer};
pub use profile_identity::{extract_profile_id, normalize_profile_url, resolve_lookup_key};
pub use response_parser::{parse_model_json, parse_model_output, ParseError};
pub use types::{
    lenient_integer, EmailMessage, EmailTemplate, GeneratedMessage, MessageType, Post,
    ProfileAnalysis, ProfileData, TextMessage,
};
