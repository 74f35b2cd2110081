// src/linkedin_analysis/profile_analyzer.rs
use super::gemini_client::{LlmError, TextGenerator};
use super::prompts::{build_analysis_prompt, build_message_prompt};
use super::response_parser::{parse_model_output, ParseError};
use super::types::{
    EmailMessage, GeneratedMessage, MessageType, ProfileAnalysis, ProfileData, TextMessage,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Prompt -> model -> typed result, one blocking model call per request.
#[derive(Clone)]
pub struct ProfileAnalyzer {
    generator: Arc<dyn TextGenerator>,
}

impl ProfileAnalyzer {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    pub async fn analyze_profile(
        &self,
        profile: &ProfileData,
    ) -> Result<ProfileAnalysis, AnalysisError> {
        let name = profile.name.as_deref().unwrap_or("unknown");
        info!("Starting DISC analysis for profile: {}", name);

        let prompt = build_analysis_prompt(profile);
        let generation = self.generator.generate(&prompt).await?;

        let analysis: ProfileAnalysis = parse_model_output(&generation.text, generation.truncated)
            .and_then(|analysis| check_scores(analysis, generation.truncated))
            .map_err(|e| {
                error!("Failed to parse analysis for {}: {}", name, e);
                e
            })?;

        info!(
            "Analysis completed for {}: {} (confidence {})",
            name, analysis.primary_type, analysis.confidence
        );
        Ok(analysis)
    }

    pub async fn generate_message(
        &self,
        message_type: MessageType,
        query: &str,
        profile: &ProfileData,
    ) -> Result<GeneratedMessage, AnalysisError> {
        info!(
            "Generating {} message for profile: {}",
            message_type,
            profile.name.as_deref().unwrap_or("unknown")
        );

        let prompt = build_message_prompt(message_type, query, profile);
        let generation = self.generator.generate(&prompt).await?;

        let message = match message_type {
            MessageType::Email => GeneratedMessage::Email(parse_model_output::<EmailMessage>(
                &generation.text,
                generation.truncated,
            )?),
            MessageType::Linkedin | MessageType::Followup => GeneratedMessage::Text(
                parse_model_output::<TextMessage>(&generation.text, generation.truncated)?,
            ),
        };

        Ok(message)
    }
}

/// DISC scores and confidence are percentages.
fn check_scores(analysis: ProfileAnalysis, truncated: bool) -> Result<ProfileAnalysis, ParseError> {
    let scores = [
        ("dominance", analysis.dominance),
        ("influence", analysis.influence),
        ("steadiness", analysis.steadiness),
        ("compliance", analysis.compliance),
        ("confidence", analysis.confidence),
    ];

    if let Some((field, value)) = scores.iter().find(|(_, v)| !(0..=100).contains(v)) {
        return Err(ParseError::UnexpectedShape {
            truncated,
            detail: format!("{} must be between 0 and 100, got {}", field, value),
        });
    }

    Ok(analysis)
}
