// src/web/error.rs
use crate::linkedin_analysis::{AnalysisError, LlmError, ParseError};
use crate::web::types::StandardErrorResponse;
use crate::web::validation::FieldErrors;
use rocket::http::Status;
use rocket::response::{self, Responder};
use rocket::serde::json::Json;
use rocket::Request;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{message}")]
    Validation {
        message: String,
        details: FieldErrors,
    },

    #[error("{context}: {source}")]
    Upstream {
        context: String,
        #[source]
        source: LlmError,
    },

    #[error("{source}")]
    Parse {
        context: String,
        #[source]
        source: ParseError,
    },

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>, details: FieldErrors) -> Self {
        ApiError::Validation {
            message: message.into(),
            details,
        }
    }

    /// Wrap a model failure; `context` names the operation that failed.
    pub fn from_analysis(context: impl Into<String>, err: AnalysisError) -> Self {
        match err {
            AnalysisError::Llm(source) => ApiError::Upstream {
                context: context.into(),
                source,
            },
            AnalysisError::Parse(source) => ApiError::Parse {
                context: context.into(),
                source,
            },
        }
    }

    pub fn status(&self) -> Status {
        match self {
            ApiError::Validation { .. } => Status::BadRequest,
            ApiError::NotFound(_) => Status::NotFound,
            ApiError::Upstream { .. } | ApiError::Parse { .. } | ApiError::Internal(_) => {
                Status::InternalServerError
            }
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => "VALIDATION_ERROR",
            ApiError::Upstream { source, .. } => match source {
                LlmError::MissingApiKey => "LLM_NOT_CONFIGURED",
                LlmError::Transport(_) => "LLM_UNREACHABLE",
                LlmError::Upstream { .. } => "LLM_API_ERROR",
                LlmError::InvalidResponse(_) => "LLM_INVALID_RESPONSE",
            },
            ApiError::Parse { source, .. } => source.error_code(),
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            ApiError::Upstream {
                source: LlmError::MissingApiKey,
                ..
            } => vec!["Set GEMINI_API_KEY and restart the server".to_string()],
            ApiError::Parse { source, .. } if source.truncated() => {
                vec!["Increase GEMINI_MAX_OUTPUT_TOKENS or shorten the profile data".to_string()]
            }
            ApiError::Upstream { .. } | ApiError::Parse { .. } => {
                vec!["Try again in a few moments".to_string()]
            }
            _ => Vec::new(),
        }
    }

    pub fn to_response(&self) -> StandardErrorResponse {
        let (error, message, details) = match self {
            ApiError::Validation { message, details } => {
                (message.clone(), None, Some(details.clone()))
            }
            ApiError::Upstream { context, source } => {
                (context.clone(), Some(source.to_string()), None)
            }
            ApiError::Parse { context, source } => {
                (context.clone(), Some(source.to_string()), None)
            }
            other => (other.to_string(), None, None),
        };

        let mut response = StandardErrorResponse::new(
            error,
            self.error_code().to_string(),
            self.suggestions(),
        );
        response.message = message;
        response.details = details;
        response
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(format!("{:#}", err))
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
        let status = self.status();
        if status.code >= 500 {
            error!("{} {} failed: {}", request.method(), request.uri(), self);
        }
        (status, Json(self.to_response())).respond_to(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_maps_to_400_with_details() {
        let mut details = FieldErrors::default();
        details.add("name", "This field is required.");
        let err = ApiError::validation("Invalid profile data", details);

        assert_eq!(err.status(), Status::BadRequest);
        let body = serde_json::to_value(err.to_response()).unwrap();
        assert_eq!(body["type"], "error");
        assert_eq!(body["success"], false);
        assert_eq!(body["error_code"], "VALIDATION_ERROR");
        assert_eq!(body["details"]["name"][0], "This field is required.");
    }

    #[test]
    fn test_upstream_failure_carries_status_and_body() {
        let err = ApiError::from_analysis(
            "Failed to analyze profile",
            AnalysisError::Llm(LlmError::Upstream {
                status: 429,
                body: "quota exceeded".to_string(),
            }),
        );

        assert_eq!(err.status(), Status::InternalServerError);
        let body = serde_json::to_value(err.to_response()).unwrap();
        assert_eq!(body["error"], "Failed to analyze profile");
        assert_eq!(body["error_code"], "LLM_API_ERROR");
        assert!(body["message"].as_str().unwrap().contains("429 - quota exceeded"));
    }

    #[test]
    fn test_truncated_parse_failure_is_distinguishable() {
        let err = ApiError::from_analysis(
            "Failed to analyze profile",
            AnalysisError::Parse(ParseError::NoJsonObject { truncated: true }),
        );
        assert_eq!(err.error_code(), "AI_RESPONSE_TRUNCATED");
        assert!(err.to_string().contains("truncated"));
    }

    #[test]
    fn test_internal_from_anyhow() {
        let err: ApiError = anyhow::anyhow!("disk full").context("Failed to save").into();
        assert_eq!(err.status(), Status::InternalServerError);
        assert_eq!(err.to_string(), "Failed to save: disk full");
    }
}
