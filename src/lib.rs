pub mod core;
pub mod linkedin_analysis;
pub mod profile_cli;
pub mod web;

pub use crate::core::{ConfigManager, Database};
pub use crate::linkedin_analysis::{GeminiClient, ProfileAnalyzer, TextGenerator};
pub use crate::web::{build_rocket, start_web_server};
