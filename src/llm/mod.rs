use crate::config::Config;
use anyhow::Result;
use rig::providers::{anthropic, gemini, openai};
use rig_model::RigModel;
use std::sync::Arc;
use std::time::Duration;

mod rig_model;
mod types;

pub use types::{ChatMessage, LanguageModel, ModelError, ModelRequest, Role};

pub fn create_model(config: &Config) -> Result<Arc<dyn LanguageModel>> {
    let timeout = Duration::from_secs(config.api_timeout_secs);

    match config.api_provider.as_str() {
        "openai" => {
            let client: openai::CompletionsClient = openai::CompletionsClient::builder()
                .api_key(&config.api_key)
                .base_url(&config.api_url)
                .build()?;
            Ok(Arc::new(RigModel::new(client, &config.model, timeout)))
        }
        "gemini" => {
            let client = gemini::Client::new(&config.api_key)?;
            Ok(Arc::new(RigModel::new(client, &config.model, timeout)))
        }
        _ => {
            let client: anthropic::Client = anthropic::Client::builder()
                .api_key(&config.api_key)
                .base_url(&config.api_url)
                .build()?;
            Ok(Arc::new(RigModel::new(client, &config.model, timeout)))
        }
    }
}
