//! AI Provider Adapters.
//!
//! Implementations of the AIProvider port for the supported generation services.
//!
//! ## Available Adapters
//!
//! - `GeminiProvider` - Google Gemini models (the default)
//! - `OpenAIProvider` - OpenAI chat completion models
//! - `MockAIProvider` - Configurable mock for testing and offline runs

mod gemini_provider;
mod mock_provider;
mod openai_provider;
mod transport;

pub use gemini_provider::{GeminiConfig, GeminiProvider};
pub use mock_provider::{MockAIProvider, MockResponse};
pub use openai_provider::{OpenAIConfig, OpenAIProvider};

use std::sync::Arc;

use tracing::info;

use crate::config::{AiConfig, AiProvider};
use crate::ports::{AIError, AIProvider as AIProviderPort};

/// Builds the provider selected by configuration.
///
/// Credentials move into the provider's own config here; nothing downstream
/// reads them from the environment.
pub fn provider_from_config(config: &AiConfig) -> Result<Arc<dyn AIProviderPort>, AIError> {
    let provider: Arc<dyn AIProviderPort> = match config.provider {
        AiProvider::Gemini => {
            let key = config
                .gemini_api_key
                .clone()
                .ok_or(AIError::AuthenticationFailed)?;
            let mut gemini = GeminiConfig::new(key).with_timeout(config.timeout());
            if let Some(model) = &config.model {
                gemini = gemini.with_model(model);
            }
            if let Some(url) = &config.base_url {
                gemini = gemini.with_base_url(url);
            }
            Arc::new(GeminiProvider::new(gemini)?)
        }
        AiProvider::OpenAI => {
            let key = config
                .openai_api_key
                .clone()
                .ok_or(AIError::AuthenticationFailed)?;
            let mut openai = OpenAIConfig::new(key).with_timeout(config.timeout());
            if let Some(model) = &config.model {
                openai = openai.with_model(model);
            }
            if let Some(url) = &config.base_url {
                openai = openai.with_base_url(url);
            }
            Arc::new(OpenAIProvider::new(openai)?)
        }
        AiProvider::Mock => Arc::new(MockAIProvider::new()),
    };

    let info = provider.provider_info();
    info!(provider = %info.name, model = %info.model, "AI provider configured");
    Ok(provider)
}
