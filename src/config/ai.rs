//! AI provider configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// AI provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// Provider used for plan generation
    #[serde(default)]
    pub provider: AiProvider,

    /// Gemini API key
    pub gemini_api_key: Option<String>,

    /// OpenAI API key
    pub openai_api_key: Option<String>,

    /// Model override (provider default when unset)
    pub model: Option<String>,

    /// Base URL override (provider default when unset)
    pub base_url: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Sampling temperature for plan generation
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

/// AI provider type
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    #[default]
    Gemini,
    OpenAI,
    /// Scripted offline provider; every plan falls back.
    Mock,
}

impl AiConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check if Gemini is configured
    pub fn has_gemini(&self) -> bool {
        self.gemini_api_key.as_ref().is_some_and(|k| !k.trim().is_empty())
    }

    /// Check if OpenAI is configured
    pub fn has_openai(&self) -> bool {
        self.openai_api_key.as_ref().is_some_and(|k| !k.trim().is_empty())
    }

    /// Validate AI configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.provider {
            AiProvider::Gemini if !self.has_gemini() => {
                return Err(ValidationError::MissingRequired("GEMINI_API_KEY"));
            }
            AiProvider::OpenAI if !self.has_openai() => {
                return Err(ValidationError::MissingRequired("OPENAI_API_KEY"));
            }
            _ => {}
        }

        if self.timeout_secs == 0 || self.timeout_secs > 600 {
            return Err(ValidationError::InvalidTimeout);
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ValidationError::InvalidTemperature);
        }

        Ok(())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: AiProvider::default(),
            gemini_api_key: None,
            openai_api_key: None,
            model: None,
            base_url: None,
            timeout_secs: default_timeout(),
            temperature: default_temperature(),
        }
    }
}

fn default_timeout() -> u64 {
    60
}

fn default_temperature() -> f32 {
    0.7
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ai_config_defaults() {
        let config = AiConfig::default();
        assert_eq!(config.provider, AiProvider::Gemini);
        assert_eq!(config.timeout_secs, 60);
        assert!((config.temperature - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn test_timeout_duration() {
        let config = AiConfig {
            timeout_secs: 30,
            ..Default::default()
        };
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_has_provider_checks() {
        let config = AiConfig {
            gemini_api_key: Some("   ".to_string()),
            openai_api_key: Some("sk-xxx".to_string()),
            ..Default::default()
        };
        assert!(!config.has_gemini());
        assert!(config.has_openai());
    }

    #[test]
    fn test_validation_selected_provider_missing_key() {
        let config = AiConfig {
            provider: AiProvider::Gemini,
            openai_api_key: Some("sk-xxx".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::MissingRequired("GEMINI_API_KEY"))
        ));
    }

    #[test]
    fn test_validation_mock_needs_no_key() {
        let config = AiConfig {
            provider: AiProvider::Mock,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_out_of_range_values() {
        let config = AiConfig {
            provider: AiProvider::Mock,
            timeout_secs: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ValidationError::InvalidTimeout)));

        let config = AiConfig {
            provider: AiProvider::Mock,
            temperature: 3.5,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidTemperature)
        ));
    }

    #[test]
    fn test_validation_valid_config() {
        let config = AiConfig {
            provider: AiProvider::OpenAI,
            openai_api_key: Some("sk-xxx".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
