use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::models::{
    Content, GenerateRequest, GenerateResponse, GenerationConfig, ToolSpec,
};

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    pub max_output_tokens: Option<u32>,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "gemini-1.5-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            temperature: 0.2,
            max_output_tokens: None,
            timeout_secs: 60,
            max_retries: 3,
        }
    }
}

impl GeminiConfig {
    /// Reads the API key from `GEMINI_API_KEY`, keeping the other
    /// fields at their defaults.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .context("GEMINI_API_KEY environment variable not set")?;
        Ok(Self {
            api_key,
            ..Self::default()
        })
    }
}

pub struct GeminiClient {
    config: GeminiConfig,
    client: Client,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { config, client })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Sends one generation request, retrying transient failures with
    /// exponential backoff.
    pub async fn generate(
        &self,
        contents: Vec<Content>,
        system_instruction: Option<String>,
        tools: Option<Vec<ToolSpec>>,
    ) -> Result<Content> {
        let request = GenerateRequest {
            contents,
            system_instruction: system_instruction.map(|text| Content {
                role: None,
                parts: vec![crate::models::Part::text(text)],
            }),
            tools,
            generation_config: Some(GenerationConfig {
                temperature: Some(self.config.temperature),
                max_output_tokens: self.config.max_output_tokens,
            }),
        };

        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            match self.try_generate(&request).await {
                Ok(content) => return Ok(content),
                Err(e) => {
                    debug!(attempt, error = %e, "generation attempt failed");
                    last_error = Some(e);
                    if attempt < self.config.max_retries {
                        let delay = Duration::from_millis(1000 * (2_u64.pow(attempt)));
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        Err(last_error.unwrap())
    }

    async fn try_generate(&self, request: &GenerateRequest) -> Result<Content> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.config.base_url, self.config.model, self.config.api_key
        );

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .context("Failed to send request to Gemini API")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "Gemini API returned error {}: {}",
                status,
                error_text
            ));
        }

        let generate_response: GenerateResponse = response
            .json()
            .await
            .context("Failed to parse Gemini API response")?;

        generate_response
            .content()
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Gemini API returned no candidates"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_create_gemini_client_with_default_config() {
        let config = GeminiConfig::default();
        let client = GeminiClient::new(config.clone());

        assert!(client.is_ok());
        assert_eq!(config.model, "gemini-1.5-flash");
        assert_eq!(config.temperature, 0.2);
        assert_eq!(config.max_retries, 3);
    }

    #[test]
    fn should_build_client_with_custom_model() {
        let config = GeminiConfig {
            model: "gemini-1.5-pro".to_string(),
            ..Default::default()
        };

        let client = GeminiClient::new(config).unwrap();

        assert_eq!(client.model(), "gemini-1.5-pro");
    }

    #[test]
    fn should_fail_from_env_without_api_key() {
        std::env::remove_var("GEMINI_API_KEY");

        let result = GeminiConfig::from_env();

        assert!(result.is_err());
    }
}
