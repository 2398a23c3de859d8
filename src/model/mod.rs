pub mod prompt;

use log::{debug, info};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use crate::config::CompletionConfig;
use crate::web::models::Message;

pub const QUOTA_FALLBACK: &str = "Our AI is temporarily unavailable due to quota limits. For details about services or pricing, please check the website sections or contact support.";
pub const EMPTY_FALLBACK: &str = "I'm sorry, I couldn't generate a response.";

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("completion request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("provider quota exceeded")]
    QuotaExceeded,

    /// Raw provider body kept for diagnostics.
    #[error("provider returned {status}: {body}")]
    Provider { status: u16, body: String },
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorEnvelope {
    error: ProviderErrorBody,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    code: Option<String>,
}

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
pub struct CompletionClient {
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    client: Client,
}

impl CompletionClient {
    /// `None` when no API key is configured.
    pub fn from_config(config: &CompletionConfig) -> Option<Self> {
        let api_key = config.api_key.clone()?;
        info!(
            "Using completion provider at: {} (model: {})",
            config.base_url, config.model
        );
        Some(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            client: Client::new(),
        })
    }

    /// Sends the prompt and returns the first choice's text, `None` if the
    /// provider answered without usable content.
    pub async fn complete(&self, messages: &[Message]) -> Result<Option<String>, CompletionError> {
        let url = format!("{}/chat/completions", self.base_url);

        let payload = json!({
            "model": self.model,
            "messages": messages,
            "temperature": self.temperature,
            "max_tokens": self.max_tokens
        });

        info!(
            "Sending {} messages to completion provider with max_tokens: {}",
            messages.len(),
            self.max_tokens
        );
        debug!("Payload: {}", payload);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            return Err(classify_failure(status.as_u16(), body));
        }

        let parsed: CompletionResponse = response.json().await?;
        let content = extract_content(parsed);
        if let Some(text) = &content {
            info!("Response length: {} characters", text.len());
        }
        Ok(content)
    }
}

fn classify_failure(status: u16, body: String) -> CompletionError {
    let code = serde_json::from_str::<ProviderErrorEnvelope>(&body)
        .ok()
        .and_then(|envelope| envelope.error.code);
    match code.as_deref() {
        Some("insufficient_quota") => CompletionError::QuotaExceeded,
        _ => CompletionError::Provider { status, body },
    }
}

fn extract_content(response: CompletionResponse) -> Option<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .filter(|content| !content.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> CompletionResponse {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn quota_code_is_recognised() {
        let body = r#"{"error":{"message":"You exceeded your current quota","type":"insufficient_quota","code":"insufficient_quota"}}"#;
        assert!(matches!(
            classify_failure(429, body.to_string()),
            CompletionError::QuotaExceeded
        ));
    }

    #[test]
    fn other_failures_keep_raw_body() {
        let body = r#"{"error":{"message":"Invalid API key","code":"invalid_api_key"}}"#;
        match classify_failure(401, body.to_string()) {
            CompletionError::Provider { status, body: raw } => {
                assert_eq!(status, 401);
                assert_eq!(raw, body);
            }
            other => panic!("unexpected classification: {:?}", other),
        }
    }

    #[test]
    fn non_json_failures_are_provider_errors() {
        assert!(matches!(
            classify_failure(502, "Bad Gateway".into()),
            CompletionError::Provider { status: 502, .. }
        ));
    }

    #[test]
    fn first_choice_content_is_extracted() {
        let response = parse(
            r#"{"choices":[{"message":{"role":"assistant","content":"We build websites."}},{"message":{"content":"ignored"}}]}"#,
        );
        assert_eq!(extract_content(response).as_deref(), Some("We build websites."));
    }

    #[test]
    fn missing_or_blank_content_yields_none() {
        assert_eq!(extract_content(parse(r#"{"choices":[]}"#)), None);
        assert_eq!(extract_content(parse(r#"{}"#)), None);
        assert_eq!(
            extract_content(parse(r#"{"choices":[{"message":{"content":null}}]}"#)),
            None
        );
        assert_eq!(
            extract_content(parse(r#"{"choices":[{"message":{"content":"  "}}]}"#)),
            None
        );
    }

    #[test]
    fn client_requires_api_key() {
        let mut config = CompletionConfig {
            api_key: None,
            base_url: "https://api.openai.com/v1/".into(),
            model: "gpt-4o-mini".into(),
            temperature: 0.2,
            max_tokens: 300,
        };
        assert!(CompletionClient::from_config(&config).is_none());

        config.api_key = Some("sk-test".into());
        let client = CompletionClient::from_config(&config).unwrap();
        assert_eq!(client.base_url, "https://api.openai.com/v1");
    }
}
