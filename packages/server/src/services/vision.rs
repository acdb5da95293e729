//! Client for an OpenAI-compatible chat-completions backend with vision
//! support (LM Studio, llama.cpp server, vLLM, ...).
//!
//! Every failure is logged and turned into an empty result; callers never see
//! an error from this module.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::config::LlmConfig;

const IMAGE_PROMPT: &str = "Analyze this image and provide: \
    1) A detailed description of the item shown \
    2) Suggested category and tags for inventory management \
    3) Notable features or condition";

/// Reported for any non-empty answer; the backend gives no score of its own.
const ANSWER_CONFIDENCE: f32 = 0.8;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned error: {status} - {body}")]
    Api { status: u16, body: String },

    #[error("response carried no message content")]
    EmptyResponse,
}

/// Outcome of analysing one image.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageAnalysis {
    pub description: String,
    pub tags: Vec<String>,
    pub confidence: f32,
}

impl ImageAnalysis {
    /// Result used whenever the backend is disabled or failed.
    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.description.trim().is_empty()
    }
}

#[async_trait]
pub trait VisionClient: Send + Sync {
    /// Describe an image. `format` is the image subtype, e.g. "jpeg".
    async fn analyze_image(&self, bytes: &[u8], format: &str) -> ImageAnalysis;

    /// Write a short description for an item, falling back to
    /// `existing`, then `name`.
    async fn describe_item(&self, name: &str, existing: Option<&str>) -> String;
}

// Wire types.

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: MessageContent,
}

#[derive(Serialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<serde_json::Value>>,
}

impl ChatResponse {
    fn into_content(self) -> Result<String, LlmError> {
        let message = self
            .choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .ok_or(LlmError::EmptyResponse)?;

        if let Some(calls) = message.tool_calls.as_ref().filter(|c| !c.is_empty()) {
            debug!(count = calls.len(), "Ignoring tool calls in chat response");
        }

        message
            .content
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or(LlmError::EmptyResponse)
    }
}

/// `data:` URL for an inline image.
fn data_url(bytes: &[u8], format: &str) -> String {
    let subtype = match format.to_ascii_lowercase().as_str() {
        "jpg" => "jpeg".to_string(),
        other => other.to_string(),
    };
    format!("data:image/{subtype};base64,{}", STANDARD.encode(bytes))
}

fn describe_prompt(name: &str, existing: Option<&str>) -> String {
    let mut prompt =
        format!("Provide a brief, informative description for an inventory item named '{name}'");
    if let Some(desc) = existing.filter(|d| !d.trim().is_empty()) {
        prompt.push_str(&format!(" with this user description: {desc}"));
    }
    prompt
}

pub struct OpenAiVisionClient {
    client: reqwest::Client,
    config: LlmConfig,
}

impl OpenAiVisionClient {
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(4)
            .build()?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.api_url.trim_end_matches('/'))
    }

    async fn complete(
        &self,
        content: MessageContent,
        timeout: Duration,
    ) -> Result<String, LlmError> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content,
            }],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            stream: false,
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .timeout(timeout)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        response.json::<ChatResponse>().await?.into_content()
    }
}

#[async_trait]
impl VisionClient for OpenAiVisionClient {
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn analyze_image(&self, bytes: &[u8], format: &str) -> ImageAnalysis {
        if !self.config.enabled {
            return ImageAnalysis::unavailable();
        }

        let content = MessageContent::Parts(vec![
            ContentPart::Text {
                text: IMAGE_PROMPT.to_string(),
            },
            ContentPart::ImageUrl {
                image_url: ImageUrl {
                    url: data_url(bytes, format),
                },
            },
        ]);
        let timeout = Duration::from_secs(self.config.image_timeout_secs);

        match self.complete(content, timeout).await {
            Ok(description) => ImageAnalysis {
                tags: common::tags::extract_tags(&description),
                description,
                confidence: ANSWER_CONFIDENCE,
            },
            Err(e) => {
                warn!(error = %e, "Image analysis unavailable");
                ImageAnalysis::unavailable()
            }
        }
    }

    #[instrument(skip(self, existing))]
    async fn describe_item(&self, name: &str, existing: Option<&str>) -> String {
        let fallback = || {
            existing
                .filter(|d| !d.trim().is_empty())
                .unwrap_or(name)
                .to_string()
        };
        if !self.config.enabled {
            return fallback();
        }

        let content = MessageContent::Text(describe_prompt(name, existing));
        let timeout = Duration::from_secs(self.config.text_timeout_secs);

        match self.complete(content, timeout).await {
            Ok(description) => description,
            Err(e) => {
                warn!(error = %e, "Description generation unavailable");
                fallback()
            }
        }
    }
}
