//! OpenAI API integration.
//!
//! Implements the Crew trait for OpenAI chat models.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{strip_code_fence, Crew, CrewError, CrewPrompts, Post, WriteRequest};
use crate::roadmap::PostOutline;

/// OpenAI crew provider.
pub struct OpenAiCrew {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    prompts: CrewPrompts,
}

impl OpenAiCrew {
    /// Create a new OpenAI crew.
    ///
    /// Reads the API key from the OPENAI_API_KEY environment variable.
    pub fn new(prompts: CrewPrompts) -> Result<Self, CrewError> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| CrewError::ProviderNotAvailable("OPENAI_API_KEY not set".to_string()))?;

        Ok(Self {
            client: Client::new(),
            api_key,
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            prompts,
        })
    }

    /// Create with a specific model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Create with a custom base URL (for Azure OpenAI or compatible APIs).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Make a request to the OpenAI API.
    async fn request(&self, system: &str, user_message: &str) -> Result<String, CrewError> {
        let request = OpenAiRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage { role: "system".to_string(), content: system.to_string() },
                ChatMessage { role: "user".to_string(), content: user_message.to_string() },
            ],
            max_tokens: Some(4096),
            temperature: Some(0.7),
            response_format: Some(ResponseFormat { kind: "json_object".to_string() }),
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(30);
                return Err(CrewError::RateLimited(retry_after));
            }
            let body = response.text().await.unwrap_or_default();
            return Err(CrewError::Api(format!("OpenAI API error ({}): {}", status, body)));
        }

        let response: OpenAiResponse = response.json().await?;

        response
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .ok_or_else(|| CrewError::Api("No response from OpenAI".to_string()))
    }
}

#[async_trait]
impl Crew for OpenAiCrew {
    async fn plan(&self, topic: &str, goal: &str) -> Result<Vec<PostOutline>, CrewError> {
        let (system, user) = self.prompts.render_planning(topic, goal);
        let output = self.request(&system, &user).await?;

        let payload: RoadmapPayload = serde_json::from_str(strip_code_fence(&output))
            .map_err(|e| CrewError::MalformedOutput(format!("planning response: {e}")))?;

        if payload.posts.is_empty() {
            return Err(CrewError::EmptyRoadmap);
        }
        Ok(payload.posts)
    }

    async fn write(&self, request: &WriteRequest) -> Result<Post, CrewError> {
        let (system, user) = self.prompts.render_writing(request);
        let output = self.request(&system, &user).await?;

        serde_json::from_str(strip_code_fence(&output))
            .map_err(|e| CrewError::MalformedOutput(format!("writing response: {e}")))
    }

    fn name(&self) -> &str {
        "openai"
    }

    async fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }
}

/// Structured planning output.
#[derive(Debug, Deserialize)]
struct RoadmapPayload {
    posts: Vec<PostOutline>,
}

// Request/Response types

#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}
