//! Claude API integration.
//!
//! Implements the Crew trait for Claude.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{strip_code_fence, Crew, CrewError, CrewPrompts, Post, WriteRequest};
use crate::roadmap::PostOutline;

/// Claude crew provider.
pub struct ClaudeCrew {
    client: Client,
    api_key: String,
    model: String,
    prompts: CrewPrompts,
}

impl ClaudeCrew {
    /// Create a new Claude crew.
    ///
    /// Reads the API key from the ANTHROPIC_API_KEY environment variable.
    pub fn new(prompts: CrewPrompts) -> Result<Self, CrewError> {
        let api_key = std::env::var("ANTHROPIC_API_KEY").map_err(|_| {
            CrewError::ProviderNotAvailable("ANTHROPIC_API_KEY not set".to_string())
        })?;

        Ok(Self {
            client: Client::new(),
            api_key,
            model: "claude-sonnet-4-20250514".to_string(),
            prompts,
        })
    }

    /// Create with a specific model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Make a request to the Claude API.
    async fn request(&self, system: &str, user_message: &str) -> Result<String, CrewError> {
        let request = ClaudeRequest {
            model: self.model.clone(),
            max_tokens: 4096,
            system: system.to_string(),
            messages: vec![Message { role: "user".to_string(), content: user_message.to_string() }],
        };

        let response = self
            .client
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
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
            return Err(CrewError::Api(format!("Claude API error ({}): {}", status, body)));
        }

        let response: ClaudeResponse = response.json().await?;

        response
            .content
            .first()
            .map(|c| c.text.clone())
            .ok_or_else(|| CrewError::Api("No response from Claude".to_string()))
    }
}

#[async_trait]
impl Crew for ClaudeCrew {
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
        "claude"
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

/// Claude API request structure.
#[derive(Debug, Serialize)]
struct ClaudeRequest {
    model: String,
    max_tokens: u32,
    system: String,
    messages: Vec<Message>,
}

/// Message in a Claude request.
#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

/// Claude API response structure.
#[derive(Debug, Deserialize)]
struct ClaudeResponse {
    content: Vec<ContentBlock>,
}

/// Content block in a Claude response.
#[derive(Debug, Deserialize)]
struct ContentBlock {
    text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial(anthropic_env)]
    fn test_claude_crew_requires_api_key() {
        let original = std::env::var("ANTHROPIC_API_KEY").ok();
        std::env::remove_var("ANTHROPIC_API_KEY");

        let result = ClaudeCrew::new(CrewPrompts::defaults());

        if let Some(val) = original {
            std::env::set_var("ANTHROPIC_API_KEY", val);
        }

        assert!(result.is_err());
    }

    #[test]
    #[serial(anthropic_env)]
    fn test_claude_crew_with_model() {
        let original = std::env::var("ANTHROPIC_API_KEY").ok();
        std::env::set_var("ANTHROPIC_API_KEY", "test-key");

        let crew = ClaudeCrew::new(CrewPrompts::defaults()).unwrap().with_model("claude-opus-4");
        assert_eq!(crew.model, "claude-opus-4");

        match original {
            Some(val) => std::env::set_var("ANTHROPIC_API_KEY", val),
            None => std::env::remove_var("ANTHROPIC_API_KEY"),
        }
    }
}
