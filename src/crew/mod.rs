//! Crew integration module.
//!
//! A crew is an LLM-backed group of agents behind a single call boundary:
//! `plan` turns a topic and goal into a roadmap, `write` turns one outline
//! into a finished post. Internal delegation, tool use, and retries are the
//! provider's concern; this layer only sees structured results.

mod claude;
mod openai;
mod prompts;

pub use claude::ClaudeCrew;
pub use openai::OpenAiCrew;
pub use prompts::{CrewPrompts, PromptPair};

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::roadmap::PostOutline;

/// A finished blog post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Post title
    pub title: String,

    /// Markdown body
    pub content: String,
}

impl Post {
    /// Create a new post.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self { title: title.into(), content: content.into() }
    }
}

/// Input binding for a single `write` call.
///
/// Carries the entire roadmap so each post's generation can stay consistent
/// with its siblings without the crew retaining cross-call memory.
#[derive(Debug, Clone, Serialize)]
pub struct WriteRequest {
    /// Overall series topic
    pub topic: String,

    /// Overall series goal
    pub goal: String,

    /// Title of the post to write
    pub post_title: String,

    /// Description of the post to write
    pub post_description: String,

    /// The full roadmap, for cross-post context
    pub roadmap: Vec<PostOutline>,

    /// Zero-based position of this post in the roadmap
    pub post_index: usize,

    /// One-based position, for human-facing prompt text
    pub post_index_plus_one: usize,

    /// Total number of planned posts
    pub total_posts: usize,
}

impl WriteRequest {
    /// Flatten into prompt template bindings.
    ///
    /// The roadmap is serialized as plain JSON data, matching the other
    /// bindings' string form.
    pub fn bindings(&self) -> HashMap<String, String> {
        let roadmap = serde_json::to_string_pretty(&self.roadmap).unwrap_or_default();

        let mut bindings = HashMap::new();
        bindings.insert("topic".to_string(), self.topic.clone());
        bindings.insert("goal".to_string(), self.goal.clone());
        bindings.insert("post_title".to_string(), self.post_title.clone());
        bindings.insert("post_description".to_string(), self.post_description.clone());
        bindings.insert("roadmap".to_string(), roadmap);
        bindings.insert("post_index".to_string(), self.post_index.to_string());
        bindings.insert("post_index_plus_one".to_string(), self.post_index_plus_one.to_string());
        bindings.insert("total_posts".to_string(), self.total_posts.to_string());
        bindings
    }
}

/// Crew error types.
#[derive(Debug, thiserror::Error)]
pub enum CrewError {
    #[error("Provider not available: {0}")]
    ProviderNotAvailable(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Rate limited, retry after {0}s")]
    RateLimited(u64),

    #[error("Malformed crew output: {0}")]
    MalformedOutput(String),

    #[error("Planning crew returned an empty roadmap")]
    EmptyRoadmap,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Trait for crew providers.
#[async_trait]
pub trait Crew: Send + Sync {
    /// Plan a blog series: produce an ordered list of post outlines.
    async fn plan(&self, topic: &str, goal: &str) -> Result<Vec<PostOutline>, CrewError>;

    /// Write a single post from its outline and the surrounding context.
    async fn write(&self, request: &WriteRequest) -> Result<Post, CrewError>;

    /// Get the provider name.
    fn name(&self) -> &str;

    /// Check if the provider is available.
    async fn is_available(&self) -> bool;
}

/// Crew provider manager with fallback support.
///
/// Tries providers in order: OpenAI (if API key available) -> Claude (if API
/// key available). Per-call failures fall through to the next provider.
pub struct CrewManager {
    providers: Vec<Box<dyn Crew>>,
}

impl CrewManager {
    /// Create a new crew manager with the default provider chain.
    pub async fn new(model: &str, prompts: CrewPrompts) -> Self {
        let mut providers: Vec<Box<dyn Crew>> = Vec::new();

        if let Ok(openai) = OpenAiCrew::new(prompts.clone()) {
            let openai = openai.with_model(model);
            if openai.is_available().await {
                providers.push(Box::new(openai));
            }
        }

        if let Ok(claude) = ClaudeCrew::new(prompts) {
            if claude.is_available().await {
                providers.push(Box::new(claude));
            }
        }

        Self { providers }
    }

    /// Create with an explicit provider chain.
    pub fn with_providers(providers: Vec<Box<dyn Crew>>) -> Self {
        Self { providers }
    }

    /// Check if any crew provider is available.
    pub fn has_providers(&self) -> bool {
        !self.providers.is_empty()
    }

    /// Get the active provider name.
    pub fn active_provider(&self) -> Option<&str> {
        self.providers.first().map(|p| p.name())
    }
}

#[async_trait]
impl Crew for CrewManager {
    async fn plan(&self, topic: &str, goal: &str) -> Result<Vec<PostOutline>, CrewError> {
        for provider in &self.providers {
            match provider.plan(topic, goal).await {
                Ok(outlines) => return Ok(outlines),
                Err(e) => {
                    tracing::warn!(provider = provider.name(), error = %e, "Provider failed, trying next");
                }
            }
        }

        Err(CrewError::ProviderNotAvailable("No crew provider available".to_string()))
    }

    async fn write(&self, request: &WriteRequest) -> Result<Post, CrewError> {
        for provider in &self.providers {
            match provider.write(request).await {
                Ok(post) => return Ok(post),
                Err(e) => {
                    tracing::warn!(provider = provider.name(), error = %e, "Provider failed, trying next");
                }
            }
        }

        Err(CrewError::ProviderNotAvailable("No crew provider available".to_string()))
    }

    fn name(&self) -> &str {
        "manager"
    }

    async fn is_available(&self) -> bool {
        self.has_providers()
    }
}

/// Strip a Markdown code fence from model output, if present.
///
/// Providers are asked for bare JSON, but models sometimes wrap it anyway.
pub(crate) fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_suffix("```").unwrap_or(inner);
    // Drop the language tag on the opening fence line
    match inner.split_once('\n') {
        Some((first, rest)) if !first.contains('{') => rest.trim(),
        _ => inner.trim(),
    }
}
