//! Declarative crew prompt configuration.
//!
//! Each capability is a role (system prompt) plus a task template with
//! `{placeholder}` bindings, defined in YAML. A default configuration ships
//! embedded in the binary; an on-disk file can override it.

use std::collections::HashMap;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::WriteRequest;

/// Embedded default prompt configuration.
const DEFAULT_PROMPTS: &str = r#"planning:
  role: |
    You are the planning crew for a technical blog series. Your strategist,
    planner, and reviewer work together to turn a topic and a goal into a
    publication roadmap of standalone but connected posts.
  task: |
    Topic: {topic}

    Goal:
    {goal}

    Plan a series of technical blog posts that achieves this goal. Each post
    needs a title and a description of what it should cover. Order the posts
    so the series builds from fundamentals to advanced material.

    Respond with a JSON object of this exact shape and nothing else:
    {"posts": [{"title": "...", "description": "..."}]}

writing:
  role: |
    You are the writing crew for a technical blog series. Your researcher,
    content writer, code writer, and reviewer produce one complete, polished
    post per assignment, written in Markdown with working code examples.
  task: |
    Series topic: {topic}

    Series goal:
    {goal}

    You are writing post {post_index_plus_one} of {total_posts}.

    Post title: {post_title}

    Post description:
    {post_description}

    The full series roadmap, so you can reference sibling posts without
    repeating them:
    {roadmap}

    Write the complete post in Markdown. Stay consistent with the framing of
    earlier posts and leave room for the later ones.

    Respond with a JSON object of this exact shape and nothing else:
    {"title": "...", "content": "..."}
"#;

/// Role and task template for one crew capability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptPair {
    /// System prompt describing the crew
    pub role: String,

    /// Task template with `{placeholder}` bindings
    pub task: String,
}

/// Prompt configuration for both crew capabilities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrewPrompts {
    /// Planning capability prompts
    pub planning: PromptPair,

    /// Writing capability prompts
    pub writing: PromptPair,
}

impl CrewPrompts {
    /// The embedded default configuration.
    pub fn defaults() -> Self {
        Self::parse_str(DEFAULT_PROMPTS).expect("embedded prompt configuration is valid")
    }

    /// Load prompt configuration from a YAML file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_str(&content)
    }

    /// Parse prompt configuration from a YAML string.
    pub fn parse_str(content: &str) -> anyhow::Result<Self> {
        let prompts: Self = serde_yaml::from_str(content)?;
        prompts.validate()?;
        Ok(prompts)
    }

    /// Validate the configuration for common errors.
    fn validate(&self) -> anyhow::Result<()> {
        for (name, pair) in [("planning", &self.planning), ("writing", &self.writing)] {
            if pair.role.trim().is_empty() {
                anyhow::bail!("Capability '{}' has an empty role", name);
            }
            if pair.task.trim().is_empty() {
                anyhow::bail!("Capability '{}' has an empty task template", name);
            }
        }
        Ok(())
    }

    /// Render the planning capability into (system, user) messages.
    pub fn render_planning(&self, topic: &str, goal: &str) -> (String, String) {
        let mut bindings = HashMap::new();
        bindings.insert("topic".to_string(), topic.to_string());
        bindings.insert("goal".to_string(), goal.to_string());

        (self.planning.role.trim().to_string(), interpolate(&self.planning.task, &bindings))
    }

    /// Render the writing capability into (system, user) messages.
    pub fn render_writing(&self, request: &WriteRequest) -> (String, String) {
        (self.writing.role.trim().to_string(), interpolate(&self.writing.task, &request.bindings()))
    }
}

impl Default for CrewPrompts {
    fn default() -> Self {
        Self::defaults()
    }
}

/// `{placeholder}` pattern. Quoted JSON keys in template examples do not
/// match because the pattern requires a bare identifier between the braces.
static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([a-z_]+)\}").expect("placeholder pattern compiles"));

/// Substitute `{placeholder}` bindings in a template.
///
/// Unknown placeholders are left as-is so a typo surfaces in the rendered
/// prompt instead of vanishing.
pub fn interpolate(template: &str, bindings: &HashMap<String, String>) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &regex::Captures<'_>| {
            bindings.get(&caps[1]).cloned().unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}
