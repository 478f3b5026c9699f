//! Configuration management for Blogflow.
//!
//! Handles defaults, an optional TOML config file, and environment overrides.
//! All configuration is resolved up front and passed into the flow at
//! construction; nothing reads process-wide mutable state mid-run.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Series metadata the tool ships with when nothing else is configured.
pub const DEFAULT_TITLE: &str = "Python Design Patterns for Machine Learning";

/// Default series topic.
pub const DEFAULT_TOPIC: &str = "Python Design Patterns for Machine Learning";

/// Default series goal brief.
pub const DEFAULT_GOAL: &str = "Create a comprehensive series of technical blog posts covering \
the most common design patterns used in machine learning. Each post should explain a specific \
pattern with real-world examples, code snippets, and diagrams. The content should be suitable \
for intermediate Python ML engineers looking to improve their skills.";

/// Filename of the persisted roadmap document, inside the output directory.
pub const ROADMAP_FILENAME: &str = "Blog_Series_Roadmap.md";

/// Filename of the run log, inside the output directory.
pub const LOG_FILENAME: &str = "blog_generation.log";

/// Run configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    /// Directory artifacts are written to
    pub output_dir: PathBuf,

    /// Series working title
    pub title: String,

    /// Series topic
    pub topic: String,

    /// Free-text brief describing the series
    pub goal: String,

    /// Model identifier passed to the crew provider
    pub model: String,

    /// Optional prompt configuration override file (YAML)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompts_file: Option<PathBuf>,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            title: DEFAULT_TITLE.to_string(),
            topic: DEFAULT_TOPIC.to_string(),
            goal: DEFAULT_GOAL.to_string(),
            model: "gpt-4o-mini".to_string(),
            prompts_file: None,
        }
    }
}

impl FlowConfig {
    /// Load configuration from the default locations.
    ///
    /// Checks `blogflow.toml` in the working directory, then
    /// `<config-dir>/blogflow/config.toml`. Missing files fall back to
    /// defaults; a file that exists but does not parse is an error.
    pub fn load() -> anyhow::Result<Self> {
        let mut config = None;

        let local = PathBuf::from("blogflow.toml");
        if local.exists() {
            config = Some(Self::load_from(&local)?);
        } else if let Some(user) = Self::user_config_path() {
            if user.exists() {
                config = Some(Self::load_from(&user)?);
            }
        }

        let mut config = config.unwrap_or_default();
        config.apply_env();
        Ok(config)
    }

    /// Load configuration from a specific TOML file.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Per-user config file location.
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("blogflow").join("config.toml"))
    }

    /// Apply environment variable overrides.
    pub fn apply_env(&mut self) {
        if let Ok(dir) = std::env::var("BLOGFLOW_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(dir);
        }
        if let Ok(model) = std::env::var("BLOGFLOW_MODEL") {
            self.model = model;
        }
    }

    /// Path of the persisted roadmap document.
    pub fn roadmap_path(&self) -> PathBuf {
        self.output_dir.join(ROADMAP_FILENAME)
    }

    /// Path of the run log file.
    pub fn log_path(&self) -> PathBuf {
        self.output_dir.join(LOG_FILENAME)
    }
}
