//! Roadmap document structures.
//!
//! The roadmap is the bridge between the planning and writing phases: phase 1
//! writes it, phase 2 consumes it, and a human may edit it in between. The
//! persisted format is plain Markdown, and serializing a roadmap then parsing
//! it back reproduces the same topic, goal, and outlines.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// A single planned post: title plus a free-text description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostOutline {
    /// Post title
    pub title: String,

    /// What the post should cover
    pub description: String,
}

impl PostOutline {
    /// Create a new outline.
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self { title: title.into(), description: description.into() }
    }
}

/// Ordered plan for a blog series.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roadmap {
    /// Series topic
    pub topic: String,

    /// Free-text brief describing what the series should achieve
    pub goal: String,

    /// Planned posts, in publication order
    pub outlines: Vec<PostOutline>,
}

impl Roadmap {
    /// Create a roadmap with no outlines yet.
    pub fn new(topic: impl Into<String>, goal: impl Into<String>) -> Self {
        Self { topic: topic.into(), goal: goal.into(), outlines: Vec::new() }
    }

    /// Load from a roadmap Markdown file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::parse(&content))
    }

    /// Save to a roadmap Markdown file.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        std::fs::write(path, self.to_markdown())?;
        Ok(())
    }

    /// Parse from Markdown content.
    ///
    /// Lenient by contract: a missing marker yields an empty topic/goal or an
    /// empty outline list, never an error. Callers that need a usable plan
    /// must check [`Roadmap::is_empty`] before starting a run.
    pub fn parse(content: &str) -> Self {
        let mut doc = Self::default();

        let mut section = Section::Preamble;
        let mut goal_lines: Vec<&str> = Vec::new();
        let mut current: Option<(String, Vec<&str>)> = None;

        for line in content.lines() {
            let trimmed = line.trim();

            // Topic marker (## Topic: <text>)
            if let Some(rest) = trimmed.strip_prefix("## Topic:") {
                doc.topic = rest.trim().to_string();
                section = Section::Preamble;
                continue;
            }

            if trimmed == "## Goal" {
                section = Section::Goal;
                continue;
            }

            if trimmed == "## Planned Posts" {
                section = Section::Posts;
                continue;
            }

            // Any other section marker ends the goal block
            if trimmed.starts_with("## ") {
                section = Section::Preamble;
                continue;
            }

            // Numbered outline header (### N. Title)
            if section == Section::Posts {
                if let Some(title) = parse_outline_header(trimmed) {
                    if let Some((t, lines)) = current.take() {
                        doc.outlines.push(PostOutline::new(t, join_block(&lines)));
                    }
                    current = Some((title, Vec::new()));
                    continue;
                }
            }

            match section {
                Section::Goal => goal_lines.push(trimmed),
                Section::Posts => {
                    if let Some((_, ref mut lines)) = current {
                        lines.push(trimmed);
                    }
                }
                Section::Preamble => {}
            }
        }

        if let Some((t, lines)) = current {
            doc.outlines.push(PostOutline::new(t, join_block(&lines)));
        }

        doc.goal = join_block(&goal_lines);
        doc
    }

    /// Convert to the persisted Markdown format.
    pub fn to_markdown(&self) -> String {
        let mut md = String::from("# Blog Series Roadmap\n\n");
        md.push_str(&format!("## Topic: {}\n\n", self.topic));
        md.push_str(&format!("## Goal\n{}\n\n", self.goal));
        md.push_str("## Planned Posts\n\n");

        for (i, outline) in self.outlines.iter().enumerate() {
            md.push_str(&format!("### {}. {}\n\n", i + 1, outline.title));
            md.push_str(&format!("{}\n\n", outline.description));
        }

        md
    }

    /// Generate a starter document for hand authoring.
    pub fn template(topic: &str) -> String {
        format!(
            r"# Blog Series Roadmap

## Topic: {topic}

## Goal
Describe what the series should achieve and who it is for.

## Planned Posts

### 1. First Post Title

What the first post should cover.

### 2. Second Post Title

What the second post should cover.
"
        )
    }

    /// Whether the roadmap has no usable outlines.
    pub fn is_empty(&self) -> bool {
        self.outlines.is_empty()
    }

    /// Number of planned posts.
    pub fn total_posts(&self) -> usize {
        self.outlines.len()
    }
}

/// Parser position within the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Preamble,
    Goal,
    Posts,
}

/// Parse a `### N. Title` header, returning the title.
fn parse_outline_header(line: &str) -> Option<String> {
    let rest = line.strip_prefix("### ")?;
    let (num, title) = rest.split_once(". ")?;
    if num.is_empty() || !num.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(title.trim().to_string())
}

/// Join accumulated lines back into a trimmed text block.
fn join_block(lines: &[&str]) -> String {
    lines.join("\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Roadmap {
        Roadmap {
            topic: "Caching Strategies".to_string(),
            goal: "Explain 3 caching patterns".to_string(),
            outlines: vec![
                PostOutline::new("LRU Cache", "Eviction by recency."),
                PostOutline::new("Write-Through Cache", "Writes hit the store synchronously."),
            ],
        }
    }

    #[test]
    fn test_to_markdown_format() {
        let md = sample().to_markdown();
        assert!(md.starts_with("# Blog Series Roadmap\n\n"));
        assert!(md.contains("## Topic: Caching Strategies\n"));
        assert!(md.contains("## Goal\nExplain 3 caching patterns\n"));
        assert!(md.contains("## Planned Posts\n"));
        assert!(md.contains("### 1. LRU Cache\n"));
        assert!(md.contains("### 2. Write-Through Cache\n"));
    }

    #[test]
    fn test_round_trip() {
        let roadmap = sample();
        let parsed = Roadmap::parse(&roadmap.to_markdown());
        assert_eq!(parsed, roadmap);
    }

    #[test]
    fn test_round_trip_multiline_fields() {
        let roadmap = Roadmap {
            topic: "Rust Async".to_string(),
            goal: "First line.\nSecond line about executors.".to_string(),
            outlines: vec![PostOutline::new(
                "Futures",
                "Poll-based model.\nState machines under the hood.",
            )],
        };
        let parsed = Roadmap::parse(&roadmap.to_markdown());
        assert_eq!(parsed, roadmap);
    }

    #[test]
    fn test_parse_missing_goal_section() {
        let content = "# Blog Series Roadmap\n\n## Topic: Something\n\n## Planned Posts\n\n### 1. A Post\n\nBody text.\n";
        let doc = Roadmap::parse(content);
        assert_eq!(doc.topic, "Something");
        assert_eq!(doc.goal, "");
        assert_eq!(doc.outlines.len(), 1);
        assert_eq!(doc.outlines[0].title, "A Post");
        assert_eq!(doc.outlines[0].description, "Body text.");
    }

    #[test]
    fn test_parse_missing_topic() {
        let content = "## Goal\nJust a goal.\n\n## Planned Posts\n\n### 1. Only Post\n\nText.\n";
        let doc = Roadmap::parse(content);
        assert_eq!(doc.topic, "");
        assert_eq!(doc.goal, "Just a goal.");
        assert_eq!(doc.outlines.len(), 1);
    }

    #[test]
    fn test_parse_empty_document() {
        let doc = Roadmap::parse("");
        assert!(doc.is_empty());
        assert_eq!(doc.topic, "");
        assert_eq!(doc.goal, "");
    }

    #[test]
    fn test_parse_numbering_is_strict() {
        // A header without the "N. " pattern is body text, not an outline
        let content = "## Planned Posts\n\n### First Post\n\nText.\n";
        let doc = Roadmap::parse(content);
        assert!(doc.is_empty());
    }

    #[test]
    fn test_parse_is_whitespace_tolerant() {
        let content =
            "  ## Topic:   Spaced Out  \n\n## Goal\n   padded goal   \n\n## Planned Posts\n\n### 1.  Padded Title \n\n  padded body  \n";
        let doc = Roadmap::parse(content);
        assert_eq!(doc.topic, "Spaced Out");
        assert_eq!(doc.goal, "padded goal");
        assert_eq!(doc.outlines[0].title, "Padded Title");
        assert_eq!(doc.outlines[0].description, "padded body");
    }

    #[test]
    fn test_template_parses() {
        let doc = Roadmap::parse(&Roadmap::template("My Topic"));
        assert_eq!(doc.topic, "My Topic");
        assert_eq!(doc.outlines.len(), 2);
        assert!(!doc.goal.is_empty());
    }

    #[test]
    fn test_goal_ends_at_next_section() {
        let content = "## Goal\ngoal text\n\n## Notes\nnot part of the goal\n\n## Planned Posts\n\n### 1. P\n\nd\n";
        let doc = Roadmap::parse(content);
        assert_eq!(doc.goal, "goal text");
    }
}
