//! Per-run flow state.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::crew::Post;
use crate::roadmap::PostOutline;

/// Progress of a run through the two-phase pipeline.
///
/// `Planned` is reachable either through `Planning` or directly when a
/// persisted roadmap is loaded instead of generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowStage {
    Init,
    Planning,
    Planned,
    /// Writing the post at this zero-based roadmap index.
    Writing(usize),
    Done,
    /// Failed during planning (`None`) or while writing the given index.
    Failed(Option<usize>),
}

/// State for one blog generation run.
///
/// Created once per run, mutated only by the flow controller, and discarded
/// at process exit; the Markdown artifacts on disk are the only durable
/// output. While posts are being written, `posts.len()` never exceeds
/// `roadmap.len()`, and `posts[i]` corresponds to `roadmap[i]`.
#[derive(Debug, Clone)]
pub struct FlowState {
    /// Unique run identifier
    pub id: Uuid,

    /// Series working title
    pub title: String,

    /// Series topic
    pub topic: String,

    /// Free-text brief describing the series
    pub goal: String,

    /// Ordered plan for the series
    pub roadmap: Vec<PostOutline>,

    /// Finished posts, in roadmap order
    pub posts: Vec<Post>,

    /// Current pipeline stage
    pub stage: FlowStage,

    /// When the run started
    pub created_at: DateTime<Utc>,
}

impl FlowState {
    /// Create fresh state for a run.
    pub fn new(
        title: impl Into<String>,
        topic: impl Into<String>,
        goal: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            topic: topic.into(),
            goal: goal.into(),
            roadmap: Vec::new(),
            posts: Vec::new(),
            stage: FlowStage::Init,
            created_at: Utc::now(),
        }
    }

    /// Get progress as (written, planned).
    pub fn progress(&self) -> (usize, usize) {
        (self.posts.len(), self.roadmap.len())
    }

    /// Check if every planned post has been written.
    pub fn is_complete(&self) -> bool {
        !self.roadmap.is_empty() && self.posts.len() == self.roadmap.len()
    }
}
