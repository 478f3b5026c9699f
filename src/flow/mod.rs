//! Blog generation flow.
//!
//! Drives the two-phase pipeline: obtain a roadmap (generate one, or load a
//! previously persisted document), then write every post strictly in roadmap
//! order, persisting each artifact the moment it exists. Partial progress is
//! durable: a failure at post N leaves posts 1..N on disk.

mod error;
mod state;

pub use error::{FlowError, FlowResult};
pub use state::{FlowStage, FlowState};

use std::path::{Path, PathBuf};

use crate::config::FlowConfig;
use crate::crew::{Crew, CrewError, WriteRequest};
use crate::roadmap::Roadmap;

/// Flow controller for one blog series run.
///
/// Owns the run state exclusively; no two runs share state, and crew calls
/// are never in flight concurrently. Each `write` call sees the whole
/// roadmap, so later posts can stay consistent with earlier ones' framing.
pub struct BlogFlow {
    crew: Box<dyn Crew>,
    config: FlowConfig,
    state: FlowState,
}

impl BlogFlow {
    /// Create a flow for one run.
    pub fn new(crew: Box<dyn Crew>, config: FlowConfig) -> Self {
        let state = FlowState::new(&config.title, &config.topic, &config.goal);
        Self { crew, config, state }
    }

    /// Current run state.
    pub fn state(&self) -> &FlowState {
        &self.state
    }

    /// Path of the persisted roadmap document.
    pub fn roadmap_path(&self) -> PathBuf {
        self.config.roadmap_path()
    }

    /// Run both phases and return the final state.
    pub async fn kickoff(
        mut self,
        skip_planning: bool,
        roadmap_source: Option<&Path>,
    ) -> FlowResult<FlowState> {
        self.obtain_roadmap(skip_planning, roadmap_source).await?;
        self.generate_posts().await?;

        self.state.stage = FlowStage::Done;
        tracing::info!(posts = self.state.posts.len(), "Completed writing blog posts");
        Ok(self.state)
    }

    /// Phase 1: populate the state's topic, goal, and roadmap.
    ///
    /// With `skip_planning`, a `roadmap_source` document is required and is
    /// parsed instead of calling the planning crew. Otherwise the crew plans
    /// the series and the roadmap is persisted before this returns, so a
    /// crash later in the run cannot lose the plan.
    pub async fn obtain_roadmap(
        &mut self,
        skip_planning: bool,
        roadmap_source: Option<&Path>,
    ) -> FlowResult<()> {
        if skip_planning {
            let source = roadmap_source.ok_or_else(|| {
                FlowError::Configuration(
                    "a roadmap file is required when skipping the planning phase".to_string(),
                )
            })?;
            return self.load_roadmap(source);
        }

        self.state.stage = FlowStage::Planning;
        tracing::info!(topic = %self.state.topic, "Starting the blog planning crew");

        let outlines = match self.crew.plan(&self.state.topic, &self.state.goal).await {
            Ok(outlines) => outlines,
            Err(source) => {
                self.state.stage = FlowStage::Failed(None);
                return Err(FlowError::Planning(source));
            }
        };
        if outlines.is_empty() {
            self.state.stage = FlowStage::Failed(None);
            return Err(FlowError::Planning(CrewError::EmptyRoadmap));
        }
        self.state.roadmap = outlines;

        // Persist the plan before returning so phase 2 can always be resumed
        // from disk.
        let roadmap = Roadmap {
            topic: self.state.topic.clone(),
            goal: self.state.goal.clone(),
            outlines: self.state.roadmap.clone(),
        };
        std::fs::create_dir_all(&self.config.output_dir)?;
        let path = self.roadmap_path();
        std::fs::write(&path, roadmap.to_markdown())?;
        tracing::info!(path = %path.display(), posts = self.state.roadmap.len(), "Roadmap saved");

        self.state.stage = FlowStage::Planned;
        Ok(())
    }

    /// Load a previously persisted roadmap document instead of planning.
    fn load_roadmap(&mut self, source: &Path) -> FlowResult<()> {
        tracing::info!(path = %source.display(), "Skipping planning phase, using provided roadmap");

        let roadmap = Roadmap::load(source).map_err(|e| {
            FlowError::Configuration(format!("cannot read roadmap {}: {e}", source.display()))
        })?;

        if roadmap.is_empty() {
            return Err(FlowError::MalformedRoadmap(format!(
                "{} contains no planned posts",
                source.display()
            )));
        }
        if roadmap.topic.is_empty() {
            tracing::warn!(path = %source.display(), "Roadmap document has no topic line");
        }

        self.state.topic = roadmap.topic;
        self.state.goal = roadmap.goal;
        self.state.roadmap = roadmap.outlines;
        self.state.stage = FlowStage::Planned;
        tracing::info!(posts = self.state.roadmap.len(), "Loaded roadmap");
        Ok(())
    }

    /// Phase 2: write every planned post, strictly in roadmap order.
    ///
    /// Each finished post is appended to the state and persisted immediately.
    /// The first failure stops the run; posts already on disk stay there and
    /// later indices are never attempted.
    pub async fn generate_posts(&mut self) -> FlowResult<()> {
        let total = self.state.roadmap.len();
        if total == 0 {
            return Err(FlowError::MalformedRoadmap("roadmap has no posts".to_string()));
        }

        std::fs::create_dir_all(&self.config.output_dir)?;

        for index in 0..total {
            self.state.stage = FlowStage::Writing(index);
            let outline = self.state.roadmap[index].clone();
            tracing::info!(post = index + 1, total, title = %outline.title, "Writing blog post");

            let request = WriteRequest {
                topic: self.state.topic.clone(),
                goal: self.state.goal.clone(),
                post_title: outline.title,
                post_description: outline.description,
                roadmap: self.state.roadmap.clone(),
                post_index: index,
                post_index_plus_one: index + 1,
                total_posts: total,
            };

            let post = match self.crew.write(&request).await {
                Ok(post) => post,
                Err(source) => {
                    self.state.stage = FlowStage::Failed(Some(index));
                    return Err(FlowError::Writing { index, total, source });
                }
            };

            let path = self.config.output_dir.join(post_filename(index, &post.title));
            std::fs::write(&path, &post.content)?;
            tracing::info!(path = %path.display(), "Blog post saved");

            self.state.posts.push(post);
        }

        Ok(())
    }
}

/// Artifact filename for the post at a zero-based index.
pub fn post_filename(index: usize, title: &str) -> String {
    format!("Blog_Post_{}_{}.md", index + 1, sanitize_title(title))
}

/// Filesystem-safe transform of a post title.
///
/// Spaces become underscores, and so does anything else outside alphanumerics
/// plus `.`/`_`/`-`, so a generated title cannot escape the output directory
/// or break on any platform.
fn sanitize_title(title: &str) -> String {
    title
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() || matches!(c, '.' | '_' | '-') { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crew::{CrewError, Post};
    use crate::roadmap::PostOutline;

    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    /// Crew stub that records write calls and can fail at a given index.
    struct StubCrew {
        outlines: Vec<PostOutline>,
        fail_at: Option<usize>,
        requests: Arc<Mutex<Vec<WriteRequest>>>,
    }

    impl StubCrew {
        fn new(outlines: Vec<PostOutline>) -> Self {
            Self { outlines, fail_at: None, requests: Arc::new(Mutex::new(Vec::new())) }
        }

        fn failing_at(mut self, index: usize) -> Self {
            self.fail_at = Some(index);
            self
        }

        fn requests_handle(&self) -> Arc<Mutex<Vec<WriteRequest>>> {
            Arc::clone(&self.requests)
        }
    }

    #[async_trait]
    impl Crew for StubCrew {
        async fn plan(&self, _topic: &str, _goal: &str) -> Result<Vec<PostOutline>, CrewError> {
            Ok(self.outlines.clone())
        }

        async fn write(&self, request: &WriteRequest) -> Result<Post, CrewError> {
            self.requests.lock().unwrap().push(request.clone());
            if self.fail_at == Some(request.post_index) {
                return Err(CrewError::Api("stub failure".to_string()));
            }
            Ok(Post::new(request.post_title.clone(), format!("Body of {}", request.post_title)))
        }

        fn name(&self) -> &str {
            "stub"
        }

        async fn is_available(&self) -> bool {
            true
        }
    }

    fn config_in(dir: &Path) -> FlowConfig {
        let mut config = FlowConfig::default();
        config.output_dir = dir.to_path_buf();
        config.topic = "Caching Strategies".to_string();
        config.goal = "Explain 3 caching patterns".to_string();
        config
    }

    fn outlines() -> Vec<PostOutline> {
        vec![
            PostOutline::new("LRU Cache", "Eviction by recency."),
            PostOutline::new("Write-Through Cache", "Writes hit the store synchronously."),
        ]
    }

    #[tokio::test]
    async fn test_kickoff_writes_every_post_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let crew = StubCrew::new(outlines());
        let flow = BlogFlow::new(Box::new(crew), config_in(dir.path()));

        let state = flow.kickoff(false, None).await.unwrap();

        assert_eq!(state.stage, FlowStage::Done);
        assert_eq!(state.posts.len(), 2);
        assert_eq!(state.posts[0].title, "LRU Cache");
        assert_eq!(state.posts[1].title, "Write-Through Cache");
        assert!(dir.path().join("Blog_Post_1_LRU_Cache.md").exists());
        assert!(dir.path().join("Blog_Post_2_Write-Through_Cache.md").exists());
        assert!(dir.path().join("Blog_Series_Roadmap.md").exists());
    }

    #[tokio::test]
    async fn test_write_requests_carry_full_context() {
        let dir = tempfile::tempdir().unwrap();
        let crew = StubCrew::new(outlines());
        let requests = crew.requests_handle();
        let flow = BlogFlow::new(Box::new(crew), config_in(dir.path()));

        flow.kickoff(false, None).await.unwrap();

        let requests = requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        for (i, request) in requests.iter().enumerate() {
            assert_eq!(request.post_index, i);
            assert_eq!(request.post_index_plus_one, i + 1);
            assert_eq!(request.total_posts, 2);
            assert_eq!(request.topic, "Caching Strategies");
            assert_eq!(request.goal, "Explain 3 caching patterns");
            assert_eq!(request.roadmap, outlines());
        }
        assert_eq!(requests[0].post_title, "LRU Cache");
        assert_eq!(requests[1].post_title, "Write-Through Cache");
    }

    #[tokio::test]
    async fn test_fail_stop_keeps_prior_posts() {
        let dir = tempfile::tempdir().unwrap();
        let many: Vec<PostOutline> =
            (1..=5).map(|i| PostOutline::new(format!("Post {i}"), format!("About {i}."))).collect();
        let crew = StubCrew::new(many).failing_at(2);
        let flow = BlogFlow::new(Box::new(crew), config_in(dir.path()));

        let err = flow.kickoff(false, None).await.unwrap_err();

        match err {
            FlowError::Writing { index, total, .. } => {
                assert_eq!(index, 2);
                assert_eq!(total, 5);
            }
            other => panic!("expected Writing error, got {other:?}"),
        }
        assert!(dir.path().join("Blog_Post_1_Post_1.md").exists());
        assert!(dir.path().join("Blog_Post_2_Post_2.md").exists());
        assert!(!dir.path().join("Blog_Post_3_Post_3.md").exists());
        assert!(!dir.path().join("Blog_Post_4_Post_4.md").exists());
    }

    #[tokio::test]
    async fn test_skip_planning_requires_source() {
        let dir = tempfile::tempdir().unwrap();
        let crew = StubCrew::new(outlines());
        let flow = BlogFlow::new(Box::new(crew), config_in(dir.path()));

        let err = flow.kickoff(true, None).await.unwrap_err();

        assert!(matches!(err, FlowError::Configuration(_)));
        // Fail fast means no side effects at all
        assert!(!dir.path().join("Blog_Series_Roadmap.md").exists());
    }

    #[tokio::test]
    async fn test_skip_planning_loads_persisted_roadmap() {
        let dir = tempfile::tempdir().unwrap();
        let roadmap = Roadmap {
            topic: "Loaded Topic".to_string(),
            goal: "Loaded goal".to_string(),
            outlines: outlines(),
        };
        let source = dir.path().join("Blog_Series_Roadmap.md");
        roadmap.save(&source).unwrap();

        let crew = StubCrew::new(Vec::new());
        let mut flow = BlogFlow::new(Box::new(crew), config_in(dir.path()));
        flow.obtain_roadmap(true, Some(&source)).await.unwrap();

        assert_eq!(flow.state().stage, FlowStage::Planned);
        assert_eq!(flow.state().topic, "Loaded Topic");
        assert_eq!(flow.state().goal, "Loaded goal");
        assert_eq!(flow.state().roadmap.len(), 2);
    }

    #[tokio::test]
    async fn test_skip_planning_rejects_empty_document() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("empty.md");
        std::fs::write(&source, "# Blog Series Roadmap\n\n## Topic: X\n").unwrap();

        let crew = StubCrew::new(Vec::new());
        let mut flow = BlogFlow::new(Box::new(crew), config_in(dir.path()));
        let err = flow.obtain_roadmap(true, Some(&source)).await.unwrap_err();

        assert!(matches!(err, FlowError::MalformedRoadmap(_)));
    }

    #[tokio::test]
    async fn test_planning_failure_marks_state() {
        struct FailingPlanner;

        #[async_trait]
        impl Crew for FailingPlanner {
            async fn plan(&self, _: &str, _: &str) -> Result<Vec<PostOutline>, CrewError> {
                Err(CrewError::EmptyRoadmap)
            }
            async fn write(&self, _: &WriteRequest) -> Result<Post, CrewError> {
                unreachable!("planning failed first")
            }
            fn name(&self) -> &str {
                "failing"
            }
            async fn is_available(&self) -> bool {
                true
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let mut flow = BlogFlow::new(Box::new(FailingPlanner), config_in(dir.path()));
        let err = flow.obtain_roadmap(false, None).await.unwrap_err();

        assert!(matches!(err, FlowError::Planning(_)));
        assert_eq!(flow.state().stage, FlowStage::Failed(None));
    }

    #[test]
    fn test_post_filename_numbering_is_one_based() {
        assert_eq!(post_filename(0, "LRU Cache"), "Blog_Post_1_LRU_Cache.md");
        assert_eq!(post_filename(1, "Write-Through Cache"), "Blog_Post_2_Write-Through_Cache.md");
    }

    #[test]
    fn test_sanitize_title_flattens_unsafe_characters() {
        assert_eq!(sanitize_title("a/b: c"), "a_b__c");
        assert_eq!(sanitize_title("  padded  "), "padded");
        assert_eq!(sanitize_title("v1.2-beta_3"), "v1.2-beta_3");
    }
}
