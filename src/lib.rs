//! # Blogflow
//!
//! Agent-crew blog series generator - plan a roadmap, then write every post.
//!
//! Blogflow drives a two-phase pipeline: a planning crew turns a topic and a
//! goal into a roadmap of post outlines, then a writing crew generates each
//! post in order with the full roadmap as cross-post context. The roadmap and
//! every finished post are persisted as Markdown the moment they exist, so a
//! run can always be resumed from disk.
//!
//! ## Features
//!
//! - **Two-phase flow**: plan first, persist the plan, then write
//! - **Resumable**: `--skip-planning` restarts phase 2 from a (possibly
//!   hand-edited) roadmap document
//! - **Provider fallback**: OpenAI or Claude behind one crew boundary
//! - **Durable partial progress**: a failure at post N leaves posts 1..N
//!   on disk
//!
//! ## Quick Start
//!
//! ```bash
//! # Install
//! cargo install blogflow
//!
//! # Plan and write a series
//! blogflow run --topic "Caching Strategies" --goal "Explain 3 caching patterns"
//!
//! # Edit output/Blog_Series_Roadmap.md, then write from the edited plan
//! blogflow run --skip-planning --roadmap-file output/Blog_Series_Roadmap.md
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
// Allow common patterns that are intentional in this codebase
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::field_reassign_with_default)]

pub mod config;
pub mod crew;
pub mod flow;
pub mod roadmap;

pub use config::FlowConfig;
pub use crew::{
    ClaudeCrew, Crew, CrewError, CrewManager, CrewPrompts, OpenAiCrew, Post, WriteRequest,
};
pub use flow::{BlogFlow, FlowError, FlowResult, FlowStage, FlowState};
pub use roadmap::{PostOutline, Roadmap};
