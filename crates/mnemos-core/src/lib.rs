//! Mnemos Core Library
//!
//! This crate provides the knowledge-graph core for Mnemos, including:
//! - Graph model (knowledge items, nodes, typed relationships)
//! - Similarity engine (text and node similarity scoring)
//! - Graph builder (query-driven construction with explicit and implicit
//!   relationship discovery)
//! - Graph merger (multi-strategy, conflict-aware merging with metadata
//!   reconciliation and cross-graph relationship discovery)
//! - In-memory collaborator implementations for tests and embedding callers
//!
//! The entire external surface is two calls:
//! [`domain::graph::GraphBuilder::build_graph`] and
//! [`domain::graph::GraphMerger::merge_graphs`]. Both return freshly
//! allocated graphs and never mutate their inputs.

pub mod domain;
pub mod error;
pub mod infrastructure;

pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::domain::graph::{
        GraphBuildOptions, GraphBuilder, GraphMerger, Knowledge, KnowledgeGraph, KnowledgeQuery,
        KnowledgeStore, KnowledgeType, MergeOptions, MergeOutcome, MergeStrategy, ProjectContext,
    };
    pub use crate::error::{Error, Result};
}
