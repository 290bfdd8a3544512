//! Knowledge graph domain module
//!
//! This module implements the knowledge-graph core for cross-project
//! knowledge transfer:
//!
//! - **Graph model**: knowledge items wrapped in nodes, typed weighted
//!   relationships, and immutable graph snapshots
//! - **Similarity scoring**: pure text and node similarity functions
//! - **Graph construction**: one store query in, one graph out, with
//!   declared and inferred relationships
//! - **Graph merging**: five strategies with metadata reconciliation,
//!   conflict accounting, and cross-graph relationship discovery
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Build Pipeline                           │
//! │  KnowledgeQuery → KnowledgeStore → Nodes → Edges → Graph        │
//! └─────────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Merge Pipeline                           │
//! │  (Graph, Graph) → Strategy → Reconciliation → Discovery         │
//! │                 → (Graph, MergeStats, notes)                    │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mnemos_core::prelude::*;
//!
//! // Build a graph from everything two projects know.
//! let builder = GraphBuilder::new(store);
//! let query = KnowledgeQuery::new().with_projects(["checkout", "billing"]);
//! let graph = builder.build_graph(&query, &GraphBuildOptions::new("payments")).await?;
//!
//! // Merge it with another team's graph, discovering cross-project links.
//! let options = MergeOptions::new(MergeStrategy::Union).with_cross_graph_discovery(0.7);
//! let outcome = GraphMerger::new().merge_graphs(&graph, &other, &options)?;
//! println!("{} conflicts: {}", outcome.stats.conflicts, outcome.stats.conflict_resolution);
//! ```

mod builder;
mod graph;
mod item;
mod merger;
mod metadata;
mod node;
mod relationship;
mod similarity;
mod store;

pub use builder::{GraphBuildOptions, GraphBuilder};
pub use graph::{GraphMetadata, GraphStats, KnowledgeGraph};
pub use item::{Knowledge, KnowledgeType};
pub use merger::{
    CustomMergeFn, GraphMerger, MergeOptions, MergeOutcome, MergeStats, MergeStrategy,
};
pub use metadata::{MetaBag, MetaValue, merge_bags};
pub use node::{GraphNode, importance_score};
pub use relationship::{
    GraphRelationship, RelationshipDirection, RelationshipMetadata, RelationshipType,
};
pub use similarity::SimilarityEngine;
pub use store::{KnowledgeQuery, KnowledgeStore, ProjectContext, ProjectProfile};
