//! Graph nodes wrapping knowledge items
//!
//! A node wraps exactly one [`Knowledge`] item (1:1 by id) plus metadata the
//! graph core derives itself: an importance score, optional centrality and
//! community labels, and an open bag for anything else. Nodes are created by
//! the builder and only ever replaced wholesale or metadata-merged by the
//! merger.

use serde::{Deserialize, Serialize};

use super::item::Knowledge;
use super::metadata::MetaBag;

/// Floor every node starts from before usage signals are added.
const BASE_IMPORTANCE: f32 = 0.5;

/// A graph vertex wrapping one knowledge item plus derived scoring metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphNode {
    /// Node identifier, always equal to the wrapped item's id
    pub id: String,
    /// The wrapped knowledge item (read-only input)
    pub knowledge: Knowledge,
    /// Derived importance score (0.0 to 1.0)
    pub importance: f32,
    /// Optional centrality score from downstream graph analysis
    pub centrality: Option<f32>,
    /// Optional community label from downstream clustering
    pub community: Option<String>,
    /// Open metadata bag for caller data
    pub extra: MetaBag,
}

impl GraphNode {
    /// Create a node from a knowledge item, deriving its importance
    pub fn from_knowledge(knowledge: Knowledge) -> Self {
        let importance = importance_score(&knowledge);

        Self {
            id: knowledge.id.clone(),
            knowledge,
            importance,
            centrality: None,
            community: None,
            extra: MetaBag::new(),
        }
    }

    /// Set the importance score (clamped to 0.0-1.0)
    pub fn with_importance(mut self, importance: f32) -> Self {
        self.importance = importance.clamp(0.0, 1.0);
        self
    }

    /// Set the centrality score (clamped to 0.0-1.0)
    pub fn with_centrality(mut self, centrality: f32) -> Self {
        self.centrality = Some(centrality.clamp(0.0, 1.0));
        self
    }

    /// Set the community label
    pub fn with_community(mut self, community: impl Into<String>) -> Self {
        self.community = Some(community.into());
        self
    }

    /// Set the extra metadata bag
    pub fn with_extra(mut self, extra: MetaBag) -> Self {
        self.extra = extra;
        self
    }

    /// ID of the project the wrapped item was harvested from
    pub fn source_project_id(&self) -> &str {
        &self.knowledge.source_project_id
    }
}

/// Derive a node's importance from its item's usage signals
///
/// `0.5 + min(0.3, access/20) + min(0.3, applications/10) + min(0.2, applied_projects/5)`,
/// clamped to [0, 1]. Heavily used, widely applied items float to the top;
/// untouched items sit at the 0.5 floor.
pub fn importance_score(knowledge: &Knowledge) -> f32 {
    let access = (knowledge.access_count as f32 / 20.0).min(0.3);
    let application = (knowledge.application_count as f32 / 10.0).min(0.3);
    let spread = (knowledge.applied_project_count() as f32 / 5.0).min(0.2);

    (BASE_IMPORTANCE + access + application + spread).clamp(0.0, 1.0)
}
