//! Collaborator traits for the graph core
//!
//! The graph core owns no persistence. It consumes two collaborators,
//! injected through constructors (never a module-level default instance):
//!
//! - [`KnowledgeStore`]: the upstream query interface the builder reads
//!   knowledge items from. The single `query` call is the only suspension
//!   point in the whole core.
//! - [`ProjectContext`]: optional project lookups backing the similarity
//!   engine's project-affinity factor. Synchronous, so node scoring stays
//!   pure and CPU-bound.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

use super::item::{Knowledge, KnowledgeType};

/// Filters forwarded verbatim to the knowledge store
///
/// Empty filter lists match everything; an empty result set is a valid
/// outcome, not an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KnowledgeQuery {
    /// Restrict to items harvested from these projects
    pub project_ids: Vec<String>,
    /// Restrict to these knowledge types
    pub knowledge_types: Vec<KnowledgeType>,
    /// Require every listed tag to be present on the item
    pub tags: Vec<String>,
    /// Case-insensitive free-text term matched against title, description,
    /// and content
    pub text: Option<String>,
    /// Maximum number of items to return
    pub limit: Option<usize>,
}

impl KnowledgeQuery {
    /// Create an unrestricted query
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to items from the given projects
    pub fn with_projects<I, T>(mut self, project_ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.project_ids = project_ids.into_iter().map(Into::into).collect();
        self
    }

    /// Restrict to the given knowledge types
    pub fn with_types<I>(mut self, knowledge_types: I) -> Self
    where
        I: IntoIterator<Item = KnowledgeType>,
    {
        self.knowledge_types = knowledge_types.into_iter().collect();
        self
    }

    /// Require the given tags
    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Add a free-text term
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Cap the number of returned items
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Check whether an item satisfies the filters (ignoring `limit`)
    ///
    /// Stores are free to evaluate filters natively; this is the reference
    /// semantics the in-memory store uses.
    pub fn matches(&self, item: &Knowledge) -> bool {
        if !self.project_ids.is_empty() && !self.project_ids.contains(&item.source_project_id) {
            return false;
        }
        if !self.knowledge_types.is_empty()
            && !self.knowledge_types.contains(&item.knowledge_type)
        {
            return false;
        }
        if !self.tags.iter().all(|tag| item.tags.contains(tag)) {
            return false;
        }
        if let Some(text) = &self.text {
            let needle = text.to_lowercase();
            let matched = item.title.to_lowercase().contains(&needle)
                || item.description.to_lowercase().contains(&needle)
                || item.content.to_lowercase().contains(&needle);
            if !matched {
                return false;
            }
        }
        true
    }
}

/// Upstream query interface for knowledge items
///
/// The only required dependency of the graph builder. Failures propagate to
/// the builder's caller unchanged; retry and backoff belong behind this
/// trait, not in the graph core.
#[async_trait]
pub trait KnowledgeStore: Send + Sync {
    /// Fetch all knowledge items matching the query
    async fn query(&self, query: &KnowledgeQuery) -> Result<Vec<Knowledge>>;
}

/// Optional project lookups for the similarity engine
pub trait ProjectContext: Send + Sync {
    /// Resolve a project id to its profile, if known
    fn project(&self, project_id: &str) -> Option<ProjectProfile>;
}

/// Languages and frameworks declared for a project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectProfile {
    /// Project identifier
    pub id: String,
    /// Languages the project declares
    pub languages: Vec<String>,
    /// Frameworks the project declares
    pub frameworks: Vec<String>,
}

impl ProjectProfile {
    /// Create a new profile
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            languages: Vec::new(),
            frameworks: Vec::new(),
        }
    }

    /// Set the declared languages
    pub fn with_languages<I, T>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.languages = languages.into_iter().map(Into::into).collect();
        self
    }

    /// Set the declared frameworks
    pub fn with_frameworks<I, T>(mut self, frameworks: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.frameworks = frameworks.into_iter().map(Into::into).collect();
        self
    }

    /// Check whether two projects declare any language in common
    pub fn shares_language(&self, other: &ProjectProfile) -> bool {
        self.languages.iter().any(|language| {
            other
                .languages
                .iter()
                .any(|candidate| candidate.eq_ignore_ascii_case(language))
        })
    }
}
