//! In-memory collaborator implementations
//!
//! Reference implementations of [`KnowledgeStore`] and [`ProjectContext`]
//! over plain collections. Real deployments put a persistent store behind
//! the same traits; these cover tests and embedding callers that already
//! hold their knowledge in memory.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::error::{Error, Result};

use crate::domain::graph::{
    Knowledge, KnowledgeQuery, KnowledgeStore, ProjectContext, ProjectProfile,
};

/// A knowledge store over an in-memory item list
#[derive(Debug, Clone, Default)]
pub struct InMemoryKnowledgeStore {
    items: Vec<Knowledge>,
    failure: Option<String>,
}

impl InMemoryKnowledgeStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the given items
    pub fn with_items(items: Vec<Knowledge>) -> Self {
        Self {
            items,
            failure: None,
        }
    }

    /// Make every query fail with the given message
    ///
    /// Lets tests exercise the error-propagation contract without a real
    /// failing backend.
    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    /// Add an item
    pub fn insert(&mut self, item: Knowledge) {
        self.items.push(item);
    }

    /// Number of items held
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[async_trait]
impl KnowledgeStore for InMemoryKnowledgeStore {
    async fn query(&self, query: &KnowledgeQuery) -> Result<Vec<Knowledge>> {
        if let Some(message) = &self.failure {
            return Err(Error::Store(message.clone()));
        }

        let mut matched: Vec<Knowledge> = self
            .items
            .iter()
            .filter(|item| query.matches(item))
            .cloned()
            .collect();

        if let Some(limit) = query.limit {
            matched.truncate(limit);
        }

        Ok(matched)
    }
}

/// A project context over a fixed profile table
#[derive(Debug, Clone, Default)]
pub struct StaticProjectContext {
    profiles: BTreeMap<String, ProjectProfile>,
}

impl StaticProjectContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a profile, keyed by its id
    pub fn with_profile(mut self, profile: ProjectProfile) -> Self {
        self.profiles.insert(profile.id.clone(), profile);
        self
    }

    /// Number of profiles held
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Check if the context is empty
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl ProjectContext for StaticProjectContext {
    fn project(&self, project_id: &str) -> Option<ProjectProfile> {
        self.profiles.get(project_id).cloned()
    }
}
