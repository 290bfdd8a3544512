//! Knowledge item types consumed by the graph core
//!
//! A [`Knowledge`] item is a reusable engineering artifact (a code pattern,
//! a best practice, a worked solution) harvested from one project. Items are
//! owned by the external knowledge store; the graph core treats them as
//! read-only input and never writes them back.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::metadata::MetaBag;

/// A reusable knowledge item with content, tags, and provenance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Knowledge {
    /// Unique identifier for the item
    pub id: String,
    /// Kind of knowledge this item captures
    pub knowledge_type: KnowledgeType,
    /// Human-readable title
    pub title: String,
    /// Short description of what the item is about
    pub description: String,
    /// Full content (code, prose, or both)
    pub content: String,
    /// Tags for filtering and overlap scoring
    pub tags: BTreeSet<String>,
    /// ID of the project this item was harvested from
    pub source_project_id: String,
    /// How many times the item has been read
    pub access_count: u32,
    /// How many times the item has been applied
    pub application_count: u32,
    /// IDs of projects the item has been applied to
    pub applied_project_ids: Vec<String>,
    /// IDs of items the author declared as related
    pub related_ids: Vec<String>,
    /// IDs of items the author declared as dependencies
    pub dependency_ids: Vec<String>,
    /// Open metadata bag for caller data
    pub metadata: MetaBag,
    /// When the item was created
    pub created_at: DateTime<Utc>,
    /// When the item was last updated
    pub updated_at: DateTime<Utc>,
}

impl Knowledge {
    /// Create a new knowledge item
    pub fn new(
        title: impl Into<String>,
        knowledge_type: KnowledgeType,
        source_project_id: impl Into<String>,
    ) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4().to_string(),
            knowledge_type,
            title: title.into(),
            description: String::new(),
            content: String::new(),
            tags: BTreeSet::new(),
            source_project_id: source_project_id.into(),
            access_count: 0,
            application_count: 0,
            applied_project_ids: Vec::new(),
            related_ids: Vec::new(),
            dependency_ids: Vec::new(),
            metadata: MetaBag::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Use a specific item ID instead of a generated one
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the content
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Set the tags
    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Set the usage counters
    pub fn with_usage(mut self, access_count: u32, application_count: u32) -> Self {
        self.access_count = access_count;
        self.application_count = application_count;
        self
    }

    /// Set the projects the item has been applied to
    pub fn with_applied_projects<I, T>(mut self, project_ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.applied_project_ids = project_ids.into_iter().map(Into::into).collect();
        self
    }

    /// Set the declared related-item references
    pub fn with_related<I, T>(mut self, related_ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.related_ids = related_ids.into_iter().map(Into::into).collect();
        self
    }

    /// Set the declared dependency references
    pub fn with_dependencies<I, T>(mut self, dependency_ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.dependency_ids = dependency_ids.into_iter().map(Into::into).collect();
        self
    }

    /// Set the metadata bag
    pub fn with_metadata(mut self, metadata: MetaBag) -> Self {
        self.metadata = metadata;
        self
    }

    /// Number of distinct projects the item has been applied to
    pub fn applied_project_count(&self) -> usize {
        self.applied_project_ids.len()
    }
}

/// Kinds of knowledge items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KnowledgeType {
    /// Reusable code or design pattern
    Pattern,
    /// Best practice or convention
    Practice,
    /// Worked solution to a concrete problem
    Solution,
    /// Standalone code snippet
    Snippet,
    /// Lesson learned or observation
    Insight,
}

impl KnowledgeType {
    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pattern => "pattern",
            Self::Practice => "practice",
            Self::Solution => "solution",
            Self::Snippet => "snippet",
            Self::Insight => "insight",
        }
    }

    /// Parse from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pattern" => Some(Self::Pattern),
            "practice" | "best_practice" => Some(Self::Practice),
            "solution" => Some(Self::Solution),
            "snippet" => Some(Self::Snippet),
            "insight" => Some(Self::Insight),
            _ => None,
        }
    }

    /// Get all knowledge types
    pub fn all() -> &'static [KnowledgeType] {
        &[
            Self::Pattern,
            Self::Practice,
            Self::Solution,
            Self::Snippet,
            Self::Insight,
        ]
    }
}

impl std::fmt::Display for KnowledgeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_knowledge_creation() {
        let item = Knowledge::new("Retry with backoff", KnowledgeType::Pattern, "proj-a")
            .with_description("Exponential backoff for transient failures")
            .with_tags(["retry", "resilience"])
            .with_usage(12, 4);

        assert!(!item.id.is_empty());
        assert_eq!(item.knowledge_type, KnowledgeType::Pattern);
        assert_eq!(item.source_project_id, "proj-a");
        assert_eq!(item.access_count, 12);
        assert_eq!(item.application_count, 4);
        assert_eq!(item.tags.len(), 2);
    }

    #[test]
    fn test_applied_project_count() {
        let item = Knowledge::new("x", KnowledgeType::Solution, "proj-a")
            .with_applied_projects(["proj-b", "proj-c"]);

        assert_eq!(item.applied_project_count(), 2);
    }

    #[test]
    fn test_knowledge_type_parsing() {
        assert_eq!(KnowledgeType::parse("pattern"), Some(KnowledgeType::Pattern));
        assert_eq!(
            KnowledgeType::parse("best_practice"),
            Some(KnowledgeType::Practice)
        );
        assert_eq!(KnowledgeType::parse("SOLUTION"), Some(KnowledgeType::Solution));
        assert_eq!(KnowledgeType::parse("unknown"), None);
    }

    #[test]
    fn test_knowledge_type_round_trip() {
        for knowledge_type in KnowledgeType::all() {
            assert_eq!(
                KnowledgeType::parse(knowledge_type.as_str()),
                Some(*knowledge_type)
            );
        }
    }
}
