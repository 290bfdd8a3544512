//! Typed relationships between graph nodes
//!
//! Relationships are the edges of a knowledge graph. They carry a type from
//! a closed set, a strength in [0, 1], a direction, and a metadata block
//! (provenance plus an open bag). Both endpoints must key existing nodes in
//! the same graph; [`super::graph::KnowledgeGraph::add_relationship`]
//! enforces that.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::metadata::MetaBag;

/// A typed, weighted edge between two nodes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphRelationship {
    /// Unique identifier for the relationship
    pub id: String,
    /// ID of the source node
    pub source_id: String,
    /// ID of the target node
    pub target_id: String,
    /// Type of relationship
    pub relationship_type: RelationshipType,
    /// Strength of the relationship (0.0 to 1.0)
    pub strength: f32,
    /// Whether the edge reads one way or both ways
    pub direction: RelationshipDirection,
    /// Provenance and open metadata
    pub metadata: RelationshipMetadata,
}

impl GraphRelationship {
    /// Create a new relationship between two nodes
    ///
    /// Defaults to strength 0.5, the type's natural direction, and full
    /// confidence.
    pub fn new(
        source_id: impl Into<String>,
        target_id: impl Into<String>,
        relationship_type: RelationshipType,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            source_id: source_id.into(),
            target_id: target_id.into(),
            relationship_type,
            strength: 0.5,
            direction: relationship_type.default_direction(),
            metadata: RelationshipMetadata::default(),
        }
    }

    /// Use a specific relationship ID instead of a generated one
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the strength (clamped to 0.0-1.0)
    pub fn with_strength(mut self, strength: f32) -> Self {
        self.strength = strength.clamp(0.0, 1.0);
        self
    }

    /// Set the direction
    pub fn with_direction(mut self, direction: RelationshipDirection) -> Self {
        self.direction = direction;
        self
    }

    /// Set the inference confidence (clamped to 0.0-1.0)
    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.metadata.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    /// Set who or what created the relationship
    pub fn with_created_by(mut self, created_by: impl Into<String>) -> Self {
        self.metadata.created_by = created_by.into();
        self
    }

    /// Set the extra metadata bag
    pub fn with_extra(mut self, extra: MetaBag) -> Self {
        self.metadata.extra = extra;
        self
    }

    /// Check if the edge touches a node id on either end
    pub fn touches(&self, node_id: &str) -> bool {
        self.source_id == node_id || self.target_id == node_id
    }

    /// Check if the edge connects the two node ids, in either orientation
    pub fn connects(&self, a: &str, b: &str) -> bool {
        (self.source_id == a && self.target_id == b)
            || (self.source_id == b && self.target_id == a)
    }

    /// Check if the edge reads in both directions
    pub fn is_bidirectional(&self) -> bool {
        self.direction == RelationshipDirection::Bidirectional
    }
}

/// Provenance and open metadata attached to a relationship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipMetadata {
    /// When the relationship was created
    pub created_at: DateTime<Utc>,
    /// Who or what created it (e.g. "graph-builder", "graph-merger")
    pub created_by: String,
    /// Confidence in the relationship (1.0 for declared, the similarity
    /// score for inferred edges)
    pub confidence: f32,
    /// Open metadata bag for caller data
    pub extra: MetaBag,
}

impl Default for RelationshipMetadata {
    fn default() -> Self {
        Self {
            created_at: Utc::now(),
            created_by: "manual".to_string(),
            confidence: 1.0,
            extra: MetaBag::new(),
        }
    }
}

/// Types of relationships between nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipType {
    /// Generic association (bidirectional)
    Related,
    /// Source depends on target
    DependsOn,
    /// Source extends or specializes target
    Extends,
    /// Source implements target
    Implements,
    /// Source is similar to target (bidirectional)
    SimilarTo,
    /// Source contradicts target (bidirectional)
    Contradicts,
    /// Source replaces target
    Replaces,
    /// Caller-defined semantics
    Custom,
}

impl RelationshipType {
    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Related => "related",
            Self::DependsOn => "depends_on",
            Self::Extends => "extends",
            Self::Implements => "implements",
            Self::SimilarTo => "similar_to",
            Self::Contradicts => "contradicts",
            Self::Replaces => "replaces",
            Self::Custom => "custom",
        }
    }

    /// Parse from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "related" => Some(Self::Related),
            "depends_on" | "dependson" => Some(Self::DependsOn),
            "extends" => Some(Self::Extends),
            "implements" => Some(Self::Implements),
            "similar_to" | "similarto" => Some(Self::SimilarTo),
            "contradicts" => Some(Self::Contradicts),
            "replaces" => Some(Self::Replaces),
            "custom" => Some(Self::Custom),
            _ => None,
        }
    }

    /// Get all relationship types
    pub fn all() -> &'static [RelationshipType] {
        &[
            Self::Related,
            Self::DependsOn,
            Self::Extends,
            Self::Implements,
            Self::SimilarTo,
            Self::Contradicts,
            Self::Replaces,
            Self::Custom,
        ]
    }

    /// The direction an edge of this type naturally reads in
    pub fn default_direction(&self) -> RelationshipDirection {
        match self {
            Self::Related | Self::SimilarTo | Self::Contradicts => {
                RelationshipDirection::Bidirectional
            }
            Self::DependsOn | Self::Extends | Self::Implements | Self::Replaces | Self::Custom => {
                RelationshipDirection::Unidirectional
            }
        }
    }
}

impl std::fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether an edge reads one way or both ways
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipDirection {
    /// Source to target only
    Unidirectional,
    /// Both ways
    Bidirectional,
}

impl RelationshipDirection {
    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unidirectional => "unidirectional",
            Self::Bidirectional => "bidirectional",
        }
    }
}

impl std::fmt::Display for RelationshipDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
