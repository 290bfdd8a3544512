//! The knowledge graph container
//!
//! A [`KnowledgeGraph`] is a point-in-time snapshot: built once, never
//! mutated after it is returned. Merging two graphs always allocates a
//! third. Node and relationship collections are `BTreeMap`s keyed by id, so
//! iteration order is the lexicographic id order. The similarity scans in
//! the builder and merger rely on that for deterministic truncation.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::item::KnowledgeType;
use super::node::GraphNode;
use super::relationship::{GraphRelationship, RelationshipType};

/// A knowledge graph: nodes keyed by id, relationships keyed by id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeGraph {
    /// Unique identifier for the graph
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// Nodes keyed by node id
    pub nodes: BTreeMap<String, GraphNode>,
    /// Relationships keyed by relationship id
    pub relationships: BTreeMap<String, GraphRelationship>,
    /// Provenance metadata
    pub metadata: GraphMetadata,
}

impl KnowledgeGraph {
    /// Create a new empty graph
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            description: None,
            nodes: BTreeMap::new(),
            relationships: BTreeMap::new(),
            metadata: GraphMetadata {
                created_at: now,
                updated_at: now,
                project_ids: Vec::new(),
                knowledge_types: Vec::new(),
            },
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Insert a node, replacing any existing node with the same id
    ///
    /// Keeps the contributing-projects and knowledge-types metadata lists
    /// up to date.
    pub fn add_node(&mut self, node: GraphNode) {
        let project_id = node.knowledge.source_project_id.clone();
        if !self.metadata.project_ids.contains(&project_id) {
            self.metadata.project_ids.push(project_id);
            self.metadata.project_ids.sort();
        }

        let knowledge_type = node.knowledge.knowledge_type;
        if !self.metadata.knowledge_types.contains(&knowledge_type) {
            self.metadata.knowledge_types.push(knowledge_type);
            self.metadata.knowledge_types.sort();
        }

        self.nodes.insert(node.id.clone(), node);
        self.metadata.updated_at = Utc::now();
    }

    /// Insert a relationship if it is admissible
    ///
    /// Returns false, leaving the graph untouched, when either endpoint
    /// is not a node of this graph or the relationship id is already taken.
    /// Callers that copy edges between graphs rely on this silent pruning.
    pub fn add_relationship(&mut self, relationship: GraphRelationship) -> bool {
        if !self.nodes.contains_key(&relationship.source_id)
            || !self.nodes.contains_key(&relationship.target_id)
        {
            return false;
        }
        if self.relationships.contains_key(&relationship.id) {
            return false;
        }

        self.relationships
            .insert(relationship.id.clone(), relationship);
        self.metadata.updated_at = Utc::now();
        true
    }

    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of relationships
    pub fn relationship_count(&self) -> usize {
        self.relationships.len()
    }

    /// Check if the graph is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Check if a node id is present
    pub fn contains_node(&self, node_id: &str) -> bool {
        self.nodes.contains_key(node_id)
    }

    /// Get a node by id
    pub fn node(&self, node_id: &str) -> Option<&GraphNode> {
        self.nodes.get(node_id)
    }

    /// Get a relationship by id
    pub fn relationship(&self, relationship_id: &str) -> Option<&GraphRelationship> {
        self.relationships.get(relationship_id)
    }

    /// All relationships touching a node, as source or target
    pub fn relationships_for_node(&self, node_id: &str) -> Vec<&GraphRelationship> {
        self.relationships
            .values()
            .filter(|rel| rel.touches(node_id))
            .collect()
    }

    /// Check if any relationship connects the two node ids, in either
    /// orientation
    pub fn has_relationship_between(&self, a: &str, b: &str) -> bool {
        self.relationships.values().any(|rel| rel.connects(a, b))
    }

    /// IDs of nodes directly connected to a node
    pub fn connected_node_ids(&self, node_id: &str) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .relationships
            .values()
            .filter_map(|rel| {
                if rel.source_id == node_id {
                    Some(rel.target_id.as_str())
                } else if rel.target_id == node_id {
                    Some(rel.source_id.as_str())
                } else {
                    None
                }
            })
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Summary statistics for the graph
    pub fn stats(&self) -> GraphStats {
        let mut nodes_by_type: BTreeMap<KnowledgeType, usize> = BTreeMap::new();
        for node in self.nodes.values() {
            *nodes_by_type.entry(node.knowledge.knowledge_type).or_default() += 1;
        }

        let mut relationships_by_type: BTreeMap<RelationshipType, usize> = BTreeMap::new();
        for rel in self.relationships.values() {
            *relationships_by_type
                .entry(rel.relationship_type)
                .or_default() += 1;
        }

        let average_importance = if self.nodes.is_empty() {
            0.0
        } else {
            self.nodes.values().map(|n| n.importance).sum::<f32>() / self.nodes.len() as f32
        };

        let average_strength = if self.relationships.is_empty() {
            0.0
        } else {
            self.relationships.values().map(|r| r.strength).sum::<f32>()
                / self.relationships.len() as f32
        };

        GraphStats {
            total_nodes: self.node_count(),
            total_relationships: self.relationship_count(),
            nodes_by_type: nodes_by_type.into_iter().collect(),
            relationships_by_type: relationships_by_type.into_iter().collect(),
            average_importance,
            average_strength,
        }
    }
}

/// Provenance metadata for a graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphMetadata {
    /// When the graph was created
    pub created_at: DateTime<Utc>,
    /// When the graph was last changed during construction
    pub updated_at: DateTime<Utc>,
    /// Projects that contributed at least one node, sorted
    pub project_ids: Vec<String>,
    /// Knowledge types present among the nodes, sorted
    pub knowledge_types: Vec<KnowledgeType>,
}

/// Summary statistics about a graph
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphStats {
    /// Total number of nodes
    pub total_nodes: usize,
    /// Total number of relationships
    pub total_relationships: usize,
    /// Node counts per knowledge type
    pub nodes_by_type: Vec<(KnowledgeType, usize)>,
    /// Relationship counts per relationship type
    pub relationships_by_type: Vec<(RelationshipType, usize)>,
    /// Mean node importance
    pub average_importance: f32,
    /// Mean relationship strength
    pub average_strength: f32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::graph::item::Knowledge;

    fn node(id: &str, project: &str, knowledge_type: KnowledgeType) -> GraphNode {
        GraphNode::from_knowledge(
            Knowledge::new(id, knowledge_type, project).with_id(id),
        )
    }

    #[test]
    fn test_add_node_tracks_metadata() {
        let mut graph = KnowledgeGraph::new("test");
        graph.add_node(node("n1", "proj-b", KnowledgeType::Pattern));
        graph.add_node(node("n2", "proj-a", KnowledgeType::Solution));
        graph.add_node(node("n3", "proj-a", KnowledgeType::Pattern));

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.metadata.project_ids, vec!["proj-a", "proj-b"]);
        assert_eq!(
            graph.metadata.knowledge_types,
            vec![KnowledgeType::Pattern, KnowledgeType::Solution]
        );
    }

    #[test]
    fn test_add_relationship_requires_endpoints() {
        let mut graph = KnowledgeGraph::new("test");
        graph.add_node(node("n1", "p", KnowledgeType::Pattern));

        let dangling = GraphRelationship::new("n1", "missing", RelationshipType::Related);
        assert!(!graph.add_relationship(dangling));
        assert_eq!(graph.relationship_count(), 0);

        graph.add_node(node("n2", "p", KnowledgeType::Pattern));
        let ok = GraphRelationship::new("n1", "n2", RelationshipType::Related);
        assert!(graph.add_relationship(ok));
        assert_eq!(graph.relationship_count(), 1);
    }

    #[test]
    fn test_add_relationship_rejects_duplicate_ids() {
        let mut graph = KnowledgeGraph::new("test");
        graph.add_node(node("n1", "p", KnowledgeType::Pattern));
        graph.add_node(node("n2", "p", KnowledgeType::Pattern));

        let first = GraphRelationship::new("n1", "n2", RelationshipType::Related).with_id("r1");
        let duplicate =
            GraphRelationship::new("n2", "n1", RelationshipType::SimilarTo).with_id("r1");

        assert!(graph.add_relationship(first));
        assert!(!graph.add_relationship(duplicate));
        assert_eq!(graph.relationship_count(), 1);
        assert_eq!(
            graph.relationship("r1").map(|r| r.relationship_type),
            Some(RelationshipType::Related)
        );
    }

    #[test]
    fn test_relationship_lookups() {
        let mut graph = KnowledgeGraph::new("test");
        graph.add_node(node("a", "p", KnowledgeType::Pattern));
        graph.add_node(node("b", "p", KnowledgeType::Pattern));
        graph.add_node(node("c", "p", KnowledgeType::Pattern));

        graph.add_relationship(GraphRelationship::new("a", "b", RelationshipType::Related));
        graph.add_relationship(GraphRelationship::new("c", "b", RelationshipType::DependsOn));

        assert!(graph.has_relationship_between("a", "b"));
        assert!(graph.has_relationship_between("b", "a"));
        assert!(!graph.has_relationship_between("a", "c"));
        assert_eq!(graph.relationships_for_node("b").len(), 2);
        assert_eq!(graph.connected_node_ids("b"), vec!["a", "c"]);
    }

    #[test]
    fn test_stats() {
        let mut graph = KnowledgeGraph::new("test");
        graph.add_node(node("a", "p", KnowledgeType::Pattern));
        graph.add_node(node("b", "p", KnowledgeType::Solution));
        graph.add_relationship(
            GraphRelationship::new("a", "b", RelationshipType::Related).with_strength(0.8),
        );

        let stats = graph.stats();
        assert_eq!(stats.total_nodes, 2);
        assert_eq!(stats.total_relationships, 1);
        assert_eq!(stats.nodes_by_type.len(), 2);
        assert_eq!(stats.average_strength, 0.8);
        assert_eq!(stats.average_importance, 0.5);
    }

    #[test]
    fn test_empty_graph_stats() {
        let stats = KnowledgeGraph::new("empty").stats();
        assert_eq!(stats.total_nodes, 0);
        assert_eq!(stats.average_importance, 0.0);
    }
}
