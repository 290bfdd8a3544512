//! Query-driven knowledge graph construction
//!
//! The builder turns one knowledge-store query into a point-in-time graph:
//! one node per returned item, declared relationships between items that
//! both landed in the graph, and optionally a bounded similarity scan that
//! infers `SimilarTo` edges between unrelated pairs. Store failures
//! propagate unchanged; an empty result set builds an empty graph.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;

use super::graph::KnowledgeGraph;
use super::node::GraphNode;
use super::relationship::{GraphRelationship, RelationshipDirection, RelationshipType};
use super::similarity::SimilarityEngine;
use super::store::{KnowledgeQuery, KnowledgeStore, ProjectContext};

/// Strength of a declared "related" reference.
const DECLARED_RELATED_STRENGTH: f32 = 0.8;
/// Strength of a declared dependency reference.
const DECLARED_DEPENDENCY_STRENGTH: f32 = 0.9;

/// Origin recorded on edges the builder creates.
const BUILDER_ORIGIN: &str = "graph-builder";

/// Options controlling graph construction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphBuildOptions {
    /// Name of the resulting graph
    pub name: String,
    /// Optional description of the resulting graph
    pub description: Option<String>,
    /// Add declared related/dependency edges
    pub include_relationships: bool,
    /// Drop any edge weaker than this (0.0 keeps everything)
    pub min_relationship_strength: f32,
    /// Run the implicit similarity scan
    pub detect_implicit_relationships: bool,
    /// Minimum node similarity for an implicit edge
    pub min_implicit_similarity: f32,
    /// Cap on the number of implicit edges added
    pub max_implicit_relationships: usize,
    /// Cap on similarity computations during the implicit scan; the scan is
    /// O(n²) in the node count, and the edge cap alone does not bound the
    /// comparison work
    pub max_similarity_comparisons: Option<usize>,
}

impl Default for GraphBuildOptions {
    fn default() -> Self {
        Self {
            name: "knowledge-graph".to_string(),
            description: None,
            include_relationships: true,
            min_relationship_strength: 0.0,
            detect_implicit_relationships: false,
            min_implicit_similarity: 0.6,
            max_implicit_relationships: 50,
            max_similarity_comparisons: None,
        }
    }
}

impl GraphBuildOptions {
    /// Create options with the given graph name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the graph description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Toggle declared relationship discovery
    pub fn with_relationships(mut self, include: bool) -> Self {
        self.include_relationships = include;
        self
    }

    /// Set the minimum edge strength
    pub fn with_min_strength(mut self, min_strength: f32) -> Self {
        self.min_relationship_strength = min_strength.clamp(0.0, 1.0);
        self
    }

    /// Enable the implicit similarity scan with the given threshold
    pub fn with_implicit_detection(mut self, min_similarity: f32) -> Self {
        self.detect_implicit_relationships = true;
        self.min_implicit_similarity = min_similarity.clamp(0.0, 1.0);
        self
    }

    /// Cap the number of implicit edges
    pub fn with_max_implicit(mut self, max_implicit: usize) -> Self {
        self.max_implicit_relationships = max_implicit;
        self
    }

    /// Cap the similarity comparison work
    pub fn with_comparison_budget(mut self, budget: usize) -> Self {
        self.max_similarity_comparisons = Some(budget);
        self
    }
}

/// Builds knowledge graphs from store queries
pub struct GraphBuilder<S: KnowledgeStore> {
    /// Upstream knowledge store
    store: Arc<S>,
    /// Similarity engine for implicit relationship discovery
    similarity: SimilarityEngine,
}

impl<S: KnowledgeStore> GraphBuilder<S> {
    /// Create a builder over a knowledge store
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            similarity: SimilarityEngine::new(),
        }
    }

    /// Use project lookups for the similarity engine's affinity factor
    pub fn with_project_context(mut self, projects: Arc<dyn ProjectContext>) -> Self {
        self.similarity = SimilarityEngine::with_project_context(projects);
        self
    }

    /// Build a graph from a point-in-time store query
    ///
    /// The store read is the only suspension point; everything after it is
    /// synchronous and CPU-bound. The returned graph is a snapshot; later
    /// operations never mutate it.
    pub async fn build_graph(
        &self,
        query: &KnowledgeQuery,
        options: &GraphBuildOptions,
    ) -> Result<KnowledgeGraph> {
        let items = self.store.query(query).await?;
        info!(name = %options.name, items = items.len(), "Building knowledge graph");

        let mut graph = KnowledgeGraph::new(options.name.clone());
        graph.description = options.description.clone();

        for item in items {
            graph.add_node(GraphNode::from_knowledge(item));
        }

        if options.include_relationships {
            let declared = self.add_declared_relationships(&mut graph, options);
            debug!(declared, "Declared relationships added");
        }

        if options.detect_implicit_relationships {
            let implicit = self.add_implicit_relationships(&mut graph, options);
            debug!(implicit, "Implicit relationship scan finished");
        }

        info!(
            nodes = graph.node_count(),
            relationships = graph.relationship_count(),
            "Knowledge graph built"
        );
        Ok(graph)
    }

    /// Add edges for the related/dependency references items declare
    ///
    /// References whose target did not land in this graph are silently
    /// dropped; the builder never fetches outside its query scope.
    fn add_declared_relationships(
        &self,
        graph: &mut KnowledgeGraph,
        options: &GraphBuildOptions,
    ) -> usize {
        let declared: Vec<(String, Vec<String>, Vec<String>)> = graph
            .nodes
            .values()
            .map(|node| {
                (
                    node.id.clone(),
                    node.knowledge.related_ids.clone(),
                    node.knowledge.dependency_ids.clone(),
                )
            })
            .collect();

        let mut added = 0;
        for (source_id, related_ids, dependency_ids) in declared {
            for target_id in related_ids {
                if !graph.contains_node(&target_id) {
                    continue;
                }
                let edge =
                    GraphRelationship::new(source_id.clone(), target_id, RelationshipType::Related)
                        .with_strength(DECLARED_RELATED_STRENGTH)
                        .with_direction(RelationshipDirection::Bidirectional)
                        .with_created_by(BUILDER_ORIGIN);
                if edge.strength >= options.min_relationship_strength
                    && graph.add_relationship(edge)
                {
                    added += 1;
                }
            }

            for target_id in dependency_ids {
                if !graph.contains_node(&target_id) {
                    continue;
                }
                let edge = GraphRelationship::new(
                    source_id.clone(),
                    target_id,
                    RelationshipType::DependsOn,
                )
                .with_strength(DECLARED_DEPENDENCY_STRENGTH)
                .with_direction(RelationshipDirection::Unidirectional)
                .with_created_by(BUILDER_ORIGIN);
                if edge.strength >= options.min_relationship_strength
                    && graph.add_relationship(edge)
                {
                    added += 1;
                }
            }
        }

        added
    }

    /// Infer `SimilarTo` edges between node pairs with no relationship yet
    ///
    /// Pairs are visited in lexicographic node-id order, so truncation by
    /// either cap is deterministic. The edge cap bounds result size; the
    /// comparison budget bounds the O(n²) scan itself.
    fn add_implicit_relationships(
        &self,
        graph: &mut KnowledgeGraph,
        options: &GraphBuildOptions,
    ) -> usize {
        let node_ids: Vec<String> = graph.nodes.keys().cloned().collect();
        let mut added = 0;
        let mut comparisons = 0;

        'scan: for i in 0..node_ids.len() {
            for j in (i + 1)..node_ids.len() {
                if added >= options.max_implicit_relationships {
                    break 'scan;
                }
                if let Some(budget) = options.max_similarity_comparisons {
                    if comparisons >= budget {
                        debug!(comparisons, "Implicit scan stopped by comparison budget");
                        break 'scan;
                    }
                }

                let source_id = &node_ids[i];
                let target_id = &node_ids[j];
                if graph.has_relationship_between(source_id, target_id) {
                    continue;
                }

                let similarity = {
                    let (Some(first), Some(second)) =
                        (graph.nodes.get(source_id), graph.nodes.get(target_id))
                    else {
                        continue;
                    };
                    comparisons += 1;
                    self.similarity.node_similarity(first, second)
                };

                if similarity >= options.min_implicit_similarity {
                    let edge = GraphRelationship::new(
                        source_id.clone(),
                        target_id.clone(),
                        RelationshipType::SimilarTo,
                    )
                    .with_strength(similarity)
                    .with_direction(RelationshipDirection::Bidirectional)
                    .with_confidence(similarity)
                    .with_created_by(BUILDER_ORIGIN);
                    if graph.add_relationship(edge) {
                        added += 1;
                    }
                }
            }
        }

        added
    }
}
