//! Multi-strategy knowledge graph merging
//!
//! A merge consumes two graphs read-only and produces a brand-new third
//! graph plus statistics and a notes trail. The strategy decides which
//! elements survive; the reconciliation rules decide what happens to the
//! metadata of colliding ids; cross-graph discovery optionally infers
//! `SimilarTo` edges between nodes from different source projects.
//!
//! Union and Intersection are commutative in their surviving id sets. The
//! priority strategies are deliberately not: swapping the inputs changes
//! which payload survives on any colliding id.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};

use super::graph::KnowledgeGraph;
use super::metadata::merge_bags;
use super::node::GraphNode;
use super::relationship::{GraphRelationship, RelationshipDirection, RelationshipType};
use super::similarity::SimilarityEngine;
use super::store::ProjectContext;

/// Origin recorded on edges the merger creates.
const MERGER_ORIGIN: &str = "graph-merger";

/// A caller-supplied merge function for [`MergeStrategy::Custom`]
pub type CustomMergeFn =
    Arc<dyn Fn(&KnowledgeGraph, &KnowledgeGraph) -> Result<KnowledgeGraph> + Send + Sync>;

/// Policy deciding which nodes and relationships survive a merge
#[derive(Clone)]
pub enum MergeStrategy {
    /// Keep every element from both graphs
    Union,
    /// Keep only ids present in both graphs
    Intersection,
    /// Keep the first graph verbatim; add only new ids from the second
    FirstPriority,
    /// Keep the second graph verbatim; add only new ids from the first
    SecondPriority,
    /// Delegate entirely to a caller-supplied function
    Custom(CustomMergeFn),
}

impl MergeStrategy {
    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Union => "union",
            Self::Intersection => "intersection",
            Self::FirstPriority => "first_priority",
            Self::SecondPriority => "second_priority",
            Self::Custom(_) => "custom",
        }
    }

    /// Parse a built-in strategy from string
    ///
    /// Rejected upfront, before any merge work begins. `custom` is not
    /// parseable; it requires a function, not a name.
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "union" => Ok(Self::Union),
            "intersection" => Ok(Self::Intersection),
            "first_priority" | "first" => Ok(Self::FirstPriority),
            "second_priority" | "second" => Ok(Self::SecondPriority),
            other => Err(Error::UnknownStrategy(other.to_string())),
        }
    }
}

impl std::fmt::Debug for MergeStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MergeStrategy::{}", self.as_str())
    }
}

impl std::fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Options controlling a merge
#[derive(Debug, Clone)]
pub struct MergeOptions {
    /// Survival policy for colliding and non-colliding ids
    pub strategy: MergeStrategy,
    /// Reconcile node metadata on id collisions
    pub merge_node_metadata: bool,
    /// Reconcile relationship metadata on id collisions
    pub merge_relationship_metadata: bool,
    /// Drop any copied edge weaker than this (0.0 keeps everything)
    pub min_relationship_strength: f32,
    /// Run cross-graph relationship discovery after the strategy
    pub create_cross_graph_relationships: bool,
    /// Minimum node similarity for a cross-graph edge
    pub min_cross_graph_similarity: f32,
    /// Cap on the number of cross-graph edges added
    pub max_cross_graph_relationships: usize,
    /// Cap on similarity computations during cross-graph discovery
    pub max_similarity_comparisons: Option<usize>,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            strategy: MergeStrategy::Union,
            merge_node_metadata: true,
            merge_relationship_metadata: true,
            min_relationship_strength: 0.0,
            create_cross_graph_relationships: false,
            min_cross_graph_similarity: 0.7,
            max_cross_graph_relationships: 50,
            max_similarity_comparisons: None,
        }
    }
}

impl MergeOptions {
    /// Create options with the given strategy
    pub fn new(strategy: MergeStrategy) -> Self {
        Self {
            strategy,
            ..Self::default()
        }
    }

    /// Toggle node metadata reconciliation
    pub fn with_node_metadata(mut self, merge: bool) -> Self {
        self.merge_node_metadata = merge;
        self
    }

    /// Toggle relationship metadata reconciliation
    pub fn with_relationship_metadata(mut self, merge: bool) -> Self {
        self.merge_relationship_metadata = merge;
        self
    }

    /// Set the minimum copied-edge strength
    pub fn with_min_strength(mut self, min_strength: f32) -> Self {
        self.min_relationship_strength = min_strength;
        self
    }

    /// Enable cross-graph discovery with the given threshold
    pub fn with_cross_graph_discovery(mut self, min_similarity: f32) -> Self {
        self.create_cross_graph_relationships = true;
        self.min_cross_graph_similarity = min_similarity;
        self
    }

    /// Cap the number of cross-graph edges
    pub fn with_max_cross_graph(mut self, max_edges: usize) -> Self {
        self.max_cross_graph_relationships = max_edges;
        self
    }

    /// Cap the similarity comparison work
    pub fn with_comparison_budget(mut self, budget: usize) -> Self {
        self.max_similarity_comparisons = Some(budget);
        self
    }

    /// Reject out-of-range values before any merge work begins
    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.min_relationship_strength) {
            return Err(Error::InvalidOptions(format!(
                "min_relationship_strength must be in [0, 1], got {}",
                self.min_relationship_strength
            )));
        }
        if !(0.0..=1.0).contains(&self.min_cross_graph_similarity) {
            return Err(Error::InvalidOptions(format!(
                "min_cross_graph_similarity must be in [0, 1], got {}",
                self.min_cross_graph_similarity
            )));
        }
        Ok(())
    }
}

/// Statistics describing a completed merge
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MergeStats {
    /// Result nodes whose id appears in the first input
    pub nodes_from_first: usize,
    /// Result nodes whose id appears in the second input
    pub nodes_from_second: usize,
    /// Result relationships whose id appears in the first input
    pub relationships_from_first: usize,
    /// Result relationships whose id appears in the second input
    pub relationships_from_second: usize,
    /// Total nodes in the result
    pub total_nodes: usize,
    /// Total relationships in the result
    pub total_relationships: usize,
    /// Cross-graph relationships created by discovery
    pub new_cross_graph_relationships: usize,
    /// Id collisions observed (0 by construction for Union/Intersection)
    pub conflicts: usize,
    /// How colliding ids were resolved
    pub conflict_resolution: String,
}

/// A completed merge: the new graph, its statistics, and a notes trail
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    /// The freshly allocated merged graph
    pub graph: KnowledgeGraph,
    /// Statistics about the merge
    pub stats: MergeStats,
    /// Free-form notes documenting individual metadata merges
    pub notes: Vec<String>,
}

/// Merges knowledge graphs under a selectable strategy
#[derive(Debug, Clone, Default)]
pub struct GraphMerger {
    /// Similarity engine for cross-graph discovery
    similarity: SimilarityEngine,
}

impl GraphMerger {
    /// Create a merger without project lookups
    pub fn new() -> Self {
        Self::default()
    }

    /// Use project lookups for the similarity engine's affinity factor
    pub fn with_project_context(projects: Arc<dyn ProjectContext>) -> Self {
        Self {
            similarity: SimilarityEngine::with_project_context(projects),
        }
    }

    /// Merge two graphs into a brand-new third
    ///
    /// Both inputs are read-only and remain usable afterwards, including in
    /// further merges. Synchronous and CPU-bound; no I/O.
    pub fn merge_graphs(
        &self,
        first: &KnowledgeGraph,
        second: &KnowledgeGraph,
        options: &MergeOptions,
    ) -> Result<MergeOutcome> {
        options.validate()?;
        info!(
            strategy = %options.strategy,
            first = %first.name,
            second = %second.name,
            "Merging knowledge graphs"
        );

        let merged_name = format!("{} + {}", first.name, second.name);
        let mut notes = Vec::new();
        let mut conflicts = 0;

        let mut merged = match &options.strategy {
            MergeStrategy::Union => {
                self.merge_union(&merged_name, first, second, options, &mut notes)
            }
            MergeStrategy::Intersection => {
                self.merge_intersection(&merged_name, first, second, options, &mut notes)
            }
            MergeStrategy::FirstPriority => self.merge_priority(
                &merged_name,
                first,
                second,
                options,
                &mut notes,
                &mut conflicts,
            ),
            MergeStrategy::SecondPriority => self.merge_priority(
                &merged_name,
                second,
                first,
                options,
                &mut notes,
                &mut conflicts,
            ),
            MergeStrategy::Custom(merge_fn) => {
                let graph = merge_fn(first, second)?;
                // The function owns the resolution; all we can observe is
                // how many surviving ids existed in both inputs.
                conflicts = graph
                    .nodes
                    .keys()
                    .filter(|id| first.contains_node(id) && second.contains_node(id))
                    .count();
                graph
            }
        };

        let new_cross_graph_relationships = if options.create_cross_graph_relationships {
            self.add_cross_graph_relationships(&mut merged, options, &mut notes)
        } else {
            0
        };

        let stats = MergeStats {
            nodes_from_first: merged
                .nodes
                .keys()
                .filter(|id| first.contains_node(id))
                .count(),
            nodes_from_second: merged
                .nodes
                .keys()
                .filter(|id| second.contains_node(id))
                .count(),
            relationships_from_first: merged
                .relationships
                .keys()
                .filter(|id| first.relationships.contains_key(*id))
                .count(),
            relationships_from_second: merged
                .relationships
                .keys()
                .filter(|id| second.relationships.contains_key(*id))
                .count(),
            total_nodes: merged.node_count(),
            total_relationships: merged.relationship_count(),
            new_cross_graph_relationships,
            conflicts,
            conflict_resolution: describe_resolution(options, conflicts),
        };

        info!(
            nodes = stats.total_nodes,
            relationships = stats.total_relationships,
            conflicts = stats.conflicts,
            cross_graph = stats.new_cross_graph_relationships,
            "Knowledge graphs merged"
        );

        Ok(MergeOutcome {
            graph: merged,
            stats,
            notes,
        })
    }

    fn merge_union(
        &self,
        name: &str,
        first: &KnowledgeGraph,
        second: &KnowledgeGraph,
        options: &MergeOptions,
        notes: &mut Vec<String>,
    ) -> KnowledgeGraph {
        let mut graph = KnowledgeGraph::new(name);

        for node in first.nodes.values() {
            graph.add_node(node.clone());
        }
        for node in second.nodes.values() {
            match graph.nodes.get_mut(&node.id) {
                Some(survivor) => {
                    if options.merge_node_metadata {
                        reconcile_node(survivor, node, notes);
                    }
                }
                None => graph.add_node(node.clone()),
            }
        }

        for edge in first.relationships.values() {
            copy_relationship(&mut graph, edge, options.min_relationship_strength);
        }
        for edge in second.relationships.values() {
            match graph.relationships.get_mut(&edge.id) {
                Some(survivor) => {
                    if options.merge_relationship_metadata {
                        survivor.strength = survivor.strength.max(edge.strength);
                        reconcile_relationship(survivor, edge, notes);
                    }
                }
                None => {
                    copy_relationship(&mut graph, edge, options.min_relationship_strength);
                }
            }
        }

        graph
    }

    fn merge_intersection(
        &self,
        name: &str,
        first: &KnowledgeGraph,
        second: &KnowledgeGraph,
        options: &MergeOptions,
        notes: &mut Vec<String>,
    ) -> KnowledgeGraph {
        let mut graph = KnowledgeGraph::new(name);

        for (id, node) in &first.nodes {
            let Some(other) = second.nodes.get(id) else {
                continue;
            };
            let mut survivor = node.clone();
            if options.merge_node_metadata {
                reconcile_node(&mut survivor, other, notes);
            }
            graph.add_node(survivor);
        }

        for (id, edge) in &first.relationships {
            let Some(other) = second.relationships.get(id) else {
                continue;
            };
            let mut survivor = edge.clone();
            if options.merge_relationship_metadata {
                survivor.strength = survivor.strength.max(other.strength);
                reconcile_relationship(&mut survivor, other, notes);
            }
            copy_relationship(&mut graph, &survivor, options.min_relationship_strength);
        }

        graph
    }

    /// Merge with one graph designated as priority
    ///
    /// The priority graph's elements are kept verbatim; a colliding id from
    /// the non-priority graph is a conflict and can at most reconcile
    /// metadata into the survivor. The survivor's core payload (wrapped
    /// knowledge, edge type/strength/direction) is never overwritten.
    fn merge_priority(
        &self,
        name: &str,
        priority: &KnowledgeGraph,
        secondary: &KnowledgeGraph,
        options: &MergeOptions,
        notes: &mut Vec<String>,
        conflicts: &mut usize,
    ) -> KnowledgeGraph {
        let mut graph = KnowledgeGraph::new(name);

        for node in priority.nodes.values() {
            graph.add_node(node.clone());
        }
        for node in secondary.nodes.values() {
            match graph.nodes.get_mut(&node.id) {
                Some(survivor) => {
                    *conflicts += 1;
                    if options.merge_node_metadata {
                        reconcile_node(survivor, node, notes);
                    }
                }
                None => graph.add_node(node.clone()),
            }
        }

        for edge in priority.relationships.values() {
            copy_relationship(&mut graph, edge, options.min_relationship_strength);
        }
        for edge in secondary.relationships.values() {
            match graph.relationships.get_mut(&edge.id) {
                Some(survivor) => {
                    *conflicts += 1;
                    if options.merge_relationship_metadata {
                        reconcile_relationship(survivor, edge, notes);
                    }
                }
                None => {
                    copy_relationship(&mut graph, edge, options.min_relationship_strength);
                }
            }
        }

        graph
    }

    /// Infer `SimilarTo` edges between surviving nodes of different projects
    ///
    /// Pairs are visited in lexicographic node-id order for deterministic
    /// truncation by either the edge cap or the comparison budget.
    fn add_cross_graph_relationships(
        &self,
        graph: &mut KnowledgeGraph,
        options: &MergeOptions,
        notes: &mut Vec<String>,
    ) -> usize {
        let node_ids: Vec<String> = graph.nodes.keys().cloned().collect();
        let mut added = 0;
        let mut comparisons = 0;

        'scan: for i in 0..node_ids.len() {
            for j in (i + 1)..node_ids.len() {
                if added >= options.max_cross_graph_relationships {
                    break 'scan;
                }
                if let Some(budget) = options.max_similarity_comparisons {
                    if comparisons >= budget {
                        debug!(comparisons, "Cross-graph scan stopped by comparison budget");
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
                    if first.source_project_id() == second.source_project_id() {
                        continue;
                    }
                    comparisons += 1;
                    self.similarity.node_similarity(first, second)
                };

                if similarity >= options.min_cross_graph_similarity {
                    let edge = GraphRelationship::new(
                        source_id.clone(),
                        target_id.clone(),
                        RelationshipType::SimilarTo,
                    )
                    .with_strength(similarity)
                    .with_direction(RelationshipDirection::Bidirectional)
                    .with_confidence(similarity)
                    .with_created_by(MERGER_ORIGIN);
                    if graph.add_relationship(edge) {
                        notes.push(format!(
                            "cross-graph: {source_id} ~ {target_id} (similarity {similarity:.2})"
                        ));
                        added += 1;
                    }
                }
            }
        }

        added
    }
}

/// Reconcile a second node's metadata into a surviving first node
///
/// Quality scores take the max, community labels concatenate when they
/// differ, and the extra bags merge per their per-kind rules. The wrapped
/// knowledge payload is untouched.
fn reconcile_node(survivor: &mut GraphNode, second: &GraphNode, notes: &mut Vec<String>) {
    if second.importance > survivor.importance {
        notes.push(format!(
            "node {}: importance raised {:.2} -> {:.2}",
            survivor.id, survivor.importance, second.importance
        ));
        survivor.importance = second.importance;
    }

    survivor.centrality = match (survivor.centrality, second.centrality) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    };

    survivor.community = match (&survivor.community, &second.community) {
        (Some(a), Some(b)) if a != b => {
            let combined = format!("{a}+{b}");
            notes.push(format!("node {}: community merged to {combined}", survivor.id));
            Some(combined)
        }
        (Some(a), _) => Some(a.clone()),
        (None, b) => b.clone(),
    };

    for key in merge_bags(&mut survivor.extra, &second.extra) {
        notes.push(format!("node {}: merged metadata key '{key}'", survivor.id));
    }
}

/// Reconcile a second edge's metadata into a surviving first edge
///
/// Confidence takes the max and the extra bags merge. Strength is handled
/// by the caller: Union/Intersection max it, the priority strategies treat
/// it as core payload and leave it alone.
fn reconcile_relationship(
    survivor: &mut GraphRelationship,
    second: &GraphRelationship,
    notes: &mut Vec<String>,
) {
    if second.metadata.confidence > survivor.metadata.confidence {
        survivor.metadata.confidence = second.metadata.confidence;
    }

    for key in merge_bags(&mut survivor.metadata.extra, &second.metadata.extra) {
        notes.push(format!(
            "relationship {}: merged metadata key '{key}'",
            survivor.id
        ));
    }
}

/// Copy an edge into the merged graph if it clears the strength floor and
/// both endpoints survived node selection; otherwise drop it silently
fn copy_relationship(graph: &mut KnowledgeGraph, edge: &GraphRelationship, min_strength: f32) -> bool {
    if edge.strength < min_strength {
        return false;
    }
    graph.add_relationship(edge.clone())
}

fn describe_resolution(options: &MergeOptions, conflicts: usize) -> String {
    let metadata = if options.merge_node_metadata || options.merge_relationship_metadata {
        "metadata reconciled on colliding ids"
    } else {
        "colliding ids kept unchanged"
    };

    match &options.strategy {
        MergeStrategy::Union => format!("union kept every element; {metadata}"),
        MergeStrategy::Intersection => {
            format!("intersection kept ids present in both inputs; {metadata}")
        }
        MergeStrategy::FirstPriority => format!(
            "first graph took priority on {conflicts} conflicting id(s); {metadata}"
        ),
        MergeStrategy::SecondPriority => format!(
            "second graph took priority on {conflicts} conflicting id(s); {metadata}"
        ),
        MergeStrategy::Custom(_) => {
            format!("custom merge function resolved {conflicts} overlapping id(s)")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::graph::item::{Knowledge, KnowledgeType};
    use crate::domain::graph::metadata::MetaValue;

    // Content shares three long tokens across nodes and keeps one unique,
    // so distinct nodes score (1.0 + 0.6) / 2 = 0.8 without a project
    // context.
    fn node(id: &str, project: &str) -> GraphNode {
        GraphNode::from_knowledge(
            Knowledge::new(id, KnowledgeType::Pattern, project)
                .with_id(id)
                .with_content(format!("notes about topic {id}{id}{id}")),
        )
    }

    fn graph(name: &str, nodes: &[GraphNode]) -> KnowledgeGraph {
        let mut graph = KnowledgeGraph::new(name);
        for node in nodes {
            graph.add_node(node.clone());
        }
        graph
    }

    fn edge(id: &str, source: &str, target: &str) -> GraphRelationship {
        GraphRelationship::new(source, target, RelationshipType::Related)
            .with_id(id)
            .with_strength(0.8)
    }

    #[test]
    fn test_union_keeps_everything() {
        let mut a = graph("a", &[node("n1", "p1"), node("n2", "p1")]);
        a.add_relationship(edge("r1", "n1", "n2"));
        let b = graph("b", &[node("n3", "p2")]);

        let outcome = GraphMerger::new()
            .merge_graphs(&a, &b, &MergeOptions::new(MergeStrategy::Union))
            .unwrap();

        assert_eq!(outcome.graph.node_count(), 3);
        assert_eq!(outcome.graph.relationship_count(), 1);
        assert_eq!(outcome.stats.conflicts, 0);
        assert_eq!(outcome.stats.nodes_from_first, 2);
        assert_eq!(outcome.stats.nodes_from_second, 1);
    }

    #[test]
    fn test_union_reconciles_importance_to_max() {
        let a = graph("a", &[node("n1", "p1").with_importance(0.4), node("n2", "p1")]);
        let b = graph("b", &[node("n1", "p1").with_importance(0.7), node("n3", "p2")]);

        let outcome = GraphMerger::new()
            .merge_graphs(&a, &b, &MergeOptions::new(MergeStrategy::Union))
            .unwrap();

        assert_eq!(outcome.graph.node_count(), 3);
        assert_eq!(outcome.graph.node("n1").map(|n| n.importance), Some(0.7));
        assert!(outcome.notes.iter().any(|note| note.contains("importance")));
    }

    #[test]
    fn test_union_without_metadata_merge_keeps_first() {
        let a = graph("a", &[node("n1", "p1").with_importance(0.4)]);
        let b = graph("b", &[node("n1", "p1").with_importance(0.7)]);
        let options = MergeOptions::new(MergeStrategy::Union).with_node_metadata(false);

        let outcome = GraphMerger::new().merge_graphs(&a, &b, &options).unwrap();

        assert_eq!(outcome.graph.node("n1").map(|n| n.importance), Some(0.4));
    }

    #[test]
    fn test_union_is_idempotent() {
        let mut a = graph(
            "a",
            &[
                node("n1", "p1").with_community("core"),
                node("n2", "p1").with_importance(0.8),
            ],
        );
        a.add_relationship(edge("r1", "n1", "n2"));

        let outcome = GraphMerger::new()
            .merge_graphs(&a, &a, &MergeOptions::new(MergeStrategy::Union))
            .unwrap();

        let node_ids: Vec<_> = outcome.graph.nodes.keys().cloned().collect();
        let rel_ids: Vec<_> = outcome.graph.relationships.keys().cloned().collect();
        assert_eq!(node_ids, a.nodes.keys().cloned().collect::<Vec<_>>());
        assert_eq!(rel_ids, a.relationships.keys().cloned().collect::<Vec<_>>());

        // No distinct second values exist, so metadata is unchanged too.
        assert_eq!(
            outcome.graph.node("n1").and_then(|n| n.community.clone()),
            Some("core".to_string())
        );
        assert_eq!(outcome.graph.node("n2").map(|n| n.importance), Some(0.8));
    }

    #[test]
    fn test_union_and_intersection_are_commutative() {
        let mut a = graph("a", &[node("n1", "p1"), node("n2", "p1")]);
        a.add_relationship(edge("r1", "n1", "n2"));
        let mut b = graph("b", &[node("n2", "p2"), node("n3", "p2")]);
        b.add_relationship(edge("r2", "n2", "n3"));

        for strategy in [MergeStrategy::Union, MergeStrategy::Intersection] {
            let forward = GraphMerger::new()
                .merge_graphs(&a, &b, &MergeOptions::new(strategy.clone()))
                .unwrap();
            let backward = GraphMerger::new()
                .merge_graphs(&b, &a, &MergeOptions::new(strategy))
                .unwrap();

            assert_eq!(
                forward.graph.nodes.keys().collect::<Vec<_>>(),
                backward.graph.nodes.keys().collect::<Vec<_>>()
            );
            assert_eq!(
                forward.graph.relationships.keys().collect::<Vec<_>>(),
                backward.graph.relationships.keys().collect::<Vec<_>>()
            );
        }
    }

    #[test]
    fn test_intersection_keeps_only_shared_ids() {
        let mut a = graph("a", &[node("n1", "p1"), node("n2", "p1"), node("n4", "p1")]);
        a.add_relationship(edge("r1", "n1", "n2"));
        a.add_relationship(edge("r2", "n1", "n4"));
        let mut b = graph("b", &[node("n1", "p2"), node("n2", "p2"), node("n5", "p2")]);
        b.add_relationship(edge("r1", "n1", "n2"));

        let outcome = GraphMerger::new()
            .merge_graphs(&a, &b, &MergeOptions::new(MergeStrategy::Intersection))
            .unwrap();

        assert_eq!(
            outcome.graph.nodes.keys().collect::<Vec<_>>(),
            vec!["n1", "n2"]
        );
        assert_eq!(
            outcome.graph.relationships.keys().collect::<Vec<_>>(),
            vec!["r1"]
        );
        assert_eq!(outcome.stats.conflicts, 0);
    }

    #[test]
    fn test_intersection_payload_comes_from_first() {
        let a = graph("a", &[node("n1", "p1")]);
        let b = graph("b", &[node("n1", "p2")]);

        let outcome = GraphMerger::new()
            .merge_graphs(&a, &b, &MergeOptions::new(MergeStrategy::Intersection))
            .unwrap();

        assert_eq!(
            outcome.graph.node("n1").map(|n| n.source_project_id().to_string()),
            Some("p1".to_string())
        );
    }

    #[test]
    fn test_priority_strategies_are_not_commutative() {
        let a = graph("a", &[node("n1", "p1")]);
        let b = graph("b", &[node("n1", "p2")]);

        let first = GraphMerger::new()
            .merge_graphs(&a, &b, &MergeOptions::new(MergeStrategy::FirstPriority))
            .unwrap();
        let swapped = GraphMerger::new()
            .merge_graphs(&b, &a, &MergeOptions::new(MergeStrategy::FirstPriority))
            .unwrap();

        assert_eq!(
            first.graph.node("n1").map(|n| n.source_project_id().to_string()),
            Some("p1".to_string())
        );
        assert_eq!(
            swapped.graph.node("n1").map(|n| n.source_project_id().to_string()),
            Some("p2".to_string())
        );
        assert_eq!(first.stats.conflicts, 1);
        assert_eq!(swapped.stats.conflicts, 1);
    }

    #[test]
    fn test_second_priority_keeps_second_payload() {
        let a = graph("a", &[node("n1", "p1")]);
        let b = graph("b", &[node("n1", "p2"), node("n2", "p2")]);

        let outcome = GraphMerger::new()
            .merge_graphs(&a, &b, &MergeOptions::new(MergeStrategy::SecondPriority))
            .unwrap();

        assert_eq!(outcome.graph.node_count(), 2);
        assert_eq!(
            outcome.graph.node("n1").map(|n| n.source_project_id().to_string()),
            Some("p2".to_string())
        );
        assert_eq!(outcome.stats.conflicts, 1);
        assert!(outcome.stats.conflict_resolution.contains("second"));
    }

    #[test]
    fn test_priority_conflict_reconciles_metadata_but_not_payload() {
        let a = graph("a", &[node("n1", "p1").with_importance(0.3)]);
        let mut b_node = node("n1", "p2").with_importance(0.9);
        b_node.extra.insert("origin".to_string(), MetaValue::Text("b".to_string()));
        let b = graph("b", &[b_node]);

        let outcome = GraphMerger::new()
            .merge_graphs(&a, &b, &MergeOptions::new(MergeStrategy::FirstPriority))
            .unwrap();

        let survivor = outcome.graph.node("n1").unwrap();
        // Payload stays from the priority side, metadata reconciles.
        assert_eq!(survivor.source_project_id(), "p1");
        assert_eq!(survivor.importance, 0.9);
        assert_eq!(
            survivor.extra.get("origin"),
            Some(&MetaValue::Text("b".to_string()))
        );
    }

    #[test]
    fn test_priority_keeps_edge_strength_verbatim() {
        let mut a = graph("a", &[node("n1", "p1"), node("n2", "p1")]);
        a.add_relationship(edge("r1", "n1", "n2").with_strength(0.5).with_confidence(0.4));
        let mut b = graph("b", &[node("n1", "p2"), node("n2", "p2")]);
        b.add_relationship(edge("r1", "n1", "n2").with_strength(0.9).with_confidence(0.8));

        let outcome = GraphMerger::new()
            .merge_graphs(&a, &b, &MergeOptions::new(MergeStrategy::FirstPriority))
            .unwrap();

        let survivor = outcome.graph.relationship("r1").unwrap();
        // Strength is core payload under priority; confidence reconciles.
        assert_eq!(survivor.strength, 0.5);
        assert_eq!(survivor.metadata.confidence, 0.8);
    }

    #[test]
    fn test_union_collision_maxes_strength() {
        let mut a = graph("a", &[node("n1", "p1"), node("n2", "p1")]);
        a.add_relationship(edge("r1", "n1", "n2").with_strength(0.5));
        let mut b = graph("b", &[node("n1", "p2"), node("n2", "p2")]);
        b.add_relationship(edge("r1", "n1", "n2").with_strength(0.9));

        let outcome = GraphMerger::new()
            .merge_graphs(&a, &b, &MergeOptions::new(MergeStrategy::Union))
            .unwrap();

        assert_eq!(
            outcome.graph.relationship("r1").map(|r| r.strength),
            Some(0.9)
        );
    }

    #[test]
    fn test_dangling_relationships_are_pruned() {
        // Both graphs carry relationship r1, but its surviving copy points
        // at n2, which intersection removes. The edge is dropped silently.
        let mut a = graph("a", &[node("n1", "p1"), node("n2", "p1")]);
        a.add_relationship(edge("r1", "n1", "n2"));
        let mut b = graph("b", &[node("n1", "p2"), node("n9", "p2")]);
        b.add_relationship(edge("r1", "n1", "n9"));

        let union = GraphMerger::new()
            .merge_graphs(&a, &b, &MergeOptions::new(MergeStrategy::Union))
            .unwrap();

        // All nodes survive under union; the colliding edge id resolves to
        // one surviving copy.
        assert_eq!(union.graph.node_count(), 3);
        assert_eq!(union.graph.relationship_count(), 1);

        let intersection = GraphMerger::new()
            .merge_graphs(&a, &b, &MergeOptions::new(MergeStrategy::Intersection))
            .unwrap();

        assert_eq!(intersection.graph.nodes.keys().collect::<Vec<_>>(), vec!["n1"]);
        assert_eq!(intersection.graph.relationship_count(), 0);
    }

    #[test]
    fn test_min_strength_filters_copied_edges() {
        let mut a = graph("a", &[node("n1", "p1"), node("n2", "p1")]);
        a.add_relationship(edge("r1", "n1", "n2").with_strength(0.3));
        a.add_relationship(edge("r2", "n1", "n2").with_strength(0.9));
        let b = graph("b", &[]);

        let options = MergeOptions::new(MergeStrategy::Union).with_min_strength(0.5);
        let outcome = GraphMerger::new().merge_graphs(&a, &b, &options).unwrap();

        assert_eq!(
            outcome.graph.relationships.keys().collect::<Vec<_>>(),
            vec!["r2"]
        );
    }

    #[test]
    fn test_invalid_options_rejected_upfront() {
        let a = graph("a", &[]);
        let b = graph("b", &[]);
        let options = MergeOptions::new(MergeStrategy::Union).with_min_strength(1.5);

        let result = GraphMerger::new().merge_graphs(&a, &b, &options);
        assert!(matches!(result, Err(Error::InvalidOptions(_))));
    }

    #[test]
    fn test_unknown_strategy_name_rejected() {
        assert!(matches!(
            MergeStrategy::parse("fuse"),
            Err(Error::UnknownStrategy(_))
        ));
        assert!(matches!(MergeStrategy::parse("union"), Ok(MergeStrategy::Union)));
        assert!(matches!(
            MergeStrategy::parse("custom"),
            Err(Error::UnknownStrategy(_))
        ));
    }

    #[test]
    fn test_custom_strategy_delegates_and_reports() {
        let a = graph("a", &[node("n1", "p1")]);
        let b = graph("b", &[node("n1", "p2"), node("n2", "p2")]);

        let merge_fn: CustomMergeFn = Arc::new(|first, _second| {
            let mut merged = KnowledgeGraph::new("custom");
            for node in first.nodes.values() {
                merged.add_node(node.clone());
            }
            Ok(merged)
        });

        let outcome = GraphMerger::new()
            .merge_graphs(&a, &b, &MergeOptions::new(MergeStrategy::Custom(merge_fn)))
            .unwrap();

        assert_eq!(outcome.graph.node_count(), 1);
        assert_eq!(outcome.stats.nodes_from_first, 1);
        assert_eq!(outcome.stats.nodes_from_second, 1);
        assert_eq!(outcome.stats.conflicts, 1);
        assert!(outcome.stats.conflict_resolution.contains("custom"));
    }

    #[test]
    fn test_custom_strategy_errors_propagate() {
        let a = graph("a", &[]);
        let b = graph("b", &[]);
        let merge_fn: CustomMergeFn =
            Arc::new(|_, _| Err(Error::Other("deliberate failure".to_string())));

        let result =
            GraphMerger::new().merge_graphs(&a, &b, &MergeOptions::new(MergeStrategy::Custom(merge_fn)));

        match result {
            Err(Error::Other(message)) => assert_eq!(message, "deliberate failure"),
            other => panic!("expected custom error, got {other:?}"),
        }
    }

    #[test]
    fn test_cross_graph_discovery() {
        let a = graph("a", &[node("n1", "p1")]);
        let b = graph("b", &[node("n2", "p2")]);

        let options =
            MergeOptions::new(MergeStrategy::Union).with_cross_graph_discovery(0.5);
        let outcome = GraphMerger::new().merge_graphs(&a, &b, &options).unwrap();

        // Same type, overlapping content; (1.0 + 0.6) / 2 = 0.8 meets the bar.
        assert_eq!(outcome.stats.new_cross_graph_relationships, 1);
        let edge = outcome.graph.relationships.values().next().unwrap();
        assert_eq!(edge.relationship_type, RelationshipType::SimilarTo);
        assert_eq!(edge.metadata.created_by, "graph-merger");
        assert!(outcome.notes.iter().any(|note| note.contains("cross-graph")));
    }

    #[test]
    fn test_cross_graph_skips_same_project_pairs() {
        let a = graph("a", &[node("n1", "p1")]);
        let b = graph("b", &[node("n2", "p1")]);

        let options =
            MergeOptions::new(MergeStrategy::Union).with_cross_graph_discovery(0.0);
        let outcome = GraphMerger::new().merge_graphs(&a, &b, &options).unwrap();

        assert_eq!(outcome.stats.new_cross_graph_relationships, 0);
    }

    #[test]
    fn test_cross_graph_unreachable_threshold() {
        let a = graph("a", &[node("n1", "p1")]);
        let b = graph("b", &[node("n2", "p2")]);

        let options =
            MergeOptions::new(MergeStrategy::Union).with_cross_graph_discovery(0.99);
        let outcome = GraphMerger::new().merge_graphs(&a, &b, &options).unwrap();

        assert_eq!(outcome.stats.new_cross_graph_relationships, 0);
        assert_eq!(outcome.graph.relationship_count(), 0);
    }

    #[test]
    fn test_cross_graph_cap_respected() {
        let a = graph(
            "a",
            &[node("a1", "p1"), node("a2", "p1"), node("a3", "p1")],
        );
        let b = graph(
            "b",
            &[node("b1", "p2"), node("b2", "p2"), node("b3", "p2")],
        );

        let options = MergeOptions::new(MergeStrategy::Union)
            .with_cross_graph_discovery(0.4)
            .with_max_cross_graph(2);
        let outcome = GraphMerger::new().merge_graphs(&a, &b, &options).unwrap();

        assert_eq!(outcome.stats.new_cross_graph_relationships, 2);
    }

    #[test]
    fn test_comparison_budget_respected() {
        let a = graph(
            "a",
            &[node("a1", "p1"), node("a2", "p1"), node("a3", "p1")],
        );
        let b = graph(
            "b",
            &[node("b1", "p2"), node("b2", "p2"), node("b3", "p2")],
        );

        let options = MergeOptions::new(MergeStrategy::Union)
            .with_cross_graph_discovery(0.0)
            .with_comparison_budget(1);
        let outcome = GraphMerger::new().merge_graphs(&a, &b, &options).unwrap();

        assert_eq!(outcome.stats.new_cross_graph_relationships, 1);
    }

    #[test]
    fn test_inputs_are_untouched() {
        let a = graph("a", &[node("n1", "p1")]);
        let b = graph("b", &[node("n1", "p2"), node("n2", "p2")]);
        let a_before = a.nodes.keys().cloned().collect::<Vec<_>>();

        let _ = GraphMerger::new()
            .merge_graphs(&a, &b, &MergeOptions::new(MergeStrategy::SecondPriority))
            .unwrap();

        assert_eq!(a.nodes.keys().cloned().collect::<Vec<_>>(), a_before);
        assert_eq!(a.node("n1").map(|n| n.source_project_id().to_string()), Some("p1".to_string()));
        assert_eq!(b.node_count(), 2);

        // Originals remain usable in further merges.
        let again = GraphMerger::new()
            .merge_graphs(&a, &b, &MergeOptions::new(MergeStrategy::Union))
            .unwrap();
        assert_eq!(again.graph.node_count(), 2);
    }
}
