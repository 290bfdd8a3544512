//! Similarity scoring for knowledge nodes
//!
//! Two scores back every inference the builder and merger make:
//!
//! - [`SimilarityEngine::text_similarity`]: token-set Jaccard overlap of two
//!   strings. Pure and deterministic, so callers can cache or property-test
//!   it in isolation.
//! - [`SimilarityEngine::node_similarity`]: the average of whichever
//!   factors apply to a node pair: type match, tag overlap, content
//!   similarity, and (when a [`ProjectContext`] is configured and resolves
//!   both sides) project affinity.

use std::collections::BTreeSet;
use std::sync::Arc;

use super::node::GraphNode;
use super::store::ProjectContext;

/// Score for two nodes harvested from the same project.
const SAME_PROJECT_AFFINITY: f32 = 0.8;
/// Score for different projects that declare a common language.
const SHARED_LANGUAGE_AFFINITY: f32 = 0.4;
/// Floor for resolvable but unrelated projects.
const DISTINCT_PROJECT_AFFINITY: f32 = 0.1;

/// Score contribution for matching knowledge types.
const TYPE_MATCH_SCORE: f32 = 1.0;
/// Score contribution for differing knowledge types.
const TYPE_MISMATCH_SCORE: f32 = 0.2;

/// Tokens this short carry no signal and are discarded.
const MIN_TOKEN_LENGTH: usize = 4;

/// Computes text and node similarity scores
///
/// Cheap to clone; the only state is an optional shared [`ProjectContext`].
#[derive(Clone, Default)]
pub struct SimilarityEngine {
    projects: Option<Arc<dyn ProjectContext>>,
}

impl SimilarityEngine {
    /// Create an engine without project lookups
    ///
    /// The project-affinity factor never applies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine backed by a project context
    pub fn with_project_context(projects: Arc<dyn ProjectContext>) -> Self {
        Self {
            projects: Some(projects),
        }
    }

    /// Token-set similarity of two strings, in [0, 1]
    ///
    /// Lowercases, strips non-word characters to whitespace, discards tokens
    /// shorter than four characters, and returns |intersection| / |union| of
    /// the resulting token sets. 0.0 when the union is empty.
    pub fn text_similarity(a: &str, b: &str) -> f32 {
        let first = token_set(a);
        let second = token_set(b);

        let union = first.union(&second).count();
        if union == 0 {
            return 0.0;
        }

        let common = first.intersection(&second).count();
        common as f32 / union as f32
    }

    /// Similarity of two nodes, in [0, 1]
    ///
    /// Averages the factors that apply to this pair; a factor that does not
    /// apply (no tags, unresolvable projects) is left out of the divisor
    /// rather than counted as zero. Returns 0.0 if no factor applied.
    pub fn node_similarity(&self, first: &GraphNode, second: &GraphNode) -> f32 {
        let mut total = 0.0_f32;
        let mut factors = 0_u32;

        // Type match always applies.
        total += if first.knowledge.knowledge_type == second.knowledge.knowledge_type {
            TYPE_MATCH_SCORE
        } else {
            TYPE_MISMATCH_SCORE
        };
        factors += 1;

        // Tag overlap applies only when both sides are tagged.
        let first_tags = &first.knowledge.tags;
        let second_tags = &second.knowledge.tags;
        if !first_tags.is_empty() && !second_tags.is_empty() {
            let common = first_tags.intersection(second_tags).count();
            total += common as f32 / first_tags.len().max(second_tags.len()) as f32;
            factors += 1;
        }

        // Content similarity always applies.
        total += Self::text_similarity(&first.knowledge.content, &second.knowledge.content);
        factors += 1;

        // Project affinity applies only when both projects resolve.
        if let Some(projects) = &self.projects {
            let first_profile = projects.project(first.source_project_id());
            let second_profile = projects.project(second.source_project_id());
            if let (Some(first_profile), Some(second_profile)) = (first_profile, second_profile) {
                total += if first_profile.id == second_profile.id {
                    SAME_PROJECT_AFFINITY
                } else if first_profile.shares_language(&second_profile) {
                    SHARED_LANGUAGE_AFFINITY
                } else {
                    DISTINCT_PROJECT_AFFINITY
                };
                factors += 1;
            }
        }

        if factors == 0 {
            return 0.0;
        }
        (total / factors as f32).clamp(0.0, 1.0)
    }
}

impl std::fmt::Debug for SimilarityEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimilarityEngine")
            .field("has_project_context", &self.projects.is_some())
            .finish()
    }
}

fn token_set(text: &str) -> BTreeSet<String> {
    let normalized: String = text
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { ' ' })
        .collect();

    normalized
        .split_whitespace()
        .filter(|token| token.len() >= MIN_TOKEN_LENGTH)
        .map(str::to_string)
        .collect()
}
