//! Graph construction from case records
//!
//! Builds the node set and the derived, index-resolved edge set used by the
//! simulation. Malformed input is recovered here: duplicate records and
//! dangling or self-referencing edges are dropped and reported as
//! [`GraphIssue`]s instead of failing the layout.

use std::collections::{HashMap, HashSet};

use crate::case::CaseRecord;
use crate::error::GraphIssue;

/// A case as seen by the layout engine
#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode {
    pub id: String,
    /// Untruncated display name
    pub label: String,
    pub year: i32,
    /// Similarity score clamped to [0, 1]
    pub weight: f32,
    pub is_reference: bool,
}

/// An undirected edge between two node indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GraphEdge {
    pub source: usize,
    pub target: usize,
}

/// Validated nodes plus derived edges
#[derive(Debug, Clone, Default)]
pub struct CaseGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    /// Problems recovered while building
    pub issues: Vec<GraphIssue>,
    node_id_to_index: HashMap<String, usize>,
}

impl CaseGraph {
    /// Build the graph, dropping whatever cannot be represented
    pub fn from_records(records: &[CaseRecord]) -> Self {
        let mut issues = Vec::new();
        let mut nodes: Vec<GraphNode> = Vec::with_capacity(records.len());
        let mut node_id_to_index = HashMap::with_capacity(records.len());
        // Records that survived deduplication, in node order
        let mut kept: Vec<&CaseRecord> = Vec::with_capacity(records.len());
        let mut has_reference = false;

        for record in records {
            if node_id_to_index.contains_key(&record.id) {
                issues.push(GraphIssue::DuplicateId(record.id.clone()));
                continue;
            }

            let weight = if record.similarity_score.is_nan() {
                0.0
            } else {
                record.similarity_score.clamp(0.0, 1.0)
            };
            if weight != record.similarity_score {
                issues.push(GraphIssue::WeightOutOfRange {
                    id: record.id.clone(),
                    score: record.similarity_score,
                    clamped: weight,
                });
            }

            let is_reference = record.is_reference && !has_reference;
            if record.is_reference && has_reference {
                issues.push(GraphIssue::ExtraReference(record.id.clone()));
            }
            has_reference |= is_reference;

            node_id_to_index.insert(record.id.clone(), nodes.len());
            nodes.push(GraphNode {
                id: record.id.clone(),
                label: record.display_name().to_string(),
                year: record.year,
                weight,
                is_reference,
            });
            kept.push(record);
        }

        let mut edges = Vec::new();
        let mut seen: HashSet<(usize, usize)> = HashSet::new();
        for (source, record) in kept.iter().enumerate() {
            for related in &record.related_cases {
                let Some(&target) = node_id_to_index.get(related) else {
                    issues.push(GraphIssue::UnknownRelated {
                        source_id: record.id.clone(),
                        target_id: related.clone(),
                    });
                    continue;
                };
                if target == source {
                    issues.push(GraphIssue::SelfReference(record.id.clone()));
                    continue;
                }
                // Undirected: A->B and B->A are the same edge
                if seen.insert((source.min(target), source.max(target))) {
                    edges.push(GraphEdge { source, target });
                }
            }
        }

        for issue in &issues {
            tracing::warn!(%issue, "recovered malformed case data");
        }
        tracing::debug!(
            nodes = nodes.len(),
            edges = edges.len(),
            issues = issues.len(),
            "built case graph"
        );

        Self {
            nodes,
            edges,
            issues,
            node_id_to_index,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Index of the node with the given id
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.node_id_to_index.get(id).copied()
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.index_of(id).map(|i| &self.nodes[i])
    }

    /// The distinguished reference node, if any
    pub fn reference(&self) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.is_reference)
    }

    /// Number of edges touching each node
    pub fn degrees(&self) -> Vec<usize> {
        let mut degrees = vec![0; self.nodes.len()];
        for edge in &self.edges {
            degrees[edge.source] += 1;
            degrees[edge.target] += 1;
        }
        degrees
    }

    /// Smallest and largest year in the set
    pub fn year_range(&self) -> Option<(i32, i32)> {
        let min = self.nodes.iter().map(|n| n.year).min()?;
        let max = self.nodes.iter().map(|n| n.year).max()?;
        Some((min, max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_case_records() -> Vec<CaseRecord> {
        vec![
            CaseRecord::new("A", 2015, 0.9).with_related(["B"]),
            CaseRecord::new("B", 2023, 0.5).with_related(["A"]),
        ]
    }

    #[test]
    fn mutual_relations_become_one_edge() {
        let graph = CaseGraph::from_records(&two_case_records());

        assert_eq!(graph.len(), 2);
        assert_eq!(graph.edges, vec![GraphEdge { source: 0, target: 1 }]);
        assert!(graph.issues.is_empty());
    }

    #[test]
    fn unknown_related_id_is_dropped() {
        let records = vec![CaseRecord::new("A", 2015, 0.9).with_related(["missing"])];
        let graph = CaseGraph::from_records(&records);

        assert_eq!(graph.len(), 1);
        assert!(graph.edges.is_empty());
        assert_eq!(
            graph.issues,
            vec![GraphIssue::UnknownRelated {
                source_id: "A".to_string(),
                target_id: "missing".to_string(),
            }]
        );
    }

    #[test]
    fn duplicate_ids_keep_first_record() {
        let records = vec![
            CaseRecord::new("A", 2015, 0.9),
            CaseRecord::new("A", 2020, 0.1).with_related(["A"]),
        ];
        let graph = CaseGraph::from_records(&records);

        assert_eq!(graph.len(), 1);
        assert_eq!(graph.nodes[0].year, 2015);
        assert!(graph.edges.is_empty());
        assert_eq!(graph.issues, vec![GraphIssue::DuplicateId("A".to_string())]);
    }

    #[test]
    fn self_reference_is_dropped() {
        let records = vec![CaseRecord::new("A", 2015, 0.9).with_related(["A"])];
        let graph = CaseGraph::from_records(&records);

        assert!(graph.edges.is_empty());
        assert_eq!(graph.issues, vec![GraphIssue::SelfReference("A".to_string())]);
    }

    #[test]
    fn only_first_reference_is_kept() {
        let records = vec![
            CaseRecord::new("A", 2015, 0.9).as_reference(),
            CaseRecord::new("B", 2016, 0.8).as_reference(),
        ];
        let graph = CaseGraph::from_records(&records);

        assert_eq!(graph.reference().map(|n| n.id.as_str()), Some("A"));
        assert!(!graph.nodes[1].is_reference);
        assert_eq!(graph.issues, vec![GraphIssue::ExtraReference("B".to_string())]);
    }

    #[test]
    fn weight_is_clamped() {
        let records = vec![
            CaseRecord::new("A", 2015, 1.4),
            CaseRecord::new("B", 2016, f32::NAN),
        ];
        let graph = CaseGraph::from_records(&records);

        assert_eq!(graph.nodes[0].weight, 1.0);
        assert_eq!(graph.nodes[1].weight, 0.0);
        assert_eq!(graph.issues.len(), 2);
    }

    #[test]
    fn isolated_nodes_are_kept() {
        let records = vec![CaseRecord::new("A", 2015, 0.9), CaseRecord::new("B", 2016, 0.8)];
        let graph = CaseGraph::from_records(&records);

        assert_eq!(graph.len(), 2);
        assert_eq!(graph.degrees(), vec![0, 0]);
    }

    #[test]
    fn lookups_and_year_range() {
        let graph = CaseGraph::from_records(&two_case_records());

        assert_eq!(graph.index_of("B"), Some(1));
        assert_eq!(graph.node("A").map(|n| n.weight), Some(0.9));
        assert_eq!(graph.year_range(), Some((2015, 2023)));
        assert_eq!(CaseGraph::default().year_range(), None);
    }

    #[test]
    fn sample_corpus_has_no_issues() {
        let graph = CaseGraph::from_records(&crate::case::sample_cases());
        assert!(graph.issues.is_empty(), "{:?}", graph.issues);
        assert_eq!(graph.len(), 14);
    }
}
