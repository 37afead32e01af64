//! Summary statistics for the case panel
//!
//! Computed over the non-reference cases of a graph. Aggregates that have no
//! meaning for an empty set render as [`PLACEHOLDER`].

use std::fmt;

use serde::Serialize;

use crate::config::StatsConfig;
use crate::graph::{CaseGraph, GraphNode};
use crate::render::truncate_label;

/// Shown in place of aggregates over an empty set
pub const PLACEHOLDER: &str = "—";

/// Characters of the most relevant case name shown in the panel
const MOST_RELEVANT_CHARS: usize = 20;

/// The case with the highest similarity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MostRelevant {
    pub id: String,
    pub name: String,
    pub similarity: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseStats {
    pub total: usize,
    /// Cases decided in or after `recent_since`
    pub recent: usize,
    pub recent_since: i32,
    pub average_similarity: Option<f64>,
    pub highest_similarity: Option<f32>,
    pub year_range: Option<(i32, i32)>,
    pub most_relevant: Option<MostRelevant>,
}

fn percent(value: f64) -> String {
    format!("{}%", (value * 100.0).round() as i64)
}

impl CaseStats {
    pub fn from_graph(graph: &CaseGraph, config: &StatsConfig) -> Self {
        let cases: Vec<_> = graph.nodes.iter().filter(|n| !n.is_reference).collect();

        let total = cases.len();
        let recent = cases
            .iter()
            .filter(|n| n.year >= config.recent_since_year)
            .count();
        let average_similarity = (total > 0)
            .then(|| cases.iter().map(|n| n.weight as f64).sum::<f64>() / total as f64);

        // Ties keep the earliest case
        let mut most_relevant: Option<&GraphNode> = None;
        for &node in &cases {
            if most_relevant.is_none_or(|best| node.weight > best.weight) {
                most_relevant = Some(node);
            }
        }

        let year_range = cases
            .iter()
            .map(|n| n.year)
            .min()
            .zip(cases.iter().map(|n| n.year).max());

        Self {
            total,
            recent,
            recent_since: config.recent_since_year,
            average_similarity,
            highest_similarity: most_relevant.map(|n| n.weight),
            year_range,
            most_relevant: most_relevant.map(|n| MostRelevant {
                id: n.id.clone(),
                name: n.label.clone(),
                similarity: n.weight,
            }),
        }
    }

    pub fn average_label(&self) -> String {
        self.average_similarity
            .map_or_else(|| PLACEHOLDER.to_string(), percent)
    }

    pub fn highest_label(&self) -> String {
        self.highest_similarity
            .map_or_else(|| PLACEHOLDER.to_string(), |v| percent(v as f64))
    }

    pub fn year_range_label(&self) -> String {
        match self.year_range {
            Some((start, end)) => format!("{start} - {end}"),
            None => PLACEHOLDER.to_string(),
        }
    }

    /// Number of calendar years covered, inclusive
    pub fn year_span(&self) -> Option<i32> {
        self.year_range.map(|(start, end)| end - start + 1)
    }

    pub fn most_relevant_label(&self) -> String {
        match &self.most_relevant {
            Some(case) => truncate_label(&case.name, MOST_RELEVANT_CHARS),
            None => PLACEHOLDER.to_string(),
        }
    }
}

impl fmt::Display for CaseStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Total Cases:      {} ({} since {})",
            self.total, self.recent, self.recent_since
        )?;
        writeln!(
            f,
            "Similarity Score: {} (highest {})",
            self.average_label(),
            self.highest_label()
        )?;
        match self.year_span() {
            Some(span) => writeln!(
                f,
                "Year Range:       {} ({span} years span)",
                self.year_range_label()
            )?,
            None => writeln!(f, "Year Range:       {}", self.year_range_label())?,
        }
        match &self.most_relevant {
            Some(case) => write!(
                f,
                "Most Relevant:    {} ({} similar)",
                self.most_relevant_label(),
                percent(case.similarity as f64)
            ),
            None => write!(f, "Most Relevant:    {}", PLACEHOLDER),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::CaseRecord;

    fn stats_for(records: &[CaseRecord]) -> CaseStats {
        CaseStats::from_graph(&CaseGraph::from_records(records), &StatsConfig::default())
    }

    #[test]
    fn two_case_summary() {
        let stats = stats_for(&[
            CaseRecord::new("A", 2015, 0.9)
                .with_name("Valuation of Digital Assets on Death")
                .with_related(["B"]),
            CaseRecord::new("B", 2023, 0.5).with_name("Staking Rewards"),
        ]);

        assert_eq!(stats.total, 2);
        assert_eq!(stats.recent, 1);
        assert_eq!(stats.average_label(), "70%");
        assert_eq!(stats.highest_label(), "90%");
        assert_eq!(stats.year_range, Some((2015, 2023)));
        assert_eq!(stats.year_span(), Some(9));
        assert_eq!(stats.most_relevant.as_ref().map(|c| c.id.as_str()), Some("A"));

        insta::assert_snapshot!(stats.to_string(), @r"
        Total Cases:      2 (1 since 2020)
        Similarity Score: 70% (highest 90%)
        Year Range:       2015 - 2023 (9 years span)
        Most Relevant:    Valuation of Digital... (90% similar)
        ");
    }

    #[test]
    fn empty_set_uses_placeholders() {
        let stats = stats_for(&[]);

        assert_eq!(stats.total, 0);
        assert_eq!(stats.average_label(), PLACEHOLDER);
        assert_eq!(stats.highest_label(), PLACEHOLDER);
        assert_eq!(stats.year_range_label(), PLACEHOLDER);
        assert_eq!(stats.most_relevant_label(), PLACEHOLDER);

        insta::assert_snapshot!(stats.to_string(), @r"
        Total Cases:      0 (0 since 2020)
        Similarity Score: — (highest —)
        Year Range:       —
        Most Relevant:    —
        ");
    }

    #[test]
    fn reference_case_is_excluded() {
        let stats = stats_for(&[
            CaseRecord::new("REF", 2024, 1.0).as_reference(),
            CaseRecord::new("A", 2019, 0.4),
        ]);

        assert_eq!(stats.total, 1);
        assert_eq!(stats.recent, 0);
        assert_eq!(stats.highest_label(), "40%");
        assert_eq!(stats.year_range, Some((2019, 2019)));
    }

    #[test]
    fn ties_keep_first_case() {
        let stats = stats_for(&[
            CaseRecord::new("A", 2019, 0.8),
            CaseRecord::new("B", 2020, 0.8),
        ]);
        assert_eq!(stats.most_relevant.map(|c| c.id), Some("A".to_string()));
    }

    #[test]
    fn recent_threshold_is_configurable() {
        let graph = CaseGraph::from_records(&[
            CaseRecord::new("A", 2019, 0.8),
            CaseRecord::new("B", 2022, 0.6),
        ]);
        let stats = CaseStats::from_graph(
            &graph,
            &StatsConfig {
                recent_since_year: 2023,
            },
        );
        assert_eq!(stats.recent, 0);
    }
}
