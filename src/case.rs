//! Case records as supplied by the host application
//!
//! Records arrive as a JSON array (camelCase keys, matching the front end's
//! data source). The engine only checks structural well-formedness; see
//! [`crate::graph::CaseGraph`] for how malformed records are recovered.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, GraphResult};

/// Bundled sample corpus used when no input is supplied
const SAMPLE_CASES: &str = include_str!("../data/sample_cases.json");

/// A single legal case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseRecord {
    /// Unique identifier (e.g., "2021-9012")
    pub id: String,

    /// Case name, shown as the node label
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Decision year, drives the node colour
    pub year: i32,

    /// Similarity to the reference case in [0, 1]
    pub similarity_score: f32,

    /// Ids of related cases (one edge per entry)
    #[serde(default)]
    pub related_cases: Vec<String>,

    /// Marks the case currently being researched
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_reference: bool,
}

impl CaseRecord {
    /// Create a record with no name or description
    pub fn new(id: impl Into<String>, year: i32, similarity_score: f32) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            description: String::new(),
            year,
            similarity_score,
            related_cases: Vec::new(),
            is_reference: false,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_related<I, S>(mut self, related: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.related_cases = related.into_iter().map(Into::into).collect();
        self
    }

    pub fn as_reference(mut self) -> Self {
        self.is_reference = true;
        self
    }

    /// Label text: the name, or the id when the name is empty
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.id
        } else {
            &self.name
        }
    }

    /// Case-insensitive substring match over name, description and id
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.name.to_lowercase().contains(&query)
            || self.description.to_lowercase().contains(&query)
            || self.id.to_lowercase().contains(&query)
    }
}

/// Parse a JSON array of case records
pub fn parse_cases(json: &str) -> GraphResult<Vec<CaseRecord>> {
    Ok(serde_json::from_str(json)?)
}

/// Load case records from a JSON file
pub fn load_cases(path: &Path) -> GraphResult<Vec<CaseRecord>> {
    let json = std::fs::read_to_string(path).map_err(|e| GraphError::io(path, e))?;
    let cases = parse_cases(&json)?;
    tracing::debug!(path = %path.display(), count = cases.len(), "loaded cases");
    Ok(cases)
}

/// The bundled sample corpus
pub fn sample_cases() -> Vec<CaseRecord> {
    // The fixture is checked by `sample_corpus_parses`.
    parse_cases(SAMPLE_CASES).unwrap_or_default()
}

/// Filter a corpus by search query; an empty query keeps everything
pub fn filter_cases(cases: &[CaseRecord], query: &str) -> Vec<CaseRecord> {
    let query = query.trim();
    let filtered: Vec<CaseRecord> = if query.is_empty() {
        cases.to_vec()
    } else {
        cases.iter().filter(|c| c.matches(query)).cloned().collect()
    };
    tracing::debug!(
        query,
        matched = filtered.len(),
        total = cases.len(),
        "filtered cases"
    );
    filtered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_corpus_parses() {
        let cases = parse_cases(SAMPLE_CASES).unwrap();
        assert_eq!(cases.len(), 14);
        assert_eq!(cases.iter().filter(|c| c.is_reference).count(), 1);
        assert_eq!(sample_cases(), cases);
    }

    #[test]
    fn parses_camel_case_with_defaults() {
        let cases = parse_cases(
            r#"[{"id": "A", "year": 2015, "similarityScore": 0.9, "relatedCases": ["B"]},
                {"id": "B", "year": 2023, "similarityScore": 0.5, "isReference": true}]"#,
        )
        .unwrap();

        assert_eq!(cases[0].related_cases, vec!["B".to_string()]);
        assert!(!cases[0].is_reference);
        assert!(cases[1].related_cases.is_empty());
        assert!(cases[1].is_reference);
        assert_eq!(cases[1].name, "");
    }

    #[test]
    fn rejects_missing_year() {
        let err = parse_cases(r#"[{"id": "A", "similarityScore": 0.9}]"#).unwrap_err();
        assert!(matches!(err, GraphError::Cases(_)));
    }

    #[test]
    fn display_name_falls_back_to_id() {
        let case = CaseRecord::new("2015-4889", 2015, 0.85);
        assert_eq!(case.display_name(), "2015-4889");
        let case = case.with_name("ABC Company v. Commissioner");
        assert_eq!(case.display_name(), "ABC Company v. Commissioner");
    }

    #[test]
    fn search_matches_name_description_and_id() {
        let cases = sample_cases();

        let by_id = filter_cases(&cases, "2019-5555");
        assert_eq!(by_id.len(), 1);

        let by_description = filter_cases(&cases, "CRYPTOCURRENCY");
        assert!(by_description.iter().any(|c| c.id == "2021-9012"));

        let by_name = filter_cases(&cases, "non-fungible");
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].id, "2021-7777");
    }

    #[test]
    fn empty_query_keeps_everything() {
        let cases = sample_cases();
        assert_eq!(filter_cases(&cases, "   ").len(), cases.len());
    }

    #[test]
    fn no_match_yields_empty_set() {
        assert!(filter_cases(&sample_cases(), "zzz-no-such-case").is_empty());
    }
}
