//! Error types
//!
//! `GraphError` covers the operations that can fail outright (loading case
//! files, parsing configuration, exporting). `GraphIssue` describes problems
//! in the case data that are recovered locally: the offending record or edge
//! is dropped and the layout continues with the valid subset.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when loading inputs or producing outputs
#[derive(Error, Debug)]
pub enum GraphError {
    /// Reading or writing a file failed
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Case records were not valid JSON
    #[error("invalid case data: {0}")]
    Cases(#[from] serde_json::Error),

    /// The configuration file could not be parsed
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_yaml::Error),

    /// A colour string in the configuration was not `#rrggbb`
    #[error("invalid colour '{0}', expected #rrggbb")]
    InvalidColor(String),

    /// A configuration value is outside its valid range
    #[error("invalid configuration value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    /// Rendering the SVG template failed
    #[error("render error: {0}")]
    Render(#[from] askama::Error),
}

impl GraphError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for fallible casegraph operations
pub type GraphResult<T> = Result<T, GraphError>;

/// A data problem that was recovered while building the graph
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphIssue {
    /// A second record used an id that was already taken; it was dropped
    #[error("duplicate case id '{0}', later record dropped")]
    DuplicateId(String),

    /// A related id does not name any case in the set; the edge was dropped
    #[error("case '{source_id}' relates to unknown case '{target_id}', edge dropped")]
    UnknownRelated {
        source_id: String,
        target_id: String,
    },

    /// A case listed itself as related; the edge was dropped
    #[error("case '{0}' relates to itself, edge dropped")]
    SelfReference(String),

    /// More than one record was flagged as the reference case
    #[error("case '{0}' is an additional reference case, treated as a regular case")]
    ExtraReference(String),

    /// A similarity score was outside [0, 1] or not a number
    #[error("case '{id}' has similarity score {score}, clamped to {clamped}")]
    WeightOutOfRange { id: String, score: f32, clamped: f32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_messages_name_the_case() {
        let issue = GraphIssue::UnknownRelated {
            source_id: "2015-4889".to_string(),
            target_id: "1999-0000".to_string(),
        };
        let msg = issue.to_string();
        assert!(msg.contains("2015-4889"));
        assert!(msg.contains("1999-0000"));
    }

    #[test]
    fn io_error_includes_path() {
        let err = GraphError::io(
            "cases.json",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert!(err.to_string().contains("cases.json"));
    }
}
