//! Error types for loading lineage data and running the layout
//!
//! Load failures are terminal for a load sequence. Missing entities are not
//! errors at all: they are collected as [`MissingEntity`] diagnostics and the
//! offending edge is skipped.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading data or configuring a layout
#[derive(Error, Debug)]
pub enum LineageError {
    /// A data file could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A data file was read but is not valid JSON of the expected shape
    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// The years file contained no games, so no year range exists
    #[error("no games found in {0}")]
    EmptyDataset(PathBuf),

    /// A layout step would have produced a non-finite position; positions
    /// were left as they were before the step
    #[error("layout step {step} produced a non-finite position for '{title}'")]
    NumericDegeneracy { step: usize, title: String },

    /// A configuration value is out of range
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A configuration file could not be parsed
    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_yaml::Error),
}

/// Result type for lineage operations
pub type Result<T> = std::result::Result<T, LineageError>;

/// Which relation list a reference came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    /// Roguelike to roguelike
    SameCategory,
    /// Roguelike to a game outside the genre
    CrossCategory,
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelationKind::SameCategory => f.write_str("same-category"),
            RelationKind::CrossCategory => f.write_str("cross-category"),
        }
    }
}

/// A relation that references a title absent from the known game set
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct MissingEntity {
    /// Title whose relation list holds the reference
    pub from: String,
    /// The unknown title; equal to `from` when the list's owner is unknown
    pub to: String,
    pub kind: RelationKind,
}

impl fmt::Display for MissingEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} relation from '{}' references unknown game '{}'",
            self.kind, self.from, self.to
        )
    }
}
