//! # Error types of the deck pipeline
//!
//! Failures are split by the stage that detects them:
//! - `ParseError`: a reaction equation is structurally malformed
//! - `MissingFieldError`: a required column or row is absent from an input table
//! - `DeckError`: umbrella type returned by assembly, rendering and publishing
//!
//! Parse and missing-field errors are fatal for the deck being assembled. In a sweep they
//! are scoped to one grid point (see `sweep::SweepFailure`).
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Which side of the arrow a term belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Reactants,
    Products,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Reactants => write!(f, "reactant"),
            Side::Products => write!(f, "product"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("no reaction arrow found (expected '→', '->' or '=>')")]
    MissingArrow,
    #[error("{0} reaction arrows found, exactly one is allowed")]
    MultipleArrows(usize),
    #[error("{count} {side} terms, at most 3 are supported")]
    TooManyTerms { side: Side, count: usize },
    #[error("{side} term {position} is empty")]
    EmptyTerm { side: Side, position: usize },
    /// 3 reactants together with 3 products has no layout in the deck format.
    #[error("{reactants} reactants with {products} products has no deck layout")]
    UnsupportedArity { reactants: usize, products: usize },
}

/// A reaction string that could not be turned into a `ParsedReaction`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot parse reaction '{equation}': {kind}")]
pub struct ParseError {
    pub equation: String,
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub fn new(equation: &str, kind: ParseErrorKind) -> Self {
        Self {
            equation: equation.to_string(),
            kind,
        }
    }
}

/// A required column (or a row of it) is absent from an input table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("table '{table}' has {}", missing_part(.column, .row))]
pub struct MissingFieldError {
    pub table: String,
    pub column: String,
    pub row: Option<usize>,
}

fn missing_part(column: &str, row: &Option<usize>) -> String {
    match row {
        Some(row) => format!("no value in column '{}' at row {}", column, row),
        None => format!("no column '{}'", column),
    }
}

#[derive(Debug, Error)]
pub enum DeckError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    MissingField(#[from] MissingFieldError),
    #[error("inconsistent table '{table}': {details}")]
    InconsistentTable { table: String, details: String },
    #[error("failed to render deck: {0}")]
    Render(String),
    #[error("I/O error for {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("task file '{file}': {details}")]
    TaskFile { file: String, details: String },
    #[error("configuration error: {0}")]
    Config(String),
    #[error("failed to build worker pool: {0}")]
    Pool(String),
}

impl DeckError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn inconsistent(table: &str, details: impl Into<String>) -> Self {
        Self::InconsistentTable {
            table: table.to_string(),
            details: details.into(),
        }
    }

    /// Raw reaction string at fault, when the failure came from the parser.
    pub fn offending_equation(&self) -> Option<&str> {
        match self {
            DeckError::Parse(e) => Some(e.equation.as_str()),
            _ => None,
        }
    }
}

impl From<fmt::Error> for DeckError {
    fn from(err: fmt::Error) -> Self {
        DeckError::Render(err.to_string())
    }
}
