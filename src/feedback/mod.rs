//! Structured Feedback Module
//!
//! Turns front-end errors into plain data:
//! - one `Diagnostic` per error, tagged with the stage that raised it
//! - a `Report` bundling a whole run, serialisable as JSON

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::utils::Error;

/// The pipeline stage a diagnostic came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    Lexical,
    Syntactic,
    Semantic,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Lexical => "lexical",
            Stage::Syntactic => "syntax",
            Stage::Semantic => "semantic",
        };
        f.write_str(name)
    }
}

// ==================== Diagnostic ====================

/// A single reported problem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub stage: Stage,

    /// Human-readable message
    pub message: String,

    /// 1-based line, absent for end-of-input errors
    pub line: Option<usize>,

    /// Character offset from the start of input
    pub position: Option<usize>,
}

impl Diagnostic {
    /// Create a diagnostic from a front-end error
    pub fn from_error(error: &Error) -> Self {
        let span = error.span();
        Self {
            stage: error.stage(),
            message: error.to_string(),
            line: span.map(|s| s.line),
            position: span.map(|s| s.start),
        }
    }
}

impl From<&Error> for Diagnostic {
    fn from(error: &Error) -> Self {
        Self::from_error(error)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.line, self.position) {
            (Some(line), Some(pos)) => {
                write!(f, "{} error [{}:{}]: {}", self.stage, line, pos, self.message)
            }
            _ => write!(f, "{} error: {}", self.stage, self.message),
        }
    }
}

// ==================== Report ====================

/// Everything a caller needs to know about one front-end run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// True when no diagnostic of any stage was produced
    pub success: bool,

    /// Source file the run was made on
    pub source_file: String,

    /// Diagnostics in pipeline order
    pub diagnostics: Vec<Diagnostic>,

    /// Number of tokens produced, end marker excluded
    pub token_count: usize,
}

impl Report {
    pub fn new(source_file: String, diagnostics: Vec<Diagnostic>, token_count: usize) -> Self {
        Self {
            success: diagnostics.is_empty(),
            source_file,
            diagnostics,
            token_count,
        }
    }

    /// Count diagnostics raised by one stage
    pub fn count(&self, stage: Stage) -> usize {
        self.diagnostics.iter().filter(|d| d.stage == stage).count()
    }

    /// Output as JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}
