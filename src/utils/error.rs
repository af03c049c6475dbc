//! Error handling for classc

use crate::feedback::Stage;
use crate::utils::Span;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Front-end error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // ==================== Lexer Errors ====================

    #[error("Illegal character '{ch}'")]
    IllegalCharacter { ch: char, span: Span },

    #[error("Integer literal out of range: {text}")]
    IntegerOutOfRange { text: String, span: Span },

    // ==================== Parser Errors ====================

    #[error("Syntax error at {found}, line {}, position {}: expected {expected}", .span.line, .span.start)]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },

    #[error("Syntax error at EOF: expected {expected}")]
    UnexpectedEof { expected: String },

    // ==================== Semantic Errors ====================

    #[error("Variable '{name}' already declared in the current scope")]
    AlreadyDeclared { name: String, span: Span },

    #[error("Variable '{name}' used before declaration")]
    UsedBeforeDeclaration { name: String, span: Span },

    #[error("Class '{name}' used before declaration")]
    UnresolvedClass { name: String, span: Span },

    #[error("Function '{name}' is not declared in the enclosing scope")]
    UnresolvedFunction { name: String, span: Span },

    #[error("Attribute '{name}' is not declared in the enclosing scope")]
    UnresolvedAttribute { name: String, span: Span },
}

impl Error {
    /// Get the span associated with this error
    pub fn span(&self) -> Option<Span> {
        match self {
            Self::IllegalCharacter { span, .. } => Some(*span),
            Self::IntegerOutOfRange { span, .. } => Some(*span),
            Self::UnexpectedToken { span, .. } => Some(*span),
            Self::AlreadyDeclared { span, .. } => Some(*span),
            Self::UsedBeforeDeclaration { span, .. } => Some(*span),
            Self::UnresolvedClass { span, .. } => Some(*span),
            Self::UnresolvedFunction { span, .. } => Some(*span),
            Self::UnresolvedAttribute { span, .. } => Some(*span),
            // End of input has no offending token to point at
            Self::UnexpectedEof { .. } => None,
        }
    }

    /// The pipeline stage that produced this error
    pub fn stage(&self) -> Stage {
        match self {
            Self::IllegalCharacter { .. } | Self::IntegerOutOfRange { .. } => Stage::Lexical,
            Self::UnexpectedToken { .. } | Self::UnexpectedEof { .. } => Stage::Syntactic,
            Self::AlreadyDeclared { .. }
            | Self::UsedBeforeDeclaration { .. }
            | Self::UnresolvedClass { .. }
            | Self::UnresolvedFunction { .. }
            | Self::UnresolvedAttribute { .. } => Stage::Semantic,
        }
    }

    /// Whether the error aborts the stage that raised it
    pub fn is_fatal(&self) -> bool {
        self.stage() == Stage::Syntactic
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_message_names_token_and_position() {
        let err = Error::UnexpectedToken {
            expected: "'else'".to_string(),
            found: ";".to_string(),
            span: Span::new(42, 43, 3, 7),
        };
        assert_eq!(
            err.to_string(),
            "Syntax error at ;, line 3, position 42: expected 'else'"
        );
        assert_eq!(err.stage(), Stage::Syntactic);
        assert!(err.is_fatal());
    }

    #[test]
    fn test_semantic_errors_are_not_fatal() {
        let err = Error::UsedBeforeDeclaration {
            name: "x".to_string(),
            span: Span::dummy(),
        };
        assert_eq!(err.stage(), Stage::Semantic);
        assert!(!err.is_fatal());
        assert_eq!(err.span(), Some(Span::dummy()));
    }
}
