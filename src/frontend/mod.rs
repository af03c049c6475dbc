//! Frontend module - Lexer, Parser, Semantic Analysis

pub mod token;
pub mod lexer;
pub mod ast;
pub mod parser;
pub mod scope;
pub mod semantic;

use log::debug;

use crate::feedback::Diagnostic;
use crate::utils::Error;
use ast::Program;
use parser::Parser;
use token::Token;

/// Everything the front end produced for one source buffer
#[derive(Debug)]
pub struct Analysis {
    /// Tokens, terminated by `Eof`
    pub tokens: Vec<Token>,
    /// `None` when parsing failed
    pub program: Option<Program>,
    /// Lexical errors, then the syntax error if any, then semantic errors
    pub errors: Vec<Error>,
}

impl Analysis {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.errors.iter().map(Diagnostic::from_error).collect()
    }
}

/// Run tokenize, parse and analyze over `source`.
///
/// Lexical errors never stop parsing. A syntax error leaves `program` empty
/// and skips semantic analysis.
pub fn run(source: &str) -> Analysis {
    let (tokens, mut errors) = lexer::tokenize(source);

    let program = match Parser::from_tokens(tokens.clone()).parse_program() {
        Ok(program) => Some(program),
        Err(e) => {
            debug!("parse failed: {}", e);
            errors.push(e);
            None
        }
    };

    if let Some(program) = &program {
        errors.extend(semantic::analyze(program));
    }

    debug!("front end finished with {} diagnostic(s)", errors.len());

    Analysis {
        tokens,
        program,
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::Stage;

    #[test]
    fn test_lexical_errors_do_not_block_parsing() {
        let analysis = run("function f() -> void [ $ write(1); ]");
        assert!(analysis.program.is_some());
        assert_eq!(analysis.errors.len(), 1);
        assert_eq!(analysis.diagnostics()[0].stage, Stage::Lexical);
    }

    #[test]
    fn test_syntax_error_skips_semantics() {
        let analysis = run("function f() -> void [ write(x) ]");
        assert!(analysis.program.is_none());
        assert_eq!(analysis.errors.len(), 1);
        assert!(analysis.errors[0].is_fatal());
    }

    #[test]
    fn test_diagnostics_ordered_by_stage() {
        let analysis = run("function f() -> void [ @ x = 1; ]");
        let stages: Vec<_> = analysis.diagnostics().iter().map(|d| d.stage).collect();
        assert_eq!(stages, vec![Stage::Lexical, Stage::Semantic]);
        assert!(!analysis.is_ok());
    }

    #[test]
    fn test_clean_program() {
        let analysis = run("function f(x: integer) -> integer [ return(x); ]");
        assert!(analysis.is_ok());
        assert_eq!(analysis.tokens.last().map(|t| &t.kind), Some(&token::TokenKind::Eof));
    }
}
