use crate::token::{Token, TokenKind};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompilerError {
    #[error("FileNotFoundError: {0}")]
    FileNotFound(String),

    #[error("IOError: {0}")]
    IO(#[from] std::io::Error),

    #[error("ConfigError: {path}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("{error}\n  --> {}:{}", .path.display(), .error.line)]
    Syntax { path: PathBuf, error: SyntaxError },
}

/// What went wrong at the point the parser gave up.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxErrorKind {
    #[error("{expected} expected, but found {found}")]
    Expected { expected: TokenKind, found: Token },

    #[error("Invalid Statement")]
    InvalidStatement,

    #[error("Incomplete if statement")]
    IncompleteIf,

    #[error("Missing relational operator")]
    MissingRelationalOperator,

    #[error("Nesting deeper than {limit} levels")]
    NestingTooDeep { limit: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Parse Error: {kind} (line #{line})")]
pub struct SyntaxError {
    pub(crate) kind: SyntaxErrorKind,
    pub(crate) line: usize,
}

impl SyntaxError {
    pub fn new(kind: SyntaxErrorKind, line: usize) -> Self {
        Self { kind, line }
    }

    pub fn kind(&self) -> &SyntaxErrorKind {
        &self.kind
    }

    pub fn line(&self) -> usize {
        self.line
    }

    /// True when the offending lookahead was produced by a lexical error.
    pub fn is_lexical(&self) -> bool {
        matches!(
            &self.kind,
            SyntaxErrorKind::Expected { found, .. } if found.kind() == TokenKind::Error
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expected_error_names_both_tokens() {
        let error = SyntaxError::new(
            SyntaxErrorKind::Expected {
                expected: TokenKind::Semicolon,
                found: Token::end_of_file(),
            },
            3,
        );
        assert_eq!(
            error.to_string(),
            "Parse Error: Semicolon expected, but found EndOfFile (line #3)"
        );
        assert!(!error.is_lexical());
    }

    #[test]
    fn lexical_errors_are_called_out() {
        let error = SyntaxError::new(
            SyntaxErrorKind::Expected {
                expected: TokenKind::Assign,
                found: Token::error(),
            },
            1,
        );
        assert!(error.is_lexical());
        assert!(error.to_string().contains("found lexical Error"));
    }

    #[test]
    fn syntax_error_renders_with_path() {
        let error = CompilerError::Syntax {
            path: PathBuf::from("prog.txt"),
            error: SyntaxError::new(SyntaxErrorKind::IncompleteIf, 7),
        };
        assert_eq!(
            error.to_string(),
            "Parse Error: Incomplete if statement (line #7)\n  --> prog.txt:7"
        );
    }
}
