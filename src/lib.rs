//! SimpCalc front end: a line-oriented scanner and a recursive-descent
//! recognizer that reports whether a program is syntactically valid.

pub mod config;
pub mod error;
pub mod parser;
pub mod scanner;
pub mod token;

use crate::config::Config;
use crate::error::CompilerError;
use crate::parser::{Parser, TraceSink};
use crate::scanner::Scanner;
use crate::token::Token;
use std::path::Path;

pub use crate::error::{SyntaxError, SyntaxErrorKind};
pub use crate::parser::{Recognition, StdoutTrace};
pub use crate::scanner::KeywordCase;
pub use crate::token::TokenKind;

/// Parses `source` as a complete SimpCalc program, sending the recognition
/// trace to `trace`.
pub fn check_source<T: TraceSink>(
    source: &str,
    config: &Config,
    trace: T,
) -> Result<(), SyntaxError> {
    let scanner = Scanner::from_source(source).with_keyword_case(config.keyword_case);
    Parser::with_trace(scanner, trace).parse()
}

#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn check_file<T: TraceSink>(
    path: &Path,
    config: &Config,
    trace: T,
) -> Result<(), CompilerError> {
    let scanner = Scanner::from_path(path)?.with_keyword_case(config.keyword_case);
    Parser::with_trace(scanner, trace)
        .parse()
        .map_err(|error| CompilerError::Syntax {
            path: path.to_path_buf(),
            error,
        })
}

/// Every token in the file, terminated by `EndOfFile`.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn scan_file(path: &Path, config: &Config) -> Result<Vec<Token>, CompilerError> {
    let mut scanner = Scanner::from_path(path)?.with_keyword_case(config.keyword_case);
    Ok(scanner.tokenize())
}
