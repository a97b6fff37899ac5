use crate::error::CompilerError;
use crate::token::{keyword, Token, TokenKind};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

/// How identifiers are compared against the reserved words.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeywordCase {
    /// Only the upper-case spellings (`PRINT`, `IF`, ...) are keywords.
    #[default]
    Exact,
    /// `print`, `If` and `ENDIF` are all keywords.
    Insensitive,
}

/// Pull-based tokenizer over a sequence of source lines.
///
/// Each call to [`Scanner::next_token`] returns exactly one token. Once the
/// line source is exhausted every further call returns `EndOfFile`.
pub struct Scanner<L = std::vec::IntoIter<String>>
where
    L: Iterator<Item = String>,
{
    lines: L,
    chars: Vec<char>,
    current: usize,
    line: usize,
    exhausted: bool,
    finished: bool,
    keyword_case: KeywordCase,
}

impl Scanner {
    pub fn from_source(source: &str) -> Self {
        let lines: Vec<String> = source.lines().map(str::to_string).collect();
        Scanner::new(lines.into_iter())
    }

    pub fn from_path(path: &Path) -> Result<Self, CompilerError> {
        let source = fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => {
                CompilerError::FileNotFound(format!("{}: {}", path.display(), e))
            }
            _ => CompilerError::IO(e),
        })?;
        Ok(Scanner::from_source(&source))
    }
}

impl<L> Scanner<L>
where
    L: Iterator<Item = String>,
{
    pub fn new(lines: L) -> Self {
        let mut scanner = Self {
            lines,
            chars: Vec::new(),
            current: 0,
            line: 0,
            exhausted: false,
            finished: false,
            keyword_case: KeywordCase::default(),
        };
        if !scanner.advance_line() {
            scanner.line = 1;
        }
        scanner
    }

    pub fn with_keyword_case(mut self, keyword_case: KeywordCase) -> Self {
        self.keyword_case = keyword_case;
        self
    }

    /// 1-based number of the line most recently pulled from the source.
    pub fn line_number(&self) -> usize {
        self.line
    }

    pub fn next_token(&mut self) -> Token {
        if !self.skip_to_token() {
            return Token::end_of_file();
        }

        let token = self.scan_token();
        tracing::trace!(line = self.line, kind = %token.kind(), lexeme = token.lexeme(), "scanned token");
        token
    }

    /// Drains the scanner, returning every token up to and including `EndOfFile`.
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let done = token.kind() == TokenKind::EndOfFile;
            tokens.push(token);
            if done {
                return tokens;
            }
        }
    }

    fn at(&self) -> char {
        self.peek(0)
    }

    fn peek(&self, offset: usize) -> char {
        self.chars.get(self.current + offset).copied().unwrap_or('\0')
    }

    fn advance(&mut self) -> char {
        let ch = self.at();
        if !self.is_line_end() {
            self.current += 1;
        }
        ch
    }

    fn match_char(&mut self, expected: char) -> bool {
        if !self.is_line_end() && self.at() == expected {
            self.current += 1;
            true
        } else {
            false
        }
    }

    fn is_line_end(&self) -> bool {
        self.current >= self.chars.len()
    }

    fn advance_line(&mut self) -> bool {
        if self.exhausted {
            return false;
        }

        match self.lines.next() {
            Some(text) => {
                self.chars = text.chars().collect();
                self.current = 0;
                self.line += 1;
                tracing::debug!(line = self.line, "pulled source line");
                true
            }
            None => {
                self.exhausted = true;
                false
            }
        }
    }

    /// Skips blanks, blank lines and `//` comments. Returns `false` once the
    /// source is exhausted.
    fn skip_to_token(&mut self) -> bool {
        loop {
            while !self.is_line_end() && matches!(self.at(), ' ' | '\t') {
                self.current += 1;
            }

            if self.is_line_end() {
                if !self.advance_line() {
                    return false;
                }
                continue;
            }

            if self.at() == '/' && self.peek(1) == '/' {
                self.current = self.chars.len();
                continue;
            }

            return true;
        }
    }

    fn lexeme(&self, start: usize) -> String {
        self.chars[start..self.current].iter().collect()
    }

    fn create_token(&self, kind: TokenKind, start: usize) -> Token {
        Token::new(kind, self.lexeme(start))
    }

    fn scan_token(&mut self) -> Token {
        let start = self.current;
        let ch = self.advance();

        match ch {
            '(' => self.create_token(TokenKind::LeftParen, start),
            ')' => self.create_token(TokenKind::RightParen, start),
            ';' => self.create_token(TokenKind::Semicolon, start),
            ',' => self.create_token(TokenKind::Comma, start),
            '+' => self.create_token(TokenKind::Plus, start),
            '-' => self.create_token(TokenKind::Minus, start),
            '=' => self.create_token(TokenKind::Equal, start),
            '/' => self.create_token(TokenKind::Divide, start),
            ':' => {
                let kind = if self.match_char('=') {
                    TokenKind::Assign
                } else {
                    TokenKind::Colon
                };
                self.create_token(kind, start)
            }
            '<' => {
                let kind = if self.match_char('=') {
                    TokenKind::LTEqual
                } else {
                    TokenKind::LessThan
                };
                self.create_token(kind, start)
            }
            '>' => {
                let kind = if self.match_char('=') {
                    TokenKind::GTEqual
                } else {
                    TokenKind::GreaterThan
                };
                self.create_token(kind, start)
            }
            '!' => {
                if self.match_char('=') {
                    self.create_token(TokenKind::NotEqual, start)
                } else {
                    Token::error()
                }
            }
            '*' => {
                let kind = if self.match_char('*') {
                    TokenKind::Raise
                } else {
                    TokenKind::Multiply
                };
                self.create_token(kind, start)
            }
            '.' => {
                if self.at().is_ascii_digit() {
                    self.skip_digits();
                    self.scan_exponent(start)
                } else {
                    Token::error()
                }
            }
            '0' => self.scan_post_zero(start),
            '1'..='9' => {
                self.skip_digits();
                self.scan_fraction(start)
            }
            '"' => self.scan_string(start),
            c if is_identifier_start(c) => self.scan_identifier(start),
            _ => Token::error(),
        }
    }

    fn skip_digits(&mut self) {
        while !self.is_line_end() && self.at().is_ascii_digit() {
            self.current += 1;
        }
    }

    fn scan_fraction(&mut self, start: usize) -> Token {
        if self.match_char('.') {
            self.skip_digits();
        }
        self.scan_exponent(start)
    }

    fn scan_exponent(&mut self, start: usize) -> Token {
        if self.match_char('e') || self.match_char('E') {
            if !self.match_char('+') {
                self.match_char('-');
            }
            if !self.at().is_ascii_digit() {
                return Token::error();
            }
            self.skip_digits();
        }
        self.create_token(TokenKind::Number, start)
    }

    // A numeral with leading zeros, such as `007` or `00.5`, takes no exponent.
    fn scan_post_zero(&mut self, start: usize) -> Token {
        match self.at() {
            'e' | 'E' => self.scan_exponent(start),
            '.' => self.scan_fraction(start),
            '0'..='9' => {
                self.skip_digits();
                if self.match_char('.') {
                    self.skip_digits();
                }
                self.create_token(TokenKind::Number, start)
            }
            _ => self.create_token(TokenKind::Number, start),
        }
    }

    fn scan_string(&mut self, start: usize) -> Token {
        while !self.is_line_end() && self.at() != '"' {
            self.current += 1;
        }

        if !self.match_char('"') {
            return Token::error();
        }
        self.create_token(TokenKind::String, start)
    }

    fn scan_identifier(&mut self, start: usize) -> Token {
        while !self.is_line_end() && is_identifier_part(self.at()) {
            self.current += 1;
        }

        let ident = self.lexeme(start);
        let reserved = match self.keyword_case {
            KeywordCase::Exact => keyword(&ident),
            KeywordCase::Insensitive => keyword(&ident.to_uppercase()),
        };

        Token::new(reserved.unwrap_or(TokenKind::Identifier), ident)
    }
}

impl<L> Iterator for Scanner<L>
where
    L: Iterator<Item = String>,
{
    type Item = Token;

    /// Yields tokens through the first `EndOfFile`, then `None`.
    fn next(&mut self) -> Option<Token> {
        if self.finished {
            return None;
        }
        let token = self.next_token();
        if token.kind() == TokenKind::EndOfFile {
            self.finished = true;
        }
        Some(token)
    }
}

impl<L> std::iter::FusedIterator for Scanner<L> where L: Iterator<Item = String> {}

fn is_identifier_start(ch: char) -> bool {
    ch == '_' || ch.is_alphabetic()
}

fn is_identifier_part(ch: char) -> bool {
    is_identifier_start(ch) || ch.is_ascii_digit()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Scanner::from_source(source)
            .tokenize()
            .iter()
            .map(Token::kind)
            .collect()
    }

    fn single(source: &str) -> Token {
        let tokens = Scanner::from_source(source).tokenize();
        assert_eq!(tokens.len(), 2, "expected one token + EOF for {:?}, got {:?}", source, tokens);
        tokens[0].clone()
    }

    #[test]
    fn canonical_lexemes_scan_to_their_kind() {
        let cases = [
            (":=", TokenKind::Assign),
            (";", TokenKind::Semicolon),
            (":", TokenKind::Colon),
            (",", TokenKind::Comma),
            ("(", TokenKind::LeftParen),
            (")", TokenKind::RightParen),
            ("+", TokenKind::Plus),
            ("-", TokenKind::Minus),
            ("*", TokenKind::Multiply),
            ("/", TokenKind::Divide),
            ("**", TokenKind::Raise),
            ("<", TokenKind::LessThan),
            ("=", TokenKind::Equal),
            (">", TokenKind::GreaterThan),
            ("<=", TokenKind::LTEqual),
            ("!=", TokenKind::NotEqual),
            (">=", TokenKind::GTEqual),
            ("PRINT", TokenKind::Print),
            ("IF", TokenKind::If),
            ("ELSE", TokenKind::Else),
            ("ENDIF", TokenKind::Endif),
            ("SQRT", TokenKind::Sqrt),
            ("AND", TokenKind::And),
            ("OR", TokenKind::Or),
            ("NOT", TokenKind::Not),
            ("x_1", TokenKind::Identifier),
            ("3.14e-2", TokenKind::Number),
            ("\"hi\"", TokenKind::String),
        ];

        for (text, kind) in cases {
            let token = single(text);
            assert_eq!(token.kind(), kind, "kind of {:?}", text);
            assert_eq!(token.lexeme(), text);
        }
    }

    #[test]
    fn numbers() {
        for text in ["0", "7", "123", "1.5", "1.", ".5", ".5e3", "0.25", "0e10", "2E+4", "6e-1", "007", "00.5"] {
            let token = single(text);
            assert_eq!(token, Token::new(TokenKind::Number, text));
        }
    }

    #[test]
    fn leading_zero_numeral_stops_before_exponent() {
        let tokens = Scanner::from_source("05e2").tokenize();
        assert_eq!(tokens[0], Token::new(TokenKind::Number, "05"));
        assert_eq!(tokens[1], Token::new(TokenKind::Identifier, "e2"));
    }

    #[test]
    fn exponent_without_digits_is_an_error() {
        assert_eq!(single("1e").kind(), TokenKind::Error);
        assert_eq!(kinds("1e+ x")[0], TokenKind::Error);
    }

    #[test]
    fn stray_period_and_bang_are_errors() {
        assert_eq!(kinds(". x"), vec![TokenKind::Error, TokenKind::Identifier, TokenKind::EndOfFile]);
        assert_eq!(single("!"), Token::error());
    }

    #[test]
    fn unrecognized_character_has_empty_lexeme() {
        assert_eq!(single("#"), Token::error());
        assert_eq!(single("?").lexeme(), "");
    }

    #[test]
    fn unterminated_string_is_an_error() {
        assert_eq!(single("\"abc"), Token::error());
    }

    #[test]
    fn string_keeps_raw_content() {
        let tokens = Scanner::from_source("\"a \\n b\",\"\"").tokenize();
        assert_eq!(tokens[0].string_content(), Some("a \\n b"));
        assert_eq!(tokens[1].kind(), TokenKind::Comma);
        assert_eq!(tokens[2], Token::new(TokenKind::String, "\"\""));
    }

    #[test]
    fn comment_skips_to_next_line() {
        let mut scanner = Scanner::from_source("// comment\n123");
        assert_eq!(scanner.line_number(), 1);
        assert_eq!(scanner.next_token(), Token::new(TokenKind::Number, "123"));
        assert_eq!(scanner.line_number(), 2);
        assert_eq!(scanner.next_token(), Token::end_of_file());
    }

    #[test]
    fn trailing_comment_on_last_line_ends_the_stream() {
        assert_eq!(
            kinds("x := 1; // done"),
            vec![
                TokenKind::Identifier,
                TokenKind::Assign,
                TokenKind::Number,
                TokenKind::Semicolon,
                TokenKind::EndOfFile
            ]
        );
        assert_eq!(kinds("// only a comment"), vec![TokenKind::EndOfFile]);
    }

    #[test]
    fn blank_lines_and_trailing_whitespace_are_skipped() {
        let mut scanner = Scanner::from_source("\n\n  \t\nx   \n\n");
        assert_eq!(scanner.next_token(), Token::new(TokenKind::Identifier, "x"));
        assert_eq!(scanner.line_number(), 4);
        assert_eq!(scanner.next_token(), Token::end_of_file());
        assert_eq!(scanner.line_number(), 5);
    }

    #[test]
    fn division_is_not_a_comment() {
        assert_eq!(
            kinds("a / b"),
            vec![TokenKind::Identifier, TokenKind::Divide, TokenKind::Identifier, TokenKind::EndOfFile]
        );
    }

    #[test]
    fn end_of_file_is_idempotent() {
        let mut scanner = Scanner::from_source("x");
        scanner.next_token();
        for _ in 0..5 {
            assert_eq!(scanner.next_token(), Token::end_of_file());
            assert_eq!(scanner.line_number(), 1);
        }
    }

    #[test]
    fn empty_source_is_end_of_file_on_line_one() {
        let mut scanner = Scanner::from_source("");
        assert_eq!(scanner.next_token(), Token::end_of_file());
        assert_eq!(scanner.line_number(), 1);
    }

    #[test]
    fn keyword_case_is_exact_by_default() {
        assert_eq!(single("print"), Token::new(TokenKind::Identifier, "print"));
        assert_eq!(single("Endif").kind(), TokenKind::Identifier);
    }

    #[test]
    fn insensitive_keywords_keep_source_spelling() {
        let tokens = Scanner::from_source("print If endif")
            .with_keyword_case(KeywordCase::Insensitive)
            .tokenize();
        assert_eq!(tokens[0], Token::new(TokenKind::Print, "print"));
        assert_eq!(tokens[1], Token::new(TokenKind::If, "If"));
        assert_eq!(tokens[2], Token::new(TokenKind::Endif, "endif"));
    }

    #[test]
    fn operators_without_spaces() {
        assert_eq!(
            kinds("x:=y**2<=z!=w>=1"),
            vec![
                TokenKind::Identifier,
                TokenKind::Assign,
                TokenKind::Identifier,
                TokenKind::Raise,
                TokenKind::Number,
                TokenKind::LTEqual,
                TokenKind::Identifier,
                TokenKind::NotEqual,
                TokenKind::Identifier,
                TokenKind::GTEqual,
                TokenKind::Number,
                TokenKind::EndOfFile,
            ]
        );
    }

    #[test]
    fn iterator_stops_after_end_of_file() {
        let tokens: Vec<Token> = Scanner::from_source("a b").collect();
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[2], Token::end_of_file());
    }

    #[test]
    fn superscript_is_not_an_identifier_digit() {
        assert_eq!(
            Scanner::from_source("x²").tokenize(),
            vec![
                Token::new(TokenKind::Identifier, "x"),
                Token::error(),
                Token::end_of_file(),
            ]
        );
        assert_eq!(single("é1_b"), Token::new(TokenKind::Identifier, "é1_b"));
    }

    #[test]
    fn crlf_line_endings() {
        let mut scanner = Scanner::from_source("a\r\nb\r\n");
        assert_eq!(scanner.next_token().lexeme(), "a");
        assert_eq!(scanner.next_token().lexeme(), "b");
        assert_eq!(scanner.line_number(), 2);
    }
}
