use crate::error::{SyntaxError, SyntaxErrorKind};
use crate::scanner::Scanner;
use crate::token::{Token, TokenKind};
use std::fmt;

/// A construct the parser has finished (or, for `if`, started) recognizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recognition {
    Assignment,
    Print,
    IfBegins,
    IfEnds,
}

impl fmt::Display for Recognition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Recognition::Assignment => write!(f, "Assignment Statement Recognized"),
            Recognition::Print => write!(f, "Print Statement Recognized"),
            Recognition::IfBegins => write!(f, "If Statement Begins"),
            Recognition::IfEnds => write!(f, "If Statement Ends"),
        }
    }
}

/// Receives the recognition trace in the order the parse encounters it.
pub trait TraceSink {
    fn recognized(&mut self, event: Recognition);
}

/// Prints each recognition on its own line of standard output.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutTrace;

impl TraceSink for StdoutTrace {
    fn recognized(&mut self, event: Recognition) {
        println!("{}", event);
    }
}

impl TraceSink for Vec<Recognition> {
    fn recognized(&mut self, event: Recognition) {
        self.push(event);
    }
}

impl<T: TraceSink + ?Sized> TraceSink for &mut T {
    fn recognized(&mut self, event: Recognition) {
        (**self).recognized(event);
    }
}

/// Deepest run of nested parentheses, `SQRT(...)` calls and `IF` blocks accepted.
pub const MAX_NESTING: usize = 128;

/// Recursive-descent recognizer for SimpCalc. Each nonterminal below has a
/// method; the right-recursive `Blk` and `*Follow` rules are the loops inside
/// the method of the rule that uses them.
///
/// ```text
/// Prg       -> Blk EndOfFile
/// Blk       -> Stm Blk | ε
/// Stm       -> Identifier Assign Exp Semicolon
///            | Print LeftParen Arg ArgFollow RightParen Semicolon
///            | If Cnd Colon Blk IfFollow
/// ArgFollow -> Comma Arg ArgFollow | ε
/// Arg       -> String | Exp
/// IfFollow  -> Endif Semicolon | Else Blk Endif Semicolon
/// Exp       -> Trm TrmFollow
/// TrmFollow -> (Plus|Minus) Trm TrmFollow | ε
/// Trm       -> Fac FacFollow
/// FacFollow -> (Multiply|Divide) Fac FacFollow | ε
/// Fac       -> Lit LitFollow
/// LitFollow -> Raise Lit LitFollow | ε
/// Lit       -> Minus Val | Val
/// Val       -> Identifier | Number | Sqrt LeftParen Exp RightParen | LeftParen Exp RightParen
/// Cnd       -> Exp Rel Exp
/// Rel       -> LessThan | Equal | GreaterThan | LTEqual | NotEqual | GTEqual
/// ```
///
/// The first mismatch stops the parse; no tokens are consumed after it.
pub struct Parser<L, T = StdoutTrace>
where
    L: Iterator<Item = String>,
{
    scanner: Scanner<L>,
    current: Token,
    error: bool,
    depth: usize,
    trace: T,
}

impl<L> Parser<L, StdoutTrace>
where
    L: Iterator<Item = String>,
{
    pub fn new(scanner: Scanner<L>) -> Self {
        Self::with_trace(scanner, StdoutTrace)
    }
}

impl<L, T> Parser<L, T>
where
    L: Iterator<Item = String>,
    T: TraceSink,
{
    pub fn with_trace(mut scanner: Scanner<L>, trace: T) -> Self {
        let current = scanner.next_token();
        Self {
            scanner,
            current,
            error: false,
            depth: 0,
            trace,
        }
    }

    /// Validates the whole token stream through `EndOfFile`.
    ///
    /// Meant to be called once; after a failure the parser stays positioned
    /// at the offending token.
    pub fn parse(&mut self) -> Result<(), SyntaxError> {
        tracing::info!("parse started");
        self.error = false;

        match self.parse_program() {
            Ok(()) => {
                tracing::info!(lines = self.scanner.line_number(), "parse finished");
                Ok(())
            }
            Err(e) => {
                self.error = true;
                tracing::warn!(line = e.line(), "{}", e);
                Err(e)
            }
        }
    }

    pub fn has_error(&self) -> bool {
        self.error
    }

    /// The unconsumed lookahead token.
    pub fn current(&self) -> &Token {
        &self.current
    }

    pub fn into_trace(self) -> T {
        self.trace
    }

    fn at(&self) -> TokenKind {
        self.current.kind()
    }

    fn next_token(&mut self) {
        self.current = self.scanner.next_token();
    }

    fn error_at(&self, kind: SyntaxErrorKind) -> SyntaxError {
        SyntaxError::new(kind, self.scanner.line_number())
    }

    fn eat(&mut self, expecting: TokenKind) -> Result<(), SyntaxError> {
        if self.at() != expecting {
            return Err(self.error_at(SyntaxErrorKind::Expected {
                expected: expecting,
                found: self.current.clone(),
            }));
        }

        tracing::debug!(kind = %expecting, lexeme = self.current.lexeme(), "matched");
        self.next_token();
        Ok(())
    }

    fn nested<F>(&mut self, rule: F) -> Result<(), SyntaxError>
    where
        F: FnOnce(&mut Self) -> Result<(), SyntaxError>,
    {
        if self.depth >= MAX_NESTING {
            return Err(self.error_at(SyntaxErrorKind::NestingTooDeep { limit: MAX_NESTING }));
        }

        self.depth += 1;
        let result = rule(self);
        self.depth -= 1;
        result
    }

    fn parse_program(&mut self) -> Result<(), SyntaxError> {
        self.parse_block()?;
        self.eat(TokenKind::EndOfFile)
    }

    fn parse_block(&mut self) -> Result<(), SyntaxError> {
        while matches!(
            self.at(),
            TokenKind::Identifier | TokenKind::Print | TokenKind::If
        ) {
            self.parse_statement()?;
        }
        Ok(())
    }

    fn parse_statement(&mut self) -> Result<(), SyntaxError> {
        match self.at() {
            TokenKind::Identifier => {
                self.eat(TokenKind::Identifier)?;
                self.eat(TokenKind::Assign)?;
                self.parse_expression()?;
                self.eat(TokenKind::Semicolon)?;
                self.trace.recognized(Recognition::Assignment);
            }
            TokenKind::Print => {
                self.eat(TokenKind::Print)?;
                self.eat(TokenKind::LeftParen)?;
                self.parse_argument()?;
                while self.at() == TokenKind::Comma {
                    self.eat(TokenKind::Comma)?;
                    self.parse_argument()?;
                }
                self.eat(TokenKind::RightParen)?;
                self.eat(TokenKind::Semicolon)?;
                self.trace.recognized(Recognition::Print);
            }
            TokenKind::If => {
                self.nested(|parser| {
                    parser.eat(TokenKind::If)?;
                    parser.trace.recognized(Recognition::IfBegins);
                    parser.parse_condition()?;
                    parser.eat(TokenKind::Colon)?;
                    parser.parse_block()?;
                    parser.parse_if_follow()?;
                    parser.trace.recognized(Recognition::IfEnds);
                    Ok(())
                })?;
            }
            _ => return Err(self.error_at(SyntaxErrorKind::InvalidStatement)),
        }
        Ok(())
    }

    fn parse_argument(&mut self) -> Result<(), SyntaxError> {
        if self.at() == TokenKind::String {
            self.eat(TokenKind::String)
        } else {
            self.parse_expression()
        }
    }

    fn parse_if_follow(&mut self) -> Result<(), SyntaxError> {
        match self.at() {
            TokenKind::Endif => {
                self.eat(TokenKind::Endif)?;
                self.eat(TokenKind::Semicolon)
            }
            TokenKind::Else => {
                self.eat(TokenKind::Else)?;
                self.parse_block()?;
                self.eat(TokenKind::Endif)?;
                self.eat(TokenKind::Semicolon)
            }
            _ => Err(self.error_at(SyntaxErrorKind::IncompleteIf)),
        }
    }

    fn parse_expression(&mut self) -> Result<(), SyntaxError> {
        self.parse_term()?;
        while let kind @ (TokenKind::Plus | TokenKind::Minus) = self.at() {
            self.eat(kind)?;
            self.parse_term()?;
        }
        Ok(())
    }

    fn parse_term(&mut self) -> Result<(), SyntaxError> {
        self.parse_factor()?;
        while let kind @ (TokenKind::Multiply | TokenKind::Divide) = self.at() {
            self.eat(kind)?;
            self.parse_factor()?;
        }
        Ok(())
    }

    fn parse_factor(&mut self) -> Result<(), SyntaxError> {
        self.parse_literal()?;
        while self.at() == TokenKind::Raise {
            self.eat(TokenKind::Raise)?;
            self.parse_literal()?;
        }
        Ok(())
    }

    fn parse_literal(&mut self) -> Result<(), SyntaxError> {
        if self.at() == TokenKind::Minus {
            self.eat(TokenKind::Minus)?;
        }
        self.parse_value()
    }

    fn parse_value(&mut self) -> Result<(), SyntaxError> {
        match self.at() {
            TokenKind::Identifier => self.eat(TokenKind::Identifier),
            TokenKind::Number => self.eat(TokenKind::Number),
            TokenKind::Sqrt => self.nested(|parser| {
                parser.eat(TokenKind::Sqrt)?;
                parser.eat(TokenKind::LeftParen)?;
                parser.parse_expression()?;
                parser.eat(TokenKind::RightParen)
            }),
            _ => self.nested(|parser| {
                parser.eat(TokenKind::LeftParen)?;
                parser.parse_expression()?;
                parser.eat(TokenKind::RightParen)
            }),
        }
    }

    fn parse_condition(&mut self) -> Result<(), SyntaxError> {
        self.parse_expression()?;
        self.parse_relation()?;
        self.parse_expression()
    }

    fn parse_relation(&mut self) -> Result<(), SyntaxError> {
        let kind = self.at();
        if kind.is_relational() {
            self.eat(kind)
        } else {
            Err(self.error_at(SyntaxErrorKind::MissingRelationalOperator))
        }
    }
}
