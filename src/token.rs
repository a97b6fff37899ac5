use std::fmt;

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Token {
    pub(crate) kind: TokenKind,
    pub(crate) lexeme: String,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TokenKind {
    Error,

    // Identifiers and literals
    Identifier,
    Number,
    String,

    // Punctuation
    Assign,      // :=
    Semicolon,   // ;
    Colon,       // :
    Comma,       // ,
    LeftParen,   // (
    RightParen,  // )

    // Arithmetic operators
    Plus,        // +
    Minus,       // -
    Multiply,    // *
    Divide,      // /
    Raise,       // **

    // Relational operators
    LessThan,    // <
    Equal,       // =
    GreaterThan, // >
    LTEqual,     // <=
    NotEqual,    // !=
    GTEqual,     // >=

    EndOfFile,

    // Keywords
    Print,
    If,
    Else,
    Endif,
    Sqrt,
    And,
    Or,
    Not,
}

impl TokenKind {
    /// Fixed display name used in diagnostics and token dumps.
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Error => "Error",
            TokenKind::Identifier => "Identifier",
            TokenKind::Number => "Number",
            TokenKind::String => "String",
            TokenKind::Assign => "Assign",
            TokenKind::Semicolon => "Semicolon",
            TokenKind::Colon => "Colon",
            TokenKind::Comma => "Comma",
            TokenKind::LeftParen => "LeftParen",
            TokenKind::RightParen => "RightParen",
            TokenKind::Plus => "Plus",
            TokenKind::Minus => "Minus",
            TokenKind::Multiply => "Multiply",
            TokenKind::Divide => "Divide",
            TokenKind::Raise => "Raise",
            TokenKind::LessThan => "LessThan",
            TokenKind::Equal => "Equal",
            TokenKind::GreaterThan => "GreaterThan",
            TokenKind::LTEqual => "LTEqual",
            TokenKind::NotEqual => "NotEqual",
            TokenKind::GTEqual => "GTEqual",
            TokenKind::EndOfFile => "EndOfFile",
            TokenKind::Print => "Print",
            TokenKind::If => "If",
            TokenKind::Else => "Else",
            TokenKind::Endif => "Endif",
            TokenKind::Sqrt => "Sqrt",
            TokenKind::And => "And",
            TokenKind::Or => "Or",
            TokenKind::Not => "Not",
        }
    }

    pub fn is_relational(self) -> bool {
        matches!(
            self,
            TokenKind::LessThan
                | TokenKind::Equal
                | TokenKind::GreaterThan
                | TokenKind::LTEqual
                | TokenKind::NotEqual
                | TokenKind::GTEqual
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // Padding is forwarded so `{:<11}` lines up token dumps.
        f.pad(self.name())
    }
}

/// Looks up the reserved word spelled exactly `ident` (upper case only).
pub fn keyword(ident: &str) -> Option<TokenKind> {
    match ident {
        "PRINT" => Some(TokenKind::Print),
        "IF" => Some(TokenKind::If),
        "ELSE" => Some(TokenKind::Else),
        "ENDIF" => Some(TokenKind::Endif),
        "SQRT" => Some(TokenKind::Sqrt),
        "AND" => Some(TokenKind::And),
        "OR" => Some(TokenKind::Or),
        "NOT" => Some(TokenKind::Not),
        _ => None,
    }
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
        }
    }

    pub fn error() -> Self {
        Self::new(TokenKind::Error, "")
    }

    pub fn end_of_file() -> Self {
        Self::new(TokenKind::EndOfFile, "")
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    pub fn lexeme(&self) -> &str {
        &self.lexeme
    }

    /// Text between the quotes of a `String` token, `None` for any other kind.
    pub fn string_content(&self) -> Option<&str> {
        if self.kind != TokenKind::String {
            return None;
        }
        self.lexeme
            .strip_prefix('"')
            .and_then(|rest| rest.strip_suffix('"'))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            TokenKind::Error => write!(f, "lexical Error"),
            TokenKind::EndOfFile => write!(f, "EndOfFile"),
            kind => write!(f, "{} {:?}", kind, self.lexeme),
        }
    }
}
