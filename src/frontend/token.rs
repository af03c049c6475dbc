//! Token definitions for classc

use std::fmt;

use crate::utils::Span;

/// A token produced by the lexer
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Source text the token was scanned from
    pub lexeme: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            span,
        }
    }

    pub fn eof(span: Span) -> Self {
        Self {
            kind: TokenKind::Eof,
            lexeme: String::new(),
            span,
        }
    }

    /// The token's literal value as shown to users: the integer or float for
    /// numeric literals, the source text for everything else.
    pub fn value(&self) -> String {
        match &self.kind {
            TokenKind::IntLit(n) => n.to_string(),
            TokenKind::FloatLit(f) => format!("{:?}", f),
            _ => self.lexeme.clone(),
        }
    }
}

/// Token kinds
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // ============ Keywords ============
    Class,
    Isa,
    Public,
    Private,
    Function,
    Constructor,
    Attribute,
    Integer,
    Float,
    Void,
    If,
    Then,
    Else,
    While,
    Read,
    Write,
    Return,
    Not,
    Or,
    And,
    /// localVar
    LocalVar,
    /// `::` or the keyword `sr`
    Sr,
    /// `->` or the keyword `arrow`
    Arrow,
    /// type (reserved, no production uses it)
    Type,

    // ============ Identifiers and Literals ============
    Ident(String),
    /// Magnitude only; a leading `-` is a separate token
    IntLit(u64),
    FloatLit(f64),

    // ============ Operators ============
    /// ==
    EqEq,
    /// !=
    Ne,
    /// <
    Lt,
    /// >
    Gt,
    /// <=
    Le,
    /// >=
    Ge,
    /// +
    Plus,
    /// -
    Minus,
    /// *
    Star,
    /// /
    Slash,
    /// `=` or `:=`
    Assign,

    // ============ Delimiters ============
    /// ,
    Comma,
    /// ;
    Semicolon,
    /// :
    Colon,
    /// (
    LParen,
    /// )
    RParen,
    /// [
    LBracket,
    /// ]
    RBracket,
    /// {
    LBrace,
    /// }
    RBrace,
    /// .
    Dot,

    // ============ Special ============
    Eof,
    /// Unknown/invalid character
    Unknown(char),
}

impl TokenKind {
    /// Try to convert an identifier to a keyword.
    ///
    /// `id` is in the reserved table but maps back onto the identifier kind,
    /// and `sr`/`arrow` share their kinds with the `::`/`->` symbols.
    pub fn keyword_from_str(s: &str) -> Option<TokenKind> {
        match s {
            "class" => Some(TokenKind::Class),
            "isa" => Some(TokenKind::Isa),
            "public" => Some(TokenKind::Public),
            "private" => Some(TokenKind::Private),
            "function" => Some(TokenKind::Function),
            "constructor" => Some(TokenKind::Constructor),
            "attribute" => Some(TokenKind::Attribute),
            "integer" => Some(TokenKind::Integer),
            "float" => Some(TokenKind::Float),
            "void" => Some(TokenKind::Void),
            "if" => Some(TokenKind::If),
            "then" => Some(TokenKind::Then),
            "else" => Some(TokenKind::Else),
            "while" => Some(TokenKind::While),
            "read" => Some(TokenKind::Read),
            "write" => Some(TokenKind::Write),
            "return" => Some(TokenKind::Return),
            "not" => Some(TokenKind::Not),
            "or" => Some(TokenKind::Or),
            "and" => Some(TokenKind::And),
            "localVar" => Some(TokenKind::LocalVar),
            "sr" => Some(TokenKind::Sr),
            "arrow" => Some(TokenKind::Arrow),
            "type" => Some(TokenKind::Type),
            "id" => Some(TokenKind::Ident("id".to_string())),
            _ => None,
        }
    }

    /// Upper-case table name of the kind, as shown in token listings
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::Class => "CLASS",
            TokenKind::Isa => "ISA",
            TokenKind::Public => "PUBLIC",
            TokenKind::Private => "PRIVATE",
            TokenKind::Function => "FUNCTION",
            TokenKind::Constructor => "CONSTRUCTOR",
            TokenKind::Attribute => "ATTRIBUTE",
            TokenKind::Integer => "INTEGER",
            TokenKind::Float => "FLOAT",
            TokenKind::Void => "VOID",
            TokenKind::If => "IF",
            TokenKind::Then => "THEN",
            TokenKind::Else => "ELSE",
            TokenKind::While => "WHILE",
            TokenKind::Read => "READ",
            TokenKind::Write => "WRITE",
            TokenKind::Return => "RETURN",
            TokenKind::Not => "NOT",
            TokenKind::Or => "OR",
            TokenKind::And => "AND",
            TokenKind::LocalVar => "LOCALVAR",
            TokenKind::Sr => "SR",
            TokenKind::Arrow => "ARROW",
            TokenKind::Type => "TYPE",
            TokenKind::Ident(_) => "ID",
            TokenKind::IntLit(_) => "INTLIT",
            TokenKind::FloatLit(_) => "FLOATLIT",
            TokenKind::EqEq => "EQ",
            TokenKind::Ne => "NEQ",
            TokenKind::Lt => "LT",
            TokenKind::Gt => "GT",
            TokenKind::Le => "LEQ",
            TokenKind::Ge => "GEQ",
            TokenKind::Plus => "ADD",
            TokenKind::Minus => "SUB",
            TokenKind::Star => "MUL",
            TokenKind::Slash => "DIV",
            TokenKind::Assign => "ASSIGN",
            TokenKind::Comma => "COMMA",
            TokenKind::Semicolon => "SEMICOLON",
            TokenKind::Colon => "COLON",
            TokenKind::LParen => "LEFTPARENTHESES",
            TokenKind::RParen => "RIGHTPARENTHESES",
            TokenKind::LBracket => "LEFTBRACKET",
            TokenKind::RBracket => "RIGHTBRACKET",
            TokenKind::LBrace => "LEFTBRACE",
            TokenKind::RBrace => "RIGHTBRACE",
            TokenKind::Dot => "DOT",
            TokenKind::Eof => "EOF",
            TokenKind::Unknown(_) => "UNKNOWN",
        }
    }
}

/// Renders the kind the way a parser error describes what it wanted
impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TokenKind::Class => "class",
            TokenKind::Isa => "isa",
            TokenKind::Public => "public",
            TokenKind::Private => "private",
            TokenKind::Function => "function",
            TokenKind::Constructor => "constructor",
            TokenKind::Attribute => "attribute",
            TokenKind::Integer => "integer",
            TokenKind::Float => "float",
            TokenKind::Void => "void",
            TokenKind::If => "if",
            TokenKind::Then => "then",
            TokenKind::Else => "else",
            TokenKind::While => "while",
            TokenKind::Read => "read",
            TokenKind::Write => "write",
            TokenKind::Return => "return",
            TokenKind::Not => "not",
            TokenKind::Or => "or",
            TokenKind::And => "and",
            TokenKind::LocalVar => "localVar",
            TokenKind::Sr => "::",
            TokenKind::Arrow => "->",
            TokenKind::Type => "type",
            TokenKind::Ident(_) => return f.write_str("identifier"),
            TokenKind::IntLit(_) => return f.write_str("integer literal"),
            TokenKind::FloatLit(_) => return f.write_str("float literal"),
            TokenKind::EqEq => "==",
            TokenKind::Ne => "!=",
            TokenKind::Lt => "<",
            TokenKind::Gt => ">",
            TokenKind::Le => "<=",
            TokenKind::Ge => ">=",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Assign => "=",
            TokenKind::Comma => ",",
            TokenKind::Semicolon => ";",
            TokenKind::Colon => ":",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::Dot => ".",
            TokenKind::Eof => return f.write_str("end of input"),
            TokenKind::Unknown(c) => return write!(f, "'{}'", c),
        };
        write!(f, "'{}'", text)
    }
}
