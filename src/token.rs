//! Token kinds and the `Token` type produced by the scanner.

use crate::source::SourceRange;
use crate::symbol::Symbol;

/// A literal value carried by a token, already decoded from its source text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LiteralValue {
    Int(i64),
    UInt(u64),
    Float(f64),
}

/// The closed set of lexical token kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Identifier(Symbol),
    IntLiteral,
    FloatLiteral,
    StringLiteral,

    // Keywords
    KwIf,
    KwElse,
    KwFun,
    KwLet,
    KwVar,
    KwMut,
    KwThis,
    KwType,
    KwReturn,
    KwBreak,
    KwContinue,
    KwStruct,

    // Punctuation
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Dot,
    Colon,
    Semicolon,
    ImplicitSemicolon,
    Arrow,
    FatArrow,
    Question,
    Amp,
    AmpEq,
    Pipe,
    PipeEq,
    Caret,
    CaretEq,
    Star,
    StarEq,
    Plus,
    PlusEq,
    Minus,
    MinusEq,
    Slash,
    SlashEq,
    Percent,
    PercentEq,
    Bang,
    Eq,
    EqEq,
    BangEq,
    Lt,
    LtEq,
    LtLt,
    LtLtEq,
    Gt,
    GtEq,
    GtGt,
    GtGtEq,
    AmpAmp,
    PipePipe,

    Eof,
    /// Produced when the scanner hits an unrecoverable lexical error and
    /// forces end-of-stream; carries no further tokens after it.
    Invalid,
}

impl TokenKind {
    /// True for token kinds that arm automatic semicolon insertion: a
    /// newline immediately following one of these inserts an
    /// [`TokenKind::ImplicitSemicolon`] unless the next non-trivia token
    /// is an infix continuation.
    pub fn ends_statement(self) -> bool {
        matches!(
            self,
            TokenKind::Identifier(_)
                | TokenKind::IntLiteral
                | TokenKind::FloatLiteral
                | TokenKind::StringLiteral
                | TokenKind::RParen
                | TokenKind::RBrace
                | TokenKind::RBracket
                | TokenKind::KwReturn
                | TokenKind::KwBreak
                | TokenKind::KwContinue
                | TokenKind::KwThis
        )
    }
}

/// A single lexical token: its kind, source range, and (for literals) a
/// decoded value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub range: SourceRange,
    pub literal: Option<LiteralValue>,
}

impl Token {
    pub fn new(kind: TokenKind, range: SourceRange) -> Self {
        Token {
            kind,
            range,
            literal: None,
        }
    }

    pub fn with_literal(mut self, value: LiteralValue) -> Self {
        self.literal = Some(value);
        self
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ends_statement_covers_literals_and_closers() {
        assert!(TokenKind::IntLiteral.ends_statement());
        assert!(TokenKind::RParen.ends_statement());
        assert!(!TokenKind::Plus.ends_statement());
        assert!(!TokenKind::KwIf.ends_statement());
    }
}
