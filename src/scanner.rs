//! Streaming scanner with automatic semicolon insertion.

use crate::diagnostics::{DiagnosticKind, Diagnostics, Severity};
use crate::source::{SourceId, SourceLoc, SourceRange};
use crate::symbol::Interner;
use crate::token::{LiteralValue, Token, TokenKind};

/// Scans one token at a time from a byte buffer. Does not own the buffer;
/// callers keep the owning [`crate::source::SourceInput`] alive.
pub struct Scanner<'a> {
    bytes: &'a [u8],
    file: SourceId,
    pos: usize,
    line: u32,
    line_start: usize,
    /// Arms automatic semicolon insertion: set after emitting a token whose
    /// kind `ends_statement()`.
    insert_semi: bool,
    /// Set once an unrecoverable lexical error has forced end-of-input.
    terminated: bool,
}

impl<'a> Scanner<'a> {
    pub fn new(file: SourceId, bytes: &'a [u8]) -> Self {
        Scanner {
            bytes,
            file,
            pos: 0,
            line: 1,
            line_start: 0,
            insert_semi: false,
            terminated: false,
        }
    }

    fn loc(&self) -> SourceLoc {
        SourceLoc::new(self.file, self.line, (self.pos - self.line_start + 1) as u32)
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    fn newline(&mut self) {
        self.line += 1;
        self.line_start = self.pos;
    }

    fn force_terminate(&mut self) {
        self.terminated = true;
        self.pos = self.bytes.len();
    }

    /// Produces the next token, consulting and updating `insert_semi`.
    /// Skips whitespace and comments; emits a synthetic
    /// [`TokenKind::ImplicitSemicolon`] when a newline was crossed while
    /// `insert_semi` was armed.
    pub fn next(&mut self, interner: &Interner, diags: &Diagnostics) -> Token {
        if self.terminated {
            return Token::new(TokenKind::Eof, SourceRange::point(self.loc()));
        }

        let crossed_newline = self.skip_trivia(diags);
        if self.terminated {
            return Token::new(TokenKind::Eof, SourceRange::point(self.loc()));
        }

        if crossed_newline && self.insert_semi {
            self.insert_semi = false;
            let loc = self.loc();
            return Token::new(TokenKind::ImplicitSemicolon, SourceRange::point(loc));
        }

        let start = self.loc();
        let Some(b) = self.peek() else {
            self.insert_semi = false;
            return Token::new(TokenKind::Eof, SourceRange::point(start));
        };

        let tok = if b.is_ascii_digit() {
            self.scan_number(start, diags)
        } else if b == b'"' {
            self.scan_string(start, diags)
        } else if is_ident_start(b) || b >= 0x80 {
            self.scan_identifier(start, interner, diags)
        } else {
            self.scan_punct(start, diags)
        };

        self.insert_semi = tok.kind.ends_statement();
        tok
    }

    /// Skips whitespace and comments. Returns true if at least one newline
    /// was crossed.
    fn skip_trivia(&mut self, diags: &Diagnostics) -> bool {
        let mut crossed = false;
        loop {
            match self.peek() {
                Some(b'\n') => {
                    self.bump();
                    self.newline();
                    crossed = true;
                }
                Some(b) if b == b' ' || b == b'\t' || b == b'\r' => {
                    self.bump();
                }
                Some(b'/') if self.peek_at(1) == Some(b'/') => {
                    while let Some(b) = self.peek() {
                        if b == b'\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                Some(b'/') if self.peek_at(1) == Some(b'*') => {
                    let start = self.loc();
                    self.bump();
                    self.bump();
                    let mut closed = false;
                    // The first `*` immediately after `/*` never closes the
                    // comment on its own: `/*/` is not terminated.
                    while let Some(b) = self.peek() {
                        if b == b'*' && self.peek_at(1) == Some(b'/') {
                            self.bump();
                            self.bump();
                            closed = true;
                            break;
                        }
                        if b == b'\n' {
                            self.bump();
                            self.newline();
                            crossed = true;
                        } else {
                            self.bump();
                        }
                    }
                    if !closed {
                        diags.report(
                            DiagnosticKind::Lexical,
                            Severity::Error,
                            SourceRange::point(start),
                            "unterminated block comment".to_string(),
                        );
                        self.force_terminate();
                        return crossed;
                    }
                }
                _ => break,
            }
        }
        crossed
    }

    fn scan_identifier(&mut self, start: SourceLoc, interner: &Interner, diags: &Diagnostics) -> Token {
        let from = self.pos;
        while let Some(b) = self.peek() {
            if b < 0x80 {
                if is_ident_continue(b) {
                    self.bump();
                } else {
                    break;
                }
            } else {
                match self.scan_utf8_continuation(diags) {
                    Ok(()) => continue,
                    Err(()) => {
                        self.force_terminate();
                        return Token::new(
                            TokenKind::Invalid,
                            SourceRange::new(start, self.loc()),
                        );
                    }
                }
            }
        }
        let text = &self.bytes[from..self.pos];
        let end = self.loc();
        let range = SourceRange::new(start, end);
        if let Some(kw) = keyword_kind(text) {
            return Token::new(kw, range);
        }
        // `true`/`false` are ordinary identifiers; `builtins::install` binds
        // them in the outermost scope, so they resolve through the same
        // lookup path as any other name rather than a scanner special case.
        let sym = interner.intern(text);
        Token::new(TokenKind::Identifier(sym), range)
    }

    /// Consumes one UTF-8 multi-byte sequence starting at the current byte
    /// (which must be ≥ 0x80). Returns an error without consuming further
    /// bytes if the sequence is malformed.
    fn scan_utf8_continuation(&mut self, diags: &Diagnostics) -> Result<(), ()> {
        let start_pos = self.pos;
        let lead = self.bytes[start_pos];
        let len = if lead & 0b1110_0000 == 0b1100_0000 {
            2
        } else if lead & 0b1111_0000 == 0b1110_0000 {
            3
        } else if lead & 0b1111_1000 == 0b1111_0000 {
            4
        } else {
            diags.report(
                DiagnosticKind::Lexical,
                Severity::Error,
                SourceRange::point(self.loc()),
                "invalid UTF-8 leading byte in identifier".to_string(),
            );
            return Err(());
        };
        let slice_end = (start_pos + len).min(self.bytes.len());
        let slice = &self.bytes[start_pos..slice_end];
        if slice.len() < len || std::str::from_utf8(slice).is_err() {
            diags.report(
                DiagnosticKind::Lexical,
                Severity::Error,
                SourceRange::point(self.loc()),
                "malformed UTF-8 sequence in identifier".to_string(),
            );
            return Err(());
        }
        self.pos += len;
        Ok(())
    }

    fn scan_number(&mut self, start: SourceLoc, diags: &Diagnostics) -> Token {
        let base: u32 = if self.peek() == Some(b'0') {
            match self.peek_at(1) {
                Some(b'x') | Some(b'X') => {
                    self.bump();
                    self.bump();
                    16
                }
                Some(b'o') | Some(b'O') => {
                    self.bump();
                    self.bump();
                    8
                }
                Some(b'b') | Some(b'B') => {
                    self.bump();
                    self.bump();
                    2
                }
                _ => 10,
            }
        } else {
            10
        };

        let digits_start = self.pos;
        let mut last_was_underscore = false;
        let mut saw_digit = false;
        let mut is_float = false;
        let mut accum: u128 = 0;
        let mut overflowed = false;

        while let Some(b) = self.peek() {
            if b == b'_' {
                self.bump();
                last_was_underscore = true;
                continue;
            }
            if let Some(d) = digit_value(b, base) {
                self.bump();
                last_was_underscore = false;
                saw_digit = true;
                accum = accum.wrapping_mul(base as u128).wrapping_add(d as u128);
                if accum > u64::MAX as u128 {
                    overflowed = true;
                }
                continue;
            }
            break;
        }

        if base == 10 {
            if self.peek() == Some(b'.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
                is_float = true;
                self.bump();
                while let Some(b) = self.peek() {
                    if b.is_ascii_digit() {
                        self.bump();
                    } else if b == b'_' {
                        self.bump();
                    } else {
                        break;
                    }
                }
            }
            if matches!(self.peek(), Some(b'e') | Some(b'E')) {
                let save = self.pos;
                self.bump();
                if matches!(self.peek(), Some(b'+') | Some(b'-')) {
                    self.bump();
                }
                if self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    is_float = true;
                    while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                        self.bump();
                    }
                } else {
                    self.pos = save;
                }
            }
        }

        if last_was_underscore {
            diags.report(
                DiagnosticKind::Lexical,
                Severity::Error,
                SourceRange::point(self.loc()),
                "trailing digit separator `_` in numeric literal".to_string(),
            );
        }
        if !saw_digit {
            diags.report(
                DiagnosticKind::Lexical,
                Severity::Error,
                SourceRange::new(start, self.loc()),
                "numeric literal has no digits".to_string(),
            );
        }

        let end = self.loc();
        let range = SourceRange::new(start, end);
        let text: String = self.bytes[digits_start..self.pos]
            .iter()
            .map(|&b| b as char)
            .filter(|c| *c != '_')
            .collect();

        if is_float {
            let parsed: f64 = text.parse().unwrap_or(f64::INFINITY);
            if parsed.is_infinite() {
                diags.report(
                    DiagnosticKind::Lexical,
                    Severity::Error,
                    range,
                    "floating-point literal overflows".to_string(),
                );
            }
            return Token::new(TokenKind::FloatLiteral, range)
                .with_literal(LiteralValue::Float(parsed));
        }

        if overflowed {
            diags.report(
                DiagnosticKind::Lexical,
                Severity::Error,
                range,
                "integer literal overflows 64 bits".to_string(),
            );
            return Token::new(TokenKind::IntLiteral, range)
                .with_literal(LiteralValue::UInt(u64::MAX));
        }

        let value = accum as u64;
        if value <= i64::MAX as u64 {
            Token::new(TokenKind::IntLiteral, range).with_literal(LiteralValue::Int(value as i64))
        } else {
            Token::new(TokenKind::IntLiteral, range).with_literal(LiteralValue::UInt(value))
        }
    }

    fn scan_string(&mut self, start: SourceLoc, diags: &Diagnostics) -> Token {
        self.bump(); // opening quote
        loop {
            match self.peek() {
                None => {
                    diags.report(
                        DiagnosticKind::Lexical,
                        Severity::Error,
                        SourceRange::new(start, self.loc()),
                        "unterminated string literal".to_string(),
                    );
                    self.force_terminate();
                    return Token::new(TokenKind::Invalid, SourceRange::new(start, self.loc()));
                }
                Some(b'"') => {
                    self.bump();
                    break;
                }
                Some(b'\\') => {
                    self.bump();
                    self.bump();
                }
                Some(b'\n') => {
                    diags.report(
                        DiagnosticKind::Lexical,
                        Severity::Error,
                        SourceRange::new(start, self.loc()),
                        "unterminated string literal".to_string(),
                    );
                    return Token::new(TokenKind::Invalid, SourceRange::new(start, self.loc()));
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
        Token::new(TokenKind::StringLiteral, SourceRange::new(start, self.loc()))
    }

    fn scan_punct(&mut self, start: SourceLoc, diags: &Diagnostics) -> Token {
        let b = self.bump().unwrap();
        macro_rules! two {
            ($second:expr, $two_kind:expr, $one_kind:expr) => {{
                if self.peek() == Some($second) {
                    self.bump();
                    $two_kind
                } else {
                    $one_kind
                }
            }};
        }
        let kind = match b {
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b'{' => TokenKind::LBrace,
            b'}' => TokenKind::RBrace,
            b'[' => TokenKind::LBracket,
            b']' => TokenKind::RBracket,
            b',' => TokenKind::Comma,
            b'.' => TokenKind::Dot,
            b':' => TokenKind::Colon,
            b';' => TokenKind::Semicolon,
            b'?' => TokenKind::Question,
            b'%' => two!(b'=', TokenKind::PercentEq, TokenKind::Percent),
            b'*' => two!(b'=', TokenKind::StarEq, TokenKind::Star),
            b'+' => two!(b'=', TokenKind::PlusEq, TokenKind::Plus),
            b'/' => two!(b'=', TokenKind::SlashEq, TokenKind::Slash),
            b'^' => two!(b'=', TokenKind::CaretEq, TokenKind::Caret),
            b'&' => {
                if self.peek() == Some(b'&') {
                    self.bump();
                    TokenKind::AmpAmp
                } else if self.peek() == Some(b'=') {
                    self.bump();
                    TokenKind::AmpEq
                } else {
                    TokenKind::Amp
                }
            }
            b'|' => {
                if self.peek() == Some(b'|') {
                    self.bump();
                    TokenKind::PipePipe
                } else if self.peek() == Some(b'=') {
                    self.bump();
                    TokenKind::PipeEq
                } else {
                    TokenKind::Pipe
                }
            }
            b'=' => {
                if self.peek() == Some(b'=') {
                    self.bump();
                    TokenKind::EqEq
                } else if self.peek() == Some(b'>') {
                    self.bump();
                    TokenKind::FatArrow
                } else {
                    TokenKind::Eq
                }
            }
            b'!' => two!(b'=', TokenKind::BangEq, TokenKind::Bang),
            b'<' => {
                if self.peek() == Some(b'<') {
                    self.bump();
                    if self.peek() == Some(b'=') {
                        self.bump();
                        TokenKind::LtLtEq
                    } else {
                        TokenKind::LtLt
                    }
                } else if self.peek() == Some(b'=') {
                    self.bump();
                    TokenKind::LtEq
                } else {
                    TokenKind::Lt
                }
            }
            b'>' => {
                if self.peek() == Some(b'>') {
                    self.bump();
                    if self.peek() == Some(b'=') {
                        self.bump();
                        TokenKind::GtGtEq
                    } else {
                        TokenKind::GtGt
                    }
                } else if self.peek() == Some(b'=') {
                    self.bump();
                    TokenKind::GtEq
                } else {
                    TokenKind::Gt
                }
            }
            b'-' => {
                if self.peek() == Some(b'>') {
                    self.bump();
                    TokenKind::Arrow
                } else if self.peek() == Some(b'=') {
                    self.bump();
                    TokenKind::MinusEq
                } else {
                    TokenKind::Minus
                }
            }
            other => {
                diags.report(
                    DiagnosticKind::Lexical,
                    Severity::Error,
                    SourceRange::point(start),
                    format!("unexpected byte {:#04x}", other),
                );
                TokenKind::Invalid
            }
        };
        Token::new(kind, SourceRange::new(start, self.loc()))
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn digit_value(b: u8, base: u32) -> Option<u32> {
    let v = match b {
        b'0'..=b'9' => (b - b'0') as u32,
        b'a'..=b'f' => (b - b'a') as u32 + 10,
        b'A'..=b'F' => (b - b'A') as u32 + 10,
        _ => return None,
    };
    if v < base {
        Some(v)
    } else {
        None
    }
}

fn keyword_kind(text: &[u8]) -> Option<TokenKind> {
    Some(match text {
        b"if" => TokenKind::KwIf,
        b"else" => TokenKind::KwElse,
        b"fun" => TokenKind::KwFun,
        b"let" => TokenKind::KwLet,
        b"var" => TokenKind::KwVar,
        b"mut" => TokenKind::KwMut,
        b"this" => TokenKind::KwThis,
        b"type" => TokenKind::KwType,
        b"return" => TokenKind::KwReturn,
        b"break" => TokenKind::KwBreak,
        b"continue" => TokenKind::KwContinue,
        b"struct" => TokenKind::KwStruct,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(src: &str) -> (Vec<TokenKind>, Diagnostics) {
        let interner = Interner::new();
        let diags = Diagnostics::new();
        let mut sc = Scanner::new(SourceId(0), src.as_bytes());
        let mut kinds = Vec::new();
        loop {
            let t = sc.next(&interner, &diags);
            let done = t.kind == TokenKind::Eof;
            kinds.push(t.kind);
            if done {
                break;
            }
        }
        (kinds, diags)
    }

    #[test]
    fn implicit_semicolon_after_newline_following_identifier() {
        let (kinds, _) = tokens("x\ny");
        assert!(kinds.contains(&TokenKind::ImplicitSemicolon));
    }

    #[test]
    fn no_implicit_semicolon_without_newline() {
        let (kinds, _) = tokens("x + y");
        assert!(!kinds.contains(&TokenKind::ImplicitSemicolon));
    }

    #[test]
    fn slash_star_slash_is_not_closed() {
        let (_, diags) = tokens("/*/ */");
        assert!(diags.has_errors());
    }

    #[test]
    fn balanced_block_comment_closes() {
        let (kinds, diags) = tokens("/* hello */ x");
        assert!(!diags.has_errors());
        assert!(matches!(kinds[0], TokenKind::Identifier(_)));
    }

    #[test]
    fn trailing_underscore_rejected() {
        let (_, diags) = tokens("123_");
        assert!(diags.has_errors());
    }

    #[test]
    fn digit_separator_accepted_between_digits() {
        let (_, diags) = tokens("1_000");
        assert!(!diags.has_errors());
    }

    #[test]
    fn u64_max_fits_without_overflow() {
        let (kinds, diags) = tokens("0xFFFFFFFFFFFFFFFF");
        assert!(!diags.has_errors());
        assert_eq!(kinds[0], TokenKind::IntLiteral);
    }

    #[test]
    fn past_u64_max_overflows() {
        let (_, diags) = tokens("0x1FFFFFFFFFFFFFFFF");
        assert!(diags.has_errors());
    }

    #[test]
    fn keyword_recognized() {
        let (kinds, _) = tokens("fun");
        assert_eq!(kinds[0], TokenKind::KwFun);
    }
}
