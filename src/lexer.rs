//! Converts a character stream into a token stream with row/column
//! positions. Identifier text is handed back as an owned `String`;
//! interning into a [`crate::symtab::SymbolTable`] happens one layer up,
//! in the parser, which is the first consumer that actually needs a
//! stable `Symbol` (for a declaration or a variable reference) rather
//! than just the raw spelling (for a member-access suffix like `.xyz`).

use crate::error::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    In,
    Out,
    Inout,
    Const,
    Uniform,
    Void,
    Float,
    Vec2,
    Vec3,
    Vec4,
    Return,
    Dot,
    Cross,
    Length,
    Sin,
    Asin,
    Cos,
    Acos,
    Tan,
    Atan,
    Accumulate,
    Normalize,
    Sqrt,
    Invsqrt,
    Max,
    Min,
    Floor,
    Ceil,
    Sampler,
    Sample1D,
    Sample2D,
    Sample3D,
}

impl Keyword {
    fn lookup(text: &str) -> Option<Keyword> {
        use Keyword::*;
        Some(match text {
            "in" => In,
            "out" => Out,
            "inout" => Inout,
            "const" => Const,
            "uniform" => Uniform,
            "void" => Void,
            "float" => Float,
            "vec2" => Vec2,
            "vec3" => Vec3,
            "vec4" => Vec4,
            "return" => Return,
            "dot" => Dot,
            "cross" => Cross,
            "length" => Length,
            "sin" => Sin,
            "asin" => Asin,
            "cos" => Cos,
            "acos" => Acos,
            "tan" => Tan,
            "atan" => Atan,
            "accumulate" => Accumulate,
            "normalize" => Normalize,
            "sqrt" => Sqrt,
            "invsqrt" => Invsqrt,
            "max" => Max,
            "min" => Min,
            "floor" => Floor,
            "ceil" => Ceil,
            "sampler" => Sampler,
            "sample1D" => Sample1D,
            "sample2D" => Sample2D,
            "sample3D" => Sample3D,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Punct {
    Semicolon,
    Colon,
    Dot,
    Comma,
    Question,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Plus,
    Minus,
    Star,
    Slash,
    Assign,
    Eq,
    Lt,
    Gt,
    Le,
    Ge,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Identifier(String),
    IntegerLiteral(i64),
    RealLiteral(f32),
    Keyword(Keyword),
    Punct(Punct),
    Eof,
    /// A lexical failure (e.g. an overflowing integer literal). The parser
    /// turns this into a `ParseError` and aborts.
    Failure(String),
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub at: Position,
}

/// Tokenizes a source string into a stream of [`Token`]s.
pub struct Lexer {
    chars: Vec<char>,
    index: usize,
    row: u32,
    column: u32,
    lookahead: Option<Token>,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            index: 0,
            row: 1,
            column: 1,
            lookahead: None,
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.chars.get(self.index).copied()
    }

    fn peek_char_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.index + offset).copied()
    }

    fn advance_char(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.index += 1;
        if c == '\n' {
            self.row += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn position(&self) -> Position {
        Position {
            row: self.row,
            column: self.column,
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek_char() {
                Some(c) if c.is_whitespace() => {
                    self.advance_char();
                }
                Some('/') if self.peek_char_at(1) == Some('/') => {
                    while let Some(c) = self.peek_char() {
                        if c == '\n' {
                            break;
                        }
                        self.advance_char();
                    }
                }
                _ => break,
            }
        }
    }

    fn lex_number(&mut self) -> TokenKind {
        let start = self.index;
        while matches!(self.peek_char(), Some(c) if c.is_ascii_digit()) {
            self.advance_char();
        }
        let is_real = self.peek_char() == Some('.');
        if !is_real {
            let text: String = self.chars[start..self.index].iter().collect();
            return match text.parse::<i64>() {
                Ok(value) => TokenKind::IntegerLiteral(value),
                Err(_) => TokenKind::Failure(format!("integer literal `{text}` overflows")),
            };
        }
        self.advance_char(); // consume '.'
        while matches!(self.peek_char(), Some(c) if c.is_ascii_digit()) {
            self.advance_char();
        }
        if matches!(self.peek_char(), Some('f') | Some('F')) {
            self.advance_char();
        }
        let mut text: String = self.chars[start..self.index].iter().collect();
        if text.ends_with(['f', 'F']) {
            text.pop();
        }
        match text.parse::<f32>() {
            Ok(value) => TokenKind::RealLiteral(value),
            Err(_) => TokenKind::Failure(format!("real literal `{text}` is invalid")),
        }
    }

    fn lex_identifier(&mut self) -> TokenKind {
        let start = self.index;
        while matches!(self.peek_char(), Some(c) if c.is_alphanumeric() || c == '_') {
            self.advance_char();
        }
        let text: String = self.chars[start..self.index].iter().collect();
        match Keyword::lookup(&text) {
            Some(keyword) => TokenKind::Keyword(keyword),
            None => TokenKind::Identifier(text),
        }
    }

    fn lex_punct(&mut self) -> Option<TokenKind> {
        let c = self.peek_char()?;
        let two = |lexer: &mut Self, second: char, with_second: Punct, without: Punct| {
            lexer.advance_char();
            if lexer.peek_char() == Some(second) {
                lexer.advance_char();
                with_second
            } else {
                without
            }
        };
        let punct = match c {
            ';' => {
                self.advance_char();
                Punct::Semicolon
            }
            ':' => {
                self.advance_char();
                Punct::Colon
            }
            '.' => {
                self.advance_char();
                Punct::Dot
            }
            ',' => {
                self.advance_char();
                Punct::Comma
            }
            '?' => {
                self.advance_char();
                Punct::Question
            }
            '(' => {
                self.advance_char();
                Punct::LParen
            }
            ')' => {
                self.advance_char();
                Punct::RParen
            }
            '{' => {
                self.advance_char();
                Punct::LBrace
            }
            '}' => {
                self.advance_char();
                Punct::RBrace
            }
            '[' => {
                self.advance_char();
                Punct::LBracket
            }
            ']' => {
                self.advance_char();
                Punct::RBracket
            }
            '+' => {
                self.advance_char();
                Punct::Plus
            }
            '-' => {
                self.advance_char();
                Punct::Minus
            }
            '*' => {
                self.advance_char();
                Punct::Star
            }
            '/' => {
                self.advance_char();
                Punct::Slash
            }
            '=' => two(self, '=', Punct::Eq, Punct::Assign),
            '<' => two(self, '=', Punct::Le, Punct::Lt),
            '>' => two(self, '=', Punct::Ge, Punct::Gt),
            _ => return None,
        };
        Some(TokenKind::Punct(punct))
    }

    fn scan(&mut self) -> Token {
        self.skip_whitespace_and_comments();
        let at = self.position();
        let kind = match self.peek_char() {
            None => TokenKind::Eof,
            Some(c) if c.is_ascii_digit() => self.lex_number(),
            Some(c) if c.is_alphabetic() || c == '_' => self.lex_identifier(),
            Some(_) => self
                .lex_punct()
                .unwrap_or_else(|| {
                    let bad = self.advance_char().unwrap();
                    TokenKind::Failure(format!("unexpected character `{bad}`"))
                }),
        };
        Token { kind, at }
    }

    /// Returns the next token without consuming it.
    pub fn peek(&mut self) -> &Token {
        if self.lookahead.is_none() {
            self.lookahead = Some(self.scan());
        }
        self.lookahead.as_ref().unwrap()
    }

    /// Consumes and returns the next token.
    pub fn next(&mut self) -> Token {
        if let Some(token) = self.lookahead.take() {
            return token;
        }
        self.scan()
    }
}
