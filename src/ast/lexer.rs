use std::fmt;

use crate::ast::{self, Position, Span, SENTINEL};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TokenKind {
    Char(char),
    Any,
    Union,
    Star,
    Plus,
    Question,
    LParen,
    RParen,
    Eof,
}

impl TokenKind {
    pub fn starts_factor(&self) -> bool {
        matches!(self, TokenKind::Char(_) | TokenKind::Any | TokenKind::LParen)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Char(c) => write!(f, "character {:?}", c),
            TokenKind::Any => write!(f, "'.'"),
            TokenKind::Union => write!(f, "'|'"),
            TokenKind::Star => write!(f, "'*'"),
            TokenKind::Plus => write!(f, "'+'"),
            TokenKind::Question => write!(f, "'?'"),
            TokenKind::LParen => write!(f, "'('"),
            TokenKind::RParen => write!(f, "')'"),
            TokenKind::Eof => write!(f, "end of pattern"),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

pub struct Lexer<'p> {
    pattern: &'p str,
}

impl<'p> Lexer<'p> {
    pub fn new(pattern: &'p str) -> Lexer<'p> {
        Lexer { pattern }
    }

    /// Splits the pattern into tokens. The last token is always `Eof`.
    pub fn scan(&self) -> Result<Vec<Token>, ast::Error> {
        let mut tokens = Vec::with_capacity(self.pattern.len() + 1);
        for (offset, c) in self.pattern.char_indices() {
            let span = Span::new(
                Position::new(offset),
                Position::new(offset + c.len_utf8()),
            );
            let kind = match c {
                '.' => TokenKind::Any,
                '|' => TokenKind::Union,
                '*' => TokenKind::Star,
                '+' => TokenKind::Plus,
                '?' => TokenKind::Question,
                '(' => TokenKind::LParen,
                ')' => TokenKind::RParen,
                SENTINEL => {
                    return Err(ast::Error::new(
                        ast::ErrorKind::ReservedCharacter,
                        self.pattern,
                        span,
                    ))
                }
                c => TokenKind::Char(c),
            };
            tokens.push(Token { kind, span });
        }
        tokens.push(Token {
            kind: TokenKind::Eof,
            span: Span::point(Position::new(self.pattern.len())),
        });
        Ok(tokens)
    }
}

#[cfg(test)]
mod test {
    use super::{Lexer, TokenKind};
    use crate::ast::ErrorKind;
    use pretty_assertions::assert_eq;

    fn kinds(s: &str) -> Vec<TokenKind> {
        Lexer::new(s)
            .scan()
            .expect("should scan")
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn operators() {
        use TokenKind::*;
        assert_eq!(
            kinds("a(b|.)*+?"),
            vec![
                Char('a'),
                LParen,
                Char('b'),
                Union,
                Any,
                RParen,
                Star,
                Plus,
                Question,
                Eof
            ]
        );
        assert_eq!(kinds(""), vec![Eof]);
    }

    #[test]
    fn spans_are_byte_offsets() {
        let tokens = Lexer::new("☃a").scan().expect("should scan");
        assert_eq!(tokens[0].span.end.offset, 3);
        assert_eq!(tokens[1].span.start.offset, 3);
        assert_eq!(tokens[2].span.start.offset, 4);
    }

    #[test]
    fn sentinel_is_rejected() {
        let err = Lexer::new("a\0").scan().unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::ReservedCharacter);
        assert_eq!(err.span().start.offset, 1);
    }
}
