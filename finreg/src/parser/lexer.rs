//! Pattern text → token stream. One pass, one byte of lookahead, no backtracking.

use crate::error::Error;
use crate::regex::class::ByteClass;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Literal(u8),
    Class(ByteClass),
    Union,
    Concat,
    Star,
    Plus,
    LParen,
    RParen,
    End,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub offset: usize,
}

struct Lexer<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a [u8]) -> Self {
        Self { input, pos: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn peek_at(&self, n: usize) -> Option<u8> {
        self.input.get(self.pos + n).copied()
    }

    /// Scans ahead from `from` for an unescaped `]` (a `/` skips the byte after it), without
    /// consuming anything. Used to tell a class body that merely starts with a literal `]` and
    /// closes later (`[]a]`) apart from a class that is empty and closes immediately (`[]`).
    fn has_unescaped_close_after(&self, from: usize) -> bool {
        let mut i = from;
        while let Some(b) = self.input.get(i).copied() {
            match b {
                b']' => return true,
                b'/' => i += 2,
                _ => i += 1,
            }
        }
        false
    }

    fn advance_byte(&mut self) -> Option<u8> {
        let b = self.peek();
        if b.is_some() {
            self.pos += 1;
        }
        b
    }

    /// Consumes one escaped byte, assuming the leading `/` has already been consumed at
    /// `esc_offset`. `/n`, `/t`, `/r` denote newline/tab/CR, `//` denotes `/`, and `/X` for any
    /// other `X` denotes `X` itself.
    fn read_escape(&mut self, esc_offset: usize) -> Result<u8, Error> {
        match self.advance_byte() {
            None => Err(Error::Syntax {
                offset: esc_offset,
                message: "trailing escape at end of pattern".to_string(),
            }),
            Some(b'n') => Ok(b'\n'),
            Some(b't') => Ok(b'\t'),
            Some(b'r') => Ok(b'\r'),
            Some(b'/') => Ok(b'/'),
            Some(x) => Ok(x),
        }
    }

    /// Reads one byte inside a character class body, honoring `/`-escapes.
    fn read_class_byte(&mut self, class_offset: usize) -> Result<u8, Error> {
        match self.advance_byte() {
            None => Err(Error::Syntax {
                offset: class_offset,
                message: "unterminated character class".to_string(),
            }),
            Some(b'/') => self.read_escape(class_offset),
            Some(b) => Ok(b),
        }
    }

    fn lex_class(&mut self, class_offset: usize) -> Result<ByteClass, Error> {
        let mut class = ByteClass::empty();
        let mut negate = false;
        if self.peek() == Some(b'^') {
            negate = true;
            self.advance_byte();
        }

        let mut first = true;
        loop {
            match self.peek() {
                None => {
                    return Err(Error::Syntax {
                        offset: class_offset,
                        message: "unterminated character class".to_string(),
                    })
                }
                Some(b']') if first && !self.has_unescaped_close_after(self.pos + 1) => {
                    // `[]` / `[^]`: no later `]` for the "first `]` stands for itself" rule to
                    // close against, so this is the terminator for a genuinely empty body.
                    self.advance_byte();
                    break;
                }
                Some(b']') if !first => {
                    self.advance_byte();
                    break;
                }
                _ => {
                    let lo = self.read_class_byte(class_offset)?;
                    first = false;
                    let is_range = self.peek() == Some(b'-')
                        && matches!(self.peek_at(1), Some(b) if b != b']');
                    if is_range {
                        self.advance_byte(); // consume '-'
                        let hi = self.read_class_byte(class_offset)?;
                        if lo > hi {
                            return Err(Error::Syntax {
                                offset: class_offset,
                                message: format!(
                                    "invalid range {lo}-{hi} in character class: start after end"
                                ),
                            });
                        }
                        class.insert_range(lo, hi);
                    } else {
                        class.insert(lo);
                    }
                }
            }
        }

        class.negate = negate;
        if class.is_empty_before_negation() {
            return Err(Error::InvalidClass {
                offset: class_offset,
            });
        }
        Ok(class)
    }
}

/// True for tokens that may precede an implicit concatenation (`spec.md` §4.1: T₁).
fn starts_concat_left(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Literal(_) | TokenKind::RParen | TokenKind::Star | TokenKind::Plus | TokenKind::Class(_)
    )
}

/// True for tokens that may follow an implicit concatenation (`spec.md` §4.1: T₂).
fn starts_concat_right(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Literal(_) | TokenKind::LParen | TokenKind::Class(_)
    )
}

fn insert_implicit_concat(tokens: Vec<Token>) -> Vec<Token> {
    let mut out = Vec::with_capacity(tokens.len() + tokens.len() / 2);
    for (i, token) in tokens.into_iter().enumerate() {
        if i > 0 {
            let prev_needs_concat = out
                .last()
                .map(|t: &Token| starts_concat_left(&t.kind))
                .unwrap_or(false);
            if prev_needs_concat && starts_concat_right(&token.kind) {
                out.push(Token {
                    kind: TokenKind::Concat,
                    offset: token.offset,
                });
            }
        }
        out.push(token);
    }
    out
}

/// Tokenizes a pattern. The returned stream always ends with exactly one `End` token.
pub fn tokenize(pattern: &[u8]) -> Result<Vec<Token>, Error> {
    let mut lexer = Lexer::new(pattern);
    let mut tokens = Vec::new();

    while let Some(b) = lexer.peek() {
        let offset = lexer.pos;
        let kind = match b {
            b'|' => {
                lexer.advance_byte();
                TokenKind::Union
            }
            b'*' => {
                lexer.advance_byte();
                TokenKind::Star
            }
            b'+' => {
                lexer.advance_byte();
                TokenKind::Plus
            }
            b'(' => {
                lexer.advance_byte();
                TokenKind::LParen
            }
            b')' => {
                lexer.advance_byte();
                TokenKind::RParen
            }
            b'[' => {
                lexer.advance_byte();
                TokenKind::Class(lexer.lex_class(offset)?)
            }
            b'/' => {
                lexer.advance_byte();
                TokenKind::Literal(lexer.read_escape(offset)?)
            }
            other => {
                lexer.advance_byte();
                TokenKind::Literal(other)
            }
        };
        tokens.push(Token { kind, offset });
    }

    tokens.push(Token {
        kind: TokenKind::End,
        offset: pattern.len(),
    });

    Ok(insert_implicit_concat(tokens))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(pattern: &str) -> Vec<TokenKind> {
        tokenize(pattern.as_bytes())
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn literal_concat_is_implicit() {
        assert_eq!(
            kinds("ab"),
            vec![
                TokenKind::Literal(b'a'),
                TokenKind::Concat,
                TokenKind::Literal(b'b'),
                TokenKind::End,
            ]
        );
    }

    #[test]
    fn union_has_no_implicit_concat() {
        assert_eq!(
            kinds("a|b"),
            vec![
                TokenKind::Literal(b'a'),
                TokenKind::Union,
                TokenKind::Literal(b'b'),
                TokenKind::End,
            ]
        );
    }

    #[test]
    fn star_then_literal_concats() {
        assert_eq!(
            kinds("a*b"),
            vec![
                TokenKind::Literal(b'a'),
                TokenKind::Star,
                TokenKind::Concat,
                TokenKind::Literal(b'b'),
                TokenKind::End,
            ]
        );
    }

    #[test]
    fn escapes() {
        assert_eq!(kinds("/n"), vec![TokenKind::Literal(b'\n'), TokenKind::End]);
        assert_eq!(kinds("//"), vec![TokenKind::Literal(b'/'), TokenKind::End]);
        assert_eq!(kinds("/*"), vec![TokenKind::Literal(b'*'), TokenKind::End]);
    }

    #[test]
    fn trailing_escape_is_syntax_error() {
        assert!(matches!(tokenize(b"a/"), Err(Error::Syntax { .. })));
    }

    #[test]
    fn empty_class_is_invalid() {
        assert!(matches!(tokenize(b"[]"), Err(Error::InvalidClass { .. })));
        assert!(matches!(tokenize(b"[^]"), Err(Error::InvalidClass { .. })));
    }

    #[test]
    fn unterminated_class_is_syntax_error() {
        assert!(matches!(tokenize(b"[abc"), Err(Error::Syntax { .. })));
    }

    #[test]
    fn leading_close_bracket_is_literal() {
        let kinds = kinds("[]a]");
        assert_eq!(kinds.len(), 2);
        assert!(matches!(kinds[0], TokenKind::Class(_)));
    }

    #[test]
    fn range() {
        let tokens = tokenize(b"[a-c]").unwrap();
        match &tokens[0].kind {
            TokenKind::Class(class) => {
                assert!(class.contains(b'a'));
                assert!(class.contains(b'b'));
                assert!(class.contains(b'c'));
                assert!(!class.contains(b'd'));
            }
            _ => panic!("expected class"),
        }
    }

    #[test]
    fn negated_class() {
        let tokens = tokenize(b"[^0-9]").unwrap();
        match &tokens[0].kind {
            TokenKind::Class(class) => {
                assert!(!class.contains(b'5'));
                assert!(class.contains(b'a'));
            }
            _ => panic!("expected class"),
        }
    }
}
