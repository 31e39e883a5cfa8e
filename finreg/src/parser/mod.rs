//! Pattern text → expression tree (`spec.md` §4.2): a recursive-descent parser over the token
//! stream produced by [`lexer`], implementing the precedence ladder union < concat < postfix <
//! atom, each level left-associative.
//!
//! ```
//! use finreg::parser;
//!
//! let re = parser::compile(b"a(b|c)*d").unwrap();
//! assert!(re.to_nfa().accepts(b"abccbd"));
//! ```

pub mod lexer;

use crate::error::Error;
use crate::regex::class::ByteClass;
use crate::regex::{Regex, RegexTree};
use lexer::{Token, TokenKind};

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &TokenKind {
        &self.tokens[self.pos].kind
    }

    fn offset(&self) -> usize {
        self.tokens[self.pos].offset
    }

    fn advance(&mut self) -> TokenKind {
        let kind = self.tokens[self.pos].kind.clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        kind
    }

    fn expect(&mut self, kind: &TokenKind, context: &str) -> Result<(), Error> {
        if self.peek() == kind {
            self.advance();
            Ok(())
        } else {
            Err(Error::Syntax {
                offset: self.offset(),
                message: format!("expected {context}"),
            })
        }
    }

    /// `union := concat ('|' concat)*`
    fn parse_union(&mut self) -> Result<RegexTree, Error> {
        let mut tree = self.parse_concat()?;
        while *self.peek() == TokenKind::Union {
            self.advance();
            let rhs = self.parse_concat()?;
            tree = RegexTree::Union(Box::new(tree), Box::new(rhs));
        }
        Ok(tree)
    }

    /// `concat := postfix (concat-token postfix)*`, where the lexer has already inserted an
    /// explicit [`TokenKind::Concat`] token between adjacent operands (`spec.md` §4.1).
    fn parse_concat(&mut self) -> Result<RegexTree, Error> {
        let mut tree = self.parse_postfix()?;
        while *self.peek() == TokenKind::Concat {
            self.advance();
            let rhs = self.parse_postfix()?;
            tree = RegexTree::Concat(Box::new(tree), Box::new(rhs));
        }
        Ok(tree)
    }

    /// `postfix := atom ('*' | '+')*`
    fn parse_postfix(&mut self) -> Result<RegexTree, Error> {
        let mut tree = self.parse_atom()?;
        loop {
            match self.peek() {
                TokenKind::Star => {
                    self.advance();
                    tree = RegexTree::Star(Box::new(tree));
                }
                TokenKind::Plus => {
                    self.advance();
                    tree = RegexTree::Plus(Box::new(tree));
                }
                _ => break,
            }
        }
        Ok(tree)
    }

    /// `atom := literal | class | '(' union ')'`
    fn parse_atom(&mut self) -> Result<RegexTree, Error> {
        match self.advance() {
            TokenKind::Literal(b) => Ok(RegexTree::Literal(b)),
            TokenKind::Class(class) => Ok(RegexTree::Class(class)),
            TokenKind::LParen => {
                let inner = self.parse_union()?;
                self.expect(&TokenKind::RParen, "closing ')'")?;
                Ok(inner)
            }
            other => Err(Error::Syntax {
                offset: self.offset(),
                message: format!("unexpected token {other:?}"),
            }),
        }
    }
}

/// Parses `pattern` into a [`Regex`] expression tree. An empty pattern compiles to
/// [`RegexTree::Epsilon`] (`spec.md` §3: "there is no explicit epsilon literal; the empty string
/// arises only from operator semantics"), so this is the only place `Epsilon` is ever produced
/// directly rather than via `a*`-style operator semantics.
pub fn compile(pattern: &[u8]) -> Result<Regex, Error> {
    let tokens = lexer::tokenize(pattern)?;
    if tokens.len() == 1 {
        debug_assert_eq!(tokens[0].kind, TokenKind::End);
        return Ok(Regex {
            tree: RegexTree::Epsilon,
        });
    }

    let mut parser = Parser { tokens, pos: 0 };
    let tree = parser.parse_union()?;
    if *parser.peek() != TokenKind::End {
        return Err(Error::Syntax {
            offset: parser.offset(),
            message: format!("unexpected trailing token {:?}", parser.peek()),
        });
    }
    Ok(Regex { tree })
}

/// Parses a byte string already known to denote a single character class body, used internally
/// by tests that want a standalone [`ByteClass`] without going through a whole pattern.
#[cfg(test)]
fn parse_class_for_test(pattern: &[u8]) -> Result<ByteClass, Error> {
    match compile(pattern)?.tree {
        RegexTree::Class(c) => Ok(c),
        _ => panic!("expected a class-only pattern"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precedence_union_below_concat() {
        // a|bc means a|(bc), not (a|b)c
        let re = compile(b"a|bc").unwrap();
        assert!(re.to_nfa().accepts(b"a"));
        assert!(re.to_nfa().accepts(b"bc"));
        assert!(!re.to_nfa().accepts(b"ac"));
    }

    #[test]
    fn precedence_postfix_above_concat() {
        // ab* means a(b*), not (ab)*
        let re = compile(b"ab*").unwrap();
        assert!(re.to_nfa().accepts(b"a"));
        assert!(re.to_nfa().accepts(b"abbb"));
        assert!(!re.to_nfa().accepts(b"abab"));
    }

    #[test]
    fn parens_override_precedence() {
        let re = compile(b"(a|b)*c").unwrap();
        assert!(re.to_nfa().accepts(b"c"));
        assert!(re.to_nfa().accepts(b"ababbac"));
        assert!(!re.to_nfa().accepts(b"ab"));
    }

    #[test]
    fn unmatched_paren_is_syntax_error() {
        assert!(matches!(compile(b"(a"), Err(Error::Syntax { .. })));
        assert!(matches!(compile(b"a)"), Err(Error::Syntax { .. })));
    }

    #[test]
    fn dangling_operator_is_syntax_error() {
        assert!(matches!(compile(b"*"), Err(Error::Syntax { .. })));
        assert!(matches!(compile(b"|a"), Err(Error::Syntax { .. })));
        assert!(matches!(compile(b"a|"), Err(Error::Syntax { .. })));
    }

    #[test]
    fn class_atom_parses() {
        let class = parse_class_for_test(b"[a-c]").unwrap();
        assert!(class.contains(b'b'));
        assert!(!class.contains(b'd'));
    }

    #[test]
    fn empty_pattern_compiles_to_epsilon() {
        assert_eq!(compile(b"").unwrap().tree, RegexTree::Epsilon);
    }
}
