//! The compiled, ready-to-match form of a pattern (`spec.md` §4.8, §6).
//!
//! A [`Handle`] is built once by [`compile`] and is immutable from then on: the whole pipeline
//! (lex, parse, Thompson construction, subset construction, minimization, dense-table lowering)
//! runs eagerly at construction time rather than being deferred behind interior mutability, so a
//! `Handle` is trivially `Send + Sync` and every [`Handle::is_match`] call is just array indexing.

use crate::dfa::Dfa;
use crate::error::{Error, Result};
use crate::fast::FastDfa;
use crate::parser;
use crate::regex::Regex;

/// A compiled pattern. Cheap to query ([`Handle::is_match`] is O(|word|)), not cheap to build
/// (construction runs the full pipeline once).
#[derive(Debug, Clone)]
pub struct Handle {
    tree: Regex,
    dfa: Dfa,
    fast: FastDfa,
}

impl Handle {
    /// Whether `word` is accepted by the pattern this handle was compiled from.
    ///
    /// Named `is_match` rather than `match`, since the latter is a reserved keyword.
    pub fn is_match(&self, word: &[u8]) -> bool {
        self.fast.run(word)
    }

    /// The minimized DFA backing this handle, for callers that want automaton-level operations
    /// (`union`, `equivalent_to`, `to_table`, ...) rather than just yes/no matching.
    pub fn dfa(&self) -> &Dfa {
        &self.dfa
    }

    /// The parsed expression tree this handle was compiled from.
    pub fn tree(&self) -> &Regex {
        &self.tree
    }

    /// Re-renders the pattern this handle was compiled from. Not guaranteed to be
    /// byte-for-byte identical to the original source text (e.g. escapes may be
    /// re-escaped differently), only language-equivalent.
    pub fn to_string(&self) -> String {
        self.tree.to_string()
    }
}

/// Compiles a pattern into a [`Handle`], running the full pipeline once: lex, parse, Thompson
/// construction, subset construction, minimization, dense-table lowering (`spec.md` §2).
pub fn compile(pattern: &[u8]) -> Result<Handle> {
    let tree = parser::compile(pattern)?;
    let nfa = tree.clone().to_nfa();
    let mut dfa = nfa.to_dfa();
    dfa.minimize();
    let fast = FastDfa::from_dfa(&dfa);
    Ok(Handle { tree, dfa, fast })
}

const _: fn() = || {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Handle>();
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiles_and_matches() {
        let h = compile(b"a(b|c)*d").unwrap();
        assert!(h.is_match(b"ad"));
        assert!(h.is_match(b"abccbd"));
        assert!(!h.is_match(b"ab"));
        assert!(!h.is_match(b""));
    }

    #[test]
    fn rejects_invalid_pattern() {
        assert!(compile(b"(a").is_err());
        assert!(compile(b"a)").is_err());
        assert!(compile(b"*").is_err());
        assert!(compile(b"[]").is_err());
    }

    #[test]
    fn empty_pattern_matches_only_empty_word() {
        let h = compile(b"").unwrap();
        assert!(h.is_match(b""));
        assert!(!h.is_match(b"a"));
    }
}
