//! # finreg
//!
//! `finreg` is a from-scratch regular expression matching engine over byte strings, built as a
//! classical compiler pipeline rather than a backtracking or PCRE-style engine:
//!
//! ```text
//! pattern text --lex--> tokens --parse--> expression tree --Thompson--> ε-NFA
//!     --subset construction--> DFA --minimize--> minimal DFA --lower--> dense tables
//! ```
//!
//! Every stage is a plain transformation from one automaton representation to the next, and the
//! final [`Handle`] produced by [`compile`] runs matches in O(|word|) with no backtracking, no
//! catastrophic blowup, and no allocation per match.
//!
//! ## Usage
//!
//! ```
//! use finreg::compile;
//!
//! let handle = compile(b"(a|b)*abb").unwrap();
//! assert!(handle.is_match(b"abb"));
//! assert!(handle.is_match(b"aabb"));
//! assert!(!handle.is_match(b"abba"));
//! ```
//!
//! ## Pattern syntax
//!
//! See [`regex`] for the full grammar: literals, `[...]` character classes (with `^` negation
//! and `a-b` ranges), `|` alternation, implicit concatenation, and `*`/`+` repetition, with `/`
//! as the escape character.
//!
//! ## Operations
//!
//! This crate supports:
//!
//! * [Compiling a pattern](compile) straight to a matchable [`Handle`]
//! * [Parsing patterns](parser::compile) into an [expression tree](regex::Regex)
//! * [Thompson construction](regex::Regex::to_nfa) from an expression tree to an [`Nfa`](nfa::Nfa)
//! * [Subset construction](nfa::Nfa::to_dfa) from an NFA to a [`Dfa`](dfa::Dfa)
//! * [Minimizing a DFA](dfa::Dfa::minimize) via unreachable-state removal and
//!   [equivalence-class merging](dfa::Dfa::state_equivalence_classes)
//! * The DFA boolean algebra: [union](dfa::Dfa::union), [intersection](dfa::Dfa::intersection),
//!   [difference](dfa::Dfa::difference), [symmetric difference](dfa::Dfa::symmetric_difference),
//!   [inversion](dfa::Dfa::invert)
//! * [Checking whether two DFAs or NFAs are equivalent](dfa::Dfa::equivalent_to)
//! * [Step-by-step evaluation](dfa::Dfa::evaluator) of a DFA, for streaming or partial matches
//! * [Lexicographic enumeration](nfa::Nfa::words) of the words an automaton accepts
//! * [Dense-table lowering](fast::FastDfa) of a minimized DFA for the actual match driver

pub mod dfa;
pub mod error;
pub mod fast;
pub mod handle;
pub mod nfa;
pub mod parser;
pub mod regex;
mod table;

#[cfg(test)]
mod proptests;

pub use error::{Error, Result};
pub use handle::{compile, Handle};

#[cfg(test)]
mod tests {
    use super::*;

    /// End-to-end accept/reject table exercised through the public `compile`/`is_match` API
    /// (not just the individual pipeline stages each module already tests on its own).
    #[test]
    fn accepts_and_rejects_across_pipeline() {
        let cases: &[(&[u8], &[&str], &[&str])] = &[
            (b"a(b|c)*d", &["ad", "abd", "acd", "abcbcd"], &["", "a", "ad1", "abc"]),
            (b"[0-9]+", &["0", "42", "007"], &["", "a", "4a2"]),
            (b"(0|1)*", &["", "0", "1", "0101"], &["2", "01201"]),
            (b"a*", &["", "a", "aaaa"], &["b", "ab"]),
            (b"(a+b+)+", &["ab", "aaabbb", "aabbaabb"], &["", "a", "ba"]),
            (b"[^0-9]", &["a", "z", "."], &["0", "9", "aa"]),
        ];

        for (pattern, accept, reject) in cases {
            let handle = compile(pattern).unwrap();
            for w in *accept {
                assert!(handle.is_match(w.as_bytes()), "{pattern:?} should accept {w:?}");
            }
            for w in *reject {
                assert!(!handle.is_match(w.as_bytes()), "{pattern:?} should reject {w:?}");
            }
        }
    }

    #[test]
    fn handle_to_string_is_language_equivalent() {
        let handle = compile(b"(a|b)+c").unwrap();
        let reprinted = compile(handle.to_string().as_bytes()).unwrap();
        assert!(handle.dfa().equivalent_to(reprinted.dfa()));
    }

    #[test]
    fn syntax_errors_surface_as_err() {
        assert!(compile(b"(a").is_err());
        assert!(compile(b"a|").is_err());
        assert!(compile(b"[z-a]").is_err());
    }
}
