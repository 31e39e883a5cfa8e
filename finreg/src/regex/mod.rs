//! # Expression trees
//!
//! A [`Regex`] wraps an immutable [`RegexTree`], the algebraic representation of a regular
//! language described in `spec.md` §3. The only operations on it are converting it to an [`Nfa`]
//! via Thompson construction (`Regex::to_nfa`) and pretty-printing it back to pattern syntax
//! (`Regex::to_string`, used for the compiled handle's diagnostics, `spec.md` §6).
//!
//! ## Syntax
//!
//! Patterns are byte strings. There are seven reserved bytes: `(`, `)`, `[`, `]`, `|`, `*`, `+`
//! and `/`. These need to be escaped with `/` (`/(`, `/|`, `//`, ...) to be used literally; every
//! other byte is a literal. `/n`, `/t`, `/r` denote newline, tab and carriage return. `(`/`)`
//! group, `[...]` (with an optional leading `^` for negation, and `a-b` ranges) denotes a
//! character class, `|` denotes alternation, and `*`/`+` are Kleene star/plus. There is no
//! explicit epsilon or empty-language literal: the empty string arises only from operator
//! semantics (e.g. `a*` matches it), and the empty language can only be reached through an
//! (invalid) empty character class.
//!
//! ```
//! use finreg::parser;
//!
//! let re = parser::compile(b"(a|b)*abb").unwrap();
//! let nfa = re.to_nfa();
//! assert!(nfa.accepts(b"abb"));
//! assert!(nfa.accepts(b"aabb"));
//! assert!(!nfa.accepts(b"abba"));
//! ```

pub mod class;

use crate::nfa::{Nfa, NfaState};
use class::ByteClass;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Regex {
    pub tree: RegexTree,
}

/// Closed sum type over the regular-expression algebra (`spec.md` §3). Atomicity (whether a
/// node needs surrounding parentheses when it is the operand of a lower-precedence operator) is
/// `true` exactly for the four leaf kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegexTree {
    EmptySet,
    Epsilon,
    Literal(u8),
    Class(ByteClass),
    Concat(Box<RegexTree>, Box<RegexTree>),
    Union(Box<RegexTree>, Box<RegexTree>),
    Star(Box<RegexTree>),
    Plus(Box<RegexTree>),
}

impl RegexTree {
    pub fn is_atomic(&self) -> bool {
        matches!(
            self,
            RegexTree::EmptySet | RegexTree::Epsilon | RegexTree::Literal(_) | RegexTree::Class(_)
        )
    }
}

#[derive(Clone, Debug)]
struct StateCounter {
    state: usize,
}

impl StateCounter {
    fn new() -> Self {
        Self { state: 0 }
    }

    fn next(&mut self) -> usize {
        let old = self.state;
        self.state += 1;
        old
    }

    fn peek(&self) -> usize {
        self.state
    }
}

fn blank_state() -> NfaState {
    NfaState {
        accepting: false,
        epsilon_transitions: vec![],
        transitions: vec![],
    }
}

impl Regex {
    /// Thompson construction (`spec.md` §4.3). State 0 is the single global accepting state,
    /// state 1 the initial state; every leaf either routes to its `send_to` continuation or (for
    /// `EmptySet`) routes nowhere at all, so composing fragments never needs to retroactively
    /// flip an `accepting` flag on an already-built state.
    pub fn to_nfa(self) -> Nfa {
        let mut counter = StateCounter::new();
        let mut char_map: HashMap<u8, usize> = HashMap::new();
        let mut idx_acc = 0..;
        let mut byte_idx =
            |b: u8| -> usize { *char_map.entry(b).or_insert_with(|| idx_acc.next().unwrap()) };

        let accepting_state = NfaState {
            accepting: true,
            epsilon_transitions: vec![],
            transitions: vec![],
        };
        counter.next(); // id 0, consumed by accepting_state

        let initial_state = NfaState {
            accepting: false,
            epsilon_transitions: vec![counter.peek()], // predicts the root fragment's start, id 2
            transitions: vec![],
        };
        counter.next(); // id 1, consumed by initial_state

        let states = {
            let mut tree_states = Self::build(self.tree, &mut counter, &mut byte_idx, 0);
            let mut all = Vec::with_capacity(tree_states.len() + 2);
            all.push(accepting_state); // id 0
            all.push(initial_state); // id 1
            all.append(&mut tree_states);
            all.iter_mut()
                .for_each(|s| s.transitions.resize(char_map.len(), vec![]));
            all
        };

        let alphabet = {
            let mut by_idx: Vec<(u8, usize)> = char_map.into_iter().collect();
            by_idx.sort_by_key(|(_, idx)| *idx);
            by_idx.into_iter().map(|(b, _)| b).collect()
        };

        Nfa {
            alphabet,
            states,
            initial_state: 1,
        }
    }

    /// Recursively builds the states for `tree`, returning them in strict ascending-id order
    /// (so that appending them in this order to the overall state vector keeps `states[i]` the
    /// state with id `i`). `send_to` is the state this fragment transitions to once matched.
    fn build(
        tree: RegexTree,
        counter: &mut StateCounter,
        byte_idx: &mut impl FnMut(u8) -> usize,
        send_to: usize,
    ) -> Vec<NfaState> {
        let incoming_idx = counter.next();
        let mut incoming = blank_state();

        match tree {
            RegexTree::EmptySet => {
                // No transitions at all: unreachable from this fragment's own entry, so the
                // language is ∅ regardless of what `send_to` or the global accept state are.
                vec![incoming]
            }
            RegexTree::Epsilon => {
                incoming.epsilon_transitions.push(send_to);
                vec![incoming]
            }
            RegexTree::Literal(b) => {
                let idx = byte_idx(b);
                let mut transitions = vec![vec![]; idx];
                transitions.push(vec![send_to]);
                incoming.transitions = transitions;
                vec![incoming]
            }
            RegexTree::Class(class) => {
                let mut max_idx = 0;
                let mut edges: Vec<(usize, usize)> = Vec::new();
                for b in class.members() {
                    let idx = byte_idx(b);
                    max_idx = max_idx.max(idx);
                    edges.push((idx, send_to));
                }
                let mut transitions = vec![vec![]; max_idx + 1];
                for (idx, target) in edges {
                    transitions[idx].push(target);
                }
                incoming.transitions = transitions;
                vec![incoming]
            }
            RegexTree::Concat(l, r) => {
                let mid_idx = counter.next();
                incoming.epsilon_transitions.push(counter.peek());
                let l_states = Self::build(*l, counter, byte_idx, mid_idx);
                let mut mid = blank_state();
                mid.epsilon_transitions.push(counter.peek());
                let r_states = Self::build(*r, counter, byte_idx, send_to);
                debug_assert_eq!(mid_idx, incoming_idx + 1);
                let mut ret = vec![incoming, mid];
                ret.extend(l_states);
                ret.extend(r_states);
                ret
            }
            RegexTree::Union(l, r) => {
                incoming.epsilon_transitions.push(counter.peek());
                let l_states = Self::build(*l, counter, byte_idx, send_to);
                incoming.epsilon_transitions.push(counter.peek());
                let r_states = Self::build(*r, counter, byte_idx, send_to);
                let mut ret = vec![incoming];
                ret.extend(l_states);
                ret.extend(r_states);
                ret
            }
            RegexTree::Star(e) => {
                incoming.epsilon_transitions = vec![counter.peek(), send_to];
                let e_states = Self::build(*e, counter, byte_idx, incoming_idx);
                let mut ret = vec![incoming];
                ret.extend(e_states);
                ret
            }
            RegexTree::Plus(e) => {
                let junction_idx = counter.next();
                let e_start = counter.peek();
                incoming.epsilon_transitions.push(e_start);
                let e_states = Self::build(*e, counter, byte_idx, junction_idx);
                let junction = NfaState {
                    accepting: false,
                    epsilon_transitions: vec![e_start, send_to],
                    transitions: vec![],
                };
                debug_assert_eq!(junction_idx, incoming_idx + 1);
                let mut ret = vec![incoming, junction];
                ret.extend(e_states);
                ret
            }
        }
    }

    /// Pretty-printed pattern form, with parentheses reinserted exactly where precedence
    /// requires them. Used by `Handle::to_string` for diagnostics; compiling this output yields
    /// a language-equivalent handle for any tree built from printable-ASCII patterns (the only
    /// case `spec.md`'s own examples exercise — see `DESIGN.md` for non-ASCII bytes).
    pub fn to_string(&self) -> String {
        let mut acc = String::new();
        Self::build_string(&self.tree, &mut acc);
        acc
    }

    fn build_string(tree: &RegexTree, acc: &mut String) {
        match tree {
            RegexTree::EmptySet | RegexTree::Epsilon => {}
            RegexTree::Literal(b) => push_escaped_byte(acc, *b),
            RegexTree::Class(class) => push_class(acc, class),
            RegexTree::Concat(l, r) => {
                Self::write_concat_operand(l, acc);
                Self::write_concat_operand(r, acc);
            }
            RegexTree::Union(l, r) => {
                Self::build_string(l, acc);
                acc.push('|');
                Self::build_string(r, acc);
            }
            RegexTree::Star(e) => {
                Self::write_postfix_operand(e, acc);
                acc.push('*');
            }
            RegexTree::Plus(e) => {
                Self::write_postfix_operand(e, acc);
                acc.push('+');
            }
        }
    }

    fn write_concat_operand(tree: &RegexTree, acc: &mut String) {
        if matches!(tree, RegexTree::Union(..)) {
            acc.push('(');
            Self::build_string(tree, acc);
            acc.push(')');
        } else {
            Self::build_string(tree, acc);
        }
    }

    fn write_postfix_operand(tree: &RegexTree, acc: &mut String) {
        if tree.is_atomic() {
            Self::build_string(tree, acc);
        } else {
            acc.push('(');
            Self::build_string(tree, acc);
            acc.push(')');
        }
    }
}

const RESERVED: [u8; 7] = [b'(', b')', b'[', b']', b'|', b'*', b'+'];

fn push_escaped_byte(acc: &mut String, b: u8) {
    if b == b'/' || RESERVED.contains(&b) {
        acc.push('/');
        acc.push(b as char);
    } else if b == b'\n' {
        acc.push_str("/n");
    } else if b == b'\t' {
        acc.push_str("/t");
    } else if b == b'\r' {
        acc.push_str("/r");
    } else if (0x20..=0x7e).contains(&b) {
        acc.push(b as char);
    } else {
        // Display-only escape: the engine's own lexer has no `\xHH` notation, so this branch
        // (non-ASCII / control bytes outside \n\t\r) does not round-trip through `compile`.
        acc.push_str(&format!("\\x{b:02x}"));
    }
}

fn push_class(acc: &mut String, class: &ByteClass) {
    acc.push('[');
    if class.negate {
        acc.push('^');
    }
    for (lo, hi) in class.ranges() {
        push_escaped_byte(acc, lo);
        if hi > lo {
            if hi > lo + 1 {
                acc.push('-');
            }
            push_escaped_byte(acc, hi);
        }
    }
    acc.push(']');
}

#[cfg(test)]
mod tests {
    use crate::parser;

    #[test]
    fn to_nfa_accepts_literal() {
        let nfa = parser::compile(b"a").unwrap().to_nfa();
        assert!(nfa.accepts(b"a"));
        assert!(!nfa.accepts(b""));
        assert!(!nfa.accepts(b"b"));
        assert!(!nfa.accepts(b"aa"));
    }

    #[test]
    fn to_nfa_union() {
        let nfa = parser::compile(b"a|b").unwrap().to_nfa();
        for w in ["a", "b"] {
            assert!(nfa.accepts(w.as_bytes()));
        }
        for w in ["", "c", "ab"] {
            assert!(!nfa.accepts(w.as_bytes()));
        }
    }

    #[test]
    fn to_nfa_star_and_plus() {
        let star = parser::compile(b"a*").unwrap().to_nfa();
        for w in ["", "a", "aaaa"] {
            assert!(star.accepts(w.as_bytes()));
        }
        for w in ["b", "ab"] {
            assert!(!star.accepts(w.as_bytes()));
        }

        let plus = parser::compile(b"a+").unwrap().to_nfa();
        for w in ["a", "aaa"] {
            assert!(plus.accepts(w.as_bytes()));
        }
        for w in ["", "b"] {
            assert!(!plus.accepts(w.as_bytes()));
        }
    }

    #[test]
    fn empty_pattern_is_epsilon() {
        let nfa = parser::compile(b"").unwrap().to_nfa();
        assert!(nfa.accepts(b""));
        assert!(!nfa.accepts(b"a"));
    }

    #[test]
    fn to_string_roundtrips_through_compile() {
        for pattern in ["a", "a|b", "a*", "a+", "(a|b)*abb", "[a-c]+", "[^0-9]"] {
            let re = parser::compile(pattern.as_bytes()).unwrap();
            let printed = re.to_string();
            let reparsed = parser::compile(printed.as_bytes()).unwrap();
            assert!(
                re.to_nfa().equivalent_to(&reparsed.to_nfa()),
                "pattern {pattern:?} printed as {printed:?} did not round-trip"
            );
        }
    }
}
