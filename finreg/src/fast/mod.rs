//! Dense-table lowering of a minimized [`Dfa`] into the flat representation the match driver
//! actually runs against (`spec.md` §4.6/§4.7): a `Vec` of `[i32; 256]` rows indexed directly by
//! byte value, with `-1` standing in for "no transition, reject immediately" instead of a real
//! trap state id.
//!
//! This is the one stage in the pipeline that is not itself an automaton transformation: it
//! exists purely so [`FastDfa::run`] can be a tight array-indexing loop with no HashMap lookups,
//! no bounds-juggling through an alphabet table, and one comparison per byte.

use crate::dfa::Dfa;

/// A minimized DFA lowered to flat transition tables, ready for O(|w|) matching.
///
/// `spec.md` §4.6 permits either of two trap encodings ("byte absent from the original NFA
/// alphabet" vs. "byte routed to a real trap state during subset construction") since they are
/// behaviorally identical; this lowering picks a single, uniform rule: detect the canonical trap
/// state structurally (non-accepting, every one of its 256 transitions loops back to itself) and
/// map any transition targeting it to `-1`. A pattern whose language is already the empty set
/// collapses the initial state itself into that trap, which is why `initial` is `i32` rather than
/// `usize`: `run` on such a `FastDfa` rejects every input without ever indexing `transitions`.
#[derive(Debug, Clone)]
pub struct FastDfa {
    pub initial: i32,
    pub transitions: Vec<[i32; 256]>,
    pub accept: Vec<bool>,
}

impl FastDfa {
    pub fn from_dfa(dfa: &Dfa) -> Self {
        let states = dfa.states();
        let trap = states.iter().enumerate().position(|(id, s)| {
            !s.accepting && s.transitions.iter().all(|&t| t == id)
        });

        let lower = |id: usize| -> i32 {
            match trap {
                Some(t) if t == id => -1,
                _ => id as i32,
            }
        };

        let transitions = states
            .iter()
            .map(|s| {
                let mut row = [-1i32; 256];
                for (b, &t) in s.transitions.iter().enumerate() {
                    row[b] = lower(t);
                }
                row
            })
            .collect();
        let accept = states.iter().map(|s| s.accepting).collect();

        FastDfa {
            initial: lower(dfa.initial_state_index()),
            transitions,
            accept,
        }
    }

    /// Runs the match driver over `word`, returning whether the whole input is accepted
    /// (`spec.md` §4.7): walk one transition per byte, bailing out the moment a `-1` is hit.
    pub fn run(&self, word: &[u8]) -> bool {
        let mut state = self.initial;
        if state < 0 {
            return false;
        }
        for &b in word {
            state = self.transitions[state as usize][b as usize];
            if state < 0 {
                return false;
            }
        }
        self.accept[state as usize]
    }
}
