//! Epsilon-nondeterministic finite automata over a byte alphabet.
//!
//! An [`Nfa`] is the output of Thompson construction (`crate::regex::Regex::to_nfa`) and the
//! input to subset construction (`Nfa::to_dfa`). States are plain integer ids; there is no
//! string-named intermediate stage (`spec.md` §9 Design Notes explicitly permits skipping it, as
//! long as a debug pretty-printer exists — see `crate::table`).

pub mod eval;
pub mod words;

use crate::dfa::{Dfa, DfaState};
use std::collections::{HashMap, HashSet, VecDeque};

pub use eval::NfaEvaluator;

/// One state of an [`Nfa`]. `transitions[i]` holds the set of states reachable on
/// `alphabet[i]`; `epsilon_transitions` holds states reachable for free.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NfaState {
    pub accepting: bool,
    pub epsilon_transitions: Vec<usize>,
    pub transitions: Vec<Vec<usize>>,
}

impl NfaState {
    pub fn is_accepting(&self) -> bool {
        self.accepting
    }
}

/// (Q, Σ, δ, q₀, F) with δ: Q × (Σ ∪ {ε}) → 𝒫(Q). Σ is exactly the bytes referenced by the
/// pattern this automaton was built from — not all 256 byte values (`spec.md` §3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nfa {
    pub alphabet: Vec<u8>,
    pub states: Vec<NfaState>,
    pub initial_state: usize,
}

impl Nfa {
    pub fn alphabet(&self) -> &[u8] {
        &self.alphabet
    }

    /// ε-closure of a single state.
    pub fn closure(&self, state: usize) -> Option<HashSet<usize>> {
        if state >= self.states.len() {
            return None;
        }
        let mut seen = HashSet::new();
        let mut stack = vec![state];
        seen.insert(state);
        while let Some(s) = stack.pop() {
            for &next in &self.states[s].epsilon_transitions {
                if seen.insert(next) {
                    stack.push(next);
                }
            }
        }
        Some(seen)
    }

    fn closure_of_set(&self, states: &HashSet<usize>) -> HashSet<usize> {
        let mut out = HashSet::new();
        for &s in states {
            if let Some(c) = self.closure(s) {
                out.extend(c);
            }
        }
        out
    }

    fn move_set(&self, states: &HashSet<usize>, alphabet_idx: usize) -> HashSet<usize> {
        let mut out = HashSet::new();
        for &s in states {
            out.extend(self.states[s].transitions[alphabet_idx].iter().copied());
        }
        out
    }

    pub fn has_epsilon_moves(&self) -> bool {
        self.states.iter().any(|s| !s.epsilon_transitions.is_empty())
    }

    /// Determinizes via the subset construction (`spec.md` §4.4): ε-closure the initial state,
    /// then repeatedly ε-closure the move-set for every byte 0..256, assigning DFA ids in
    /// discovery order starting from 0 for the initial state, and finally adding a single trap
    /// state so the result is complete over the full byte range.
    ///
    /// The NFA's own alphabet (`self.alphabet`) only holds the bytes the pattern actually
    /// references (`spec.md` §3); every other byte value trivially has an empty move-set and so
    /// routes straight to the trap. Building the DFA dense over all 256 bytes up front (rather
    /// than narrow-then-complete) means two [`Dfa`]s are always comparable — the boolean algebra
    /// in `crate::dfa` never has to reject a pair of automata for mismatched alphabets.
    pub fn to_dfa(&self) -> Dfa {
        let mut alpha_index = [None; 256];
        for (i, &b) in self.alphabet.iter().enumerate() {
            alpha_index[b as usize] = Some(i);
        }

        let mut seen: HashMap<Vec<usize>, usize> = HashMap::new();
        let mut accepting_flags: Vec<bool> = Vec::new();
        let mut raw_transitions: Vec<[Option<usize>; 256]> = Vec::new();
        let mut queue: VecDeque<usize> = VecDeque::new();
        let mut members: HashMap<usize, HashSet<usize>> = HashMap::new();

        let canon = |set: &HashSet<usize>| -> Vec<usize> {
            let mut v: Vec<usize> = set.iter().copied().collect();
            v.sort_unstable();
            v
        };

        let initial_closure = self.closure_of_set(&HashSet::from([self.initial_state]));
        seen.insert(canon(&initial_closure), 0);
        accepting_flags.push(false);
        raw_transitions.push([None; 256]);
        members.insert(0, initial_closure);
        queue.push_back(0);

        while let Some(id) = queue.pop_front() {
            let set = members[&id].clone();
            accepting_flags[id] = set.iter().any(|&s| self.states[s].accepting);
            let mut transitions = [None; 256];
            for b in 0..256usize {
                let Some(idx) = alpha_index[b] else {
                    continue;
                };
                let moved = self.move_set(&set, idx);
                if moved.is_empty() {
                    continue;
                }
                let closed = self.closure_of_set(&moved);
                let key = canon(&closed);
                let target = *seen.entry(key).or_insert_with(|| {
                    let new_id = accepting_flags.len();
                    accepting_flags.push(false);
                    raw_transitions.push([None; 256]);
                    members.insert(new_id, closed.clone());
                    queue.push_back(new_id);
                    new_id
                });
                transitions[b] = Some(target);
            }
            raw_transitions[id] = transitions;
        }

        // Trap completion: any `None` transition is redirected to a fresh, non-accepting,
        // self-looping trap state.
        let needs_trap = raw_transitions.iter().any(|row| row.iter().any(Option::is_none));
        let trap_id = accepting_flags.len();
        let mut states: Vec<DfaState> = raw_transitions
            .into_iter()
            .zip(accepting_flags)
            .map(|(row, accepting)| {
                let mut transitions = [0usize; 256];
                for (b, t) in row.into_iter().enumerate() {
                    transitions[b] = t.unwrap_or(trap_id);
                }
                DfaState {
                    accepting,
                    transitions,
                }
            })
            .collect();
        if needs_trap {
            states.push(DfaState {
                accepting: false,
                transitions: [trap_id; 256],
            });
        }

        Dfa {
            states,
            initial_state: 0,
        }
    }

    pub fn evaluator(&self) -> NfaEvaluator<'_> {
        NfaEvaluator::new(self)
    }

    pub fn accepts(&self, word: &[u8]) -> bool {
        let mut eval = self.evaluator();
        for &b in word {
            eval.step(b);
        }
        eval.is_accepting()
    }

    pub fn reachable_state_idx(&self) -> HashSet<usize> {
        let mut seen = HashSet::new();
        let mut stack = vec![self.initial_state];
        seen.insert(self.initial_state);
        while let Some(s) = stack.pop() {
            for &next in &self.states[s].epsilon_transitions {
                if seen.insert(next) {
                    stack.push(next);
                }
            }
            for group in &self.states[s].transitions {
                for &next in group {
                    if seen.insert(next) {
                        stack.push(next);
                    }
                }
            }
        }
        seen
    }

    pub fn unreachable_state_idx(&self) -> HashSet<usize> {
        let reachable = self.reachable_state_idx();
        (0..self.states.len())
            .filter(|s| !reachable.contains(s))
            .collect()
    }

    pub fn has_reachable_accepting_state(&self) -> bool {
        let reachable = self.reachable_state_idx();
        reachable.iter().any(|&s| self.states[s].accepting)
    }

    /// Drops every unreachable state and remaps the remaining indices to `0..n`.
    pub fn remove_unreachable_states(&mut self) {
        let unreachable = self.unreachable_state_idx();
        self.remove_states(&unreachable);
    }

    fn remove_states(&mut self, to_remove: &HashSet<usize>) {
        if to_remove.is_empty() {
            return;
        }
        let mut remap = vec![None; self.states.len()];
        let mut next_id = 0;
        for old in 0..self.states.len() {
            if !to_remove.contains(&old) {
                remap[old] = Some(next_id);
                next_id += 1;
            }
        }
        let mut new_states = Vec::with_capacity(next_id);
        for (old, state) in self.states.iter().enumerate() {
            if to_remove.contains(&old) {
                continue;
            }
            let epsilon_transitions = state
                .epsilon_transitions
                .iter()
                .filter_map(|t| remap[*t])
                .collect();
            let transitions = state
                .transitions
                .iter()
                .map(|group| group.iter().filter_map(|t| remap[*t]).collect())
                .collect();
            new_states.push(NfaState {
                accepting: state.accepting,
                epsilon_transitions,
                transitions,
            });
        }
        self.initial_state = remap[self.initial_state]
            .expect("remove_states: initial state must never be removed");
        self.states = new_states;
    }

    /// Inlines every ε-closure into direct transitions and drops the now-redundant ε-edges,
    /// then removes any state that can no longer reach an accepting state ("dead" states),
    /// re-rooting the initial state if its own closure merges several live states.
    pub fn remove_epsilon_moves(&mut self) {
        if !self.has_epsilon_moves() {
            return;
        }

        let closures: Vec<HashSet<usize>> = (0..self.states.len())
            .map(|s| self.closure(s).unwrap())
            .collect();

        let direct_transitions = |closure: &HashSet<usize>, states: &[NfaState], alphabet_len: usize| {
            (0..alphabet_len)
                .map(|idx| {
                    let mut targets: HashSet<usize> = HashSet::new();
                    for &member in closure {
                        targets.extend(states[member].transitions[idx].iter().copied());
                    }
                    targets.into_iter().collect::<Vec<_>>()
                })
                .collect::<Vec<_>>()
        };

        let mut new_states: Vec<NfaState> = (0..self.states.len())
            .map(|s| NfaState {
                accepting: closures[s].iter().any(|&t| self.states[t].accepting),
                epsilon_transitions: Vec::new(),
                transitions: direct_transitions(&closures[s], &self.states, self.alphabet.len()),
            })
            .collect();

        // If the initial state's closure reaches more than one state, synthesize a fresh
        // initial state whose direct transitions are the union of the closure members' — this
        // keeps a single well-defined initial state rather than a set of them.
        let initial_closure = &closures[self.initial_state];
        if initial_closure.len() > 1 {
            new_states.push(NfaState {
                accepting: initial_closure.iter().any(|&t| self.states[t].accepting),
                epsilon_transitions: Vec::new(),
                transitions: direct_transitions(initial_closure, &self.states, self.alphabet.len()),
            });
            self.initial_state = new_states.len() - 1;
        }

        self.states = new_states;
        self.remove_dead_states();
        self.remove_unreachable_states();
    }

    /// Fixed-point removal of states that can never reach an accepting state.
    fn remove_dead_states(&mut self) {
        let mut alive: HashSet<usize> = (0..self.states.len())
            .filter(|&s| self.states[s].accepting)
            .collect();
        loop {
            let mut changed = false;
            for s in 0..self.states.len() {
                if alive.contains(&s) {
                    continue;
                }
                let can_reach_alive = self.states[s]
                    .transitions
                    .iter()
                    .flatten()
                    .any(|t| alive.contains(t));
                if can_reach_alive {
                    alive.insert(s);
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
        // Never remove the initial state outright, even if dead: an NFA accepting nothing still
        // needs a valid initial state for `to_dfa`/`accepts` to operate on.
        let dead: HashSet<usize> = (0..self.states.len())
            .filter(|s| !alive.contains(s) && *s != self.initial_state)
            .collect();
        self.remove_states(&dead);
    }

    pub fn words(&self) -> words::Words<'_> {
        words::Words::new(self)
    }

    /// Whole-automaton language equivalence, via product exploration of the determinized forms.
    pub fn equivalent_to(&self, other: &Nfa) -> bool {
        self.to_dfa().equivalent_to(&other.to_dfa())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser;

    #[test]
    fn subset_construction_matches_nfa() {
        let regex = parser::compile(b"(a|b)*abb").unwrap();
        let nfa = regex.to_nfa();
        let dfa = nfa.to_dfa();
        for w in ["abb", "aabb", "babb", "bbabb"] {
            assert!(nfa.accepts(w.as_bytes()));
            assert!(dfa.accepts(w.as_bytes()));
        }
        for w in ["", "ab", "abba"] {
            assert!(!nfa.accepts(w.as_bytes()));
            assert!(!dfa.accepts(w.as_bytes()));
        }
    }

    #[test]
    fn remove_epsilon_moves_preserves_language() {
        let regex = parser::compile(b"a*b").unwrap();
        let mut nfa = regex.to_nfa();
        assert!(nfa.has_epsilon_moves());
        let before: Vec<bool> = ["b", "ab", "aaab", "a", ""]
            .iter()
            .map(|w| nfa.accepts(w.as_bytes()))
            .collect();
        nfa.remove_epsilon_moves();
        assert!(!nfa.has_epsilon_moves());
        let after: Vec<bool> = ["b", "ab", "aaab", "a", ""]
            .iter()
            .map(|w| nfa.accepts(w.as_bytes()))
            .collect();
        assert_eq!(before, after);
    }
}
