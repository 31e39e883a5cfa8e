use crate::nfa::{Nfa, NfaState};
use std::collections::HashSet;
use std::iter;

/// Step-by-step NFA evaluation, keeping the current set of active states (already
/// ε-closed) so a caller can observe acceptance at any prefix without re-walking from the
/// start. Used by diagnostics and by the CLI's `-w`/`-x` boundary checks.
#[derive(Clone, Debug)]
pub struct NfaEvaluator<'a> {
    nfa: &'a Nfa,
    current_states: HashSet<usize>,
    unknown_byte_seen: bool,
}

impl<'a> NfaEvaluator<'a> {
    pub fn new(nfa: &'a Nfa) -> Self {
        let mut evaluator = Self {
            nfa,
            current_states: HashSet::from([nfa.initial_state]),
            unknown_byte_seen: false,
        };
        evaluator.include_closure();
        evaluator
    }

    pub fn is_accepting(&self) -> bool {
        !self.unknown_byte_seen && self.current_states().iter().any(|s| s.accepting)
    }

    pub fn current_states(&self) -> Vec<&NfaState> {
        self.current_states
            .iter()
            .map(|&s| &self.nfa.states[s])
            .collect()
    }

    pub fn current_states_idx(&self) -> &HashSet<usize> {
        &self.current_states
    }

    pub fn step_all(&self) -> Vec<NfaEvaluator<'a>> {
        iter::repeat(self.clone())
            .zip(self.nfa.alphabet.iter().copied())
            .map(|(mut eval, byte)| {
                eval.step(byte);
                eval
            })
            .collect()
    }

    /// Advances by one byte. If the byte is not in the automaton's alphabet the evaluator
    /// becomes permanently non-accepting (mirrors the fast table's `-1` rejection, §4.6/§4.7).
    pub fn step(&mut self, byte: u8) -> Option<()> {
        if self.unknown_byte_seen {
            return None;
        }
        let Some(idx) = self.nfa.alphabet.iter().position(|b| *b == byte) else {
            self.unknown_byte_seen = true;
            self.current_states.clear();
            return None;
        };
        self.current_states = self
            .current_states
            .iter()
            .flat_map(|&state| self.nfa.states[state].transitions[idx].clone())
            .collect();
        self.include_closure();
        Some(())
    }

    pub fn step_multiple(&mut self, bytes: &[u8]) -> Option<()> {
        bytes.iter().try_for_each(|&b| self.step(b))
    }

    fn include_closure(&mut self) {
        let mut updated = true;
        while updated {
            updated = false;
            let mut to_push = HashSet::new();
            for state in self.current_states.iter() {
                for epsilon_state in self.nfa.states[*state].epsilon_transitions.iter() {
                    if !self.current_states.contains(epsilon_state) {
                        updated = true;
                        to_push.insert(*epsilon_state);
                    }
                }
            }
            self.current_states.extend(to_push);
        }
    }
}
