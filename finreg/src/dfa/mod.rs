//! Deterministic finite automata over a byte alphabet.
//!
//! A [`Dfa`] is always complete and dense over all 256 byte values (`spec.md` §3's "complete DFA
//! via a trap state" taken to its natural conclusion for a byte alphabet): every state has
//! exactly one outgoing transition per byte, so any two `Dfa`s are automatically comparable and
//! the boolean algebra in this module (`union`, `intersection`, ...) never has to reject a pair
//! for mismatched alphabets the way this codebase's string-alphabet ancestor did.
//!
//! `Dfa` is the output of [`crate::nfa::Nfa::to_dfa`] (subset construction) and the input to
//! [`Dfa::minimize`] (partition refinement) and [`crate::fast::FastDfa::from_dfa`] (dense-table
//! lowering). States are plain integer ids throughout.

pub mod eval;

use crate::nfa::{Nfa, NfaState};
use crate::table::Table;
pub use eval::DfaEvaluator;
use std::collections::{HashSet, VecDeque};

/// One state of a [`Dfa`]: a single transition per byte, dense over the full 0..256 range.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DfaState {
    pub accepting: bool,
    pub transitions: [usize; 256],
}

impl DfaState {
    pub fn is_accepting(&self) -> bool {
        self.accepting
    }

    pub fn transitions(&self) -> &[usize; 256] {
        &self.transitions
    }
}

/// (Q, Σ, δ, q₀, F) with Σ fixed as "every byte value" and δ total (`spec.md` §3). Produced by
/// [`crate::nfa::Nfa::to_dfa`]; minimized in place by [`Dfa::minimize`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dfa {
    pub(crate) states: Vec<DfaState>,
    pub(crate) initial_state: usize,
}

impl From<DfaState> for NfaState {
    fn from(value: DfaState) -> Self {
        NfaState {
            accepting: value.accepting,
            epsilon_transitions: vec![],
            transitions: value.transitions.iter().map(|&t| vec![t]).collect(),
        }
    }
}

impl From<Dfa> for Nfa {
    fn from(value: Dfa) -> Self {
        value.to_nfa()
    }
}

impl Dfa {
    /// Makes accepting states non-accepting and vice versa. The resulting DFA accepts exactly
    /// the complement language (over the full byte alphabet).
    pub fn invert(&mut self) {
        self.states.iter_mut().for_each(|s| s.accepting = !s.accepting)
    }

    /// Accepts exactly those strings accepted by `self` or `other` (or both).
    pub fn union(&self, other: &Self) -> Self {
        self.product_construction(other, |a, b| a.accepting || b.accepting)
    }

    /// Accepts exactly those strings accepted by both `self` and `other`.
    pub fn intersection(&self, other: &Self) -> Self {
        self.product_construction(other, |a, b| a.accepting && b.accepting)
    }

    /// Accepts exactly those strings accepted by `self` but not by `other`.
    pub fn difference(&self, other: &Self) -> Self {
        self.product_construction(other, |a, b| a.accepting && !b.accepting)
    }

    /// Accepts exactly those strings accepted by exactly one of `self`, `other`.
    pub fn symmetric_difference(&self, other: &Self) -> Self {
        self.product_construction(other, |a, b| a.accepting != b.accepting)
    }

    /// Builds the product automaton of `self` and `other`: one state per reachable pair of
    /// states, with `combinator` deciding acceptance from the pair's own acceptance flags. Since
    /// both DFAs are already dense over the same 256-byte alphabet this is total: every pair of
    /// DFAs has a product, unlike the name-keyed alphabets this crate's ancestor worked with.
    pub fn product_construction(
        &self,
        other: &Self,
        mut combinator: impl FnMut(&DfaState, &DfaState) -> bool,
    ) -> Self {
        let start = (self.initial_state, other.initial_state);
        let mut index: Vec<(usize, usize)> = vec![start];
        let mut seen = std::collections::HashMap::new();
        seen.insert(start, 0usize);
        let mut queue = VecDeque::from([0usize]);
        let mut states: Vec<Option<DfaState>> = vec![None];

        while let Some(id) = queue.pop_front() {
            let (a, b) = index[id];
            let accepting = combinator(&self.states[a], &other.states[b]);
            let mut transitions = [0usize; 256];
            for byte in 0..256usize {
                let next = (self.states[a].transitions[byte], other.states[b].transitions[byte]);
                let next_id = *seen.entry(next).or_insert_with(|| {
                    let new_id = index.len();
                    index.push(next);
                    states.push(None);
                    queue.push_back(new_id);
                    new_id
                });
                transitions[byte] = next_id;
            }
            states[id] = Some(DfaState {
                accepting,
                transitions,
            });
        }

        Dfa {
            states: states.into_iter().map(Option::unwrap).collect(),
            initial_state: 0,
        }
    }

    /// Minimization (`spec.md` §4.5): drop unreachable states, merge Myhill-Nerode-equivalent
    /// states, then renumber canonically starting from the initial state.
    pub fn minimize(&mut self) {
        if self.states.is_empty() {
            return;
        }
        self.remove_unreachable_states();
        self.merge_nondistinguishable_states();
        self.normalize();
    }

    /// Merges every class of non-distinguishable states into one representative.
    pub fn merge_nondistinguishable_states(&mut self) {
        let mapper: std::collections::HashMap<usize, usize> = self
            .state_equivalence_classes_idx()
            .into_iter()
            .flat_map(|class| {
                debug_assert!(!class.is_empty());
                let mut iter = class.into_iter();
                let representative = iter.next().expect("non-empty equivalence class");
                iter.map(move |old| (old, representative))
            })
            .collect();
        if mapper.is_empty() {
            return;
        }
        let map = |idx: usize| mapper.get(&idx).copied();
        self.remap_transitions(&map);
        if let Some(new_initial) = map(self.initial_state) {
            self.initial_state = new_initial;
        }
        let to_remove: Vec<usize> = mapper.into_keys().collect();
        self.remove_states(&to_remove);
    }

    /// Myhill-Nerode equivalence classes of this DFA's states, via Hopcroft-style worklist
    /// partition refinement (`spec.md` §4.5's allowed drop-in for Moore's signature-bucketing —
    /// `spec.md` §9 Design Notes: "both produce the unique minimal DFA up to naming").
    pub fn state_equivalence_classes(&self) -> Vec<Vec<&DfaState>> {
        self.state_equivalence_classes_idx()
            .into_iter()
            .map(|class| class.into_iter().map(|i| &self.states[i]).collect())
            .collect()
    }

    pub fn state_equivalence_classes_idx(&self) -> Vec<HashSet<usize>> {
        let (finals, nonfinals): (HashSet<usize>, HashSet<usize>) =
            (0..self.states.len()).partition(|&i| self.states[i].accepting);
        if finals.is_empty() {
            return vec![nonfinals];
        } else if nonfinals.is_empty() {
            return vec![finals];
        }
        let mut p = vec![finals, nonfinals];
        let mut w = p.clone();

        while let Some(a) = w.pop() {
            for c in 0..256 {
                let x: HashSet<usize> = self
                    .states
                    .iter()
                    .enumerate()
                    .filter(|(_, s)| a.contains(&s.transitions[c]))
                    .map(|(i, _)| i)
                    .collect();
                if x.is_empty() {
                    continue;
                }
                p = p
                    .into_iter()
                    .flat_map(|y| {
                        let inter: HashSet<usize> = x.intersection(&y).copied().collect();
                        let diff: HashSet<usize> = y.difference(&x).copied().collect();
                        if !inter.is_empty() && !diff.is_empty() {
                            if let Some(pos) = w.iter().position(|hs| hs == &y) {
                                w.swap_remove(pos);
                                w.push(inter.clone());
                                w.push(diff.clone());
                            } else if inter.len() <= diff.len() {
                                w.push(inter.clone());
                            } else {
                                w.push(diff.clone());
                            }
                            vec![inter, diff]
                        } else {
                            vec![y]
                        }
                    })
                    .collect();
            }
        }
        p
    }

    /// Drops states unreachable from the initial state.
    pub fn remove_unreachable_states(&mut self) {
        let to_remove: Vec<usize> = self.unreachable_state_idx().into_iter().collect();
        self.remove_states(&to_remove);
    }

    pub fn unreachable_states(&self) -> Vec<&DfaState> {
        self.unreachable_state_idx().into_iter().map(|i| &self.states[i]).collect()
    }

    pub fn unreachable_state_idx(&self) -> HashSet<usize> {
        let reachable = self.reachable_state_idx();
        (0..self.states.len()).filter(|i| !reachable.contains(i)).collect()
    }

    pub fn has_reachable_accepting_state(&self) -> bool {
        self.reachable_state_idx().iter().any(|&i| self.states[i].accepting)
    }

    pub fn reachable_states(&self) -> Vec<&DfaState> {
        self.reachable_state_idx().into_iter().map(|i| &self.states[i]).collect()
    }

    pub fn reachable_state_idx(&self) -> HashSet<usize> {
        let mut reachable = HashSet::from([self.initial_state]);
        let mut frontier = reachable.clone();
        while !frontier.is_empty() {
            frontier = frontier
                .drain()
                .flat_map(|s| self.states[s].transitions.iter().copied().collect::<Vec<_>>())
                .filter(|&s| reachable.insert(s))
                .collect();
        }
        reachable
    }

    fn remap_transitions(&mut self, mapper: &impl Fn(usize) -> Option<usize>) {
        self.states.iter_mut().for_each(|state| {
            state
                .transitions
                .iter_mut()
                .for_each(|t| *t = mapper(*t).unwrap_or(*t))
        })
    }

    /// Removes the given states, remapping every surviving transition to the new indices.
    /// `to_remove` must not contain the initial state.
    fn remove_states(&mut self, to_remove: &[usize]) {
        if to_remove.is_empty() {
            return;
        }
        let mut to_remove = to_remove.to_vec();
        to_remove.sort_unstable();
        to_remove.dedup();
        debug_assert!(
            to_remove.binary_search(&self.initial_state).is_err(),
            "cannot remove the initial state"
        );

        let mut old_to_new = vec![None; self.states.len()];
        let mut next_id = 0;
        for old in 0..self.states.len() {
            if to_remove.binary_search(&old).is_err() {
                old_to_new[old] = Some(next_id);
                next_id += 1;
            }
        }

        let mut new_states = Vec::with_capacity(next_id);
        for (old, state) in self.states.iter().enumerate() {
            if old_to_new[old].is_none() {
                continue;
            }
            let mut transitions = [0usize; 256];
            for (b, &t) in state.transitions.iter().enumerate() {
                transitions[b] = old_to_new[t].expect("no transitions into a removed state");
            }
            new_states.push(DfaState {
                accepting: state.accepting,
                transitions,
            });
        }
        self.initial_state = old_to_new[self.initial_state].expect("initial state was removed");
        self.states = new_states;
    }

    /// Renumbers states to a canonical, deterministic sequence: breadth-first discovery order
    /// from the initial state, following transitions in ascending byte order (`spec.md` §4.5
    /// step 4 / §8 invariant 5, "renumbering preserves language").
    pub fn normalize(&mut self) {
        if self.states.is_empty() {
            return;
        }
        let n = self.states.len();
        let mut order = Vec::with_capacity(n);
        let mut seen = vec![false; n];
        let mut queue = VecDeque::new();
        queue.push_back(self.initial_state);
        seen[self.initial_state] = true;
        while let Some(s) = queue.pop_front() {
            order.push(s);
            for &t in &self.states[s].transitions {
                if !seen[t] {
                    seen[t] = true;
                    queue.push_back(t);
                }
            }
        }
        for (i, was_seen) in seen.iter().enumerate() {
            if !was_seen {
                order.push(i);
            }
        }

        let mut remap = vec![0usize; n];
        for (new_id, &old_id) in order.iter().enumerate() {
            remap[old_id] = new_id;
        }

        let mut new_states: Vec<Option<DfaState>> = vec![None; n];
        for (old_id, state) in self.states.iter().enumerate() {
            let mut transitions = [0usize; 256];
            for (b, &t) in state.transitions.iter().enumerate() {
                transitions[b] = remap[t];
            }
            new_states[remap[old_id]] = Some(DfaState {
                accepting: state.accepting,
                transitions,
            });
        }
        self.states = new_states.into_iter().map(Option::unwrap).collect();
        self.initial_state = remap[self.initial_state];
    }

    /// Converts this DFA to an NFA with no epsilon moves (every DFA already is one). Cheap but
    /// not free: NFA transitions are one-target vectors rather than bare indices.
    pub fn to_nfa(self) -> Nfa {
        let Dfa { states, initial_state } = self;
        Nfa {
            alphabet: (0..=u8::MAX).collect(),
            states: states.into_iter().map(Into::into).collect(),
            initial_state,
        }
    }

    pub fn accepts(&self, word: &[u8]) -> bool {
        let mut eval = self.evaluator();
        eval.step_multiple(word);
        eval.is_accepting()
    }

    pub fn evaluator(&self) -> DfaEvaluator<'_> {
        DfaEvaluator::new(self)
    }

    /// Whole-automaton language equivalence via product exploration (used by property tests to
    /// check minimization idempotence and renumbering-preserves-language, `spec.md` §8
    /// invariants 4-5).
    pub fn equivalent_to(&self, other: &Dfa) -> bool {
        let mut explored = std::collections::HashSet::new();
        let start = (self.initial_state, other.initial_state);
        explored.insert(start);
        let mut stack = vec![start];
        while let Some((a, b)) = stack.pop() {
            if self.states[a].accepting != other.states[b].accepting {
                return false;
            }
            for byte in 0..256usize {
                let next = (self.states[a].transitions[byte], other.states[b].transitions[byte]);
                if explored.insert(next) {
                    stack.push(next);
                }
            }
        }
        true
    }

    pub fn states(&self) -> &[DfaState] {
        &self.states
    }

    pub fn initial_state(&self) -> &DfaState {
        &self.states[self.initial_state]
    }

    pub fn initial_state_index(&self) -> usize {
        self.initial_state
    }

    /// Debug-only pretty-printer: one row per state, transitions compressed into maximal
    /// contiguous byte ranges sharing a target (256 individual columns would be unreadable).
    /// Kept for test-failure output and CLI diagnostics (`spec.md` §9 Design Notes: "debug
    /// pretty-printers still exist for tests").
    pub fn to_table(&self) -> String {
        let mut table = Table::default();
        table.push_row(vec!["", "state", "transitions (byte range -> state)"]);
        let rows: Vec<String> = (0..self.states.len())
            .map(|i| {
                let state = &self.states[i];
                let marks = format!(
                    "{}{}",
                    if i == self.initial_state { "->" } else { "" },
                    if state.accepting { "*" } else { "" }
                );
                let ranges = transition_ranges(&state.transitions)
                    .into_iter()
                    .map(|(lo, hi, target)| {
                        if lo == hi {
                            format!("{}->q{target}", escape_byte(lo))
                        } else {
                            format!("{}-{}->q{target}", escape_byte(lo), escape_byte(hi))
                        }
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                (marks, format!("q{i}"), ranges)
            })
            .map(|(marks, name, ranges)| format!("{marks}\t{name}\t{ranges}"))
            .collect();
        for row in &rows {
            let cols: Vec<&str> = row.split('\t').collect();
            table.push_row(cols);
        }
        table.to_string(" ")
    }
}

/// Maximal contiguous `[lo, hi]` byte ranges sharing the same transition target, in ascending
/// order. The same compression trick as `crate::regex::class::ByteClass::ranges`.
fn transition_ranges(transitions: &[usize; 256]) -> Vec<(u8, u8, usize)> {
    let mut out = Vec::new();
    let mut start = 0u8;
    let mut current = transitions[0];
    for b in 1..=255u8 {
        if transitions[b as usize] != current {
            out.push((start, b - 1, current));
            start = b;
            current = transitions[b as usize];
        }
        if b == 255 {
            out.push((start, 255, current));
        }
    }
    if out.is_empty() {
        out.push((0, 255, current));
    }
    out
}

fn escape_byte(b: u8) -> String {
    if (0x20..=0x7e).contains(&b) {
        (b as char).to_string()
    } else {
        format!("/x{b:02x}")
    }
}

#[cfg(test)]
mod tests {
    use crate::parser;

    #[test]
    fn minimize_collapses_equivalent_states() {
        let mut dfa = parser::compile(b"(a|b)*abb").unwrap().to_nfa().to_dfa();
        let before = dfa.states().len();
        dfa.minimize();
        let after = dfa.states().len();
        assert!(after <= before);
        for w in ["abb", "aabb", "babb", "bbabb"] {
            assert!(dfa.accepts(w.as_bytes()));
        }
        for w in ["", "ab", "abba"] {
            assert!(!dfa.accepts(w.as_bytes()));
        }
    }

    #[test]
    fn minimize_is_idempotent() {
        let mut dfa = parser::compile(b"[a-c]+").unwrap().to_nfa().to_dfa();
        dfa.minimize();
        let once = dfa.clone();
        dfa.minimize();
        assert!(once.equivalent_to(&dfa));
        assert_eq!(once.states().len(), dfa.states().len());
    }

    #[test]
    fn union_and_intersection() {
        let a = parser::compile(b"a+").unwrap().to_nfa().to_dfa();
        let b = parser::compile(b"a*b").unwrap().to_nfa().to_dfa();

        let union = a.union(&b);
        assert!(union.accepts(b"aaa"));
        assert!(union.accepts(b"b"));
        assert!(union.accepts(b"aab"));
        assert!(!union.accepts(b""));

        let inter = a.intersection(&b);
        assert!(inter.accepts(b"aab"));
        assert!(!inter.accepts(b"aaa"));
        assert!(!inter.accepts(b"b"));
    }

    #[test]
    fn difference_and_symmetric_difference() {
        let a = parser::compile(b"a|b").unwrap().to_nfa().to_dfa();
        let b = parser::compile(b"b|c").unwrap().to_nfa().to_dfa();

        let diff = a.difference(&b);
        assert!(diff.accepts(b"a"));
        assert!(!diff.accepts(b"b"));
        assert!(!diff.accepts(b"c"));

        let sym = a.symmetric_difference(&b);
        assert!(sym.accepts(b"a"));
        assert!(sym.accepts(b"c"));
        assert!(!sym.accepts(b"b"));
    }

    #[test]
    fn invert_complements_language() {
        let mut dfa = parser::compile(b"a").unwrap().to_nfa().to_dfa();
        dfa.invert();
        assert!(!dfa.accepts(b"a"));
        assert!(dfa.accepts(b""));
        assert!(dfa.accepts(b"b"));
    }

    #[test]
    fn equivalent_to_ignores_state_numbering() {
        let dfa1 = parser::compile(b"(0|1)*00(0|1)*").unwrap().to_nfa().to_dfa();
        let mut dfa2 = dfa1.clone();
        dfa2.minimize();
        assert!(dfa1.equivalent_to(&dfa2));
        assert_ne!(dfa1.states().len(), 0);
    }
}
