use criterion::{black_box, criterion_group, criterion_main, Criterion};
use finreg::dfa::Dfa;
use finreg::parser;
use lazy_static::lazy_static;
use proptest::prelude::*;
use proptest::strategy::ValueTree;
use proptest::test_runner::TestRunner;
use regex::Regex as LibRegex;

const PATTERN_A: &[u8] = b"(a|b)*abb";
const PATTERN_B: &[u8] = b"(0|1)*00(0|1)*";
const BENCH_PATTERN: &str = "[a-z]+(0|1)*c";

lazy_static! {
    static ref DFA_A: Dfa = parser::compile(PATTERN_A).unwrap().to_nfa().to_dfa();
    static ref DFA_B: Dfa = parser::compile(PATTERN_B).unwrap().to_nfa().to_dfa();
}

pub fn boolean_algebra(c: &mut Criterion) {
    c.bench_function("union", |b| b.iter(|| DFA_A.union(black_box(&DFA_B))));
    c.bench_function("intersection", |b| {
        b.iter(|| DFA_A.intersection(black_box(&DFA_B)))
    });
    c.bench_function("difference", |b| {
        b.iter(|| DFA_A.difference(black_box(&DFA_B)))
    });
    c.bench_function("symmetric difference", |b| {
        b.iter(|| DFA_A.symmetric_difference(black_box(&DFA_B)))
    });
}

pub fn equivalence_check(c: &mut Criterion) {
    c.bench_function("equivalence check", |b| {
        b.iter(|| DFA_A.equivalent_to(black_box(&DFA_B)))
    });
}

pub fn pattern_compile(c: &mut Criterion) {
    c.bench_function("finreg compile", |b| {
        b.iter(|| finreg::compile(black_box(BENCH_PATTERN.as_bytes())).unwrap())
    });

    c.bench_function("library regex compile", |b| {
        b.iter(|| LibRegex::new(black_box(BENCH_PATTERN)).unwrap())
    });
}

pub fn pattern_match(c: &mut Criterion) {
    let mut runner = TestRunner::default();
    let input = "[a-z]{1,20}(0|1){0,20}c".new_tree(&mut runner).unwrap();

    let handle = finreg::compile(BENCH_PATTERN.as_bytes()).unwrap();
    c.bench_function("finreg is_match", |b| {
        b.iter(|| handle.is_match(black_box(input.current().as_bytes())))
    });

    let anchored = format!("^({BENCH_PATTERN})$");
    let lib_regex = LibRegex::new(&anchored).unwrap();
    c.bench_function("library regex is_match", |b| {
        b.iter(|| lib_regex.is_match(black_box(&input.current())))
    });
}

criterion_group!(
    benches,
    equivalence_check,
    boolean_algebra,
    pattern_compile,
    pattern_match
);
criterion_main!(benches);
