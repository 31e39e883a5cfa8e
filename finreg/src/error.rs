use thiserror::Error;

/// Everything that can go wrong while turning a pattern into a [`crate::handle::Handle`].
///
/// There is no partial-success state: `compile` either returns a fully built, deterministic,
/// minimal, fast-lowered automaton, or one of these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A lexical or grammatical error, with the byte offset into the pattern where it was
    /// detected.
    #[error("syntax error at byte {offset}: {message}")]
    Syntax { offset: usize, message: String },

    /// A character class `[...]` had zero members before negation was applied (`[]`, `[^]`).
    /// An unterminated class (no closing `]` at all) is a [`Error::Syntax`] error instead.
    #[error("invalid character class at byte {offset}")]
    InvalidClass { offset: usize },

    /// An internal invariant of the compilation pipeline was violated. This should not occur
    /// for any input reachable through [`crate::compile`]; if it does, it is a bug in this
    /// crate, not in the caller's pattern.
    #[error("internal invariant violated: {0}")]
    InvariantViolation(String),
}

pub type Result<T> = std::result::Result<T, Error>;
