//! A grep-style line matcher front-end for `finreg`: a thin driver around a compiled
//! [`finreg::Handle`] that does nothing an automaton wouldn't already do on its own — per-line,
//! per-position longest-match scanning, ANSI highlighting, and the handful of flags that toggle
//! what counts as a "match" or how it's reported.

use clap::Parser;
use finreg::Handle;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use thiserror::Error;

const BOLD_RED: &str = "\x1b[1;31m";
const RESET: &str = "\x1b[0m";

#[derive(Debug, Error)]
enum Error<'a> {
    #[error("{0}: {1}")]
    File(&'a Path, io::Error),
    #[error("invalid pattern: {0}")]
    Pattern(finreg::Error),
}

/// Search for PATTERN in each FILE, printing lines that match.
#[derive(Parser, Debug)]
#[command(name = "finreg", version, about)]
struct Args {
    /// Pattern to match, using finreg's regex dialect (classes, `|`, `*`, `+`, `/`-escapes).
    pattern: String,

    /// Files to search. Reads standard input if none are given.
    files: Vec<PathBuf>,

    /// Suppress normal output; print only a count of matching lines per file.
    #[arg(short = 'c', long = "count")]
    count: bool,

    /// Invert the sense of matching: select non-matching lines.
    #[arg(short = 'v', long = "invert-match")]
    invert: bool,

    /// Prefix each matching line with its 1-based line number.
    #[arg(short = 'n', long = "line-number")]
    line_number: bool,

    /// Match case-insensitively.
    #[arg(short = 'i', long = "ignore-case")]
    ignore_case: bool,

    /// Only count a match if both its boundaries fall on non-alphanumeric bytes (or line ends).
    #[arg(short = 'w', long = "word-regexp")]
    word: bool,

    /// Require the entire line (not just part of it) to match.
    #[arg(short = 'x', long = "line-regexp")]
    line: bool,

    /// Instead of searching files, print the first N words of the pattern's language in
    /// lexicographic order and exit (a diagnostic, not a search mode: every other flag is
    /// ignored).
    #[arg(long = "enumerate", value_name = "N")]
    enumerate: Option<usize>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let pattern = if args.ignore_case {
        ascii_lowercase(args.pattern.as_bytes())
    } else {
        args.pattern.as_bytes().to_vec()
    };

    let handle = match finreg::compile(&pattern) {
        Ok(h) => h,
        Err(e) => {
            eprintln!("{}", Error::Pattern(e));
            return ExitCode::FAILURE;
        }
    };

    if let Some(n) = args.enumerate {
        enumerate_words(&handle, n);
        return ExitCode::SUCCESS;
    }

    let mut any_match = false;
    let mut had_error = false;

    if args.files.is_empty() {
        let mut buf = Vec::new();
        if let Err(e) = io::Read::read_to_end(&mut io::stdin(), &mut buf) {
            eprintln!("stdin: {e}");
            return ExitCode::FAILURE;
        }
        any_match |= run_on_lines(&args, &handle, split_lines(&buf).into_iter(), None);
    } else {
        for path in &args.files {
            match read_lines(path) {
                Ok(lines) => {
                    let label = (args.files.len() > 1).then(|| path.as_path());
                    any_match |= run_on_lines(&args, &handle, lines.into_iter(), label);
                }
                Err(e) => {
                    eprintln!("{}", Error::File(path, e));
                    had_error = true;
                }
            }
        }
    }

    if had_error {
        ExitCode::FAILURE
    } else if any_match {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn read_lines(path: &Path) -> io::Result<Vec<Vec<u8>>> {
    let contents = fs::read(path)?;
    Ok(split_lines(&contents))
}

fn split_lines(contents: &[u8]) -> Vec<Vec<u8>> {
    let trimmed = contents.strip_suffix(b"\n").unwrap_or(contents);
    if trimmed.is_empty() {
        return Vec::new();
    }
    trimmed
        .split(|&b| b == b'\n')
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line).to_vec())
        .collect()
}

fn run_on_lines(
    args: &Args,
    handle: &Handle,
    lines: impl Iterator<Item = Vec<u8>>,
    label: Option<&Path>,
) -> bool {
    let mut count = 0usize;
    let mut any_match = false;

    for (idx, line) in lines.enumerate() {
        let search_line = if args.ignore_case {
            ascii_lowercase(&line)
        } else {
            line.clone()
        };

        let (line_matches, highlighted) = scan_line(handle, &search_line, &line, args.word, args.line);
        let line_matches = line_matches != args.invert;

        if !line_matches {
            continue;
        }
        any_match = true;
        count += 1;

        if args.count {
            continue;
        }

        if let Some(label) = label {
            print!("{}:", label.display());
        }
        if args.line_number {
            print!("{}:", idx + 1);
        }
        let out = if args.invert { line } else { highlighted };
        println!("{}", String::from_utf8_lossy(&out));
    }

    if args.count {
        if let Some(label) = label {
            println!("{}:{count}", label.display());
        } else {
            println!("{count}");
        }
    }

    any_match
}

/// Scans one line left-to-right, finding the longest match at each position (`spec.md` §6):
/// query `is_match` on successively longer prefixes of the remainder, keep extending while it
/// stays a match, and take the longest one seen. Advances by the match length, or one byte if no
/// match starts here. Returns whether the line had any (boundary-respecting) match, and the line
/// with matches wrapped in ANSI highlighting. Operates entirely in byte space, same as the
/// engine itself: `finreg` has no notion of UTF-8 codepoints, only bytes.
fn scan_line(
    handle: &Handle,
    search_bytes: &[u8],
    display_bytes: &[u8],
    word: bool,
    whole_line: bool,
) -> (bool, Vec<u8>) {
    debug_assert_eq!(search_bytes.len(), display_bytes.len());

    if whole_line {
        return if handle.is_match(search_bytes) {
            let mut out = BOLD_RED.as_bytes().to_vec();
            out.extend_from_slice(display_bytes);
            out.extend_from_slice(RESET.as_bytes());
            (true, out)
        } else {
            (false, display_bytes.to_vec())
        };
    }

    let mut out = Vec::with_capacity(display_bytes.len());
    let mut pos = 0;
    let mut any = false;

    while pos < search_bytes.len() {
        // Not prefix-closed in general (e.g. `a|aaa` matches length 1 and 3 but not 2), so every
        // length must be tried to find the true longest match at this position.
        let mut longest = None;
        for len in 1..=(search_bytes.len() - pos) {
            if handle.is_match(&search_bytes[pos..pos + len]) {
                longest = Some(len);
            }
        }

        match longest {
            Some(len) if !word || has_word_boundaries(search_bytes, pos, pos + len) => {
                out.extend_from_slice(BOLD_RED.as_bytes());
                out.extend_from_slice(&display_bytes[pos..pos + len]);
                out.extend_from_slice(RESET.as_bytes());
                pos += len;
                any = true;
            }
            _ => {
                out.push(display_bytes[pos]);
                pos += 1;
            }
        }
    }

    (any, out)
}

fn has_word_boundaries(bytes: &[u8], start: usize, end: usize) -> bool {
    let before_ok = start == 0 || !is_word_byte(bytes[start - 1]);
    let after_ok = end == bytes.len() || !is_word_byte(bytes[end]);
    before_ok && after_ok
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn ascii_lowercase(bytes: &[u8]) -> Vec<u8> {
    bytes.iter().map(|b| b.to_ascii_lowercase()).collect()
}

/// Prints the first `n` words of the compiled pattern's language, in lexicographic order.
fn enumerate_words(handle: &Handle, n: usize) {
    let mut nfa = handle.tree().clone().to_nfa();
    nfa.remove_epsilon_moves();

    println!("first {n} words of the language:");
    let mut found = 0;
    for word in nfa.words().take(n) {
        if word.is_empty() {
            println!("(empty word)");
        } else {
            println!("{}", String::from_utf8_lossy(&word));
        }
        found += 1;
    }
    if found != n {
        println!("(only {found} words exist in this language)");
    }
}
