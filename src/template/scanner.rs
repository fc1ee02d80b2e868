//! Depth-aware character scanner.
//!
//! Walks a string and reports every character together with its nesting
//! depth. `{`, `[` and quotes (`'`, `"`, `` ` ``) open a level; the matching
//! `}`, `]` or the same quote closes it. Inside a quoted level brackets are
//! plain characters, so a string literal containing `]` never perturbs the
//! depth of the surrounding structure.

use std::str::CharIndices;

/// Characters that open and close a string level
const QUOTES: [char; 3] = ['\'', '"', '`'];

/// What a scanned character does to the nesting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanEventKind {
    /// `{`, `[` or an opening quote
    Open,
    /// Bracket or quote closing the innermost level
    Close,
    /// Any other character, including brackets inside quotes
    Char,
}

/// One scanned character.
///
/// For `Open` and `Close` events `depth` is the depth *outside* the bracket,
/// so a top-level `{` and its matching `}` both report depth `0`. For
/// `Char` events it is the depth the character sits at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanEvent {
    /// Byte offset of `ch`
    pub index: usize,
    /// Scanned character
    pub ch: char,
    /// Nesting depth, see above
    pub depth: usize,
    /// Effect on the nesting
    pub kind: ScanEventKind,
}

/// Iterator over [`ScanEvent`]s.
#[derive(Debug, Clone)]
pub struct DepthScanner<'a> {
    /// Remaining input
    chars: CharIndices<'a>,
    /// Opening characters of the levels still open
    stack: Vec<char>,
}

impl<'a> DepthScanner<'a> {
    /// Scans `input` from depth 0.
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        Self { chars: input.char_indices(), stack: Vec::new() }
    }

    /// Current nesting depth.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Quote of the innermost level, if it is a string.
    fn in_quote(&self) -> Option<char> {
        self.stack.last().copied().filter(|c| QUOTES.contains(c))
    }
}

/// Character that closes the level opened by `open`.
const fn closing_for(open: char) -> char {
    match open {
        '{' => '}',
        '[' => ']',
        other => other,
    }
}

impl Iterator for DepthScanner<'_> {
    type Item = ScanEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let (index, ch) = self.chars.next()?;
        let depth = self.stack.len();

        if let Some(quote) = self.in_quote() {
            if ch == quote {
                self.stack.pop();
                return Some(ScanEvent { index, ch, depth: depth - 1, kind: ScanEventKind::Close });
            }
            return Some(ScanEvent { index, ch, depth, kind: ScanEventKind::Char });
        }

        if ch == '{' || ch == '[' || QUOTES.contains(&ch) {
            self.stack.push(ch);
            return Some(ScanEvent { index, ch, depth, kind: ScanEventKind::Open });
        }

        if let Some(&open) = self.stack.last()
            && closing_for(open) == ch
        {
            self.stack.pop();
            return Some(ScanEvent { index, ch, depth: depth - 1, kind: ScanEventKind::Close });
        }

        Some(ScanEvent { index, ch, depth, kind: ScanEventKind::Char })
    }
}

/// Splits `input` on every `separator` found at depth 0.
///
/// Pieces are returned untrimmed; an empty input yields a single empty piece.
#[must_use]
pub fn split_top_level(input: &str, separator: char) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    for event in DepthScanner::new(input) {
        if event.kind == ScanEventKind::Char && event.depth == 0 && event.ch == separator {
            pieces.push(input.get(start..event.index).unwrap_or_default());
            start = event.index + event.ch.len_utf8();
        }
    }
    pieces.push(input.get(start..).unwrap_or_default());
    pieces
}

/// Byte index of the first `needle` found at depth 0.
#[must_use]
pub fn find_top_level(input: &str, needle: char) -> Option<usize> {
    DepthScanner::new(input)
        .find(|event| event.kind == ScanEventKind::Char && event.depth == 0 && event.ch == needle)
        .map(|event| event.index)
}
