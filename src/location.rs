//! Source location utilities.

use serde::{Deserialize, Serialize};

/// Type alias for the character offset stored in [`Location`].
///
/// By default, this is `u32`, which limits offsets to 4 GiB but keeps [`Location`] compact.
///
/// When the `huge_documents` feature is enabled, this becomes `u64`, allowing streams larger
/// than 4 GiB even on 32-bit platforms.
#[cfg(not(feature = "huge_documents"))]
pub(crate) type SpanIndex = u32;

/// Type alias for the character offset stored in [`Location`].
///
/// With `huge_documents` enabled, this is `u64`, allowing streams larger than 4 GiB.
#[cfg(feature = "huge_documents")]
pub(crate) type SpanIndex = u64;

/// Row/column location within the source YAML stream (1-indexed, character-based).
///
/// # Example
///
/// ```
/// let err = yaml_loader::load("a: 1\nb: *missing\n").unwrap_err();
/// let loc = err.location().expect("alias errors carry a location");
/// assert_eq!(loc.line(), 2);
/// assert_eq!(loc.column(), 4);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// 1-indexed row number in the input stream.
    pub(crate) line: u32,
    /// 1-indexed column number in the input stream.
    pub(crate) column: u32,
    /// 0-indexed character offset from the start of the input stream.
    pub(crate) offset: SpanIndex,
}

impl Location {
    /// Sentinel value meaning "location unknown".
    pub const UNKNOWN: Self = Self {
        line: 0,
        column: 0,
        offset: 0,
    };

    pub(crate) const fn new(line: usize, column: usize, offset: usize) -> Self {
        // Line and column only feed error reporting; 4 billion lines is out of reach.
        Self {
            line: line as u32,
            column: column as u32,
            offset: offset as SpanIndex,
        }
    }

    /// 1-indexed line.
    #[inline]
    pub fn line(&self) -> u64 {
        self.line as u64
    }

    /// 1-indexed column, counted in characters.
    #[inline]
    pub fn column(&self) -> u64 {
        self.column as u64
    }

    /// Character offset from the start of the stream.
    #[inline]
    pub fn offset(&self) -> u64 {
        self.offset as u64
    }

    #[inline]
    pub fn is_known(&self) -> bool {
        self.line != 0
    }
}

/// Maximum number of characters quoted in the `near` part of an error message.
pub(crate) const NEAR_CHARS: usize = 50;

/// Decoded input, indexed by character.
///
/// Every production of the grammar addresses the input by character index, so the text is
/// decoded once up front. Line starts are recorded so that a [`Location`] can be computed for
/// any index with a binary search.
pub(crate) struct Source {
    chars: Vec<char>,
    line_starts: Vec<usize>,
}

impl Source {
    pub(crate) fn new(text: &str) -> Self {
        let chars: Vec<char> = text.chars().collect();
        let mut line_starts = vec![0];
        let mut i = 0;
        while i < chars.len() {
            match chars[i] {
                '\r' if chars.get(i + 1) == Some(&'\n') => {
                    line_starts.push(i + 2);
                    i += 2;
                    continue;
                }
                '\r' | '\n' => line_starts.push(i + 1),
                _ => {}
            }
            i += 1;
        }
        Self { chars, line_starts }
    }

    #[inline]
    pub(crate) fn chars(&self) -> &[char] {
        &self.chars
    }

    pub(crate) fn location(&self, pos: usize) -> Location {
        let pos = pos.min(self.chars.len());
        let line = match self.line_starts.binary_search(&pos) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        Location::new(line + 1, pos - self.line_starts[line] + 1, pos)
    }

    /// Up to [`NEAR_CHARS`] characters of the input starting at `pos`, with line breaks and
    /// double quotes escaped so the result can be embedded in a one-line message.
    pub(crate) fn near(&self, pos: usize) -> String {
        let start = pos.min(self.chars.len());
        let end = (start + NEAR_CHARS).min(self.chars.len());
        escape_near(&self.chars[start..end])
    }
}

pub(crate) fn escape_near(chars: &[char]) -> String {
    let mut out = String::with_capacity(chars.len());
    for &c in chars {
        match c {
            '\r' => out.push_str("\\r"),
            '\n' => out.push_str("\\n"),
            '"' => out.push_str("\\\""),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_counts_characters_and_crlf() {
        let src = Source::new("ab\r\nçd\ne");
        assert_eq!(src.location(0), Location::new(1, 1, 0));
        assert_eq!(src.location(4), Location::new(2, 1, 4));
        assert_eq!(src.location(5), Location::new(2, 2, 5));
        assert_eq!(src.location(7), Location::new(3, 1, 7));
    }

    #[test]
    fn near_is_escaped_and_bounded() {
        let src = Source::new("say \"hi\"\nnext");
        assert_eq!(src.near(0), "say \\\"hi\\\"\\nnext");
        let long = "x".repeat(80);
        assert_eq!(Source::new(&long).near(10).len(), NEAR_CHARS);
    }
}
