//! Literal (`|`) and folded (`>`) block scalars.
//!
//! The header is matched like any other production. The content is read line by line: the
//! indentation is known (explicit) or detected up front, every line is classified once, and
//! folding and chomping are applied to the classified lines.

use super::chars::{is_break, is_white};
use super::{PResult, Parser};
use crate::error::Error;

/// Trailing line break handling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Chomp {
    Strip,
    Clip,
    Keep,
}

/// One line of block scalar content, without its indentation.
#[derive(Debug)]
enum Line {
    /// Nothing but indentation, terminated by a line break.
    Empty,
    Text {
        text: String,
        /// Starts with whitespace after the indentation; never folded.
        more_indented: bool,
        has_break: bool,
    },
}

/// Outcome of scanning for the first content line.
enum Detected {
    /// Content indentation to use.
    Indent(usize),
    /// The scalar has no content lines.
    Empty,
}

impl Parser<'_> {
    /// `c-l+literal(n)` and `c-l+folded(n)`: the indicator, its header and the content.
    pub(crate) fn c_l_block_scalar(&mut self, n: i32) -> PResult<String> {
        let literal = match self.peek() {
            Some('|') => true,
            Some('>') => false,
            _ => return self.fail("block scalar"),
        };
        let header = self.pos;
        self.bump();
        let (indicator, chomp) = self.c_b_block_header(header)?;

        let indent = match indicator {
            Some(m) => {
                let indent = (n + m).max(0) as usize;
                self.check_explicit_indent(n, indent)?;
                Detected::Indent(indent)
            }
            None => self.detect_indent(n)?,
        };

        let lines = match indent {
            Detected::Indent(indent) => self.block_lines(indent),
            Detected::Empty => self.blank_lines(),
        };
        self.l_trail_comments();
        Ok(assemble(&lines, literal, chomp))
    }

    /// `c-b-block-header`: indentation and chomping indicators in either order, then the end
    /// of the line.
    fn c_b_block_header(&mut self, header: usize) -> PResult<(Option<i32>, Chomp)> {
        let mut indicator = None;
        let mut chomp = None;
        for _ in 0..2 {
            match self.peek() {
                Some(d @ '1'..='9') if indicator.is_none() => {
                    indicator = Some(d as i32 - '0' as i32);
                    self.bump();
                }
                Some('0') => {
                    return Err(self.hard(Error::scalar("block scalar indentation indicator must be 1-9")));
                }
                Some('-') if chomp.is_none() => {
                    chomp = Some(Chomp::Strip);
                    self.bump();
                }
                Some('+') if chomp.is_none() => {
                    chomp = Some(Chomp::Keep);
                    self.bump();
                }
                _ => break,
            }
        }
        if self.opt(|p| p.s_b_comment())?.is_none() {
            return Err(self.hard_at(Error::scalar("invalid block scalar header"), header));
        }
        Ok((indicator, chomp.unwrap_or(Chomp::Clip)))
    }

    /// Leading space-only lines and the indentation of the first line with content.
    ///
    /// Returns the largest space count among the leading blank lines, the position where the
    /// longest one starts, and the space count of the first content line (`None` at the end of
    /// the input or of the document).
    fn scan_leading(&self, indent_zero: bool) -> (usize, usize, Option<usize>) {
        let mut i = self.pos;
        let mut widest = 0;
        let mut widest_at = i;
        loop {
            if i >= self.chars.len() {
                return (widest, widest_at, None);
            }
            let line = i;
            while self.chars.get(i) == Some(&' ') {
                i += 1;
            }
            match self.chars.get(i) {
                None => {
                    if i - line > widest {
                        widest = i - line;
                        widest_at = line;
                    }
                    return (widest, widest_at, None);
                }
                Some(&c) if is_break(c) => {
                    if i - line > widest {
                        widest = i - line;
                        widest_at = line;
                    }
                    i += if c == '\r' && self.chars.get(i + 1) == Some(&'\n') { 2 } else { 1 };
                }
                Some(_) => {
                    let spaces = i - line;
                    if spaces == 0 && indent_zero && self.is_marker_at(line) {
                        return (widest, widest_at, None);
                    }
                    return (widest, widest_at, Some(spaces));
                }
            }
        }
    }

    fn is_marker_at(&self, line: usize) -> bool {
        let at = |k: usize| self.chars.get(line + k).copied();
        let marker = (at(0) == Some('-') && at(1) == Some('-') && at(2) == Some('-'))
            || (at(0) == Some('.') && at(1) == Some('.') && at(2) == Some('.'));
        marker && at(3).is_none_or(|c| is_white(c) || is_break(c))
    }

    fn detect_indent(&mut self, n: i32) -> PResult<Detected> {
        let (widest, widest_at, first) = self.scan_leading(n < 0);
        let Some(k) = first else {
            return Ok(Detected::Empty);
        };
        if (k as i32) <= n {
            return Ok(Detected::Empty);
        }
        if widest > k {
            return Err(self.hard_at(
                Error::indentation("leading all-space line must not have too many spaces"),
                widest_at,
            ));
        }
        Ok(Detected::Indent(k))
    }

    fn check_explicit_indent(&mut self, n: i32, indent: usize) -> PResult<()> {
        let (widest, widest_at, first) = self.scan_leading(indent == 0);
        if let Some(k) = first {
            if (k as i32) > n && k < indent {
                let line = self.line_start_of_first_content();
                return Err(self.hard_at(
                    Error::indentation("less indented block scalar than the indicated level"),
                    line,
                ));
            }
        }
        if widest > indent {
            return Err(self.hard_at(
                Error::indentation("leading all-space line must not have too many spaces"),
                widest_at,
            ));
        }
        Ok(())
    }

    fn line_start_of_first_content(&self) -> usize {
        let mut i = self.pos;
        let mut line = i;
        while let Some(&c) = self.chars.get(i) {
            if is_break(c) {
                line = i + 1;
            } else if c != ' ' {
                break;
            }
            i += 1;
        }
        line
    }

    /// Consume the line break at the current position, if any.
    fn eat_break(&mut self) -> bool {
        self.b_break().is_ok()
    }

    /// Content lines at `indent` and the empty lines among and after them.
    fn block_lines(&mut self, indent: usize) -> Vec<Line> {
        let mut lines = Vec::new();
        loop {
            if self.at_end() || (indent == 0 && self.at_document_marker()) {
                break;
            }
            let line = self.pos;
            let spaces = self.count_spaces();
            let after = self.chars.get(line + spaces).copied();
            match after {
                None | Some('\n') | Some('\r') if spaces <= indent => {
                    self.pos = line + spaces;
                    if self.eat_break() {
                        lines.push(Line::Empty);
                    }
                }
                Some(c) if spaces < indent && !is_break(c) => {
                    self.pos = line;
                    break;
                }
                _ => {
                    // Content; for an all-space line, the spaces beyond the indentation.
                    self.pos = line + indent;
                    let start = self.pos;
                    while let Some(c) = self.chars.get(self.pos) {
                        if is_break(*c) {
                            break;
                        }
                        self.pos += 1;
                    }
                    let text = self.text(start, self.pos);
                    let more_indented = text.starts_with(is_white);
                    let has_break = self.eat_break();
                    lines.push(Line::Text {
                        text,
                        more_indented,
                        has_break,
                    });
                }
            }
            if self.pos == line {
                break;
            }
        }
        lines
    }

    /// Blank lines of a block scalar that has no content.
    fn blank_lines(&mut self) -> Vec<Line> {
        let mut lines = Vec::new();
        loop {
            let line = self.pos;
            let spaces = self.count_spaces();
            match self.chars.get(line + spaces) {
                Some(&c) if is_break(c) => {
                    self.pos = line + spaces;
                    self.eat_break();
                    lines.push(Line::Empty);
                }
                _ => {
                    self.pos = line;
                    return lines;
                }
            }
        }
    }

    /// `l-trail-comments`: comment lines after the content, less indented than it.
    fn l_trail_comments(&mut self) {
        let save = self.pos;
        self.eat_while(|c| c == ' ');
        if self.peek() == Some('#') && !self.at_document_marker() {
            self.eat_while(|c| !is_break(c));
            if self.b_comment().is_ok() {
                let _ = self.skip_many(|p| p.l_comment());
                return;
            }
        }
        self.pos = save;
    }
}

/// Apply folding (for `>`) and chomping to the classified lines.
fn assemble(lines: &[Line], literal: bool, chomp: Chomp) -> String {
    let last_text = lines.iter().rposition(|line| matches!(line, Line::Text { .. }));
    let mut out = String::new();

    let Some(last_text) = last_text else {
        if chomp == Chomp::Keep {
            out.extend(std::iter::repeat_n('\n', lines.len()));
        }
        return out;
    };

    let mut empties = 0;
    let mut previous_more: Option<bool> = None;
    for line in &lines[..=last_text] {
        match line {
            Line::Empty => empties += 1,
            Line::Text { text, more_indented, .. } => {
                match previous_more {
                    None => out.extend(std::iter::repeat_n('\n', empties)),
                    Some(_) if literal => out.extend(std::iter::repeat_n('\n', empties + 1)),
                    Some(prev) if prev || *more_indented => out.extend(std::iter::repeat_n('\n', empties + 1)),
                    Some(_) if empties == 0 => out.push(' '),
                    Some(_) => out.extend(std::iter::repeat_n('\n', empties)),
                }
                out.push_str(text);
                previous_more = Some(*more_indented);
                empties = 0;
            }
        }
    }

    let ends_with_break = matches!(lines[last_text], Line::Text { has_break: true, .. });
    match chomp {
        Chomp::Strip => {}
        Chomp::Clip => {
            if ends_with_break {
                out.push('\n');
            }
        }
        Chomp::Keep => {
            if ends_with_break {
                out.push('\n');
            }
            out.extend(std::iter::repeat_n('\n', lines.len() - last_text - 1));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Line {
        Line::Text {
            text: s.to_string(),
            more_indented: s.starts_with(is_white),
            has_break: true,
        }
    }

    #[test]
    fn folding_keeps_more_indented_lines() {
        let lines = [text("a"), text("b"), Line::Empty, text("c"), text("  d"), text("e")];
        assert_eq!(assemble(&lines, false, Chomp::Clip), "a b\nc\n  d\ne\n");
        assert_eq!(assemble(&lines, true, Chomp::Clip), "a\nb\n\nc\n  d\ne\n");
    }

    #[test]
    fn chomping_trailing_lines() {
        let lines = [text("x"), Line::Empty, Line::Empty];
        assert_eq!(assemble(&lines, true, Chomp::Strip), "x");
        assert_eq!(assemble(&lines, true, Chomp::Clip), "x\n");
        assert_eq!(assemble(&lines, true, Chomp::Keep), "x\n\n\n");
        assert_eq!(assemble(&[Line::Empty], true, Chomp::Keep), "\n");
        assert_eq!(assemble(&[Line::Empty], true, Chomp::Clip), "");
    }

    #[test]
    fn leading_empty_lines_are_kept() {
        let lines = [Line::Empty, text("folded")];
        assert_eq!(assemble(&lines, false, Chomp::Clip), "\nfolded\n");
    }
}
