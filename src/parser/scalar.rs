//! Flow scalars: plain, single-quoted and double-quoted.

use super::chars::{Context, is_break, is_indicator, is_nb_json, is_ns_char, is_plain_safe, is_white};
use super::{PResult, Parser};
use crate::error::Error;

impl Parser<'_> {
    /// Would `ns-plain-char(c)` match at the current position?
    fn at_plain_char(&self, c: Context) -> bool {
        match self.peek() {
            Some(':') => self.peek_at(1).is_some_and(|next| is_plain_safe(next, c)),
            Some('#') => self.pos > 0 && is_ns_char(self.chars[self.pos - 1]),
            Some(ch) => is_plain_safe(ch, c),
            None => false,
        }
    }

    /// Would `ns-plain-first(c)` match at the current position?
    pub(crate) fn at_plain_first(&self, c: Context) -> bool {
        match self.peek() {
            Some('?' | ':' | '-') => self.peek_at(1).is_some_and(|next| is_plain_safe(next, c)),
            Some(ch) => is_ns_char(ch) && !is_indicator(ch),
            None => false,
        }
    }

    /// `nb-ns-plain-in-line(c)`: the rest of a plain line, without trailing whitespace.
    fn nb_ns_plain_in_line(&mut self, c: Context) {
        loop {
            let save = self.pos;
            self.eat_while(is_white);
            if self.at_plain_char(c) {
                self.bump();
            } else {
                self.pos = save;
                return;
            }
        }
    }

    /// `ns-plain-one-line(c)`
    fn ns_plain_one_line(&mut self, c: Context) -> PResult<String> {
        if !self.at_plain_first(c) {
            return self.fail("plain scalar");
        }
        let start = self.pos;
        self.bump();
        self.nb_ns_plain_in_line(c);
        Ok(self.text(start, self.pos))
    }

    /// `s-ns-plain-next-line(n,c)`: a folded continuation line.
    fn s_ns_plain_next_line(&mut self, n: i32, c: Context) -> PResult<String> {
        self.attempt(|p| {
            let mut folded = p.s_flow_folded(n)?;
            if !p.at_plain_char(c) {
                return p.fail("plain scalar continuation");
            }
            let start = p.pos;
            p.bump();
            p.nb_ns_plain_in_line(c);
            folded.push_str(&p.text(start, p.pos));
            Ok(folded)
        })
    }

    /// `ns-plain(n,c)`: multi-line except in key contexts.
    pub(crate) fn ns_plain(&mut self, n: i32, c: Context) -> PResult<String> {
        let mut content = self.ns_plain_one_line(c)?;
        if c.is_key() {
            return Ok(content);
        }
        while let Some(next) = self.opt(|p| p.s_ns_plain_next_line(n, c))? {
            content.push_str(&next);
        }
        Ok(content)
    }

    fn unterminated<T>(&mut self, what: &'static str) -> PResult<T> {
        if self.at_end() {
            Err(self.hard(Error::scalar(format!("unterminated {what} scalar"))))
        } else {
            self.fail("closing quote")
        }
    }

    /// `c-single-quoted(n,c)`
    pub(crate) fn c_single_quoted(&mut self, n: i32, c: Context) -> PResult<String> {
        self.attempt(|p| {
            p.expect('\'', "single-quoted scalar")?;
            let mut out = String::new();
            // Length of `out` without the raw whitespace that ends the current line.
            let mut kept = 0;
            loop {
                match p.peek() {
                    Some('\'') if p.peek_at(1) == Some('\'') => {
                        out.push('\'');
                        p.pos += 2;
                        kept = out.len();
                    }
                    Some('\'') => {
                        p.bump();
                        return Ok(out);
                    }
                    Some(ch) if is_break(ch) => {
                        if c.is_key() {
                            return p.fail("closing quote");
                        }
                        out.truncate(kept);
                        out.push_str(&p.s_flow_folded(n)?);
                        kept = out.len();
                    }
                    Some(ch) if is_nb_json(ch) => {
                        out.push(ch);
                        p.bump();
                        if !is_white(ch) {
                            kept = out.len();
                        }
                    }
                    Some(_) => return p.fail("printable character"),
                    None => return p.unterminated("single-quoted"),
                }
            }
        })
    }

    /// `c-double-quoted(n,c)`
    pub(crate) fn c_double_quoted(&mut self, n: i32, c: Context) -> PResult<String> {
        self.attempt(|p| {
            p.expect('"', "double-quoted scalar")?;
            let mut out = String::new();
            let mut kept = 0;
            loop {
                match p.peek() {
                    Some('"') => {
                        p.bump();
                        return Ok(out);
                    }
                    Some('\\') if p.peek_at(1).is_some_and(is_break) => {
                        if c.is_key() {
                            return p.fail("closing quote");
                        }
                        // Escaped line break: whitespace before it is content, the break is not.
                        p.bump();
                        p.b_break()?;
                        let empties = p.skip_many(|p| p.l_empty(n, Context::FlowIn))?;
                        out.extend(std::iter::repeat_n('\n', empties));
                        p.s_flow_line_prefix(n)?;
                        kept = out.len();
                    }
                    Some('\\') => {
                        p.bump();
                        let ch = p.c_ns_esc_char()?;
                        out.push(ch);
                        kept = out.len();
                    }
                    Some(ch) if is_break(ch) => {
                        if c.is_key() {
                            return p.fail("closing quote");
                        }
                        out.truncate(kept);
                        out.push_str(&p.s_flow_folded(n)?);
                        kept = out.len();
                    }
                    Some(ch) if is_nb_json(ch) => {
                        out.push(ch);
                        p.bump();
                        if !is_white(ch) {
                            kept = out.len();
                        }
                    }
                    Some(_) => return p.fail("printable character"),
                    None => return p.unterminated("double-quoted"),
                }
            }
        })
    }

    /// `c-ns-esc-char` after its backslash.
    fn c_ns_esc_char(&mut self) -> PResult<char> {
        let start = self.pos - 1;
        let Some(code) = self.peek() else {
            return self.unterminated("double-quoted");
        };
        self.bump();
        let ch = match code {
            '0' => '\0',
            'a' => '\u{07}',
            'b' => '\u{08}',
            't' | '\t' => '\t',
            'n' => '\n',
            'v' => '\u{0B}',
            'f' => '\u{0C}',
            'r' => '\r',
            'e' => '\u{1B}',
            ' ' => ' ',
            '"' => '"',
            '/' => '/',
            '\\' => '\\',
            'N' => '\u{85}',
            '_' => '\u{A0}',
            'L' => '\u{2028}',
            'P' => '\u{2029}',
            'x' => return self.hex_escape(2, start),
            'u' => return self.hex_escape(4, start),
            'U' => return self.hex_escape(8, start),
            other => {
                return Err(self.hard_at(Error::scalar(format!("invalid escape sequence \\{other}")), start));
            }
        };
        Ok(ch)
    }

    fn hex_escape(&mut self, digits: usize, start: usize) -> PResult<char> {
        let mut code: u32 = 0;
        for _ in 0..digits {
            let Some(d) = self.peek().and_then(|ch| ch.to_digit(16)) else {
                return Err(self.hard_at(Error::scalar(format!("escape sequence needs {digits} hex digits")), start));
            };
            code = code * 16 + d;
            self.bump();
        }
        char::from_u32(code).ok_or_else(|| {
            self.hard_at(Error::scalar(format!("escape sequence \\u{code:X} is not a valid code point")), start)
        })
    }
}
