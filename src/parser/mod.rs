//! Grammar engine.
//!
//! Recursive descent over the YAML 1.2 productions. Every production takes its indentation
//! level `n` and its [`Context`] as plain parameters. Alternatives are tried with
//! [`Parser::attempt`], which restores the position and the anchor log when the alternative
//! fails softly, so an abandoned alternative leaves nothing behind.
//!
//! Failures come in two strengths. A soft failure ([`Error::Syntax`]) only says that this
//! alternative does not match; it is cheap to produce and the furthest one is kept to build
//! the final diagnostic. Any other error (duplicate key, unknown alias, invalid escape, ...)
//! is hard and unwinds the whole stream.

mod block;
mod block_scalar;
pub(crate) mod chars;
mod document;
mod flow;
mod fold;
mod props;
mod scalar;

use ahash::{AHashMap, AHashSet};

use crate::budget::BudgetEnforcer;
use crate::error::Error;
use crate::location::Source;
use crate::node::{AnchorLog, KeyRepr, Node, NodeTag};
use crate::schema::Schema;

use chars::{is_break, is_white};

pub(crate) use document::Document;

pub(crate) type PResult<T> = Result<T, Error>;

/// Upper bound on the characters an implicit key may span before the `:` is found.
pub(crate) const IMPLICIT_KEY_LIMIT: usize = 1024;

/// Immutable snapshot of everything an alternative may change.
#[derive(Clone, Copy, Debug)]
struct Checkpoint {
    pos: usize,
    anchors: usize,
}

pub(crate) struct Parser<'s> {
    source: &'s Source,
    chars: &'s [char],
    pos: usize,
    /// Characters at or past `limit` are invisible to `peek`. Lowered while an implicit key
    /// is being matched.
    limit: usize,
    schema: &'s Schema,
    /// Tag handles of the current document: the schema defaults plus `%TAG` directives.
    handles: AHashMap<String, String>,
    anchors: AnchorLog,
    depth: usize,
    budget: &'s mut BudgetEnforcer,
    /// Furthest position a soft failure was reported at, with what was expected there.
    furthest: Option<(usize, &'static str)>,
}

impl<'s> Parser<'s> {
    pub(crate) fn new(source: &'s Source, schema: &'s Schema, budget: &'s mut BudgetEnforcer) -> Self {
        let chars = source.chars();
        Self {
            source,
            chars,
            pos: 0,
            limit: chars.len(),
            schema,
            handles: schema.default_handles(),
            anchors: AnchorLog::default(),
            depth: 0,
            budget,
            furthest: None,
        }
    }

    // ---- backtracking -------------------------------------------------------------------

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            pos: self.pos,
            anchors: self.anchors.len(),
        }
    }

    fn restore(&mut self, cp: Checkpoint) {
        self.pos = cp.pos;
        self.anchors.rewind(cp.anchors);
    }

    /// Run `f` speculatively: on a soft failure the parser is put back where it was.
    pub(crate) fn attempt<T>(&mut self, f: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        let cp = self.checkpoint();
        let result = f(self);
        if let Err(err) = &result {
            if err.is_soft() {
                self.restore(cp);
            }
        }
        result
    }

    /// Optional production: `Ok(None)` when `f` fails softly.
    pub(crate) fn opt<T>(&mut self, f: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<Option<T>> {
        match self.attempt(f) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.is_soft() => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Zero or more repetitions of `f`. Stops when `f` fails softly or stops consuming input.
    pub(crate) fn many<T>(&mut self, mut f: impl FnMut(&mut Self) -> PResult<T>) -> PResult<Vec<T>> {
        let mut out = Vec::new();
        loop {
            let start = self.pos;
            match self.opt(&mut f)? {
                Some(value) => {
                    out.push(value);
                    if self.pos == start {
                        break;
                    }
                }
                None => break,
            }
        }
        Ok(out)
    }

    /// Like [`Parser::many`], discarding the results. Returns how many repetitions matched.
    pub(crate) fn skip_many<T>(&mut self, mut f: impl FnMut(&mut Self) -> PResult<T>) -> PResult<usize> {
        let mut count = 0;
        loop {
            let start = self.pos;
            match self.opt(&mut f)? {
                Some(_) => {
                    count += 1;
                    if self.pos == start {
                        break;
                    }
                }
                None => break,
            }
        }
        Ok(count)
    }

    /// Only the next `max` characters are visible to `f`.
    pub(crate) fn limited<T>(&mut self, max: usize, f: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        let saved = self.limit;
        self.limit = saved.min(self.pos.saturating_add(max));
        let result = f(self);
        self.limit = saved;
        result
    }

    /// Enter one level of collection nesting for the duration of `f`.
    pub(crate) fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        self.depth += 1;
        if let Err(breach) = self.budget.check_depth(self.depth) {
            self.depth -= 1;
            return Err(self.hard(Error::budget(breach)));
        }
        let result = f(self);
        self.depth -= 1;
        result
    }

    // ---- failures -----------------------------------------------------------------------

    /// Soft failure at the current position.
    pub(crate) fn fail<T>(&mut self, expected: &'static str) -> PResult<T> {
        match self.furthest {
            Some((pos, _)) if pos > self.pos => {}
            _ => self.furthest = Some((self.pos, expected)),
        }
        Err(Error::Syntax {
            msg: String::new(),
            location: crate::location::Location::UNKNOWN,
            near: String::new(),
        })
    }

    /// Turn `err` into a hard error located at the current position.
    pub(crate) fn hard(&self, err: Error) -> Error {
        err.at(self.source, self.pos)
    }

    /// Turn `err` into a hard error located at `pos`.
    pub(crate) fn hard_at(&self, err: Error, pos: usize) -> Error {
        err.at(self.source, pos)
    }

    /// Replace the empty soft marker with a diagnostic for the furthest soft failure.
    pub(crate) fn diagnose(&self, err: Error) -> Error {
        if !err.is_soft() {
            return err;
        }
        match self.furthest {
            Some((pos, expected)) => self.describe_failure(pos, expected),
            None => Error::syntax("unexpected content").at(self.source, self.pos),
        }
    }

    fn describe_failure(&self, pos: usize, expected: &str) -> Error {
        let found = match self.chars.get(pos) {
            None => "end of input".to_string(),
            Some('\n') | Some('\r') => "line break".to_string(),
            Some(c) => format!("'{c}'"),
        };
        Error::syntax(format!("expected {expected}, found {found}")).at(self.source, pos)
    }

    // ---- character access ---------------------------------------------------------------

    #[inline]
    pub(crate) fn peek(&self) -> Option<char> {
        if self.pos < self.limit {
            self.chars.get(self.pos).copied()
        } else {
            None
        }
    }

    #[inline]
    pub(crate) fn peek_at(&self, k: usize) -> Option<char> {
        let i = self.pos + k;
        if i < self.limit { self.chars.get(i).copied() } else { None }
    }

    #[inline]
    pub(crate) fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    #[inline]
    pub(crate) fn bump(&mut self) {
        self.pos += 1;
    }

    pub(crate) fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub(crate) fn looking_at(&self, s: &str) -> bool {
        s.chars().enumerate().all(|(i, c)| self.peek_at(i) == Some(c))
    }

    pub(crate) fn expect(&mut self, c: char, expected: &'static str) -> PResult<()> {
        if self.eat(c) { Ok(()) } else { self.fail(expected) }
    }

    /// Consume characters while `pred` holds; returns how many were consumed.
    pub(crate) fn eat_while(&mut self, pred: impl Fn(char) -> bool) -> usize {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.pos += 1;
        }
        self.pos - start
    }

    pub(crate) fn text(&self, start: usize, end: usize) -> String {
        self.chars[start..end].iter().collect()
    }

    /// Zero-width `start-of-line`.
    pub(crate) fn is_start_of_line(&self) -> bool {
        self.pos == 0
            || is_break(self.chars[self.pos - 1])
            || (self.pos == 1 && self.chars[0] == chars::BOM)
    }

    /// `c-forbidden`: a `---` or `...` marker at the start of a line.
    pub(crate) fn at_document_marker(&self) -> bool {
        self.is_start_of_line()
            && (self.looking_at("---") || self.looking_at("..."))
            && self.chars.get(self.pos + 3).is_none_or(|&c| is_white(c) || is_break(c))
    }

    // ---- node helpers -------------------------------------------------------------------

    pub(crate) fn location(&self, pos: usize) -> crate::location::Location {
        self.source.location(pos)
    }

    /// `e-scalar`: an empty plain scalar, resolved like the plain scalar `""`.
    pub(crate) fn empty_node(&self) -> Node {
        Node::Scalar {
            content: String::new(),
            tag: NodeTag::Unspecified,
            location: self.location(self.pos),
        }
    }

    // ---- indentation (s-indent family) --------------------------------------------------

    /// `s-indent(n)`: exactly `n` spaces. Never matches a document marker at column 0.
    pub(crate) fn s_indent(&mut self, n: i32) -> PResult<()> {
        if n < 0 {
            return Ok(());
        }
        if n == 0 && self.at_document_marker() {
            return self.fail("content, not a document marker");
        }
        let n = n as usize;
        if (0..n).all(|i| self.peek_at(i) == Some(' ')) {
            self.pos += n;
            Ok(())
        } else {
            self.fail("indentation")
        }
    }

    /// `s-indent(<n)`: fewer than `n` spaces (consumes as many as allowed).
    pub(crate) fn s_indent_lt(&mut self, n: i32) -> PResult<()> {
        if n <= 0 {
            return self.fail("less indentation");
        }
        let max = (n - 1) as usize;
        let mut k = 0;
        while k < max && self.peek() == Some(' ') {
            self.pos += 1;
            k += 1;
        }
        Ok(())
    }

    /// Number of spaces starting at the current position, without consuming them.
    pub(crate) fn count_spaces(&self) -> usize {
        let mut k = 0;
        while self.peek_at(k) == Some(' ') {
            k += 1;
        }
        k
    }

    // ---- breaks, comments and separation --------------------------------------------------

    /// `b-break`: CRLF, CR or LF.
    pub(crate) fn b_break(&mut self) -> PResult<()> {
        match self.peek() {
            Some('\r') => {
                self.bump();
                self.eat('\n');
                Ok(())
            }
            Some('\n') => {
                self.bump();
                Ok(())
            }
            _ => self.fail("line break"),
        }
    }

    /// `s-separate-in-line`: whitespace, or nothing at the start of a line.
    pub(crate) fn s_separate_in_line(&mut self) -> PResult<()> {
        if self.eat_while(is_white) > 0 || self.is_start_of_line() {
            Ok(())
        } else {
            self.fail("whitespace")
        }
    }

    /// `c-nb-comment-text`
    pub(crate) fn c_nb_comment_text(&mut self) -> PResult<()> {
        self.expect('#', "comment")?;
        self.eat_while(chars::is_nb_char);
        Ok(())
    }

    /// `b-comment`: a line break or the end of the input.
    pub(crate) fn b_comment(&mut self) -> PResult<()> {
        if self.at_end() { Ok(()) } else { self.b_break() }
    }

    /// `s-b-comment`: optional trailing comment, then the end of the line.
    pub(crate) fn s_b_comment(&mut self) -> PResult<()> {
        self.attempt(|p| {
            p.opt(|p| {
                p.s_separate_in_line()?;
                p.opt(|p| p.c_nb_comment_text())
            })?;
            p.b_comment()
        })
    }

    /// `l-comment`: a line holding only whitespace and possibly a comment.
    pub(crate) fn l_comment(&mut self) -> PResult<()> {
        if self.at_end() {
            return self.fail("comment line");
        }
        self.s_separate_in_line()?;
        self.opt(|p| p.c_nb_comment_text())?;
        self.b_comment()
    }

    /// `s-l-comments`: end of the current line, then any number of comment or blank lines.
    pub(crate) fn s_l_comments(&mut self) -> PResult<()> {
        if self.opt(|p| p.s_b_comment())?.is_none() && !self.is_start_of_line() {
            return self.fail("end of line");
        }
        self.skip_many(|p| p.l_comment())?;
        Ok(())
    }

    /// `s-flow-line-prefix(n)`
    pub(crate) fn s_flow_line_prefix(&mut self, n: i32) -> PResult<()> {
        self.s_indent(n)?;
        self.opt(|p| p.s_separate_in_line())?;
        Ok(())
    }

    /// `s-separate-lines(n)`
    pub(crate) fn s_separate_lines(&mut self, n: i32) -> PResult<()> {
        let crossed = self.opt(|p| {
            p.s_l_comments()?;
            p.s_flow_line_prefix(n)
        })?;
        match crossed {
            Some(()) => Ok(()),
            None => self.s_separate_in_line(),
        }
    }

    /// `s-separate(n,c)`: keys never span lines.
    pub(crate) fn s_separate(&mut self, n: i32, c: chars::Context) -> PResult<()> {
        if c.is_key() {
            self.s_separate_in_line()
        } else {
            self.s_separate_lines(n)
        }
    }

    // ---- mappings -------------------------------------------------------------------------

    /// Add `key: value` to `builder`, rejecting keys equal to one already present.
    pub(crate) fn insert_entry(&mut self, builder: &mut MappingBuilder, key: Node, value: Node) -> PResult<()> {
        let key_pos = key.location().offset() as usize;
        let repr = key
            .key_repr(self.schema)
            .map_err(|err| self.hard_at(err, key_pos))?;
        if !builder.seen.insert(repr.clone()) {
            return Err(self.hard_at(Error::duplicate_key(repr.to_string()), key_pos));
        }
        builder.entries.push((key, value));
        Ok(())
    }
}

/// Entries of a mapping under construction and the keys seen so far.
#[derive(Default)]
pub(crate) struct MappingBuilder {
    entries: Vec<(Node, Node)>,
    seen: AHashSet<KeyRepr>,
}

impl MappingBuilder {
    pub(crate) fn into_entries(self) -> Vec<(Node, Node)> {
        self.entries
    }
}

/// Parse a whole stream into one node tree per document.
pub(crate) fn parse_stream(source: &Source, schema: &Schema, budget: &mut BudgetEnforcer) -> Result<Vec<Document>, Error> {
    let mut parser = Parser::new(source, schema, budget);
    parser.l_yaml_stream().map_err(|err| parser.diagnose(err))
}
