//! Line folding shared by plain and quoted scalars.

use super::chars::Context;
use super::{PResult, Parser};

impl Parser<'_> {
    /// `s-line-prefix(n,c)`
    fn s_line_prefix(&mut self, n: i32, c: Context) -> PResult<()> {
        match c {
            Context::BlockOut | Context::BlockIn => self.s_indent(n),
            _ => self.s_flow_line_prefix(n),
        }
    }

    /// `l-empty(n,c)`: a line holding no content, read as one line feed.
    pub(crate) fn l_empty(&mut self, n: i32, c: Context) -> PResult<()> {
        self.attempt(|p| {
            if p.opt(|p| p.s_line_prefix(n, c))?.is_none() {
                p.s_indent_lt(n)?;
            }
            p.b_break()
        })
    }

    /// `b-l-trimmed(n,c)`: a line break followed by empty lines, which are kept as `\n` each.
    fn b_l_trimmed(&mut self, n: i32, c: Context) -> PResult<String> {
        self.attempt(|p| {
            p.b_break()?;
            let empties = p.skip_many(|p| p.l_empty(n, c))?;
            if empties == 0 {
                return p.fail("empty line");
            }
            Ok("\n".repeat(empties))
        })
    }

    /// `b-l-folded(n,c)`: a lone line break folds to a space.
    pub(crate) fn b_l_folded(&mut self, n: i32, c: Context) -> PResult<String> {
        if let Some(trimmed) = self.opt(|p| p.b_l_trimmed(n, c))? {
            return Ok(trimmed);
        }
        self.b_break()?;
        Ok(" ".to_string())
    }

    /// `s-flow-folded(n)`: trailing whitespace, the folded break, then the next line's prefix.
    pub(crate) fn s_flow_folded(&mut self, n: i32) -> PResult<String> {
        self.attempt(|p| {
            p.opt(|p| p.s_separate_in_line())?;
            let folded = p.b_l_folded(n, Context::FlowIn)?;
            p.s_flow_line_prefix(n)?;
            Ok(folded)
        })
    }
}
