//! Directives, document markers and the stream.

use ahash::AHashSet;
use log::{debug, warn};

use super::chars::{BOM, is_break, is_ns_char, is_tag_char, is_uri_char, is_white, is_word_char};
use super::{PResult, Parser};
use crate::error::Error;
use crate::node::Node;

/// One parsed document of a stream.
#[derive(Debug)]
pub(crate) struct Document {
    pub(crate) root: Node,
}

/// Directives seen before one document.
#[derive(Default)]
struct Directives {
    version: Option<(u32, u32)>,
    tag_handles: AHashSet<String>,
}

impl Parser<'_> {
    /// `l-yaml-stream`: every document of the input.
    pub(crate) fn l_yaml_stream(&mut self) -> PResult<Vec<Document>> {
        let mut documents = Vec::new();
        // A bare document (or directives) may start at the beginning of the stream and after
        // a `...` marker; anywhere else a new document needs `---`.
        let mut open = true;
        loop {
            self.l_document_prefix()?;
            while self.at_marker("...") {
                self.pos += 3;
                if self.s_l_comments().is_err() {
                    return Err(self.hard(Error::syntax("unexpected content after document end marker")));
                }
                open = true;
                self.l_document_prefix()?;
            }
            if self.at_end() {
                break;
            }

            let starts_explicit = self.peek() == Some('%') || self.at_marker("---");
            if !open && !starts_explicit {
                return self.fail("document end '...' or document start '---'");
            }
            if !open && self.peek() == Some('%') {
                return Err(self.hard(Error::directive("directives must follow a document end marker '...'")));
            }

            let document = self.l_any_document(documents.len())?;
            documents.push(document);
            open = false;

            if !self.at_end() && !self.at_marker("---") && !self.at_marker("...") {
                return self.fail("end of document");
            }
        }
        Ok(documents)
    }

    /// `---` or `...` at the start of a line, followed by whitespace or a line end.
    fn at_marker(&self, marker: &str) -> bool {
        self.is_start_of_line()
            && self.looking_at(marker)
            && self.chars.get(self.pos + 3).is_none_or(|&c| is_white(c) || is_break(c))
    }

    /// `l-document-prefix`: an optional byte order mark and comment lines.
    fn l_document_prefix(&mut self) -> PResult<()> {
        self.eat(BOM);
        self.skip_many(|p| p.l_comment())?;
        Ok(())
    }

    /// `l-any-document`: directives and an explicit document, or a bare document.
    fn l_any_document(&mut self, index: usize) -> PResult<Document> {
        self.anchors.clear();
        self.handles = self.schema.default_handles();
        if let Err(breach) = self.budget.start_document() {
            return Err(self.hard(Error::budget(breach)));
        }

        let directives = self.l_directives()?;
        let explicit = self.at_marker("---");
        if !directives.is_empty() && !explicit {
            return self.fail("'---' after directives");
        }

        let root = if explicit {
            self.pos += 3;
            match self.opt(|p| p.l_bare_document())? {
                Some(root) => root,
                None => {
                    let root = self.empty_node();
                    self.s_l_comments()?;
                    root
                }
            }
        } else {
            self.l_bare_document()?
        };

        if let Err(breach) = self.budget.observe_document(&root, self.anchors.len()) {
            return Err(self.hard(Error::budget(breach)));
        }
        debug!(
            "document {index} parsed: explicit start {explicit}, version {:?}, {} anchors",
            directives.version,
            self.anchors.len()
        );
        Ok(Document { root })
    }

    /// `l-bare-document`: a block node at indentation -1.
    fn l_bare_document(&mut self) -> PResult<Node> {
        self.s_l_block_node(-1, super::chars::Context::BlockIn)
    }

    fn l_directives(&mut self) -> PResult<Directives> {
        let mut directives = Directives::default();
        while self.peek() == Some('%') && self.is_start_of_line() {
            self.l_directive(&mut directives)?;
            self.skip_many(|p| p.l_comment())?;
        }
        Ok(directives)
    }

    /// `l-directive`
    fn l_directive(&mut self, directives: &mut Directives) -> PResult<()> {
        let start = self.pos;
        self.expect('%', "directive")?;
        let name_start = self.pos;
        self.eat_while(is_ns_char);
        let name = self.text(name_start, self.pos);
        match name.as_str() {
            "YAML" => self.ns_yaml_directive(directives, start)?,
            "TAG" => self.ns_tag_directive(directives, start)?,
            _ => {
                warn!("ignoring reserved directive %{name}");
                self.eat_while(|c| !is_break(c));
            }
        }
        if self.s_l_comments().is_err() {
            return Err(self.hard_at(Error::directive(format!("malformed %{name} directive")), start));
        }
        Ok(())
    }

    fn decimal(&mut self) -> Option<u32> {
        let start = self.pos;
        if self.eat_while(|c| c.is_ascii_digit()) == 0 {
            return None;
        }
        self.text(start, self.pos).parse().ok()
    }

    /// `ns-yaml-directive`: `%YAML major.minor`.
    fn ns_yaml_directive(&mut self, directives: &mut Directives, start: usize) -> PResult<()> {
        if directives.version.is_some() {
            return Err(self.hard_at(Error::directive("duplicate %YAML directive"), start));
        }
        if self.eat_while(is_white) == 0 {
            return Err(self.hard_at(Error::directive("malformed %YAML directive"), start));
        }
        let version_at = self.pos;
        let version = match (self.decimal(), self.eat('.'), self.decimal()) {
            (Some(major), true, Some(minor)) => (major, minor),
            _ => return Err(self.hard_at(Error::directive("malformed %YAML version"), version_at)),
        };
        match version {
            (1, 0) => {
                return Err(self.hard_at(Error::directive("unsupported YAML version 1.0"), version_at));
            }
            (1, 1) => warn!("YAML 1.1 document is read with YAML 1.2 rules"),
            (1, _) => {}
            (major, minor) => {
                return Err(self.hard_at(
                    Error::directive(format!("unsupported YAML version {major}.{minor}")),
                    version_at,
                ));
            }
        }
        directives.version = Some(version);
        Ok(())
    }

    /// `ns-tag-directive`: `%TAG handle prefix`, valid until the end of the document.
    fn ns_tag_directive(&mut self, directives: &mut Directives, start: usize) -> PResult<()> {
        if self.eat_while(is_white) == 0 {
            return Err(self.hard_at(Error::directive("malformed %TAG directive"), start));
        }
        let handle = self.c_tag_handle(start)?;
        if self.eat_while(is_white) == 0 {
            return Err(self.hard_at(Error::directive("malformed %TAG directive"), start));
        }
        let prefix_start = self.pos;
        let prefix = match self.peek() {
            Some('!') => {
                self.bump();
                format!("!{}", self.uri_chars(is_uri_char)?)
            }
            Some(c) if is_tag_char(c) || c == '%' => self.uri_chars(is_uri_char)?,
            _ => return Err(self.hard_at(Error::directive("malformed %TAG prefix"), prefix_start)),
        };
        if !directives.tag_handles.insert(handle.clone()) {
            return Err(self.hard_at(Error::directive(format!("duplicate %TAG directive for {handle}")), start));
        }
        self.handles.insert(handle, prefix);
        Ok(())
    }

    /// `c-tag-handle`: `!`, `!!` or `!name!`.
    fn c_tag_handle(&mut self, start: usize) -> PResult<String> {
        let handle_start = self.pos;
        if !self.eat('!') {
            return Err(self.hard_at(Error::directive("malformed %TAG handle"), start));
        }
        self.eat_while(is_word_char);
        if !self.eat('!') && self.pos != handle_start + 1 {
            return Err(self.hard_at(Error::directive("malformed %TAG handle"), handle_start));
        }
        Ok(self.text(handle_start, self.pos))
    }
}

impl Directives {
    fn is_empty(&self) -> bool {
        self.version.is_none() && self.tag_handles.is_empty()
    }
}
