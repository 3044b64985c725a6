//! Character classes and parsing contexts.
//!
//! Every predicate here is derived from the printable set by subtraction, the way the
//! YAML 1.2 productions define them (`nb-char`, `ns-char`, `ns-plain-safe(c)` and so on).

/// The six contexts that parameterize the grammar.
///
/// The context decides which characters are safe inside plain scalars, whether line folding
/// is allowed and whether multi-line scalars are allowed at all (keys are single-line).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum Context {
    BlockOut,
    BlockIn,
    FlowOut,
    FlowIn,
    BlockKey,
    FlowKey,
}

impl Context {
    /// Context used for the entries of a flow collection opened in `self`.
    pub(crate) fn in_flow(self) -> Context {
        match self {
            Context::FlowOut | Context::FlowIn | Context::BlockOut | Context::BlockIn => Context::FlowIn,
            Context::BlockKey | Context::FlowKey => Context::FlowKey,
        }
    }

    pub(crate) fn is_key(self) -> bool {
        matches!(self, Context::BlockKey | Context::FlowKey)
    }

    pub(crate) fn is_flow(self) -> bool {
        matches!(self, Context::FlowIn | Context::FlowKey)
    }
}

pub(crate) const BOM: char = '\u{FEFF}';

/// `c-printable`: TAB, LF, CR, NEL and the printable ranges; excludes C0 controls and surrogates.
pub(crate) fn is_printable(c: char) -> bool {
    matches!(c,
        '\t' | '\n' | '\r' | '\u{85}'
        | '\u{20}'..='\u{7E}'
        | '\u{A0}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
}

/// `b-char`
#[inline]
pub(crate) fn is_break(c: char) -> bool {
    c == '\n' || c == '\r'
}

/// `s-white`
#[inline]
pub(crate) fn is_white(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// `nb-char`: printable, not a line break, not a byte order mark.
#[inline]
pub(crate) fn is_nb_char(c: char) -> bool {
    is_printable(c) && !is_break(c) && c != BOM
}

/// `ns-char`
#[inline]
pub(crate) fn is_ns_char(c: char) -> bool {
    is_nb_char(c) && !is_white(c)
}

/// `nb-json`: TAB and everything from space upwards.
#[inline]
pub(crate) fn is_nb_json(c: char) -> bool {
    c == '\t' || c >= '\u{20}'
}

/// `c-indicator`
pub(crate) fn is_indicator(c: char) -> bool {
    matches!(
        c,
        '-' | '?' | ':' | ',' | '[' | ']' | '{' | '}' | '#' | '&' | '*' | '!' | '|' | '>' | '\'' | '"' | '%' | '@' | '`'
    )
}

/// `c-flow-indicator`
#[inline]
pub(crate) fn is_flow_indicator(c: char) -> bool {
    matches!(c, ',' | '[' | ']' | '{' | '}')
}

/// `ns-word-char`
#[inline]
pub(crate) fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-'
}

/// `ns-uri-char` without the `%XX` escape form, which callers match separately.
pub(crate) fn is_uri_char(c: char) -> bool {
    is_word_char(c)
        || matches!(
            c,
            '#' | ';' | '/' | '?' | ':' | '@' | '&' | '=' | '+' | '$' | ',' | '_' | '.' | '!' | '~' | '*' | '\''
                | '(' | ')' | '[' | ']'
        )
}

/// `ns-tag-char`: a URI character that is neither `!` nor a flow indicator.
#[inline]
pub(crate) fn is_tag_char(c: char) -> bool {
    is_uri_char(c) && c != '!' && !is_flow_indicator(c)
}

/// `ns-anchor-char`
#[inline]
pub(crate) fn is_anchor_char(c: char) -> bool {
    is_ns_char(c) && !is_flow_indicator(c)
}

/// `ns-plain-safe(c)`: flow indicators end plain scalars only inside flow collections.
#[inline]
pub(crate) fn is_plain_safe(c: char, ctx: Context) -> bool {
    if ctx.is_flow() {
        is_ns_char(c) && !is_flow_indicator(c)
    } else {
        is_ns_char(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn printable_excludes_controls_but_keeps_whitespace() {
        assert!(is_printable('\t'));
        assert!(is_printable('\n'));
        assert!(!is_printable('\u{7}'));
        assert!(!is_printable('\u{7F}'));
        assert!(is_printable('\u{85}'));
        assert!(!is_nb_char(BOM));
    }

    #[test]
    fn plain_safe_depends_on_flow() {
        assert!(is_plain_safe(',', Context::BlockIn));
        assert!(is_plain_safe(',', Context::FlowOut));
        assert!(!is_plain_safe(',', Context::FlowIn));
        assert!(!is_plain_safe(']', Context::FlowKey));
        assert!(!is_plain_safe(' ', Context::BlockKey));
    }

    #[test]
    fn in_flow_keeps_key_contexts() {
        assert_eq!(Context::BlockOut.in_flow(), Context::FlowIn);
        assert_eq!(Context::FlowOut.in_flow(), Context::FlowIn);
        assert_eq!(Context::BlockKey.in_flow(), Context::FlowKey);
    }
}
