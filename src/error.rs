//! Defines error and its location

use std::fmt;

use crate::budget::BudgetBreach;
use crate::location::{Location, Source};

/// Error returned by every load function.
///
/// The engine has no recovery mode: the first failure of a stream is the only one reported.
/// Apart from [`Error::IOError`], every variant carries the [`Location`] where the problem was
/// found and `near`, up to 50 characters of the input that had not been consumed yet.
#[derive(Debug)]
pub enum Error {
    /// No production matches at this position.
    Syntax {
        msg: String,
        location: Location,
        near: String,
    },
    /// Duplicate `%YAML` or `%TAG` directive, malformed or unsupported version.
    Directive {
        msg: String,
        location: Location,
        near: String,
    },
    /// Content indented in a way its enclosing construct does not allow.
    Indentation {
        msg: String,
        location: Location,
        near: String,
    },
    /// A mapping received two keys that compare equal.
    DuplicateKey {
        key: String,
        location: Location,
        near: String,
    },
    /// An alias names an anchor that is not defined in the current document.
    UnknownAlias {
        name: String,
        location: Location,
        near: String,
    },
    /// An alias was dereferenced while its anchored node was still being built.
    CircularAlias {
        name: String,
        location: Location,
        near: String,
    },
    /// A tag handle or tag could not be resolved, or a scalar does not match its tag.
    Tag {
        msg: String,
        location: Location,
        near: String,
    },
    /// Malformed block scalar header, invalid escape, unterminated scalar.
    Scalar {
        msg: String,
        location: Location,
        near: String,
    },
    /// A [`crate::Budget`] limit was exceeded.
    Budget {
        breach: BudgetBreach,
        location: Location,
        near: String,
    },
    /// Reading the input failed. Only returned by the reader entry points.
    IOError { cause: std::io::Error },
}

impl Error {
    pub(crate) fn syntax<S: Into<String>>(msg: S) -> Self {
        Error::Syntax {
            msg: msg.into(),
            location: Location::UNKNOWN,
            near: String::new(),
        }
    }

    pub(crate) fn directive<S: Into<String>>(msg: S) -> Self {
        Error::Directive {
            msg: msg.into(),
            location: Location::UNKNOWN,
            near: String::new(),
        }
    }

    pub(crate) fn indentation<S: Into<String>>(msg: S) -> Self {
        Error::Indentation {
            msg: msg.into(),
            location: Location::UNKNOWN,
            near: String::new(),
        }
    }

    pub(crate) fn duplicate_key<S: Into<String>>(key: S) -> Self {
        Error::DuplicateKey {
            key: key.into(),
            location: Location::UNKNOWN,
            near: String::new(),
        }
    }

    pub(crate) fn unknown_alias<S: Into<String>>(name: S) -> Self {
        Error::UnknownAlias {
            name: name.into(),
            location: Location::UNKNOWN,
            near: String::new(),
        }
    }

    pub(crate) fn circular_alias<S: Into<String>>(name: S) -> Self {
        Error::CircularAlias {
            name: name.into(),
            location: Location::UNKNOWN,
            near: String::new(),
        }
    }

    pub(crate) fn tag<S: Into<String>>(msg: S) -> Self {
        Error::Tag {
            msg: msg.into(),
            location: Location::UNKNOWN,
            near: String::new(),
        }
    }

    pub(crate) fn scalar<S: Into<String>>(msg: S) -> Self {
        Error::Scalar {
            msg: msg.into(),
            location: Location::UNKNOWN,
            near: String::new(),
        }
    }

    pub(crate) fn budget(breach: BudgetBreach) -> Self {
        Error::Budget {
            breach,
            location: Location::UNKNOWN,
            near: String::new(),
        }
    }

    /// Attach/override a concrete location to this error and return it.
    pub(crate) fn with_location(mut self, set_location: Location) -> Self {
        if let Some((location, _)) = self.position_mut() {
            *location = set_location;
        }
        self
    }

    /// Attach the location of character `pos` and the `near` snippet that follows it.
    pub(crate) fn at(mut self, source: &Source, pos: usize) -> Self {
        if let Some((location, near)) = self.position_mut() {
            *location = source.location(pos);
            *near = source.near(pos);
        }
        self
    }

    fn position_mut(&mut self) -> Option<(&mut Location, &mut String)> {
        match self {
            Error::Syntax { location, near, .. }
            | Error::Directive { location, near, .. }
            | Error::Indentation { location, near, .. }
            | Error::DuplicateKey { location, near, .. }
            | Error::UnknownAlias { location, near, .. }
            | Error::CircularAlias { location, near, .. }
            | Error::Tag { location, near, .. }
            | Error::Scalar { location, near, .. }
            | Error::Budget { location, near, .. } => Some((location, near)),
            Error::IOError { .. } => None,
        }
    }

    fn position(&self) -> Option<(&Location, &str)> {
        match self {
            Error::Syntax { location, near, .. }
            | Error::Directive { location, near, .. }
            | Error::Indentation { location, near, .. }
            | Error::DuplicateKey { location, near, .. }
            | Error::UnknownAlias { location, near, .. }
            | Error::CircularAlias { location, near, .. }
            | Error::Tag { location, near, .. }
            | Error::Scalar { location, near, .. }
            | Error::Budget { location, near, .. } => Some((location, near.as_str())),
            Error::IOError { .. } => None,
        }
    }

    /// If the error has a known location, return it.
    pub fn location(&self) -> Option<Location> {
        match self.position() {
            Some((location, _)) if location.is_known() => Some(*location),
            _ => None,
        }
    }

    /// Input that follows the error position, as quoted in the message.
    pub fn near(&self) -> Option<&str> {
        self.position().map(|(_, near)| near)
    }

    /// The message without the `near` suffix.
    pub fn message(&self) -> String {
        match self {
            Error::Syntax { msg, .. }
            | Error::Directive { msg, .. }
            | Error::Indentation { msg, .. }
            | Error::Tag { msg, .. }
            | Error::Scalar { msg, .. } => msg.clone(),
            Error::DuplicateKey { key, .. } => format!("duplicate key {key}"),
            Error::UnknownAlias { name, .. } => format!("unidentified alias \"{name}\""),
            Error::CircularAlias { name, .. } => {
                format!("alias \"{name}\" refers to a node that is not complete (circular reference)")
            }
            Error::Budget { breach, .. } => format!("YAML budget breached: {breach:?}"),
            Error::IOError { cause } => format!("IO error: {cause}"),
        }
    }

    /// Soft errors only say that one alternative of the grammar did not match; enclosing
    /// alternatives may still succeed. They carry no message yet. Every other error aborts the
    /// load immediately.
    pub(crate) fn is_soft(&self) -> bool {
        matches!(self, Error::Syntax { msg, .. } if msg.is_empty())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.position() {
            Some((_, near)) => write!(f, "{}, near \"{near}\"", self.message()),
            None => f.write_str(&self.message()),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IOError { cause } => Some(cause),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(cause: std::io::Error) -> Self {
        Error::IOError { cause }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_appends_near_snippet() {
        let source = Source::new("a: 1\nb: \"x\"\n");
        let err = Error::syntax("unexpected content").at(&source, 5);
        assert_eq!(err.to_string(), "unexpected content, near \"b: \\\"x\\\"\\n\"");
        let loc = err.location().unwrap();
        assert_eq!((loc.line(), loc.column()), (2, 1));
    }

    #[test]
    fn io_errors_have_no_location() {
        let err: Error = std::io::Error::other("boom").into();
        assert!(err.location().is_none());
        assert_eq!(err.to_string(), "IO error: boom");
    }
}
