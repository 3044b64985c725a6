//! `miette` integration.
//!
//! This module is feature-gated behind the `miette` feature.

use std::fmt;
use std::sync::Arc;

use miette::{Diagnostic, LabeledSpan, NamedSource, SourceSpan};

use crate::error::Error;
use crate::location::Location;
use crate::snippet::sanitize_terminal_snippet_preserve_len;

/// Convert a load [`Error`] into a `miette::Report`.
///
/// This function takes the YAML `source` and a display `file` name/path.
///
/// # Example
///
/// ```rust,no_run
/// let yaml = "a: !!int twelve\n";
///
/// let err = yaml_loader::load(yaml).expect_err("tag error expected");
/// let report = yaml_loader::miette::to_miette_report(&err, yaml, "config.yaml");
///
/// // `Debug` formatting uses miette's graphical reporter.
/// eprintln!("{report:?}");
/// ```
///
/// Notes:
/// - [`Error`] does not retain the input text. This helper owns a copy of `source` to build
///   a standalone `miette::Report`.
/// - If the error has no known location, the report will not include labels.
pub fn to_miette_report(err: &Error, source: &str, file: &str) -> miette::Report {
    let sanitized_source = sanitize_terminal_snippet_preserve_len(source.to_owned());
    let src = Arc::new(NamedSource::new(file, sanitized_source));
    miette::Report::new(build_diagnostic(err, src))
}

#[derive(Clone, Debug)]
struct ErrorDiagnostic {
    message: String,
    code: &'static str,
    src: Arc<NamedSource<String>>,
    labels: Vec<LabeledSpan>,
}

impl fmt::Display for ErrorDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ErrorDiagnostic {}

impl Diagnostic for ErrorDiagnostic {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.code))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&*self.src)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        if self.labels.is_empty() {
            None
        } else {
            Some(Box::new(self.labels.clone().into_iter()))
        }
    }
}

fn code(err: &Error) -> &'static str {
    match err {
        Error::Syntax { .. } => "yaml::syntax",
        Error::Directive { .. } => "yaml::directive",
        Error::Indentation { .. } => "yaml::indentation",
        Error::DuplicateKey { .. } => "yaml::duplicate_key",
        Error::UnknownAlias { .. } => "yaml::unknown_alias",
        Error::CircularAlias { .. } => "yaml::circular_alias",
        Error::Tag { .. } => "yaml::tag",
        Error::Scalar { .. } => "yaml::scalar",
        Error::Budget { .. } => "yaml::budget",
        Error::IOError { .. } => "yaml::io",
    }
}

fn build_diagnostic(err: &Error, src: Arc<NamedSource<String>>) -> ErrorDiagnostic {
    let message = err.message();
    let labels = err
        .location()
        .and_then(|location| to_source_span(&src, &location))
        .map(|span| vec![LabeledSpan::new_primary_with_span(Some(message.clone()), span)])
        .unwrap_or_default();
    ErrorDiagnostic {
        message,
        code: code(err),
        src,
        labels,
    }
}

/// The error location points at a character; miette wants a byte range into the source.
fn to_source_span(src: &NamedSource<String>, location: &Location) -> Option<SourceSpan> {
    if *location == Location::UNKNOWN {
        return None;
    }
    let text = src.inner();
    let char_off = location.offset() as usize;
    let (byte_off, ch) = match text.char_indices().nth(char_off) {
        Some(found) => found,
        // At the end of the input: an empty span after the last byte.
        None if text.chars().count() == char_off => return Some(SourceSpan::new(text.len().into(), 0)),
        None => return None,
    };
    Some(SourceSpan::new(byte_off.into(), ch.len_utf8()))
}

#[cfg(all(test, feature = "miette"))]
mod tests {
    use super::*;

    fn labels_of(yaml: &str) -> Vec<LabeledSpan> {
        let err = crate::load(yaml).unwrap_err();
        let src = Arc::new(NamedSource::new("input.yaml", yaml.to_owned()));
        build_diagnostic(&err, src).labels
    }

    #[test]
    fn alias_error_has_primary_label() {
        let yaml = "a: 1\nb: *missing\n";
        let labels = labels_of(yaml);
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].inner().offset(), yaml.find('*').unwrap());
        assert_eq!(labels[0].inner().len(), 1);
    }

    #[test]
    fn non_ascii_prefix_char_offsets_convert_to_byte_offsets() {
        let yaml = "αβγ: *nope\n";
        let labels = labels_of(yaml);
        assert_eq!(labels[0].inner().offset(), yaml.find('*').unwrap());
    }

    #[test]
    fn report_carries_code() {
        let yaml = "a: 1\na: 2\n";
        let err = crate::load(yaml).unwrap_err();
        let report = to_miette_report(&err, yaml, "input.yaml");
        let code = report.code().map(|c| c.to_string());
        assert_eq!(code.as_deref(), Some("yaml::duplicate_key"));
    }

    #[test]
    fn io_error_has_no_labels() {
        let err: Error = std::io::Error::other("gone").into();
        let src = Arc::new(NamedSource::new("input.yaml", String::new()));
        assert!(build_diagnostic(&err, src).labels.is_empty());
    }
}
