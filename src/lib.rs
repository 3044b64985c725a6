//! YAML 1.2 loader.
//!
//! Text is parsed into [`Node`] trees by a backtracking recursive-descent engine that follows
//! the productions of the YAML 1.2 grammar, then a [`Schema`] (failsafe, JSON or core) turns
//! every node tree into a [`Value`].
//!
//! ```rust
//! use yaml_loader::Value;
//!
//! let value = yaml_loader::load("name: demo\nports: [80, 0x1bb]\nratio: .5\n").unwrap();
//! assert_eq!(value.get("name").and_then(Value::as_str), Some("demo"));
//! let ports: Vec<i64> = value.get("ports").and_then(Value::as_array).unwrap()
//!     .iter().filter_map(Value::as_i64).collect();
//! assert_eq!(ports, [80, 443]);
//! assert_eq!(value.get("ratio").and_then(Value::as_f64), Some(0.5));
//! ```

use std::io::Read;

use encoding_rs_io::DecodeReaderBytesBuilder;
use log::debug;

pub mod budget;
mod error;
mod location;
mod macros;
mod materialize;
mod node;
mod options;
mod parse_scalars;
mod parser;
mod schema;
mod tags;
mod value;
mod zmij_format;

#[cfg(feature = "snippets")]
mod snippet;

#[cfg(feature = "miette")]
pub mod miette;

pub use budget::{Budget, BudgetBreach, BudgetReport};
pub use error::Error;
pub use location::Location;
pub use node::{Anchor, Node, NodeTag};
pub use options::{BudgetReportCallback, Options};
pub use schema::{Schema, SchemaKind};
#[cfg(feature = "snippets")]
pub use snippet::DEFAULT_CROP_RADIUS;
pub use tags::{TAG_PREFIX, Tag};
pub use value::{Dictionary, Value};

use budget::BudgetEnforcer;
use location::Source;
use materialize::Materializer;

/// Load the first document of `input`. An empty stream loads as [`Value::Null`].
///
/// The whole stream is parsed, so an error in a later document is still reported.
///
/// ```rust
/// let value = yaml_loader::load("x: &a 1\ny: *a\n").unwrap();
/// assert_eq!(value.get("y").and_then(yaml_loader::Value::as_i64), Some(1));
/// ```
pub fn load(input: &str) -> Result<Value, Error> {
    load_with_options(input, Options::default())
}

/// Load every document of `input`, in order.
///
/// ```rust
/// let docs = yaml_loader::load_all("--- 1\n--- two\n...\n").unwrap();
/// assert_eq!(docs.len(), 2);
/// assert_eq!(docs[1].as_str(), Some("two"));
/// ```
pub fn load_all(input: &str) -> Result<Vec<Value>, Error> {
    load_all_with_options(input, Options::default())
}

/// [`load`] with explicit [`Options`].
pub fn load_with_options(input: &str, options: Options) -> Result<Value, Error> {
    let values = load_documents(input, &options, Some(1))?;
    Ok(values.into_iter().next().unwrap_or(Value::Null))
}

/// [`load_all`] with explicit [`Options`].
pub fn load_all_with_options(input: &str, options: Options) -> Result<Vec<Value>, Error> {
    load_documents(input, &options, None)
}

/// Load the first document from UTF-8 bytes. A leading byte order mark is allowed.
///
/// ```rust
/// let value = yaml_loader::load_slice(b"\xEF\xBB\xBFanswer: 42\n").unwrap();
/// assert_eq!(value.get("answer").and_then(yaml_loader::Value::as_i64), Some(42));
///
/// let err = yaml_loader::load_slice(b"a: \xFF\n").unwrap_err();
/// assert!(matches!(err, yaml_loader::Error::Syntax { .. }));
/// ```
pub fn load_slice(bytes: &[u8]) -> Result<Value, Error> {
    load(decode_utf8(bytes)?)
}

/// Load every document from UTF-8 bytes.
pub fn load_all_slice(bytes: &[u8]) -> Result<Vec<Value>, Error> {
    load_all(decode_utf8(bytes)?)
}

/// Load the first document from a reader. UTF-8, UTF-16LE and UTF-16BE input is recognized by
/// its byte order mark; input without one is read as UTF-8.
///
/// ```rust
/// let utf16: Vec<u8> = [0xFF, 0xFE].into_iter()
///     .chain("k: v\n".encode_utf16().flat_map(u16::to_le_bytes))
///     .collect();
/// let value = yaml_loader::load_reader(utf16.as_slice()).unwrap();
/// assert_eq!(value.get("k").and_then(yaml_loader::Value::as_str), Some("v"));
/// ```
pub fn load_reader<R: Read>(reader: R) -> Result<Value, Error> {
    load(&read_to_string(reader)?)
}

/// Load every document from a reader, decoded as for [`load_reader`].
pub fn load_all_reader<R: Read>(reader: R) -> Result<Vec<Value>, Error> {
    load_all(&read_to_string(reader)?)
}

/// Parse `input` into one node tree per document, without building values.
///
/// Nodes keep their tags and locations, and aliases stay shared with their anchors.
///
/// ```rust
/// use yaml_loader::{Node, NodeTag, Options, Tag};
///
/// let nodes = yaml_loader::parse_nodes("!!str 12\n", &Options::default()).unwrap();
/// assert!(matches!(nodes[0].tag(), Some(NodeTag::Specific(Tag::Str))));
/// ```
pub fn parse_nodes(input: &str, options: &Options) -> Result<Vec<Node>, Error> {
    let source = Source::new(input);
    let schema = Schema::new(options.schema);
    let mut budget = BudgetEnforcer::new(options.budget.clone().unwrap_or_else(Budget::unlimited));
    let result = parser::parse_stream(&source, &schema, &mut budget);
    options.publish_report(budget.report());
    Ok(result?.into_iter().map(|document| document.root).collect())
}

/// Parse the whole stream, then materialize at most `limit` documents.
fn load_documents(input: &str, options: &Options, limit: Option<usize>) -> Result<Vec<Value>, Error> {
    let source = Source::new(input);
    let schema = Schema::new(options.schema);
    let mut budget = BudgetEnforcer::new(options.budget.clone().unwrap_or_else(Budget::unlimited));
    let result = materialize_stream(&source, &schema, &mut budget, limit);
    options.publish_report(budget.report());
    result
}

fn materialize_stream(
    source: &Source,
    schema: &Schema,
    budget: &mut BudgetEnforcer,
    limit: Option<usize>,
) -> Result<Vec<Value>, Error> {
    let documents = parser::parse_stream(source, schema, budget)?;
    debug!("stream parsed: {} documents, schema {:?}", documents.len(), schema.kind());
    let take = limit.unwrap_or(documents.len());
    let mut materializer = Materializer::new(schema, Some(source), budget);
    documents
        .iter()
        .take(take)
        .map(|document| materializer.value(&document.root))
        .collect()
}

fn decode_utf8(bytes: &[u8]) -> Result<&str, Error> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(err) => {
            let valid = &bytes[..err.valid_up_to()];
            // The prefix is valid by construction; its characters locate the bad byte.
            let prefix = String::from_utf8_lossy(valid);
            let source = Source::new(&prefix);
            let pos = source.chars().len();
            Err(Error::syntax(format!("invalid UTF-8 at byte {}", err.valid_up_to())).at(&source, pos))
        }
    }
}

fn read_to_string<R: Read>(reader: R) -> Result<String, Error> {
    // BOM sniffing; input without a BOM passes through as UTF-8.
    let mut decoder = DecodeReaderBytesBuilder::new().encoding(None).build(reader);
    let mut text = String::new();
    decoder.read_to_string(&mut text)?;
    Ok(text)
}
