use std::io::{self, Read};

use yaml_loader::{Error, Value, load_all_reader, load_all_slice, load_reader, load_slice};

fn utf16(text: &str, big_endian: bool) -> Vec<u8> {
    let bom: [u8; 2] = if big_endian { [0xFE, 0xFF] } else { [0xFF, 0xFE] };
    bom.into_iter()
        .chain(text.encode_utf16().flat_map(|unit| {
            if big_endian { unit.to_be_bytes() } else { unit.to_le_bytes() }
        }))
        .collect()
}

#[test]
fn slices_with_and_without_bom() -> anyhow::Result<()> {
    assert_eq!(load_slice(b"k: v\n")?.get("k").and_then(Value::as_str), Some("v"));
    assert_eq!(load_slice(b"\xEF\xBB\xBFk: v\n")?.get("k").and_then(Value::as_str), Some("v"));
    assert_eq!(load_all_slice(b"--- 1\n--- 2\n")?, [Value::Int(1), Value::Int(2)]);
    Ok(())
}

#[test]
fn invalid_utf8_is_located() {
    let err = load_slice(b"a: 1\nb: \xFF\n").unwrap_err();
    assert!(matches!(err, Error::Syntax { .. }), "{err}");
    assert!(err.message().contains("byte 8"), "{err}");
    let location = err.location().expect("located");
    assert_eq!((location.line(), location.column()), (2, 4));
}

#[test]
fn readers_detect_utf16() -> anyhow::Result<()> {
    let text = "name: Zoë\nlist: [1, 2]\n";
    for big_endian in [false, true] {
        let value = load_reader(utf16(text, big_endian).as_slice())?;
        assert_eq!(value.get("name").and_then(Value::as_str), Some("Zoë"));
    }
    Ok(())
}

#[test]
fn readers_default_to_utf8() -> anyhow::Result<()> {
    let docs = load_all_reader("--- a\n--- b\n".as_bytes())?;
    assert_eq!(docs, [Value::from("a"), Value::from("b")]);
    Ok(())
}

struct FailingReader;

impl Read for FailingReader {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::other("disk on fire"))
    }
}

#[test]
fn read_failures_are_io_errors() {
    let err = load_reader(FailingReader).unwrap_err();
    assert!(matches!(err, Error::IOError { .. }), "{err}");
    assert!(err.location().is_none());
    assert!(err.to_string().contains("disk on fire"), "{err}");
}
