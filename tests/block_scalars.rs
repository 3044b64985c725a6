use indoc::indoc;
use yaml_loader::{Error, Value, load, load_all};

fn text(yaml: &str) -> String {
    match load(yaml) {
        Ok(Value::String(s)) => s,
        other => panic!("{yaml:?}: expected a string, got {other:?}"),
    }
}

#[test]
fn chomping_indicators() {
    assert_eq!(text("|-\n x\n\n"), "x");
    assert_eq!(text("|\n x\n\n"), "x\n");
    assert_eq!(text("|+\n x\n\n"), "x\n\n");
    assert_eq!(text(">-\n x\n y\n"), "x y");
    assert_eq!(text("|\n x"), "x");
}

#[test]
fn folding() {
    assert_eq!(text(">\n folded\n line\n"), "folded line\n");
    assert_eq!(text(">\n\n folded\n"), "\nfolded\n");
    assert_eq!(text(">\n a\n\n b\n"), "a\nb\n");
}

#[test]
fn more_indented_lines_are_not_folded() {
    let yaml = indoc! {"
        >
         a
         b

         c
           d
         e
    "};
    assert_eq!(text(yaml), "a b\nc\n  d\ne\n");
}

#[test]
fn literal_keeps_inner_indentation() {
    let yaml = indoc! {"
        script: |
          if x:
            run()
          done
        next: 1
    "};
    let value = load(yaml).unwrap();
    assert_eq!(value.get("script").and_then(Value::as_str), Some("if x:\n  run()\ndone\n"));
    assert_eq!(value.get("next"), Some(&Value::Int(1)));
}

#[test]
fn explicit_indentation_indicator() {
    let value = load("a: |2\n    x\n").unwrap();
    assert_eq!(value.get("a").and_then(Value::as_str), Some("  x\n"));
    let value = load("a: >-2\n   lead\n  x\n").unwrap();
    assert_eq!(value.get("a").and_then(Value::as_str), Some(" lead\nx"));
}

#[test]
fn empty_block_scalar_before_sibling_key() {
    let value = load("a: |\nb: 1\n").unwrap();
    assert_eq!(value.get("a").and_then(Value::as_str), Some(""));
    assert_eq!(value.get("b"), Some(&Value::Int(1)));
}

#[test]
fn trailing_comments_after_content() {
    let yaml = indoc! {"
        a: |
          text
        # comment
        b: 2
    "};
    let value = load(yaml).unwrap();
    assert_eq!(value.get("a").and_then(Value::as_str), Some("text\n"));
    assert_eq!(value.get("b"), Some(&Value::Int(2)));
}

#[test]
fn document_marker_ends_top_level_block_scalar() {
    let docs = load_all("--- |\na\n--- b\n").unwrap();
    assert_eq!(docs, [Value::from("a\n"), Value::from("b")]);
}

#[test]
fn header_errors() {
    for yaml in ["|x\n a\n", "|0\n a\n", "|--\n a\n"] {
        let err = load(yaml).unwrap_err();
        assert!(matches!(err, Error::Scalar { .. }), "{yaml:?}: {err}");
    }
}

#[test]
fn indentation_errors() {
    let err = load("a: |3\n  x\n").unwrap_err();
    assert!(matches!(err, Error::Indentation { .. }), "{err}");
    assert_eq!(err.location().map(|l| l.line()), Some(2));

    let err = load("a: |\n    \n  x\n").unwrap_err();
    assert!(matches!(err, Error::Indentation { .. }), "{err}");
}
