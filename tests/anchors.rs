use std::rc::Rc;

use indoc::indoc;
use yaml_loader::{Error, Node, Options, Value, load, load_all, parse_nodes};

#[test]
fn alias_repeats_the_anchored_value() -> anyhow::Result<()> {
    let value = load("x: &a 1\ny: *a")?;
    assert_eq!(value.get("x"), Some(&Value::Int(1)));
    assert_eq!(value.get("y"), Some(&Value::Int(1)));
    Ok(())
}

#[test]
fn aliased_collections_are_copied_whole() -> anyhow::Result<()> {
    let yaml = indoc! {"
        seq:
          - &A [1, 2, 3]
          - *A
          - *A
        base: &base {host: db, port: 5432}
        copy: *base
    "};
    let value = load(yaml)?;
    let seq = value.get("seq").and_then(Value::as_array).expect("sequence");
    assert_eq!(seq.len(), 3);
    assert!(seq.iter().all(|item| item == &seq[0]));
    assert_eq!(value.get("copy"), value.get("base"));
    Ok(())
}

#[test]
fn anchor_on_tagged_node() -> anyhow::Result<()> {
    let value = load("a: &n !!str 12\nb: *n\nc: !!str &m 7\nd: *m\n")?;
    assert_eq!(value.get("b").and_then(Value::as_str), Some("12"));
    assert_eq!(value.get("d").and_then(Value::as_str), Some("7"));
    Ok(())
}

#[test]
fn redefined_anchor_shadows_the_earlier_one() -> anyhow::Result<()> {
    let value = load("a: &x 1\nb: *x\nc: &x 2\nd: *x\n")?;
    assert_eq!(value.get("b"), Some(&Value::Int(1)));
    assert_eq!(value.get("d"), Some(&Value::Int(2)));
    Ok(())
}

#[test]
fn alias_as_key() -> anyhow::Result<()> {
    let value = load("a: &v 1\n*v : one\n")?;
    let map = value.as_dictionary().expect("mapping");
    assert_eq!(map.get(&Value::Int(1)), Some(&Value::from("one")));
    Ok(())
}

#[test]
fn alias_key_duplicates_its_anchor() {
    let err = load("&k a: 1\n*k : 2\n").unwrap_err();
    assert!(matches!(err, Error::DuplicateKey { .. }), "{err}");
}

#[test]
fn unknown_alias() {
    let err = load("x: *a").unwrap_err();
    match err {
        Error::UnknownAlias { ref name, location, .. } => {
            assert_eq!(name, "a");
            assert_eq!((location.line(), location.column()), (1, 4));
        }
        other => panic!("expected unknown alias, got {other}"),
    }
}

#[test]
fn alias_before_its_anchor_is_unknown() {
    let err = load("x: *a\ny: &a 1\n").unwrap_err();
    assert!(matches!(err, Error::UnknownAlias { .. }), "{err}");
}

#[test]
fn anchors_are_scoped_to_their_document() {
    let err = load_all("x: &a 1\ny: *a\n---\nx: *a").unwrap_err();
    assert!(matches!(err, Error::UnknownAlias { .. }), "{err}");
    assert_eq!(err.location().map(|l| l.line()), Some(4));
}

#[test]
fn self_referencing_node_is_circular() {
    for yaml in ["&a [*a]", "&m {k: *m}"] {
        let err = load(yaml).unwrap_err();
        assert!(matches!(err, Error::CircularAlias { .. }), "{yaml:?}: {err}");
    }
}

#[test]
fn self_referencing_anchor_is_released() -> anyhow::Result<()> {
    let nodes = parse_nodes("&a [*a]\n", &Options::default())?;
    let Node::Sequence { items, .. } = &nodes[0] else { panic!("sequence expected") };
    let Node::Alias { anchor, .. } = &items[0] else { panic!("alias expected") };
    assert!(anchor.node().is_none());
    let anchor = Rc::downgrade(anchor);
    drop(nodes);
    assert!(anchor.upgrade().is_none());
    Ok(())
}

#[test]
fn anchor_on_first_block_key() -> anyhow::Result<()> {
    let value = load("&k a: 1\nb: *k\n")?;
    assert_eq!(value.get("b"), Some(&Value::from("a")));

    let value = load(indoc! {"
        x:
          &a y: 1
          z: 2
        w: *a
    "})?;
    assert_eq!(value.get("w"), Some(&Value::from("y")));
    let inner = value.get("x").and_then(Value::as_dictionary).expect("mapping");
    assert_eq!(inner.len(), 2);
    Ok(())
}

#[test]
fn anchor_on_own_line_still_names_the_mapping() -> anyhow::Result<()> {
    let value = load("a: &m\n  k: v\nb: *m\n")?;
    assert_eq!(value.get("a"), value.get("b"));
    assert!(value.get("b").and_then(Value::as_dictionary).is_some());
    Ok(())
}

#[test]
fn anchors_dropped_with_abandoned_alternatives() -> anyhow::Result<()> {
    // `&a b` is first tried as an implicit mapping key, which fails.
    let value = load("- &a b\n- *a\n")?;
    assert_eq!(value, Value::Array(vec![Value::from("b"), Value::from("b")]));
    Ok(())
}
