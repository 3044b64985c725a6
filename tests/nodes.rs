use yaml_loader::{Node, NodeTag, Options, Schema, SchemaKind, Tag, Value, parse_nodes};

fn single(yaml: &str) -> Node {
    let mut nodes = parse_nodes(yaml, &Options::default()).expect("parses");
    assert_eq!(nodes.len(), 1);
    nodes.remove(0)
}

#[test]
fn one_tree_per_document() -> anyhow::Result<()> {
    assert!(parse_nodes("", &Options::default())?.is_empty());
    assert_eq!(parse_nodes("--- a\n--- b\n--- c\n", &Options::default())?.len(), 3);
    Ok(())
}

#[test]
fn nodes_keep_tags_and_locations() {
    let node = single("a: 1\nb: !!str [x]\n");
    let Node::Mapping { entries, tag, .. } = &node else { panic!("mapping expected") };
    assert_eq!(tag, &NodeTag::Unspecified);
    let (key, value) = &entries[1];
    assert!(matches!(key, Node::Scalar { content, .. } if content == "b"));
    assert_eq!(value.tag(), Some(&NodeTag::Specific(Tag::Str)));
    // Located at the content, after its properties.
    let location = value.location();
    assert_eq!((location.line(), location.column()), (2, 10));
    let location = entries[0].1.location();
    assert_eq!((location.line(), location.column(), location.offset()), (1, 4, 3));
}

#[test]
fn values_depend_on_the_schema() -> anyhow::Result<()> {
    let node = single("[1, true, x]");
    assert_eq!(
        Value::from_node(&node, &Schema::core())?,
        Value::Array(vec![Value::Int(1), Value::Bool(true), Value::from("x")])
    );
    assert_eq!(
        Value::from_node(&node, &Schema::failsafe())?,
        Value::Array(vec![Value::from("1"), Value::from("true"), Value::from("x")])
    );
    assert!(Value::from_node(&node, &Schema::json()).is_err());
    Ok(())
}

#[test]
fn equivalence_follows_canonical_forms() -> anyhow::Result<()> {
    let hex = single("0x10");
    let dec = single("16");
    assert!(hex.equivalent(&dec, &Schema::core())?);
    assert!(!hex.equivalent(&dec, &Schema::failsafe())?);

    let a = single("{a: 1, b: [2]}");
    let b = single("{b: [0x2], a: 1}");
    assert!(a.equivalent(&b, &Schema::core())?);
    Ok(())
}

#[test]
fn aliases_point_at_their_anchor() {
    let node = single("- &first one\n- *first\n");
    let Node::Sequence { items, .. } = &node else { panic!("sequence expected") };
    let Node::Alias { anchor, .. } = &items[1] else { panic!("alias expected") };
    assert_eq!(anchor.name(), "first");
    assert_eq!(anchor.location().column(), 3);
    assert!(matches!(items[1].target(), Some(Node::Scalar { content, .. }) if content == "one"));
}

#[test]
fn schema_tag_table() {
    let failsafe = Schema::new(SchemaKind::Failsafe);
    assert_eq!(failsafe.tag("tag:yaml.org,2002:str"), Some(Tag::Str));
    assert_eq!(failsafe.tag("tag:yaml.org,2002:int"), None);
    assert_eq!(Schema::core().tag("tag:yaml.org,2002:int"), Some(Tag::Int));
    let core = Schema::core();
    let handles: Vec<_> = core.handles().collect();
    assert!(handles.contains(&("!!", "tag:yaml.org,2002:")));
}
