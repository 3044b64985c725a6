use yaml_loader::{Error, SchemaKind, Value, load, load_with_options, options};

fn load_as(schema: SchemaKind, yaml: &str) -> Result<Value, Error> {
    load_with_options(yaml, options! { schema: schema })
}

#[test]
fn failsafe_reads_every_scalar_as_string() -> anyhow::Result<()> {
    let value = load_as(SchemaKind::Failsafe, "a: 1\nb: [true, ~]\nc:\n")?;
    assert_eq!(value.get("a").and_then(Value::as_str), Some("1"));
    assert_eq!(
        value.get("b"),
        Some(&Value::Array(vec![Value::from("true"), Value::from("~")]))
    );
    assert_eq!(value.get("c").and_then(Value::as_str), Some(""));
    Ok(())
}

#[test]
fn failsafe_knows_only_collection_and_string_tags() {
    let err = load_as(SchemaKind::Failsafe, "!!int 1").unwrap_err();
    assert!(matches!(err, Error::Tag { .. }), "{err}");
    assert!(load_as(SchemaKind::Failsafe, "!!str 1").is_ok());
}

#[test]
fn json_schema_is_strict() -> anyhow::Result<()> {
    let value = load_as(SchemaKind::Json, "[1, -0, 2.5, 1e3, true, null, \"x\", ]")?;
    assert_eq!(
        value,
        Value::Array(vec![
            Value::Int(1),
            Value::Int(0),
            Value::Double(2.5),
            Value::Double(1000.0),
            Value::Bool(true),
            Value::Null,
            Value::from("x"),
        ])
    );
    for yaml in ["yes", "True", "0x10", "~", "plain text", ".inf"] {
        let err = load_as(SchemaKind::Json, yaml).unwrap_err();
        assert!(matches!(err, Error::Tag { .. }), "{yaml:?}: {err}");
    }
    Ok(())
}

#[test]
fn json_schema_empty_value_is_null() -> anyhow::Result<()> {
    let value = load_as(SchemaKind::Json, "{\"a\": }")?;
    assert_eq!(value.get("a"), Some(&Value::Null));
    Ok(())
}

#[test]
fn explicit_tags_in_core_schema() -> anyhow::Result<()> {
    assert_eq!(load("!!str 12")?, Value::from("12"));
    assert_eq!(load("!!float 1")?, Value::Double(1.0));
    assert_eq!(load("!!int 0x10")?, Value::Int(16));
    assert_eq!(load("!!null ''")?, Value::Null);
    assert_eq!(load("!!bool 'true'")?, Value::Bool(true));
    assert_eq!(load("! 12")?, Value::from("12"));
    assert_eq!(load("!<tag:yaml.org,2002:str> 12")?, Value::from("12"));
    assert_eq!(load("!!seq [1]")?, Value::Array(vec![Value::Int(1)]));
    Ok(())
}

#[test]
fn content_must_match_explicit_tag() {
    for yaml in ["!!int abc", "!!bool yes", "!!null x", "!!float one", "!!map [1]", "!!seq {a: 1}", "!!int [1]"] {
        let err = load(yaml).unwrap_err();
        assert!(matches!(err, Error::Tag { .. }), "{yaml:?}: {err}");
    }
}

#[test]
fn local_tags_are_unknown() {
    let err = load("!custom value").unwrap_err();
    assert!(matches!(err, Error::Tag { .. }), "{err}");
}

#[test]
fn schema_kind_deserializes_from_config() -> anyhow::Result<()> {
    let kind: SchemaKind = serde_json::from_str("\"Json\"")?;
    assert_eq!(kind, SchemaKind::Json);
    assert_eq!(SchemaKind::default(), SchemaKind::Core);
    Ok(())
}
