use indoc::indoc;
use yaml_loader::{Error, Value, load};

fn items(yaml: &str) -> anyhow::Result<Vec<Value>> {
    let value = load(yaml)?;
    Ok(value.as_array().map(<[Value]>::to_vec).unwrap_or_default())
}

#[test]
fn core_schema_types_plain_scalars() -> anyhow::Result<()> {
    let values = items("[1, -2, +3, 0o17, 0x1F, 1.5, -.5e1, true, False, ~, null, yes, 1.2.3]")?;
    assert_eq!(
        values,
        [
            Value::Int(1),
            Value::Int(-2),
            Value::Int(3),
            Value::Int(15),
            Value::Int(31),
            Value::Double(1.5),
            Value::Double(-5.0),
            Value::Bool(true),
            Value::Bool(false),
            Value::Null,
            Value::Null,
            Value::from("yes"),
            Value::from("1.2.3"),
        ]
    );
    Ok(())
}

#[test]
fn special_floats() -> anyhow::Result<()> {
    let values = items("[.inf, -.INF, +.Inf, .nan, .NaN]")?;
    assert_eq!(values[0], Value::Double(f64::INFINITY));
    assert_eq!(values[1], Value::Double(f64::NEG_INFINITY));
    assert_eq!(values[2], Value::Double(f64::INFINITY));
    assert!(values[3].as_f64().is_some_and(f64::is_nan));
    assert!(values[4].as_f64().is_some_and(f64::is_nan));
    Ok(())
}

#[test]
fn equal_values_from_different_spellings() -> anyhow::Result<()> {
    let values = items("[0x10, 16, +16, 0o20]")?;
    assert!(values.iter().all(|v| *v == Value::Int(16)), "{values:?}");
    Ok(())
}

#[test]
fn plain_scalar_folds_continuation_lines() -> anyhow::Result<()> {
    let yaml = indoc! {"
        a: one
          two

          three
        b: x#y
        c: b:c
    "};
    let value = load(yaml)?;
    assert_eq!(value.get("a").and_then(Value::as_str), Some("one two\nthree"));
    assert_eq!(value.get("b").and_then(Value::as_str), Some("x#y"));
    assert_eq!(value.get("c").and_then(Value::as_str), Some("b:c"));
    Ok(())
}

#[test]
fn comments_are_not_content() -> anyhow::Result<()> {
    let yaml = indoc! {"
        # leading
        a: 1 # trailing
        # between
        b: two   # spaced
    "};
    let value = load(yaml)?;
    assert_eq!(value.get("a"), Some(&Value::Int(1)));
    assert_eq!(value.get("b").and_then(Value::as_str), Some("two"));
    Ok(())
}

#[test]
fn single_quoted() -> anyhow::Result<()> {
    assert_eq!(load("'it''s'")?, Value::from("it's"));
    assert_eq!(load("'a\n  b\n\n  c'")?, Value::from("a b\nc"));
    assert_eq!(load("'  padded  '")?, Value::from("  padded  "));
    assert_eq!(load("'1'")?, Value::from("1"));
    Ok(())
}

#[test]
fn double_quoted_escapes() -> anyhow::Result<()> {
    assert_eq!(load(r#""tab\there é \x41 \U0001F600""#)?, Value::from("tab\there é A 😀"));
    assert_eq!(load(r#""\"q\" \\ \/ \0""#)?, Value::from("\"q\" \\ / \0"));
    assert_eq!(load(r#""\N\_\L\P""#)?, Value::from("\u{85}\u{a0}\u{2028}\u{2029}"));
    Ok(())
}

#[test]
fn double_quoted_line_breaks() -> anyhow::Result<()> {
    assert_eq!(load("\"a\\\n  b\"")?, Value::from("ab"));
    assert_eq!(load("\"a \\\n  b\"")?, Value::from("a b"));
    assert_eq!(load("\"a   \n  b\"")?, Value::from("a b"));
    assert_eq!(load("\"a\n\n  b\"")?, Value::from("a\nb"));
    Ok(())
}

#[test]
fn invalid_escape_is_a_scalar_error() {
    let err = load(r#""\q""#).unwrap_err();
    assert!(matches!(err, Error::Scalar { .. }), "{err}");
    let err = load(r#""\u12""#).unwrap_err();
    assert!(matches!(err, Error::Scalar { .. }), "{err}");
    let err = load(r#""\uD800""#).unwrap_err();
    assert!(matches!(err, Error::Scalar { .. }), "{err}");
}

#[test]
fn unterminated_quotes() {
    for yaml in ["'abc", "\"abc", "key: \"abc"] {
        let err = load(yaml).unwrap_err();
        assert!(matches!(err, Error::Scalar { .. }), "{yaml:?}: {err}");
    }
}

#[test]
fn quoted_scalars_stay_strings() -> anyhow::Result<()> {
    let values = items(r#"['1', "true", "", '~']"#)?;
    assert_eq!(values, [Value::from("1"), Value::from("true"), Value::from(""), Value::from("~")]);
    Ok(())
}

#[test]
fn integers_out_of_range_are_rejected() {
    let err = load("99999999999999999999").unwrap_err();
    assert!(matches!(err, Error::Tag { .. }), "{err}");
    assert_eq!(load("-9223372036854775808").ok(), Some(Value::Int(i64::MIN)));
}
