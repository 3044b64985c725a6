use yaml_loader::{Error, load};

#[test]
fn display_quotes_the_input_near_the_error() {
    let err = load("a: 1\nb: *nope\nc: 3\n").unwrap_err();
    assert_eq!(err.to_string(), "unidentified alias \"nope\", near \"*nope\\nc: 3\\n\"");
    assert_eq!(err.near(), Some("*nope\\nc: 3\\n"));
}

#[test]
fn near_is_bounded() {
    let yaml = format!("k: *{}", "x".repeat(200));
    let err = load(&yaml).unwrap_err();
    assert_eq!(err.near().map(|near| near.chars().count()), Some(50));
}

#[test]
fn syntax_error_names_what_was_expected() {
    let err = load("[1, 2").unwrap_err();
    assert!(matches!(err, Error::Syntax { .. }), "{err}");
    let message = err.message();
    assert!(message.starts_with("expected "), "{message}");
    assert!(message.ends_with("found end of input"), "{message}");
}

#[test]
fn syntax_error_location_is_one_based() {
    let err = load("a: 1\nb: [x\nc: 2\n").unwrap_err();
    let location = err.location().expect("syntax errors carry a location");
    assert!(location.line() >= 2, "{location:?}");
    assert!(location.column() >= 1);
}

#[test]
fn duplicate_key_message_names_the_key() {
    let err = load("name: a\nname: b\n").unwrap_err();
    match &err {
        Error::DuplicateKey { key, location, .. } => {
            assert!(key.contains("name"), "{key}");
            assert_eq!((location.line(), location.column()), (2, 1));
        }
        other => panic!("expected a duplicate key, got {other}"),
    }
    assert!(err.to_string().starts_with("duplicate key "), "{err}");
}

#[test]
fn error_is_a_std_error() {
    fn parse(yaml: &str) -> anyhow::Result<()> {
        load(yaml)?;
        Ok(())
    }
    let err = parse("x: *missing").unwrap_err();
    assert!(err.downcast_ref::<Error>().is_some());
}

#[test]
fn first_error_wins_across_documents() {
    let err = yaml_loader::load_all("--- *a\n--- !!int x\n").unwrap_err();
    assert!(matches!(err, Error::UnknownAlias { .. }), "{err}");
}

#[cfg(feature = "snippets")]
#[test]
fn render_draws_a_snippet() {
    let yaml = "first: 1\nsecond: *nope\nthird: 3\n";
    let err = load(yaml).unwrap_err();
    let rendered = err.render(yaml, "config.yaml");
    assert!(rendered.contains("config.yaml"), "{rendered}");
    assert!(rendered.contains("second: *nope"), "{rendered}");
    assert!(rendered.contains("line 2 column 9"), "{rendered}");

    let plain = err.render_with_options(yaml, "config.yaml", &yaml_loader::options! { crop_radius: 0 });
    assert_eq!(plain, err.to_string());
}
