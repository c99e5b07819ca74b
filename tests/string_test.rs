//! Integration tests for string cleaning.

use cleanse::{Cleaned, Cleaner, Context, Schema, SchemaError, StringCleaner};
use serde_json::{json, Value};

async fn run(cleaner: &StringCleaner, value: Value) -> Result<Cleaned<String>, String> {
    cleaner
        .clean(Some(&value), &Context::new())
        .await
        .map_err(|e| e.to_string())
}

fn text(s: &str) -> Result<Cleaned<String>, String> {
    Ok(Cleaned::Value(s.to_string()))
}

#[tokio::test]
async fn test_passes_strings() {
    let cleaner = Schema::string().build().unwrap();
    assert_eq!(run(&cleaner, json!("test")).await, text("test"));
    assert_eq!(run(&cleaner, json!("  padded  ")).await, text("  padded  "));
}

#[tokio::test]
async fn test_converts_scalars() {
    let cleaner = Schema::string().build().unwrap();
    assert_eq!(run(&cleaner, json!(123)).await, text("123"));
    assert_eq!(run(&cleaner, json!(-1.5)).await, text("-1.5"));
    assert_eq!(run(&cleaner, json!(2.0)).await, text("2"));
    assert_eq!(run(&cleaner, json!(true)).await, text("true"));
}

#[tokio::test]
async fn test_containers_need_cast() {
    let cleaner = Schema::string().build().unwrap();
    assert_eq!(run(&cleaner, json!({"a": 1})).await, Err("Invalid value.".to_string()));
    assert_eq!(run(&cleaner, json!([1, 2])).await, Err("Invalid value.".to_string()));

    let cleaner = Schema::string().cast(true).build().unwrap();
    assert_eq!(run(&cleaner, json!({"a": 1})).await, text(r#"{"a":1}"#));
    assert_eq!(run(&cleaner, json!([1, 2])).await, text("[1,2]"));
}

#[tokio::test]
async fn test_pattern() {
    let cleaner = Schema::string().pattern(r"a\wc").build().unwrap();
    assert_eq!(run(&cleaner, json!("fancy")).await, text("fancy"));
    assert_eq!(run(&cleaner, json!("fanny")).await, Err("Invalid value.".to_string()));

    // Converted values are matched too
    let cleaner = Schema::string().pattern(r"^\d{3}$").build().unwrap();
    assert_eq!(run(&cleaner, json!(123)).await, text("123"));
    assert_eq!(run(&cleaner, json!(1234)).await, Err("Invalid value.".to_string()));
}

#[test]
fn test_invalid_pattern_fails_at_build() {
    let err = Schema::string().pattern("(unclosed").build().unwrap_err();
    match err {
        SchemaError::InvalidPattern { pattern, .. } => assert_eq!(pattern, "(unclosed"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_absent_and_null() {
    let cleaner = Schema::string().build().unwrap();
    let err = cleaner.clean(None, &Context::new()).await.unwrap_err();
    assert_eq!(err.to_string(), "Value required.");
    assert_eq!(run(&cleaner, Value::Null).await, Err("Value required.".to_string()));

    let cleaner = Schema::string().required(false).build().unwrap();
    assert_eq!(cleaner.clean(None, &Context::new()).await.unwrap(), Cleaned::Undefined);

    let cleaner = Schema::string().null(true).build().unwrap();
    assert_eq!(run(&cleaner, Value::Null).await, Ok(Cleaned::Null));
}

#[tokio::test]
async fn test_blank_handling() {
    let cleaner = Schema::string().build().unwrap();
    assert_eq!(run(&cleaner, json!("")).await, Err("Value required.".to_string()));

    let cleaner = Schema::string().blank(true).build().unwrap();
    assert_eq!(run(&cleaner, json!("")).await, text(""));

    let cleaner = Schema::string().blank_as_null().build().unwrap();
    assert_eq!(run(&cleaner, json!("")).await, Ok(Cleaned::Null));
    assert_eq!(run(&cleaner, Value::Null).await, Ok(Cleaned::Null));
}

#[tokio::test]
async fn test_blank_skips_pattern() {
    let cleaner = Schema::string().blank(true).pattern(r"\w").build().unwrap();
    assert_eq!(run(&cleaner, json!("")).await, text(""));
    assert_eq!(run(&cleaner, json!("!")).await, Err("Invalid value.".to_string()));
}

#[test]
fn test_blank_as_null_requires_nullable() {
    let err = Schema::string().blank_as_null().null(false).build().unwrap_err();
    assert!(matches!(err, SchemaError::BlankNullRequiresNullable));

    assert!(Schema::string().blank_as_null().null(true).build().is_ok());
    assert!(Schema::string().blank_as_null().build().is_ok());
}

#[tokio::test]
async fn test_default_string() {
    let cleaner = Schema::string().default(json!("none")).build().unwrap();
    assert_eq!(
        cleaner.clean(None, &Context::new()).await.unwrap(),
        Cleaned::Value("none".to_string())
    );
}

#[tokio::test]
async fn test_overridden_messages() {
    let cleaner = Schema::string().pattern("^x$").build().unwrap();
    let ctx = Context::new()
        .with_message(cleanse::MessageKey::Required, "Fill me in.")
        .with_message(cleanse::MessageKey::Invalid, "Nope.");

    let err = cleaner.clean(Some(&json!("")), &ctx).await.unwrap_err();
    assert_eq!(err.to_string(), "Fill me in.");
    let err = cleaner.clean(Some(&json!("y")), &ctx).await.unwrap_err();
    assert_eq!(err.to_string(), "Nope.");
}
