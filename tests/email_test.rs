//! Integration tests for e-mail and UUID cleaning.

use cleanse::{Cleaned, Cleaner, CleanerExt, Context, EmailCleaner, Schema, SchemaError, UuidCleaner};
use serde_json::{json, Value};

const EMAIL: &str = "foo@bar.com";
const UUID: &str = "282f570c-d19c-4b85-870b-49129409ea92";

async fn run_email(cleaner: &EmailCleaner, value: Value) -> Result<Cleaned<String>, String> {
    cleaner
        .clean(Some(&value), &Context::new())
        .await
        .map_err(|e| e.to_string())
}

async fn run_uuid(cleaner: &UuidCleaner, value: Value) -> Result<Cleaned<String>, String> {
    cleaner
        .clean(Some(&value), &Context::new())
        .await
        .map_err(|e| e.to_string())
}

#[tokio::test]
async fn test_passes_email() {
    let cleaner = Schema::email().build().unwrap();
    assert_eq!(run_email(&cleaner, json!(EMAIL)).await, Ok(Cleaned::Value(EMAIL.to_string())));
}

#[tokio::test]
async fn test_rejects_non_email() {
    let cleaner = Schema::email().build().unwrap();
    let padded_left = format!(" {}", EMAIL);
    let padded_right = format!("{} ", EMAIL);
    for value in ["boom", "foobar.com", "foo@bar", padded_left.as_str(), padded_right.as_str()] {
        assert_eq!(
            run_email(&cleaner, json!(value)).await,
            Err("Invalid e-mail address.".to_string()),
            "checking {value:?}"
        );
    }
}

#[tokio::test]
async fn test_email_empty_values() {
    let cleaner = Schema::email().build().unwrap();
    let err = cleaner.clean(None, &Context::new()).await.unwrap_err();
    assert_eq!(err.to_string(), "Value required.");
    assert_eq!(run_email(&cleaner, Value::Null).await, Err("Value required.".to_string()));
    assert_eq!(run_email(&cleaner, json!("")).await, Err("Value required.".to_string()));

    let cleaner = Schema::email().required(false).build().unwrap();
    assert_eq!(cleaner.clean(None, &Context::new()).await.unwrap(), Cleaned::Undefined);

    let cleaner = Schema::email().null(true).build().unwrap();
    assert_eq!(run_email(&cleaner, Value::Null).await, Ok(Cleaned::Null));

    let cleaner = Schema::email().blank(true).build().unwrap();
    assert_eq!(run_email(&cleaner, json!("")).await, Ok(Cleaned::Value(String::new())));

    let cleaner = Schema::email().blank_as_null().build().unwrap();
    assert_eq!(run_email(&cleaner, json!("")).await, Ok(Cleaned::Null));
}

#[test]
fn test_email_blank_as_null_requires_nullable() {
    let err = Schema::email().blank_as_null().null(false).build().unwrap_err();
    assert!(matches!(err, SchemaError::BlankNullRequiresNullable));
    assert!(Schema::email().blank_as_null().null(true).build().is_ok());
}

#[tokio::test]
async fn test_email_pattern_runs_before_address_check() {
    let cleaner = Schema::email().pattern(r"@corp\.example$").build().unwrap();
    assert_eq!(
        run_email(&cleaner, json!("ann@corp.example")).await,
        Ok(Cleaned::Value("ann@corp.example".to_string()))
    );
    assert_eq!(
        run_email(&cleaner, json!(EMAIL)).await,
        Err("Invalid value.".to_string())
    );
}

#[tokio::test]
async fn test_email_chained_step() {
    let cleaner = Schema::email()
        .build()
        .unwrap()
        .map(|email| json!({ "email": email }));
    let cleaned = cleaner.clean(Some(&json!(EMAIL)), &Context::new()).await.unwrap();
    assert_eq!(cleaned, Cleaned::Value(json!({"email": EMAIL})));
}

#[tokio::test]
async fn test_passes_uuid() {
    let cleaner = Schema::uuid().build().unwrap();
    assert_eq!(run_uuid(&cleaner, json!(UUID)).await, Ok(Cleaned::Value(UUID.to_string())));

    // Only the lowercase form is accepted
    let upper = UUID.to_uppercase();
    assert_eq!(run_uuid(&cleaner, json!(upper)).await, Err("Invalid value.".to_string()));
}

#[tokio::test]
async fn test_rejects_invalid_uuid() {
    let cleaner = Schema::uuid().build().unwrap();
    let with_debris = format!("{}1", UUID);
    for value in [
        "xxxxxxxx-d19c-4b85-870b-49129409ea92",
        with_debris.as_str(),
        "282f570cd19c4b85870b49129409ea92",
        "٠٠٠٠٠٠٠٠-d19c-4b85-870b-49129409ea92",
        "x",
    ] {
        assert_eq!(run_uuid(&cleaner, json!(value)).await, Err("Invalid value.".to_string()));
    }
}

#[tokio::test]
async fn test_uuid_empty_values() {
    let cleaner = Schema::uuid().build().unwrap();
    assert_eq!(run_uuid(&cleaner, json!("")).await, Err("Value required.".to_string()));

    let cleaner = Schema::uuid().blank(true).build().unwrap();
    assert_eq!(run_uuid(&cleaner, json!("")).await, Ok(Cleaned::Value(String::new())));

    let cleaner = Schema::uuid().blank_as_null().build().unwrap();
    assert_eq!(run_uuid(&cleaner, json!("")).await, Ok(Cleaned::Null));
}
