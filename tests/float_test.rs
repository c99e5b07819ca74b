//! Integration tests for float cleaning.

use cleanse::{Cleaned, Cleaner, Context, FloatCleaner, Schema};
use serde_json::{json, Value};

async fn run(cleaner: &FloatCleaner, value: Value) -> Result<Cleaned<f64>, String> {
    cleaner
        .clean(Some(&value), &Context::new())
        .await
        .map_err(|e| e.to_string())
}

#[tokio::test]
async fn test_passes_numbers() {
    let cleaner = Schema::float().build().unwrap();
    assert_eq!(run(&cleaner, json!(0)).await, Ok(Cleaned::Value(0.0)));
    assert_eq!(run(&cleaner, json!(12345)).await, Ok(Cleaned::Value(12345.0)));
    assert_eq!(run(&cleaner, json!(123.67)).await, Ok(Cleaned::Value(123.67)));
}

#[tokio::test]
async fn test_rejects_non_numbers() {
    let cleaner = Schema::float().build().unwrap();
    for value in [json!("test"), json!("1.5"), json!(true), json!({}), json!([])] {
        assert_eq!(run(&cleaner, value).await, Err("Invalid value.".to_string()));
    }
}

#[tokio::test]
async fn test_cast_parses_leading_float() {
    let cleaner = Schema::float().cast(true).build().unwrap();
    assert_eq!(run(&cleaner, json!("123.45")).await, Ok(Cleaned::Value(123.45)));
    assert_eq!(run(&cleaner, json!("1.5e2m")).await, Ok(Cleaned::Value(150.0)));
    assert_eq!(run(&cleaner, json!(".25")).await, Ok(Cleaned::Value(0.25)));
    assert_eq!(run(&cleaner, json!("1.5٣")).await, Ok(Cleaned::Value(1.5)));
    assert_eq!(run(&cleaner, json!("bummer")).await, Err("Invalid value.".to_string()));
    assert_eq!(run(&cleaner, json!("")).await, Err("Invalid value.".to_string()));
}

#[tokio::test]
async fn test_empty_string_with_null() {
    let cleaner = Schema::float().cast(true).null(true).build().unwrap();
    assert_eq!(run(&cleaner, json!("")).await, Ok(Cleaned::Null));

    let cleaner = Schema::float().cast(true).default(Value::Null).build().unwrap();
    assert_eq!(run(&cleaner, json!("")).await, Ok(Cleaned::Null));

    let cleaner = Schema::float().null(true).build().unwrap();
    assert_eq!(run(&cleaner, json!("")).await, Err("Invalid value.".to_string()));
}

#[tokio::test]
async fn test_min_max() {
    let cleaner = Schema::float().min(100.0).max(200.0).build().unwrap();
    assert_eq!(run(&cleaner, json!(99.9)).await, Err("Value too low.".to_string()));
    assert_eq!(run(&cleaner, json!(100)).await, Ok(Cleaned::Value(100.0)));
    assert_eq!(run(&cleaner, json!(200.0)).await, Ok(Cleaned::Value(200.0)));
    assert_eq!(run(&cleaner, json!(200.01)).await, Err("Value too high.".to_string()));
}

#[tokio::test]
async fn test_empty_values() {
    let cleaner = Schema::float().build().unwrap();
    assert_eq!(run(&cleaner, Value::Null).await, Err("Value required.".to_string()));

    let cleaner = Schema::float().required(false).build().unwrap();
    assert_eq!(cleaner.clean(None, &Context::new()).await.unwrap(), Cleaned::Undefined);

    let cleaner = Schema::float().null(true).build().unwrap();
    assert_eq!(run(&cleaner, Value::Null).await, Ok(Cleaned::Null));
}

#[tokio::test]
async fn test_output_is_json_number() {
    let cleaner = Schema::float().cast(true).build().unwrap();
    let cleaned = run(&cleaner, json!("2.5")).await.unwrap();
    assert_eq!(cleaned.into_json(), Some(json!(2.5)));
}
