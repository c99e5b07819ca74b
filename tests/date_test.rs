//! Integration tests for date cleaning.

use chrono::{TimeZone, Utc};
use cleanse::{Cleaned, Cleaner, CleanerExt, Context, DateCleaner, DateFormat, DateOutput, Schema, SchemaError};
use serde_json::{json, Value};

const ISO_VALUE: &str = "2018-11-14T09:28:19Z";
const ISO_TZ_VALUE: &str = "2018-11-14T16:28:19+07:00";
const DATE_LIKE_VALUE: &str = "Wed, 14 Nov 2018 09:28:19 GMT";
const RESULT_ISO: &str = "2018-11-14T09:28:19.000Z";

async fn run(cleaner: &DateCleaner, value: Value) -> Result<Cleaned<DateOutput>, String> {
    cleaner
        .clean(Some(&value), &Context::new())
        .await
        .map_err(|e| e.to_string())
}

fn expected_native() -> Result<Cleaned<DateOutput>, String> {
    let dt = Utc.with_ymd_and_hms(2018, 11, 14, 9, 28, 19).unwrap();
    Ok(Cleaned::Value(DateOutput::DateTime(dt)))
}

fn string_output(s: &str) -> Result<Cleaned<DateOutput>, String> {
    Ok(Cleaned::Value(DateOutput::String(s.to_string())))
}

#[tokio::test]
async fn test_native_output() {
    let cleaner = Schema::date().build().unwrap();
    for value in [ISO_VALUE, ISO_TZ_VALUE, DATE_LIKE_VALUE] {
        assert_eq!(run(&cleaner, json!(value)).await, expected_native(), "parsing {value}");
    }
}

#[tokio::test]
async fn test_iso_output() {
    let cleaner = Schema::date().format(DateFormat::Iso).build().unwrap();
    for value in [ISO_VALUE, ISO_TZ_VALUE, DATE_LIKE_VALUE] {
        assert_eq!(run(&cleaner, json!(value)).await, string_output(RESULT_ISO));
    }
}

#[tokio::test]
async fn test_iso_output_is_a_fixed_point() {
    let cleaner = Schema::date().format(DateFormat::Iso).build().unwrap();
    let once = run(&cleaner, json!(ISO_VALUE)).await.unwrap().into_json().unwrap();
    let twice = run(&cleaner, once.clone()).await.unwrap().into_json().unwrap();
    assert_eq!(once, json!(RESULT_ISO));
    assert_eq!(twice, once);
}

#[tokio::test]
async fn test_raw_output_keeps_input() {
    let cleaner = Schema::date().format(DateFormat::Raw).build().unwrap();
    for value in [ISO_VALUE, ISO_TZ_VALUE, DATE_LIKE_VALUE] {
        assert_eq!(run(&cleaner, json!(value)).await, string_output(value));
    }
}

#[tokio::test]
async fn test_native_projects_to_iso_json() {
    let cleaner = Schema::date().build().unwrap();
    let cleaned = run(&cleaner, json!(ISO_TZ_VALUE)).await.unwrap();
    assert_eq!(cleaned.into_json(), Some(json!(RESULT_ISO)));
}

#[tokio::test]
async fn test_plain_date_is_midnight_utc() {
    let cleaner = Schema::date().format(DateFormat::Iso).build().unwrap();
    assert_eq!(
        run(&cleaner, json!("2020-02-29")).await,
        string_output("2020-02-29T00:00:00.000Z")
    );
}

#[tokio::test]
async fn test_rejects_non_dates() {
    let cleaner = Schema::date().build().unwrap();
    for value in [json!("bummer"), json!("2018-02-30"), json!(12345), json!(true)] {
        assert_eq!(run(&cleaner, value).await, Err("Invalid value.".to_string()));
    }
}

#[tokio::test]
async fn test_empty_values() {
    let cleaner = Schema::date().build().unwrap();
    let err = cleaner.clean(None, &Context::new()).await.unwrap_err();
    assert_eq!(err.to_string(), "Value required.");
    assert_eq!(run(&cleaner, Value::Null).await, Err("Value required.".to_string()));
    assert_eq!(run(&cleaner, json!("")).await, Err("Value required.".to_string()));

    let cleaner = Schema::date().required(false).build().unwrap();
    assert_eq!(cleaner.clean(None, &Context::new()).await.unwrap(), Cleaned::Undefined);

    let cleaner = Schema::date().null(true).build().unwrap();
    assert_eq!(run(&cleaner, Value::Null).await, Ok(Cleaned::Null));
}

#[tokio::test]
async fn test_blank_handling() {
    let cleaner = Schema::date().blank(true).format(DateFormat::Raw).build().unwrap();
    assert_eq!(run(&cleaner, json!("")).await, string_output(""));

    let cleaner = Schema::date().blank_as_null().build().unwrap();
    assert_eq!(run(&cleaner, json!("")).await, Ok(Cleaned::Null));
}

#[test]
fn test_invalid_blank_combinations() {
    let err = Schema::date().blank(true).build().unwrap_err();
    assert!(matches!(err, SchemaError::BlankDateRequiresRawFormat));

    let err = Schema::date().blank(true).format(DateFormat::Iso).build().unwrap_err();
    assert!(matches!(err, SchemaError::BlankDateRequiresRawFormat));

    let err = Schema::date().blank_as_null().null(false).build().unwrap_err();
    assert!(matches!(err, SchemaError::BlankNullRequiresNullable));

    assert!(Schema::date().blank_as_null().null(true).build().is_ok());
}

#[tokio::test]
async fn test_chained_step_receives_date() {
    let cleaner = Schema::date()
        .build()
        .unwrap()
        .map(|date| json!({ "date": date.as_datetime().map(|dt| dt.timestamp()) }));
    let cleaned = cleaner.clean(Some(&json!(ISO_VALUE)), &Context::new()).await.unwrap();
    assert_eq!(cleaned, Cleaned::Value(json!({"date": 1542187699})));
}
