#![allow(clippy::float_cmp)]

use super::*;

#[test]
fn missing_or_blank_config_uses_defaults() {
    assert_eq!(parse_config(None).unwrap(), Config::default());
    assert_eq!(parse_config(Some("   ")).unwrap(), Config::default());
}

#[test]
fn config_fields_override_defaults() {
    let config = parse_config(Some(r#"{ "cdn": "https://cdn.test/", "skip_limit_ms": 100 }"#)).unwrap();
    assert_eq!(config.cdn, "https://cdn.test/");
    assert_eq!(config.skip_limit_ms, 100.0);
    assert_eq!(config.min_timer_ms, Config::default().min_timer_ms);
}

#[test]
fn malformed_config_is_an_error() {
    assert!(matches!(parse_config(Some("{")), Err(framekit::Error::Config(_))));
}

#[test]
fn payloads_parse_as_json() {
    assert_eq!(parse_payload("").unwrap(), Value::Null);
    assert_eq!(parse_payload(r#"{"percent":0.5}"#).unwrap(), json!({ "percent": 0.5 }));
    assert!(parse_payload("nope").is_err());
}
