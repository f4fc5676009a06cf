// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! JSON representation
//!
//! Renders a [`Value`] tree as a [`serde_json::Value`], for debugging,
//! export, and shell output. Kinds without a JSON equivalent use a
//! precision-preserving string form:
//!
//! - `Binary` is base64-encoded,
//! - `DateTime` is RFC 3339 (with the `chrono` feature; raw milliseconds
//!   without it),
//! - `Decimal` and `Guid` use their canonical string forms (a JSON number
//!   would route decimals through `f64` and lose precision),
//! - the `MinValue`/`MaxValue` sentinels become `"$minValue"`/`"$maxValue"`.
//!
//! # Examples
//!
//! ```rust
//! use docmap::{Value, document};
//!
//! let doc = document! {
//!     "name" => "John Doe",
//!     "age" => 43,
//!     "phones" => ["+44 1234567", "+44 2345678"]
//! };
//!
//! let json = serde_json::Value::from(Value::Document(doc));
//! assert_eq!(json["name"], "John Doe");
//! assert_eq!(json["phones"][1], "+44 2345678");
//! ```
use crate::value::{Document, Timestamp, Value};

/// Converts a [`Value`] to a [`serde_json::Value`].
impl From<Value> for serde_json::Value {
    fn from(val: Value) -> Self {
        match val {
            Value::Null => serde_json::Value::Null,
            Value::Boolean(v) => v.into(),
            Value::Int32(v) => v.into(),
            Value::Int64(v) => v.into(),
            // non-finite doubles have no JSON number form and become null
            Value::Double(v) => v.into(),
            Value::Decimal(v) => v.to_string().into(),
            Value::String(v) => v.into(),
            Value::Binary(v) => {
                base64::Engine::encode(&base64::engine::general_purpose::STANDARD, v).into()
            }
            Value::DateTime(v) => timestamp_to_json(v),
            Value::Guid(v) => v.to_string().into(),
            Value::Array(items) => {
                serde_json::Value::Array(items.into_iter().map(Into::into).collect())
            }
            Value::Document(doc) => doc.into(),
            Value::MinValue => "$minValue".into(),
            Value::MaxValue => "$maxValue".into(),
        }
    }
}

/// Converts a [`Document`] to a [`serde_json::Value`].
impl From<Document> for serde_json::Value {
    fn from(doc: Document) -> Self {
        let obj = doc.into_iter().map(|(k, v)| (k, v.into())).collect();
        serde_json::Value::Object(obj)
    }
}

#[cfg(feature = "chrono")]
fn timestamp_to_json(v: Timestamp) -> serde_json::Value {
    v.to_datetime()
        .to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
        .into()
}

#[cfg(not(feature = "chrono"))]
fn timestamp_to_json(v: Timestamp) -> serde_json::Value {
    v.as_millis().into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document;
    use rust_decimal::Decimal;

    #[test]
    fn scalar_kinds_render_naturally() {
        let doc = document! {
            "flag" => true,
            "count" => 28,
            "big" => 5_000_000_000i64,
            "ratio" => 0.5,
            "name" => "John",
            "missing" => (Value::Null)
        };
        let json = serde_json::Value::from(Value::Document(doc));
        assert_eq!(
            json,
            serde_json::json!({
                "flag": true,
                "count": 28,
                "big": 5_000_000_000i64,
                "ratio": 0.5,
                "name": "John",
                "missing": null,
            })
        );
    }

    #[test]
    fn lossy_kinds_use_string_forms() {
        let guid = uuid::Uuid::new_v4();
        let doc = document! {
            "price" => (Decimal::new(199, 1)),
            "guid" => guid,
            "blob" => (Value::Binary(vec![1, 2, 3]))
        };
        let json = serde_json::Value::from(Value::Document(doc));
        assert_eq!(json["price"], "19.9");
        assert_eq!(json["guid"], guid.to_string());
        assert_eq!(json["blob"], "AQID");
    }

    #[cfg(feature = "chrono")]
    #[test]
    fn datetimes_render_as_rfc3339() {
        let ts = Timestamp::from_millis(0).unwrap();
        let json = serde_json::Value::from(Value::DateTime(ts));
        assert_eq!(json, "1970-01-01T00:00:00.000Z");
    }

    #[test]
    fn sentinels_render_as_tags() {
        assert_eq!(serde_json::Value::from(Value::MinValue), "$minValue");
        assert_eq!(serde_json::Value::from(Value::MaxValue), "$maxValue");
    }
}
