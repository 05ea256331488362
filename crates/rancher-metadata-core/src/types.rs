//! Decoded metadata responses.
//!
//! The metadata service answers with JSON, but some deployments return plain
//! text for scalar fields, and a missing path is reported in-band as a
//! `{"code": 404}` body rather than through the HTTP status.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Error, Result};

/// Status code the metadata service embeds in a body to signal a missing path.
pub const NOT_FOUND_CODE: u64 = 404;

/// Result of decoding one metadata response body.
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataResponse {
    /// Body decoded as JSON
    Structured(Value),
    /// Body was not JSON and is kept verbatim
    Raw(String),
    /// Service reported that nothing exists at the path
    Absent,
}

impl MetadataResponse {
    /// Decode a response body.
    ///
    /// A top-level object whose `code` is 404 becomes [`MetadataResponse::Absent`].
    #[must_use]
    pub fn from_body(body: &str) -> Self {
        match serde_json::from_str::<Value>(body) {
            Ok(value) if is_not_found(&value) => Self::Absent,
            Ok(value) => Self::Structured(value),
            Err(_) => Self::Raw(body.to_string()),
        }
    }

    /// Returns true when the service reported the path as missing.
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Borrow the decoded JSON, if any.
    #[must_use]
    pub const fn as_structured(&self) -> Option<&Value> {
        match self {
            Self::Structured(value) => Some(value),
            _ => None,
        }
    }

    /// Render a scalar answer as a string.
    ///
    /// JSON strings, numbers and booleans are rendered; raw bodies are returned
    /// as-is. Objects, arrays, null and absent answers yield `None`.
    #[must_use]
    pub fn as_string(&self) -> Option<String> {
        match self {
            Self::Structured(Value::String(text)) | Self::Raw(text) => Some(text.clone()),
            Self::Structured(Value::Number(number)) => Some(number.to_string()),
            Self::Structured(Value::Bool(flag)) => Some(flag.to_string()),
            _ => None,
        }
    }

    /// Coerce a scalar answer to an integer, see [`coerce_int`].
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Structured(value) => coerce_int(value),
            Self::Raw(text) => Some(leading_int(text)),
            Self::Absent => None,
        }
    }

    /// Map the answer onto a typed model.
    ///
    /// Absent answers become `None`. Raw bodies are offered to the model as a
    /// JSON string, so string-typed fields still decode.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DecodeError`] if the value does not match the model.
    pub fn decode<T>(self) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let value = match self {
            Self::Absent => return Ok(None),
            Self::Structured(value) => value,
            Self::Raw(text) => Value::String(text),
        };

        serde_json::from_value(value)
            .map(Some)
            .map_err(|err| Error::DecodeError(err.to_string()))
    }

    /// Convert into an optional JSON value, treating raw text as a JSON string.
    #[must_use]
    pub fn into_value(self) -> Option<Value> {
        match self {
            Self::Structured(value) => Some(value),
            Self::Raw(text) => Some(Value::String(text)),
            Self::Absent => None,
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn is_not_found(value: &Value) -> bool {
    match value.as_object().and_then(|object| object.get("code")) {
        Some(Value::Number(code)) => {
            code.as_u64() == Some(NOT_FOUND_CODE)
                || code.as_f64() == Some(NOT_FOUND_CODE as f64)
        }
        _ => false,
    }
}

/// Coerce a numeric-or-string JSON value to an integer.
///
/// Integers pass through and floats truncate. Strings parse their leading
/// integer, falling back to 0 when there is none, so `"42"` is 42 and `"n/a"`
/// is 0. Other values yield `None`.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn coerce_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|float| float as i64)),
        Value::String(text) => Some(leading_int(text)),
        _ => None,
    }
}

/// Parse the leading integer of a string, ignoring leading whitespace.
///
/// Values outside the `i64` range saturate.
#[must_use]
pub fn leading_int(text: &str) -> i64 {
    let trimmed = text.trim_start();
    let sign_len = usize::from(matches!(trimmed.as_bytes().first(), Some(b'-' | b'+')));
    let negative = trimmed.starts_with('-');

    let digits = &trimmed[sign_len..];
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return 0;
    }

    trimmed[..sign_len + end]
        .parse::<i64>()
        .unwrap_or(if negative { i64::MIN } else { i64::MAX })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_json_body() {
        let response = MetadataResponse::from_body(r#"{"name": "web", "scale": 2}"#);
        assert_eq!(
            response,
            MetadataResponse::Structured(json!({"name": "web", "scale": 2}))
        );
    }

    #[test]
    fn keeps_non_json_body_raw() {
        let response = MetadataResponse::from_body("10.42.0.7");
        assert_eq!(response, MetadataResponse::Raw("10.42.0.7".to_string()));
        assert_eq!(response.as_string().as_deref(), Some("10.42.0.7"));
    }

    #[test]
    fn not_found_body_is_absent() {
        let response = MetadataResponse::from_body(r#"{"code": 404, "message": "Not found"}"#);
        assert!(response.is_absent());
        assert_eq!(response.as_string(), None);
        assert_eq!(response.decode::<String>().unwrap(), None);
    }

    #[test]
    fn float_not_found_code_is_absent() {
        assert!(MetadataResponse::from_body(r#"{"code": 404.0}"#).is_absent());
        assert!(!MetadataResponse::from_body(r#"{"code": 404.5}"#).is_absent());
        assert!(!MetadataResponse::from_body(r#"{"code": "404"}"#).is_absent());
    }

    #[test]
    fn overflowing_digits_saturate() {
        assert_eq!(leading_int("99999999999999999999"), i64::MAX);
        assert_eq!(leading_int("-99999999999999999999abc"), i64::MIN);
        assert_eq!(leading_int("-9223372036854775808"), i64::MIN);
        assert_eq!(leading_int("+7"), 7);
        assert_eq!(leading_int("-"), 0);
    }

    #[test]
    fn other_codes_are_data() {
        let response = MetadataResponse::from_body(r#"{"code": 500}"#);
        assert!(!response.is_absent());

        let response = MetadataResponse::from_body(r#"[{"code": 404}]"#);
        assert!(!response.is_absent());
    }

    #[test]
    fn scalar_rendering() {
        assert_eq!(
            MetadataResponse::from_body(r#""web_1""#).as_string().as_deref(),
            Some("web_1")
        );
        assert_eq!(
            MetadataResponse::from_body("3").as_string().as_deref(),
            Some("3")
        );
        assert_eq!(MetadataResponse::from_body("{}").as_string(), None);
    }

    #[test]
    fn integer_coercion() {
        assert_eq!(coerce_int(&json!("42")), Some(42));
        assert_eq!(coerce_int(&json!(42)), Some(42));
        assert_eq!(coerce_int(&json!(7.9)), Some(7));
        assert_eq!(coerce_int(&json!("12abc")), Some(12));
        assert_eq!(coerce_int(&json!("n/a")), Some(0));
        assert_eq!(coerce_int(&json!(" -3")), Some(-3));
        assert_eq!(coerce_int(&Value::Null), None);
        assert_eq!(coerce_int(&json!([1])), None);
    }

    #[test]
    fn response_as_int() {
        assert_eq!(MetadataResponse::from_body(r#""3""#).as_int(), Some(3));
        assert_eq!(MetadataResponse::from_body("3").as_int(), Some(3));
        assert_eq!(MetadataResponse::Raw("5\n".to_string()).as_int(), Some(5));
        assert_eq!(MetadataResponse::Absent.as_int(), None);
    }

    #[test]
    fn decode_raw_into_string() {
        let decoded: Option<String> = MetadataResponse::Raw("node-a".to_string())
            .decode()
            .unwrap();
        assert_eq!(decoded.as_deref(), Some("node-a"));
    }

    #[test]
    fn decode_mismatch_is_error() {
        let err = MetadataResponse::Raw("node-a".to_string())
            .decode::<Vec<String>>()
            .unwrap_err();
        assert!(matches!(err, Error::DecodeError(_)));
    }
}
