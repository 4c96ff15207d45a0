// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Typed attribute value decoding.
//
// The host sends attribute values as loosely-typed JSON plus a declared type
// keyword. Dates cannot cross the bridge natively, so they arrive as epoch
// milliseconds and are decoded straight into a UTC timestamp.

use airship_core::types::TypedValue;
use serde_json::Value;
use thiserror::Error;

/// Why a raw value could not be decoded. The batch engine treats every
/// variant as "skip this record".
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("value missing or null for declared type")]
    MissingValue,

    #[error("value is not numeric")]
    NotNumeric,

    #[error("unknown value type: {0}")]
    UnknownType(String),

    #[error("timestamp out of range: {0}")]
    OutOfRange(f64),
}

/// Decode `raw` according to the declared `value_type` keyword.
///
/// - `"string"`: `raw` must be a JSON string.
/// - `"number"`: `raw` must be numeric; coerced to `f64`.
/// - `"date"`: `raw` must be numeric epoch milliseconds; fractional
///   milliseconds are truncated toward zero.
pub fn decode(value_type: &str, raw: Option<&Value>) -> Result<TypedValue, DecodeError> {
    let raw = match raw {
        None | Some(Value::Null) => return Err(DecodeError::MissingValue),
        Some(raw) => raw,
    };

    match value_type {
        "string" => raw
            .as_str()
            .map(|s| TypedValue::String(s.to_string()))
            .ok_or(DecodeError::MissingValue),
        "number" => raw
            .as_f64()
            .map(TypedValue::Number)
            .ok_or(DecodeError::NotNumeric),
        "date" => {
            let millis = raw.as_f64().ok_or(DecodeError::NotNumeric)?;
            epoch_millis_to_timestamp(millis)
        }
        other => Err(DecodeError::UnknownType(other.to_string())),
    }
}

fn epoch_millis_to_timestamp(millis: f64) -> Result<TypedValue, DecodeError> {
    // i64::MAX is not exactly representable; compare against 2^63.
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if !millis.is_finite() || millis >= LIMIT || millis < -LIMIT {
        return Err(DecodeError::OutOfRange(millis));
    }
    TypedValue::from_epoch_millis(millis.trunc() as i64).ok_or(DecodeError::OutOfRange(millis))
}
