//! Conversion between [`Value`]s and the DynamoDB wire representation.
//!
//! DynamoDB cannot store an empty string, so `""` is written as
//! [`EMPTY_STRING_SENTINEL`] and turned back into `""` when read. Timestamps are written
//! as ISO-8601 strings and come back as plain strings.

use crate::{
    errors::ValidationError,
    value::{Item, Value},
};
use aws_sdk_dynamodb::types::AttributeValue;
use std::collections::HashMap;

/// Stored in place of an empty string. Existing data depends on the exact bytes.
pub const EMPTY_STRING_SENTINEL: &str = "<empty string>";

/// A raw DynamoDB item.
pub type WireItem = HashMap<String, AttributeValue>;

/// How strings are interpreted when decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StringCoercion {
    /// Strings that look like integers decode as [`Value::Number`] and `"true"` / `"false"`
    /// decode as [`Value::Bool`]. This matches how older data was read back and is lossy:
    /// a string `"42"` that was written as a string comes back as a number.
    #[default]
    Legacy,
    /// Strings always decode as strings.
    Preserve,
}

/// Encodes and decodes attribute values.
///
/// Encoding is the same for every codec. Decoding depends on the [`StringCoercion`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Codec {
    coercion: StringCoercion,
}

impl Codec {
    pub fn new(coercion: StringCoercion) -> Self {
        Self { coercion }
    }

    /// A codec that never reinterprets strings on decode.
    pub fn strict() -> Self {
        Self::new(StringCoercion::Preserve)
    }

    pub fn coercion(&self) -> StringCoercion {
        self.coercion
    }

    pub fn encode(&self, value: impl Into<Value>) -> Result<AttributeValue, ValidationError> {
        encode(value.into())
    }

    pub fn encode_item(&self, item: Item) -> Result<WireItem, ValidationError> {
        encode_item(item)
    }

    pub fn decode(&self, value: AttributeValue) -> Result<Value, ValidationError> {
        match value {
            AttributeValue::S(s) => Ok(self.decode_string(s)),
            AttributeValue::N(n) => Ok(Value::Number(n)),
            AttributeValue::Bool(b) => Ok(Value::Bool(b)),
            AttributeValue::Null(_) => Ok(Value::Null),
            AttributeValue::L(list) => list
                .into_iter()
                .map(|v| self.decode(v))
                .collect::<Result<_, _>>()
                .map(Value::List),
            AttributeValue::M(map) => self.decode_item(map).map(Value::Map),
            AttributeValue::Ss(strings) => Ok(Value::List(
                strings.into_iter().map(|s| self.decode_string(s)).collect(),
            )),
            AttributeValue::Ns(numbers) => Ok(Value::List(
                numbers.into_iter().map(Value::Number).collect(),
            )),
            AttributeValue::B(_) => Err(ValidationError::UnsupportedAttributeValue(
                "binary (B)".to_string(),
            )),
            AttributeValue::Bs(_) => Err(ValidationError::UnsupportedAttributeValue(
                "binary set (BS)".to_string(),
            )),
            x => Err(ValidationError::UnsupportedAttributeValue(format!("{x:?}"))),
        }
    }

    pub fn decode_item(&self, item: WireItem) -> Result<Item, ValidationError> {
        item.into_iter()
            .map(|(k, v)| Ok((k, self.decode(v)?)))
            .collect()
    }

    fn decode_string(&self, s: String) -> Value {
        if s == EMPTY_STRING_SENTINEL {
            return Value::String(String::new());
        }

        if self.coercion == StringCoercion::Legacy {
            if is_integer(&s) {
                return Value::Number(s);
            }

            match s.as_str() {
                "true" => return Value::Bool(true),
                "false" => return Value::Bool(false),
                _ => {}
            }
        }

        Value::String(s)
    }
}

/// Encode a single value into its wire form.
pub fn encode(value: Value) -> Result<AttributeValue, ValidationError> {
    match sanitize_leaf(value) {
        Value::Null => Ok(AttributeValue::Null(true)),
        Value::Bool(b) => Ok(AttributeValue::Bool(b)),
        Value::Number(n) => {
            if is_decimal(&n) {
                Ok(AttributeValue::N(n))
            } else {
                Err(ValidationError::InvalidNumber(n))
            }
        }
        Value::String(s) | Value::Timestamp(s) => Ok(AttributeValue::S(s)),
        Value::List(list) => list
            .into_iter()
            .map(encode)
            .collect::<Result<_, _>>()
            .map(AttributeValue::L),
        Value::Map(map) => encode_item(map).map(AttributeValue::M),
    }
}

/// Encode every attribute of an item.
pub fn encode_item(item: Item) -> Result<WireItem, ValidationError> {
    item.into_iter()
        .map(|(k, v)| Ok((k, encode(v)?)))
        .collect()
}

/// Apply the empty string and timestamp rules to every leaf of `map` without
/// producing wire values.
///
/// For example:
///
/// ```
/// use crudop::{codec::sanitize_nested, Value};
///
/// let inner = [("b".to_string(), Value::from(""))].into_iter().collect();
/// let map = [("a".to_string(), Value::Map(inner))].into_iter().collect();
///
/// let sanitized = sanitize_nested(map);
/// assert_eq!(sanitized["a"].as_map().unwrap()["b"], Value::from("<empty string>"));
/// ```
pub fn sanitize_nested(map: HashMap<String, Value>) -> HashMap<String, Value> {
    map.into_iter().map(|(k, v)| (k, sanitize(v))).collect()
}

/// Recursive form of [`sanitize_nested`] for a single value.
pub fn sanitize(value: Value) -> Value {
    match value {
        Value::Map(map) => Value::Map(sanitize_nested(map)),
        Value::List(list) => Value::List(list.into_iter().map(sanitize).collect()),
        leaf => sanitize_leaf(leaf),
    }
}

// Shared by `encode` and `sanitize` so both paths treat leaves the same way
fn sanitize_leaf(value: Value) -> Value {
    match value {
        Value::String(s) if s.is_empty() => Value::String(EMPTY_STRING_SENTINEL.to_string()),
        Value::Timestamp(ts) => sanitize_leaf(Value::String(ts)),
        other => other,
    }
}

fn is_integer(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Accepts what DynamoDB accepts as a number: an optional sign, digits with an optional
/// fraction, and an optional exponent. Rejects `NaN` and `inf`.
fn is_decimal(s: &str) -> bool {
    let unsigned = s.strip_prefix(['-', '+']).unwrap_or(s);
    let (mantissa, exponent) = match unsigned.split_once(['e', 'E']) {
        Some((mantissa, exponent)) => (mantissa, Some(exponent)),
        None => (unsigned, None),
    };

    let (int, frac) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());

    let mantissa_ok = !(int.is_empty() && frac.is_empty()) && all_digits(int) && all_digits(frac);
    let exponent_ok = exponent.map_or(true, |e| {
        let e = e.strip_prefix(['-', '+']).unwrap_or(e);
        !e.is_empty() && all_digits(e)
    });

    mantissa_ok && exponent_ok
}
