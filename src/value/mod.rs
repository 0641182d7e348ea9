mod timestamp;

pub use timestamp::Timestamp;

use crate::errors::ValidationError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone};
use itertools::Itertools;
use std::{
    collections::{BTreeMap, HashMap},
    fmt::{self, Display},
};

/// An item as the caller sees it: attribute name to [`Value`].
pub type Item = HashMap<String, Value>;

/// Trait for converting a [`Value`] read from DynamoDB into `Self`
pub trait TryFromValue: Sized {
    /// Try to convert `value` to `Self`
    fn try_from_value(value: Value) -> Result<Self, ValidationError>;
}

/// A host-side attribute value.
///
/// This is the value domain callers build items from. It is encoded into the
/// DynamoDB wire representation by [`crate::codec`], which is where empty strings
/// and timestamps get their special treatment.
#[derive(Clone, PartialEq, Debug)]
pub enum Value {
    Null,
    Bool(bool),
    /// A decimal number kept as its exact textual form, as DynamoDB does.
    Number(String),
    String(String),
    /// A point in time, already formatted as ISO-8601.
    Timestamp(String),
    List(Vec<Value>),
    Map(HashMap<String, Value>),
}

impl Value {
    /// Build a [`Value::Timestamp`] from anything that can format itself as ISO-8601.
    pub fn timestamp(value: &impl Timestamp) -> Self {
        Value::Timestamp(value.to_iso8601())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::Timestamp(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&str> {
        match self {
            Value::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&HashMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => Display::fmt(b, f),
            Value::Number(n) => f.write_str(n),
            Value::String(s) | Value::Timestamp(s) => f.write_str(s),
            Value::List(list) => write!(f, "[{}]", list.iter().join(", ")),
            Value::Map(map) => write!(
                f,
                "{{{}}}",
                map.iter()
                    .sorted_by(|a, b| a.0.cmp(b.0))
                    .map(|(k, v)| format!("{k}: {v}"))
                    .join(", ")
            ),
        }
    }
}

/// Look up `name` in `item` and convert it to `T`.
///
/// An absent attribute is treated like [`Value::Null`], so `Option<T>` targets read
/// missing attributes as `None`.
pub fn get_attribute<T: TryFromValue>(item: &Item, name: &str) -> Result<T, ValidationError> {
    match item.get(name) {
        Some(value) => T::try_from_value(value.clone()),
        None => T::try_from_value(Value::Null)
            .map_err(|_| ValidationError::MissingAttribute(name.to_string())),
    }
}

macro_rules! impl_value_conversion_helper {
    (number_parse, $ty:ty, $value:ident) => {
        $value
            .parse()
            .map_err(|_| ValidationError::ConversionFailed(stringify!($ty).to_string()))
    };
    (simple_parse, $_:ty, $value:ident) => {
        Ok::<_, ValidationError>($value)
    };
    (number_from, $_:ident, $value:ident) => {
        Value::Number($value.to_string())
    };
    (simple_from, $variant:ident, $value:ident) => {
        Value::$variant($value)
    };
    (
        body,
        $ty:ty,
        $variant:ident,
        $from_impl:ident!($from_args:tt),
        $try_from_impl:ident!($try_from_args:tt)
    ) => {
        impl From<$ty> for Value {
            fn from(value: $ty) -> Self {
                $from_impl!($from_args, $variant, value)
            }
        }

        impl TryFromValue for $ty {
            fn try_from_value(value: Value) -> Result<Self, ValidationError> {
                let Value::$variant(value) = value else {
                    return Err(ValidationError::ConversionFailed(
                        stringify!($ty).to_string(),
                    ));
                };

                $try_from_impl!($try_from_args, $ty, value)
            }
        }
    };
}

macro_rules! impl_value_conversion {
    () => {};
    (, $($tail:tt)*) => {
        impl_value_conversion!($($tail)*);
    };
    ($ty:ty => Number $($tail:tt)*) => {
        impl_value_conversion_helper!(
            body,
            $ty,
            Number,
            impl_value_conversion_helper!(
                number_from
            ),
            impl_value_conversion_helper!(
                number_parse
            )
        );

        impl_value_conversion!($($tail)*);
    };
    ($ty:ty => $variant:ident $($tail:tt)*) => {
        impl_value_conversion_helper!(
            body,
            $ty,
            $variant,
            impl_value_conversion_helper!(
                simple_from
            ),
            impl_value_conversion_helper!(
                simple_parse
            )
        );

        impl_value_conversion!($($tail)*);
    };
}

impl_value_conversion!(
    i8 => Number,
    i16 => Number,
    i32 => Number,
    i64 => Number,
    i128 => Number,
    isize => Number,
    u8 => Number,
    u16 => Number,
    u32 => Number,
    u64 => Number,
    u128 => Number,
    usize => Number,
    f32 => Number,
    f64 => Number,
    bool => Bool
);

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<&String> for Value {
    fn from(value: &String) -> Self {
        Value::String(value.clone())
    }
}

impl TryFromValue for String {
    fn try_from_value(value: Value) -> Result<Self, ValidationError> {
        match value {
            Value::String(s) | Value::Timestamp(s) => Ok(s),
            // Legacy decoding turns numeric-looking strings into numbers
            Value::Number(n) => Ok(n),
            _ => Err(ValidationError::ConversionFailed("String".to_string())),
        }
    }
}

impl TryFromValue for Value {
    fn try_from_value(value: Value) -> Result<Self, ValidationError> {
        Ok(value)
    }
}

impl<Tz> From<DateTime<Tz>> for Value
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    fn from(value: DateTime<Tz>) -> Self {
        Value::timestamp(&value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Value::timestamp(&value)
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Value::timestamp(&value)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => value.into(),
            None => Value::Null,
        }
    }
}

impl<T> TryFromValue for Option<T>
where
    T: TryFromValue,
{
    fn try_from_value(value: Value) -> Result<Self, ValidationError> {
        if value.is_null() {
            Ok(None)
        } else {
            Ok(Some(T::try_from_value(value)?))
        }
    }
}

impl<T> From<Vec<T>> for Value
where
    T: Into<Value>,
{
    fn from(value: Vec<T>) -> Self {
        Value::List(value.into_iter().map(Into::into).collect())
    }
}

impl<T> TryFromValue for Vec<T>
where
    T: TryFromValue,
{
    fn try_from_value(value: Value) -> Result<Self, ValidationError> {
        let Value::List(list) = value else {
            return Err(ValidationError::ConversionFailed(
                std::any::type_name::<Self>().to_string(),
            ));
        };

        list.into_iter().map(T::try_from_value).collect()
    }
}

impl<K, V> From<HashMap<K, V>> for Value
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from(map: HashMap<K, V>) -> Self {
        Value::Map(map.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<K, V> From<BTreeMap<K, V>> for Value
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from(map: BTreeMap<K, V>) -> Self {
        Value::Map(map.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<V> TryFromValue for HashMap<String, V>
where
    V: TryFromValue,
{
    fn try_from_value(value: Value) -> Result<Self, ValidationError> {
        let Value::Map(map) = value else {
            return Err(ValidationError::ConversionFailed(
                std::any::type_name::<Self>().to_string(),
            ));
        };

        map.into_iter()
            .map(|(k, v)| Ok((k, V::try_from_value(v)?)))
            .collect()
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.to_string()),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(list) => Value::List(list.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(map) => {
                Value::Map(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    #[test]
    fn test_numbers_keep_their_exact_text() {
        assert_eq!(Value::from(42u8), Value::Number("42".to_string()));
        assert_eq!(Value::from(-7i64), Value::Number("-7".to_string()));
        assert_eq!(Value::from(20.25f64), Value::Number("20.25".to_string()));

        assert_eq!(i32::try_from_value(Value::from(321)).unwrap(), 321);
        assert_eq!(f64::try_from_value(Value::from(30.3)).unwrap(), 30.3);
    }

    #[test]
    fn test_number_conversion_failure() {
        let err = u8::try_from_value(Value::from(1024)).unwrap_err();
        assert_eq!(err, ValidationError::ConversionFailed("u8".to_string()));

        let err = i32::try_from_value(Value::from("twelve")).unwrap_err();
        assert_eq!(err, ValidationError::ConversionFailed("i32".to_string()));
    }

    #[test]
    fn test_option() {
        assert_eq!(Value::from(None::<String>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::from("x"));

        assert_eq!(Option::<bool>::try_from_value(Value::Null).unwrap(), None);
        assert_eq!(
            Option::<bool>::try_from_value(Value::Bool(true)).unwrap(),
            Some(true)
        );
    }

    #[test]
    fn test_vec_and_map() {
        let list = Value::from(vec![2, 3, 5]);
        assert_eq!(list.as_list().map(|l| l.len()), Some(3));
        assert_eq!(Vec::<i32>::try_from_value(list).unwrap(), vec![2, 3, 5]);

        let map: HashMap<&str, &str> = [("a", "Something in A"), ("b", "Something in B")]
            .into_iter()
            .collect();
        let value = Value::from(map);

        let original = HashMap::<String, String>::try_from_value(value).unwrap();
        assert_eq!(original.get("a").map(String::as_str), Some("Something in A"));
        assert_eq!(original.len(), 2);
    }

    #[test]
    fn test_datetime_becomes_timestamp() {
        let time = Utc.with_ymd_and_hms(2023, 11, 2, 9, 30, 0).unwrap();
        assert_eq!(
            Value::from(time),
            Value::Timestamp("2023-11-02T09:30:00Z".to_string())
        );
    }

    #[test]
    fn test_from_json() {
        let value = Value::from(json!({
            "id": "123",
            "age": 42,
            "tags": ["a", null],
            "active": true,
        }));

        let map = value.as_map().unwrap();
        assert_eq!(map["id"], Value::from("123"));
        assert_eq!(map["age"], Value::Number("42".to_string()));
        assert_eq!(
            map["tags"],
            Value::List(vec![Value::from("a"), Value::Null])
        );
        assert_eq!(map["active"], Value::Bool(true));
    }

    #[test]
    fn test_display() {
        let value = Value::Map(
            [
                ("b".to_string(), Value::from(vec![1, 2])),
                ("a".to_string(), Value::Null),
            ]
            .into_iter()
            .collect(),
        );

        assert_eq!(value.to_string(), "{a: null, b: [1, 2]}");
    }

    #[test]
    fn test_get_attribute() {
        let item: Item = [
            ("name".to_string(), Value::from("Ann")),
            ("age".to_string(), Value::from(31)),
        ]
        .into_iter()
        .collect();

        assert_eq!(get_attribute::<String>(&item, "name").unwrap(), "Ann");
        assert_eq!(get_attribute::<u32>(&item, "age").unwrap(), 31);
        assert_eq!(get_attribute::<Option<String>>(&item, "nick").unwrap(), None);
        assert_eq!(
            get_attribute::<String>(&item, "nick").unwrap_err(),
            ValidationError::MissingAttribute("nick".to_string())
        );
    }
}
