use super::validate_attribute_name;
use crate::{
    clock::Clock,
    codec::{self, WireItem},
    errors::ValidationError,
    value::Value,
};
use aws_sdk_dynamodb::types::AttributeValue;
use itertools::Itertools;
use std::collections::{hash_map::Entry, HashMap};

/// Attribute set to the current time by every update.
pub const LAST_SYNCED_ATTRIBUTE: &str = "last_synced_at";

// Lowercase so they can never clash with the uppercase `#NAME` / `:valname` placeholders
const LAST_SYNCED_NAME: &str = "#sync";
const LAST_SYNCED_VALUE: &str = ":sync";

/// `#` followed by the uppercased attribute name.
pub fn name_placeholder(name: &str) -> String {
    format!("#{}", name.to_ascii_uppercase())
}

/// `:val` followed by the lowercased attribute name.
pub fn value_placeholder(name: &str) -> String {
    format!(":val{}", name.to_ascii_lowercase())
}

/// A `SET` update expression and the placeholder tables it refers to.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateExpression {
    pub expression: String,
    pub names: HashMap<String, String>,
    pub values: WireItem,
}

impl UpdateExpression {
    /// Build an update that sets every attribute in `updates` and stamps
    /// [`LAST_SYNCED_ATTRIBUTE`] with the time from `clock`.
    ///
    /// Clauses keep the order of `updates`, with the `last_synced_at` clause last. If
    /// the same attribute is given more than once the last value wins.
    pub fn build<I, K, V>(updates: I, clock: &dyn Clock) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut names: HashMap<String, String> = HashMap::new();
        let mut values = HashMap::new();
        let mut clauses = Vec::new();

        for (name, value) in updates {
            let name: String = name.into();
            validate_attribute_name(&name)?;

            if name == LAST_SYNCED_ATTRIBUTE {
                return Err(ValidationError::ReservedAttribute(name));
            }

            let name_key = name_placeholder(&name);
            let value_key = value_placeholder(&name);

            match names.entry(name_key.clone()) {
                Entry::Occupied(entry) if entry.get() != &name => {
                    return Err(ValidationError::PlaceholderCollision {
                        placeholder: name_key,
                        first: entry.get().clone(),
                        second: name,
                    });
                }
                Entry::Occupied(_) => {}
                Entry::Vacant(entry) => {
                    entry.insert(name);
                    clauses.push(format!("{name_key} = {value_key}"));
                }
            }

            values.insert(value_key, codec::encode(value.into())?);
        }

        names.insert(
            LAST_SYNCED_NAME.to_string(),
            LAST_SYNCED_ATTRIBUTE.to_string(),
        );
        values.insert(
            LAST_SYNCED_VALUE.to_string(),
            codec::encode(Value::timestamp(&clock.now()))?,
        );
        clauses.push(format!("{LAST_SYNCED_NAME} = {LAST_SYNCED_VALUE}"));

        Ok(Self {
            expression: format!("SET {}", clauses.iter().join(", ")),
            names,
            values,
        })
    }

    /// The value bound to `placeholder`, if any.
    pub fn value(&self, placeholder: &str) -> Option<&AttributeValue> {
        self.values.get(placeholder)
    }

    /// When this update was stamped, as written to [`LAST_SYNCED_ATTRIBUTE`].
    pub fn synced_at(&self) -> Option<&str> {
        self.values
            .get(LAST_SYNCED_VALUE)
            .and_then(|v| v.as_s().ok())
            .map(String::as_str)
    }
}
