//! Builders for the expressions sent alongside DynamoDB requests.
//!
//! Attribute names never appear in an expression directly when they could clash with
//! a reserved word. Instead each name gets a `#placeholder` and each value a
//! `:placeholder`, and the builders return the side tables that resolve them.

mod key_condition;
mod projection;
pub mod reserved;
mod update;

pub use key_condition::{KeyCondition, KeyConditionExpression, Operator, SortKeyCondition};
pub use projection::{FieldName, Projection};
pub use update::{
    name_placeholder, value_placeholder, UpdateExpression, LAST_SYNCED_ATTRIBUTE,
};

use crate::errors::ValidationError;

/// Check that `name` can be turned into an expression placeholder.
pub(crate) fn validate_attribute_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::EmptyAttributeName);
    }

    if !name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_') {
        return Err(ValidationError::InvalidAttributeName(name.to_string()));
    }

    Ok(())
}
