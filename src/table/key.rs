use crate::{
    codec::{self, WireItem},
    errors::ValidationError,
    value::Value,
};
use std::fmt::{self, Display};

/// The primary key of an item: a partition key and, for tables that have one, a sort key.
///
/// The attribute names must match the table's key schema. That is not checked here;
/// DynamoDB rejects a mismatched key.
#[derive(Debug, Clone, PartialEq)]
pub struct Key {
    partition: (String, Value),
    sort: Option<(String, Value)>,
}

impl Key {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            partition: (name.into(), value.into()),
            sort: None,
        }
    }

    pub fn with_sort(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.sort = Some((name.into(), value.into()));
        self
    }

    pub fn partition(&self) -> (&str, &Value) {
        (&self.partition.0, &self.partition.1)
    }

    pub fn sort(&self) -> Option<(&str, &Value)> {
        self.sort.as_ref().map(|(name, value)| (name.as_str(), value))
    }

    /// Encode the key into the map DynamoDB expects.
    pub fn to_wire(&self) -> Result<WireItem, ValidationError> {
        let mut key = WireItem::new();
        let (name, value) = &self.partition;
        key.insert(name.clone(), codec::encode(value.clone())?);

        if let Some((name, value)) = &self.sort {
            key.insert(name.clone(), codec::encode(value.clone())?);
        }

        Ok(key)
    }
}

impl Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.partition.0, self.partition.1)?;
        if let Some((name, value)) = &self.sort {
            write!(f, ", {name}={value}")?;
        }
        Ok(())
    }
}

impl<N: Into<String>, V: Into<Value>> From<(N, V)> for Key {
    fn from((name, value): (N, V)) -> Self {
        Self::new(name, value)
    }
}
