use super::validate_attribute_name;
use crate::{
    codec::{self, WireItem},
    errors::ValidationError,
    value::Value,
};
use std::{
    collections::HashMap,
    fmt::{self, Display},
    str::FromStr,
};

const PARTITION_NAME: &str = "#pk0";
const PARTITION_VALUE: &str = ":pk0";
const SORT_NAME: &str = "#sk0";
const SORT_VALUE: &str = ":sk0";
const SORT_UPPER_VALUE: &str = ":sk1";

/// Comparison applied to the sort key in a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Lt,
    Le,
    Gt,
    Ge,
    Between,
    BeginsWith,
}

impl FromStr for Operator {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "=" | "==" | "eq" => Ok(Self::Eq),
            "<" | "lt" => Ok(Self::Lt),
            "<=" | "le" => Ok(Self::Le),
            ">" | "gt" => Ok(Self::Gt),
            ">=" | "ge" => Ok(Self::Ge),
            "between" => Ok(Self::Between),
            "begins_with" => Ok(Self::BeginsWith),
            _ => Err(ValidationError::InvalidOperator(s.to_string())),
        }
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Eq => "=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Between => "BETWEEN",
            Self::BeginsWith => "begins_with",
        })
    }
}

/// Condition on the sort key of a query.
#[derive(Debug, Clone, PartialEq)]
pub enum SortKeyCondition {
    Compare {
        name: String,
        op: Operator,
        value: Value,
    },
    Between {
        name: String,
        low: Value,
        high: Value,
    },
}

/// The key condition of a query: equality on the partition key and an optional
/// condition on the sort key.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyCondition {
    partition_name: String,
    partition_value: Value,
    sort: Option<SortKeyCondition>,
}

/// A built key condition expression and its placeholder tables.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyConditionExpression {
    pub expression: String,
    pub names: HashMap<String, String>,
    pub values: WireItem,
}

impl KeyCondition {
    pub fn partition(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            partition_name: name.into(),
            partition_value: value.into(),
            sort: None,
        }
    }

    /// Compare the sort key with a single value.
    ///
    /// [`Operator::Between`] needs two bounds and is rejected here; use
    /// [`KeyCondition::sort_between`].
    pub fn sort(
        mut self,
        name: impl Into<String>,
        op: Operator,
        value: impl Into<Value>,
    ) -> Result<Self, ValidationError> {
        if op == Operator::Between {
            return Err(ValidationError::InvalidOperator(format!(
                "{op} requires a lower and an upper bound"
            )));
        }

        self.sort = Some(SortKeyCondition::Compare {
            name: name.into(),
            op,
            value: value.into(),
        });
        Ok(self)
    }

    pub fn sort_between(
        mut self,
        name: impl Into<String>,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> Self {
        self.sort = Some(SortKeyCondition::Between {
            name: name.into(),
            low: low.into(),
            high: high.into(),
        });
        self
    }

    pub fn sort_begins_with(self, name: impl Into<String>, prefix: impl Into<Value>) -> Self {
        Self {
            sort: Some(SortKeyCondition::Compare {
                name: name.into(),
                op: Operator::BeginsWith,
                value: prefix.into(),
            }),
            ..self
        }
    }

    pub fn build(self) -> Result<KeyConditionExpression, ValidationError> {
        validate_attribute_name(&self.partition_name)?;

        let mut names = HashMap::from([(PARTITION_NAME.to_string(), self.partition_name)]);
        let mut values =
            HashMap::from([(PARTITION_VALUE.to_string(), codec::encode(self.partition_value)?)]);
        let mut expression = format!("{PARTITION_NAME} = {PARTITION_VALUE}");

        match self.sort {
            None => {}
            Some(SortKeyCondition::Compare { name, op, value }) => {
                validate_attribute_name(&name)?;
                names.insert(SORT_NAME.to_string(), name);
                values.insert(SORT_VALUE.to_string(), codec::encode(value)?);

                let clause = match op {
                    Operator::BeginsWith => format!("begins_with({SORT_NAME}, {SORT_VALUE})"),
                    // Rejected by `sort`, but the enum is public
                    Operator::Between => {
                        return Err(ValidationError::InvalidOperator(format!(
                            "{op} requires a lower and an upper bound"
                        )))
                    }
                    op => format!("{SORT_NAME} {op} {SORT_VALUE}"),
                };
                expression = format!("{expression} AND {clause}");
            }
            Some(SortKeyCondition::Between { name, low, high }) => {
                validate_attribute_name(&name)?;
                names.insert(SORT_NAME.to_string(), name);
                values.insert(SORT_VALUE.to_string(), codec::encode(low)?);
                values.insert(SORT_UPPER_VALUE.to_string(), codec::encode(high)?);

                expression = format!(
                    "{expression} AND {SORT_NAME} BETWEEN {SORT_VALUE} AND {SORT_UPPER_VALUE}"
                );
            }
        }

        Ok(KeyConditionExpression {
            expression,
            names,
            values,
        })
    }
}
