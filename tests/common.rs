#![allow(dead_code)]

use async_trait::async_trait;
use aws_sdk_dynamodb::{
    types::{
        AttributeDefinition, AttributeValue, KeySchemaElement, KeyType, ProvisionedThroughput,
        ScalarAttributeType,
    },
    Client,
};
use crudop::{
    errors::{Operation, StorageErrorKind},
    expression::KeyConditionExpression,
    ContinuationToken, DynamoBackend, Projection, StorageError, UpdateExpression, WireItem,
};
use std::{collections::VecDeque, sync::Mutex};

/// A call received by [`MockBackend`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Put {
        table: String,
        item: WireItem,
    },
    Get {
        table: String,
        key: WireItem,
        projection: Option<Projection>,
    },
    Update {
        table: String,
        key: WireItem,
        update: UpdateExpression,
    },
    Delete {
        table: String,
        key: WireItem,
    },
    Scan {
        table: String,
        token: Option<ContinuationToken>,
    },
    Query {
        table: String,
        condition: KeyConditionExpression,
        index_name: Option<String>,
    },
}

/// Records every call and answers from canned responses.
#[derive(Default)]
pub struct MockBackend {
    calls: Mutex<Vec<Call>>,
    get_responses: Mutex<VecDeque<Option<WireItem>>>,
    scan_pages: Mutex<VecDeque<(Vec<WireItem>, Option<ContinuationToken>)>>,
    query_responses: Mutex<VecDeque<Vec<WireItem>>>,
    failure: Mutex<Option<StorageErrorKind>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond_to_get(self, item: Option<WireItem>) -> Self {
        self.get_responses.lock().unwrap().push_back(item);
        self
    }

    pub fn respond_to_scan(self, items: Vec<WireItem>, next: Option<ContinuationToken>) -> Self {
        self.scan_pages.lock().unwrap().push_back((items, next));
        self
    }

    pub fn respond_to_query(self, items: Vec<WireItem>) -> Self {
        self.query_responses.lock().unwrap().push_back(items);
        self
    }

    /// Fail every subsequent call with the given kind of error.
    pub fn failing_with(self, kind: StorageErrorKind) -> Self {
        *self.failure.lock().unwrap() = Some(kind);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(
        &self,
        call: Call,
        operation: Operation,
        table: &str,
        key: Option<&WireItem>,
    ) -> Result<(), StorageError> {
        self.calls.lock().unwrap().push(call);

        match *self.failure.lock().unwrap() {
            Some(kind) => {
                let error = StorageError::new(operation, kind, table, "mock failure");
                Err(match key {
                    Some(key) => error.with_key(crudop::describe_key(key)),
                    None => error,
                })
            }
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DynamoBackend for MockBackend {
    async fn put_item(&self, table: &str, item: WireItem) -> Result<(), StorageError> {
        self.record(
            Call::Put {
                table: table.to_string(),
                item,
            },
            Operation::PutItem,
            table,
            None,
        )
    }

    async fn get_item(
        &self,
        table: &str,
        key: WireItem,
        projection: Option<Projection>,
    ) -> Result<Option<WireItem>, StorageError> {
        self.record(
            Call::Get {
                table: table.to_string(),
                key: key.clone(),
                projection,
            },
            Operation::GetItem,
            table,
            Some(&key),
        )?;

        Ok(self.get_responses.lock().unwrap().pop_front().flatten())
    }

    async fn update_item(
        &self,
        table: &str,
        key: WireItem,
        update: UpdateExpression,
    ) -> Result<(), StorageError> {
        self.record(
            Call::Update {
                table: table.to_string(),
                key: key.clone(),
                update,
            },
            Operation::UpdateItem,
            table,
            Some(&key),
        )
    }

    async fn delete_item(&self, table: &str, key: WireItem) -> Result<(), StorageError> {
        self.record(
            Call::Delete {
                table: table.to_string(),
                key: key.clone(),
            },
            Operation::DeleteItem,
            table,
            Some(&key),
        )
    }

    async fn scan(
        &self,
        table: &str,
        token: Option<ContinuationToken>,
    ) -> Result<(Vec<WireItem>, Option<ContinuationToken>), StorageError> {
        self.record(
            Call::Scan {
                table: table.to_string(),
                token,
            },
            Operation::Scan,
            table,
            None,
        )?;

        Ok(self
            .scan_pages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default())
    }

    async fn query(
        &self,
        table: &str,
        condition: KeyConditionExpression,
        index_name: Option<&str>,
    ) -> Result<Vec<WireItem>, StorageError> {
        self.record(
            Call::Query {
                table: table.to_string(),
                condition,
                index_name: index_name.map(str::to_string),
            },
            Operation::Query,
            table,
            None,
        )?;

        Ok(self
            .query_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default())
    }
}

pub fn s(value: &str) -> AttributeValue {
    AttributeValue::S(value.to_string())
}

pub fn n(value: &str) -> AttributeValue {
    AttributeValue::N(value.to_string())
}

pub fn wire_item(entries: &[(&str, AttributeValue)]) -> WireItem {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

/// Assert that no string anywhere in `value` is empty.
pub fn assert_no_empty_strings(value: &AttributeValue) {
    match value {
        AttributeValue::S(s) => assert!(!s.is_empty(), "found a native empty string"),
        AttributeValue::Ss(ss) => assert!(ss.iter().all(|s| !s.is_empty())),
        AttributeValue::L(list) => list.iter().for_each(assert_no_empty_strings),
        AttributeValue::M(map) => map.values().for_each(assert_no_empty_strings),
        _ => {}
    }
}

pub async fn create_table(client: &Client, table_name: &str) {
    let _ = client.delete_table().table_name(table_name).send().await;

    client
        .create_table()
        .table_name(table_name)
        .attribute_definitions(
            AttributeDefinition::builder()
                .attribute_name("id")
                .attribute_type(ScalarAttributeType::S)
                .build()
                .expect("Failed to build attribute definition"),
        )
        .key_schema(
            KeySchemaElement::builder()
                .attribute_name("id")
                .key_type(KeyType::Hash)
                .build()
                .expect("Failed to build key schema element"),
        )
        .provisioned_throughput(
            ProvisionedThroughput::builder()
                .read_capacity_units(5)
                .write_capacity_units(5)
                .build()
                .expect("Failed to build provisioned throughput"),
        )
        .send()
        .await
        .expect("Failed to create table");
}

#[macro_export]
macro_rules! assert_err {
    ($cond:expr,) => {
        $crate::assert_err!($cond);
    };
    ($cond:expr) => {
        match $cond {
            Ok(t) => {
                panic!("assertion failed, expected Err(..), got Ok({:?})", t);
            },
            Err(e) => e,
        }
    };
    ($cond:expr, $($arg:tt)+) => {
        match $cond {
            Ok(t) => {
                panic!("assertion failed, expected Err(..), got Ok({:?}): {}", t, format_args!($($arg)+));
            },
            Err(e) => e,
        }
    };
}
