use crate::{
    codec::WireItem,
    errors::{Operation, StorageError, StorageErrorKind},
    expression::{KeyConditionExpression, Projection, UpdateExpression},
};
use async_trait::async_trait;
use aws_sdk_dynamodb::{
    error::{DisplayErrorContext, ProvideErrorMetadata, SdkError},
    types::AttributeValue,
    Client,
};
use itertools::Itertools;
use std::fmt::Debug;

/// Where a scan stopped. Pass it back to [`DynamoBackend::scan`] to continue.
#[derive(Debug, Clone, PartialEq)]
pub struct ContinuationToken(WireItem);

impl ContinuationToken {
    pub fn new(last_evaluated_key: WireItem) -> Self {
        Self(last_evaluated_key)
    }

    pub fn last_evaluated_key(&self) -> &WireItem {
        &self.0
    }

    pub fn into_inner(self) -> WireItem {
        self.0
    }
}

/// The storage operations `crudop` needs, in wire form.
///
/// Kept as close as possible to `aws_sdk_dynamodb::Client` so the implementation for
/// it stays trivial, and so tests can swap in a mock.
#[async_trait]
pub trait DynamoBackend: Send + Sync {
    async fn put_item(&self, table: &str, item: WireItem) -> Result<(), StorageError>;

    async fn get_item(
        &self,
        table: &str,
        key: WireItem,
        projection: Option<Projection>,
    ) -> Result<Option<WireItem>, StorageError>;

    async fn update_item(
        &self,
        table: &str,
        key: WireItem,
        update: UpdateExpression,
    ) -> Result<(), StorageError>;

    async fn delete_item(&self, table: &str, key: WireItem) -> Result<(), StorageError>;

    async fn scan(
        &self,
        table: &str,
        token: Option<ContinuationToken>,
    ) -> Result<(Vec<WireItem>, Option<ContinuationToken>), StorageError>;

    /// Return every item matching `condition`, following pagination.
    async fn query(
        &self,
        table: &str,
        condition: KeyConditionExpression,
        index_name: Option<&str>,
    ) -> Result<Vec<WireItem>, StorageError>;
}

#[async_trait]
impl<B: DynamoBackend + ?Sized> DynamoBackend for std::sync::Arc<B> {
    async fn put_item(&self, table: &str, item: WireItem) -> Result<(), StorageError> {
        (**self).put_item(table, item).await
    }

    async fn get_item(
        &self,
        table: &str,
        key: WireItem,
        projection: Option<Projection>,
    ) -> Result<Option<WireItem>, StorageError> {
        (**self).get_item(table, key, projection).await
    }

    async fn update_item(
        &self,
        table: &str,
        key: WireItem,
        update: UpdateExpression,
    ) -> Result<(), StorageError> {
        (**self).update_item(table, key, update).await
    }

    async fn delete_item(&self, table: &str, key: WireItem) -> Result<(), StorageError> {
        (**self).delete_item(table, key).await
    }

    async fn scan(
        &self,
        table: &str,
        token: Option<ContinuationToken>,
    ) -> Result<(Vec<WireItem>, Option<ContinuationToken>), StorageError> {
        (**self).scan(table, token).await
    }

    async fn query(
        &self,
        table: &str,
        condition: KeyConditionExpression,
        index_name: Option<&str>,
    ) -> Result<Vec<WireItem>, StorageError> {
        (**self).query(table, condition, index_name).await
    }
}

#[async_trait]
impl DynamoBackend for Client {
    async fn put_item(&self, table: &str, item: WireItem) -> Result<(), StorageError> {
        Client::put_item(self)
            .table_name(table)
            .set_item(Some(item))
            .send()
            .await
            .map_err(|e| storage_error(e, Operation::PutItem, table, None))?;

        Ok(())
    }

    async fn get_item(
        &self,
        table: &str,
        key: WireItem,
        projection: Option<Projection>,
    ) -> Result<Option<WireItem>, StorageError> {
        let key_description = describe_key(&key);
        let mut request = Client::get_item(self).table_name(table).set_key(Some(key));

        if let Some(projection) = projection.filter(|p| !p.is_empty()) {
            let names = projection.referenced_names();
            request = request.projection_expression(projection.expression);

            if !names.is_empty() {
                request = request.set_expression_attribute_names(Some(names));
            }
        }

        let result = request
            .send()
            .await
            .map_err(|e| storage_error(e, Operation::GetItem, table, Some(key_description)))?;

        Ok(result.item)
    }

    async fn update_item(
        &self,
        table: &str,
        key: WireItem,
        update: UpdateExpression,
    ) -> Result<(), StorageError> {
        let key_description = describe_key(&key);

        Client::update_item(self)
            .table_name(table)
            .set_key(Some(key))
            .update_expression(update.expression)
            .set_expression_attribute_names(Some(update.names))
            .set_expression_attribute_values(Some(update.values))
            .send()
            .await
            .map_err(|e| storage_error(e, Operation::UpdateItem, table, Some(key_description)))?;

        Ok(())
    }

    async fn delete_item(&self, table: &str, key: WireItem) -> Result<(), StorageError> {
        let key_description = describe_key(&key);

        Client::delete_item(self)
            .table_name(table)
            .set_key(Some(key))
            .send()
            .await
            .map_err(|e| storage_error(e, Operation::DeleteItem, table, Some(key_description)))?;

        Ok(())
    }

    async fn scan(
        &self,
        table: &str,
        token: Option<ContinuationToken>,
    ) -> Result<(Vec<WireItem>, Option<ContinuationToken>), StorageError> {
        let result = Client::scan(self)
            .table_name(table)
            .set_exclusive_start_key(token.map(ContinuationToken::into_inner))
            .send()
            .await
            .map_err(|e| storage_error(e, Operation::Scan, table, None))?;

        Ok((
            result.items.unwrap_or_default(),
            result
                .last_evaluated_key
                .filter(|key| !key.is_empty())
                .map(ContinuationToken::new),
        ))
    }

    async fn query(
        &self,
        table: &str,
        condition: KeyConditionExpression,
        index_name: Option<&str>,
    ) -> Result<Vec<WireItem>, StorageError> {
        let mut items = Vec::new();
        let mut start_key = None;

        loop {
            let result = Client::query(self)
                .table_name(table)
                .set_index_name(index_name.map(str::to_string))
                .key_condition_expression(&condition.expression)
                .set_expression_attribute_names(Some(condition.names.clone()))
                .set_expression_attribute_values(Some(condition.values.clone()))
                .set_exclusive_start_key(start_key)
                .send()
                .await
                .map_err(|e| storage_error(e, Operation::Query, table, None))?;

            items.extend(result.items.unwrap_or_default());

            match result.last_evaluated_key.filter(|key| !key.is_empty()) {
                Some(key) => start_key = Some(key),
                None => break,
            }
        }

        Ok(items)
    }
}

/// Map an SDK error to a [`StorageError`], classifying it by its error code.
pub(crate) fn storage_error<E, R>(
    err: SdkError<E, R>,
    operation: Operation,
    table: &str,
    key: Option<String>,
) -> StorageError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: Debug + Send + Sync + 'static,
{
    let kind = match err.code() {
        Some("ResourceNotFoundException") => StorageErrorKind::TableNotFound,
        Some("ConditionalCheckFailedException") => StorageErrorKind::ConditionalCheckFailed,
        Some(
            "ProvisionedThroughputExceededException"
            | "ThrottlingException"
            | "RequestLimitExceeded",
        ) => StorageErrorKind::Throttled,
        _ if matches!(err, SdkError::ServiceError(_)) => StorageErrorKind::Service,
        _ => StorageErrorKind::Transport,
    };

    let error = StorageError::new(
        operation,
        kind,
        table,
        DisplayErrorContext(&err).to_string(),
    );

    match key {
        Some(key) => error.with_key(key),
        None => error,
    }
}

/// Render a wire key as `name=value` pairs in name order, for error messages.
pub fn describe_key(key: &WireItem) -> String {
    key.iter()
        .sorted_by(|a, b| a.0.cmp(b.0))
        .map(|(name, value)| format!("{name}={}", describe_value(value)))
        .join(", ")
}

fn describe_value(value: &AttributeValue) -> String {
    match value {
        AttributeValue::S(s) => s.clone(),
        AttributeValue::N(n) => n.clone(),
        AttributeValue::Bool(b) => b.to_string(),
        AttributeValue::Null(_) => "null".to_string(),
        other => format!("{other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_dynamodb::{error::ErrorMetadata, operation::get_item::GetItemError};
    use std::collections::HashMap;

    fn service_error(code: &str) -> SdkError<GetItemError, ()> {
        let meta = ErrorMetadata::builder()
            .code(code)
            .message("request failed")
            .build();

        SdkError::service_error(GetItemError::generic(meta), ())
    }

    #[test]
    fn test_storage_error_kinds() {
        let cases = [
            ("ResourceNotFoundException", StorageErrorKind::TableNotFound),
            (
                "ConditionalCheckFailedException",
                StorageErrorKind::ConditionalCheckFailed,
            ),
            (
                "ProvisionedThroughputExceededException",
                StorageErrorKind::Throttled,
            ),
            ("ThrottlingException", StorageErrorKind::Throttled),
            ("ValidationException", StorageErrorKind::Service),
        ];

        for (code, kind) in cases {
            let error = storage_error(
                service_error(code),
                Operation::GetItem,
                "employee_development",
                Some("id=123".to_string()),
            );

            assert_eq!(error.kind, kind, "{code}");
            assert_eq!(error.operation, Operation::GetItem);
            assert_eq!(error.table, "employee_development");
            assert_eq!(error.key.as_deref(), Some("id=123"));
        }
    }

    #[test]
    fn test_transport_errors() {
        let err: SdkError<GetItemError, ()> = SdkError::timeout_error("connection timed out");
        let error = storage_error(err, Operation::Scan, "employee_development", None);

        assert_eq!(error.kind, StorageErrorKind::Transport);
        assert_eq!(error.key, None);
        assert!(error.is_retryable());
    }

    #[test]
    fn test_describe_key() {
        let key: WireItem = HashMap::from([
            ("sk".to_string(), AttributeValue::N("7".into())),
            ("pk".to_string(), AttributeValue::S("user-1".into())),
        ]);

        assert_eq!(describe_key(&key), "pk=user-1, sk=7");
    }

    #[test]
    fn test_continuation_token() {
        let key: WireItem = HashMap::from([("id".to_string(), AttributeValue::S("9".into()))]);
        let token = ContinuationToken::new(key.clone());

        assert_eq!(token.last_evaluated_key(), &key);
        assert_eq!(token.into_inner(), key);
    }
}
