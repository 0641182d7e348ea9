mod backend;
mod key;

pub use self::{
    backend::{describe_key, ContinuationToken, DynamoBackend},
    key::Key,
};
use crate::{
    clock::{Clock, SystemClock},
    codec::{Codec, WireItem},
    errors::{DeleteError, GetError, PutError, QueryError, ScanError, UpdateError},
    expression::{FieldName, KeyCondition, Projection, UpdateExpression},
    value::{Item, Value},
};
use aws_sdk_dynamodb::Client;
use log::{debug, info};
use std::sync::Arc;

/// One page of a scan.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanPage {
    pub items: Vec<Item>,
    /// Present when there are more items to read.
    pub next: Option<ContinuationToken>,
}

/// CRUD access to a single DynamoDB table.
///
/// Values are encoded on the way in and decoded on the way out with the table's
/// [`Codec`]. Every update also sets `last_synced_at` from the table's [`Clock`].
pub struct Table<B = Client> {
    backend: B,
    name: String,
    codec: Codec,
    clock: Arc<dyn Clock>,
    key_names: Vec<String>,
}

impl<B: DynamoBackend> Table<B> {
    pub fn new(backend: B, name: impl Into<String>) -> Self {
        Self {
            backend,
            name: name.into(),
            codec: Codec::default(),
            clock: Arc::new(SystemClock),
            key_names: Vec::new(),
        }
    }

    pub fn with_codec(mut self, codec: Codec) -> Self {
        self.codec = codec;
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// The table's key attributes. Only used to name the offending item when a put
    /// fails; other operations are given their key explicitly.
    pub fn with_key_names<I>(mut self, names: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.key_names = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn codec(&self) -> Codec {
        self.codec
    }

    /// Write a whole item, replacing any existing item with the same key.
    pub async fn put<I, K, V>(&self, item: I) -> Result<(), PutError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let item: Item = item.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        debug!("Putting item with {} attributes into {}", item.len(), self.name);

        let item = self.codec.encode_item(item)?;
        let key = self.describe_item_key(&item);

        self.backend
            .put_item(&self.name, item)
            .await
            .map_err(|err| match key {
                Some(key) if err.key.is_none() => err.with_key(key),
                _ => err,
            })?;

        Ok(())
    }

    fn describe_item_key(&self, item: &WireItem) -> Option<String> {
        let key: WireItem = item
            .iter()
            .filter(|(name, _)| self.key_names.contains(name))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();

        (!key.is_empty()).then(|| describe_key(&key))
    }

    /// Read a whole item.
    pub async fn get(&self, key: impl Into<Key>) -> Result<Option<Item>, GetError> {
        self.get_fields(key, Vec::<String>::new()).await
    }

    /// Read only `fields` of an item. An empty list reads the whole item.
    pub async fn get_fields<F>(
        &self,
        key: impl Into<Key>,
        fields: F,
    ) -> Result<Option<Item>, GetError>
    where
        F: IntoIterator,
        F::Item: FieldName,
    {
        let key = key.into();
        let projection = Projection::build(fields)?;
        debug!("Getting [{key}] from {}", self.name);

        let item = self
            .backend
            .get_item(
                &self.name,
                key.to_wire()?,
                (!projection.is_empty()).then_some(projection),
            )
            .await?;

        Ok(item
            .map(|item| self.codec.decode_item(item))
            .transpose()?)
    }

    /// Set the given attributes on an existing item, leaving all others untouched.
    pub async fn update<I, K, V>(&self, key: impl Into<Key>, updates: I) -> Result<(), UpdateError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let key = key.into();
        let update = UpdateExpression::build(updates, self.clock.as_ref())?;
        debug!("Updating [{key}] in {}: {}", self.name, update.expression);

        self.backend
            .update_item(&self.name, key.to_wire()?, update)
            .await?;

        Ok(())
    }

    pub async fn delete(&self, key: impl Into<Key>) -> Result<(), DeleteError> {
        let key = key.into();
        debug!("Deleting [{key}] from {}", self.name);

        self.backend.delete_item(&self.name, key.to_wire()?).await?;

        Ok(())
    }

    /// Read one page of the table, starting after `token` if given.
    pub async fn scan(&self, token: Option<ContinuationToken>) -> Result<ScanPage, ScanError> {
        let (items, next) = self.backend.scan(&self.name, token).await?;

        let items = items
            .into_iter()
            .map(|item| self.codec.decode_item(item))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ScanPage { items, next })
    }

    /// Read the whole table, following continuation tokens until the last page.
    pub async fn scan_all(&self) -> Result<Vec<Item>, ScanError> {
        let mut items = Vec::new();
        let mut token = None;
        let mut pages = 0usize;

        loop {
            let page = self.scan(token).await?;
            pages += 1;
            items.extend(page.items);

            match page.next {
                Some(next) => token = Some(next),
                None => break,
            }
        }

        info!("Scanned {} items from {} in {pages} pages", items.len(), self.name);
        Ok(items)
    }

    /// Query the table by key.
    pub async fn query(&self, condition: KeyCondition) -> Result<Vec<Item>, QueryError> {
        self.run_query(condition, None).await
    }

    /// Query a secondary index by its key.
    pub async fn query_index(
        &self,
        index_name: &str,
        condition: KeyCondition,
    ) -> Result<Vec<Item>, QueryError> {
        self.run_query(condition, Some(index_name)).await
    }

    async fn run_query(
        &self,
        condition: KeyCondition,
        index_name: Option<&str>,
    ) -> Result<Vec<Item>, QueryError> {
        let condition = condition.build()?;
        debug!(
            "Querying {}{} with {}",
            self.name,
            index_name.map(|i| format!(" ({i})")).unwrap_or_default(),
            condition.expression
        );

        let items = self
            .backend
            .query(&self.name, condition, index_name)
            .await?;

        Ok(items
            .into_iter()
            .map(|item| self.codec.decode_item(item))
            .collect::<Result<Vec<_>, _>>()?)
    }
}
