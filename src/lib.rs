//! CRUD helpers for DynamoDB.
//!
//! `crudop` wraps the handful of calls most applications make against DynamoDB
//! (put, get, update, delete, scan and query) and takes care of the parts the raw
//! client leaves to you:
//!
//! - **Marshalling.** Items are built from [`Value`]s. Empty strings, which DynamoDB
//!   cannot store, are written as a sentinel and read back as `""`. Timestamps are
//!   written as ISO-8601 strings. See [`codec`].
//! - **Expressions.** Update, projection and key condition expressions are built with
//!   placeholders so attribute names like `name` or `status` never clash with DynamoDB
//!   reserved words. See [`expression`].
//! - **Configuration.** [`ClientFactory`] builds clients from explicit settings or the
//!   environment, and [`TableEnvironment`] gives per-environment table names.
//!
//! ```no_run
//! use crudop::{ClientFactory, Table, TableEnvironment};
//!
//! # async fn example() -> Result<(), crudop::Error> {
//! let client = ClientFactory::from_env()?.client().await;
//! let table = Table::new(client, TableEnvironment::from_env()?.table_name("employee"));
//!
//! table.put([("EMPNO", "1"), ("FIRSTNAME", "Ann"), ("MIDINIT", "")]).await?;
//! table.update(("EMPNO", "1"), [("JOB", "manager")]).await?;
//!
//! let employee = table.get_fields(("EMPNO", "1"), ["FIRSTNAME", "JOB"]).await?;
//! # Ok(())
//! # }
//! ```

pub mod clock;
pub mod codec;
pub mod config;
pub mod errors;
pub mod expression;
mod table;
mod value;

pub use clock::{Clock, FixedClock, SystemClock};
pub use codec::{Codec, StringCoercion, WireItem, EMPTY_STRING_SENTINEL};
pub use config::{ClientConfig, ClientFactory, TableEnvironment};
pub use errors::{Error, StorageError, ValidationError};
pub use expression::{KeyCondition, Operator, Projection, UpdateExpression};
pub use table::{describe_key, ContinuationToken, DynamoBackend, Key, ScanPage, Table};
pub use value::{get_attribute, Item, Timestamp, TryFromValue, Value};
