//! Client and table configuration.
//!
//! Nothing in the codec or the expression builders reads configuration. It is resolved
//! here, once, by the caller before any client is built.

mod environment;

pub use environment::TableEnvironment;

use crate::errors::ConfigError;
use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::{
    config::{Credentials, Region},
    Client,
};
use log::info;
use std::fmt;

pub(crate) const REGION_VAR: &str = "AWS_REGION";
pub(crate) const DEFAULT_REGION_VAR: &str = "AWS_DEFAULT_REGION";
pub(crate) const ACCESS_KEY_ID_VAR: &str = "AWS_ACCESS_KEY_ID";
pub(crate) const SECRET_ACCESS_KEY_VAR: &str = "AWS_SECRET_ACCESS_KEY";
pub(crate) const ENDPOINT_VAR: &str = "DYNAMODB_ENDPOINT";

const CREDENTIALS_PROVIDER_NAME: &str = "crudop";

/// A static access key pair.
#[derive(Clone, PartialEq, Eq)]
pub struct StaticCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

// Keep the secret out of logs
impl fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"** redacted **")
            .finish()
    }
}

/// Settings for building a DynamoDB client.
///
/// Anything left unset falls back to the AWS SDK defaults (profile, instance metadata
/// and so on).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientConfig {
    pub region: Option<String>,
    pub credentials: Option<StaticCredentials>,
    pub endpoint_url: Option<String>,
}

impl ClientConfig {
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }
}

#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    region: Option<String>,
    access_key_id: Option<String>,
    secret_access_key: Option<String>,
    endpoint_url: Option<String>,
}

impl ClientConfigBuilder {
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn credentials(
        mut self,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        self.access_key_id = Some(access_key_id.into());
        self.secret_access_key = Some(secret_access_key.into());
        self
    }

    /// Send requests somewhere other than the regional endpoint, e.g. DynamoDB Local.
    pub fn endpoint_url(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = Some(endpoint_url.into());
        self
    }

    /// Fill in anything not already set from the environment.
    ///
    /// Reads `AWS_REGION` (or `AWS_DEFAULT_REGION`), `AWS_ACCESS_KEY_ID`,
    /// `AWS_SECRET_ACCESS_KEY` and `DYNAMODB_ENDPOINT`.
    pub fn with_env(self) -> Self {
        self.with_env_source(|name| std::env::var(name).ok())
    }

    pub(crate) fn with_env_source(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| var(name).filter(|value| !value.is_empty());

        self.region = self
            .region
            .or_else(|| var(REGION_VAR))
            .or_else(|| var(DEFAULT_REGION_VAR));
        self.access_key_id = self.access_key_id.or_else(|| var(ACCESS_KEY_ID_VAR));
        self.secret_access_key = self
            .secret_access_key
            .or_else(|| var(SECRET_ACCESS_KEY_VAR));
        self.endpoint_url = self.endpoint_url.or_else(|| var(ENDPOINT_VAR));
        self
    }

    pub fn build(self) -> Result<ClientConfig, ConfigError> {
        let credentials = match (self.access_key_id, self.secret_access_key) {
            (Some(access_key_id), Some(secret_access_key)) => Some(StaticCredentials {
                access_key_id,
                secret_access_key,
            }),
            (None, None) => None,
            (Some(_), None) => {
                return Err(ConfigError::IncompleteCredentials(
                    ACCESS_KEY_ID_VAR,
                    SECRET_ACCESS_KEY_VAR,
                ))
            }
            (None, Some(_)) => {
                return Err(ConfigError::IncompleteCredentials(
                    SECRET_ACCESS_KEY_VAR,
                    ACCESS_KEY_ID_VAR,
                ))
            }
        };

        if let Some(endpoint) = &self.endpoint_url {
            if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
                return Err(ConfigError::InvalidValue(ENDPOINT_VAR, endpoint.clone()));
            }
        }

        Ok(ClientConfig {
            region: self.region,
            credentials,
            endpoint_url: self.endpoint_url,
        })
    }
}

/// Builds DynamoDB clients from a [`ClientConfig`].
///
/// Create one, build a client, and pass the client (or a [`crate::Table`] wrapping it)
/// to whatever needs it. Clients are cheap to clone and share a connection pool.
#[derive(Debug, Clone)]
pub struct ClientFactory {
    config: ClientConfig,
}

impl ClientFactory {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    /// A factory configured entirely from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::new(ClientConfig::builder().with_env().build()?))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub async fn sdk_config(&self) -> aws_config::SdkConfig {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());

        if let Some(region) = &self.config.region {
            loader = loader.region(Region::new(region.clone()));
        }

        if let Some(credentials) = &self.config.credentials {
            loader = loader.credentials_provider(Credentials::new(
                credentials.access_key_id.clone(),
                credentials.secret_access_key.clone(),
                None,
                None,
                CREDENTIALS_PROVIDER_NAME,
            ));
        }

        if let Some(endpoint_url) = &self.config.endpoint_url {
            loader = loader.endpoint_url(endpoint_url.clone());
        }

        loader.load().await
    }

    pub async fn client(&self) -> Client {
        info!(
            "Building DynamoDB client (region: {}, endpoint: {}, static credentials: {})",
            self.config.region.as_deref().unwrap_or("default"),
            self.config.endpoint_url.as_deref().unwrap_or("default"),
            self.config.credentials.is_some()
        );

        Client::new(&self.sdk_config().await)
    }
}
