mod common;

use crudop::{errors::ConfigError, ClientFactory, TableEnvironment};
use serial_test::serial;
use std::env;

const VARS: &[&str] = &[
    "TEST",
    "TARGET_ENVIRONMENT",
    "AWS_REGION",
    "AWS_DEFAULT_REGION",
    "AWS_ACCESS_KEY_ID",
    "AWS_SECRET_ACCESS_KEY",
    "DYNAMODB_ENDPOINT",
];

fn clear_env() {
    for var in VARS {
        env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_table_environment_from_env() {
    clear_env();

    env::set_var("TARGET_ENVIRONMENT", "production");
    let environment = TableEnvironment::from_env().expect("Failed to read environment");
    assert_eq!(environment.table_name("employee"), "employee_production");

    env::set_var("TEST", "true");
    let environment = TableEnvironment::from_env().expect("Failed to read environment");
    assert_eq!(environment.table_name("employee"), "employee_development");

    clear_env();
    let err = assert_err!(TableEnvironment::from_env());
    assert_eq!(err, ConfigError::MissingEnvVar("TARGET_ENVIRONMENT"));
}

#[test]
#[serial]
fn test_client_factory_from_env() {
    clear_env();

    env::set_var("AWS_REGION", "eu-central-1");
    env::set_var("AWS_ACCESS_KEY_ID", "AKID");
    env::set_var("AWS_SECRET_ACCESS_KEY", "secret");
    env::set_var("DYNAMODB_ENDPOINT", "http://localhost:8000");

    let factory = ClientFactory::from_env().expect("Failed to read environment");
    let config = factory.config();

    assert_eq!(config.region.as_deref(), Some("eu-central-1"));
    assert_eq!(config.endpoint_url.as_deref(), Some("http://localhost:8000"));
    assert_eq!(
        config
            .credentials
            .as_ref()
            .map(|c| c.access_key_id.as_str()),
        Some("AKID")
    );

    env::remove_var("AWS_SECRET_ACCESS_KEY");
    let err = assert_err!(ClientFactory::from_env());
    assert_eq!(
        err,
        ConfigError::IncompleteCredentials("AWS_ACCESS_KEY_ID", "AWS_SECRET_ACCESS_KEY")
    );

    clear_env();
}
