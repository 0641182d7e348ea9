use crate::errors::ConfigError;

const TEST_VAR: &str = "TEST";
const TARGET_ENVIRONMENT_VAR: &str = "TARGET_ENVIRONMENT";
const TEST_SUFFIX: &str = "development";

/// Deployment environment used to pick per-environment table names.
///
/// Tables are named `<table>_<environment>`, so `employee` is `employee_production` in
/// production and `employee_development` under test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableEnvironment {
    suffix: String,
}

impl TableEnvironment {
    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
        }
    }

    /// `development` when `TEST=true`, otherwise the value of `TARGET_ENVIRONMENT`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_source(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_env_source(
        var: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if var(TEST_VAR).as_deref() == Some("true") {
            return Ok(Self::new(TEST_SUFFIX));
        }

        match var(TARGET_ENVIRONMENT_VAR) {
            Some(suffix) if !suffix.trim().is_empty() => Ok(Self::new(suffix.trim())),
            Some(suffix) => Err(ConfigError::InvalidValue(TARGET_ENVIRONMENT_VAR, suffix)),
            None => Err(ConfigError::MissingEnvVar(TARGET_ENVIRONMENT_VAR)),
        }
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn table_name(&self, table: &str) -> String {
        format!("{table}_{}", self.suffix)
    }
}
