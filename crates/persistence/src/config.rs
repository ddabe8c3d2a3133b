//! Store configuration.
//!
//! Collection names, the logical database name and pool settings are
//! explicit configuration passed to [`Store`](crate::db::Store), never
//! process-wide variables.

use serde::Deserialize;

use crate::store::postgres::is_identifier;

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub database: DatabaseConfig,

    #[serde(default)]
    pub collections: CollectionNames,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// How `update` treats records currently owned by another group.
    #[serde(default)]
    pub update_policy: UpdatePolicy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,

    /// Logical database name; a Postgres schema.
    #[serde(default = "default_database_name")]
    pub name: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

/// Names of the four collections.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CollectionNames {
    #[serde(default = "default_users")]
    pub users: String,

    #[serde(default = "default_devices")]
    pub devices: String,

    #[serde(default = "default_events")]
    pub events: String,

    #[serde(default = "default_places")]
    pub places: String,
}

impl Default for CollectionNames {
    fn default() -> Self {
        Self {
            users: default_users(),
            devices: default_devices(),
            events: default_events(),
            places: default_places(),
        }
    }
}

impl CollectionNames {
    pub fn all(&self) -> [&str; 4] {
        [
            self.users.as_str(),
            self.devices.as_str(),
            self.events.as_str(),
            self.places.as_str(),
        ]
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Authorization rule for `update` on users, devices and places.
///
/// `update(group, entity)` always stamps `group` onto the record. The
/// policy decides whether the record must already belong to `group`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdatePolicy {
    /// Target by primary id only, so a group admin can move a record
    /// (for example a device) into their group.
    #[default]
    Reassign,

    /// Only records already in the caller's group can be updated; others
    /// are reported as not found.
    SameGroup,
}

fn default_database_name() -> String {
    "geotrace".to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_idle_timeout() -> u64 {
    600
}

fn default_users() -> String {
    "users".to_string()
}

fn default_devices() -> String {
    "devices".to_string()
}

fn default_events() -> String {
    "events".to_string()
}

fn default_places() -> String {
    "places".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl StoreConfig {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration with defaults
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with GT__ prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("GT").separator("__"))
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Build configuration from embedded defaults plus overrides.
    ///
    /// Creates a config without touching config files or the environment.
    /// Validation is skipped so that partial configs can be used.
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let defaults = r#"
            update_policy = "reassign"

            [database]
            url = ""
            name = "geotrace_test"
            max_connections = 5
            min_connections = 1
            connect_timeout_secs = 5
            idle_timeout_secs = 60

            [collections]
            users = "users"
            devices = "devices"
            events = "events"
            places = "places"

            [logging]
            level = "debug"
            format = "pretty"
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.database.url.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "GT__DATABASE__URL environment variable must be set".to_string(),
            ));
        }

        self.validate_names()?;

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigValidationError::InvalidValue(
                "min_connections cannot exceed max_connections".to_string(),
            ));
        }

        Ok(())
    }

    /// Database and collection names become SQL identifiers.
    pub fn validate_names(&self) -> Result<(), ConfigValidationError> {
        if !is_identifier(&self.database.name) {
            return Err(ConfigValidationError::InvalidValue(format!(
                "database name '{}' must be ASCII letters, digits or underscores",
                self.database.name
            )));
        }

        let names = self.collections.all();
        for (i, name) in names.iter().enumerate() {
            if !is_identifier(name) {
                return Err(ConfigValidationError::InvalidValue(format!(
                    "collection name '{}' must be ASCII letters, digits or underscores",
                    name
                )));
            }
            if names[..i].contains(name) {
                return Err(ConfigValidationError::InvalidValue(format!(
                    "collection name '{}' is used twice",
                    name
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_load_with_defaults() {
        let config = StoreConfig::load_for_test(&[("database.url", "postgres://localhost/test")])
            .expect("Failed to load config");

        assert_eq!(config.database.name, "geotrace_test");
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.collections, CollectionNames::default());
        assert_eq!(config.update_policy, UpdatePolicy::Reassign);
        assert_eq!(config.logging.level, "debug");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_overrides() {
        let config = StoreConfig::load_for_test(&[
            ("database.url", "postgres://localhost/test"),
            ("collections.events", "pings"),
            ("update_policy", "same_group"),
        ])
        .expect("Failed to load config");

        assert_eq!(config.collections.events, "pings");
        assert_eq!(config.collections.users, "users");
        assert_eq!(config.update_policy, UpdatePolicy::SameGroup);
    }

    #[test]
    fn test_config_validation_missing_db_url() {
        let config = StoreConfig::load_for_test(&[]).expect("Failed to load config");
        let result = config.validate();
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("GT__DATABASE__URL"));
    }

    #[test]
    fn test_config_validation_rejects_bad_collection_name() {
        let config = StoreConfig::load_for_test(&[
            ("database.url", "postgres://localhost/test"),
            ("collections.places", "places; drop"),
        ])
        .unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::InvalidValue(_))
        ));
    }

    #[test]
    fn test_config_validation_rejects_shared_collection() {
        let config = StoreConfig::load_for_test(&[
            ("database.url", "postgres://localhost/test"),
            ("collections.places", "devices"),
        ])
        .unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("used twice"));
    }

    #[test]
    fn test_config_validation_pool_bounds() {
        let config = StoreConfig::load_for_test(&[
            ("database.url", "postgres://localhost/test"),
            ("database.min_connections", "10"),
        ])
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_collection_names_default() {
        let names = CollectionNames::default();
        assert_eq!(names.all(), ["users", "devices", "events", "places"]);
    }
}
