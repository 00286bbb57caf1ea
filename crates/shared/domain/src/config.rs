use crate::attributes::DomainAttributes;
use crate::constants::{
    DEFAULT_ALGORITHM, DEFAULT_ALPHABET, DEFAULT_PADDING_CHAR, DEFAULT_PSEUDONYM_LENGTH,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;

/// Top-level service configuration.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfigInner {
    pub logging: LoggingConfig,
    pub storage: StorageConfig,
    pub defaults: AttributeDefaults,
    pub domains: Vec<DomainSeed>,
}

/// Thin Arc-wrapped config for inexpensive cloning into subsystems.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    #[serde(flatten, default)]
    inner: Arc<ServiceConfigInner>,
}

impl Deref for ServiceConfig {
    type Target = ServiceConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for ServiceConfig {
    fn deref_mut(&mut self) -> &mut ServiceConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// Logging sinks and verbosity.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub name: String,
    pub level: String,
    pub console: bool,
    pub json: bool,
    pub directory: Option<PathBuf>,
    pub env_filter: Option<String>,
}

/// Root directory of the persisted counter state.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub create: bool,
}

/// System default of every inheritable attribute.
///
/// A domain whose ancestors leave an attribute unset resolves it to the value held here.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AttributeDefaults {
    pub algorithm: String,
    pub alphabet: String,
    pub pseudonym_length: usize,
    pub padding_char: char,
    pub padding_enabled: bool,
    pub add_check_digit: bool,
    pub check_digit_counts_toward_length: bool,
    pub multiple_pseudonyms_allowed: bool,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_to: Option<DateTime<Utc>>,
    pub enforce_start_date_validity: bool,
    pub enforce_end_date_validity: bool,
    pub salt: String,
    pub consecutive_counter: i64,
}

/// A domain declared in the configuration file and created at start-up.
///
/// `parent` refers to another seed by name; seeds may appear in any order.
#[derive(Debug, Clone, Deserialize)]
pub struct DomainSeed {
    pub name: String,
    pub prefix: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(flatten, default)]
    pub attributes: DomainAttributes,
}

// --- Default ---

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            name: "psn".to_owned(),
            level: "info".to_owned(),
            console: true,
            json: false,
            directory: None,
            env_filter: None,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { data_dir: PathBuf::from("data"), create: true }
    }
}

impl Default for AttributeDefaults {
    fn default() -> Self {
        Self {
            algorithm: DEFAULT_ALGORITHM.to_owned(),
            alphabet: DEFAULT_ALPHABET.to_owned(),
            pseudonym_length: DEFAULT_PSEUDONYM_LENGTH,
            padding_char: DEFAULT_PADDING_CHAR,
            padding_enabled: true,
            add_check_digit: true,
            check_digit_counts_toward_length: false,
            multiple_pseudonyms_allowed: false,
            valid_from: None,
            valid_to: None,
            enforce_start_date_validity: false,
            enforce_end_date_validity: false,
            salt: String::new(),
            consecutive_counter: 0,
        }
    }
}
