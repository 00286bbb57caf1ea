use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::Path;
use tracing::info;

/// Prefix of the environment variables that override file settings.
pub const ENV_PREFIX: &str = "PSN";

/// Custom error type for config loading.
#[psn_derive::psn_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Loads a configuration structure from an optional file plus environment overrides.
///
/// Layering, lowest priority first:
/// 1. **Defaults**: whatever `T`'s `#[serde(default)]` attributes provide.
/// 2. **File**: when `path` is given the file must exist; its format follows the extension
///    (`.toml`, `.json`, `.yaml`).
/// 3. **Environment**: variables prefixed with `PSN__`, nested with `__`
///    (e.g. `PSN__STORAGE__DATA_DIR` maps to `storage.data_dir`).
///
/// # Errors
/// Returns [`ConfigError::Config`] if the file is missing or malformed, or if the merged
/// sources do not match the structure of `T`.
///
/// # Example
/// ```rust
/// use psn_kernel::config::load_config;
///
/// #[derive(Default, serde::Deserialize)]
/// struct CounterConfig {
///     #[serde(default)]
///     data_dir: String,
/// }
///
/// let cfg: CounterConfig = load_config(None::<&str>).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    layered(path, environment())
}

/// `PSN__`-prefixed variables, nested with `__`. Keys are lowercased by the source itself.
fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX).separator("__")
}

fn layered<T>(path: Option<impl AsRef<Path>>, environment: Environment) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let mut builder = Config::builder();

    if let Some(path) = path {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading configuration file");
        builder = builder.add_source(File::from(path).required(true));
    }

    let config = builder
        .add_source(environment)
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use psn_domain::config::ServiceConfig;

    fn variables(pairs: &[(&str, &str)]) -> config::Map<String, String> {
        pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect()
    }

    #[test]
    fn nested_variables_reach_nested_keys() {
        let env = environment().source(Some(variables(&[
            ("PSN__STORAGE__DATA_DIR", "/srv/psn"),
            ("PSN__DEFAULTS__ALGORITHM", "MD5"),
            ("PSN__DEFAULTS__SALT", "pepper"),
        ])));

        let cfg: ServiceConfig = layered(None::<&str>, env).unwrap();
        assert_eq!(cfg.storage.data_dir, std::path::PathBuf::from("/srv/psn"));
        assert_eq!(cfg.defaults.algorithm, "MD5");
        assert_eq!(cfg.defaults.salt, "pepper");
    }
}
