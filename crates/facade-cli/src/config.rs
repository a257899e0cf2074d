//! Generator configuration loading.
//!
//! The configuration file is TOML with the fields of
//! [`GeneratorConfig`]; every field is optional:
//!
//! ```toml
//! class_name = "PetStore"
//! default_namespace = "default"
//! async_suffix = "_async"
//! ```

use anyhow::{Context, Result};
use facade_core::GeneratorConfig;
use std::path::Path;
use tracing::debug;

/// Loads the generator configuration.
///
/// Without a path the defaults are used. A `class_name` override, when
/// given, replaces the file's value. The result is validated.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid TOML, or the
/// resulting configuration fails validation.
pub fn load_config(path: Option<&Path>, class_name: Option<String>) -> Result<GeneratorConfig> {
    let config = match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            let config: GeneratorConfig = toml::from_str(&content)
                .with_context(|| format!("failed to parse config file {}", path.display()))?;
            debug!(path = %path.display(), "loaded configuration file");
            config
        }
        None => GeneratorConfig::default(),
    }
    .with_class_name(class_name);

    config.validate().context("invalid generator configuration")?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_without_file() {
        let config = load_config(None, None).unwrap();
        assert_eq!(config, GeneratorConfig::default());
    }

    #[test]
    fn test_file_values_and_override() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("facade.toml");
        fs::write(&path, "class_name = \"PetStore\"\nasync_suffix = \"_coro\"\n").unwrap();

        let from_file = load_config(Some(&path), None).unwrap();
        assert_eq!(from_file.class_name, "PetStore");
        assert_eq!(from_file.async_suffix, "_coro");
        assert_eq!(from_file.endpoints_module, "api");

        let overridden = load_config(Some(&path), Some("Sdk".to_string())).unwrap();
        assert_eq!(overridden.class_name, "Sdk");
        assert_eq!(overridden.async_suffix, "_coro");
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Some(Path::new("/nonexistent/facade.toml")), None).unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }

    #[test]
    fn test_malformed_toml() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("facade.toml");
        fs::write(&path, "class_name = [").unwrap();

        let err = load_config(Some(&path), None).unwrap_err();
        assert!(err.to_string().contains("failed to parse config file"));
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let err = load_config(None, Some("not valid".to_string())).unwrap_err();
        assert_eq!(err.to_string(), "invalid generator configuration");
        assert!(format!("{err:#}").contains("invalid class_name 'not valid'"));
    }
}
