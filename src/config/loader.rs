//! Configuration Loader
//!
//! Environment-aware configuration loading: YAML file discovery, environment
//! detection, override merging and `${VAR}` expansion.

use super::error::{ConfigResult, ConfigurationError};
use super::WorkflowConfig;
use serde_yaml::Value as YamlValue;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

const CONFIG_FILE_NAMES: [&str; 2] = ["labflow-config.yaml", "labflow-config.yml"];
const ENVIRONMENT_SECTIONS: [&str; 3] = ["development", "test", "production"];

/// Loaded configuration plus where it came from
#[derive(Debug)]
pub struct ConfigManager {
    config: WorkflowConfig,
    environment: String,
    config_directory: PathBuf,
}

impl ConfigManager {
    /// Load configuration with environment auto-detection
    pub fn load() -> ConfigResult<Arc<ConfigManager>> {
        Self::load_from_directory(None)
    }

    /// Load configuration from a specific directory
    pub fn load_from_directory(config_dir: Option<PathBuf>) -> ConfigResult<Arc<ConfigManager>> {
        let environment = Self::detect_environment();
        Self::load_from_directory_with_env(config_dir, &environment)
    }

    /// Load configuration from a specific directory with explicit environment.
    /// Tests use this to avoid touching process-wide environment variables.
    pub fn load_from_directory_with_env(
        config_dir: Option<PathBuf>,
        environment: &str,
    ) -> ConfigResult<Arc<ConfigManager>> {
        let config_directory = config_dir.unwrap_or_else(Self::default_config_directory);

        debug!(
            "Loading configuration for environment '{}' from directory: {}",
            environment,
            config_directory.display()
        );

        let mut config = Self::load_and_merge_config(&config_directory, environment)?;
        Self::expand_environment_variables(&mut config)?;
        config.validate()?;

        let sanitized_config = Self::sanitize_config_for_logging(&config);
        debug!(
            "Configuration loaded successfully: {}",
            serde_json::to_string_pretty(&sanitized_config)
                .unwrap_or_else(|_| "[serialization error]".to_string())
        );

        info!(
            environment = %environment,
            sweep_interval_seconds = config.sweeper.interval_seconds,
            reminder_interval_days = config.sweeper.reminder_interval_days,
            mail_enabled = config.mail.enabled,
            "⚙️ CONFIG: Loaded workflow configuration"
        );

        Ok(Arc::new(ConfigManager {
            config,
            environment: environment.to_string(),
            config_directory,
        }))
    }

    /// Wrap an already-built configuration (tests, embedding applications)
    pub fn from_config(config: WorkflowConfig) -> ConfigResult<Arc<ConfigManager>> {
        config.validate()?;
        Ok(Arc::new(ConfigManager {
            environment: config.environment.clone(),
            config,
            config_directory: PathBuf::from("config"),
        }))
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// Configuration as JSON with sensitive values masked
    pub fn debug_config(&self) -> serde_json::Value {
        Self::sanitize_config_for_logging(&self.config)
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn config_directory(&self) -> &Path {
        &self.config_directory
    }

    /// LABFLOW_ENV || APP_ENV || 'development', lowercased
    pub fn detect_environment() -> String {
        env::var("LABFLOW_ENV")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string())
            .to_lowercase()
    }

    fn default_config_directory() -> PathBuf {
        if let Ok(dir) = env::var("LABFLOW_CONFIG_DIR") {
            return PathBuf::from(dir);
        }
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config")
    }

    /// Read a configuration file, refusing oversized or non-regular files
    fn read_config_file_safely(path: &Path) -> ConfigResult<String> {
        const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

        let metadata = std::fs::metadata(path)
            .map_err(|e| ConfigurationError::file_read_error(path.display().to_string(), e))?;

        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigurationError::invalid_value(
                "file_size",
                metadata.len().to_string(),
                format!("Configuration file exceeds {MAX_CONFIG_FILE_SIZE} bytes"),
            ));
        }

        if !metadata.is_file() {
            return Err(ConfigurationError::invalid_value(
                "file_type",
                "directory or special file",
                "Configuration path must point to a regular file",
            ));
        }

        std::fs::read_to_string(path)
            .map_err(|e| ConfigurationError::file_read_error(path.display().to_string(), e))
    }

    fn sanitize_config_for_logging(config: &WorkflowConfig) -> serde_json::Value {
        let mut config_json = serde_json::json!(config);
        let sensitive_patterns = ["password", "secret", "token", "credential", "url"];
        Self::sanitize_json_recursive(&mut config_json, &sensitive_patterns);
        config_json
    }

    fn sanitize_json_recursive(value: &mut serde_json::Value, sensitive_patterns: &[&str]) {
        match value {
            serde_json::Value::Object(map) => {
                for (key, val) in map.iter_mut() {
                    let key_lower = key.to_lowercase();
                    let is_sensitive = sensitive_patterns
                        .iter()
                        .any(|pattern| key_lower.contains(pattern));

                    if !is_sensitive {
                        Self::sanitize_json_recursive(val, sensitive_patterns);
                        continue;
                    }

                    *val = match val {
                        serde_json::Value::Null => serde_json::Value::Null,
                        serde_json::Value::String(s) if s.is_empty() => {
                            serde_json::Value::String("[EMPTY]".to_string())
                        }
                        serde_json::Value::String(s) => {
                            let chars: Vec<char> = s.chars().collect();
                            let masked = if chars.len() > 4 {
                                let head: String = chars[..2].iter().collect();
                                let tail: String = chars[chars.len() - 2..].iter().collect();
                                format!("{head}***{tail}")
                            } else {
                                "***".to_string()
                            };
                            serde_json::Value::String(format!("[MASKED: {masked}]"))
                        }
                        _ => serde_json::Value::String("[MASKED]".to_string()),
                    };
                }
            }
            serde_json::Value::Array(items) => {
                for item in items.iter_mut() {
                    Self::sanitize_json_recursive(item, sensitive_patterns);
                }
            }
            _ => {}
        }
    }

    fn find_config_file(config_directory: &Path) -> ConfigResult<PathBuf> {
        let mut searched_paths = Vec::new();

        for name in CONFIG_FILE_NAMES {
            let config_path = config_directory.join(name);
            if config_path.exists() {
                debug!("Found configuration file: {}", config_path.display());
                return Ok(config_path);
            }
            searched_paths.push(config_path);
        }

        Err(ConfigurationError::config_file_not_found(searched_paths))
    }

    /// Load the base file and merge the environment section over it
    fn load_and_merge_config(
        config_directory: &Path,
        environment: &str,
    ) -> ConfigResult<WorkflowConfig> {
        let config_file = Self::find_config_file(config_directory)?;
        let yaml_content = Self::read_config_file_safely(&config_file)?;

        let mut yaml_data: YamlValue = serde_yaml::from_str(&yaml_content)
            .map_err(|e| ConfigurationError::invalid_yaml(config_file.display().to_string(), e))?;

        if let Some(env_overrides) = yaml_data
            .get(YamlValue::String(environment.to_string()))
            .cloned()
        {
            debug!("Applying environment-specific overrides for: {}", environment);
            Self::merge_yaml_values(&mut yaml_data, env_overrides);
        }

        if let YamlValue::Mapping(ref mut map) = yaml_data {
            for section in ENVIRONMENT_SECTIONS {
                map.remove(YamlValue::String(section.to_string()));
            }
        }

        let mut config: WorkflowConfig = serde_yaml::from_value(yaml_data).map_err(|e| {
            ConfigurationError::invalid_yaml(
                config_file.display().to_string(),
                format!("Failed to deserialize configuration: {e}"),
            )
        })?;

        config.environment = environment.to_string();
        Ok(config)
    }

    /// Recursively merge YAML values (environment overrides into base config)
    fn merge_yaml_values(base: &mut YamlValue, override_value: YamlValue) {
        match (&mut *base, override_value) {
            (YamlValue::Mapping(base_map), YamlValue::Mapping(override_map)) => {
                for (key, value) in override_map {
                    if let Some(existing_value) = base_map.get_mut(&key) {
                        Self::merge_yaml_values(existing_value, value);
                    } else {
                        base_map.insert(key, value);
                    }
                }
            }
            (base_ref, override_val) => {
                *base_ref = override_val;
            }
        }
    }

    /// Expand `${VAR}` references in the database URL
    fn expand_environment_variables(config: &mut WorkflowConfig) -> ConfigResult<()> {
        let Some(var_name) = config
            .database
            .url
            .as_deref()
            .and_then(|url| url.strip_prefix("${"))
            .and_then(|rest| rest.strip_suffix('}'))
            .map(str::to_string)
        else {
            return Ok(());
        };

        if var_name.is_empty() {
            return Err(ConfigurationError::environment_variable_error(
                "",
                "empty variable reference in database.url",
            ));
        }

        match env::var(&var_name) {
            Ok(value) => {
                debug!("Expanding environment variable {} in database URL", var_name);
                config.database.url = Some(value);
            }
            Err(_) => {
                warn!(
                    "Environment variable {} not found, database URL left unset",
                    var_name
                );
                config.database.url = None;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_config_yaml() -> &'static str {
        r#"
database:
  url: "${LABFLOW_LOADER_TEST_UNSET_URL}"
  max_connections: 5

sweeper:
  interval_seconds: 900
  reminder_interval_days: 2
  batch_size: 100

dispatcher:
  max_attempts: 3

templates:
  portal_name: "Deutsche Aligners"

mail:
  enabled: false
  smtp_host: "smtp.example.com"
  password: "super-secret"

test:
  sweeper:
    interval_seconds: 1
  dispatcher:
    backoff_base_ms: 1

production:
  sweeper:
    day_boundary_utc_offset_minutes: 60
  mail:
    enabled: true
"#
    }

    fn setup_test_config_dir() -> (TempDir, PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let config_dir = temp_dir.path().to_path_buf();
        fs::write(config_dir.join("labflow-config.yaml"), create_test_config_yaml()).unwrap();
        (temp_dir, config_dir)
    }

    #[test]
    fn test_config_file_discovery() {
        let (_temp_dir, config_dir) = setup_test_config_dir();
        let config_file = ConfigManager::find_config_file(&config_dir).unwrap();
        assert_eq!(config_file.file_name().unwrap(), "labflow-config.yaml");
    }

    #[test]
    fn test_config_file_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let result = ConfigManager::find_config_file(temp_dir.path());

        if let Err(ConfigurationError::ConfigFileNotFound { searched_paths }) = result {
            assert_eq!(searched_paths.len(), 2);
        } else {
            panic!("Expected ConfigFileNotFound error");
        }
    }

    #[test]
    fn test_environment_specific_overrides() {
        let (_temp_dir, config_dir) = setup_test_config_dir();

        let manager =
            ConfigManager::load_from_directory_with_env(Some(config_dir.clone()), "test").unwrap();
        let config = manager.config();
        assert_eq!(manager.environment(), "test");
        assert_eq!(config.sweeper.interval_seconds, 1);
        assert_eq!(config.sweeper.batch_size, 100);
        assert_eq!(config.dispatcher.backoff_base_ms, 1);
        assert_eq!(config.dispatcher.max_attempts, 3);
        assert!(!config.mail.enabled);

        let manager =
            ConfigManager::load_from_directory_with_env(Some(config_dir), "production").unwrap();
        let config = manager.config();
        assert_eq!(config.sweeper.interval_seconds, 900);
        assert_eq!(config.sweeper.day_boundary_utc_offset_minutes, Some(60));
        assert!(config.mail.enabled);
    }

    #[test]
    fn test_unset_database_variable_clears_url() {
        let (_temp_dir, config_dir) = setup_test_config_dir();
        let manager =
            ConfigManager::load_from_directory_with_env(Some(config_dir), "development").unwrap();
        assert!(manager.config().database.url.is_none());
        assert_eq!(manager.config().database.max_connections, 5);
    }

    #[test]
    fn test_invalid_values_fail_validation() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("labflow-config.yml"),
            "sweeper:\n  interval_seconds: 0\n",
        )
        .unwrap();

        let result =
            ConfigManager::load_from_directory_with_env(Some(temp_dir.path().to_path_buf()), "test");
        assert!(matches!(result, Err(ConfigurationError::InvalidValue { .. })));
    }

    #[test]
    fn test_invalid_yaml_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("labflow-config.yaml"), "sweeper: [unclosed").unwrap();

        let result =
            ConfigManager::load_from_directory_with_env(Some(temp_dir.path().to_path_buf()), "test");
        assert!(matches!(result, Err(ConfigurationError::InvalidYaml { .. })));
    }

    #[test]
    fn test_config_sanitization() {
        let (_temp_dir, config_dir) = setup_test_config_dir();
        let manager =
            ConfigManager::load_from_directory_with_env(Some(config_dir), "test").unwrap();

        let sanitized = manager.debug_config();
        let password = sanitized["mail"]["password"].as_str().unwrap();
        assert!(password.starts_with("[MASKED"));
        assert!(!password.contains("super-secret"));
        assert_eq!(sanitized["mail"]["smtp_host"], "smtp.example.com");
    }

    #[test]
    fn test_shipped_config_file_loads() {
        let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config");
        for environment in ENVIRONMENT_SECTIONS {
            let manager =
                ConfigManager::load_from_directory_with_env(Some(dir.clone()), environment).unwrap();
            assert_eq!(manager.config().templates.portal_name, "Deutsche Aligners");
        }
    }
}
