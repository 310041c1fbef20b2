use crate::backup::compress::CompressionConfig;
use crate::backup::ignore::IgnorePatterns;
use crate::backup::options::TransferOptions;
use crate::backup::report::Reporter;
use crate::backup::result_error::error::Error;
use crate::backup::result_error::result::Result;
use crate::backup::result_error::WithMsg;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::info;
use validator::Validate;

/// Looked up in the working directory when no `--config` is given.
pub static DEFAULT_CONFIG_FILE: &str = "config.yaml";

static DEFAULT_IGNORE: &str = ".thumb, .db";
static DEFAULT_MODIFIED_DAYS: i64 = -1;

/// Tool configuration, read from YAML:
///
/// ```yaml
/// default:
///   copy_mod_files_num_days: -7
/// logging:
///   log_copied_file: true
/// ignore:
///   file_type_or_folder_name: ".thumb, .db"
/// compression:
///   level: 6
/// ```
///
/// Every section is optional.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct KopyConfig {
    #[validate(nested)]
    pub default: DefaultSection,
    pub logging: LoggingSection,
    pub ignore: IgnoreSection,
    #[validate(nested)]
    pub compression: CompressionConfig,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct DefaultSection {
    /// Look-back window of `copymd`, zero or negative.
    #[validate(range(max = 0))]
    pub copy_mod_files_num_days: i64,
}

impl Default for DefaultSection {
    fn default() -> Self {
        Self {
            copy_mod_files_num_days: DEFAULT_MODIFIED_DAYS,
        }
    }
}

/// Unknown keys are accepted here, older files still carry log rotation
/// settings (`max_log_file_size_in_mb`, `max_age_in_days`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    pub log_copied_file: bool,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            log_copied_file: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IgnoreSection {
    pub file_type_or_folder_name: IgnorePatterns,
}

impl Default for IgnoreSection {
    fn default() -> Self {
        Self {
            file_type_or_folder_name: IgnorePatterns::from_comma_separated(DEFAULT_IGNORE),
        }
    }
}

impl KopyConfig {
    /// Reads `path`, or [`DEFAULT_CONFIG_FILE`] when `path` is `None` and
    /// that file exists, or falls back to the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let local = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !local.is_file() {
                    info!("No {DEFAULT_CONFIG_FILE} found, using default configuration");
                    return Ok(Self::default());
                }
                local
            }
        };
        Self::from_file(&path)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from {:?}", path);
        File::open(path)
            .map_err(Error::from)
            .and_then(|f| {
                serde_yml::from_reader::<_, KopyConfig>(f)
                    .map_err(Error::from)
                    .with_msg(format!("Parse YAML config failed: {:?}", path))
            })
            .and_then(|config| {
                config
                    .validate()
                    .map_err(Error::from)
                    .map(|_| config)
                    .with_msg(format!("Config validation failed: {:?}", path))
            })
    }

    /// Replaces the configured ignore list for this invocation.
    pub fn with_ignore(mut self, ignore: Option<IgnorePatterns>) -> Self {
        if let Some(ignore) = ignore {
            self.ignore.file_type_or_folder_name = ignore;
        }
        self
    }

    pub fn transfer_options(&self) -> TransferOptions {
        TransferOptions::builder()
            .ignore(self.ignore.file_type_or_folder_name.clone())
            .reporter(Reporter::new(self.logging.log_copied_file))
            .compression(self.compression)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_full_config() {
        let yaml = r#"
default:
  copy_mod_files_num_days: -7
logging:
  log_copied_file: false
ignore:
  file_type_or_folder_name: ".tmp, node_modules"
compression:
  level: 9
"#;
        let config: KopyConfig = serde_yml::from_str(yaml).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.default.copy_mod_files_num_days, -7);
        assert!(!config.logging.log_copied_file);
        assert_eq!(
            config.ignore.file_type_or_folder_name,
            IgnorePatterns::new([".tmp", "node_modules"])
        );
        assert_eq!(config.compression.level, Some(9));
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config: KopyConfig = serde_yml::from_str("logging: {}").unwrap();
        assert_eq!(config, KopyConfig::default());
        assert_eq!(config.default.copy_mod_files_num_days, -1);
        assert!(config.logging.log_copied_file);
        assert!(config.ignore.file_type_or_folder_name.is_excluded("/pics/a.thumb"));
        assert!(config.ignore.file_type_or_folder_name.is_excluded("/pics/index.db"));
        assert_eq!(config.compression.level, None);
    }

    #[test]
    fn test_ignore_as_list() {
        let yaml = r#"
ignore:
  file_type_or_folder_name:
    - .git
    - target
"#;
        let config: KopyConfig = serde_yml::from_str(yaml).unwrap();
        assert_eq!(
            config.ignore.file_type_or_folder_name,
            IgnorePatterns::new([".git", "target"])
        );
    }

    #[test]
    fn test_log_rotation_keys_are_accepted() {
        let yaml = r#"
logging:
  log_copied_file: true
  max_log_file_size_in_mb: 10
  max_age_in_days: 30
"#;
        let config: KopyConfig = serde_yml::from_str(yaml).unwrap();
        assert!(config.logging.log_copied_file);
    }

    #[test]
    fn test_positive_days_rejected() {
        let config: KopyConfig =
            serde_yml::from_str("default:\n  copy_mod_files_num_days: 3\n").unwrap();
        assert!(config.validate().is_err());

        let config: KopyConfig =
            serde_yml::from_str("default:\n  copy_mod_files_num_days: 0\n").unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_compression_level_rejected() {
        let config: KopyConfig = serde_yml::from_str("compression:\n  level: 12\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_compression_field_rejected() {
        assert!(serde_yml::from_str::<KopyConfig>("compression:\n  method: xz\n").is_err());
    }

    #[test]
    fn test_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yaml");
        fs::write(&path, "default:\n  copy_mod_files_num_days: -3\n").unwrap();

        let config = KopyConfig::load(Some(&path)).unwrap();
        assert_eq!(config.default.copy_mod_files_num_days, -3);
    }

    #[test]
    fn test_from_file_validation_failure() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yaml");
        fs::write(&path, "default:\n  copy_mod_files_num_days: 5\n").unwrap();

        let err = KopyConfig::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("Config validation failed"));
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        assert!(KopyConfig::load(Some(&temp_dir.path().join("nope.yaml"))).is_err());
    }

    #[test]
    fn test_transfer_options() {
        let mut config = KopyConfig::default();
        config.logging.log_copied_file = false;
        config.compression.level = Some(1);

        let options = config
            .with_ignore(Some(IgnorePatterns::from_comma_separated("cache")))
            .transfer_options();
        assert!(options.ignore().is_excluded("/home/u/cache/x"));
        assert!(!options.ignore().is_excluded("/home/u/a.db"));
        assert_eq!(*options.reporter(), Reporter::quiet());
        assert_eq!(options.compression().level(), 1);
    }

    #[test]
    fn test_with_ignore_none_keeps_config() {
        let config = KopyConfig::default().with_ignore(None);
        assert_eq!(config.ignore, IgnoreSection::default());
    }
}
