use std::path::{Path, PathBuf};
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use crate::numeric::validate::{parse_decimal, WORKING_PRECISION};

/// Output precision is capped so six guard digits always fit in the
/// fixed working precision.
pub const MAX_OUTPUT_PRECISION: u32 = WORKING_PRECISION - 6;

const LOG_FILE_NAME: &str = "calculator.log";
const HISTORY_FILE_NAME: &str = "calculation_history.csv";

pub const ENV_LOG_DIR: &str = "CALCULATOR_LOG_DIR";
pub const ENV_HISTORY_DIR: &str = "CALCULATOR_HISTORY_DIR";
pub const ENV_MAX_HISTORY_SIZE: &str = "CALCULATOR_MAX_HISTORY_SIZE";
pub const ENV_AUTO_SAVE: &str = "CALCULATOR_AUTO_SAVE";
pub const ENV_PRECISION: &str = "CALCULATOR_PRECISION";
pub const ENV_MAX_INPUT_VALUE: &str = "CALCULATOR_MAX_INPUT_VALUE";
pub const ENV_ENCODING: &str = "CALCULATOR_DEFAULT_ENCODING";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
    #[error("Unsupported encoding: {0} (only UTF-8 is supported)")]
    UnsupportedEncoding(String),
    #[error("Failed to read config file {path}: {reason}")]
    File { path: PathBuf, reason: String },
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Settings read once per calculator instance
#[derive(Debug, Clone, PartialEq)]
pub struct CalculatorConfig {
    pub log_dir: PathBuf,
    pub history_dir: PathBuf,
    pub max_history_size: usize,
    pub auto_save: bool,
    pub precision: u32,
    pub max_input_value: Decimal,
    pub encoding: String,
}

/// On-disk overrides, every key optional
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    log_dir: Option<PathBuf>,
    history_dir: Option<PathBuf>,
    max_history_size: Option<usize>,
    auto_save: Option<bool>,
    precision: Option<u32>,
    max_input_value: Option<String>,
    encoding: Option<String>,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("./logs"),
            history_dir: PathBuf::from("./history"),
            max_history_size: 1000,
            auto_save: true,
            precision: 8,
            max_input_value: Decimal::from(1_000_000_000_000i64),
            encoding: "utf-8".to_string(),
        }
    }
}

impl CalculatorConfig {
    pub fn log_file(&self) -> PathBuf {
        self.log_dir.join(LOG_FILE_NAME)
    }

    pub fn history_file(&self) -> PathBuf {
        self.history_dir.join(HISTORY_FILE_NAME)
    }

    /// Defaults, then the optional TOML file, then `CALCULATOR_*` variables.
    /// Creates the log and history directories.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut cfg = Self::default();
        if let Some(path) = config_file {
            cfg.apply_file(path)?;
        }
        cfg.apply_vars(|key| std::env::var(key).ok())?;
        cfg.ensure_dirs()?;
        Ok(cfg)
    }

    /// Build from defaults plus an arbitrary variable lookup (no file, no mkdir)
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        cfg.apply_vars(lookup)?;
        Ok(cfg)
    }

    pub fn ensure_dirs(&self) -> Result<(), ConfigError> {
        for dir in [&self.log_dir, &self.history_dir] {
            std::fs::create_dir_all(dir).map_err(|source| ConfigError::CreateDir {
                path: dir.clone(),
                source,
            })?;
        }
        Ok(())
    }

    fn apply_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let file_err = |reason: String| ConfigError::File {
            path: path.to_path_buf(),
            reason,
        };
        let content = std::fs::read_to_string(path).map_err(|e| file_err(e.to_string()))?;
        let file: ConfigFile = toml::from_str(&content).map_err(|e| file_err(e.to_string()))?;

        if let Some(dir) = file.log_dir {
            self.log_dir = dir;
        }
        if let Some(dir) = file.history_dir {
            self.history_dir = dir;
        }
        if let Some(size) = file.max_history_size {
            self.max_history_size = check_history_size("max_history_size", size)?;
        }
        if let Some(flag) = file.auto_save {
            self.auto_save = flag;
        }
        if let Some(precision) = file.precision {
            self.precision = check_precision("precision", precision)?;
        }
        if let Some(value) = file.max_input_value {
            self.max_input_value = parse_max_input("max_input_value", &value)?;
        }
        if let Some(encoding) = file.encoding {
            self.encoding = check_encoding(&encoding)?;
        }
        Ok(())
    }

    fn apply_vars<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_LOG_DIR) {
            self.log_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup(ENV_HISTORY_DIR) {
            self.history_dir = PathBuf::from(dir);
        }
        if let Some(raw) = lookup(ENV_MAX_HISTORY_SIZE) {
            let size = parse_number::<usize>(ENV_MAX_HISTORY_SIZE, &raw)?;
            self.max_history_size = check_history_size(ENV_MAX_HISTORY_SIZE, size)?;
        }
        if let Some(raw) = lookup(ENV_AUTO_SAVE) {
            self.auto_save = parse_bool(ENV_AUTO_SAVE, &raw)?;
        }
        if let Some(raw) = lookup(ENV_PRECISION) {
            let precision = parse_number::<u32>(ENV_PRECISION, &raw)?;
            self.precision = check_precision(ENV_PRECISION, precision)?;
        }
        if let Some(raw) = lookup(ENV_MAX_INPUT_VALUE) {
            self.max_input_value = parse_max_input(ENV_MAX_INPUT_VALUE, &raw)?;
        }
        if let Some(raw) = lookup(ENV_ENCODING) {
            self.encoding = check_encoding(&raw)?;
        }
        Ok(())
    }
}

fn invalid(key: &str, value: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_number<T: FromStr>(key: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| invalid(key, raw, "expected a non-negative integer"))
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(invalid(key, raw, "expected true or false")),
    }
}

fn parse_max_input(key: &str, raw: &str) -> Result<Decimal, ConfigError> {
    let value = parse_decimal(raw).ok_or_else(|| invalid(key, raw, "expected a decimal"))?;
    if value.is_sign_negative() || value.is_zero() {
        return Err(invalid(key, raw, "must be positive"));
    }
    Ok(value)
}

fn check_history_size(key: &str, size: usize) -> Result<usize, ConfigError> {
    if size == 0 {
        return Err(invalid(key, &size.to_string(), "must be at least 1"));
    }
    Ok(size)
}

fn check_precision(key: &str, precision: u32) -> Result<u32, ConfigError> {
    if precision > MAX_OUTPUT_PRECISION {
        return Err(invalid(
            key,
            &precision.to_string(),
            &format!("must be at most {}", MAX_OUTPUT_PRECISION),
        ));
    }
    Ok(precision)
}

fn check_encoding(raw: &str) -> Result<String, ConfigError> {
    let normalized = raw.trim().to_lowercase();
    match normalized.as_str() {
        "utf-8" | "utf8" => Ok(normalized),
        _ => Err(ConfigError::UnsupportedEncoding(raw.to_string())),
    }
}
