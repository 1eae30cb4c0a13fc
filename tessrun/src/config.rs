use std::env;
use std::str::FromStr;

fn parse_env_or<T: FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

fn env_non_empty(var: &str) -> Option<String> {
    env::var(var)
        .ok()
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}

#[derive(Debug, Clone)]
pub struct Config {
    pub engine: EngineConfig,
    pub logging: LoggingConfig,
}

/// Settings for locating and driving the Tesseract binary.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub binary: String,
    pub lang: Option<String>,
    pub psm: u32,
    pub oem: u32,
    /// Directory for staged in-memory images; the system temp dir when unset.
    pub staging_dir: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{other}', expected pretty or json")),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            binary: env_non_empty("TESSERACT_BIN").unwrap_or_else(|| "tesseract".to_string()),
            lang: env_non_empty("TESSERACT_LANG"),
            psm: parse_env_or("TESSERACT_PSM", crate::ocr::DEFAULT_PSM),
            oem: parse_env_or("TESSERACT_OEM", crate::ocr::DEFAULT_OEM),
            staging_dir: env_non_empty("TESSRUN_STAGING_DIR"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            logging: LoggingConfig {
                format: parse_env_or("TESSRUN_LOG_FORMAT", LogFormat::Pretty),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}
