// Gate configuration: thresholds, language policy and inference endpoint
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_MAX_ENTROPY: f64 = 4.2;
pub const DEFAULT_MIN_VOWEL_RATIO: f64 = 0.25;
pub const DEFAULT_MIN_WORD_RUN: usize = 3;
pub const DEFAULT_MIN_LENGTH: usize = 3;
pub const DEFAULT_MAX_SYMBOL_RATIO: f64 = 0.5;
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.6;
pub const DEFAULT_SHORT_TEXT_LEN: usize = 32;

pub const DEFAULT_INFERENCE_ENDPOINT: &str = "https://api-inference.huggingface.co";
pub const DEFAULT_SENTIMENT_MODEL: &str = "distilbert/distilbert-base-uncased-finetuned-sst-2-english";
pub const DEFAULT_EMOTION_MODEL: &str = "j-hartmann/emotion-english-distilroberta-base";

/// Environment variable that overrides `inference.api_token`.
pub const API_TOKEN_ENV: &str = "SENTIGATE_API_TOKEN";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid config value: {0}")]
    Invalid(String),
}

/// Complete configuration. Every field falls back to its default when absent
/// from the file, so a partial file only overrides what it names.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GateConfig {
    pub validation: ValidationConfig,
    pub gibberish: GibberishConfig,
    pub confidence: ConfidenceConfig,
    pub language: LanguageConfig,
    pub inference: InferenceConfig,
}

/// Structural checks applied before any content heuristic
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ValidationConfig {
    /// Minimum trimmed length in characters
    pub min_length: usize,
    /// Maximum share of characters that are neither letters nor whitespace
    pub max_symbol_ratio: f64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_length: DEFAULT_MIN_LENGTH,
            max_symbol_ratio: DEFAULT_MAX_SYMBOL_RATIO,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GibberishConfig {
    /// Bits per character above which text is treated as random
    pub max_entropy: f64,
    /// Minimum vowels / letters ratio
    pub min_vowel_ratio: f64,
    /// Shortest run of consecutive letters that counts as a word
    pub min_word_run: usize,
}

impl Default for GibberishConfig {
    fn default() -> Self {
        Self {
            max_entropy: DEFAULT_MAX_ENTROPY,
            min_vowel_ratio: DEFAULT_MIN_VOWEL_RATIO,
            min_word_run: DEFAULT_MIN_WORD_RUN,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConfidenceConfig {
    /// Inclusive lower bound for an accepted prediction
    pub threshold: f64,
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LanguageConfig {
    /// Treat low-confidence detections as undetectable
    pub require_reliable: bool,
    /// Texts up to this many characters go to lingua instead of whatlang
    pub short_text_len: usize,
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self {
            require_reliable: false,
            short_text_len: DEFAULT_SHORT_TEXT_LEN,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InferenceConfig {
    pub endpoint: String,
    pub sentiment_model: String,
    pub emotion_model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    pub timeout_secs: u64,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_INFERENCE_ENDPOINT.to_string(),
            sentiment_model: DEFAULT_SENTIMENT_MODEL.to_string(),
            emotion_model: DEFAULT_EMOTION_MODEL.to_string(),
            api_token: None,
            timeout_secs: 30,
        }
    }
}

impl GateConfig {
    /// Load from the default location, falling back to defaults when no file exists.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_file_path())
    }

    /// Load from `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?
        } else {
            Self::default()
        };

        if let Ok(token) = std::env::var(API_TOKEN_ENV) {
            if !token.trim().is_empty() {
                config.inference.api_token = Some(token);
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Write this configuration as pretty JSON, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(io_err)
    }

    /// Default config file path
    pub fn config_file_path() -> PathBuf {
        dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sentigate")
            .join("config.json")
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let unit = |name: &str, value: f64| {
            if (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(ConfigError::Invalid(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )))
            }
        };

        unit("validation.max_symbol_ratio", self.validation.max_symbol_ratio)?;
        unit("gibberish.min_vowel_ratio", self.gibberish.min_vowel_ratio)?;
        unit("confidence.threshold", self.confidence.threshold)?;

        if self.gibberish.max_entropy.is_nan() || self.gibberish.max_entropy <= 0.0 {
            return Err(ConfigError::Invalid(
                "gibberish.max_entropy must be greater than 0".into(),
            ));
        }

        if self.gibberish.min_word_run == 0 {
            return Err(ConfigError::Invalid(
                "gibberish.min_word_run must be greater than 0".into(),
            ));
        }

        if self.inference.endpoint.trim().is_empty() {
            return Err(ConfigError::Invalid("inference.endpoint cannot be empty".into()));
        }

        if self.inference.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "inference.timeout_secs must be greater than 0".into(),
            ));
        }

        Ok(())
    }
}
