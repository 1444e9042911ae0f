// Input validation - structural gates, gibberish heuristics, then language
use crate::config::{GibberishConfig, ValidationConfig};
use crate::gibberish::GibberishDetector;
use crate::language::{is_english, LanguageIdentifier};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

lazy_static! {
    static ref ASCII_LETTER: Regex = Regex::new(r"[a-zA-Z]").unwrap();
    static ref LETTER_OR_SPACE: Regex = Regex::new(r"[a-zA-Z\s]").unwrap();
}

/// Why an input was turned away
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    Empty,
    TooShort,
    NonAlphabetic,
    Gibberish,
    NonEnglish,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::Empty => "empty",
            RejectReason::TooShort => "too-short",
            RejectReason::NonAlphabetic => "non-alphabetic",
            RejectReason::Gibberish => "gibberish",
            RejectReason::NonEnglish => "non-english",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Valid,
    Invalid(RejectReason),
}

impl Verdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, Verdict::Valid)
    }

    pub fn reason(&self) -> Option<RejectReason> {
        match self {
            Verdict::Valid => None,
            Verdict::Invalid(reason) => Some(*reason),
        }
    }
}

/// Runs every check in order and stops at the first failure.
#[derive(Clone)]
pub struct InputValidator {
    config: ValidationConfig,
    gibberish: GibberishDetector,
    identifier: Arc<dyn LanguageIdentifier>,
}

impl InputValidator {
    pub fn new(
        config: ValidationConfig,
        gibberish: GibberishConfig,
        identifier: Arc<dyn LanguageIdentifier>,
    ) -> Self {
        Self {
            config,
            gibberish: GibberishDetector::new(gibberish),
            identifier,
        }
    }

    /// Validator with the default thresholds.
    pub fn with_identifier(identifier: Arc<dyn LanguageIdentifier>) -> Self {
        Self::new(
            ValidationConfig::default(),
            GibberishConfig::default(),
            identifier,
        )
    }

    pub fn gibberish_detector(&self) -> &GibberishDetector {
        &self.gibberish
    }

    pub fn is_invalid(&self, text: Option<&str>) -> bool {
        !self.validate(text).is_valid()
    }

    pub fn validate(&self, text: Option<&str>) -> Verdict {
        let verdict = self.check(text);
        if let Verdict::Invalid(reason) = verdict {
            debug!(%reason, "input rejected");
        }
        verdict
    }

    fn check(&self, text: Option<&str>) -> Verdict {
        let text = match text {
            Some(t) if !t.trim().is_empty() => t,
            _ => return Verdict::Invalid(RejectReason::Empty),
        };

        if !ASCII_LETTER.is_match(text) {
            return Verdict::Invalid(RejectReason::NonAlphabetic);
        }

        if text.trim().chars().count() < self.config.min_length {
            return Verdict::Invalid(RejectReason::TooShort);
        }

        if symbol_ratio(text) > self.config.max_symbol_ratio {
            return Verdict::Invalid(RejectReason::NonAlphabetic);
        }

        if self.gibberish.looks_like_gibberish(text) {
            return Verdict::Invalid(RejectReason::Gibberish);
        }

        if !is_english(self.identifier.as_ref(), text) {
            return Verdict::Invalid(RejectReason::NonEnglish);
        }

        Verdict::Valid
    }
}

/// Share of characters that are neither ASCII letters nor whitespace,
/// measured against the untrimmed length.
pub fn symbol_ratio(text: &str) -> f64 {
    let total = text.chars().count();
    if total == 0 {
        return 0.0;
    }
    let symbols = LETTER_OR_SPACE.replace_all(text, "").chars().count();
    symbols as f64 / total as f64
}
