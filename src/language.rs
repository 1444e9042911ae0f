//! Language identification adapter.
//!
//! The identifier itself is an external collaborator; this module only turns
//! its answer into an "is English" signal. Any failure to identify counts as
//! not English.

use crate::config::LanguageConfig;
use lazy_static::lazy_static;
use lingua::{LanguageDetector, LanguageDetectorBuilder};
use thiserror::Error;
use tracing::debug;

/// ISO 639-3 code for English
pub const ENGLISH_CODE: &str = "eng";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LanguageError {
    #[error("language could not be determined")]
    Undetectable,
    #[error("detected {code} with low reliability ({confidence:.2})")]
    Unreliable { code: String, confidence: f64 },
}

/// Best-guess language identification for a piece of text.
pub trait LanguageIdentifier: Send + Sync {
    /// Returns an ISO 639-3 language code.
    fn identify(&self, text: &str) -> Result<String, LanguageError>;
}

/// Fail-closed English check.
pub fn is_english(identifier: &dyn LanguageIdentifier, text: &str) -> bool {
    match identifier.identify(text) {
        Ok(code) => code == ENGLISH_CODE,
        Err(e) => {
            debug!(error = %e, "language identification failed");
            false
        }
    }
}

lazy_static! {
    // Models load on first use of each language
    static ref LINGUA: LanguageDetector = LanguageDetectorBuilder::from_all_languages().build();
}

/// Whatlang answers for medium-length text below this confidence are
/// re-checked with lingua.
const MEDIUM_WHATLANG_CONFIDENCE: f64 = 0.75;

/// Lingua confidence below which a short-text detection counts as unreliable.
const LINGUA_RELIABLE_CONFIDENCE: f64 = 0.5;

/// Identifier that routes by length: lingua for short text, whatlang for
/// long text, and whatlang with a lingua fallback in between. Whatlang
/// misreads short sentences ("What a wonderful day" comes back as German).
#[derive(Debug, Clone)]
pub struct RoutedIdentifier {
    require_reliable: bool,
    short_text_len: usize,
}

impl Default for RoutedIdentifier {
    fn default() -> Self {
        Self::new(&LanguageConfig::default())
    }
}

impl RoutedIdentifier {
    pub fn new(config: &LanguageConfig) -> Self {
        Self {
            require_reliable: config.require_reliable,
            short_text_len: config.short_text_len,
        }
    }

    fn identify_short(&self, text: &str) -> Result<String, LanguageError> {
        let language = LINGUA
            .detect_language_of(text)
            .ok_or(LanguageError::Undetectable)?;
        let code = language.iso_code_639_3().to_string().to_lowercase();

        if self.require_reliable {
            let confidence = LINGUA.compute_language_confidence(text, language);
            if confidence < LINGUA_RELIABLE_CONFIDENCE {
                return Err(LanguageError::Unreliable { code, confidence });
            }
        }

        Ok(code)
    }

    fn identify_long(&self, text: &str, len: usize) -> Result<String, LanguageError> {
        let info = whatlang::detect(text).ok_or(LanguageError::Undetectable)?;

        if len <= self.short_text_len * 2 && info.confidence() < MEDIUM_WHATLANG_CONFIDENCE {
            debug!(
                whatlang = info.lang().code(),
                confidence = info.confidence(),
                "low whatlang confidence, asking lingua"
            );
            return self.identify_short(text);
        }

        let code = info.lang().code().to_string();
        if self.require_reliable && !info.is_reliable() {
            return Err(LanguageError::Unreliable {
                code,
                confidence: info.confidence(),
            });
        }

        Ok(code)
    }
}

impl LanguageIdentifier for RoutedIdentifier {
    fn identify(&self, text: &str) -> Result<String, LanguageError> {
        let len = text.trim().chars().count();
        if len <= self.short_text_len {
            self.identify_short(text)
        } else {
            self.identify_long(text, len)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Result<String, LanguageError>);

    impl LanguageIdentifier for Fixed {
        fn identify(&self, _text: &str) -> Result<String, LanguageError> {
            self.0.clone()
        }
    }

    #[test]
    fn test_english_code_is_english() {
        assert!(is_english(&Fixed(Ok("eng".into())), "anything"));
    }

    #[test]
    fn test_other_code_is_not_english() {
        assert!(!is_english(&Fixed(Ok("deu".into())), "anything"));
        assert!(!is_english(&Fixed(Ok("en".into())), "anything"));
    }

    #[test]
    fn test_failure_is_not_english() {
        assert!(!is_english(&Fixed(Err(LanguageError::Undetectable)), "anything"));
    }

    #[test]
    fn test_detects_english_prose() {
        let identifier = RoutedIdentifier::default();
        let text = "The weather is lovely today and I am going for a long walk in the park with my friends.";
        assert_eq!(identifier.identify(text).unwrap(), ENGLISH_CODE);
        assert!(is_english(&identifier, text));
    }

    #[test]
    fn test_rejects_german_prose() {
        let identifier = RoutedIdentifier::default();
        let text = "Der schnelle braune Fuchs springt über den faulen Hund und läuft dann weiter in den dunklen Wald.";
        assert!(!is_english(&identifier, text));
    }

    #[test]
    fn test_short_english_sentences_are_english() {
        let identifier = RoutedIdentifier::default();
        for text in [
            "What a wonderful day",
            "I am so happy today",
            "I love this product",
        ] {
            assert_eq!(identifier.identify(text).as_deref(), Ok(ENGLISH_CODE), "{}", text);
        }
    }

    #[test]
    fn test_short_german_sentence_is_not_english() {
        let identifier = RoutedIdentifier::default();
        assert!(!is_english(&identifier, "Ich bin heute sehr glücklich"));
    }

    #[test]
    fn test_empty_is_undetectable() {
        let identifier = RoutedIdentifier::default();
        assert_eq!(identifier.identify(""), Err(LanguageError::Undetectable));
    }
}
