//! Input gating for sentiment and emotion classification.
//!
//! Free text is checked for emptiness, letter content, gibberish and language
//! before it reaches a classifier; classifier outputs below a confidence
//! threshold are rejected. The classifiers and the language identifier are
//! injected collaborators.

pub mod analyzer;
pub mod classifiers;
pub mod confidence;
pub mod config;
pub mod entropy;
pub mod gibberish;
pub mod inference;
pub mod language;
pub mod models;
pub mod report;
pub mod validator;

pub use analyzer::{EmotionAnalyzer, EmotionResult, SentimentAnalyzer, SentimentResult};
pub use classifiers::{ClassifierError, EmotionClassifier, SentimentClassifier};
pub use confidence::ConfidenceGate;
pub use config::GateConfig;
pub use language::{LanguageIdentifier, RoutedIdentifier};
pub use models::{Emotion, EmotionScores, SentimentPrediction};
pub use report::{CombinedReport, ReportBuilder};
pub use validator::{InputValidator, RejectReason, Verdict};
