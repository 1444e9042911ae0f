//! Sentiment and emotion analyzers.
//!
//! Each call validates the text, asks the classifier, then applies the
//! confidence gate. Input problems and weak predictions come back as failure
//! records; only a misbehaving classifier produces an `Err`.

use crate::classifiers::{ClassifierError, EmotionClassifier, SentimentClassifier};
use crate::confidence::ConfidenceGate;
use crate::models::{round_score, Emotion, EmotionScores};
use crate::validator::{InputValidator, Verdict};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

pub const INVALID_TEXT_ERROR: &str = "Invalid, gibberish, or non-English text";
pub const LOW_CONFIDENCE_ERROR: &str = "Low confidence prediction";

/// Sentiment record: `label` and `score` are both set or both absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentResult {
    pub label: Option<String>,
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SentimentResult {
    pub fn success(label: &str, score: f64) -> Self {
        Self {
            label: Some(label.to_lowercase()),
            score: Some(round_score(score)),
            error: None,
        }
    }

    pub fn failure(reason: &str) -> Self {
        Self {
            label: None,
            score: None,
            error: Some(reason.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Emotion record.
///
/// On success every score and `dominant_emotion` are set. An invalid input
/// leaves every value absent; a low-confidence prediction keeps the scores
/// but leaves `dominant_emotion` absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmotionResult {
    pub anger: Option<f64>,
    pub disgust: Option<f64>,
    pub fear: Option<f64>,
    pub joy: Option<f64>,
    pub sadness: Option<f64>,
    pub surprise: Option<f64>,
    pub neutral: Option<f64>,
    pub dominant_emotion: Option<Emotion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EmotionResult {
    pub fn success(scores: &EmotionScores, dominant: Emotion) -> Self {
        let mut result = Self::with_scores(scores);
        result.dominant_emotion = Some(dominant);
        result
    }

    pub fn low_confidence(scores: &EmotionScores) -> Self {
        let mut result = Self::with_scores(scores);
        result.error = Some(LOW_CONFIDENCE_ERROR.to_string());
        result
    }

    pub fn failure(reason: &str) -> Self {
        Self {
            anger: None,
            disgust: None,
            fear: None,
            joy: None,
            sadness: None,
            surprise: None,
            neutral: None,
            dominant_emotion: None,
            error: Some(reason.to_string()),
        }
    }

    fn with_scores(scores: &EmotionScores) -> Self {
        Self {
            anger: Some(scores.anger),
            disgust: Some(scores.disgust),
            fear: Some(scores.fear),
            joy: Some(scores.joy),
            sadness: Some(scores.sadness),
            surprise: Some(scores.surprise),
            neutral: Some(scores.neutral),
            dominant_emotion: None,
            error: None,
        }
    }

    pub fn score(&self, emotion: Emotion) -> Option<f64> {
        match emotion {
            Emotion::Anger => self.anger,
            Emotion::Disgust => self.disgust,
            Emotion::Fear => self.fear,
            Emotion::Joy => self.joy,
            Emotion::Sadness => self.sadness,
            Emotion::Surprise => self.surprise,
            Emotion::Neutral => self.neutral,
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Clone)]
pub struct SentimentAnalyzer {
    validator: InputValidator,
    classifier: Arc<dyn SentimentClassifier>,
    gate: ConfidenceGate,
}

impl SentimentAnalyzer {
    pub fn new(
        validator: InputValidator,
        classifier: Arc<dyn SentimentClassifier>,
        gate: ConfidenceGate,
    ) -> Self {
        Self {
            validator,
            classifier,
            gate,
        }
    }

    pub fn analyze(&self, text: Option<&str>) -> Result<SentimentResult, ClassifierError> {
        let text = match (self.validator.validate(text), text) {
            (Verdict::Valid, Some(text)) => text,
            _ => return Ok(SentimentResult::failure(INVALID_TEXT_ERROR)),
        };

        let prediction = self.classifier.classify(text)?;
        info!(label = %prediction.label, score = prediction.score, "sentiment classified");

        if !self.gate.passes(prediction.score) {
            debug!(
                score = prediction.score,
                threshold = self.gate.threshold(),
                "sentiment below confidence threshold"
            );
            return Ok(SentimentResult::failure(LOW_CONFIDENCE_ERROR));
        }

        Ok(SentimentResult::success(&prediction.label, prediction.score))
    }
}

#[derive(Clone)]
pub struct EmotionAnalyzer {
    validator: InputValidator,
    classifier: Arc<dyn EmotionClassifier>,
    gate: ConfidenceGate,
}

impl EmotionAnalyzer {
    pub fn new(
        validator: InputValidator,
        classifier: Arc<dyn EmotionClassifier>,
        gate: ConfidenceGate,
    ) -> Self {
        Self {
            validator,
            classifier,
            gate,
        }
    }

    /// Scores are rounded before the dominant emotion is picked, so the gate
    /// and any tie-break see the reported values.
    pub fn analyze(&self, text: Option<&str>) -> Result<EmotionResult, ClassifierError> {
        let text = match (self.validator.validate(text), text) {
            (Verdict::Valid, Some(text)) => text,
            _ => return Ok(EmotionResult::failure(INVALID_TEXT_ERROR)),
        };

        let scores = self.classifier.classify(text)?.rounded();
        let (dominant, top) = scores.dominant();
        info!(%dominant, score = top, "emotion classified");

        if !self.gate.passes(top) {
            debug!(
                score = top,
                threshold = self.gate.threshold(),
                "dominant emotion below confidence threshold"
            );
            return Ok(EmotionResult::low_confidence(&scores));
        }

        Ok(EmotionResult::success(&scores, dominant))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::{LanguageError, LanguageIdentifier};
    use crate::models::SentimentPrediction;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct AlwaysEnglish;

    impl LanguageIdentifier for AlwaysEnglish {
        fn identify(&self, _text: &str) -> Result<String, LanguageError> {
            Ok("eng".to_string())
        }
    }

    struct FixedSentiment {
        label: &'static str,
        score: f64,
        calls: AtomicUsize,
    }

    impl FixedSentiment {
        fn new(label: &'static str, score: f64) -> Arc<Self> {
            Arc::new(Self {
                label,
                score,
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl SentimentClassifier for FixedSentiment {
        fn classify(&self, _text: &str) -> Result<SentimentPrediction, ClassifierError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(SentimentPrediction::new(self.label, self.score))
        }
    }

    struct FixedEmotion(EmotionScores);

    impl EmotionClassifier for FixedEmotion {
        fn classify(&self, _text: &str) -> Result<EmotionScores, ClassifierError> {
            Ok(self.0)
        }
    }

    struct BrokenEmotion;

    impl EmotionClassifier for BrokenEmotion {
        fn classify(&self, _text: &str) -> Result<EmotionScores, ClassifierError> {
            Err(ClassifierError::MissingCategory(Emotion::Fear))
        }
    }

    fn validator() -> InputValidator {
        InputValidator::with_identifier(Arc::new(AlwaysEnglish))
    }

    fn sentiment(label: &'static str, score: f64) -> (SentimentAnalyzer, Arc<FixedSentiment>) {
        let classifier = FixedSentiment::new(label, score);
        let analyzer =
            SentimentAnalyzer::new(validator(), classifier.clone(), ConfidenceGate::default());
        (analyzer, classifier)
    }

    fn emotion(scores: EmotionScores) -> EmotionAnalyzer {
        EmotionAnalyzer::new(
            validator(),
            Arc::new(FixedEmotion(scores)),
            ConfidenceGate::default(),
        )
    }

    fn joyful() -> EmotionScores {
        EmotionScores {
            joy: 0.9,
            anger: 0.02,
            disgust: 0.01,
            fear: 0.01,
            sadness: 0.01,
            surprise: 0.03,
            neutral: 0.02,
        }
    }

    #[test]
    fn test_sentiment_rejects_invalid_text_without_classifying() {
        let (analyzer, classifier) = sentiment("POSITIVE", 0.99);

        let result = analyzer.analyze(Some("xq7!!9zz")).unwrap();
        assert_eq!(result, SentimentResult::failure(INVALID_TEXT_ERROR));
        assert_eq!(result.label, None);
        assert_eq!(result.score, None);
        assert_eq!(classifier.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_sentiment_rejects_absent_text() {
        let (analyzer, _) = sentiment("POSITIVE", 0.99);
        assert_eq!(
            analyzer.analyze(None).unwrap().error.as_deref(),
            Some(INVALID_TEXT_ERROR)
        );
    }

    #[test]
    fn test_sentiment_success_lowercases_label() {
        let (analyzer, _) = sentiment("POSITIVE", 0.95);
        let result = analyzer.analyze(Some("I love this product")).unwrap();

        assert_eq!(result.label.as_deref(), Some("positive"));
        assert_eq!(result.score, Some(0.95));
        assert_eq!(result.error, None);
        assert!(result.is_success());
    }

    #[test]
    fn test_sentiment_score_is_rounded() {
        let (analyzer, _) = sentiment("NEGATIVE", 0.987654);
        let result = analyzer.analyze(Some("This was a terrible experience")).unwrap();
        assert_eq!(result.score, Some(0.9877));
    }

    #[test]
    fn test_sentiment_low_confidence() {
        let (analyzer, _) = sentiment("NEGATIVE", 0.4);
        let result = analyzer.analyze(Some("I love this product")).unwrap();
        assert_eq!(result, SentimentResult::failure(LOW_CONFIDENCE_ERROR));
    }

    #[test]
    fn test_sentiment_threshold_is_inclusive() {
        let (analyzer, _) = sentiment("POSITIVE", 0.6);
        let result = analyzer.analyze(Some("I love this product")).unwrap();
        assert_eq!(result.score, Some(0.6));
    }

    #[test]
    fn test_sentiment_json_shape() {
        let ok = serde_json::to_value(SentimentResult::success("POSITIVE", 0.95)).unwrap();
        assert_eq!(ok, serde_json::json!({"label": "positive", "score": 0.95}));

        let failed = serde_json::to_value(SentimentResult::failure(INVALID_TEXT_ERROR)).unwrap();
        assert_eq!(
            failed,
            serde_json::json!({"label": null, "score": null, "error": INVALID_TEXT_ERROR})
        );
    }

    #[test]
    fn test_emotion_success() {
        let result = emotion(joyful()).analyze(Some("I love this product")).unwrap();

        assert_eq!(result.dominant_emotion, Some(Emotion::Joy));
        assert_eq!(result.joy, Some(0.9));
        assert_eq!(result.surprise, Some(0.03));
        assert_eq!(result.error, None);
        for e in Emotion::ALL {
            assert!(result.score(e).is_some(), "{} missing", e);
        }
    }

    #[test]
    fn test_emotion_invalid_text_is_all_null() {
        let result = emotion(joyful()).analyze(Some("   ")).unwrap();
        assert_eq!(result, EmotionResult::failure(INVALID_TEXT_ERROR));
        for e in Emotion::ALL {
            assert_eq!(result.score(e), None);
        }
        assert_eq!(result.dominant_emotion, None);
    }

    #[test]
    fn test_emotion_low_confidence_keeps_scores() {
        let scores = EmotionScores {
            joy: 0.45,
            sadness: 0.3,
            neutral: 0.123456,
            ..EmotionScores::default()
        };
        let result = emotion(scores).analyze(Some("I love this product")).unwrap();

        assert_eq!(result.dominant_emotion, None);
        assert_eq!(result.error.as_deref(), Some(LOW_CONFIDENCE_ERROR));
        assert_eq!(result.joy, Some(0.45));
        assert_eq!(result.neutral, Some(0.1235));
    }

    #[test]
    fn test_emotion_scores_rounded_before_gate() {
        // 0.59996 rounds to 0.6, which passes
        let scores = EmotionScores {
            fear: 0.59996,
            ..EmotionScores::default()
        };
        let result = emotion(scores).analyze(Some("I love this product")).unwrap();
        assert_eq!(result.dominant_emotion, Some(Emotion::Fear));
        assert_eq!(result.fear, Some(0.6));
    }

    #[test]
    fn test_emotion_tie_break_uses_declaration_order() {
        let scores = EmotionScores {
            surprise: 0.7,
            joy: 0.7,
            ..EmotionScores::default()
        };
        let result = emotion(scores).analyze(Some("I love this product")).unwrap();
        assert_eq!(result.dominant_emotion, Some(Emotion::Joy));
    }

    #[test]
    fn test_emotion_json_shape() {
        let value = serde_json::to_value(EmotionResult::success(&joyful(), Emotion::Joy)).unwrap();
        assert_eq!(value["dominant_emotion"], "joy");
        assert_eq!(value["anger"], 0.02);
        assert!(value.get("error").is_none());

        let low = serde_json::to_value(EmotionResult::low_confidence(&joyful())).unwrap();
        assert_eq!(low["dominant_emotion"], serde_json::Value::Null);
        assert_eq!(low["error"], LOW_CONFIDENCE_ERROR);
    }

    #[test]
    fn test_classifier_failure_propagates() {
        let analyzer = EmotionAnalyzer::new(
            validator(),
            Arc::new(BrokenEmotion),
            ConfidenceGate::default(),
        );
        assert!(matches!(
            analyzer.analyze(Some("I love this product")),
            Err(ClassifierError::MissingCategory(Emotion::Fear))
        ));
    }

    #[test]
    fn test_repeated_calls_are_identical() {
        let (analyzer, classifier) = sentiment("POSITIVE", 0.95);
        let first = analyzer.analyze(Some("I love this product")).unwrap();
        let second = analyzer.analyze(Some("I love this product")).unwrap();
        assert_eq!(first, second);
        assert_eq!(classifier.calls.load(Ordering::SeqCst), 2);

        let analyzer = emotion(joyful());
        assert_eq!(
            analyzer.analyze(Some("I love this product")).unwrap(),
            analyzer.analyze(Some("I love this product")).unwrap()
        );
    }
}
