//! Classifier collaborators.
//!
//! The models themselves live outside this crate. Implementations are built
//! once at startup and shared across requests, hence the `Send + Sync` bound.

use crate::models::{Emotion, EmotionScores, SentimentPrediction};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("inference API returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("malformed classifier output: {0}")]
    Malformed(String),
    #[error("classifier output is missing the '{0}' category")]
    MissingCategory(Emotion),
    #[error("classifier returned unknown label '{0}'")]
    UnknownLabel(String),
}

pub trait SentimentClassifier: Send + Sync {
    fn classify(&self, text: &str) -> Result<SentimentPrediction, ClassifierError>;
}

pub trait EmotionClassifier: Send + Sync {
    fn classify(&self, text: &str) -> Result<EmotionScores, ClassifierError>;
}

/// Assemble the fixed-field record from labelled scores.
///
/// Every category must appear; an unrecognised label is an error and a
/// repeated label keeps its last score.
pub fn emotion_scores_from_labels<'a, I>(labelled: I) -> Result<EmotionScores, ClassifierError>
where
    I: IntoIterator<Item = (&'a str, f64)>,
{
    let mut scores = EmotionScores::default();
    let mut seen = [false; Emotion::COUNT];

    for (label, score) in labelled {
        let emotion =
            Emotion::from_label(label).ok_or_else(|| ClassifierError::UnknownLabel(label.to_string()))?;
        scores.set(emotion, score);
        seen[emotion as usize] = true;
    }

    if let Some(missing) = Emotion::ALL.into_iter().find(|e| !seen[*e as usize]) {
        return Err(ClassifierError::MissingCategory(missing));
    }

    Ok(scores)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: [(&str, f64); 7] = [
        ("anger", 0.02),
        ("disgust", 0.01),
        ("fear", 0.01),
        ("joy", 0.9),
        ("neutral", 0.02),
        ("sadness", 0.01),
        ("surprise", 0.03),
    ];

    #[test]
    fn test_full_label_set() {
        let scores = emotion_scores_from_labels(FULL).unwrap();
        assert_eq!(scores.joy, 0.9);
        assert_eq!(scores.neutral, 0.02);
        assert_eq!(scores.surprise, 0.03);
    }

    #[test]
    fn test_missing_category_is_error() {
        let partial = FULL.iter().copied().filter(|(l, _)| *l != "fear");
        match emotion_scores_from_labels(partial) {
            Err(ClassifierError::MissingCategory(Emotion::Fear)) => {}
            other => panic!("expected missing fear, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_label_is_error() {
        let with_extra = FULL.iter().copied().chain(std::iter::once(("love", 0.5)));
        assert!(matches!(
            emotion_scores_from_labels(with_extra),
            Err(ClassifierError::UnknownLabel(l)) if l == "love"
        ));
    }

    #[test]
    fn test_labels_are_case_insensitive() {
        let upper: Vec<(String, f64)> = FULL.iter().map(|(l, s)| (l.to_uppercase(), *s)).collect();
        let scores =
            emotion_scores_from_labels(upper.iter().map(|(l, s)| (l.as_str(), *s))).unwrap();
        assert_eq!(scores.joy, 0.9);
    }
}
