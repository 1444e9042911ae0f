// Combined sentiment + emotion report
use crate::analyzer::{EmotionAnalyzer, EmotionResult, SentimentAnalyzer, SentimentResult};
use crate::classifiers::ClassifierError;
use crate::models::Emotion;
use serde::Serialize;
use std::fmt::Write as _;

pub const REJECTED_MESSAGE: &str = "Invalid input! Try again.";

/// Outcome of running both analyzers on one text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CombinedReport {
    Accepted {
        sentiment: SentimentResult,
        emotion: EmotionResult,
    },
    Rejected {
        /// Reason from whichever analyzer turned the text away
        reason: String,
    },
}

pub struct ReportBuilder {
    sentiment: SentimentAnalyzer,
    emotion: EmotionAnalyzer,
}

impl ReportBuilder {
    pub fn new(sentiment: SentimentAnalyzer, emotion: EmotionAnalyzer) -> Self {
        Self { sentiment, emotion }
    }

    pub fn sentiment(&self) -> &SentimentAnalyzer {
        &self.sentiment
    }

    pub fn emotion(&self) -> &EmotionAnalyzer {
        &self.emotion
    }

    /// Sentiment first; the emotion classifier only runs when sentiment
    /// produced a label.
    pub fn build(&self, text: Option<&str>) -> Result<CombinedReport, ClassifierError> {
        let sentiment = self.sentiment.analyze(text)?;
        if sentiment.label.is_none() {
            return Ok(CombinedReport::rejected(&sentiment.error));
        }

        let emotion = self.emotion.analyze(text)?;
        if emotion.dominant_emotion.is_none() {
            return Ok(CombinedReport::rejected(&emotion.error));
        }

        Ok(CombinedReport::Accepted { sentiment, emotion })
    }
}

impl CombinedReport {
    fn rejected(reason: &Option<String>) -> Self {
        CombinedReport::Rejected {
            reason: reason.clone().unwrap_or_default(),
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, CombinedReport::Accepted { .. })
    }

    /// Human-readable rendering.
    pub fn render(&self) -> String {
        let (sentiment, emotion) = match self {
            CombinedReport::Rejected { .. } => return REJECTED_MESSAGE.to_string(),
            CombinedReport::Accepted { sentiment, emotion } => (sentiment, emotion),
        };

        let mut out = String::new();
        let _ = writeln!(
            out,
            "The given text has been identified as {} with a score of {}.",
            sentiment.label.as_deref().unwrap_or("-"),
            format_score(sentiment.score)
        );
        let _ = writeln!(out);
        let _ = writeln!(out, "Emotions:");
        for e in Emotion::ALL {
            let _ = writeln!(out, "{}: {}", capitalize(e.name()), format_score(emotion.score(e)));
        }
        let _ = writeln!(out);
        let _ = write!(
            out,
            "Dominant Emotion: {}",
            emotion
                .dominant_emotion
                .map(|e| e.name())
                .unwrap_or("-")
        );
        out
    }
}

fn format_score(score: Option<f64>) -> String {
    score.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string())
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
