// Domain types shared by the classifiers and the analyzers
use serde::{Deserialize, Serialize};
use std::fmt;

/// Decimal places kept on every reported score
pub const SCORE_DECIMALS: i32 = 4;

/// Round a score to [`SCORE_DECIMALS`] places, half away from zero.
pub fn round_score(score: f64) -> f64 {
    let factor = 10f64.powi(SCORE_DECIMALS);
    (score * factor).round() / factor
}

/// Output of a sentiment classifier: a polarity label and its score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentPrediction {
    pub label: String,
    pub score: f64,
}

impl SentimentPrediction {
    pub fn new(label: impl Into<String>, score: f64) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// The fixed emotion categories.
///
/// Declaration order doubles as the tie-break order when picking a dominant
/// emotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Anger,
    Disgust,
    Fear,
    Joy,
    Sadness,
    Surprise,
    Neutral,
}

impl Emotion {
    pub const COUNT: usize = 7;

    pub const ALL: [Emotion; Emotion::COUNT] = [
        Emotion::Anger,
        Emotion::Disgust,
        Emotion::Fear,
        Emotion::Joy,
        Emotion::Sadness,
        Emotion::Surprise,
        Emotion::Neutral,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Emotion::Anger => "anger",
            Emotion::Disgust => "disgust",
            Emotion::Fear => "fear",
            Emotion::Joy => "joy",
            Emotion::Sadness => "sadness",
            Emotion::Surprise => "surprise",
            Emotion::Neutral => "neutral",
        }
    }

    /// Case-insensitive lookup by label
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|e| e.name().eq_ignore_ascii_case(label))
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One score per emotion category. Scores are independent and need not sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EmotionScores {
    pub anger: f64,
    pub disgust: f64,
    pub fear: f64,
    pub joy: f64,
    pub sadness: f64,
    pub surprise: f64,
    pub neutral: f64,
}

impl EmotionScores {
    pub fn get(&self, emotion: Emotion) -> f64 {
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

    pub fn set(&mut self, emotion: Emotion, score: f64) {
        let slot = match emotion {
            Emotion::Anger => &mut self.anger,
            Emotion::Disgust => &mut self.disgust,
            Emotion::Fear => &mut self.fear,
            Emotion::Joy => &mut self.joy,
            Emotion::Sadness => &mut self.sadness,
            Emotion::Surprise => &mut self.surprise,
            Emotion::Neutral => &mut self.neutral,
        };
        *slot = score;
    }

    pub fn rounded(&self) -> Self {
        let mut out = *self;
        for emotion in Emotion::ALL {
            out.set(emotion, round_score(self.get(emotion)));
        }
        out
    }

    /// Highest-scoring category with its score. On equal scores the category
    /// declared first in [`Emotion`] wins.
    pub fn dominant(&self) -> (Emotion, f64) {
        let mut best = (Emotion::ALL[0], self.get(Emotion::ALL[0]));
        for emotion in Emotion::ALL.into_iter().skip(1) {
            let score = self.get(emotion);
            if score > best.1 {
                best = (emotion, score);
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_score() {
        assert_eq!(round_score(0.95), 0.95);
        assert_eq!(round_score(0.123456), 0.1235);
        assert_eq!(round_score(0.99994), 0.9999);
        assert_eq!(round_score(0.0), 0.0);
        assert_eq!(round_score(1.0), 1.0);
    }

    #[test]
    fn test_round_score_is_idempotent() {
        for score in [0.1235, 0.0001, 0.6, 0.9999, 0.12345678, 0.333333333, 0.87654321] {
            let once = round_score(score);
            assert_eq!(round_score(once), once, "score {}", score);
        }
    }

    #[test]
    fn test_emotion_from_label() {
        assert_eq!(Emotion::from_label("joy"), Some(Emotion::Joy));
        assert_eq!(Emotion::from_label("SADNESS"), Some(Emotion::Sadness));
        assert_eq!(Emotion::from_label(" Neutral "), Some(Emotion::Neutral));
        assert_eq!(Emotion::from_label("love"), None);
    }

    #[test]
    fn test_get_set_cover_every_category() {
        let mut scores = EmotionScores::default();
        for (i, emotion) in Emotion::ALL.into_iter().enumerate() {
            scores.set(emotion, i as f64 / 10.0);
        }
        for (i, emotion) in Emotion::ALL.into_iter().enumerate() {
            assert_eq!(scores.get(emotion), i as f64 / 10.0);
        }
    }

    #[test]
    fn test_dominant_picks_max() {
        let scores = EmotionScores {
            joy: 0.9,
            anger: 0.02,
            disgust: 0.01,
            fear: 0.01,
            sadness: 0.01,
            surprise: 0.03,
            neutral: 0.02,
        };
        assert_eq!(scores.dominant(), (Emotion::Joy, 0.9));
    }

    #[test]
    fn test_dominant_tie_goes_to_first_declared() {
        let scores = EmotionScores {
            sadness: 0.4,
            fear: 0.4,
            neutral: 0.4,
            ..EmotionScores::default()
        };
        assert_eq!(scores.dominant().0, Emotion::Fear);

        let all_equal = EmotionScores {
            anger: 0.1,
            disgust: 0.1,
            fear: 0.1,
            joy: 0.1,
            sadness: 0.1,
            surprise: 0.1,
            neutral: 0.1,
        };
        assert_eq!(all_equal.dominant().0, Emotion::Anger);
    }

    #[test]
    fn test_serialized_category_names() {
        let json = serde_json::to_string(&Emotion::Surprise).unwrap();
        assert_eq!(json, "\"surprise\"");
    }
}
