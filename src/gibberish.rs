// Gibberish detection - entropy, vowel ratio and word-pattern heuristics
use crate::config::GibberishConfig;
use crate::entropy::shannon_entropy;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

lazy_static! {
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
}

const VOWELS: &[char] = &['a', 'e', 'i', 'o', 'u'];

/// Which heuristic flagged the text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GibberishTrigger {
    HighEntropy,
    LowVowelRatio,
    NoWordPattern,
}

/// Measurements behind a verdict, kept for diagnostics
#[derive(Debug, Clone, Serialize)]
pub struct GibberishSignals {
    pub entropy: f64,
    /// `None` when the compact text has no letters
    pub vowel_ratio: Option<f64>,
    pub longest_letter_run: usize,
    pub trigger: Option<GibberishTrigger>,
}

impl GibberishSignals {
    pub fn is_gibberish(&self) -> bool {
        self.trigger.is_some()
    }
}

#[derive(Debug, Clone, Default)]
pub struct GibberishDetector {
    config: GibberishConfig,
}

impl GibberishDetector {
    pub fn new(config: GibberishConfig) -> Self {
        Self { config }
    }

    pub fn looks_like_gibberish(&self, text: &str) -> bool {
        self.inspect(text).is_gibberish()
    }

    /// Measure every heuristic and report the first one that fires.
    ///
    /// Entropy and vowel ratio are computed on the lower-cased text with all
    /// whitespace removed; the word-pattern check runs on the lower-cased,
    /// trimmed text. The vowel check is skipped when there are no letters at
    /// all, since the word-pattern check always fires in that case.
    pub fn inspect(&self, text: &str) -> GibberishSignals {
        let lowered = text.to_lowercase();
        let lowered = lowered.trim();
        let compact = WHITESPACE_RUN.replace_all(lowered, "");

        let entropy = shannon_entropy(&compact);

        let letters = compact.chars().filter(|c| c.is_alphabetic()).count();
        let vowels = compact.chars().filter(|c| VOWELS.contains(c)).count();
        let vowel_ratio = (letters > 0).then(|| vowels as f64 / letters as f64);

        let longest_letter_run = longest_ascii_letter_run(lowered);

        let trigger = if entropy > self.config.max_entropy {
            Some(GibberishTrigger::HighEntropy)
        } else if vowel_ratio.is_some_and(|r| r < self.config.min_vowel_ratio) {
            Some(GibberishTrigger::LowVowelRatio)
        } else if longest_letter_run < self.config.min_word_run {
            Some(GibberishTrigger::NoWordPattern)
        } else {
            None
        };

        GibberishSignals {
            entropy,
            vowel_ratio,
            longest_letter_run,
            trigger,
        }
    }
}

/// Convenience check with the default thresholds.
pub fn looks_like_gibberish(text: &str) -> bool {
    GibberishDetector::default().looks_like_gibberish(text)
}

/// Longest run of consecutive `a-z` characters.
fn longest_ascii_letter_run(text: &str) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for c in text.chars() {
        if c.is_ascii_lowercase() {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}
