// Remote classifiers - Hugging Face Inference API compatible text-classification
use crate::classifiers::{
    emotion_scores_from_labels, ClassifierError, EmotionClassifier, SentimentClassifier,
};
use crate::config::InferenceConfig;
use crate::models::{Emotion, EmotionScores, SentimentPrediction};
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// One `{label, score}` entry of a text-classification response
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ClassificationResponse {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
    Error { error: String },
}

/// Parse a text-classification body. Single inputs come back either as a flat
/// list or wrapped in a one-element outer list.
pub fn parse_classification(body: &str) -> Result<Vec<LabelScore>, ClassifierError> {
    let response: ClassificationResponse = serde_json::from_str(body)
        .map_err(|e| ClassifierError::Malformed(format!("{}: {}", e, truncate(body, 200))))?;

    let entries = match response {
        ClassificationResponse::Flat(entries) => entries,
        ClassificationResponse::Nested(mut batches) => {
            if batches.len() != 1 {
                return Err(ClassifierError::Malformed(format!(
                    "expected one result set, got {}",
                    batches.len()
                )));
            }
            batches.remove(0)
        }
        ClassificationResponse::Error { error } => {
            return Err(ClassifierError::Api {
                status: 200,
                message: error,
            })
        }
    };

    if entries.is_empty() {
        return Err(ClassifierError::Malformed("empty label list".into()));
    }

    Ok(entries)
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Blocking HTTP client shared by both remote classifiers.
pub struct InferenceClient {
    client: Client,
    endpoint: String,
    api_token: Option<String>,
}

impl InferenceClient {
    pub fn new(config: &InferenceConfig) -> Result<Self, ClassifierError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
        })
    }

    pub fn model_url(&self, model: &str) -> String {
        format!("{}/models/{}", self.endpoint, model)
    }

    pub fn classify(
        &self,
        model: &str,
        text: &str,
        top_k: Option<usize>,
    ) -> Result<Vec<LabelScore>, ClassifierError> {
        let url = self.model_url(model);
        let payload = match top_k {
            Some(k) => json!({ "inputs": text, "parameters": { "top_k": k } }),
            None => json!({ "inputs": text }),
        };

        debug!(%url, "requesting classification");
        let mut request = self.client.post(&url).json(&payload);
        if let Some(ref token) = self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send()?;
        let status = response.status();
        let body = response.text()?;

        if !status.is_success() {
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
                .unwrap_or_else(|| truncate(&body, 200).to_string());
            warn!(status = status.as_u16(), %message, "inference request failed");
            return Err(ClassifierError::Api {
                status: status.as_u16(),
                message,
            });
        }

        parse_classification(&body)
    }
}

/// Highest-scoring entry. Earlier entries win ties.
pub fn top_prediction(entries: &[LabelScore]) -> Result<SentimentPrediction, ClassifierError> {
    let mut iter = entries.iter();
    let first = iter
        .next()
        .ok_or_else(|| ClassifierError::Malformed("empty label list".into()))?;
    let best = iter.fold(first, |best, e| if e.score > best.score { e } else { best });
    Ok(SentimentPrediction::new(best.label.clone(), best.score))
}

pub struct HttpSentimentClassifier {
    client: Arc<InferenceClient>,
    model: String,
}

impl HttpSentimentClassifier {
    pub fn new(client: Arc<InferenceClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

impl SentimentClassifier for HttpSentimentClassifier {
    fn classify(&self, text: &str) -> Result<SentimentPrediction, ClassifierError> {
        let entries = self.client.classify(&self.model, text, None)?;
        top_prediction(&entries)
    }
}

pub struct HttpEmotionClassifier {
    client: Arc<InferenceClient>,
    model: String,
}

impl HttpEmotionClassifier {
    pub fn new(client: Arc<InferenceClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

impl EmotionClassifier for HttpEmotionClassifier {
    fn classify(&self, text: &str) -> Result<EmotionScores, ClassifierError> {
        let entries = self
            .client
            .classify(&self.model, text, Some(Emotion::COUNT))?;
        emotion_scores_from_labels(entries.iter().map(|e| (e.label.as_str(), e.score)))
    }
}
