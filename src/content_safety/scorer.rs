//! Toxicity scoring capabilities injected into the assessor.

use super::error::ScoreUnavailable;
use super::safety::{keyword_score, TextContext};
use crate::config::GuardConfig;

/// Scores a piece of text in [0, 1]; higher is more toxic.
pub trait ToxicityScorer: Send + Sync {
    fn score(&self, text: &str) -> Result<f64, ScoreUnavailable>;

    fn name(&self) -> &str;
}

/// Local heuristic used when no remote scorer is configured.
#[derive(Debug, Clone)]
pub struct KeywordScorer {
    terms: Vec<String>,
    weight: f64,
}

impl KeywordScorer {
    pub fn new<I, S>(terms: I, weight: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for term in terms {
            let lower = term.as_ref().trim().to_lowercase();
            if !lower.is_empty() && !normalized.contains(&lower) {
                normalized.push(lower);
            }
        }
        KeywordScorer {
            terms: normalized,
            weight,
        }
    }

    pub fn from_config(config: &GuardConfig) -> Self {
        Self::new(&config.suspicious_terms, config.term_weight)
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Score plus the terms that produced it.
    pub fn explain(&self, text: &str) -> (f64, Vec<String>) {
        keyword_score(&TextContext::new(text), &self.terms, self.weight)
    }
}

impl ToxicityScorer for KeywordScorer {
    fn score(&self, text: &str) -> Result<f64, ScoreUnavailable> {
        Ok(self.explain(text).0)
    }

    fn name(&self) -> &str {
        "keyword-heuristic"
    }
}

#[cfg(feature = "perspective")]
pub use perspective::PerspectiveScorer;

#[cfg(feature = "perspective")]
mod perspective {
    use serde::Deserialize;
    use std::collections::HashMap;
    use std::time::Duration;

    use super::{ScoreUnavailable, ToxicityScorer};

    pub const API_KEY_ENV: &str = "PERSPECTIVE_API_KEY";
    const DEFAULT_ENDPOINT: &str =
        "https://commentanalyzer.googleapis.com/v1alpha1/comments:analyze";
    const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    #[derive(Debug, Deserialize)]
    struct AnalyzeResponse {
        #[serde(rename = "attributeScores")]
        attribute_scores: Option<HashMap<String, AttributeScore>>,
    }

    #[derive(Debug, Deserialize)]
    struct AttributeScore {
        #[serde(rename = "summaryScore")]
        summary_score: SummaryScore,
    }

    #[derive(Debug, Deserialize)]
    struct SummaryScore {
        value: f64,
    }

    /// Remote scorer backed by a comment-analysis moderation endpoint.
    pub struct PerspectiveScorer {
        client: reqwest::blocking::Client,
        endpoint: String,
        api_key: String,
    }

    impl PerspectiveScorer {
        pub fn new(api_key: impl Into<String>) -> Result<Self, ScoreUnavailable> {
            Self::with_endpoint(DEFAULT_ENDPOINT, api_key, DEFAULT_TIMEOUT)
        }

        pub fn with_endpoint(
            endpoint: impl Into<String>,
            api_key: impl Into<String>,
            timeout: Duration,
        ) -> Result<Self, ScoreUnavailable> {
            let client = reqwest::blocking::Client::builder()
                .timeout(timeout)
                .build()
                .map_err(|err| ScoreUnavailable::new(format!("client setup failed: {}", err)))?;
            Ok(PerspectiveScorer {
                client,
                endpoint: endpoint.into(),
                api_key: api_key.into(),
            })
        }

        /// `None` when no key is exported or the client cannot be built.
        pub fn from_env() -> Option<Self> {
            let key = std::env::var(API_KEY_ENV).ok()?;
            if key.trim().is_empty() {
                return None;
            }
            match Self::new(key.trim()) {
                Ok(scorer) => Some(scorer),
                Err(err) => {
                    log::warn!("{}", err);
                    None
                }
            }
        }
    }

    pub(crate) fn request_body(text: &str) -> serde_json::Value {
        serde_json::json!({
            "comment": { "text": text },
            "requestedAttributes": {
                "TOXICITY": {},
                "SEVERE_TOXICITY": {},
                "THREAT": {}
            }
        })
    }

    pub(crate) fn parse_toxicity(raw: &str) -> Result<f64, ScoreUnavailable> {
        let response: AnalyzeResponse = serde_json::from_str(raw)
            .map_err(|err| ScoreUnavailable::new(format!("malformed response: {}", err)))?;
        response
            .attribute_scores
            .and_then(|scores| scores.get("TOXICITY").map(|attr| attr.summary_score.value))
            .ok_or_else(|| ScoreUnavailable::new("response carried no TOXICITY score"))
    }

    impl ToxicityScorer for PerspectiveScorer {
        fn score(&self, text: &str) -> Result<f64, ScoreUnavailable> {
            let response = self
                .client
                .post(&self.endpoint)
                .query(&[("key", self.api_key.as_str())])
                .json(&request_body(text))
                .send()
                .map_err(|err| ScoreUnavailable::new(format!("request failed: {}", err)))?;

            let status = response.status();
            let body = response
                .text()
                .map_err(|err| ScoreUnavailable::new(format!("unreadable response: {}", err)))?;
            if !status.is_success() {
                return Err(ScoreUnavailable::new(format!(
                    "endpoint returned {}",
                    status
                )));
            }
            parse_toxicity(&body)
        }

        fn name(&self) -> &str {
            "perspective"
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn request_asks_for_three_attributes() {
            let body = request_body("hello");
            assert_eq!(body["comment"]["text"], "hello");
            let attrs = body["requestedAttributes"].as_object().unwrap();
            assert_eq!(attrs.len(), 3);
            for key in ["TOXICITY", "SEVERE_TOXICITY", "THREAT"] {
                assert!(attrs.contains_key(key), "missing {}", key);
            }
        }

        #[test]
        fn toxicity_summary_is_extracted() {
            let raw = r#"{
                "attributeScores": {
                    "TOXICITY": { "summaryScore": { "value": 0.83, "type": "PROBABILITY" } },
                    "THREAT": { "summaryScore": { "value": 0.12, "type": "PROBABILITY" } }
                },
                "languages": ["en"]
            }"#;
            assert_eq!(parse_toxicity(raw).unwrap(), 0.83);
        }

        #[test]
        fn missing_scores_are_unavailable() {
            assert!(parse_toxicity(r#"{"languages":["en"]}"#).is_err());
            assert!(parse_toxicity("<html>").is_err());
        }
    }
}
