//! Client for the local Ollama daemon.
//!
//! Wraps the two endpoints the harness needs: `/api/pull` to make sure a
//! model is available, and `/api/generate` for non-streaming completions. A
//! single failed call aborts processing for the current model; there is no
//! retry logic.

use color_eyre::{
    Result, Section, SectionExt,
    eyre::{Context, eyre},
};
use serde::Deserialize;
use serde_json::json;

/// Default daemon address.
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Blocking client for the daemon's pull/generate API.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    http: reqwest::blocking::Client,
    base_url: String,
}

impl OllamaClient {
    /// Create a client for the daemon at `base_url`.
    ///
    /// The request timeout is disabled: generation can legitimately take
    /// minutes on large models.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(None)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    /// Pull a model so it is available locally.
    ///
    /// A non-success response is fatal to the current model's run; the
    /// response body is attached to the error as a diagnostic.
    #[tracing::instrument(skip(self))]
    pub fn pull(&self, model: &str) -> Result<()> {
        let response = self
            .http
            .post(format!("{}/api/pull", self.base_url))
            .json(&json!({ "name": model, "stream": false }))
            .send()
            .with_context(|| format!("pull model {model:?}"))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().unwrap_or_default();
            Err(eyre!("pull model {model:?}: daemon returned {status}"))
                .section(body.header("Response:"))
        }
    }

    /// Request a non-streaming completion and return the raw response body.
    ///
    /// The body is kept raw so it can be logged verbatim before parsing; use
    /// [`GenerateResponse::parse`] on it. Failure semantics mirror
    /// [`pull`](Self::pull).
    #[tracing::instrument(skip(self, prompt))]
    pub fn generate(&self, model: &str, prompt: &str) -> Result<String> {
        let response = self
            .http
            .post(format!("{}/api/generate", self.base_url))
            .json(&json!({ "model": model, "prompt": prompt, "stream": false }))
            .send()
            .with_context(|| format!("query model {model:?}"))?;

        let status = response.status();
        let body = response.text().context("read generate response body")?;
        if status.is_success() {
            Ok(body)
        } else {
            Err(eyre!("query model {model:?}: daemon returned {status}"))
                .section(body.header("Response:"))
        }
    }

    /// Force a model load before timing begins by sending a trivial prompt.
    #[tracing::instrument(skip(self))]
    pub fn warm_up(&self, model: &str) -> Result<()> {
        self.generate(model, "Hello").map(drop)
    }
}

/// A parsed `/api/generate` result record.
///
/// Fields the daemon may omit are defaulted rather than rejected.
#[derive(Debug, Clone, Deserialize)]
#[non_exhaustive]
pub struct GenerateResponse {
    #[serde(default)]
    pub model: String,

    #[serde(default)]
    pub created_at: String,

    /// The generated text.
    #[serde(default)]
    pub response: String,

    #[serde(default)]
    pub done: bool,

    #[serde(default)]
    pub done_reason: Option<String>,

    /// Continuation context tokens.
    #[serde(default)]
    pub context: Vec<i64>,

    #[serde(default)]
    pub total_duration: u64,

    #[serde(default)]
    pub load_duration: u64,

    #[serde(default)]
    pub prompt_eval_count: u64,

    #[serde(default)]
    pub prompt_eval_duration: u64,

    #[serde(default)]
    pub eval_count: u64,

    #[serde(default)]
    pub eval_duration: u64,
}

impl GenerateResponse {
    /// Parse a raw response body.
    pub fn parse(body: &str) -> Result<Self> {
        serde_json::from_str(body).context("parse generate response")
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parses_full_response() {
        let body = r#"{
            "model": "llama3.2:1b",
            "created_at": "2025-01-01T00:00:00Z",
            "response": "```csharp\nclass P {}\n```",
            "done": true,
            "done_reason": "stop",
            "context": [1, 2, 3],
            "total_duration": 1000,
            "load_duration": 100,
            "prompt_eval_count": 10,
            "prompt_eval_duration": 200,
            "eval_count": 20,
            "eval_duration": 700
        }"#;

        let parsed = GenerateResponse::parse(body).unwrap();
        assert_eq!(parsed.model, "llama3.2:1b");
        assert!(parsed.response.contains("class P"));
        assert!(parsed.done);
        assert_eq!(parsed.context, vec![1, 2, 3]);
        assert_eq!(parsed.eval_count, 20);
    }

    #[test]
    fn missing_fields_default() {
        let parsed = GenerateResponse::parse(r#"{"response": "hi"}"#).unwrap();
        assert_eq!(parsed.response, "hi");
        assert!(!parsed.done);
        assert_eq!(parsed.done_reason, None);
        assert!(parsed.context.is_empty());
    }

    #[test]
    fn garbage_body_is_an_error() {
        assert!(GenerateResponse::parse("not json").is_err());
    }
}
