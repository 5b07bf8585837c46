//! Model service API client module
//!
//! Talks to an HTTP inference server hosting the summarization model. The server
//! exposes the model's tokenizer and `generate` as three JSON endpoints.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use super::model::{GenerationParams, SummarizationModel};
use crate::core::config::AppConfig;
use crate::errors::BotError;

#[derive(Debug, Serialize)]
struct TokenizeRequest<'a> {
    text: &'a str,
    max_length: usize,
    truncation: bool,
}

#[derive(Debug, Deserialize)]
struct TokenizeResponse {
    input_ids: Vec<u32>,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    input_ids: &'a [u32],
    #[serde(flatten)]
    params: GenerationParams,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    output_ids: Vec<u32>,
}

#[derive(Debug, Serialize)]
struct DetokenizeRequest<'a> {
    ids: &'a [u32],
    skip_special_tokens: bool,
}

#[derive(Debug, Deserialize)]
struct DetokenizeResponse {
    text: String,
}

/// Model service client for generating summaries
pub struct ModelServiceClient {
    http: Client,
    base_url: Url,
    api_token: Option<String>,
    model_name: String,
}

impl ModelServiceClient {
    #[must_use]
    pub fn new(
        base_url: Url,
        api_token: Option<String>,
        model_name: String,
        timeout: Duration,
    ) -> Self {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            http,
            base_url,
            api_token,
            model_name,
        }
    }

    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.model_service_url.clone(),
            config.model_service_token.clone(),
            config.model_name.clone(),
            config.model_timeout,
        )
    }

    fn endpoint(&self, name: &str) -> Result<Url, BotError> {
        // Keep any path prefix on the base URL (`https://host/v1/` + `generate`).
        let mut base = self.base_url.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        base.join(name)
            .map_err(|e| BotError::ConfigError(format!("model service URL: {e}")))
    }

    async fn post<B: Serialize + Sync, R: DeserializeOwned>(
        &self,
        name: &str,
        body: &B,
    ) -> Result<R, BotError> {
        let url = self.endpoint(name)?;
        let mut request = self.http.post(url).json(body);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let resp = request
            .send()
            .await
            .map_err(|e| BotError::ModelError(format!("{name} request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body_text = resp
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read body>".to_string());
            return Err(BotError::ModelError(format!(
                "{name} HTTP {status}: {body_text}"
            )));
        }

        resp.json::<R>()
            .await
            .map_err(|e| BotError::ModelError(format!("{name} JSON parse error: {e}")))
    }
}

#[async_trait]
impl SummarizationModel for ModelServiceClient {
    async fn tokenize(
        &self,
        text: &str,
        max_length: usize,
        truncation: bool,
    ) -> Result<Vec<u32>, BotError> {
        let resp: TokenizeResponse = self
            .post(
                "tokenize",
                &TokenizeRequest {
                    text,
                    max_length,
                    truncation,
                },
            )
            .await?;
        debug!(tokens = resp.input_ids.len(), "Tokenized input");
        Ok(resp.input_ids)
    }

    async fn generate(
        &self,
        input_ids: &[u32],
        params: GenerationParams,
    ) -> Result<Vec<u32>, BotError> {
        #[cfg(feature = "debug-logs")]
        info!("Generation request: {} input ids, {:?}", input_ids.len(), params);

        let resp: GenerateResponse = self
            .post(
                "generate",
                &GenerateRequest {
                    model: &self.model_name,
                    input_ids,
                    params,
                },
            )
            .await?;
        info!(
            model = %self.model_name,
            input_tokens = input_ids.len(),
            output_tokens = resp.output_ids.len(),
            "Generation finished"
        );
        Ok(resp.output_ids)
    }

    async fn detokenize(
        &self,
        ids: &[u32],
        skip_special_tokens: bool,
    ) -> Result<String, BotError> {
        let resp: DetokenizeResponse = self
            .post(
                "detokenize",
                &DetokenizeRequest {
                    ids,
                    skip_special_tokens,
                },
            )
            .await?;
        Ok(resp.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client(base: &str) -> ModelServiceClient {
        ModelServiceClient::new(
            Url::parse(base).unwrap(),
            None,
            "test-model".into(),
            Duration::from_secs(5),
        )
    }

    #[test]
    fn test_endpoint_keeps_path_prefix() {
        let c = client("https://models.example.com/v1");
        assert_eq!(
            c.endpoint("generate").unwrap().as_str(),
            "https://models.example.com/v1/generate"
        );

        let c = client("http://127.0.0.1:8000");
        assert_eq!(
            c.endpoint("tokenize").unwrap().as_str(),
            "http://127.0.0.1:8000/tokenize"
        );
    }

    #[test]
    fn test_generate_request_flattens_params() {
        let ids = [1, 2, 3];
        let body = serde_json::to_value(GenerateRequest {
            model: "m",
            input_ids: &ids,
            params: GenerationParams::with_min_length(50),
        })
        .unwrap();
        assert_eq!(
            body,
            json!({
                "model": "m",
                "input_ids": [1, 2, 3],
                "min_length": 50,
                "max_length": 512,
                "no_repeat_ngram_size": 2
            })
        );
    }
}
