use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::errors::{AppError, AppResult};

#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    model: String,
}

// Wire shape the extraction service is instructed to return: every key a
// string or explicitly null. Any other value type is a shape violation and
// fails deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExtractedFieldsWire {
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub vehicle: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub registration: Option<String>,
    #[serde(default)]
    pub issue: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ExtractionOutput {
    pub fields: ExtractedFieldsWire,
    pub prompt_tokens: Option<f64>,
    pub output_tokens: Option<f64>,
}

impl GeminiClient {
    pub fn new(model: impl Into<String>) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(20))
            .build()
            .map_err(|err| AppError::Network(err.to_string()))?;
        Ok(Self {
            http,
            model: model.into(),
        })
    }

    pub async fn extract_fields(&self, api_key: &str, prompt: &str) -> AppResult<ExtractionOutput> {
        let endpoint = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            self.model, api_key
        );
        let payload = serde_json::json!({
            "contents": [
                {
                    "role": "user",
                    "parts": [{"text": prompt}]
                }
            ],
            "generationConfig": {
                "temperature": 0.1,
                "responseMimeType": "application/json"
            }
        });

        let response = self
            .http
            .post(endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    AppError::ProviderTimeout
                } else {
                    AppError::Network(err.to_string())
                }
            })?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => return Err(AppError::ProviderAuth),
            StatusCode::TOO_MANY_REQUESTS => return Err(AppError::ProviderRateLimited),
            status if !status.is_success() => {
                let body = response.text().await.unwrap_or_default();
                return Err(AppError::ProviderInvalidResponse(format!(
                    "status {status} body {body}"
                )));
            }
            _ => {}
        }

        let body: Value = response
            .json()
            .await
            .map_err(|err| AppError::ProviderInvalidResponse(err.to_string()))?;
        let text = body
            .get("candidates")
            .and_then(Value::as_array)
            .and_then(|items: &Vec<Value>| items.first())
            .and_then(|item: &Value| item.get("content"))
            .and_then(|content: &Value| content.get("parts"))
            .and_then(Value::as_array)
            .and_then(|parts: &Vec<Value>| parts.first())
            .and_then(|part: &Value| part.get("text"))
            .and_then(Value::as_str)
            .ok_or_else(|| AppError::ProviderInvalidResponse("missing text candidate".to_string()))?;

        let fields: ExtractedFieldsWire = serde_json::from_str(text).map_err(|err| {
            AppError::ProviderInvalidResponse(format!("model output shape invalid: {err}"))
        })?;

        let usage = body.get("usageMetadata");
        let prompt_tokens = usage
            .and_then(|meta| meta.get("promptTokenCount"))
            .and_then(Value::as_f64);
        let output_tokens = usage
            .and_then(|meta| meta.get("candidatesTokenCount"))
            .and_then(Value::as_f64);

        Ok(ExtractionOutput {
            fields,
            prompt_tokens,
            output_tokens,
        })
    }
}
