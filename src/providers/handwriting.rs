use std::time::Duration;

use hmac::{Hmac, Mac};
use reqwest::{header::CONTENT_TYPE, StatusCode};
use serde_json::Value;
use sha2::Sha512;

use crate::{
    core::{
        errors::{AppError, AppResult},
        types::DrawingData,
    },
    security::keyring::HandwritingKeys,
};

const BATCH_ENDPOINT: &str = "https://cloud.myscript.com/api/v4.0/iink/batch";
const LANGUAGE: &str = "en_GB";

#[derive(Debug, Clone)]
pub struct HandwritingClient {
    http: reqwest::Client,
    endpoint: String,
}

#[derive(Debug, Clone)]
pub struct HandwritingExport {
    pub text: String,
    pub confidence: Option<f64>,
}

impl HandwritingClient {
    pub fn new() -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(20))
            .build()
            .map_err(|err| AppError::Network(err.to_string()))?;
        Ok(Self {
            http,
            endpoint: BATCH_ENDPOINT.to_string(),
        })
    }

    pub async fn recognize(
        &self,
        keys: &HandwritingKeys,
        drawing: &DrawingData,
    ) -> AppResult<HandwritingExport> {
        let body = serde_json::to_string(&request_payload(drawing))?;
        let signature = sign_request(keys, &body)?;

        let response = self
            .http
            .post(&self.endpoint)
            .header("applicationKey", &keys.application_key)
            .header("hmac", signature)
            .header(CONTENT_TYPE, "application/json")
            .header("Accept", "text/plain, application/json")
            .body(body)
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

        let raw = response
            .text()
            .await
            .map_err(|err| AppError::ProviderInvalidResponse(err.to_string()))?;
        Ok(parse_export(&raw))
    }
}

fn request_payload(drawing: &DrawingData) -> Value {
    if drawing.has_strokes() {
        let groups: Vec<Value> = vec![serde_json::json!({
            "strokes": drawing
                .strokes
                .iter()
                .filter(|stroke| !stroke.points.is_empty())
                .map(|stroke| {
                    serde_json::json!({
                        "x": stroke.points.iter().map(|p| p.x).collect::<Vec<_>>(),
                        "y": stroke.points.iter().map(|p| p.y).collect::<Vec<_>>(),
                        "t": stroke.points.iter().map(|p| p.t).collect::<Vec<_>>(),
                    })
                })
                .collect::<Vec<_>>()
        })];
        serde_json::json!({
            "configuration": { "lang": LANGUAGE, "export": { "mimeTypes": ["text/plain"] } },
            "contentType": "Text",
            "width": drawing.width,
            "height": drawing.height,
            "strokeGroups": groups,
        })
    } else {
        serde_json::json!({
            "configuration": { "lang": LANGUAGE, "export": { "mimeTypes": ["text/plain"] } },
            "contentType": "Text",
            "width": drawing.width,
            "height": drawing.height,
            "image": drawing.image_png.clone().unwrap_or_default(),
            "mimeType": "image/png",
        })
    }
}

fn sign_request(keys: &HandwritingKeys, body: &str) -> AppResult<String> {
    let mut mac =
        Hmac::<Sha512>::new_from_slice(
            format!("{}{}", keys.application_key, keys.signing_key).as_bytes(),
        )
        .map_err(|err| AppError::Internal(err.to_string()))?;
    mac.update(body.as_bytes());
    Ok(format!("{:x}", mac.finalize().into_bytes()))
}

// The service exports plain text either directly or nested under an "exports"
// key, with an optional confidence number alongside.
fn parse_export(raw: &str) -> HandwritingExport {
    match serde_json::from_str::<Value>(raw) {
        Ok(body) => {
            let text = body
                .get("exports")
                .and_then(|exports| exports.get("text/plain"))
                .and_then(Value::as_str)
                .or_else(|| body.get("label").and_then(Value::as_str))
                .or_else(|| body.get("text").and_then(Value::as_str))
                .unwrap_or(raw)
                .to_string();
            let confidence = body
                .get("confidence")
                .and_then(Value::as_f64)
                .map(|value| value.clamp(0.0, 1.0));
            HandwritingExport { text, confidence }
        }
        Err(_) => HandwritingExport {
            text: raw.to_string(),
            confidence: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::parse_export;

    #[test]
    fn parse_export_reads_nested_plain_text_and_confidence() {
        let raw = r#"{"exports":{"text/plain":"John Smith, 07712345678"},"confidence":0.93}"#;
        let export = parse_export(raw);
        assert_eq!(export.text, "John Smith, 07712345678");
        assert_eq!(export.confidence, Some(0.93));
    }

    #[test]
    fn parse_export_falls_back_to_raw_body_for_plain_text_responses() {
        let export = parse_export("Brake pads grinding");
        assert_eq!(export.text, "Brake pads grinding");
        assert!(export.confidence.is_none());
    }
}
