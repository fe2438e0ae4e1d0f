use async_trait::async_trait;
use reqwest::Client;

use super::models::{
    GeminiContent, GeminiInlineData, GeminiPart, GeminiRequest, GeminiResponse,
};
use crate::models::MessagePart;
use crate::providers::traits::GenerationProvider;
use crate::providers::types::{GenerateRequest, InlinePayload, ProviderError};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiProvider {
    client: Client,
}

impl GeminiProvider {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    fn base_url(custom: Option<&str>) -> &str {
        match custom {
            Some(url) if !url.is_empty() => url,
            _ => DEFAULT_BASE_URL,
        }
    }

    /// Parse an API error response body into a user-friendly message.
    fn parse_error_message(status: reqwest::StatusCode, body: &str) -> String {
        if let Ok(parsed) = serde_json::from_str::<serde_json::Value>(body) {
            if let Some(msg) = parsed["error"]["message"].as_str() {
                return format!("HTTP {}: {}", status.as_u16(), msg);
            }
        }
        format!("HTTP {}: Request failed", status.as_u16())
    }

    /// Attachments go first (images being analyzed or edited), then the
    /// text prompt when non-empty.
    fn build_parts(prompt: &str, attachments: &[InlinePayload]) -> Vec<GeminiPart> {
        let mut parts: Vec<GeminiPart> = attachments
            .iter()
            .map(|att| GeminiPart {
                text: None,
                inline_data: Some(GeminiInlineData {
                    mime_type: att.mime_type.clone(),
                    data: att.data.clone(),
                }),
            })
            .collect();

        if !prompt.is_empty() {
            parts.push(GeminiPart {
                text: Some(prompt.to_string()),
                inline_data: None,
            });
        }
        parts
    }

    /// One assistant turn's parts, in candidate order. An empty
    /// candidate list yields an empty part list rather than an error.
    fn response_parts(response: GeminiResponse) -> Result<Vec<MessagePart>, ProviderError> {
        if let Some(error) = response.error {
            return Err(ProviderError::RequestFailed(
                error.message.unwrap_or_else(|| "Unknown error".to_string()),
            ));
        }

        let parts = response
            .candidates
            .and_then(|c| c.into_iter().next())
            .and_then(|c| c.content)
            .map(|c| c.parts)
            .unwrap_or_default();

        Ok(parts
            .into_iter()
            .filter_map(|p| {
                if let Some(text) = p.text {
                    Some(MessagePart::Text(text))
                } else {
                    p.inline_data.map(|d| MessagePart::InlineData {
                        mime_type: d.mime_type,
                        data: d.data,
                    })
                }
            })
            .collect())
    }
}

impl Default for GeminiProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerationProvider for GeminiProvider {
    async fn generate(
        &self,
        request: GenerateRequest,
    ) -> Result<Vec<MessagePart>, ProviderError> {
        let base = Self::base_url(request.base_url.as_deref());
        let url = format!("{}/models/{}:generateContent", base, request.model);

        let system_instruction = request.system_instruction.as_ref().map(|prompt| {
            GeminiContent {
                role: "user".to_string(),
                parts: vec![GeminiPart {
                    text: Some(prompt.clone()),
                    inline_data: None,
                }],
            }
        });

        let gemini_request = GeminiRequest {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts: Self::build_parts(&request.prompt, &request.attachments),
            }],
            system_instruction,
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &request.api_key)
            .json(&gemini_request)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(ProviderError::AuthError("Invalid API key".to_string()));
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited);
        }
        if status == reqwest::StatusCode::SERVICE_UNAVAILABLE {
            return Err(ProviderError::Overloaded);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::RequestFailed(Self::parse_error_message(
                status, &body,
            )));
        }

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        Self::response_parts(gemini_response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parts_put_attachments_before_prompt() {
        let attachments = vec![InlinePayload {
            mime_type: "image/png".into(),
            data: "QUJD".into(),
        }];
        let parts = GeminiProvider::build_parts("describe this", &attachments);

        assert_eq!(parts.len(), 2);
        assert!(parts[0].inline_data.is_some());
        assert_eq!(parts[1].text.as_deref(), Some("describe this"));

        // An empty prompt contributes no text part.
        let parts = GeminiProvider::build_parts("", &attachments);
        assert_eq!(parts.len(), 1);
    }

    #[test]
    fn response_parts_map_text_and_images() {
        let response: GeminiResponse = serde_json::from_str(
            r#"{
                "candidates": [{
                    "content": {
                        "role": "model",
                        "parts": [
                            {"inlineData": {"mimeType": "image/png", "data": "QUJD"}},
                            {"text": "here you go"}
                        ]
                    }
                }]
            }"#,
        )
        .unwrap();

        let parts = GeminiProvider::response_parts(response).unwrap();
        assert_eq!(
            parts,
            vec![
                MessagePart::InlineData {
                    mime_type: "image/png".into(),
                    data: "QUJD".into(),
                },
                MessagePart::Text("here you go".into()),
            ]
        );
    }

    #[test]
    fn empty_candidates_yield_no_parts() {
        let response: GeminiResponse = serde_json::from_str("{}").unwrap();
        assert!(GeminiProvider::response_parts(response).unwrap().is_empty());
    }

    #[test]
    fn body_error_becomes_request_failed() {
        let response: GeminiResponse =
            serde_json::from_str(r#"{"error": {"message": "model not found"}}"#).unwrap();
        let err = GeminiProvider::response_parts(response).unwrap_err();
        assert!(matches!(err, ProviderError::RequestFailed(m) if m == "model not found"));
    }

    #[test]
    fn parse_error_message_extracts_json_message() {
        let status = reqwest::StatusCode::BAD_REQUEST;
        let msg = GeminiProvider::parse_error_message(
            status,
            r#"{"error": {"message": "Quota exceeded for quota metric"}}"#,
        );
        assert_eq!(msg, "HTTP 400: Quota exceeded for quota metric");

        let msg = GeminiProvider::parse_error_message(status, "not json");
        assert_eq!(msg, "HTTP 400: Request failed");
    }
}
