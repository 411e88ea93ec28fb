//! Ollama chat client

use crate::reporting::ai_report::ReportError;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

/// Minimal client for Ollama's non-streaming chat endpoint
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl OllamaClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ReportError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            url: url.into(),
            timeout,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send one user message and return the model's reply text
    pub async fn chat(&self, model: &str, prompt: &str) -> Result<String, ReportError> {
        let body = serde_json::json!({
            "model": model,
            "messages": [
                {
                    "role": "user",
                    "content": prompt,
                }
            ],
            "stream": false,
        });

        tracing::debug!(url = %self.url, model, prompt_chars = prompt.len(), "sending chat request");

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| self.classify(e))?;

        if status != reqwest::StatusCode::OK {
            return Err(ReportError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| ReportError::MalformedResponse(e.to_string()))?;

        if parsed.message.content.trim().is_empty() {
            return Err(ReportError::EmptyResponse);
        }

        Ok(parsed.message.content)
    }

    fn classify(&self, error: reqwest::Error) -> ReportError {
        if error.is_timeout() {
            ReportError::Timeout {
                secs: self.timeout.as_secs(),
            }
        } else if error.is_connect() {
            ReportError::Unreachable {
                url: self.url.clone(),
            }
        } else {
            ReportError::Request(error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer, timeout: Duration) -> OllamaClient {
        OllamaClient::new(format!("{}/api/chat", server.uri()), timeout).unwrap()
    }

    #[tokio::test]
    async fn test_chat_sends_non_streaming_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_partial_json(serde_json::json!({
                "model": "llama3.1",
                "stream": false,
                "messages": [{ "role": "user", "content": "hello" }],
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "model": "llama3.1",
                "message": { "role": "assistant", "content": "# Report" },
                "done": true,
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = client(&server, Duration::from_secs(5))
            .chat("llama3.1", "hello")
            .await
            .unwrap();

        assert_eq!(reply, "# Report");
    }

    #[tokio::test]
    async fn test_non_200_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404).set_body_string("model 'nope' not found"))
            .mount(&server)
            .await;

        let error = client(&server, Duration::from_secs(5))
            .chat("nope", "hello")
            .await
            .unwrap_err();

        match error {
            ReportError::Status { status, body } => {
                assert_eq!(status, 404);
                assert!(body.contains("not found"));
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_and_empty_responses() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({ "model": "broken" })))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({ "model": "quiet" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message": { "role": "assistant", "content": "" },
            })))
            .mount(&server)
            .await;

        let client = client(&server, Duration::from_secs(5));

        assert!(matches!(
            client.chat("broken", "hello").await,
            Err(ReportError::MalformedResponse(_))
        ));
        assert!(matches!(
            client.chat("quiet", "hello").await,
            Err(ReportError::EmptyResponse)
        ));
    }

    #[tokio::test]
    async fn test_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let error = client(&server, Duration::from_millis(200))
            .chat("llama3.1", "hello")
            .await
            .unwrap_err();

        assert!(matches!(error, ReportError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint() {
        let client = OllamaClient::new("http://127.0.0.1:1/api/chat", Duration::from_secs(5)).unwrap();
        let error = client.chat("llama3.1", "hello").await.unwrap_err();

        assert!(matches!(error, ReportError::Unreachable { .. }));
        assert!(error.hint().contains("ollama serve"));
    }
}
