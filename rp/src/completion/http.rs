//! HTTP completion client
//!
//! Speaks the chat-completions wire shape: POST `{model, messages, ...}`,
//! read `choices[0].message.content` and any `tool_calls` citations.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{CompletionClient, CompletionError, CompletionReply, CompletionRequest};
use crate::chat::ChatMessage;
use crate::config::CompletionConfig;

/// Completion client for an OpenAI-compatible endpoint
pub struct HttpCompletionClient {
    endpoint: String,
    model: String,
    api_key: Option<String>,
    max_tokens: Option<u32>,
    web_context: bool,
    timeout: Duration,
    http: Client,
}

impl HttpCompletionClient {
    /// Create a new client from configuration
    ///
    /// A configured but unset API key variable is only a warning: some
    /// endpoints (proxies, workers) accept unauthenticated requests.
    pub fn from_config(config: &CompletionConfig) -> Result<Self, CompletionError> {
        debug!(?config, "from_config: called");
        let api_key = match config.api_key_env.as_deref().filter(|v| !v.is_empty()) {
            Some(var) => match std::env::var(var) {
                Ok(key) if !key.trim().is_empty() => Some(key),
                _ => {
                    warn!("Environment variable {} is not set, sending unauthenticated requests", var);
                    None
                }
            },
            None => None,
        };

        let timeout = Duration::from_millis(config.timeout_ms);
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_key,
            max_tokens: config.max_tokens,
            web_context: config.web_context,
            timeout,
            http,
        })
    }

    /// Build the JSON request body
    fn build_request_body(&self, request: &CompletionRequest) -> serde_json::Value {
        debug!(%self.model, message_count = request.messages.len(), "build_request_body: called");

        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if !request.system_prompt.trim().is_empty() {
            messages.push(ChatMessage::system(request.system_prompt.clone()));
        }
        messages.extend(request.messages.iter().cloned());

        let mut body = serde_json::json!({
            "model": self.model,
            "messages": messages,
        });

        if let Some(max_tokens) = self.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        if self.web_context {
            body["tools"] = serde_json::json!(["browser"]);
        }

        body
    }
}

#[async_trait]
impl CompletionClient for HttpCompletionClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionReply, CompletionError> {
        debug!(%self.endpoint, "complete: called");
        let body = self.build_request_body(&request);

        let mut builder = self
            .http
            .post(&self.endpoint)
            .header("content-type", "application/json")
            .json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                CompletionError::Timeout(self.timeout)
            } else {
                CompletionError::Network(e)
            }
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            if e.is_timeout() {
                CompletionError::Timeout(self.timeout)
            } else {
                CompletionError::Network(e)
            }
        })?;

        if !status.is_success() {
            debug!(status = status.as_u16(), "complete: API error");
            return Err(CompletionError::Api {
                status: status.as_u16(),
                message: text,
            });
        }

        let reply = parse_reply(&text)?;
        info!(
            "Completion received: {} chars, {} citation(s)",
            reply.content.len(),
            reply.citations.len()
        );
        Ok(reply)
    }
}

/// Parse a successful response body
///
/// Missing `choices[0].message.content` is a `MalformedResponse`. Tool-call
/// citations are best-effort: payloads that do not parse, or parse without a
/// `url`, are skipped.
pub fn parse_reply(body: &str) -> Result<CompletionReply, CompletionError> {
    debug!(len = body.len(), "parse_reply: called");
    let api_response: ApiResponse = serde_json::from_str(body)
        .map_err(|e| CompletionError::MalformedResponse(format!("unexpected response body: {}", e)))?;

    let message = api_response
        .choices
        .and_then(|choices| choices.into_iter().next())
        .and_then(|choice| choice.message)
        .ok_or_else(|| CompletionError::MalformedResponse("response has no choices[0].message".to_string()))?;

    let content = message
        .content
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| CompletionError::MalformedResponse("choices[0].message.content is empty".to_string()))?;

    let mut citations: Vec<String> = Vec::new();
    for call in message.tool_calls.unwrap_or_default() {
        match citation_url(&call) {
            Some(url) if !citations.contains(&url) => citations.push(url),
            Some(_) => {}
            None => debug!("parse_reply: skipping tool call without a usable url"),
        }
    }

    Ok(CompletionReply { content, citations })
}

/// Pull `function.arguments.url` out of a tool call, tolerating string or object arguments
fn citation_url(call: &serde_json::Value) -> Option<String> {
    let arguments = call.get("function")?.get("arguments")?;
    let parsed;
    let arguments = match arguments {
        serde_json::Value::String(raw) => {
            parsed = serde_json::from_str::<serde_json::Value>(raw).ok()?;
            &parsed
        }
        other => other,
    };
    let url = arguments.get("url")?.as_str()?.trim();
    (!url.is_empty()).then(|| url.to_string())
}

// Response wire types; every field optional so shape errors become MalformedResponse

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    choices: Option<Vec<ApiChoice>>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    #[serde(default)]
    message: Option<ApiMessage>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<serde_json::Value>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    fn client(web_context: bool, max_tokens: Option<u32>) -> HttpCompletionClient {
        HttpCompletionClient {
            endpoint: "https://api.example.com/v1/chat/completions".to_string(),
            model: "gpt-4o".to_string(),
            api_key: None,
            max_tokens,
            web_context,
            timeout: Duration::from_secs(60),
            http: Client::new(),
        }
    }

    #[test]
    fn test_build_request_body_basic() {
        let request = CompletionRequest {
            system_prompt: "You are a beauty advisor".to_string(),
            messages: vec![ChatMessage::user("Hello")],
        };

        let body = client(false, None).build_request_body(&request);

        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "You are a beauty advisor");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "Hello");
        assert!(body.get("tools").is_none());
        assert!(body.get("max_tokens").is_none());
    }

    #[test]
    fn test_build_request_body_options() {
        let request = CompletionRequest {
            system_prompt: String::new(),
            messages: vec![ChatMessage::user("Hi")],
        };

        let body = client(true, Some(800)).build_request_body(&request);

        assert_eq!(body["tools"], serde_json::json!(["browser"]));
        assert_eq!(body["max_tokens"], 800);
        // Blank system prompt is not sent
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_parse_reply_content() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"Use cleanser first."}}]}"#;
        let reply = parse_reply(body).unwrap();
        assert_eq!(reply.content, "Use cleanser first.");
        assert!(reply.citations.is_empty());
    }

    #[test]
    fn test_parse_reply_missing_choices_is_malformed() {
        let result = parse_reply(r#"{"error":"nope"}"#);
        assert!(matches!(result, Err(CompletionError::MalformedResponse(_))));
    }

    #[test]
    fn test_parse_reply_empty_choices_is_malformed() {
        assert!(matches!(
            parse_reply(r#"{"choices":[]}"#),
            Err(CompletionError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_reply(r#"{"choices":[{"message":{"content":""}}]}"#),
            Err(CompletionError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_parse_reply_non_json_is_malformed() {
        assert!(matches!(
            parse_reply("<html>502</html>"),
            Err(CompletionError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_reply(r#"{"choices":"weird"}"#),
            Err(CompletionError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_parse_reply_skips_malformed_citations() {
        let body = r#"{
            "choices": [{
                "message": {
                    "content": "See sources.",
                    "tool_calls": [
                        {"function": {"name": "browser", "arguments": "{\"url\": \"https://a.example/one\"}"}},
                        {"function": {"name": "browser", "arguments": "{not json"}},
                        {"function": {"name": "browser", "arguments": "{\"query\": \"no url\"}"}},
                        {"function": {"name": "browser", "arguments": {"url": "https://b.example/two"}}},
                        {"type": "function"},
                        {"function": {"name": "browser", "arguments": "{\"url\": \"https://a.example/one\"}"}}
                    ]
                }
            }]
        }"#;

        let reply = parse_reply(body).unwrap();
        assert_eq!(reply.content, "See sources.");
        assert_eq!(
            reply.citations,
            vec!["https://a.example/one".to_string(), "https://b.example/two".to_string()]
        );
    }

    /// Read one HTTP request (headers plus Content-Length body)
    async fn read_request(socket: &mut TcpStream) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                return;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf);
            if let Some(end) = text.find("\r\n\r\n") {
                let content_length = text[..end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if buf.len() >= end + 4 + content_length {
                    return;
                }
            }
        }
    }

    /// Serve a single canned response; returns the endpoint URL
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            read_request(&mut socket).await;
            let response = format!(
                "{}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });
        format!("http://{}/v1/chat/completions", addr)
    }

    fn local_client(endpoint: String, timeout: Duration) -> HttpCompletionClient {
        HttpCompletionClient {
            endpoint,
            model: "gpt-4o".to_string(),
            api_key: Some("test-key".to_string()),
            max_tokens: None,
            web_context: false,
            timeout,
            http: Client::builder().timeout(timeout).no_proxy().build().unwrap(),
        }
    }

    fn hello() -> CompletionRequest {
        CompletionRequest {
            system_prompt: "You are a beauty advisor".to_string(),
            messages: vec![ChatMessage::user("Hello")],
        }
    }

    #[tokio::test]
    async fn test_complete_success() {
        let endpoint = serve_once(
            "HTTP/1.1 200 OK",
            r#"{"choices":[{"message":{"role":"assistant","content":"Use the cleanser first."}}]}"#,
        )
        .await;

        let reply = local_client(endpoint, Duration::from_secs(5))
            .complete(hello())
            .await
            .unwrap();
        assert_eq!(reply.content, "Use the cleanser first.");
        assert!(reply.citations.is_empty());
    }

    #[tokio::test]
    async fn test_complete_non_success_status_is_api_error() {
        let endpoint = serve_once("HTTP/1.1 503 Service Unavailable", r#"{"error":"overloaded"}"#).await;

        let err = local_client(endpoint, Duration::from_secs(5))
            .complete(hello())
            .await
            .unwrap_err();
        match err {
            CompletionError::Api { status, message } => {
                assert_eq!(status, 503);
                assert!(message.contains("overloaded"));
            }
            other => panic!("expected Api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_complete_success_with_bad_body_is_malformed() {
        let endpoint = serve_once("HTTP/1.1 200 OK", r#"{"error":"x"}"#).await;

        let err = local_client(endpoint, Duration::from_secs(5))
            .complete(hello())
            .await
            .unwrap_err();
        assert!(matches!(err, CompletionError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_complete_slow_endpoint_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("http://{}/v1/chat/completions", listener.local_addr().unwrap());
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            read_request(&mut socket).await;
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let err = local_client(endpoint, Duration::from_millis(200))
            .complete(hello())
            .await
            .unwrap_err();
        assert!(matches!(err, CompletionError::Timeout(_)));
        assert!(err.is_connection());
    }
}
