//! Blocking HTTP client for the transform service.
//!
//! One client per extension, one round trip per call, no retries. Calls
//! block for up to the request timeout and therefore must run on a worker
//! execution context, never the UI context; the orchestrator hands them to
//! `spawn_blocking`.

use std::time::Duration;

use tracing::debug;

use crate::orchestrator::OrchestrationRequest;

use super::error::{ClientError, status_error};
use super::types::{ChatRequest, ChatResponse, ModelDescriptor, ModelList};

/// Default service endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Only conversational models are offered for selection.
const MODEL_PREFIX: &str = "gpt-";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Remote side of a transform invocation, as the orchestrator sees it.
///
/// `Send + Sync` because calls run on worker threads. `Ok(None)` from
/// `transform` means the service answered without usable text; callers
/// treat that as a no-op, not an error.
pub trait TransformBackend: Send + Sync {
    /// Run one transform round trip for `request`.
    fn transform(&self, request: &OrchestrationRequest) -> Result<Option<String>, ClientError>;

    /// List the conversational models the credentials give access to.
    fn list_models(&self, api_key: &str) -> Result<Vec<ModelDescriptor>, ClientError>;
}

/// HTTP implementation of [`TransformBackend`].
pub struct TransformClient {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl TransformClient {
    /// Client against the default endpoint.
    pub fn new() -> Result<Self, ClientError> {
        Self::with_base_url(DEFAULT_BASE_URL.to_string())
    }

    /// Client against a custom endpoint (stub servers, proxies).
    pub fn with_base_url(base_url: String) -> Result<Self, ClientError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client, base_url })
    }

    /// Read the body, mapping non-success statuses and undecodable bodies
    /// to the matching error.
    fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::blocking::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        let raw = response.text()?;
        if !status.is_success() {
            return Err(status_error(status.as_u16(), raw));
        }
        serde_json::from_str(&raw).map_err(|e| ClientError::MalformedResponse(e.to_string()))
    }
}

impl TransformBackend for TransformClient {
    fn transform(&self, request: &OrchestrationRequest) -> Result<Option<String>, ClientError> {
        let prompt = request
            .prompts
            .iter()
            .find(|prompt| prompt.id == request.prompt_id)
            .ok_or_else(|| ClientError::PromptNotFound(request.prompt_id.clone()))?;

        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = ChatRequest::transform(&request.model, &prompt.prompt_text, &request.source_text);

        debug!(prompt = %request.prompt_id, model = %request.model, "Sending transform request");
        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", request.api_key))
            .json(&body)
            .send()?;

        let parsed: ChatResponse = Self::decode(response)?;
        Ok(parsed.into_text())
    }

    fn list_models(&self, api_key: &str) -> Result<Vec<ModelDescriptor>, ClientError> {
        let url = format!("{}/v1/models", self.base_url);

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .send()?;

        let parsed: ModelList = Self::decode(response)?;
        let models: Vec<ModelDescriptor> = parsed
            .data
            .into_iter()
            .filter(|model| model.id.starts_with(MODEL_PREFIX))
            .collect();
        debug!(count = models.len(), "Listed conversational models");
        Ok(models)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Prompt;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::Arc;
    use std::thread;

    fn sample_request(text: &str) -> OrchestrationRequest {
        let prompts: Arc<[Prompt]> = Arc::from(vec![Prompt {
            id: "formal".to_string(),
            display_name: "Make formal".to_string(),
            prompt_text: "Rewrite formally.".to_string(),
        }]);
        OrchestrationRequest {
            prompt_id: "formal".to_string(),
            source_text: text.to_string(),
            model: "gpt-4o".to_string(),
            api_key: "sk-test".to_string(),
            prompts,
        }
    }

    fn http_response(status: u16, reason: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            reason,
            body.len(),
            body
        )
    }

    /// One-request HTTP stub. Returns the base url and a handle resolving
    /// to the raw request the server saw.
    fn spawn_stub(response: String) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub port");
        let port = listener.local_addr().expect("stub addr").port();
        let join = thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept");
            let mut raw = Vec::new();
            let mut buf = [0u8; 1024];
            loop {
                let n = stream.read(&mut buf).expect("read request");
                raw.extend_from_slice(&buf[..n]);
                if n == 0 || request_complete(&raw) {
                    break;
                }
            }
            stream.write_all(response.as_bytes()).expect("write response");
            String::from_utf8_lossy(&raw).into_owned()
        });
        (format!("http://127.0.0.1:{}", port), join)
    }

    /// Headers ended and `Content-Length` bytes of body (if any) arrived.
    fn request_complete(raw: &[u8]) -> bool {
        let text = String::from_utf8_lossy(raw);
        let Some(header_end) = text.find("\r\n\r\n") else {
            return false;
        };
        let content_length = text
            .lines()
            .take_while(|line| !line.is_empty())
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                if name.eq_ignore_ascii_case("content-length") {
                    value.trim().parse::<usize>().ok()
                } else {
                    None
                }
            })
            .unwrap_or(0);
        raw.len() >= header_end + 4 + content_length
    }

    /// Base url pointing at a port nothing listens on.
    fn refused_base_url() -> String {
        let probe = TcpListener::bind("127.0.0.1:0").expect("bind probe port");
        let port = probe.local_addr().expect("probe addr").port();
        drop(probe);
        format!("http://127.0.0.1:{}", port)
    }

    #[test]
    fn transform_sends_one_user_message_with_bearer_auth() {
        let body = r#"{"choices": [{"message": {"role": "assistant", "content": "Greetings."}}]}"#;
        let (base_url, seen) = spawn_stub(http_response(200, "OK", body));
        let client = TransformClient::with_base_url(base_url).unwrap();

        let result = client.transform(&sample_request("hi there")).unwrap();

        assert_eq!(result, Some("Greetings.".to_string()));
        let raw = seen.join().unwrap();
        assert!(raw.starts_with("POST /v1/chat/completions"));
        assert!(raw.to_lowercase().contains("authorization: bearer sk-test"));
        assert!(raw.contains(r#""content":"Rewrite formally.\n\nhi there""#));
        assert_eq!(raw.matches("\"role\"").count(), 1);
    }

    #[test]
    fn transform_empty_answer_is_a_no_op() {
        let body = r#"{"choices": [{"message": {"role": "assistant", "content": ""}}]}"#;
        let (base_url, seen) = spawn_stub(http_response(200, "OK", body));
        let client = TransformClient::with_base_url(base_url).unwrap();

        let result = client.transform(&sample_request("hi")).unwrap();

        assert_eq!(result, None);
        seen.join().unwrap();
    }

    #[test]
    fn transform_auth_failure_maps_to_auth_error() {
        let (base_url, seen) = spawn_stub(http_response(401, "Unauthorized", "bad key"));
        let client = TransformClient::with_base_url(base_url).unwrap();

        let err = client.transform(&sample_request("hi")).unwrap_err();

        assert!(matches!(err, ClientError::Auth { status: 401, .. }));
        seen.join().unwrap();
    }

    #[test]
    fn transform_server_failure_maps_to_provider_error() {
        let (base_url, seen) = spawn_stub(http_response(500, "Internal Server Error", "boom"));
        let client = TransformClient::with_base_url(base_url).unwrap();

        let err = client.transform(&sample_request("hi")).unwrap_err();

        match err {
            ClientError::Provider { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "boom");
            }
            other => panic!("expected provider error, got {other:?}"),
        }
        seen.join().unwrap();
    }

    #[test]
    fn transform_undecodable_body_is_malformed_response() {
        let (base_url, seen) = spawn_stub(http_response(200, "OK", "not json at all"));
        let client = TransformClient::with_base_url(base_url).unwrap();

        let err = client.transform(&sample_request("hi")).unwrap_err();

        assert!(matches!(err, ClientError::MalformedResponse(_)));
        seen.join().unwrap();
    }

    #[test]
    fn transform_unknown_prompt_skips_the_network() {
        let client = TransformClient::with_base_url(refused_base_url()).unwrap();
        let mut request = sample_request("hi");
        request.prompt_id = "missing".to_string();

        let err = client.transform(&request).unwrap_err();

        match err {
            ClientError::PromptNotFound(id) => assert_eq!(id, "missing"),
            other => panic!("expected prompt-not-found, got {other:?}"),
        }
    }

    #[test]
    fn transform_connection_failure_is_transport() {
        let client = TransformClient::with_base_url(refused_base_url()).unwrap();

        let err = client.transform(&sample_request("hi")).unwrap_err();

        assert!(matches!(err, ClientError::Transport(_)));
    }

    #[test]
    fn list_models_keeps_only_conversational_ids() {
        let body = r#"{
            "object": "list",
            "data": [
                {"id": "gpt-4o"},
                {"id": "dall-e-3"},
                {"id": "gpt-4o-mini"},
                {"id": "whisper-1"}
            ]
        }"#;
        let (base_url, seen) = spawn_stub(http_response(200, "OK", body));
        let client = TransformClient::with_base_url(base_url).unwrap();

        let models = client.list_models("sk-test").unwrap();

        let ids: Vec<&str> = models.iter().map(|model| model.id.as_str()).collect();
        assert_eq!(ids, vec!["gpt-4o", "gpt-4o-mini"]);
        let raw = seen.join().unwrap();
        assert!(raw.starts_with("GET /v1/models"));
        assert!(raw.to_lowercase().contains("authorization: bearer sk-test"));
    }
}
