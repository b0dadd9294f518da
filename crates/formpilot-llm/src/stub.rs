//! A deterministic, canned-response client for tests — lets a test replay
//! an exact session transcript against a fixed queue of LLM replies. Only
//! compiled with the `testing` feature.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::client::{ChatMessage, LlmClient, LlmError};

/// Replays a fixed queue of canned responses, one per `complete()` call.
/// Panics (a clear test failure) if the queue runs dry — a test wired a
/// `StubLlmClient` for a scenario with more LLM calls than it expected.
pub struct StubLlmClient {
    responses: Mutex<Vec<String>>,
    calls: Mutex<Vec<(String, usize)>>,
}

impl StubLlmClient {
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            responses: Mutex::new(responses),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmClient for StubLlmClient {
    async fn complete(&self, system_prompt: &str, history: &[ChatMessage]) -> Result<String, LlmError> {
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            panic!("StubLlmClient: no more canned responses queued");
        }
        let next = responses.remove(0);
        self.calls
            .lock()
            .unwrap()
            .push((system_prompt.to_string(), history.len()));
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replays_responses_in_order() {
        let stub = StubLlmClient::new(vec!["a".into(), "b".into()]);
        assert_eq!(stub.complete("sys", &[]).await.unwrap(), "a");
        assert_eq!(stub.complete("sys", &[]).await.unwrap(), "b");
        assert_eq!(stub.call_count(), 2);
    }

    #[tokio::test]
    #[should_panic(expected = "no more canned responses queued")]
    async fn panics_when_exhausted() {
        let stub = StubLlmClient::new(vec![]);
        let _ = stub.complete("sys", &[]).await;
    }
}
