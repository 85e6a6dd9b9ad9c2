#![allow(dead_code)]

use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use skychat::core::providers::ChatClient;
use skychat::session::{ChatHistoryStore, ChatSession, Message};
use skychat::storage::{LocalStorage, Settings};
use skychat::usage::UsageStore;

pub const TEST_API_KEY: &str = "sk-test-key";
pub const TEST_MODEL: &str = "gpt-4o-mini";
pub const COMPLETIONS_PATH: &str = "/v1/chat/completions";

/// Temp storage plus a stub server for chat exchanges.
pub struct ChatHarness {
    pub tmp: TempDir,
    pub storage: LocalStorage,
    pub server: MockServer,
}

impl ChatHarness {
    pub async fn start() -> Self {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::open(tmp.path()).unwrap();
        Self {
            tmp,
            storage,
            server: MockServer::start().await,
        }
    }

    pub fn session(&self) -> ChatSession {
        ChatSession::new(
            ChatClient::new(0.7, 10),
            ChatHistoryStore::new(self.storage.clone()),
            UsageStore::new(self.storage.clone()),
        )
    }

    pub fn settings(&self) -> Settings {
        Settings::new(TEST_API_KEY, self.server.uri(), TEST_MODEL)
    }

    pub fn history(&self) -> Vec<Message> {
        ChatHistoryStore::new(self.storage.clone()).load()
    }

    pub fn seed_history(&self, messages: &[Message]) {
        ChatHistoryStore::new(self.storage.clone())
            .save(messages)
            .unwrap();
    }

    pub async fn mount_stream(&self, body: String) {
        Mock::given(method("POST"))
            .and(path(COMPLETIONS_PATH))
            .respond_with(stream_response(body))
            .mount(&self.server)
            .await;
    }

    /// JSON bodies of every completion request the server saw.
    pub async fn request_bodies(&self) -> Vec<serde_json::Value> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|request| request.url.path() == COMPLETIONS_PATH)
            .map(|request| serde_json::from_slice(&request.body).unwrap())
            .collect()
    }
}

pub fn stream_response(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/event-stream")
}

pub fn delta_frame(text: &str) -> String {
    json!({"choices": [{"index": 0, "delta": {"content": text}}]}).to_string()
}

pub fn usage_frame(prompt: u64, completion: u64, total: u64) -> String {
    json!({
        "choices": [],
        "usage": {
            "prompt_tokens": prompt,
            "completion_tokens": completion,
            "total_tokens": total
        }
    })
    .to_string()
}

/// `data:` lines separated by blank lines, as an SSE body.
pub fn sse_body<S: AsRef<str>>(payloads: &[S]) -> String {
    payloads
        .iter()
        .map(|payload| format!("data: {}\n\n", payload.as_ref()))
        .collect()
}
