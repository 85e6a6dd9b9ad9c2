use std::time::Duration;

use serde_json::json;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::Mock;

use skychat::core::providers::ChatClient;
use skychat::error::ChatError;
use skychat::session::{ChatHistoryStore, ChatSession, MemoryTranscript, Message, TranscriptEntry};
use skychat::storage::LocalStorage;
use skychat::usage::{UsageStats, UsageStore};

use super::chat_harness::{
    COMPLETIONS_PATH, ChatHarness, TEST_MODEL, delta_frame, sse_body, stream_response,
    usage_frame,
};

#[tokio::test]
async fn hello_stream_renders_records_usage_and_appends_history() {
    let harness = ChatHarness::start().await;
    let body = sse_body(&[
        delta_frame("He"),
        delta_frame("llo"),
        usage_frame(3, 2, 5),
        "[DONE]".to_string(),
    ]);
    Mock::given(method("POST"))
        .and(path(COMPLETIONS_PATH))
        .and(header("authorization", "Bearer sk-test-key"))
        .and(body_partial_json(json!({
            "model": TEST_MODEL,
            "stream": true,
            "messages": [{"role": "user", "content": "hi"}],
        })))
        .respond_with(stream_response(body))
        .expect(1)
        .mount(&harness.server)
        .await;

    let session = harness.session();
    let mut transcript = MemoryTranscript::new();
    let outcome = session
        .send(
            &harness.settings(),
            "hi",
            &mut transcript,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(outcome.reply, "Hello");
    assert_eq!(outcome.usage, UsageStats::new(3, 2, 5));
    assert!(!outcome.usage_estimated);

    assert_eq!(transcript.entries(), [
        TranscriptEntry::User("hi".into()),
        TranscriptEntry::Assistant {
            text: "Hello".into(),
            complete: true,
        },
    ]);
    assert_eq!(transcript.update_count(), 2);

    assert_eq!(
        UsageStore::new(harness.storage.clone()).snapshot(),
        UsageStats::new(3, 2, 5)
    );
    assert_eq!(harness.history(), [
        Message::user("hi"),
        Message::assistant("Hello")
    ]);
    harness.server.verify().await;
}

#[tokio::test]
async fn usage_accumulates_across_exchanges() {
    let harness = ChatHarness::start().await;
    harness
        .mount_stream(sse_body(&[
            delta_frame("ok"),
            usage_frame(3, 2, 5),
            "[DONE]".to_string(),
        ]))
        .await;

    let session = harness.session();
    let mut transcript = MemoryTranscript::new();
    for text in ["one", "two"] {
        session
            .send(
                &harness.settings(),
                text,
                &mut transcript,
                &CancellationToken::new(),
            )
            .await
            .unwrap();
    }

    assert_eq!(session.usage().snapshot(), UsageStats::new(6, 4, 10));
    assert_eq!(harness.history().len(), 4);

    // The second request carries the first exchange.
    let bodies = harness.request_bodies().await;
    assert_eq!(bodies.len(), 2);
    assert_eq!(bodies[1]["messages"], json!([
        {"role": "user", "content": "one"},
        {"role": "assistant", "content": "ok"},
        {"role": "user", "content": "two"},
    ]));
}

#[tokio::test]
async fn history_limit_sends_only_recent_turns() {
    let harness = ChatHarness::start().await;
    harness.seed_history(&[
        Message::user("old question"),
        Message::assistant("old answer"),
        Message::user("recent question"),
        Message::assistant("recent answer"),
    ]);
    harness
        .mount_stream(sse_body(&[delta_frame("fine"), "[DONE]".to_string()]))
        .await;

    let session = harness.session().with_history_limit(Some(2));
    let mut transcript = MemoryTranscript::new();
    session
        .send(
            &harness.settings(),
            "new question",
            &mut transcript,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    let bodies = harness.request_bodies().await;
    let contents: Vec<&str> = bodies[0]["messages"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|message| message["content"].as_str())
        .collect();
    assert_eq!(contents, ["recent question", "recent answer", "new question"]);

    // Stored history is never truncated.
    assert_eq!(harness.history().len(), 6);
}

#[tokio::test]
async fn missing_usage_report_falls_back_to_estimate() {
    let harness = ChatHarness::start().await;
    // No usage frame and no [DONE]: the body simply ends.
    harness
        .mount_stream(sse_body(&[delta_frame("abcd"), delta_frame("efghi")]))
        .await;

    let session = harness.session();
    let mut transcript = MemoryTranscript::new();
    let outcome = session
        .send(
            &harness.settings(),
            "count",
            &mut transcript,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(outcome.reply, "abcdefghi");
    assert!(outcome.usage_estimated);
    assert_eq!(outcome.usage, UsageStats::new(0, 3, 3));
    assert_eq!(session.usage().snapshot(), UsageStats::new(0, 3, 3));
    assert_eq!(harness.history().len(), 2);
}

#[tokio::test]
async fn malformed_lines_are_skipped_mid_stream() {
    let harness = ChatHarness::start().await;
    let body = format!(
        "data: {}\n\ndata: {{\"choices\":[{{\"delta\":\n\n: keep-alive\n\ndata: {}\n\ndata: [DONE]\n\n",
        delta_frame("A"),
        delta_frame("B"),
    );
    harness.mount_stream(body).await;

    let session = harness.session();
    let mut transcript = MemoryTranscript::new();
    let outcome = session
        .send(
            &harness.settings(),
            "letters",
            &mut transcript,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(outcome.reply, "AB");
    assert_eq!(transcript.last_assistant(), Some("AB"));
    assert!(transcript.errors().is_empty());
}

#[tokio::test]
async fn bytes_after_done_are_ignored() {
    let harness = ChatHarness::start().await;
    let body = format!(
        "data: {}\n\ndata: [DONE]\n\ndata: {}\n\ndata: {}\n\n",
        delta_frame("kept"),
        delta_frame(" dropped"),
        usage_frame(100, 100, 200),
    );
    harness.mount_stream(body).await;

    let session = harness.session();
    let mut transcript = MemoryTranscript::new();
    let outcome = session
        .send(
            &harness.settings(),
            "stop",
            &mut transcript,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(outcome.reply, "kept");
    assert!(outcome.usage_estimated);
    assert_eq!(outcome.usage, UsageStats::new(0, 1, 1));
}

#[tokio::test]
async fn second_send_while_in_flight_is_rejected() {
    let harness = ChatHarness::start().await;
    Mock::given(method("POST"))
        .and(path(COMPLETIONS_PATH))
        .respond_with(
            stream_response(sse_body(&[delta_frame("slow"), "[DONE]".to_string()]))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&harness.server)
        .await;

    let session = harness.session();
    let settings = harness.settings();
    let cancel = CancellationToken::new();
    let mut first = MemoryTranscript::new();
    let mut second = MemoryTranscript::new();

    let (first_result, second_result) = tokio::join!(
        session.send(&settings, "first", &mut first, &cancel),
        session.send(&settings, "second", &mut second, &cancel),
    );

    assert_eq!(first_result.unwrap().reply, "slow");
    assert!(matches!(second_result, Err(ChatError::ExchangeInFlight)));
    assert_eq!(second.errors().len(), 1);
    assert_eq!(harness.history(), [
        Message::user("first"),
        Message::assistant("slow")
    ]);
    assert!(!session.is_busy());
}

#[tokio::test]
async fn cancelled_exchange_leaves_history_untouched() {
    let harness = ChatHarness::start().await;
    Mock::given(method("POST"))
        .and(path(COMPLETIONS_PATH))
        .respond_with(
            stream_response(sse_body(&[delta_frame("late"), "[DONE]".to_string()]))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&harness.server)
        .await;

    let session = harness.session();
    let settings = harness.settings();
    let cancel = CancellationToken::new();
    let mut transcript = MemoryTranscript::new();

    let (result, ()) = tokio::join!(
        session.send(&settings, "never mind", &mut transcript, &cancel),
        async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            cancel.cancel();
        },
    );

    assert!(matches!(result, Err(ChatError::Cancelled { .. })));
    assert!(harness.history().is_empty());
    assert!(session.usage().snapshot().is_zero());
    assert!(transcript.last_assistant().is_none());
}

#[tokio::test]
async fn failed_usage_write_does_not_interrupt_the_reply() {
    let harness = ChatHarness::start().await;
    harness
        .mount_stream(sse_body(&[
            delta_frame("Hel"),
            usage_frame(3, 2, 5),
            delta_frame("lo"),
            "[DONE]".to_string(),
        ]))
        .await;

    // A directory where the temp file should go makes every usage write fail.
    let usage_dir = TempDir::new().unwrap();
    let usage_storage = LocalStorage::open(usage_dir.path()).unwrap();
    std::fs::create_dir(usage_dir.path().join("storage.json.tmp")).unwrap();

    let session = ChatSession::new(
        ChatClient::new(0.7, 10),
        ChatHistoryStore::new(harness.storage.clone()),
        UsageStore::new(usage_storage),
    );
    let mut transcript = MemoryTranscript::new();
    let outcome = session
        .send(&harness.settings(), "hi", &mut transcript, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcome.reply, "Hello");
    assert!(!outcome.usage_estimated);
    assert_eq!(transcript.last_assistant(), Some("Hello"));
    assert!(transcript.errors().is_empty());
    assert_eq!(harness.history(), [Message::user("hi"), Message::assistant("Hello")]);
    assert!(!usage_dir.path().join("storage.json").exists());
}
