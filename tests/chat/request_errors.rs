use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use skychat::error::ChatError;
use skychat::session::{MemoryTranscript, Message, TranscriptEntry};
use skychat::storage::Settings;

use super::chat_harness::{COMPLETIONS_PATH, ChatHarness, TEST_API_KEY, TEST_MODEL, delta_frame};

#[tokio::test]
async fn unauthorized_surfaces_request_failed_and_keeps_history() {
    let harness = ChatHarness::start().await;
    harness.seed_history(&[Message::user("earlier"), Message::assistant("reply")]);
    Mock::given(method("POST"))
        .and(path(COMPLETIONS_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid key"))
        .expect(1)
        .mount(&harness.server)
        .await;

    let session = harness.session();
    let mut transcript = MemoryTranscript::new();
    let result = session
        .send(
            &harness.settings(),
            "hello?",
            &mut transcript,
            &CancellationToken::new(),
        )
        .await;

    match result {
        Err(ChatError::RequestFailed { status, body }) => {
            assert_eq!(status, 401);
            assert_eq!(body, "invalid key");
        }
        other => panic!("expected RequestFailed, got {other:?}"),
    }

    let errors = transcript.errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("401"));
    assert!(errors[0].contains("invalid key"));

    assert_eq!(harness.history(), [
        Message::user("earlier"),
        Message::assistant("reply")
    ]);
    assert!(session.usage().snapshot().is_zero());
    assert!(!session.is_busy());
    harness.server.verify().await;
}

#[tokio::test]
async fn error_bodies_are_scrubbed_and_truncated() {
    let harness = ChatHarness::start().await;
    let body = format!(
        "Incorrect API key provided: sk-live-0123456789abcdef. {}",
        "x".repeat(500)
    );
    Mock::given(method("POST"))
        .and(path(COMPLETIONS_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string(body))
        .mount(&harness.server)
        .await;

    let session = harness.session();
    let mut transcript = MemoryTranscript::new();
    let result = session
        .send(
            &harness.settings(),
            "hi",
            &mut transcript,
            &CancellationToken::new(),
        )
        .await;

    let Err(ChatError::RequestFailed { status, body }) = result else {
        panic!("expected RequestFailed");
    };
    assert_eq!(status, 500);
    assert!(!body.contains("0123456789abcdef"));
    assert!(body.contains("[REDACTED]"));
    assert!(body.ends_with("..."));
    assert!(body.chars().count() <= 203);
}

#[tokio::test]
async fn missing_settings_fail_before_any_request() {
    let harness = ChatHarness::start().await;
    let session = harness.session();

    for (settings, field) in [
        (Settings::new("", harness.server.uri(), "gpt-4o"), "apiKey"),
        (Settings::new("sk-test", "", "gpt-4o"), "apiBaseUrl"),
        (Settings::new("sk-test", harness.server.uri(), " "), "model"),
    ] {
        let mut transcript = MemoryTranscript::new();
        let result = session
            .send(&settings, "hi", &mut transcript, &CancellationToken::new())
            .await;

        match result {
            Err(ChatError::ConfigurationMissing { field: missing }) => assert_eq!(missing, field),
            other => panic!("expected ConfigurationMissing({field}), got {other:?}"),
        }
        assert!(transcript.last_assistant().is_none());
    }

    let received = harness.server.received_requests().await.unwrap_or_default();
    assert!(received.is_empty());
    assert!(harness.history().is_empty());
}

#[tokio::test]
async fn unreachable_server_is_a_transport_failure() {
    let harness = ChatHarness::start().await;
    let session = harness.session();
    // Port 9 (discard) is not listening on loopback.
    let settings = Settings::new("sk-test", "http://127.0.0.1:9", "gpt-4o");
    let mut transcript = MemoryTranscript::new();

    let result = session
        .send(&settings, "hi", &mut transcript, &CancellationToken::new())
        .await;

    assert!(matches!(
        result,
        Err(ChatError::TransportFailed { ref partial, .. }) if partial.is_empty()
    ));
    assert_eq!(transcript.errors().len(), 1);
    assert!(harness.history().is_empty());
}

/// Serve one request: announce a long body, send `frame`, then hang up.
async fn serve_truncated_stream(listener: TcpListener, frame: String) {
    let (mut socket, _) = listener.accept().await.unwrap();

    let mut request = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        let read = socket.read(&mut buf).await.unwrap();
        request.extend_from_slice(&buf[..read]);
        let text = String::from_utf8_lossy(&request);
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text[..header_end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if request.len() >= header_end + 4 + content_length {
                break;
            }
        }
        if read == 0 {
            break;
        }
    }

    let response = format!(
        "HTTP/1.1 200 OK\r\ncontent-type: text/event-stream\r\ncontent-length: 10000\r\n\r\ndata: {frame}\n\n"
    );
    socket.write_all(response.as_bytes()).await.unwrap();
    socket.flush().await.unwrap();
    socket.shutdown().await.unwrap();
}

#[tokio::test]
async fn connection_lost_mid_stream_keeps_partial_reply() {
    let harness = ChatHarness::start().await;
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(serve_truncated_stream(listener, delta_frame("Hel")));

    let session = harness.session();
    let settings = Settings::new(TEST_API_KEY, format!("http://{addr}"), TEST_MODEL);
    let mut transcript = MemoryTranscript::new();
    let result = session
        .send(&settings, "hi", &mut transcript, &CancellationToken::new())
        .await;
    server.await.unwrap();

    match &result {
        Err(ChatError::TransportFailed { partial, .. }) => assert_eq!(partial, "Hel"),
        other => panic!("expected TransportFailed, got {other:?}"),
    }
    assert_eq!(result.unwrap_err().partial_text(), Some("Hel"));

    let entries = transcript.entries();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0], TranscriptEntry::User("hi".into()));
    assert_eq!(entries[1], TranscriptEntry::Assistant {
        text: "Hel".into(),
        complete: true,
    });
    assert!(matches!(
        &entries[2],
        TranscriptEntry::Error(message) if message.starts_with("connection lost")
    ));

    assert!(harness.history().is_empty());
    assert!(!session.is_busy());
}
