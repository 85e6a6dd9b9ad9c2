use super::store::ChatHistoryStore;
use super::transcript::Transcript;
use super::types::Message;
use crate::core::providers::{ChatClient, StreamCollector, StreamEvent};
use crate::error::ChatError;
use crate::storage::Settings;
use crate::usage::{UsageStats, UsageStore, estimate_tokens};
use futures_util::StreamExt;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Result of one completed exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeOutcome {
    pub reply: String,
    /// Usage attributed to this exchange.
    pub usage: UsageStats,
    /// `true` when the server reported no usage and `usage` is the
    /// characters/4 completion estimate.
    pub usage_estimated: bool,
}

/// Drives chat exchanges against the history and usage stores.
///
/// At most one exchange runs at a time; a second `send` while one is in
/// flight fails with [`ChatError::ExchangeInFlight`]. History is only written
/// once an exchange completes, so a failed or cancelled exchange leaves it
/// untouched.
pub struct ChatSession {
    client: ChatClient,
    history: ChatHistoryStore,
    usage: UsageStore,
    history_limit: Option<usize>,
    in_flight: AtomicBool,
}

struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Keep the most recent `limit` prior messages.
fn cap_history(mut messages: Vec<Message>, limit: Option<usize>) -> Vec<Message> {
    if let Some(limit) = limit
        && messages.len() > limit
    {
        messages.drain(..messages.len() - limit);
    }
    messages
}

impl ChatSession {
    pub fn new(client: ChatClient, history: ChatHistoryStore, usage: UsageStore) -> Self {
        Self {
            client,
            history,
            usage,
            history_limit: None,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn with_history_limit(mut self, history_limit: Option<usize>) -> Self {
        self.history_limit = history_limit;
        self
    }

    pub fn client(&self) -> &ChatClient {
        &self.client
    }

    pub fn history(&self) -> &ChatHistoryStore {
        &self.history
    }

    pub fn usage(&self) -> &UsageStore {
        &self.usage
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Run one exchange for `user_text`, rendering it into `transcript`.
    ///
    /// Errors are also rendered inline via [`Transcript::push_error`], so
    /// callers may ignore the `Err` once shown.
    pub async fn send(
        &self,
        settings: &Settings,
        user_text: &str,
        transcript: &mut dyn Transcript,
        cancel: &CancellationToken,
    ) -> Result<ExchangeOutcome, ChatError> {
        let result = match InFlightGuard::acquire(&self.in_flight) {
            Some(_guard) => self.run_exchange(settings, user_text, transcript, cancel).await,
            None => Err(ChatError::ExchangeInFlight),
        };

        match &result {
            Ok(_) => {}
            Err(ChatError::Cancelled { .. }) => transcript.push_notice("Cancelled."),
            Err(error) => {
                warn!("Chat exchange failed: {error}");
                transcript.push_error(&error.to_string());
            }
        }
        result
    }

    async fn run_exchange(
        &self,
        settings: &Settings,
        user_text: &str,
        transcript: &mut dyn Transcript,
        cancel: &CancellationToken,
    ) -> Result<ExchangeOutcome, ChatError> {
        settings.require_chat()?;

        let user_turn = Message::user(user_text);
        let mut messages = cap_history(self.history.load(), self.history_limit);
        messages.push(user_turn.clone());

        transcript.push_user(user_text);
        transcript.begin_assistant();
        let streamed = self
            .stream_reply(settings, &messages, transcript, cancel)
            .await;
        transcript.end_assistant();
        let collector = streamed?;

        let (usage, usage_estimated) = match collector.usage() {
            Some(reported) => (reported, false),
            None => {
                let estimate = estimate_tokens(collector.text());
                self.record_usage(0, estimate, estimate);
                (UsageStats::new(0, estimate, estimate), true)
            }
        };

        let reply = collector.into_text();
        self.history
            .append(&[user_turn, Message::assistant(reply.clone())])?;

        info!(
            model = settings.model.as_str(),
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            total_tokens = usage.total_tokens,
            usage_estimated,
            "Chat exchange completed"
        );

        Ok(ExchangeOutcome {
            reply,
            usage,
            usage_estimated,
        })
    }

    /// Stream the reply into `transcript`. Usage reports are stored as they
    /// arrive, even if the stream later fails.
    async fn stream_reply(
        &self,
        settings: &Settings,
        messages: &[Message],
        transcript: &mut dyn Transcript,
        cancel: &CancellationToken,
    ) -> Result<StreamCollector, ChatError> {
        let mut collector = StreamCollector::new();

        let mut stream = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                return Err(ChatError::Cancelled { partial: String::new() });
            }
            opened = self.client.stream_chat(settings, messages) => opened?,
        };

        loop {
            let next = tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    return Err(ChatError::Cancelled { partial: collector.into_text() });
                }
                next = stream.next() => next,
            };

            let event = match next {
                None => break,
                Some(Ok(event)) => event,
                Some(Err(error)) => {
                    return Err(ChatError::TransportFailed {
                        message: format!("{error:#}"),
                        partial: collector.into_text(),
                    });
                }
            };

            collector.feed(&event);
            match event {
                StreamEvent::TextDelta { .. } => transcript.update_assistant(collector.text()),
                StreamEvent::UsageReport {
                    prompt_tokens,
                    completion_tokens,
                    total_tokens,
                } => self.record_usage(prompt_tokens, completion_tokens, total_tokens),
                StreamEvent::Done => break,
            }
        }

        Ok(collector)
    }

    /// Add to the usage counters. A failed write is logged, not raised.
    fn record_usage(&self, prompt_tokens: u64, completion_tokens: u64, total_tokens: u64) {
        if let Err(error) = self.usage.accumulate(
            Some(prompt_tokens),
            Some(completion_tokens),
            Some(total_tokens),
        ) {
            warn!(
                prompt_tokens,
                completion_tokens, total_tokens, "Failed to record token usage: {error}"
            );
        }
    }
}
