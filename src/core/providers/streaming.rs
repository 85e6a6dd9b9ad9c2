use super::openai_types::ChatCompletionChunk;
use super::sse::{SseDecoder, SseLine, classify_line};
use crate::usage::UsageStats;
use futures_util::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;

pub type ChatEventStream = Pin<Box<dyn Stream<Item = anyhow::Result<StreamEvent>> + Send + 'static>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StreamEvent {
    TextDelta {
        text: String,
    },
    UsageReport {
        prompt_tokens: u64,
        completion_tokens: u64,
        total_tokens: u64,
    },
    Done,
}

/// Decode one `data:` payload into the events it carries.
///
/// A payload may carry both a text delta and a usage report; the delta comes
/// first. Only the first choice is considered.
pub fn decode_payload(payload: &str) -> Result<Vec<StreamEvent>, serde_json::Error> {
    let chunk: ChatCompletionChunk = serde_json::from_str(payload)?;
    let mut events = Vec::new();

    if let Some(text) = chunk
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta.content)
        && !text.is_empty()
    {
        events.push(StreamEvent::TextDelta { text });
    }

    if let Some(usage) = chunk.usage {
        events.push(StreamEvent::UsageReport {
            prompt_tokens: usage.prompt_tokens.unwrap_or_default(),
            completion_tokens: usage.completion_tokens.unwrap_or_default(),
            total_tokens: usage.total_tokens.unwrap_or_default(),
        });
    }

    Ok(events)
}

/// Byte chunks in, [`StreamEvent`]s out.
///
/// Pure state machine over [`SseDecoder`]: no I/O, so the decoding rules can
/// be exercised with any fragmentation of a body. After `[DONE]` (or
/// [`EventDecoder::finish`]) it emits exactly one [`StreamEvent::Done`] and
/// ignores further input.
#[derive(Debug, Default)]
pub struct EventDecoder {
    lines: SseDecoder,
    finished: bool,
    skipped_lines: usize,
}

impl EventDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Number of `data:` lines dropped because their payload did not decode.
    pub fn skipped_lines(&self) -> usize {
        self.skipped_lines
    }

    pub fn push(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        if self.finished {
            return events;
        }

        for line in self.lines.push_chunk(chunk) {
            self.handle_line(&line, &mut events);
            if self.finished {
                break;
            }
        }
        events
    }

    /// End of body. A body that ends without `[DONE]` still ends normally.
    pub fn finish(&mut self) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        if self.finished {
            return events;
        }

        if let Some(line) = self.lines.finish() {
            self.handle_line(&line, &mut events);
        }
        if !self.finished {
            self.finished = true;
            events.push(StreamEvent::Done);
        }
        events
    }

    fn handle_line(&mut self, line: &str, events: &mut Vec<StreamEvent>) {
        match classify_line(line) {
            SseLine::Done => {
                self.finished = true;
                events.push(StreamEvent::Done);
            }
            SseLine::Data(payload) => match decode_payload(payload) {
                Ok(decoded) => events.extend(decoded),
                Err(error) => {
                    self.skipped_lines += 1;
                    tracing::debug!(payload, "Skipping undecodable stream line: {error}");
                }
            },
            SseLine::Ignored => {}
        }
    }
}

/// Folds events into the accumulated reply and the usage seen so far.
#[derive(Debug, Default)]
pub struct StreamCollector {
    text: String,
    usage: Option<UsageStats>,
    done: bool,
}

impl StreamCollector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, event: &StreamEvent) {
        match event {
            StreamEvent::TextDelta { text } => self.text.push_str(text),
            StreamEvent::UsageReport {
                prompt_tokens,
                completion_tokens,
                total_tokens,
            } => {
                self.usage.get_or_insert_with(UsageStats::default).accumulate(
                    Some(*prompt_tokens),
                    Some(*completion_tokens),
                    Some(*total_tokens),
                );
            }
            StreamEvent::Done => self.done = true,
        }
    }

    /// Full reply text accumulated so far.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Sum of every usage report, or `None` when the server sent none.
    pub fn usage(&self) -> Option<UsageStats> {
        self.usage
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn into_text(self) -> String {
        self.text
    }
}
