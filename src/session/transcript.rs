use super::types::{Message, Role};

/// Rendering surface for a conversation.
///
/// A chat exchange drives it as `push_user`, `begin_assistant`, any number
/// of `update_assistant` calls carrying the full text so far, then
/// `end_assistant`. Failures are shown with `push_error` and the transcript
/// stays usable.
pub trait Transcript: Send {
    fn push_user(&mut self, text: &str);

    fn begin_assistant(&mut self);

    /// Replace the in-progress assistant entry with `full_text`.
    fn update_assistant(&mut self, full_text: &str);

    fn end_assistant(&mut self);

    fn push_error(&mut self, message: &str);

    fn push_notice(&mut self, message: &str);

    /// Render stored history, e.g. on start-up.
    fn replay(&mut self, messages: &[Message]) {
        for message in messages {
            match message.role {
                Role::User => self.push_user(&message.content),
                Role::Assistant => {
                    self.begin_assistant();
                    self.update_assistant(&message.content);
                    self.end_assistant();
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptEntry {
    User(String),
    Assistant { text: String, complete: bool },
    Error(String),
    Notice(String),
}

/// In-memory transcript, for headless callers and tests.
#[derive(Debug, Default)]
pub struct MemoryTranscript {
    entries: Vec<TranscriptEntry>,
    updates: usize,
}

impl MemoryTranscript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    /// Number of `update_assistant` calls seen.
    pub fn update_count(&self) -> usize {
        self.updates
    }

    /// Text of the most recent assistant entry.
    pub fn last_assistant(&self) -> Option<&str> {
        self.entries.iter().rev().find_map(|entry| match entry {
            TranscriptEntry::Assistant { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn errors(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter_map(|entry| match entry {
                TranscriptEntry::Error(message) => Some(message.as_str()),
                _ => None,
            })
            .collect()
    }

    fn open_assistant(&mut self) -> Option<&mut String> {
        match self.entries.last_mut() {
            Some(TranscriptEntry::Assistant {
                text,
                complete: false,
            }) => Some(text),
            _ => None,
        }
    }
}

impl Transcript for MemoryTranscript {
    fn push_user(&mut self, text: &str) {
        self.entries.push(TranscriptEntry::User(text.to_string()));
    }

    fn begin_assistant(&mut self) {
        self.entries.push(TranscriptEntry::Assistant {
            text: String::new(),
            complete: false,
        });
    }

    fn update_assistant(&mut self, full_text: &str) {
        self.updates += 1;
        if let Some(text) = self.open_assistant() {
            full_text.clone_into(text);
        }
    }

    fn end_assistant(&mut self) {
        let empty = matches!(
            self.entries.last(),
            Some(TranscriptEntry::Assistant { text, .. }) if text.is_empty()
        );
        if empty {
            self.entries.pop();
        } else if let Some(TranscriptEntry::Assistant { complete, .. }) = self.entries.last_mut() {
            *complete = true;
        }
    }

    fn push_error(&mut self, message: &str) {
        self.entries.push(TranscriptEntry::Error(message.to_string()));
    }

    fn push_notice(&mut self, message: &str) {
        self.entries
            .push(TranscriptEntry::Notice(message.to_string()));
    }
}
