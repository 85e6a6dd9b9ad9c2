//! Server-Sent-Events line assembly for chunked response bodies.

const DATA_PREFIX: &str = "data: ";
const DONE_SENTINEL: &str = "[DONE]";

/// Incremental UTF-8 decoder plus line assembler.
///
/// Chunk boundaries may fall anywhere, including inside a multi-byte code
/// point or in the middle of a line. Incomplete trailing bytes and the
/// incomplete trailing line are carried over to the next chunk, so the
/// sequence of lines produced is the same for every fragmentation of a body.
#[derive(Debug, Default)]
pub struct SseDecoder {
    pending_bytes: Vec<u8>,
    buffer: String,
}

impl SseDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk and return every line it completes, without the line
    /// terminator (`\n` or `\r\n`).
    pub fn push_chunk(&mut self, chunk: &[u8]) -> Vec<String> {
        self.decode_utf8(chunk);
        self.drain_lines()
    }

    /// Flush at end of body: a dangling partial code point becomes U+FFFD and
    /// a final line without a terminator is returned.
    pub fn finish(&mut self) -> Option<String> {
        if !self.pending_bytes.is_empty() {
            self.pending_bytes.clear();
            self.buffer.push(char::REPLACEMENT_CHARACTER);
        }

        let tail = std::mem::take(&mut self.buffer);
        if tail.is_empty() {
            None
        } else {
            Some(tail.trim_end_matches('\r').to_string())
        }
    }

    fn decode_utf8(&mut self, chunk: &[u8]) {
        let mut bytes = std::mem::take(&mut self.pending_bytes);
        bytes.extend_from_slice(chunk);

        let mut rest = bytes.as_slice();
        loop {
            match std::str::from_utf8(rest) {
                Ok(text) => {
                    self.buffer.push_str(text);
                    return;
                }
                Err(error) => {
                    let (valid, tail) = rest.split_at(error.valid_up_to());
                    self.buffer.push_str(&String::from_utf8_lossy(valid));
                    match error.error_len() {
                        Some(invalid_len) => {
                            self.buffer.push(char::REPLACEMENT_CHARACTER);
                            rest = &tail[invalid_len..];
                        }
                        None => {
                            self.pending_bytes = tail.to_vec();
                            return;
                        }
                    }
                }
            }
        }
    }

    fn drain_lines(&mut self) -> Vec<String> {
        let mut lines = Vec::new();
        while let Some(newline) = self.buffer.find('\n') {
            let line: String = self.buffer.drain(..=newline).collect();
            lines.push(line.trim_end_matches(['\n', '\r']).to_string());
        }
        lines
    }
}

/// Meaning of one assembled line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SseLine<'a> {
    /// A `data: ` line carrying a payload.
    Data(&'a str),
    /// `data: [DONE]`, the end-of-stream sentinel.
    Done,
    /// Anything else: comments, `event:` fields, blank separators.
    Ignored,
}

pub fn classify_line(line: &str) -> SseLine<'_> {
    match line.strip_prefix(DATA_PREFIX) {
        Some(payload) if payload.trim_end() == DONE_SENTINEL => SseLine::Done,
        Some(payload) => SseLine::Data(payload),
        None => SseLine::Ignored,
    }
}
