use super::style::Palette;
use crate::session::Transcript;
use std::io::{self, Write};

/// Transcript rendered to stdout as the reply streams in.
///
/// `update_assistant` receives the full text each time; only the suffix not
/// yet printed is written.
#[derive(Debug)]
pub struct TerminalTranscript {
    palette: Palette,
    printed: String,
    streaming: bool,
}

impl TerminalTranscript {
    pub fn new(palette: Palette) -> Self {
        Self {
            palette,
            printed: String::new(),
            streaming: false,
        }
    }

    pub fn set_palette(&mut self, palette: Palette) {
        self.palette = palette;
    }

    pub fn palette(&self) -> Palette {
        self.palette
    }

    fn write(text: &str) {
        let mut stdout = io::stdout().lock();
        // A closed stdout leaves nothing to render to.
        let _ = stdout.write_all(text.as_bytes());
        let _ = stdout.flush();
    }
}

impl Transcript for TerminalTranscript {
    fn push_user(&mut self, text: &str) {
        Self::write(&format!("{}: {text}\n", self.palette.user_label()));
    }

    fn begin_assistant(&mut self) {
        self.printed.clear();
        self.streaming = true;
        Self::write(&format!("{}: ", self.palette.assistant_label()));
    }

    fn update_assistant(&mut self, full_text: &str) {
        if !self.streaming {
            return;
        }
        match full_text.strip_prefix(self.printed.as_str()) {
            Some(suffix) => Self::write(suffix),
            None => Self::write(&format!("\n{full_text}")),
        }
        full_text.clone_into(&mut self.printed);
    }

    fn end_assistant(&mut self) {
        if self.streaming {
            self.streaming = false;
            Self::write("\n");
        }
    }

    fn push_error(&mut self, message: &str) {
        Self::write(&format!("{}\n", self.palette.error(format!("✗ {message}"))));
    }

    fn push_notice(&mut self, message: &str) {
        Self::write(&format!("{}\n", self.palette.notice(message)));
    }
}
