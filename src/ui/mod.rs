pub mod style;
pub mod terminal;

pub use style::Palette;
pub use terminal::TerminalTranscript;
