pub mod parser;
pub mod types;

pub use parser::parse_command;
pub use types::{Command, HELP_TEXT};
