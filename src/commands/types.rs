use crate::storage::Theme;

/// Slash commands accepted by the interactive chat loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Clear,
    Usage,
    ResetUsage,
    Models,
    Model { id: String },
    /// `None` looks up the preferred city.
    Weather { city: Option<String> },
    /// `None` toggles.
    Theme { theme: Option<Theme> },
    Quit,
    /// Known command with bad arguments.
    Invalid { usage: &'static str },
    Unknown { name: String },
}

pub const HELP_TEXT: &str = "\
/help               show this help
/clear              clear the chat history
/usage              show token usage and estimated cost
/reset-usage        reset token counters
/models             list models offered by the endpoint
/model <id>         select a model
/weather [city]     current weather (default: last city)
/theme [light|dark] toggle or set the theme
/quit               leave the chat";
