use crate::storage::Theme;
use clap::{Parser, Subcommand};
use std::str::FromStr;

mod subcommands;

pub use subcommands::{HistoryCommands, SettingsCommands, UsageCommands};

/// `SkyChat` - streaming chat client for OpenAI-compatible endpoints.
#[derive(Parser, Debug)]
#[command(name = "skychat")]
#[command(version)]
#[command(about = "Chat with an OpenAI-compatible model from the terminal.", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the interactive chat (default)
    Chat,

    /// Send one message, print the streamed reply, and exit
    Send {
        /// Message text
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },

    /// Show or change connection settings
    Settings {
        #[command(subcommand)]
        settings_command: SettingsCommands,
    },

    /// List models offered by the endpoint
    Models,

    /// Show or reset token usage
    Usage {
        #[command(subcommand)]
        usage_command: UsageCommands,
    },

    /// Show or clear the chat history
    History {
        #[command(subcommand)]
        history_command: HistoryCommands,
    },

    /// Look up current weather
    Weather {
        /// City name (default: the last city looked up)
        city: Option<String>,

        /// Print structured current conditions instead of the one-line summary
        #[arg(long)]
        json: bool,
    },

    /// Show, set, or toggle the theme
    Theme {
        /// light or dark; toggles when omitted
        #[arg(value_parser = parse_theme)]
        theme: Option<Theme>,
    },
}

fn parse_theme(value: &str) -> Result<Theme, String> {
    Theme::from_str(value.trim()).map_err(|_| format!("expected light or dark, got {value:?}"))
}
