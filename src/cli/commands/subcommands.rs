use clap::Subcommand;

/// Connection settings subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum SettingsCommands {
    /// Show the stored settings (API key masked)
    Show,
    /// Save settings; prompts for anything not given when no flags are passed
    Set {
        /// API key sent as a bearer token
        #[arg(long)]
        api_key: Option<String>,
        /// Base URL of the OpenAI-compatible endpoint (http or https)
        #[arg(long)]
        base_url: Option<String>,
        /// Model ID; left unchanged when empty
        #[arg(long)]
        model: Option<String>,
    },
}

/// Token usage subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum UsageCommands {
    /// Show cumulative token counters and estimated cost
    Show,
    /// Reset all counters to zero
    Reset,
}

/// Chat history subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum HistoryCommands {
    /// Print the stored conversation
    Show,
    /// Delete the stored conversation
    Clear,
}
