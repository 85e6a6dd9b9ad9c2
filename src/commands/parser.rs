use super::types::Command;
use crate::storage::Theme;
use std::str::FromStr;

/// Parse a slash command. Returns `None` for ordinary chat input.
pub fn parse_command(input: &str) -> Option<Command> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let cmd = parts.next()?.to_lowercase();
    let args = parts.next().unwrap_or("").trim();

    let command = match cmd.as_str() {
        "/help" | "/?" => Command::Help,
        "/clear" => Command::Clear,
        "/usage" => Command::Usage,
        "/reset-usage" => Command::ResetUsage,
        "/models" => Command::Models,
        "/model" if args.is_empty() => Command::Invalid {
            usage: "/model <id>",
        },
        "/model" => Command::Model {
            id: args.to_string(),
        },
        "/weather" => Command::Weather {
            city: Some(args.to_string()).filter(|city| !city.is_empty()),
        },
        "/theme" if args.is_empty() => Command::Theme { theme: None },
        "/theme" => match Theme::from_str(args) {
            Ok(theme) => Command::Theme { theme: Some(theme) },
            Err(_) => Command::Invalid {
                usage: "/theme [light|dark]",
            },
        },
        "/quit" | "/exit" => Command::Quit,
        _ => Command::Unknown { name: cmd },
    };
    Some(command)
}
