use super::context::{AppContext, WeatherFormat};
use super::status::render_usage;
use crate::commands::{Command, HELP_TEXT, parse_command};
use crate::session::Transcript;
use crate::storage::Theme;
use crate::ui::style::{dim, header};
use crate::ui::{Palette, TerminalTranscript};
use anyhow::Result;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// What the loop does after a slash command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Retheme(Theme),
    Quit,
}

/// Cancel `cancel` on Ctrl-C. The task ends once the token is cancelled
/// either way.
pub fn cancel_on_ctrl_c(cancel: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            () = cancel.cancelled() => {}
            signal = tokio::signal::ctrl_c() => {
                if signal.is_ok() {
                    cancel.cancel();
                }
            }
        }
    })
}

/// Send one message, cancellable with Ctrl-C. Returns whether it completed.
pub async fn run_exchange(app: &AppContext, text: &str, transcript: &mut dyn Transcript) -> bool {
    let settings = app.current_settings();
    let cancel = CancellationToken::new();
    let watcher = cancel_on_ctrl_c(cancel.clone());

    let result = app.session.send(&settings, text, transcript, &cancel).await;

    cancel.cancel();
    let _ = watcher.await;

    match result {
        Ok(outcome) => {
            if outcome.usage_estimated {
                transcript.push_notice(&format!(
                    "No usage reported; estimated {} completion tokens.",
                    outcome.usage.completion_tokens
                ));
            }
            true
        }
        Err(_) => false,
    }
}

/// Execute a slash command, rendering its output and errors into `transcript`.
pub async fn handle_command(
    app: &AppContext,
    command: Command,
    transcript: &mut dyn Transcript,
) -> Flow {
    match command {
        Command::Help => transcript.push_notice(HELP_TEXT),
        Command::Clear => match app.session.history().clear() {
            Ok(()) => transcript.push_notice("Chat history cleared."),
            Err(error) => transcript.push_error(&error.to_string()),
        },
        Command::Usage => {
            let settings = app.current_settings();
            let stats = app.session.usage().snapshot();
            transcript.push_notice(&render_usage(&stats, &settings.model));
        }
        Command::ResetUsage => match app.session.usage().reset() {
            Ok(()) => transcript.push_notice("Token usage reset."),
            Err(error) => transcript.push_error(&error.to_string()),
        },
        Command::Models => {
            let settings = app.current_settings();
            match app.session.client().list_models(&settings).await {
                Ok(models) if models.is_empty() => transcript.push_notice("No models offered."),
                Ok(models) => transcript.push_notice(&render_model_list(&models, &settings.model)),
                Err(error) => transcript.push_error(&error.to_string()),
            }
        }
        Command::Model { id } => match app.settings.select_model(&id) {
            Ok(()) => {
                if app.config.settings_overrides.model.is_some() {
                    transcript.push_notice("SKYCHAT_MODEL is set and still takes precedence.");
                }
                transcript.push_notice(&format!("Model set to {id}."));
            }
            Err(error) => transcript.push_error(&error.to_string()),
        },
        Command::Weather { city } => {
            let city = city.unwrap_or_else(|| app.default_city());
            let report = app.weather_report(&city, WeatherFormat::Conditions).await;
            transcript.push_notice(&report);
        }
        Command::Theme { theme } => {
            let result = match theme {
                Some(theme) => app.preferences.set_theme(theme).map(|()| theme),
                None => app.preferences.toggle_theme(),
            };
            return match result {
                Ok(theme) => {
                    transcript.push_notice(&format!("Theme: {theme}"));
                    Flow::Retheme(theme)
                }
                Err(error) => {
                    transcript.push_error(&error.to_string());
                    Flow::Continue
                }
            };
        }
        Command::Quit => return Flow::Quit,
        Command::Invalid { usage } => transcript.push_error(&format!("Usage: {usage}")),
        Command::Unknown { name } => {
            transcript.push_error(&format!("Unknown command {name}; try /help"));
        }
    }
    Flow::Continue
}

/// Model IDs one per line, the selected one marked with `*`.
pub fn render_model_list(models: &[String], selected: &str) -> String {
    models
        .iter()
        .map(|id| {
            let marker = if id == selected { '*' } else { ' ' };
            format!("{marker} {id}")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn print_prompt(palette: Palette) {
    let mut stdout = std::io::stdout().lock();
    let _ = write!(stdout, "{}", palette.prompt());
    let _ = stdout.flush();
}

/// Interactive chat loop. Returns on `/quit`, end of input, or Ctrl-C at the
/// prompt. Ctrl-C during a reply cancels only that reply.
pub async fn run(app: &AppContext) -> Result<()> {
    let mut transcript = TerminalTranscript::new(Palette::new(app.preferences.theme()));

    println!("{}", header(format!("SkyChat {}", env!("CARGO_PKG_VERSION"))));
    println!("{}", dim("Type a message, or /help for commands."));
    transcript.replay(&app.session.history().load());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print_prompt(transcript.palette());

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            println!();
            break;
        };

        let text = line.trim();
        if text.is_empty() {
            continue;
        }

        if let Some(command) = parse_command(text) {
            match handle_command(app, command, &mut transcript).await {
                Flow::Continue => {}
                Flow::Retheme(theme) => transcript.set_palette(Palette::new(theme)),
                Flow::Quit => break,
            }
            continue;
        }

        run_exchange(app, text, &mut transcript).await;
    }

    Ok(())
}
