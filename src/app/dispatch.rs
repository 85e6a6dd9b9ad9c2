use crate::cli::commands::{Cli, Commands, HistoryCommands, SettingsCommands, UsageCommands};
use crate::config::Config;
use crate::storage::{Settings, normalize_base_url};
use crate::ui::style::header;
use crate::ui::{Palette, TerminalTranscript};
use anyhow::{Context, Result, bail};
use dialoguer::{Input, Password};

use super::context::{AppContext, WeatherFormat};
use super::repl::{render_model_list, run_exchange};
use super::status::{render_history, render_settings, render_usage};

pub async fn dispatch(cli: Cli, config: Config) -> Result<()> {
    let app = AppContext::open(config)?;

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => super::repl::run(&app).await,

        Commands::Send { message } => {
            let text = message.join(" ");
            if text.trim().is_empty() {
                bail!("Message is empty");
            }
            let mut transcript = TerminalTranscript::new(Palette::new(app.preferences.theme()));
            if !run_exchange(&app, text.trim(), &mut transcript).await {
                bail!("Message was not answered");
            }
            Ok(())
        }

        Commands::Settings { settings_command } => match settings_command {
            SettingsCommands::Show => {
                println!("{}", render_settings(&app.current_settings(), &app.config));
                Ok(())
            }
            SettingsCommands::Set {
                api_key,
                base_url,
                model,
            } => set_settings(&app, api_key, base_url, model),
        },

        Commands::Models => {
            let settings = app.current_settings();
            let models = app
                .session
                .client()
                .list_models(&settings)
                .await
                .context("Failed to list models")?;
            println!("{}", render_model_list(&models, &settings.model));
            Ok(())
        }

        Commands::Usage { usage_command } => match usage_command {
            UsageCommands::Show => {
                let stats = app.session.usage().snapshot();
                println!("{}", render_usage(&stats, &app.current_settings().model));
                Ok(())
            }
            UsageCommands::Reset => {
                app.session
                    .usage()
                    .reset()
                    .context("Failed to reset usage")?;
                println!("Token usage reset.");
                Ok(())
            }
        },

        Commands::History { history_command } => match history_command {
            HistoryCommands::Show => {
                println!("{}", render_history(&app.session.history().load()));
                Ok(())
            }
            HistoryCommands::Clear => {
                app.session
                    .history()
                    .clear()
                    .context("Failed to clear history")?;
                println!("Chat history cleared.");
                Ok(())
            }
        },

        Commands::Weather { city, json } => {
            let city = city
                .filter(|city| !city.trim().is_empty())
                .unwrap_or_else(|| app.default_city());
            let format = if json {
                WeatherFormat::Json
            } else {
                WeatherFormat::Summary
            };
            println!("{}", app.weather_report(&city, format).await);
            Ok(())
        }

        Commands::Theme { theme } => {
            let theme = match theme {
                Some(theme) => {
                    app.preferences.set_theme(theme)?;
                    theme
                }
                None => app.preferences.toggle_theme()?,
            };
            println!("Theme: {theme}");
            Ok(())
        }
    }
}

fn set_settings(
    app: &AppContext,
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
) -> Result<()> {
    let current = app.settings.load();
    let updated = if api_key.is_none() && base_url.is_none() && model.is_none() {
        prompt_settings(&current)?
    } else {
        Settings::new(
            api_key.unwrap_or(current.api_key),
            base_url.unwrap_or(current.api_base_url),
            model.unwrap_or_default(),
        )
    };

    app.settings
        .save(&updated)
        .context("Failed to save settings")?;
    println!("{}", header("Settings saved."));
    println!("{}", render_settings(&app.current_settings(), &app.config));
    Ok(())
}

fn prompt_settings(current: &Settings) -> Result<Settings> {
    let key_prompt = if current.api_key.is_empty() {
        "  API key".to_string()
    } else {
        format!("  API key [{}] (empty keeps it)", current.masked_api_key())
    };
    let api_key = Password::new()
        .with_prompt(key_prompt)
        .allow_empty_password(!current.api_key.is_empty())
        .interact()?;
    let api_key = if api_key.trim().is_empty() {
        current.api_key.clone()
    } else {
        api_key
    };

    let mut base_url_input = Input::<String>::new()
        .with_prompt("  Base URL")
        .validate_with(|value: &String| normalize_base_url(value).map(|_| ()));
    if !current.api_base_url.is_empty() {
        base_url_input = base_url_input.default(current.api_base_url.clone());
    }
    let api_base_url = base_url_input.interact_text()?;

    let mut model_input = Input::<String>::new()
        .with_prompt("  Model (empty keeps the current one)")
        .allow_empty(true);
    if !current.model.is_empty() {
        model_input = model_input.default(current.model.clone());
    }
    let model = model_input.interact_text()?;

    Ok(Settings::new(api_key, api_base_url, model))
}
