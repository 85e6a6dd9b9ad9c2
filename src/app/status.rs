use crate::config::Config;
use crate::session::{Message, Role};
use crate::storage::Settings;
use crate::ui::style::{dim, header};
use crate::usage::{UsageStats, default_pricing, format_cost_micros, pricing_or_fallback};

/// Cumulative token counters plus the estimated cost at `model`'s price.
pub fn render_usage(stats: &UsageStats, model: &str) -> String {
    let mut lines = vec![
        header("Token usage"),
        format!("  prompt      {}", stats.prompt_tokens),
        format!("  completion  {}", stats.completion_tokens),
        format!("  total       {}", stats.total_tokens),
    ];

    let pricing_table = default_pricing();
    if let Some((pricing, fallback)) = pricing_or_fallback(model, &pricing_table) {
        let cost = pricing.estimate_cost_micros(stats.prompt_tokens, stats.completion_tokens);
        let basis = if fallback {
            format!("{} pricing", pricing.model_pattern)
        } else {
            format!("{model} pricing")
        };
        lines.push(format!(
            "  est. cost   {} {}",
            format_cost_micros(cost),
            dim(format!("({basis})"))
        ));
    }

    lines.join("\n")
}

pub fn render_settings(settings: &Settings, config: &Config) -> String {
    let or_unset = |value: String| {
        if value.is_empty() {
            dim("(not set)")
        } else {
            value
        }
    };

    [
        header("Settings"),
        format!("  api key      {}", or_unset(settings.masked_api_key())),
        format!("  base url     {}", or_unset(settings.api_base_url.clone())),
        format!("  model        {}", or_unset(settings.model.clone())),
        format!("  temperature  {}", config.temperature),
        format!("  config       {}", config.config_path.display()),
        format!("  data         {}", config.data_path().display()),
    ]
    .join("\n")
}

pub fn render_history(messages: &[Message]) -> String {
    if messages.is_empty() {
        return dim("(no chat history)");
    }
    messages
        .iter()
        .map(|message| match message.role {
            Role::User => format!("you: {}", message.content),
            Role::Assistant => format!("assistant: {}", message.content),
        })
        .collect::<Vec<_>>()
        .join("\n")
}
