use serde::{Deserialize, Serialize};

/// Cumulative token counters as reported by the upstream API.
///
/// `total_tokens` is accumulated as reported and is not forced to equal the
/// sum of the other two.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UsageStats {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

impl UsageStats {
    pub const fn new(prompt_tokens: u64, completion_tokens: u64, total_tokens: u64) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens,
        }
    }

    /// Add one report; missing counts are treated as zero.
    pub fn accumulate(
        &mut self,
        prompt_tokens: Option<u64>,
        completion_tokens: Option<u64>,
        total_tokens: Option<u64>,
    ) {
        self.prompt_tokens = self
            .prompt_tokens
            .saturating_add(prompt_tokens.unwrap_or_default());
        self.completion_tokens = self
            .completion_tokens
            .saturating_add(completion_tokens.unwrap_or_default());
        self.total_tokens = self
            .total_tokens
            .saturating_add(total_tokens.unwrap_or_default());
    }

    pub fn add(&mut self, other: Self) {
        self.accumulate(
            Some(other.prompt_tokens),
            Some(other.completion_tokens),
            Some(other.total_tokens),
        );
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelPricing {
    pub model_pattern: String,
    pub input_cost_per_million: f64,
    pub output_cost_per_million: f64,
}

impl ModelPricing {
    #[must_use]
    pub fn estimate_cost_micros(&self, input_tokens: u64, output_tokens: u64) -> i64 {
        let input_micros_per_million = micros_per_million(self.input_cost_per_million);
        let output_micros_per_million = micros_per_million(self.output_cost_per_million);

        let input_cost = i128::from(input_tokens) * i128::from(input_micros_per_million)
            / i128::from(1_000_000_i64);
        let output_cost = i128::from(output_tokens) * i128::from(output_micros_per_million)
            / i128::from(1_000_000_i64);

        i64::try_from(input_cost + output_cost).unwrap_or(i64::MAX)
    }
}

fn micros_per_million(cost_per_million: f64) -> i64 {
    let scaled = (cost_per_million * 1_000_000.0).round();
    let text = format!("{scaled:.0}");
    text.parse::<i64>().unwrap_or_default()
}

/// Pattern used when a model has no entry of its own.
pub const FALLBACK_PRICING_PATTERN: &str = "gpt-4o-mini";

/// Known per-million-token prices in USD. More specific patterns come first
/// because lookup takes the first substring match.
#[must_use]
pub fn default_pricing() -> Vec<ModelPricing> {
    vec![
        ModelPricing {
            model_pattern: "gpt-4o-mini".into(),
            input_cost_per_million: 0.15,
            output_cost_per_million: 0.6,
        },
        ModelPricing {
            model_pattern: "gpt-4o".into(),
            input_cost_per_million: 5.0,
            output_cost_per_million: 15.0,
        },
        ModelPricing {
            model_pattern: "qwen-max".into(),
            input_cost_per_million: 2.0,
            output_cost_per_million: 6.0,
        },
        ModelPricing {
            model_pattern: "claude-3-5-sonnet".into(),
            input_cost_per_million: 3.0,
            output_cost_per_million: 15.0,
        },
    ]
}

#[must_use]
pub fn lookup_pricing<'a>(
    model: &str,
    pricing_table: &'a [ModelPricing],
) -> Option<&'a ModelPricing> {
    pricing_table
        .iter()
        .find(|pricing| model.contains(&pricing.model_pattern))
}

/// Like [`lookup_pricing`], but unknown models are priced as
/// [`FALLBACK_PRICING_PATTERN`]. The second value reports whether the fallback
/// was used.
#[must_use]
pub fn pricing_or_fallback<'a>(
    model: &str,
    pricing_table: &'a [ModelPricing],
) -> Option<(&'a ModelPricing, bool)> {
    lookup_pricing(model, pricing_table)
        .map(|pricing| (pricing, false))
        .or_else(|| {
            lookup_pricing(FALLBACK_PRICING_PATTERN, pricing_table).map(|pricing| (pricing, true))
        })
}

/// Format micro-dollars as `$0.00123`.
pub fn format_cost_micros(micros: i64) -> String {
    let sign = if micros < 0 { "-" } else { "" };
    let abs = micros.unsigned_abs();
    format!("{sign}${}.{:06}", abs / 1_000_000, abs % 1_000_000)
}
