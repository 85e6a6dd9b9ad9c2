pub mod store;
pub mod token_estimate;
pub mod types;

pub use store::UsageStore;
pub use token_estimate::estimate_tokens;
pub use types::{
    ModelPricing, UsageStats, default_pricing, format_cost_micros, lookup_pricing,
    pricing_or_fallback,
};
