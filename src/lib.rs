#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::unnecessary_literal_bound,
    clippy::module_name_repetitions,
    clippy::struct_field_names,
    clippy::must_use_candidate,
    clippy::new_without_default,
    clippy::return_self_not_must_use
)]

pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
pub mod error;
pub mod session;
pub mod storage;
pub mod ui;
pub mod usage;
pub mod weather;

pub use config::Config;
pub use crate::core::providers::{ChatClient, StreamEvent};
pub use error::{ChatError, StorageError, WeatherError};
pub use session::{ChatSession, ExchangeOutcome, Message, Role, Transcript};
pub use storage::{LocalStorage, Settings};
pub use usage::UsageStats;
