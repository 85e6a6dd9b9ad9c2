pub mod context;
pub mod dispatch;
pub mod repl;
pub mod status;

pub use context::{AppContext, WeatherFormat};
