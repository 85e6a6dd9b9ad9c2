pub mod compatible;
pub mod http_client;
mod openai_types;
pub mod scrub;
pub mod sse;
pub mod streaming;

pub use compatible::{ChatClient, DEFAULT_TEMPERATURE, chat_completions_url, models_url};
pub use http_client::{build_http_client, build_http_client_with_timeout};
#[allow(unused_imports)]
pub use scrub::{sanitize_api_error, scrub_secret_patterns};
pub use streaming::{ChatEventStream, EventDecoder, StreamCollector, StreamEvent, decode_payload};
