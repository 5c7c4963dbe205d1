mod settings;

pub use settings::{LLMConfig, LoggingConfig, ServerConfig, Settings, StoreConfig, API_KEY_ENV};
