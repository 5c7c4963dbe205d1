pub mod llm;

pub use llm::{GeminiClient, GenerationError, TextGenerator};
