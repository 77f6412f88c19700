// src/scripts/mod.rs
pub mod generator;
pub mod gemini;
pub mod library;
pub mod templates;

pub use generator::{CompletionProvider, GeneratedScript, GenerationError, ScriptGenerator};
pub use gemini::GeminiProvider;
pub use library::{SavedScript, ScriptLibrary};
pub use templates::{ScriptTemplate, CALL_PURPOSES, DEFAULT_SCRIPT};
