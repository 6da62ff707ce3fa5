// src/config/mod.rs
// Configuration: environment variables and the project's .clauderc

pub mod env;
pub mod file;

pub use env::{AiServiceSettings, EnvConfig};
pub use file::{ClaudeRc, SafetyRules};
