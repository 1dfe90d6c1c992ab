//! Telehealth measure classification through an OpenAI-compatible
//! chat-completions endpoint

pub mod client;
pub mod config;
pub mod response;

pub use client::{LlmClient, build_prompt};
pub use config::{DEFAULT_LLM_BASE_URL, DEFAULT_LLM_MODEL, LlmConfig};
pub use response::{LlmMeasure, parse_measures};
