//! LLM service adapters
//!
//! Implementations of the LlmServicePort trait:
//! - Google (Gemini)

pub mod google;

pub use google::GoogleService;
