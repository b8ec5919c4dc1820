//! Outbound HTTP integrations

pub mod client;
pub mod prompt_api;

pub use client::HttpClient;
pub use prompt_api::{HttpPromptForwarder, PromptForwarder, PromptRequest};
