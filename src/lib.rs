#![recursion_limit = "256"]

pub mod apis;
pub mod arguments;
pub mod config;
pub mod database;
pub mod errors;
pub mod logger;
pub mod metrics;
pub mod prompts;
pub mod webserver;
