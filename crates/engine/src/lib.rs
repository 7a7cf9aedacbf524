pub mod agent;
pub mod api;
pub mod config;
pub mod events;
pub mod logger;
pub mod prompt;
