pub mod ai_client;
pub mod app;
pub mod config;
pub mod credentials;
pub mod papers;
pub mod session;
pub mod transcript;
