//! Quantoptik is a terminal tutor for quantum optics.
//!
//! Typed lines go through a small set of layers:
//! - [`commands`] parses a line, looks the command up in a static registry,
//!   runs its handler, and records the resulting output lines.
//! - [`core`] owns the session, the transcript, the chat-completion client,
//!   the arXiv lookup, the local user registry, and configuration.
//! - [`ui`] renders output lines and runs the interactive prompt.
//! - [`api`] defines the chat-completion wire payloads.
//!
//! The binary (`src/main.rs`) routes through [`crate::cli::main`].

pub mod api;
pub mod auth;
pub mod cli;
pub mod commands;
pub mod core;
pub mod ui;
pub mod utils;
