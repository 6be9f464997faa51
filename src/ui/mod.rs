//! Terminal presentation: themes, line rendering, and the interactive loop.
//!
//! Command logic lives in [`crate::commands`]; this layer only turns its
//! results into styled terminal output and collects input.

pub mod chat_loop;
pub mod renderer;
pub mod theme;
