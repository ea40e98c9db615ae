//! The career assistant dashboard.
//!
//! The crate includes a CLI tool for chatting in the terminal. And you can
//! also use it as a library to drive the dashboard from your own front end,
//! with any [`Backend`](career_chat_model::Backend) implementation.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

mod dashboard;
pub mod render;

pub use dashboard::{Dashboard, DashboardBuilder};

/// Re-exports of [`career_chat_core`] crate.
pub mod core {
    pub use career_chat_core::*;
}
