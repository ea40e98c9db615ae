//! Shared vocabulary between the career assistant backend and its clients.
//!
//! This crate establishes the data types exchanged with the backend and the
//! [`Backend`] contract that every transport (the real HTTP client, or a
//! fake for tests) implements, so that the session and list models can run
//! against either of them without modification.
//!
//! Types in this crate don't define any behavior, instead they are the
//! constraints that the implementors should adhere to.

#![deny(missing_docs)]

mod backend;
mod conversation;
mod error;
mod message;
mod metrics;
pub mod timestamp;
mod turn;
mod user;

pub use backend::*;
pub use conversation::*;
pub use error::*;
pub use message::*;
pub use metrics::*;
pub use turn::*;
pub use user::*;
