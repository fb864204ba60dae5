//! OpenAI-compatible chat completions over a tool-less text backend
//!
//! The backend can only return free-form text. This crate compiles tool
//! definitions into an instructional prompt, parses tool-call JSON back
//! out of whatever the backend produced, synthesizes a call when a
//! mandatory tool choice went unanswered, and assembles single-shot and
//! streamed OpenAI-shaped responses.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod backend;
mod convert;
pub mod emulation;
mod error;
#[cfg(feature = "http")]
mod handler;
pub mod protocol;
mod state;
pub mod types;
mod usage;
mod validate;

pub use error::ChatError;
#[cfg(feature = "http")]
pub use handler::chat_router;
pub use state::ChatState;
pub use validate::validate_request;
