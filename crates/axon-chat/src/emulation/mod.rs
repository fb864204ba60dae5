//! Function-calling emulation over a text-only backend
//!
//! The backend can only produce free-form text. These modules close the
//! gap to OpenAI tool semantics: [`prompt`] teaches the backend how to
//! signal a call, [`extract`] recovers calls from whatever text comes
//! back, [`fallback`] manufactures a call when a mandatory tool choice
//! went unanswered, and [`assemble`] shapes the final response.

pub mod assemble;
pub mod extract;
pub mod fallback;
pub mod prompt;
