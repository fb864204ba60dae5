//! Tool implementations and safe dispatch
//!
//! Holds the process-wide registry of callable tool implementations
//! (built-in plus dynamically registered) and the executor that turns a
//! named invocation into a string payload. Execution never fails from the
//! caller's perspective: every failure mode is captured into an
//! `{"error": ...}` payload.

#![allow(clippy::must_use_candidate)]

mod builtin;
mod executor;
mod registry;

pub use builtin::{calculate, time};
pub use executor::execute_function;
pub use registry::{ToolError, ToolHandler, ToolRegistry};
