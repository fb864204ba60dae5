//! Wire format types for the client-facing API

pub mod openai;
