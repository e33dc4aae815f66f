//! Core types for goose-stream.

pub mod message;

pub use message::*;
