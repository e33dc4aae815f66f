//! Getting protocol lines off the wire.

pub mod client;
pub mod lines;

pub use client::{ChatClient, DATA_STREAM_HEADER};
pub use lines::LineDecoder;
