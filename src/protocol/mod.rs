//! The line-oriented data-stream protocol spoken by the local backend.
//!
//! Each unit starts with a `<tag>:` line; continuation lines extend the
//! current unit. See [`StreamTag`] for the alphabet and [`StreamParser`] for
//! the decoding rules.

mod parser;
mod part;
mod payloads;
mod tag;
pub mod text;

pub use parser::{ParserState, StreamParser};
pub use part::{StreamPart, Usage};
pub use tag::{split_tagged_line, PayloadKind, StreamTag};
