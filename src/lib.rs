//! goose-stream: client side of the goose chat data-stream protocol.
//!
//! The local backend answers `POST /reply` with a line-oriented stream of
//! tagged units: text deltas, JSON data, tool-call lifecycle events, errors
//! and finish markers. [`protocol::StreamParser`] turns those lines into
//! typed [`protocol::StreamPart`]s, tolerating units split across lines;
//! [`transport::ChatClient`] and [`handler::StreamDispatcher`] wire it to
//! HTTP and to a consumer-supplied [`handler::StreamHandler`].
//!
//! # Quick Start
//!
//! ```
//! use goose_stream::protocol::{StreamParser, StreamPart};
//!
//! let mut parser = StreamParser::new();
//! assert_eq!(parser.parse_line("0:Hello"), Some(StreamPart::text("Hello")));
//! assert_eq!(parser.parse_line("d:{\"finishReason\":\"stop\","), None);
//! assert!(matches!(
//!     parser.parse_line("\"usage\":{\"completion_tokens\":2}}"),
//!     Some(StreamPart::FinishMessage { .. })
//! ));
//! ```

pub mod config;
pub mod error;
pub mod handler;
pub mod prelude;
pub mod protocol;
pub mod transport;
pub mod types;
pub mod util;

#[cfg(feature = "cli")]
pub mod cli;
