//! Convenience re-exports for common use.

pub use crate::config::ChatEnvironment;
pub use crate::error::{ChatError, Result};
pub use crate::handler::{dispatch, StreamDispatcher, StreamHandler, TextDeltaTracker};
pub use crate::protocol::{StreamParser, StreamPart, StreamTag, Usage};
pub use crate::transport::{ChatClient, LineDecoder};
pub use crate::types::{ChatMessage, ChatRequest, ChatResponse, Role};
