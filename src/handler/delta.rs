//! Cumulative-to-incremental text conversion.

/// Turns the parser's cumulative text emissions into deltas.
///
/// The parser re-emits a whole text block on every continuation line. A
/// consumer that appends what it receives needs only the new suffix; this
/// tracker remembers the last emission of the current block and strips it.
#[derive(Debug, Default, Clone)]
pub struct TextDeltaTracker {
    block: String,
}

impl TextDeltaTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an emission and return the part not seen before.
    ///
    /// `starts_block` is true when the emission came from a `0:` tag line,
    /// which always begins a new block.
    pub fn observe<'a>(&mut self, content: &'a str, starts_block: bool) -> &'a str {
        let delta = if starts_block {
            content
        } else {
            content.strip_prefix(self.block.as_str()).unwrap_or(content)
        };
        self.block.clear();
        self.block.push_str(content);
        delta
    }

    /// Everything emitted so far in the current block.
    pub fn current_block(&self) -> &str {
        &self.block
    }

    pub fn reset(&mut self) {
        self.block.clear();
    }
}
