//! Utility helpers.

pub mod port;
pub mod timeout;

pub use port::PortAllocator;
pub use timeout::with_timeout;
