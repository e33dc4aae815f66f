//! Local port selection for backend processes.

use std::collections::HashSet;
use std::net::{Ipv4Addr, TcpListener};
use std::sync::Mutex;

use tracing::debug;

use crate::config::ChatEnvironment;
use crate::error::{ChatError, Result};

/// Hands out free loopback ports from a fixed range.
///
/// A port counts as free when this allocator has not handed it out and it can
/// be bound on `127.0.0.1` right now. Safe to share between threads.
#[derive(Debug)]
pub struct PortAllocator {
    min_port: u16,
    max_port: u16,
    reserved: Mutex<HashSet<u16>>,
}

impl PortAllocator {
    pub fn new(min_port: u16, max_port: u16) -> Self {
        Self {
            min_port,
            max_port,
            reserved: Mutex::new(HashSet::new()),
        }
    }

    pub fn from_environment(env: &ChatEnvironment) -> Self {
        Self::new(env.min_port, env.max_port)
    }

    /// Reserve and return the lowest free port in range.
    pub fn allocate(&self) -> Result<u16> {
        let mut reserved = self.lock();
        for port in self.min_port..=self.max_port {
            if !reserved.contains(&port) && is_bindable(port) {
                reserved.insert(port);
                debug!(port, "allocated port");
                return Ok(port);
            }
        }
        Err(ChatError::Configuration(format!(
            "no free port between {} and {}",
            self.min_port, self.max_port
        )))
    }

    /// Return a port to the pool. Returns false if it was not reserved.
    pub fn release(&self, port: u16) -> bool {
        self.lock().remove(&port)
    }

    pub fn is_available(&self, port: u16) -> bool {
        !self.lock().contains(&port) && is_bindable(port)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashSet<u16>> {
        self.reserved
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn is_bindable(port: u16) -> bool {
    TcpListener::bind((Ipv4Addr::LOCALHOST, port)).is_ok()
}
