//! Mock register bus for testing

use super::RegisterBus;
use crate::error::{Error, Result};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

/// Mock register bus for unit testing
///
/// Cloning yields a handle to the same register state, so a test can keep
/// one handle while a driver owns the other.
#[derive(Clone)]
pub struct MockBus {
    inner: Arc<Mutex<MockBusInner>>,
}

#[derive(Default)]
struct MockBusInner {
    /// Register contents keyed by (device address, register offset)
    registers: HashMap<(u8, u8), u16>,
    /// Queued reads served before the register map, oldest first
    queued: HashMap<(u8, u8), VecDeque<u16>>,
    /// Log of all writes in order
    writes: Vec<(u8, u8, u16)>,
    /// When set, every read fails
    fail_reads: bool,
    /// When set, every write fails
    fail_writes: bool,
}

impl MockBus {
    /// Create a new mock bus with all registers reading as zero
    pub fn new() -> Self {
        MockBus {
            inner: Arc::new(Mutex::new(MockBusInner::default())),
        }
    }

    /// Set a register's current value
    pub fn set_register(&self, address: u8, register: u8, value: u16) {
        let mut inner = self.inner.lock().unwrap();
        inner.registers.insert((address, register), value);
    }

    /// Get a register's current value, if one was ever written or set
    pub fn register(&self, address: u8, register: u8) -> Option<u16> {
        let inner = self.inner.lock().unwrap();
        inner.registers.get(&(address, register)).copied()
    }

    /// Queue a value to be served by the next read of a register
    ///
    /// Queued values are consumed in FIFO order; once drained, reads fall
    /// back to the register map.
    pub fn queue_read(&self, address: u8, register: u8, value: u16) {
        let mut inner = self.inner.lock().unwrap();
        inner
            .queued
            .entry((address, register))
            .or_default()
            .push_back(value);
    }

    /// Get all writes in order as (address, register, value)
    pub fn writes(&self) -> Vec<(u8, u8, u16)> {
        let inner = self.inner.lock().unwrap();
        inner.writes.clone()
    }

    /// Make all subsequent reads fail until cleared
    pub fn fail_reads(&self, fail: bool) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_reads = fail;
    }

    /// Make all subsequent writes fail until cleared
    pub fn fail_writes(&self, fail: bool) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_writes = fail;
    }
}

impl RegisterBus for MockBus {
    fn read_register(&mut self, address: u8, register: u8) -> Result<u16> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_reads {
            return Err(Error::Transport(format!(
                "injected read fault at {:#04x}/{:#04x}",
                address, register
            )));
        }
        if let Some(queue) = inner.queued.get_mut(&(address, register)) {
            if let Some(value) = queue.pop_front() {
                return Ok(value);
            }
        }
        Ok(inner
            .registers
            .get(&(address, register))
            .copied()
            .unwrap_or(0))
    }

    fn write_register(&mut self, address: u8, register: u8, value: u16) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_writes {
            return Err(Error::Transport(format!(
                "injected write fault at {:#04x}/{:#04x}",
                address, register
            )));
        }
        inner.writes.push((address, register, value));
        inner.registers.insert((address, register), value);
        Ok(())
    }
}

impl Default for MockBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_echo() {
        let bus = MockBus::new();
        let mut handle = bus.clone();
        handle.write_register(0x42, 0x05, 0x5D83).unwrap();
        assert_eq!(handle.read_register(0x42, 0x05).unwrap(), 0x5D83);
        assert_eq!(bus.writes(), vec![(0x42, 0x05, 0x5D83)]);
    }

    #[test]
    fn test_queued_reads_drain_in_order() {
        let bus = MockBus::new();
        bus.set_register(0x42, 0x02, 100);
        bus.queue_read(0x42, 0x02, 1);
        bus.queue_read(0x42, 0x02, 2);

        let mut handle = bus.clone();
        assert_eq!(handle.read_register(0x42, 0x02).unwrap(), 1);
        assert_eq!(handle.read_register(0x42, 0x02).unwrap(), 2);
        // Falls back to the register map once drained
        assert_eq!(handle.read_register(0x42, 0x02).unwrap(), 100);
    }

    #[test]
    fn test_injected_read_fault() {
        let bus = MockBus::new();
        bus.fail_reads(true);
        let mut handle = bus.clone();
        assert!(handle.read_register(0x42, 0x02).is_err());
        bus.fail_reads(false);
        assert_eq!(handle.read_register(0x42, 0x02).unwrap(), 0);
    }
}
