//! Audio, CV and gate connections and their dual storage.
//!
//! The control side keeps the authoritative list behind a mutex. The audio
//! thread owns its own copy and is the only writer of it: mutations reach it
//! as `Add*Connection` / `Remove*Connection` realtime events, applied with
//! [`RtConnections::add_rt`] and [`RtConnections::remove_rt`] from inside the
//! audio callback. While the graph is paused the owner may mirror directly.

use crate::types::ObjectId;
use parking_lot::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioConnection {
    pub engine_channel: u16,
    pub track_channel: u16,
    pub track: ObjectId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CvConnection {
    pub processor_id: ObjectId,
    pub parameter_id: ObjectId,
    pub cv_id: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateConnection {
    pub processor_id: ObjectId,
    pub gate_id: u16,
    pub note: u8,
    pub channel: u8,
}

/// Control-side connection list.
#[derive(Debug)]
pub struct ConnectionStorage<T> {
    items: Mutex<Vec<T>>,
    capacity: usize,
}

/// Audio-thread connection list. Pre-allocated, never grows past capacity.
#[derive(Debug)]
pub struct RtConnections<T> {
    items: Vec<T>,
    capacity: usize,
}

/// Creates both halves with the same capacity.
pub fn connection_storage<T: Copy + PartialEq>(
    capacity: usize,
) -> (ConnectionStorage<T>, RtConnections<T>) {
    (
        ConnectionStorage {
            items: Mutex::new(Vec::with_capacity(capacity)),
            capacity,
        },
        RtConnections {
            items: Vec::with_capacity(capacity),
            capacity,
        },
    )
}

impl<T: Copy + PartialEq> ConnectionStorage<T> {
    /// Returns `false` if the storage is full.
    pub fn add(&self, connection: T) -> bool {
        let mut items = self.items.lock();
        if items.len() >= self.capacity {
            return false;
        }
        items.push(connection);
        true
    }

    /// Removes every entry equal to `pattern`. Returns whether anything was removed.
    pub fn remove(&self, pattern: &T) -> bool {
        let mut items = self.items.lock();
        let before = items.len();
        items.retain(|c| c != pattern);
        before != items.len()
    }

    pub fn contains(&self, pattern: &T) -> bool {
        self.items.lock().contains(pattern)
    }

    /// Copy of the current connections.
    pub fn connections(&self) -> Vec<T> {
        self.items.lock().clone()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<T: Copy + PartialEq> RtConnections<T> {
    /// Returns `false` if full. Never allocates.
    #[inline]
    pub fn add_rt(&mut self, connection: T) -> bool {
        if self.items.len() >= self.capacity {
            return false;
        }
        self.items.push(connection);
        true
    }

    #[inline]
    pub fn remove_rt(&mut self, pattern: &T) -> bool {
        let before = self.items.len();
        self.items.retain(|c| c != pattern);
        before != self.items.len()
    }

    #[inline]
    pub fn connections_rt(&self) -> &[T] {
        &self.items
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
