//! Ownership transfer of variable-size payloads into the audio thread.
//!
//! ```text
//! control thread              audio thread               worker thread
//!      │                           │                          │
//!  insert(payload) ──HandoffId──▶ with(id, |p| ..)            │
//!      │                           │                          │
//!      │                     Delete(id) RtEvent ──────────▶ release(id)
//!      │                           │                      (payload dropped)
//! ```
//!
//! Slots are `ArcSwapOption`s. The store keeps its own reference to every
//! live payload, so a read on the audio thread never drops the last `Arc`.
//! Slots are recycled once released.

use crate::state::RtState;
use crate::types::BlobData;
use arc_swap::ArcSwapOption;
use parking_lot::Mutex;
use std::sync::Arc;

/// Handle to a parked payload. Small and `Copy` so it fits in a `RtEvent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandoffId(u32);

impl HandoffId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Payloads that may be handed to the audio thread.
#[derive(Debug, Clone, PartialEq)]
pub enum Handoff {
    String(String),
    Blob(BlobData),
    State(RtState),
}

pub struct HandoffStore {
    slots: Box<[ArcSwapOption<Handoff>]>,
    free: Mutex<Vec<u32>>,
}

impl HandoffStore {
    pub fn new(capacity: usize) -> Self {
        let slots = (0..capacity).map(|_| ArcSwapOption::empty()).collect();
        // Reversed so that slot 0 is handed out first.
        let free = (0..capacity as u32).rev().collect();
        Self {
            slots,
            free: Mutex::new(free),
        }
    }

    /// Parks `payload`. Returns `None` when every slot is in use. Non-realtime only.
    pub fn insert(&self, payload: Handoff) -> Option<HandoffId> {
        let index = self.free.lock().pop()?;
        self.slots[index as usize].store(Some(Arc::new(payload)));
        Some(HandoffId(index))
    }

    /// Reads a parked payload without taking ownership. Realtime safe.
    #[inline]
    pub fn with<R>(&self, id: HandoffId, f: impl FnOnce(&Handoff) -> R) -> Option<R> {
        let slot = self.slots.get(id.index())?;
        let guard = slot.load();
        guard.as_deref().map(f)
    }

    /// Takes the payload back out and frees the slot. Non-realtime only; the
    /// returned `Arc` is usually dropped right away.
    pub fn release(&self, id: HandoffId) -> Option<Arc<Handoff>> {
        let slot = self.slots.get(id.index())?;
        let payload = slot.swap(None)?;
        self.free.lock().push(id.0);
        Some(payload)
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn available(&self) -> usize {
        self.free.lock().len()
    }
}

impl std::fmt::Debug for HandoffStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandoffStore")
            .field("capacity", &self.capacity())
            .field("available", &self.available())
            .finish()
    }
}
