//! Lock-free FIFO of realtime events.
//!
//! One FIFO carries events from the dispatcher thread into the audio thread,
//! another carries processor output back. Both are single-producer,
//! single-consumer ring buffers; pushing onto a full FIFO drops the event and
//! bumps a counter that the non-realtime side reports.

use crate::event::RtEvent;
use ringbuf::{traits::*, HeapCons, HeapProd, HeapRb};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub const MAX_EVENTS_IN_QUEUE: usize = 1024;

/// Anything realtime events can be sent into.
pub trait RtEventPipe: Send {
    /// Must never block or allocate when called on the audio thread.
    fn send_event(&mut self, event: RtEvent);
}

/// Buffers events in a plain vector. Useful for tests and offline processing.
impl RtEventPipe for Vec<RtEvent> {
    fn send_event(&mut self, event: RtEvent) {
        self.push(event);
    }
}

/// Producer side of a [`rt_event_fifo`].
pub struct RtEventProducer {
    producer: HeapProd<RtEvent>,
    dropped: Arc<AtomicU64>,
}

impl RtEventProducer {
    /// Returns `false` and counts the drop if the FIFO is full.
    #[inline]
    pub fn push(&mut self, event: RtEvent) -> bool {
        if self.producer.try_push(event).is_ok() {
            true
        } else {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            false
        }
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.producer.is_full()
    }
}

impl RtEventPipe for RtEventProducer {
    #[inline]
    fn send_event(&mut self, event: RtEvent) {
        self.push(event);
    }
}

/// Consumer side of a [`rt_event_fifo`].
pub struct RtEventConsumer {
    consumer: HeapCons<RtEvent>,
    dropped: Arc<AtomicU64>,
}

impl RtEventConsumer {
    #[inline]
    pub fn pop(&mut self) -> Option<RtEvent> {
        self.consumer.try_pop()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.consumer.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.consumer.occupied_len()
    }

    /// Number of events dropped by the producer since the last call.
    pub fn take_dropped(&self) -> u64 {
        self.dropped.swap(0, Ordering::Relaxed)
    }
}

pub fn rt_event_fifo() -> (RtEventProducer, RtEventConsumer) {
    rt_event_fifo_with_capacity(MAX_EVENTS_IN_QUEUE)
}

pub fn rt_event_fifo_with_capacity(capacity: usize) -> (RtEventProducer, RtEventConsumer) {
    let rb = HeapRb::new(capacity);
    let (producer, consumer) = rb.split();
    let dropped = Arc::new(AtomicU64::new(0));
    (
        RtEventProducer {
            producer,
            dropped: Arc::clone(&dropped),
        },
        RtEventConsumer { consumer, dropped },
    )
}
