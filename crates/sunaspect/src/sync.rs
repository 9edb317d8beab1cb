//! Single-slot frame hand-off between an acquisition thread and the aspect
//! thread.
//!
//! The producer never blocks: posting overwrites whatever frame is waiting,
//! so the consumer always sees the latest frame and a slow aspect loop drops
//! frames instead of falling behind. The consumer blocks until a frame is
//! ready or the mailbox is disabled. Shutdown is cooperative: disable the
//! mailbox and every blocked consumer wakes up empty-handed.

use std::sync::{Condvar, Mutex};

use image::GrayImage;

#[derive(Debug, Default)]
struct Slot {
    frame: Option<GrayImage>,
    disabled: bool,
}

/// Latest-wins single-slot mailbox.
#[derive(Debug, Default)]
pub struct FrameMailbox {
    slot: Mutex<Slot>,
    ready: Condvar,
}

impl FrameMailbox {
    pub fn new() -> FrameMailbox {
        FrameMailbox::default()
    }

    /// Post a frame, replacing any unconsumed one. Never blocks.
    pub fn post(&self, frame: GrayImage) {
        let mut slot = self.slot.lock().expect("mailbox poisoned");
        slot.frame = Some(frame);
        self.ready.notify_one();
    }

    /// Take the waiting frame, blocking until one is posted. Returns `None`
    /// once the mailbox is disabled and drained.
    pub fn take(&self) -> Option<GrayImage> {
        let mut slot = self.slot.lock().expect("mailbox poisoned");
        loop {
            if let Some(frame) = slot.frame.take() {
                return Some(frame);
            }
            if slot.disabled {
                return None;
            }
            slot = self.ready.wait(slot).expect("mailbox poisoned");
        }
    }

    /// Take the waiting frame if there is one, without blocking.
    pub fn try_take(&self) -> Option<GrayImage> {
        self.slot.lock().expect("mailbox poisoned").frame.take()
    }

    /// Disable the mailbox and wake every blocked consumer.
    pub fn disable(&self) {
        let mut slot = self.slot.lock().expect("mailbox poisoned");
        slot.disabled = true;
        self.ready.notify_all();
    }

    /// True once `disable` has been called.
    pub fn is_disabled(&self) -> bool {
        self.slot.lock().expect("mailbox poisoned").disabled
    }
}
