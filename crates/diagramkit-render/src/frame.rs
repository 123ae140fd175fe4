//! Repaint coalescing.
//!
//! Any number of `mark_dirty` calls between two display frames produce a
//! single frame request. The host calls back into the renderer when the
//! frame arrives; a frame that finds nothing dirty does no work.

use std::cell::Cell;
use std::fmt;

/// Platform hook asking for one animation-frame callback.
pub trait FrameRequester {
    fn request_frame(&self);
}

impl<F: Fn()> FrameRequester for F {
    fn request_frame(&self) {
        self()
    }
}

/// Dirty flag plus at most one outstanding frame request.
///
/// Interior mutability lets an `Rc<FrameScheduler>` be shared with store
/// subscribers without borrowing the renderer.
pub struct FrameScheduler {
    dirty: Cell<bool>,
    pending: Cell<bool>,
    requests: Cell<u64>,
    requester: Box<dyn FrameRequester>,
}

impl fmt::Debug for FrameScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameScheduler")
            .field("dirty", &self.dirty.get())
            .field("pending", &self.pending.get())
            .field("requests", &self.requests.get())
            .finish()
    }
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new(|| {})
    }
}

impl FrameScheduler {
    pub fn new(requester: impl FrameRequester + 'static) -> Self {
        Self {
            dirty: Cell::new(false),
            pending: Cell::new(false),
            requests: Cell::new(0),
            requester: Box::new(requester),
        }
    }

    /// Flag a repaint, requesting a frame unless one is already pending.
    pub fn mark_dirty(&self) {
        self.dirty.set(true);
        if self.pending.replace(true) {
            log::trace!("repaint coalesced into pending frame");
            return;
        }
        self.requests.set(self.requests.get() + 1);
        self.requester.request_frame();
    }

    /// Called when the requested frame arrives. Returns whether a repaint is due.
    pub fn take_frame(&self) -> bool {
        self.pending.set(false);
        self.dirty.replace(false)
    }

    /// Clear the dirty flag after a synchronous repaint. A frame still in
    /// flight becomes a no-op.
    pub fn clear_dirty(&self) {
        self.dirty.set(false);
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.get()
    }

    /// Frames requested from the platform so far.
    pub fn requests(&self) -> u64 {
        self.requests.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn test_marks_coalesce_into_one_request() {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let scheduler = FrameScheduler::new(move || counter.set(counter.get() + 1));

        for _ in 0..10 {
            scheduler.mark_dirty();
        }
        assert_eq!(calls.get(), 1);
        assert!(scheduler.take_frame());

        scheduler.mark_dirty();
        assert_eq!(calls.get(), 2);
        assert_eq!(scheduler.requests(), 2);
    }

    #[test]
    fn test_stale_frame_is_noop() {
        let scheduler = FrameScheduler::default();
        scheduler.mark_dirty();
        scheduler.clear_dirty();
        assert!(scheduler.is_pending());
        assert!(!scheduler.take_frame());
        assert!(!scheduler.is_pending());
        assert!(!scheduler.take_frame());
    }
}
