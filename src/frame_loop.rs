//! Explicit frame-loop lifecycle.
//!
//! [`start`] arms a per-frame callback and returns the pump side and the
//! cancellation handle separately. The embedding calls [`FrameLoop::pump`]
//! once per display refresh for as long as it returns `true`; invoking
//! [`LoopHandle::cancel`] is the only way to stop the loop. A pump that
//! races with cancellation (a callback the host had already scheduled)
//! performs no work.

use std::{cell::RefCell, rc::Rc};

type TickFn = Box<dyn FnMut(f64)>;

struct Shared {
    cancelled: bool,
    tick: Option<TickFn>,
}

/// Pump side of an armed loop, held by the frame-timing adapter.
pub struct FrameLoop {
    shared: Rc<RefCell<Shared>>,
}

/// Cancellation side of an armed loop, held by the owner for teardown.
#[derive(Clone)]
pub struct LoopHandle {
    shared: Rc<RefCell<Shared>>,
}

/// Arms `tick` and returns the loop's two halves.
pub fn start(tick: impl FnMut(f64) + 'static) -> (FrameLoop, LoopHandle) {
    let shared = Rc::new(RefCell::new(Shared {
        cancelled: false,
        tick: Some(Box::new(tick)),
    }));
    (
        FrameLoop {
            shared: shared.clone(),
        },
        LoopHandle { shared },
    )
}

impl FrameLoop {
    /// Runs one iteration with the elapsed seconds since the previous one.
    ///
    /// Returns whether the loop is still armed; once `false` the adapter
    /// must stop re-scheduling. No-op after cancellation.
    pub fn pump(&self, dt_secs: f64) -> bool {
        // Take the callback out so a tick may itself cancel the loop
        // without a re-entrant borrow.
        let Some(mut tick) = self.shared.borrow_mut().tick.take() else {
            return false;
        };

        tick(dt_secs);

        let mut shared = self.shared.borrow_mut();
        if shared.cancelled {
            return false;
        }
        shared.tick = Some(tick);
        true
    }

    pub fn is_cancelled(&self) -> bool {
        self.shared.borrow().cancelled
    }
}

impl LoopHandle {
    /// Stops the loop and drops the callback. Idempotent.
    pub fn cancel(&self) {
        let mut shared = self.shared.borrow_mut();
        shared.cancelled = true;
        shared.tick = None;
    }

    pub fn is_cancelled(&self) -> bool {
        self.shared.borrow().cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn pump_runs_until_cancelled() {
        let count = Rc::new(Cell::new(0u32));
        let c = count.clone();
        let (frame_loop, handle) = start(move |_| c.set(c.get() + 1));

        assert!(frame_loop.pump(1.0 / 60.0));
        assert!(frame_loop.pump(1.0 / 60.0));
        assert_eq!(count.get(), 2);

        handle.cancel();
        assert!(!frame_loop.pump(1.0 / 60.0));
        assert!(!frame_loop.pump(1.0 / 60.0));
        assert_eq!(count.get(), 2);
        assert!(frame_loop.is_cancelled());
    }

    #[test]
    fn cancel_from_inside_a_tick_stops_rearming() {
        let count = Rc::new(Cell::new(0u32));
        let c = count.clone();
        let handle_slot: Rc<RefCell<Option<LoopHandle>>> = Rc::new(RefCell::new(None));
        let slot = handle_slot.clone();

        let (frame_loop, handle) = start(move |_| {
            c.set(c.get() + 1);
            if let Some(h) = slot.borrow().as_ref() {
                h.cancel();
            }
        });
        *handle_slot.borrow_mut() = Some(handle);

        assert!(!frame_loop.pump(0.016));
        assert!(!frame_loop.pump(0.016));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn cancel_is_idempotent() {
        let (frame_loop, handle) = start(|_| {});
        handle.cancel();
        handle.cancel();
        assert!(!frame_loop.pump(0.016));
    }
}
