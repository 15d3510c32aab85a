//! Slot tick plumbing.
//!
//! The master performs one slot of bus activity per tick. Ticks are produced
//! by a periodic interrupt or thread and consumed by exactly one master; the
//! long reset pulse suspends production while it occupies the line for many
//! nominal slot widths. Single producer, single consumer.

use core::sync::atomic::{AtomicBool, Ordering};

/// Source of "slot elapsed" signals.
pub trait TickSource {
    /// Takes the pending tick, if any. A `true` return hands the current
    /// slot to the caller and clears the flag.
    fn take_tick(&mut self) -> bool;

    /// Stops slot production for the duration of a long pulse.
    fn suspend(&mut self);

    /// Resumes slot production.
    fn resume(&mut self);
}

/// Tick flag shared between a periodic producer and one consuming master.
///
/// The producer side calls [`SharedTick::notify`] from its interrupt or
/// thread; the consumer side hands a `&SharedTick` to the master, which
/// implements [`TickSource`] through it.
#[derive(Debug, Default)]
pub struct SharedTick {
    tick: AtomicBool,
    suspended: AtomicBool,
}

impl SharedTick {
    /// Creates an idle tick source.
    pub const fn new() -> Self {
        SharedTick {
            tick: AtomicBool::new(false),
            suspended: AtomicBool::new(false),
        }
    }

    /// Producer side: marks the current slot as elapsed.
    ///
    /// Ticks raised while the source is suspended are dropped.
    pub fn notify(&self) {
        if !self.suspended.load(Ordering::Acquire) {
            self.tick.store(true, Ordering::Release);
        }
    }
}

impl TickSource for &SharedTick {
    fn take_tick(&mut self) -> bool {
        self.tick.swap(false, Ordering::AcqRel)
    }

    fn suspend(&mut self) {
        self.suspended.store(true, Ordering::Release);
        self.tick.store(false, Ordering::Release);
    }

    fn resume(&mut self) {
        self.suspended.store(false, Ordering::Release);
    }
}
