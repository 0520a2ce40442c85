//! # Task vocabulary shared across kernel subsystems
//!
//! Context identity, the two context states the synchronization core cares
//! about, and the narrow traits through which it drives the scheduler and
//! the process directory. The scheduler itself lives elsewhere; blocking
//! primitives only ever need the three calls in [`Scheduler`].

#![cfg_attr(not(any(test, doctest)), no_std)]

use core::fmt;

/// Capacity of the process table in the embedding kernel.
///
/// At most this many contexts exist at once, so a wait queue of this size
/// can never overflow: each context waits on at most one resource.
pub const CONTEXT_MAX: usize = 32;

/// Identity of a schedulable execution context (a process id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pid(u32);

impl Pid {
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The two context states visible to the synchronization core.
///
/// The embedding kernel may track more (embryo, zombie, ...); blocking
/// primitives only move contexts between these two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    /// Eligible to be picked by the scheduler.
    Runnable,
    /// Parked on a wait queue until another context wakes it.
    Waiting,
}

/// Scheduler operations the synchronization core drives.
///
/// Implementations must be callable with interrupts disabled and must not
/// call back into the primitives that invoke them.
pub trait Scheduler {
    /// Takes `pid` out of the runnable set and marks it [`ContextState::Waiting`].
    ///
    /// The context keeps running until it calls [`Scheduler::run`]; removal
    /// only makes it ineligible for the next scheduling decision.
    fn remove(&self, pid: Pid);

    /// Marks `pid` [`ContextState::Runnable`] and puts it back in the
    /// runnable set.
    fn add(&self, pid: Pid);

    /// Yields the CPU to the next runnable context.
    ///
    /// Returns only once the calling context has been selected to run
    /// again. A context that was [removed](Scheduler::remove) first will
    /// not return from this call until some other context
    /// [adds](Scheduler::add) it back.
    fn run(&self);
}

/// Read-only view of the process table.
pub trait ContextDirectory {
    /// The context executing on this CPU, or `None` outside any context
    /// (early boot, interrupt-only paths).
    fn current(&self) -> Option<Pid>;

    /// Looks up a context by id; `None` once it has exited or was never
    /// created.
    fn lookup(&self, pid: Pid) -> Option<ContextState>;
}
