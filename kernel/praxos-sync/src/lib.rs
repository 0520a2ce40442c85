//! # Interrupt-safe kernel synchronization
//!
//! A spinlock that pairs mutual exclusion with the interrupt-disable
//! discipline: acquiring disables interrupts on the owning CPU before the
//! first spin, releasing restores them once the last nested critical
//! section ends. Interrupt state is modeled by [`Cpu`] so the same code
//! runs under a hosted test harness and on the metal, where the embedding
//! kernel mirrors [`Cpu`] transitions into the hardware flag.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod cpu;
mod spin_lock;

pub use cpu::Cpu;
pub use spin_lock::{SpinLock, SpinLockGuard};
