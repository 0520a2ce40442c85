//! # Fixed-size counting-semaphore pool
//!
//! Counting semaphores for a cooperatively scheduled kernel, allocated
//! and operated by id. A wait with no units available parks the caller in
//! a per-semaphore FIFO queue; a post hands the fresh unit straight to
//! the queue head instead of leaving it up for grabs, mirroring the mutex
//! pool's hand-off discipline.
//!
//! # Example
//! ```ignore
//! use praxos_sem::SemaphorePool;
//! use praxos_sync::Cpu;
//!
//! static CPU: Cpu = Cpu::new(true);
//! let pool = SemaphorePool::new(&CPU, &scheduler, &contexts);
//! let id = pool.alloc(1)?;
//! pool.wait(id)?;
//! // guarded section
//! pool.post(id)?;
//! pool.destroy(id)?;
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]

mod pool;

pub use pool::{SEM_MAX, SemError, SemaphorePool};
