//! # Fixed-size kernel mutex pool
//!
//! Blocking, ownership-tracked mutexes for a cooperatively scheduled
//! kernel. A context allocates a mutex by id, locks and unlocks it by id,
//! and blocks in a per-mutex FIFO queue when another context holds it. An
//! unlock that releases the last hold hands the mutex directly to the
//! queue head: the woken context resumes already owning it.
//!
//! # Example
//! ```ignore
//! use praxos_mutex::MutexPool;
//! use praxos_sync::Cpu;
//!
//! static CPU: Cpu = Cpu::new(true);
//! let pool = MutexPool::new(&CPU, &scheduler, &contexts);
//! let id = pool.alloc()?;
//! pool.lock(id)?;
//! // critical section
//! pool.unlock(id)?;
//! pool.destroy(id)?;
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]

mod pool;

pub use pool::{MUTEX_MAX, MutexError, MutexPool};
