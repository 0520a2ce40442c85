use core::array;
use praxos_fifo::Fifo;
use praxos_sync::{Cpu, SpinLock};
use praxos_task::{CONTEXT_MAX, ContextDirectory, Pid, Scheduler};

/// Default number of semaphore slots in a pool.
pub const SEM_MAX: usize = 16;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum SemError {
    #[error("semaphore id out of range")]
    InvalidId,
    #[error("semaphore is not allocated")]
    NotAllocated,
    #[error("no free semaphore")]
    Exhausted,
    #[error("semaphore is busy")]
    Busy,
    #[error("no current context")]
    NoContext,
}

struct SemSlot {
    allocated: bool,
    /// Available units. Never observed negative: a post with waiters
    /// transfers its unit inside one critical section.
    count: u32,
    waiters: Fifo<Pid, CONTEXT_MAX>,
}

impl SemSlot {
    const fn new() -> Self {
        Self {
            allocated: false,
            count: 0,
            waiters: Fifo::new(),
        }
    }
}

/// Fixed pool of counting semaphores addressed by id.
///
/// Locking is per slot plus one lock around the free-ID queue, and the
/// two are never held together. A blocking wait drops its slot lock
/// before yielding to the scheduler.
pub struct SemaphorePool<'k, S: Scheduler, D: ContextDirectory, const CAP: usize = SEM_MAX> {
    free: SpinLock<'k, Fifo<usize, CAP>>,
    slots: [SpinLock<'k, SemSlot>; CAP],
    sched: &'k S,
    contexts: &'k D,
}

impl<'k, S: Scheduler, D: ContextDirectory> SemaphorePool<'k, S, D, SEM_MAX> {
    /// A pool of [`SEM_MAX`] slots, every id available.
    pub fn new(cpu: &'k Cpu, sched: &'k S, contexts: &'k D) -> Self {
        Self::with_capacity(cpu, sched, contexts)
    }
}

impl<'k, S: Scheduler, D: ContextDirectory, const CAP: usize> SemaphorePool<'k, S, D, CAP> {
    /// A pool with every slot free and every id available.
    pub fn with_capacity(cpu: &'k Cpu, sched: &'k S, contexts: &'k D) -> Self {
        log::info!("initializing semaphore pool ({CAP} slots)");
        let mut ids = Fifo::new();
        for id in 0..CAP {
            // a CAP-slot queue always has room for CAP ids
            let _ = ids.push(id);
        }
        Self {
            free: SpinLock::new(cpu, ids),
            slots: array::from_fn(|_| SpinLock::new(cpu, SemSlot::new())),
            sched,
            contexts,
        }
    }

    /// Draws a free semaphore id and primes its counter with `initial`
    /// units.
    ///
    /// # Errors
    ///
    /// [`SemError::Exhausted`] when every slot is allocated.
    pub fn alloc(&self, initial: u32) -> Result<usize, SemError> {
        let Some(id) = self.free.with_lock(|ids| ids.pop()) else {
            log::error!("semaphore pool exhausted");
            return Err(SemError::Exhausted);
        };
        let mut slot = self.slots[id].lock();
        slot.allocated = true;
        slot.count = initial;
        slot.waiters.clear();
        Ok(id)
    }

    /// Returns a semaphore to the free pool, forcing its count back to
    /// zero.
    ///
    /// # Errors
    ///
    /// [`SemError::InvalidId`] out of range; [`SemError::Busy`] when the
    /// slot is unallocated or contexts are still waiting on it.
    pub fn destroy(&self, id: usize) -> Result<(), SemError> {
        let slot_lock = self.slot(id)?;
        {
            let mut slot = slot_lock.lock();
            if !slot.allocated || !slot.waiters.is_empty() {
                return Err(SemError::Busy);
            }
            slot.allocated = false;
            slot.count = 0;
        }
        // Slot lock is dropped before the free queue is touched.
        self.free.with_lock(|ids| {
            if ids.push(id).is_err() {
                log::error!("semaphore {id}: free queue overflow on destroy");
            }
        });
        Ok(())
    }

    /// Takes one unit from semaphore `id`, blocking while none are
    /// available. Returns the count as of completion.
    ///
    /// A positive count is consumed without looking at the caller's
    /// identity, so interrupt-path code may wait as long as units remain.
    ///
    /// # Errors
    ///
    /// [`SemError::InvalidId`], [`SemError::NotAllocated`], or
    /// [`SemError::NoContext`] when blocking would be required outside
    /// any context.
    pub fn wait(&self, id: usize) -> Result<u32, SemError> {
        let slot_lock = self.slot(id)?;
        let mut slot = slot_lock.lock();
        if !slot.allocated {
            return Err(SemError::NotAllocated);
        }
        if slot.count > 0 {
            slot.count -= 1;
            return Ok(slot.count);
        }

        let Some(pid) = self.contexts.current() else {
            log::error!("semaphore {id}: wait would block outside any context");
            return Err(SemError::NoContext);
        };
        log::info!("semaphore {id}: blocking context {pid}");
        if slot.waiters.push(pid).is_err() {
            log::error!("semaphore {id}: wait queue full");
            return Err(SemError::Exhausted);
        }
        drop(slot);
        self.sched.remove(pid);
        self.sched.run();

        // The post that woke us spent one unit on our behalf; report the
        // count as of resumption.
        let slot = slot_lock.lock();
        Ok(slot.count)
    }

    /// Adds one unit to semaphore `id` and returns the resulting count.
    ///
    /// With a live waiter queued, the unit is handed straight over: the
    /// head is woken, the count nets out unchanged, and the woken context
    /// resumes with its unit already consumed. Posting never needs a
    /// current context.
    ///
    /// # Errors
    ///
    /// [`SemError::InvalidId`] or [`SemError::NotAllocated`].
    pub fn post(&self, id: usize) -> Result<u32, SemError> {
        let slot_lock = self.slot(id)?;
        let mut slot = slot_lock.lock();
        if !slot.allocated {
            return Err(SemError::NotAllocated);
        }
        slot.count += 1;
        // Hand off inside the critical section: the posted unit goes to
        // the first waiter that still exists, never into open contention.
        while let Some(next) = slot.waiters.pop() {
            if self.contexts.lookup(next).is_none() {
                log::warn!("semaphore {id}: discarding exited waiter {next}");
                continue;
            }
            slot.count -= 1;
            self.sched.add(next);
            log::info!("semaphore {id}: handed a unit to context {next}");
            break;
        }
        Ok(slot.count)
    }

    /// Units currently available on `id`.
    ///
    /// # Errors
    ///
    /// [`SemError::InvalidId`] or [`SemError::NotAllocated`].
    pub fn count(&self, id: usize) -> Result<u32, SemError> {
        let slot = self.slot(id)?.lock();
        if !slot.allocated {
            return Err(SemError::NotAllocated);
        }
        Ok(slot.count)
    }

    fn slot(&self, id: usize) -> Result<&SpinLock<'k, SemSlot>, SemError> {
        self.slots.get(id).ok_or(SemError::InvalidId)
    }
}
