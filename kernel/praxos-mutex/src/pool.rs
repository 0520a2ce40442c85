use core::array;
use praxos_fifo::Fifo;
use praxos_sync::{Cpu, SpinLock};
use praxos_task::{CONTEXT_MAX, ContextDirectory, Pid, Scheduler};

/// Default number of mutex slots in a pool.
pub const MUTEX_MAX: usize = 16;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum MutexError {
    #[error("mutex id out of range")]
    InvalidId,
    #[error("mutex is not allocated")]
    NotAllocated,
    #[error("no free mutex")]
    Exhausted,
    #[error("mutex is busy")]
    Busy,
    #[error("caller does not hold the mutex")]
    PermissionDenied,
    #[error("no current context")]
    NoContext,
}

struct MutexSlot {
    allocated: bool,
    /// Recursion depth of the owner; `> 0` exactly when `owner` is set.
    holds: u32,
    owner: Option<Pid>,
    waiters: Fifo<Pid, CONTEXT_MAX>,
}

impl MutexSlot {
    const fn new() -> Self {
        Self {
            allocated: false,
            holds: 0,
            owner: None,
            waiters: Fifo::new(),
        }
    }
}

/// Fixed pool of kernel mutexes addressed by id.
///
/// Each mutex is ownership-tracked and recursion-counted: the owning
/// context may lock again (every unlock undoes one hold), any other
/// context joins a FIFO wait queue and sleeps. The pool uses two layers of
/// spinlocks, one around the free-ID queue and one per slot, and never
/// holds both at once; blocking paths drop the slot lock before yielding
/// to the scheduler.
pub struct MutexPool<'k, S: Scheduler, D: ContextDirectory, const CAP: usize = MUTEX_MAX> {
    free: SpinLock<'k, Fifo<usize, CAP>>,
    slots: [SpinLock<'k, MutexSlot>; CAP],
    sched: &'k S,
    contexts: &'k D,
}

impl<'k, S: Scheduler, D: ContextDirectory> MutexPool<'k, S, D, MUTEX_MAX> {
    /// A pool of [`MUTEX_MAX`] slots, every id available.
    pub fn new(cpu: &'k Cpu, sched: &'k S, contexts: &'k D) -> Self {
        Self::with_capacity(cpu, sched, contexts)
    }
}

impl<'k, S: Scheduler, D: ContextDirectory, const CAP: usize> MutexPool<'k, S, D, CAP> {
    /// A pool with every slot free and every id available.
    pub fn with_capacity(cpu: &'k Cpu, sched: &'k S, contexts: &'k D) -> Self {
        log::info!("initializing mutex pool ({CAP} slots)");
        let mut ids = Fifo::new();
        for id in 0..CAP {
            // a CAP-slot queue always has room for CAP ids
            let _ = ids.push(id);
        }
        Self {
            free: SpinLock::new(cpu, ids),
            slots: array::from_fn(|_| SpinLock::new(cpu, MutexSlot::new())),
            sched,
            contexts,
        }
    }

    /// Draws a free mutex id, resetting the slot to unheld, unowned, and
    /// queue-empty.
    ///
    /// # Errors
    ///
    /// [`MutexError::Exhausted`] when every slot is allocated.
    pub fn alloc(&self) -> Result<usize, MutexError> {
        let Some(id) = self.free.with_lock(|ids| ids.pop()) else {
            log::error!("mutex pool exhausted");
            return Err(MutexError::Exhausted);
        };
        let mut slot = self.slots[id].lock();
        slot.allocated = true;
        slot.holds = 0;
        slot.owner = None;
        slot.waiters.clear();
        Ok(id)
    }

    /// Returns an idle mutex to the free pool.
    ///
    /// # Errors
    ///
    /// [`MutexError::InvalidId`] out of range; [`MutexError::Busy`] when
    /// the slot is unallocated or still held.
    pub fn destroy(&self, id: usize) -> Result<(), MutexError> {
        let slot_lock = self.slot(id)?;
        {
            let mut slot = slot_lock.lock();
            if !slot.allocated || slot.holds > 0 {
                return Err(MutexError::Busy);
            }
            slot.allocated = false;
        }
        // Slot lock is dropped before the free queue is touched.
        self.free.with_lock(|ids| {
            if ids.push(id).is_err() {
                log::error!("mutex {id}: free queue overflow on destroy");
            }
        });
        Ok(())
    }

    /// Acquires mutex `id` for the current context, blocking while another
    /// context holds it. Returns the hold count after acquisition: 1 for a
    /// fresh or handed-off acquisition, higher for recursive ones.
    ///
    /// # Errors
    ///
    /// [`MutexError::InvalidId`], [`MutexError::NotAllocated`], or
    /// [`MutexError::NoContext`] when called outside any context.
    pub fn lock(&self, id: usize) -> Result<u32, MutexError> {
        let slot_lock = self.slot(id)?;
        let Some(pid) = self.contexts.current() else {
            log::error!("mutex {id}: lock outside any context");
            return Err(MutexError::NoContext);
        };

        let mut slot = slot_lock.lock();
        if !slot.allocated {
            return Err(MutexError::NotAllocated);
        }
        if slot.holds > 0 && slot.owner != Some(pid) {
            // Contended: queue up and sleep. The unlock path hands the
            // mutex over before waking us, so resumption means ownership;
            // re-attempting the acquisition here would double-count it.
            log::info!("mutex {id}: blocking context {pid}");
            if slot.waiters.push(pid).is_err() {
                log::error!("mutex {id}: wait queue full");
                return Err(MutexError::Exhausted);
            }
            drop(slot);
            self.sched.remove(pid);
            self.sched.run();

            let slot = slot_lock.lock();
            debug_assert_eq!(slot.owner, Some(pid));
            return Ok(slot.holds);
        }

        slot.owner = Some(pid);
        slot.holds += 1;
        Ok(slot.holds)
    }

    /// Releases one hold on mutex `id`. Dropping the last hold either
    /// leaves the mutex idle or hands it to the first live waiter; the
    /// returned count reflects the slot afterwards, so a hand-off reports
    /// 1 and a plain release 0.
    ///
    /// # Errors
    ///
    /// [`MutexError::PermissionDenied`] for an unheld mutex or a caller
    /// that is not the owner, with the slot left untouched; otherwise as
    /// [`MutexPool::lock`].
    pub fn unlock(&self, id: usize) -> Result<u32, MutexError> {
        let slot_lock = self.slot(id)?;
        let Some(pid) = self.contexts.current() else {
            log::error!("mutex {id}: unlock outside any context");
            return Err(MutexError::NoContext);
        };

        let mut slot = slot_lock.lock();
        if !slot.allocated {
            return Err(MutexError::NotAllocated);
        }
        if slot.holds == 0 || slot.owner != Some(pid) {
            log::error!("mutex {id}: invalid unlock by context {pid}");
            return Err(MutexError::PermissionDenied);
        }

        slot.holds -= 1;
        if slot.holds > 0 {
            return Ok(slot.holds);
        }

        slot.owner = None;
        log::debug!("mutex {id}: released by context {pid}");
        // Hand off inside the critical section: the mutex moves straight
        // to the next live waiter and is never observably free meanwhile.
        while let Some(next) = slot.waiters.pop() {
            if self.contexts.lookup(next).is_none() {
                log::warn!("mutex {id}: discarding exited waiter {next}");
                continue;
            }
            slot.owner = Some(next);
            slot.holds = 1;
            self.sched.add(next);
            log::info!("mutex {id}: handed off to context {next}");
            break;
        }
        Ok(slot.holds)
    }

    /// Context currently holding `id`, if any.
    ///
    /// # Errors
    ///
    /// [`MutexError::InvalidId`] or [`MutexError::NotAllocated`].
    pub fn owner(&self, id: usize) -> Result<Option<Pid>, MutexError> {
        let slot = self.slot(id)?.lock();
        if !slot.allocated {
            return Err(MutexError::NotAllocated);
        }
        Ok(slot.owner)
    }

    /// Hold count of `id`; zero while unheld.
    ///
    /// # Errors
    ///
    /// [`MutexError::InvalidId`] or [`MutexError::NotAllocated`].
    pub fn holds(&self, id: usize) -> Result<u32, MutexError> {
        let slot = self.slot(id)?.lock();
        if !slot.allocated {
            return Err(MutexError::NotAllocated);
        }
        Ok(slot.holds)
    }

    fn slot(&self, id: usize) -> Result<&SpinLock<'k, MutexSlot>, MutexError> {
        self.slots.get(id).ok_or(MutexError::InvalidId)
    }
}
