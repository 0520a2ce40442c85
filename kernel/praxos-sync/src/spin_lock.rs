use crate::Cpu;
use core::{
    cell::UnsafeCell,
    hint::spin_loop,
    ops::{Deref, DerefMut},
    sync::atomic::{AtomicBool, Ordering},
};

/// Spinlock that holds interrupts off for the duration of the hold.
///
/// Acquisition calls [`Cpu::push_off`] *before* the first test-and-set, so
/// an interrupt handler on the same CPU can never preempt a holder and
/// deadlock against it; the guard's drop releases the lock and then pops
/// the interrupt level. The lock itself is anonymous mutual exclusion: no
/// owner is recorded, and waiting is an unbounded busy spin, so a holder
/// that never releases spins every other acquirer forever.
///
/// # Examples
///
/// ```
/// use praxos_sync::{Cpu, SpinLock};
///
/// static CPU: Cpu = Cpu::new(true);
/// static TICKS: SpinLock<'static, u64> = SpinLock::new(&CPU, 0);
///
/// *TICKS.lock() += 1;
/// assert_eq!(*TICKS.lock(), 1);
/// assert!(CPU.interrupts_enabled());
/// ```
pub struct SpinLock<'c, T> {
    cpu: &'c Cpu,
    /// lock state
    /// * `false`: unlocked
    /// * `true`: locked
    locked: AtomicBool,
    inner: UnsafeCell<T>,
}

// Safety: mutual exclusion; only T: Send may cross threads.
unsafe impl<T: Send> Sync for SpinLock<'_, T> {}

impl<'c, T> SpinLock<'c, T> {
    pub const fn new(cpu: &'c Cpu, inner: T) -> Self {
        Self {
            cpu,
            locked: AtomicBool::new(false),
            inner: UnsafeCell::new(inner),
        }
    }

    /// Try once; returns immediately, restoring the interrupt level on
    /// failure.
    #[inline]
    pub fn try_lock(&self) -> Option<SpinLockGuard<'_, T>> {
        self.cpu.push_off();
        if self
            .locked
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
        {
            Some(SpinLockGuard { lock: self })
        } else {
            self.cpu.pop_off();
            None
        }
    }

    /// Disables interrupts, then spins until acquired.
    #[inline]
    pub fn lock(&self) -> SpinLockGuard<'_, T> {
        self.cpu.push_off();
        // Exchange until we are the caller that installed `true`; spin on
        // plain reads between attempts.
        while self.locked.swap(true, Ordering::Acquire) {
            while self.locked.load(Ordering::Relaxed) {
                spin_loop();
            }
        }
        SpinLockGuard { lock: self }
    }

    /// Closure convenience, built on the guard.
    #[inline]
    pub fn with_lock<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut g = self.lock();
        f(&mut g)
    }

    /// Mutable access when you have `&mut self` (no contention possible).
    #[inline]
    pub const fn get_mut(&mut self) -> &mut T {
        self.inner.get_mut()
    }
}

pub struct SpinLockGuard<'a, T> {
    lock: &'a SpinLock<'a, T>,
}

impl<T> Deref for SpinLockGuard<'_, T> {
    type Target = T;
    fn deref(&self) -> &T {
        unsafe { &*self.lock.inner.get() }
    }
}

impl<T> DerefMut for SpinLockGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        unsafe { &mut *self.lock.inner.get() }
    }
}

impl<T> Drop for SpinLockGuard<'_, T> {
    fn drop(&mut self) {
        // Release publishes the critical section, then the interrupt level
        // unwinds one step.
        self.lock.locked.store(false, Ordering::Release);
        self.lock.cpu.pop_off();
    }
}
