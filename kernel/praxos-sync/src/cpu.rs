use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// Per-CPU interrupt-enable state with disable/enable nesting.
///
/// Critical sections frequently nest: a spinlock is taken while another is
/// already held, an interrupt path grabs a lock of its own. Each section
/// disables interrupts with [`Cpu::push_off`] and undoes that with
/// [`Cpu::pop_off`]; interrupts come back on only when the *outermost*
/// section ends, and only if they were enabled before it began.
///
/// # Model
///
/// The enable flag lives here as an [`AtomicBool`] rather than in the
/// hardware flags register. One `Cpu` value describes one physical CPU,
/// and a single context executes on it at a time; the atomics exist so the
/// hosted test harness can share a `Cpu` between threads without data
/// races, not to make concurrent `push_off`/`pop_off` on the same CPU
/// meaningful.
///
/// # Examples
///
/// ```
/// use praxos_sync::Cpu;
///
/// static CPU: Cpu = Cpu::new(true);
///
/// CPU.push_off();
/// CPU.push_off(); // nested section
/// CPU.pop_off(); // inner end: interrupts stay off
/// assert!(!CPU.interrupts_enabled());
/// CPU.pop_off(); // outer end: prior state restored
/// assert!(CPU.interrupts_enabled());
/// ```
pub struct Cpu {
    /// Software interrupt-enable flag.
    enabled: AtomicBool,
    /// Nesting depth: how many `push_off` calls await their `pop_off`.
    depth: AtomicU32,
    /// Enable state observed by the outermost `push_off`.
    was_enabled: AtomicBool,
}

impl Cpu {
    /// A CPU with the given initial interrupt-enable state and no open
    /// critical sections.
    #[must_use]
    pub const fn new(enabled: bool) -> Self {
        Self {
            enabled: AtomicBool::new(enabled),
            depth: AtomicU32::new(0),
            was_enabled: AtomicBool::new(false),
        }
    }

    /// Whether interrupts are currently enabled on this CPU.
    #[inline]
    #[must_use]
    pub fn interrupts_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Opens a critical section: disables interrupts and bumps the nesting
    /// depth.
    ///
    /// The outermost call records the enable state it found so the
    /// matching [`Cpu::pop_off`] can restore it.
    pub fn push_off(&self) {
        let prior = self.enabled.swap(false, Ordering::SeqCst);
        if self.depth.load(Ordering::SeqCst) == 0 {
            self.was_enabled.store(prior, Ordering::SeqCst);
        }
        self.depth.fetch_add(1, Ordering::SeqCst);
    }

    /// Closes the innermost critical section.
    ///
    /// When the depth returns to zero and the outermost [`Cpu::push_off`]
    /// found interrupts enabled, they are re-enabled. Two misuses are
    /// detected and logged, leaving all state untouched: calling this
    /// while interrupts are enabled, and calling it with no open section.
    /// The depth never underflows.
    pub fn pop_off(&self) {
        if self.enabled.load(Ordering::SeqCst) {
            log::error!("pop_off while interrupts are enabled");
            return;
        }
        match self
            .depth
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |d| d.checked_sub(1))
        {
            // Outermost section closed: restore what push_off found.
            Ok(1) => {
                if self.was_enabled.load(Ordering::SeqCst) {
                    self.enabled.store(true, Ordering::SeqCst);
                }
            }
            Ok(_) => {}
            Err(_) => log::error!("pop_off without a matching push_off"),
        }
    }
}
