//! # Fixed-capacity FIFO ring buffer
//!
//! Allocation-free queue used throughout the kernel for free-ID pools and
//! per-resource wait queues. Capacity is a compile-time constant; a full
//! queue rejects the pushed value instead of growing.

#![cfg_attr(not(any(test, doctest)), no_std)]

/// Bounded first-in/first-out queue over an inline ring of `N` slots.
///
/// # Examples
///
/// ```
/// use praxos_fifo::Fifo;
///
/// let mut q: Fifo<u32, 4> = Fifo::new();
/// q.push(7).unwrap();
/// q.push(8).unwrap();
/// assert_eq!(q.pop(), Some(7));
/// assert_eq!(q.pop(), Some(8));
/// assert_eq!(q.pop(), None);
/// ```
pub struct Fifo<T, const N: usize> {
    slots: [Option<T>; N],
    /// Index of the oldest element, when `len > 0`.
    head: usize,
    len: usize,
}

impl<T, const N: usize> Fifo<T, N> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: [const { None }; N],
            head: 0,
            len: 0,
        }
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        N
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.len == N
    }

    /// Appends `value` at the tail.
    ///
    /// # Errors
    ///
    /// Hands the value back when the queue is full.
    pub fn push(&mut self, value: T) -> Result<(), T> {
        if self.len == N {
            return Err(value);
        }
        let tail = (self.head + self.len) % N;
        self.slots[tail] = Some(value);
        self.len += 1;
        Ok(())
    }

    /// Removes and returns the oldest element, or `None` when empty.
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        let value = self.slots[self.head].take();
        self.head = (self.head + 1) % N;
        self.len -= 1;
        value
    }

    /// Drops all queued elements.
    pub fn clear(&mut self) {
        while self.pop().is_some() {}
    }

    /// Iterates from the oldest to the newest element.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        (0..self.len).filter_map(move |i| self.slots[(self.head + i) % N].as_ref())
    }
}

impl<T, const N: usize> Default for Fifo<T, N> {
    fn default() -> Self {
        Self::new()
    }
}
