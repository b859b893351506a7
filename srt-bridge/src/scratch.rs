//! Per-call native scratch allocations
//!
//! Anything an entry point allocates for the duration of one SRT call is
//! wrapped in [`Scratch`]. Release happens on drop, so every exit path frees
//! exactly what was allocated. With the `test-util` feature a per-thread
//! counter of live scratch values lets tests check that nothing outlives its
//! call.

use std::ops::{Deref, DerefMut};

#[cfg(any(test, feature = "test-util"))]
mod accounting {
    use std::cell::Cell;

    thread_local! {
        static OUTSTANDING: Cell<usize> = const { Cell::new(0) };
    }

    pub fn acquire() {
        OUTSTANDING.with(|n| n.set(n.get() + 1));
    }

    pub fn release() {
        OUTSTANDING.with(|n| n.set(n.get().saturating_sub(1)));
    }

    pub fn outstanding() -> usize {
        OUTSTANDING.with(Cell::get)
    }
}

/// Number of scratch values alive on the current thread
#[cfg(any(test, feature = "test-util"))]
pub fn outstanding() -> usize {
    accounting::outstanding()
}

/// A native value owned by a single entry-point call
#[derive(Debug)]
pub struct Scratch<T> {
    value: T,
}

impl<T> Scratch<T> {
    pub fn new(value: T) -> Self {
        #[cfg(any(test, feature = "test-util"))]
        accounting::acquire();
        Scratch { value }
    }
}

impl<T> Deref for Scratch<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T> DerefMut for Scratch<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

impl<T> Drop for Scratch<T> {
    fn drop(&mut self) {
        #[cfg(any(test, feature = "test-util"))]
        accounting::release();
    }
}
