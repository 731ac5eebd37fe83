//! §4.E `Deque<T>`: a power-of-two ring buffer with the pop-count
//! absolute-indexing bias.
//!
//! Grounded on `original_source/Include/Qentem/Deque.hpp`; its doc comment
//! states the contract preserved here verbatim in spirit: `absolute =
//! current_size + pop_count` recorded at insert time, `logical = absolute -
//! pop_count` recovered at read time, `pop_count` incremented only by
//! `pop_front` and reset only when the backing storage is replaced.

use crate::mem::Reserver;
use core::ptr;

pub struct Deque<'r, T, const ALIGNMENT: usize, const BLOCK_SIZE: usize> {
    reserver: &'r Reserver<ALIGNMENT, BLOCK_SIZE>,
    ptr: *mut T,
    cap: usize,
    head: usize,
    size: usize,
    pop_count: usize,
}

impl<'r, T, const ALIGNMENT: usize, const BLOCK_SIZE: usize> Deque<'r, T, ALIGNMENT, BLOCK_SIZE> {
    pub fn new(reserver: &'r Reserver<ALIGNMENT, BLOCK_SIZE>) -> Self {
        Self {
            reserver,
            ptr: core::ptr::NonNull::dangling().as_ptr(),
            cap: 0,
            head: 0,
            size: 0,
            pop_count: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn capacity(&self) -> usize {
        self.cap
    }

    /// Number of front-pops since the last storage refresh (grow, `Clear`,
    /// `Reset`). Monotonic in between.
    pub fn pop_count(&self) -> usize {
        self.pop_count
    }

    /// The absolute sequence number to record for the element about to be
    /// pushed at the back, per the contract above. Call before `push_back`.
    pub fn next_absolute(&self) -> usize {
        self.size + self.pop_count
    }

    /// Recovers the logical index for a previously recorded absolute
    /// sequence number, against the *current* `pop_count`.
    pub fn logical_of(&self, absolute: usize) -> usize {
        absolute - self.pop_count
    }

    #[inline]
    fn mask(&self) -> usize {
        self.cap - 1
    }

    fn grow(&mut self) {
        let new_cap = if self.cap == 0 { 1 } else { self.cap * 2 };
        let new_ptr = self.reserver.reserve_typed::<T>(new_cap);
        if self.size > 0 {
            let mask = self.mask();
            let first_len = (self.cap - self.head).min(self.size);
            unsafe {
                ptr::copy_nonoverlapping(self.ptr.add(self.head), new_ptr, first_len);
                let remaining = self.size - first_len;
                if remaining > 0 {
                    ptr::copy_nonoverlapping(self.ptr, new_ptr.add(first_len), remaining);
                }
            }
            let _ = mask;
        }
        if self.cap > 0 {
            self.reserver.release_typed(self.ptr, self.cap);
        }
        self.ptr = new_ptr;
        self.cap = new_cap;
        self.head = 0;
        self.pop_count = 0;
    }

    pub fn push_back(&mut self, value: T) {
        if self.size == self.cap {
            self.grow();
        }
        let idx = (self.head + self.size) & self.mask();
        unsafe { self.ptr.add(idx).write(value) };
        self.size += 1;
    }

    pub fn pop_front(&mut self) -> Option<T> {
        if self.size == 0 {
            return None;
        }
        let value = unsafe { self.ptr.add(self.head).read() };
        self.head = (self.head + 1) & self.mask();
        self.size -= 1;
        self.pop_count += 1;
        Some(value)
    }

    /// Does **not** affect `pop_count` — only front-pops do (§4.E).
    pub fn pop_back(&mut self) -> Option<T> {
        if self.size == 0 {
            return None;
        }
        self.size -= 1;
        let idx = (self.head + self.size) & self.mask();
        Some(unsafe { self.ptr.add(idx).read() })
    }

    pub fn get(&self, i: usize) -> Option<&T> {
        if i >= self.size {
            return None;
        }
        let idx = (self.head + i) & self.mask();
        Some(unsafe { &*self.ptr.add(idx) })
    }

    pub fn first(&self) -> Option<&T> {
        self.get(0)
    }

    pub fn last(&self) -> Option<&T> {
        if self.size == 0 {
            None
        } else {
            self.get(self.size - 1)
        }
    }

    /// Rebuilds storage to exactly `len()` (rounded to a power of two),
    /// eliminating wrap-around. `pop_count` resets, as with any storage
    /// refresh.
    pub fn compress(&mut self) {
        if self.size == 0 {
            return;
        }
        let new_cap = self.size.next_power_of_two();
        if new_cap == self.cap && self.head == 0 {
            return;
        }
        let new_ptr = self.reserver.reserve_typed::<T>(new_cap);
        let mask = self.mask();
        let first_len = (self.cap - self.head).min(self.size);
        unsafe {
            ptr::copy_nonoverlapping(self.ptr.add(self.head), new_ptr, first_len);
            let remaining = self.size - first_len;
            if remaining > 0 {
                ptr::copy_nonoverlapping(self.ptr, new_ptr.add(first_len), remaining);
            }
        }
        let _ = mask;
        self.reserver.release_typed(self.ptr, self.cap);
        self.ptr = new_ptr;
        self.cap = new_cap;
        self.head = 0;
        self.pop_count = 0;
    }
}

impl<'r, T, const ALIGNMENT: usize, const BLOCK_SIZE: usize> Drop
    for Deque<'r, T, ALIGNMENT, BLOCK_SIZE>
{
    fn drop(&mut self) {
        if self.cap == 0 {
            return;
        }
        while self.pop_front().is_some() {}
        self.reserver.release_typed(self.ptr, self.cap);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestReserver = Reserver<16, { 64 * 1024 }>;
    type TestDeque<'r, T> = Deque<'r, T, 16, { 64 * 1024 }>;

    #[test]
    fn capacity_is_always_power_of_two() {
        let r = TestReserver::new();
        let mut d: TestDeque<i32> = Deque::new(&r);
        for i in 0..37 {
            d.push_back(i);
        }
        assert!(d.capacity().is_power_of_two());
        assert_eq!(d.len(), 37);
    }

    #[test]
    fn pop_front_increments_pop_count_pop_back_does_not() {
        let r = TestReserver::new();
        let mut d: TestDeque<i32> = Deque::new(&r);
        for i in 0..4 {
            d.push_back(i);
        }
        d.pop_back();
        assert_eq!(d.pop_count(), 0);
        d.pop_front();
        assert_eq!(d.pop_count(), 1);
    }

    #[test]
    fn absolute_index_survives_front_pops() {
        let r = TestReserver::new();
        let mut d: TestDeque<&'static str> = Deque::new(&r);
        let abs_a = d.next_absolute();
        d.push_back("a");
        let abs_b = d.next_absolute();
        d.push_back("b");
        d.pop_front(); // "a" is gone, pop_count == 1
        assert_eq!(d.get(d.logical_of(abs_b)), Some(&"b"));
        let _ = abs_a;
    }

    #[test]
    fn compress_then_get_zero_equals_first() {
        let r = TestReserver::new();
        let mut d: TestDeque<i32> = Deque::new(&r);
        for i in 0..10 {
            d.push_back(i);
        }
        for _ in 0..3 {
            d.pop_front();
        }
        d.compress();
        assert_eq!(d.get(0), d.first());
        assert_eq!(d.get(0), Some(&3));
    }

    #[test]
    fn random_push_pop_sequence_matches_a_plain_vecdeque() {
        use rand::Rng;
        use std::collections::VecDeque;

        let r = TestReserver::new();
        let mut d: TestDeque<i32> = Deque::new(&r);
        let mut model: VecDeque<i32> = VecDeque::new();
        let mut rng = rand::thread_rng();
        let mut next_value = 0;

        for _ in 0..2000 {
            match rng.gen_range(0..3) {
                0 => {
                    d.push_back(next_value);
                    model.push_back(next_value);
                    next_value += 1;
                }
                1 => assert_eq!(d.pop_front(), model.pop_front()),
                _ => assert_eq!(d.pop_back(), model.pop_back()),
            }
            assert_eq!(d.len(), model.len());
        }

        for i in 0..model.len() {
            assert_eq!(d.get(i), model.get(i));
        }
    }
}
