//! §4.E `Array<T>`: a contiguous growable array backed by a [`Reserver`].
//!
//! Grounded on `original_source/Include/Qentem/Array.hpp`'s growth policy
//! (try-expand-in-place before reserve-and-move) and, for the general shape
//! of "a container borrowing an arena handle instead of touching a global
//! allocator", the teacher's explicit-state idiom in `engine/mem/mod.rs`
//! (no ambient global — state is an owned/borrowed value threaded through).

use crate::mem::Reserver;
use core::ops::{Deref, DerefMut};
use core::ptr;

/// `EXPANSION` is the compile-time growth multiplier (Design Notes §9:
/// distinct growth factors must be distinct types).
pub struct Array<'r, T, const ALIGNMENT: usize, const BLOCK_SIZE: usize, const EXPANSION: usize = 2>
{
    reserver: &'r Reserver<ALIGNMENT, BLOCK_SIZE>,
    ptr: *mut T,
    len: usize,
    cap: usize,
}

impl<'r, T, const ALIGNMENT: usize, const BLOCK_SIZE: usize, const EXPANSION: usize>
    Array<'r, T, ALIGNMENT, BLOCK_SIZE, EXPANSION>
{
    pub fn new(reserver: &'r Reserver<ALIGNMENT, BLOCK_SIZE>) -> Self {
        Self {
            reserver,
            ptr: core::ptr::NonNull::dangling().as_ptr(),
            len: 0,
            cap: 0,
        }
    }

    pub fn with_capacity(reserver: &'r Reserver<ALIGNMENT, BLOCK_SIZE>, capacity: usize) -> Self {
        let mut array = Self::new(reserver);
        if capacity > 0 {
            array.ptr = reserver.reserve_typed::<T>(capacity);
            array.cap = capacity;
        }
        array
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.cap
    }

    fn grow(&mut self) {
        let new_cap = (self.cap.max(1)) * EXPANSION;
        if self.cap > 0 {
            let expanded = self.reserver.try_expand_typed(self.ptr, self.cap, new_cap);
            if expanded == new_cap {
                self.cap = new_cap;
                return;
            }
        }
        let new_ptr = self.reserver.reserve_typed::<T>(new_cap);
        if self.len > 0 {
            unsafe { ptr::copy_nonoverlapping(self.ptr, new_ptr, self.len) };
        }
        if self.cap > 0 {
            self.reserver.release_typed(self.ptr, self.cap);
        }
        self.ptr = new_ptr;
        self.cap = new_cap;
    }

    pub fn push(&mut self, value: T) {
        if self.len == self.cap {
            self.grow();
        }
        unsafe { self.ptr.add(self.len).write(value) };
        self.len += 1;
    }

    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        Some(unsafe { self.ptr.add(self.len).read() })
    }

    /// Shrinks the backing allocation down to exactly `len()` elements,
    /// in place — no reallocation, no move (§4.E).
    pub fn compress(&mut self) {
        if self.cap > self.len {
            self.reserver.shrink_typed(self.ptr, self.cap, self.len.max(0));
            self.cap = self.len;
        }
    }

    pub fn as_slice(&self) -> &[T] {
        if self.cap == 0 {
            &[]
        } else {
            unsafe { core::slice::from_raw_parts(self.ptr, self.len) }
        }
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        if self.cap == 0 {
            &mut []
        } else {
            unsafe { core::slice::from_raw_parts_mut(self.ptr, self.len) }
        }
    }
}

impl<'r, T, const ALIGNMENT: usize, const BLOCK_SIZE: usize, const EXPANSION: usize> Deref
    for Array<'r, T, ALIGNMENT, BLOCK_SIZE, EXPANSION>
{
    type Target = [T];
    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl<'r, T, const ALIGNMENT: usize, const BLOCK_SIZE: usize, const EXPANSION: usize> DerefMut
    for Array<'r, T, ALIGNMENT, BLOCK_SIZE, EXPANSION>
{
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.as_mut_slice()
    }
}

impl<'r, T, const ALIGNMENT: usize, const BLOCK_SIZE: usize, const EXPANSION: usize> Drop
    for Array<'r, T, ALIGNMENT, BLOCK_SIZE, EXPANSION>
{
    fn drop(&mut self) {
        if self.cap == 0 {
            return;
        }
        unsafe { ptr::drop_in_place(self.as_mut_slice()) };
        self.reserver.release_typed(self.ptr, self.cap);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestReserver = Reserver<16, { 64 * 1024 }>;
    type TestArray<'r, T> = Array<'r, T, 16, { 64 * 1024 }>;

    #[test]
    fn push_and_read_back() {
        let r = TestReserver::new();
        let mut a: TestArray<i32> = Array::new(&r);
        for i in 0..1000 {
            a.push(i);
        }
        assert_eq!(a.len(), 1000);
        assert_eq!(a[0], 0);
        assert_eq!(a[999], 999);
    }

    #[test]
    fn pop_runs_destructors() {
        use std::rc::Rc;
        let r = TestReserver::new();
        let counter = Rc::new(());
        let mut a: TestArray<Rc<()>> = Array::new(&r);
        for _ in 0..8 {
            a.push(counter.clone());
        }
        assert_eq!(Rc::strong_count(&counter), 9);
        while a.pop().is_some() {}
        assert_eq!(Rc::strong_count(&counter), 1);
    }

    #[test]
    fn compress_shrinks_without_losing_data() {
        let r = TestReserver::new();
        let mut a: TestArray<u8> = Array::with_capacity(&r, 64);
        for i in 0..4 {
            a.push(i);
        }
        a.compress();
        assert_eq!(a.capacity(), 4);
        assert_eq!(&a[..], &[0, 1, 2, 3]);
    }
}
