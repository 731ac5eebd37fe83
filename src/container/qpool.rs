//! §4.E `QPool<T>`: a lazy-construct, LIFO object pool with page-sized blocks.
//!
//! Grounded on `original_source/Include/Qentem/QPool.hpp`. Unlike [`super::array::Array`]
//! and [`super::deque::Deque`], the original bypasses the `Reserver`/`MemoryBlock`
//! arena entirely and reserves whole pages straight from the system allocator
//! ("Memory allocation bypasses libc via `SystemMemory::Reserve`") — this port
//! preserves that by calling [`crate::platform::reserve`]/[`crate::platform::release`]
//! directly rather than going through a `Reserver` handle.

use crate::platform;
use core::mem::MaybeUninit;
use core::ptr;

#[repr(C)]
struct Item<T> {
    storage: MaybeUninit<T>,
    next: *mut Item<T>,
}

#[repr(C)]
struct PoolHeader {
    next: *mut PoolHeader,
}

#[inline]
fn round_up(n: usize, to: usize) -> usize {
    (n + to - 1) / to * to
}

/// Lazily-constructed LIFO object pool. The pool retains ownership of every
/// object it has ever constructed; `Recycle` returns storage to the free list
/// without running `T`'s destructor, and destructors only run when the pool
/// itself resets or drops (§4.E).
pub struct QPool<T> {
    list: *mut Item<T>,
    storage: *mut PoolHeader,
    in_use: usize,
    constructed: usize,
    item_size: usize,
    header_size: usize,
    storage_size: usize,
    reserve_size: usize,
}

// SAFETY: QPool owns all its storage exclusively; it is Send/Sync exactly
// when T is, matching the original's plain-value-pool contract.
unsafe impl<T: Send> Send for QPool<T> {}
unsafe impl<T: Sync> Sync for QPool<T> {}

impl<T> QPool<T> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Preallocates `count` storage blocks up front (§4.E `QPool(count)`).
    pub fn with_capacity(count: usize) -> Self {
        let item_size = round_up(core::mem::size_of::<Item<T>>(), core::mem::align_of::<Item<T>>());
        let header_size = round_up(core::mem::size_of::<PoolHeader>(), core::mem::align_of::<Item<T>>());
        let page = platform::page_size();
        let payload = page.saturating_sub(header_size);
        let storage_size = (payload / item_size).max(1);
        let mut reserve_size = header_size + item_size * storage_size;
        if reserve_size < page {
            reserve_size = page;
        } else {
            reserve_size = round_up(reserve_size, page);
        }

        let mut pool = Self {
            list: ptr::null_mut(),
            storage: ptr::null_mut(),
            in_use: 0,
            constructed: 0,
            item_size,
            header_size,
            storage_size,
            reserve_size,
        };
        if count != 0 {
            pool.expand(count);
        }
        pool
    }

    fn expand(&mut self, mut count: usize) {
        while count != 0 {
            let raw = platform::reserve(self.reserve_size);
            let block = raw as *mut PoolHeader;
            unsafe {
                (*block).next = self.storage;
            }
            self.storage = block;

            let items_base = unsafe { (raw as *mut u8).add(self.header_size) } as *mut u8;
            let mut index = self.storage_size;
            while index != 0 {
                index -= 1;
                let item = unsafe { items_base.add(index * self.item_size) } as *mut Item<T>;
                unsafe {
                    (*item).next = self.list;
                }
                self.list = item;
            }
            count -= 1;
        }
    }

    /// Retrieves an object, constructing it with `T::default()` the first
    /// time this slot is used.
    pub fn get(&mut self) -> &mut T
    where
        T: Default,
    {
        self.get_with(T::default)
    }

    /// Retrieves an object, constructing it via `make` the first time this
    /// slot is used. `make` is never called again for a recycled slot.
    pub fn get_with(&mut self, make: impl FnOnce() -> T) -> &mut T {
        if self.list.is_null() {
            self.expand(1);
        }
        let item = self.list;
        unsafe {
            self.list = (*item).next;
        }
        self.in_use += 1;
        if self.in_use > self.constructed {
            unsafe {
                (*item).storage.write(make());
            }
            self.constructed += 1;
        }
        unsafe { (*item).storage.assume_init_mut() }
    }

    /// Returns an object to the pool without destroying it (§4.E).
    ///
    /// # Safety
    /// `item` must have been returned by [`Self::get`]/[`Self::get_with`] on
    /// this same pool and not already recycled.
    pub unsafe fn recycle(&mut self, item: *mut T) {
        let item = item as *mut Item<T>;
        (*item).next = self.list;
        self.list = item;
        self.in_use -= 1;
    }

    pub fn in_use_count(&self) -> usize {
        self.in_use
    }

    pub fn constructed_count(&self) -> usize {
        self.constructed
    }

    /// Preallocates `count` additional storage blocks.
    pub fn expand_by(&mut self, count: usize) {
        self.expand(count);
    }

    /// Destroys every constructed object and releases all storage, returning
    /// the pool to its initial empty state.
    pub fn reset(&mut self) {
        self.destruct();
        self.list = ptr::null_mut();
        self.in_use = 0;
    }

    fn destruct(&mut self) {
        let mut remaining = self.constructed % self.storage_size;
        let mut block = self.storage;
        while !block.is_null() {
            let next_block = unsafe { (*block).next };
            let items_base = unsafe { (block as *mut u8).add(self.header_size) };

            let mut index = 0;
            while index < remaining {
                let item = unsafe { items_base.add(index * self.item_size) } as *mut Item<T>;
                unsafe {
                    ptr::drop_in_place((*item).storage.as_mut_ptr());
                }
                index += 1;
            }
            self.constructed -= remaining;
            remaining = self.storage_size;

            unsafe { platform::release(block as *mut u8, self.reserve_size) };
            block = next_block;
        }
        self.storage = ptr::null_mut();
    }
}

impl<T> Default for QPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for QPool<T> {
    fn drop(&mut self) {
        self.destruct();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_constructs_once_recycle_reuses_storage() {
        let mut pool: QPool<i32> = QPool::new();
        let a = pool.get_with(|| 7);
        *a = 42;
        let a_ptr = a as *mut i32;
        unsafe { pool.recycle(a_ptr) };
        assert_eq!(pool.constructed_count(), 1);
        assert_eq!(pool.in_use_count(), 0);

        let b = pool.get_with(|| 7);
        // Recycled slot retains its last value — construction did not rerun.
        assert_eq!(*b, 42);
        assert_eq!(pool.constructed_count(), 1);
        assert_eq!(pool.in_use_count(), 1);
    }

    #[test]
    fn in_use_tracks_get_and_recycle() {
        let mut pool: QPool<u64> = QPool::new();
        let mut handles = Vec::new();
        for i in 0..50u64 {
            handles.push(pool.get_with(move || i) as *mut u64);
        }
        assert_eq!(pool.in_use_count(), 50);
        for h in handles {
            unsafe { pool.recycle(h) };
        }
        assert_eq!(pool.in_use_count(), 0);
        assert_eq!(pool.constructed_count(), 50);
    }

    #[test]
    fn drop_runs_destructors_for_every_constructed_slot() {
        use std::rc::Rc;
        let counter = Rc::new(());
        {
            let mut pool: QPool<Rc<()>> = QPool::new();
            for _ in 0..20 {
                let c = counter.clone();
                pool.get_with(move || c);
            }
            assert_eq!(Rc::strong_count(&counter), 21);
        }
        assert_eq!(Rc::strong_count(&counter), 1);
    }

    #[test]
    fn reset_destroys_and_returns_to_empty() {
        let mut pool: QPool<i32> = QPool::new();
        pool.get_with(|| 1);
        pool.get_with(|| 2);
        pool.reset();
        assert_eq!(pool.constructed_count(), 0);
        assert_eq!(pool.in_use_count(), 0);
    }
}
