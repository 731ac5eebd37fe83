//! §4.D `Reserver` façade and §5 concurrency discipline.
//!
//! Design Notes §9 asks for the original's "global array indexed by core id
//! with a thread-local cache" to become an explicit, owned handle instead.
//! `Reserver` is that handle: a value the caller constructs once (typically
//! held in a `static` behind `once_cell`/`lazy_static` at the application
//! level, or threaded through explicitly) holding one arena per logical
//! core. Each thread resolves "its" arena through [`platform::current_core_id`]
//! — no process-wide mutable array, no unsafe global.
//!
//! Per §5, a `ReserverCore` is meant to be exclusive to one pinned thread;
//! this crate's synthetic core-id assignment (round-robin, not true affinity)
//! cannot guarantee that exclusivity, so each arena is behind a
//! `parking_lot::Mutex` — cheap when uncontended, and it turns the
//! documented "owning thread must be quiescent" requirement into an actual
//! safety guarantee instead of a caller obligation.

use super::core::ReserverCore;
use core::mem::{align_of, size_of};
use parking_lot::Mutex;

#[inline]
fn round_up(n: usize, to: usize) -> usize {
    (n + to - 1) / to * to
}

pub struct Reserver<const ALIGNMENT: usize, const BLOCK_SIZE: usize> {
    cores: Vec<Mutex<ReserverCore<ALIGNMENT, BLOCK_SIZE>>>,
}

impl<const ALIGNMENT: usize, const BLOCK_SIZE: usize> Reserver<ALIGNMENT, BLOCK_SIZE> {
    pub fn new() -> Self {
        let n = (crate::platform::core_count() as usize).max(1);
        Self {
            cores: (0..n).map(|_| Mutex::new(ReserverCore::new())).collect(),
        }
    }

    fn home_core(&self) -> usize {
        crate::platform::current_core_id() as usize % self.cores.len()
    }

    /// Reserves at least `size` bytes aligned to `custom_alignment`.
    pub fn reserve(&self, size: usize, custom_alignment: usize) -> *mut u8 {
        let size = round_up(size, ALIGNMENT);
        let id = self.home_core();
        self.cores[id].lock().reserve(size, custom_alignment)
    }

    /// Releases `ptr..ptr+size`. Tries the calling thread's own arena first;
    /// on a miss (the pointer migrated from another core), scans siblings —
    /// the one cross-core path §5 allows. Single-core builds skip the scan
    /// entirely since there is nowhere else to look.
    pub fn release(&self, ptr: *mut u8, size: usize) -> bool {
        let size = round_up(size, ALIGNMENT);
        let home = self.home_core();
        if self.cores[home].lock().release(ptr, size) {
            return true;
        }
        if self.cores.len() > 1 {
            log::warn!("release: pointer not found on home core, scanning sibling arenas");
            for (i, core) in self.cores.iter().enumerate() {
                if i == home {
                    continue;
                }
                if core.lock().release(ptr, size) {
                    return true;
                }
            }
        }
        false
    }

    pub fn shrink(&self, ptr: *mut u8, from: usize, to: usize) -> bool {
        let from = round_up(from, ALIGNMENT);
        let to = round_up(to, ALIGNMENT);
        let home = self.home_core();
        if self.cores[home].lock().shrink(ptr, from, to) {
            return true;
        }
        if self.cores.len() > 1 {
            log::warn!("shrink: pointer not found on home core, scanning sibling arenas");
            for (i, core) in self.cores.iter().enumerate() {
                if i == home {
                    continue;
                }
                if core.lock().shrink(ptr, from, to) {
                    return true;
                }
            }
        }
        false
    }

    /// `try_expand` never relocates (§8 invariant 5): success leaves `ptr`
    /// valid and just extends the live range.
    ///
    /// `ReserverCore::try_expand` returns `to_r` on success, `from_r` on an
    /// in-place refusal (the pointer was found but there's no room), and `0`
    /// only when the pointer isn't owned by that core at all — `from_r` is
    /// not generally zero, so refusal and success must be told apart by
    /// comparing against `to_r`/`from_r`, not against `0`.
    pub fn try_expand(&self, ptr: *mut u8, from: usize, to: usize) -> usize {
        let from_r = round_up(from, ALIGNMENT);
        let to_r = round_up(to, ALIGNMENT);
        let home = self.home_core();
        let result = self.cores[home].lock().try_expand(ptr, from_r, to_r);
        if result == to_r {
            return to;
        }
        if result == from_r {
            return from;
        }
        if self.cores.len() > 1 {
            log::warn!("try_expand: pointer not found on home core, scanning sibling arenas");
            for (i, core) in self.cores.iter().enumerate() {
                if i == home {
                    continue;
                }
                let result = core.lock().try_expand(ptr, from_r, to_r);
                if result == to_r {
                    return to;
                }
                if result == from_r {
                    return from;
                }
            }
        }
        from
    }

    pub fn reset(&self) {
        for core in &self.cores {
            core.lock().reset();
        }
    }

    pub fn core_count(&self) -> usize {
        self.cores.len()
    }

    // -- typed convenience wrappers used by the containers --

    pub fn reserve_typed<T>(&self, count: usize) -> *mut T {
        self.reserve(count * size_of::<T>(), align_of::<T>()) as *mut T
    }

    pub fn release_typed<T>(&self, ptr: *mut T, count: usize) -> bool {
        self.release(ptr as *mut u8, count * size_of::<T>())
    }

    pub fn shrink_typed<T>(&self, ptr: *mut T, from: usize, to: usize) -> bool {
        self.shrink(ptr as *mut u8, from * size_of::<T>(), to * size_of::<T>())
    }

    pub fn try_expand_typed<T>(&self, ptr: *mut T, from: usize, to: usize) -> usize {
        let bytes = self.try_expand(ptr as *mut u8, from * size_of::<T>(), to * size_of::<T>());
        bytes / size_of::<T>()
    }
}

impl<const ALIGNMENT: usize, const BLOCK_SIZE: usize> Default for Reserver<ALIGNMENT, BLOCK_SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type R = Reserver<16, { 64 * 1024 }>;

    #[test]
    fn typed_round_trip() {
        let r = R::new();
        let ptr = r.reserve_typed::<u64>(8);
        assert!(!ptr.is_null());
        unsafe {
            for i in 0..8 {
                ptr.add(i).write(i as u64);
            }
            for i in 0..8 {
                assert_eq!(ptr.add(i).read(), i as u64);
            }
        }
        assert!(r.release_typed(ptr, 8));
    }

    #[test]
    fn try_expand_is_stable_under_single_core() {
        let r = R::new();
        let ptr = r.reserve_typed::<u8>(256);
        let grown = r.try_expand_typed(ptr, 256, 512);
        assert_eq!(grown, 512);
        assert!(r.shrink_typed(ptr, 512, 256));
        assert!(r.release_typed(ptr, 256));
    }
}
