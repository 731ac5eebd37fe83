//! §4.A Platform primitives.
//!
//! The only raw pointers left in the crate live here (Design Notes §9):
//! every other module talks to this one in terms of byte counts and opaque
//! `*mut u8` slabs it hands back.

#[cfg(unix)]
mod unix;
#[cfg(target_os = "windows")]
mod windows;

#[cfg(not(any(unix, target_os = "windows")))]
mod fallback;

use core::sync::atomic::{AtomicU32, Ordering};

/// Returns the bit index (0 = least significant) of the lowest set bit.
/// Undefined (will not panic in release, but is nonsensical) when `word == 0`.
#[inline]
pub fn find_first_bit(word: u64) -> u32 {
    debug_assert_ne!(word, 0, "find_first_bit is undefined for 0");
    word.trailing_zeros()
}

/// Returns the bit index (0 = least significant) of the highest set bit.
/// Undefined when `word == 0`.
#[inline]
pub fn find_last_bit(word: u64) -> u32 {
    debug_assert_ne!(word, 0, "find_last_bit is undefined for 0");
    63 - word.leading_zeros()
}

/// A power-of-two page size, falling back to 4096 if the OS query fails.
pub fn page_size() -> usize {
    #[cfg(unix)]
    {
        unix::page_size()
    }
    #[cfg(target_os = "windows")]
    {
        windows::page_size()
    }
    #[cfg(not(any(unix, target_os = "windows")))]
    {
        4096
    }
}

/// Reserves at least `bytes` of page-aligned, writable memory.
///
/// Uses the platform's virtual-memory API when available; falls back to the
/// heap (padded for alignment) otherwise, per §6's "fallback mode" knob.
pub fn reserve(bytes: usize) -> *mut u8 {
    #[cfg(unix)]
    {
        unix::reserve(bytes)
    }
    #[cfg(target_os = "windows")]
    {
        windows::reserve(bytes)
    }
    #[cfg(not(any(unix, target_os = "windows")))]
    {
        fallback::reserve(bytes)
    }
}

/// Releases a region previously returned by [`reserve`]. `bytes` must match
/// the original reservation size.
///
/// # Safety
/// `ptr` must have been returned by [`reserve`] with the same `bytes`, and
/// must not be used again afterward.
pub unsafe fn release(ptr: *mut u8, bytes: usize) {
    #[cfg(unix)]
    {
        unix::release(ptr, bytes)
    }
    #[cfg(target_os = "windows")]
    {
        windows::release(ptr, bytes)
    }
    #[cfg(not(any(unix, target_os = "windows")))]
    {
        fallback::release(ptr, bytes)
    }
}

static NEXT_CORE_ID: AtomicU32 = AtomicU32::new(0);

thread_local! {
    static THIS_CORE_ID: u32 = {
        let count = core_count();
        NEXT_CORE_ID.fetch_add(1, Ordering::Relaxed) % count
    };
}

/// The calling thread's assigned core id, stable for the thread's lifetime,
/// in `0..core_count()`.
///
/// There is no portable, safe way to read true CPU affinity from stable std,
/// so threads are assigned round-robin on first use — each thread still maps
/// to exactly one core id for its lifetime, which is everything `Reserver`
/// needs (§4.D, §5).
pub fn current_core_id() -> u32 {
    THIS_CORE_ID.with(|id| *id)
}

/// Number of logical cores, at least 1.
pub fn core_count() -> u32 {
    std::thread::available_parallelism()
        .map(|n| n.get() as u32)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_scan_matches_known_values() {
        assert_eq!(find_first_bit(0b1000), 3);
        assert_eq!(find_last_bit(0b1000), 3);
        assert_eq!(find_first_bit(0b1010), 1);
        assert_eq!(find_last_bit(0b1010), 3);
        assert_eq!(find_first_bit(u64::MAX), 0);
        assert_eq!(find_last_bit(u64::MAX), 63);
    }

    #[test]
    fn page_size_is_power_of_two() {
        assert!(page_size().is_power_of_two());
        assert!(page_size() >= 4096);
    }

    #[test]
    fn reserve_and_release_roundtrip() {
        let bytes = page_size();
        let ptr = reserve(bytes);
        assert!(!ptr.is_null());
        unsafe {
            ptr.write_bytes(0xAB, bytes);
            assert_eq!(*ptr, 0xAB);
            release(ptr, bytes);
        }
    }

    #[test]
    fn core_id_is_stable_per_thread() {
        let a = current_core_id();
        let b = current_core_id();
        assert_eq!(a, b);
        assert!(a < core_count());
    }
}
