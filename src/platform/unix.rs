//! `mmap`/`munmap`-backed reservation, grounded on the teacher's
//! `target.'cfg(unix)'.dependencies` use of `libc` for raw system calls.

use core::ffi::c_void;

pub fn page_size() -> usize {
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if size > 0 {
        size as usize
    } else {
        4096
    }
}

pub fn reserve(bytes: usize) -> *mut u8 {
    let bytes = bytes.max(1);
    let ptr = unsafe {
        libc::mmap(
            core::ptr::null_mut(),
            bytes,
            libc::PROT_READ | libc::PROT_WRITE,
            libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
            -1,
            0,
        )
    };
    // §7: platform OOM has no in-band error channel — it aborts.
    assert_ne!(ptr, libc::MAP_FAILED, "mmap failed to reserve {bytes} bytes");
    ptr as *mut u8
}

pub unsafe fn release(ptr: *mut u8, bytes: usize) {
    libc::munmap(ptr as *mut c_void, bytes.max(1));
}
