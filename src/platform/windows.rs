//! `VirtualAlloc`/`VirtualFree`-backed reservation, grounded on the
//! teacher's `target.'cfg(target_os = "windows")'.dependencies` use of the
//! `windows` crate for Win32 calls.

use windows::Win32::System::Memory::{
    VirtualAlloc, VirtualFree, MEM_COMMIT, MEM_RELEASE, MEM_RESERVE, PAGE_READWRITE,
};
use windows::Win32::System::SystemInformation::{GetSystemInfo, SYSTEM_INFO};

pub fn page_size() -> usize {
    unsafe {
        let mut info = SYSTEM_INFO::default();
        GetSystemInfo(&mut info);
        info.dwPageSize.max(1) as usize
    }
}

pub fn reserve(bytes: usize) -> *mut u8 {
    let bytes = bytes.max(1);
    let ptr = unsafe {
        VirtualAlloc(
            None,
            bytes,
            MEM_COMMIT | MEM_RESERVE,
            PAGE_READWRITE,
        )
    };
    // §7: platform OOM has no in-band error channel — it aborts.
    assert!(!ptr.is_null(), "VirtualAlloc failed to reserve {bytes} bytes");
    ptr as *mut u8
}

pub unsafe fn release(ptr: *mut u8, _bytes: usize) {
    let _ = VirtualFree(ptr as _, 0, MEM_RELEASE);
}
