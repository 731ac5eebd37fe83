//! Heap-backed reservation for targets with no virtual-memory API, per §6's
//! "fallback mode" knob: allocate from the heap, padded so the returned
//! pointer is page-aligned.

use core::alloc::Layout;

fn layout_for(bytes: usize) -> Layout {
    let align = super::page_size();
    Layout::from_size_align(bytes.max(1), align).expect("reservation layout overflow")
}

pub fn reserve(bytes: usize) -> *mut u8 {
    let ptr = unsafe { std::alloc::alloc_zeroed(layout_for(bytes)) };
    assert!(!ptr.is_null(), "heap fallback failed to reserve {bytes} bytes");
    ptr
}

pub unsafe fn release(ptr: *mut u8, bytes: usize) {
    std::alloc::dealloc(ptr, layout_for(bytes));
}
