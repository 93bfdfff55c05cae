// Copyright 2020-2021 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Memory-hygiene support for the engine.
//!
//! Key derivation leaves password-derived material behind in every buffer it
//! touches. The [`ZeroingAlloc`] wrapper makes sure that whatever the standard
//! allocator hands out is overwritten with zeros again before it is returned,
//! so freed working memory never carries secrets.

use core::alloc::{GlobalAlloc, Layout};

/// A zeroing allocator which wraps another memory allocator. Every allocation
/// is zeroed out before it is handed back to the inner allocator.
pub struct ZeroingAlloc<T: GlobalAlloc>(pub T);

unsafe impl<T> GlobalAlloc for ZeroingAlloc<T>
where
    T: GlobalAlloc,
{
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        self.0.alloc(layout)
    }

    /// Zero the memory before deallocation. Under `cfg(test)` the inner
    /// deallocation is skipped so tests can observe the wiped bytes through a
    /// still-valid pointer.
    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        zero(ptr, layout.size());
        #[cfg(not(test))]
        self.0.dealloc(ptr, layout);
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        self.0.alloc_zeroed(layout)
    }
}

/// Zeroes out `size` bytes at `ptr` with volatile writes, then fences so the
/// stores cannot be elided.
unsafe fn zero(ptr: *mut u8, size: usize) {
    for i in 0..size {
        core::ptr::write_volatile(ptr.add(i), 0);
    }
    core::sync::atomic::compiler_fence(core::sync::atomic::Ordering::SeqCst);
}

#[cfg(test)]
mod tests {
    use super::*;

    extern crate std;

    #[global_allocator]
    static ALLOC: ZeroingAlloc<std::alloc::System> = ZeroingAlloc(std::alloc::System);

    #[test]
    fn freed_key_material_is_zeroed() {
        use std::vec::Vec;

        let mut tag = Vec::with_capacity(2);
        tag.push(0xde);
        tag.push(0xad);

        let ptr1: *const u8 = &tag[0];

        tag.push(0xbe);
        tag.push(0xef);

        let ptr2: *const u8 = &tag[0];

        assert_eq!(&[0xde, 0xad, 0xbe, 0xef], &tag[..]);

        // the grow reallocated; the old backing store must already be wiped
        assert_eq!(unsafe { ptr1.as_ref() }, Some(&0));
        drop(tag);
        assert_eq!(unsafe { ptr2.as_ref() }, Some(&0));
    }

    #[test]
    fn shrink_wipes_the_old_allocation() {
        use std::vec::Vec;

        let mut buf: Vec<u8> = (1..=64).collect();
        let ptr: *const u8 = &buf[0];
        buf.truncate(1);
        buf.shrink_to_fit();
        assert_eq!(unsafe { ptr.as_ref() }, Some(&0));
    }
}
