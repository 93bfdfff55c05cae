// Copyright 2020-2021 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use std::marker::PhantomData;

use zeroize::Zeroize;

use crate::{block::Block, Error, Result};

/// The owned, contiguous arena of working blocks for one hashing operation.
/// The arena is wiped before its memory is released, on every exit path.
pub(crate) struct Memory {
    blocks: Vec<Block>,
}

impl Memory {
    /// Allocates `count` zeroed blocks, reporting a typed error instead of
    /// aborting when the reservation cannot be satisfied.
    pub fn new(count: usize) -> Result<Self> {
        let mut blocks = Vec::new();
        blocks
            .try_reserve_exact(count)
            .map_err(|_| Error::AllocationFailure)?;
        blocks.resize(count, Block::zeroed());
        Ok(Self { blocks })
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn block(&self, index: u32) -> &Block {
        &self.blocks[index as usize]
    }

    pub fn block_mut(&mut self, index: u32) -> &mut Block {
        &mut self.blocks[index as usize]
    }

    /// The shared cursor handed to the lane tasks of a slice.
    pub fn view(&mut self) -> MemoryView<'_> {
        MemoryView {
            ptr: self.blocks.as_mut_ptr(),
            len: self.blocks.len(),
            _memory: PhantomData,
        }
    }

    /// Overwrites every block with zeros.
    pub fn wipe(&mut self) {
        for block in self.blocks.iter_mut() {
            block.zeroize();
        }
    }
}

impl Drop for Memory {
    fn drop(&mut self) {
        self.wipe();
    }
}

/// Cursor over the arena shared by the lane tasks of a single slice.
///
/// Within a slice, every task writes only blocks of the lane segment it owns
/// and reads only blocks finished in earlier slices or earlier in its own
/// segment, and the orchestrator joins all tasks before the next slice
/// starts. No block is ever read and written concurrently under that
/// discipline, which is what makes the aliasing below sound. All accessors
/// panic on out-of-bounds indices.
#[derive(Clone, Copy)]
pub(crate) struct MemoryView<'a> {
    ptr: *mut Block,
    len: usize,
    _memory: PhantomData<&'a mut [Block]>,
}

unsafe impl Send for MemoryView<'_> {}
unsafe impl Sync for MemoryView<'_> {}

impl MemoryView<'_> {
    pub fn block(&self, index: u32) -> &Block {
        assert!((index as usize) < self.len);
        unsafe { &*self.ptr.add(index as usize) }
    }

    /// The caller must be the task owning the lane `index` belongs to.
    #[allow(clippy::mut_from_ref)]
    pub fn block_mut(&self, index: u32) -> &mut Block {
        assert!((index as usize) < self.len);
        unsafe { &mut *self.ptr.add(index as usize) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wipe_clears_every_block() {
        let mut memory = Memory::new(4).unwrap();
        for index in 0..4 {
            memory.block_mut(index).0.fill(0x5a5a_5a5a_5a5a_5a5a);
        }

        memory.wipe();
        for index in 0..4 {
            assert!(memory.block(index).0.iter().all(|w| *w == 0));
        }
    }

    #[test]
    fn view_reads_and_writes_the_arena() {
        let mut memory = Memory::new(2).unwrap();
        let view = memory.view();
        view.block_mut(1).0[17] = 99;
        assert_eq!(view.block(1).0[17], 99);
        drop(view);
        assert_eq!(memory.block(1).0[17], 99);
    }
}
