// Copyright 2020-2021 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use std::ops::BitXorAssign;

use zeroize::Zeroize;

/// Memory block size in bytes
pub const BLOCK_SIZE: usize = 1024;
/// Number of 64-bit words in a block
pub const QWORDS_IN_BLOCK: usize = BLOCK_SIZE / 8;

/// The fixed-size working unit of the memory array: 128 little-endian 64-bit
/// words. Blocks are copied, XORed and overwritten, never resized.
#[derive(Clone, Copy)]
pub struct Block(pub(crate) [u64; QWORDS_IN_BLOCK]);

impl Block {
    /// A block with every word set to zero.
    pub const fn zeroed() -> Self {
        Self([0u64; QWORDS_IN_BLOCK])
    }

    /// Reads the block from its 1024-byte little-endian image.
    pub fn load(&mut self, bytes: &[u8]) {
        debug_assert_eq!(bytes.len(), BLOCK_SIZE);
        for (word, chunk) in self.0.iter_mut().zip(bytes.chunks_exact(8)) {
            *word = read64_little_endian!(chunk);
        }
    }

    /// Writes the block to its 1024-byte little-endian image.
    pub fn store(&self, bytes: &mut [u8]) {
        debug_assert_eq!(bytes.len(), BLOCK_SIZE);
        for (word, chunk) in self.0.iter().zip(bytes.chunks_exact_mut(8)) {
            write64_little_endian!(*word => chunk);
        }
    }
}

impl Default for Block {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl BitXorAssign<&Block> for Block {
    fn bitxor_assign(&mut self, rhs: &Block) {
        for (word, other) in self.0.iter_mut().zip(rhs.0.iter()) {
            *word = xor!(*word, *other);
        }
    }
}

impl Zeroize for Block {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xor_of_identical_blocks_is_zero() {
        let mut block = Block::zeroed();
        for (i, word) in block.0.iter_mut().enumerate() {
            *word = (i as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15);
        }
        let other = block;

        block ^= &other;
        assert!(block.0.iter().all(|w| *w == 0));
    }

    #[test]
    fn byte_image_is_little_endian() {
        let mut block = Block::zeroed();
        block.0[0] = 0x0807_0605_0403_0201;

        let mut bytes = [0u8; BLOCK_SIZE];
        block.store(&mut bytes);
        assert_eq!(&bytes[..8], &[1, 2, 3, 4, 5, 6, 7, 8]);

        let mut reloaded = Block::zeroed();
        reloaded.load(&bytes);
        assert_eq!(reloaded.0[0], block.0[0]);
    }
}
