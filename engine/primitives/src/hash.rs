// Copyright 2020-2021 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use std::{error::Error, ops::Range};

/// An information block describing a hash function.
#[derive(Debug, Eq, PartialEq, Clone)]
pub struct HashInfo {
    /// An id of the hash
    pub id: &'static str,
    /// The default digest length
    pub hash_len: usize,
    /// A range of supported digest lengths
    pub hash_lens: Range<usize>,
}

/// A hash interface
pub trait Hash {
    /// Get the information block that describes the hash
    fn info(&self) -> HashInfo;
    /// Hashes `data` and returns the digest length. `buf` receives the
    /// digest and must hold at least `info().hash_len` bytes.
    fn hash(&self, buf: &mut [u8], data: &[u8]) -> Result<usize, Box<dyn Error + 'static>>;
}

/// A hash with caller-chosen output length
pub trait VarLenHash: Hash {
    /// Hashes `data`, filling all of `buf`, and returns the digest length.
    fn var_len_hash(&self, buf: &mut [u8], data: &[u8]) -> Result<usize, Box<dyn Error + 'static>>;
}
