// Copyright 2020-2021 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use std::{error::Error, ops::Range};

/// An information block describing a password-based key derivation function.
#[derive(Debug, Eq, PartialEq, Clone)]
pub struct PbkdfInfo {
    /// The id of the PBKDF
    pub id: &'static str,
    /// A range of the supported output lengths
    pub output_lens: Range<u64>,
    /// A range of the supported password lengths
    pub password_lens: Range<u64>,
    /// A range of the supported salt lengths
    pub salt_lens: Range<u64>,
    /// The default CPU cost
    pub cpu_cost: u64,
    /// A range of the supported CPU costs
    pub cpu_costs: Range<u64>,
    /// The default memory cost, 0 if the PBKDF is not memory hard
    pub memory_cost: u64,
    /// A range of the supported memory costs
    pub memory_costs: Range<u64>,
    /// The default parallelism, 0 if the PBKDF cannot use threads
    pub parallelism: u64,
    /// A range of the supported parallelism degrees
    pub parallelisms: Range<u64>,
}

/// A password-based key derivation function
pub trait Pbkdf {
    /// Returns the info block of the PBKDF
    fn info(&self) -> PbkdfInfo;
    /// Fills `buf` with bytes derived from the password, parameterized by the
    /// CPU cost; the remaining costs take their defaults.
    fn derive(
        &self,
        buf: &mut [u8],
        password: &[u8],
        salt: &[u8],
        cpu_cost: u64,
    ) -> Result<(), Box<dyn Error + 'static>>;
}

/// A memory-hard PBKDF
pub trait MemoryHardPbkdf: Pbkdf {
    /// Fills `buf` with bytes derived from the password, parameterized by the
    /// CPU cost, the memory cost in KiB and the degree of parallelism.
    fn derive_memory_hard(
        &self,
        buf: &mut [u8],
        password: &[u8],
        salt: &[u8],
        cpu_cost: u64,
        memory_cost: u64,
        parallelism: u64,
    ) -> Result<(), Box<dyn Error + 'static>>;
}
