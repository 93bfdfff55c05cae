// Copyright 2020-2021 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use crate::{Error, Result};

/// Number of synchronization points (slices) per lane and pass
pub const SYNC_POINTS: u32 = 4;
/// Smallest derivable key in bytes
pub const MIN_OUTPUT_LENGTH: u32 = 4;
/// Smallest accepted salt in bytes
pub const MIN_SALT_LENGTH: usize = 8;
/// Smallest accepted time cost
pub const MIN_TIME_COST: u32 = 1;
/// Largest accepted degree of parallelism
pub const MAX_LANES: u32 = 0xFF_FFFF;
/// Memory floor per lane in KiB: two blocks for every slice
pub const MIN_MEMORY_PER_LANE: u32 = 2 * SYNC_POINTS;
/// Longest accepted byte input (password, salt, secret, associated data)
pub const MAX_INPUT_LENGTH: usize = u32::MAX as usize;

/// The three addressing variants. They trade resistance against side-channel
/// attacks (data-independent addressing) against resistance to time-memory
/// trade-off attacks (data-dependent addressing); the hybrid starts
/// data-independent and switches once enough memory has been written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Argon2d = 0,
    Argon2i = 1,
    Argon2id = 2,
}

impl Variant {
    /// The wire tag fed into the pre-hash and the address generator.
    pub(crate) fn tag(self) -> u32 {
        self as u32
    }

    /// Lowercase identifier as used in encoded credential strings.
    pub fn name(self) -> &'static str {
        match self {
            Variant::Argon2d => "argon2d",
            Variant::Argon2i => "argon2i",
            Variant::Argon2id => "argon2id",
        }
    }
}

impl TryFrom<u32> for Variant {
    type Error = Error;

    fn try_from(tag: u32) -> Result<Self> {
        match tag {
            0 => Ok(Variant::Argon2d),
            1 => Ok(Variant::Argon2i),
            2 => Ok(Variant::Argon2id),
            _ => Err(Error::InvalidVariant),
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Wire versions. Version 0x13 folds refilled blocks into their previous
/// contents; the earlier 0x10 overwrites them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Version {
    V0x10 = 0x10,
    V0x13 = 0x13,
}

impl Version {
    pub const fn latest() -> Self {
        Version::V0x13
    }

    pub(crate) fn tag(self) -> u32 {
        self as u32
    }
}

impl TryFrom<u32> for Version {
    type Error = Error;

    fn try_from(tag: u32) -> Result<Self> {
        match tag {
            0x10 => Ok(Version::V0x10),
            0x13 => Ok(Version::V0x13),
            _ => Err(Error::InvalidVariant),
        }
    }
}

/// Caller-supplied inputs of one hashing operation. The engine only ever
/// reads them; all working state lives in the private instance.
#[derive(Debug, Clone)]
pub struct Context<'a> {
    pub password: &'a [u8],
    pub salt: &'a [u8],
    pub secret: &'a [u8],
    pub associated_data: &'a [u8],
    /// Number of passes over the whole memory array
    pub time_cost: u32,
    /// Requested memory in KiB; rounded down to whole segments internally
    pub memory_cost: u32,
    /// Number of independently fillable lanes
    pub lanes: u32,
    /// Upper bound on worker threads; clamped to `lanes` at dispatch
    pub threads: u32,
    /// Derived key length in bytes
    pub output_length: u32,
    pub variant: Variant,
    pub version: Version,
}

impl<'a> Context<'a> {
    /// A context with the reference cost defaults: three passes over 4 MiB in
    /// a single lane, a 32-byte tag, hybrid addressing, current version.
    pub fn new(password: &'a [u8], salt: &'a [u8]) -> Self {
        Self {
            password,
            salt,
            secret: &[],
            associated_data: &[],
            time_cost: 3,
            memory_cost: 4096,
            lanes: 1,
            threads: 1,
            output_length: 32,
            variant: Variant::Argon2id,
            version: Version::latest(),
        }
    }

    /// Default context with data-dependent addressing.
    pub fn argon2d(password: &'a [u8], salt: &'a [u8]) -> Self {
        Self {
            variant: Variant::Argon2d,
            ..Self::new(password, salt)
        }
    }

    /// Default context with data-independent addressing.
    pub fn argon2i(password: &'a [u8], salt: &'a [u8]) -> Self {
        Self {
            variant: Variant::Argon2i,
            ..Self::new(password, salt)
        }
    }

    /// Default context with hybrid addressing.
    pub fn argon2id(password: &'a [u8], salt: &'a [u8]) -> Self {
        Self {
            variant: Variant::Argon2id,
            ..Self::new(password, salt)
        }
    }

    /// Allows as many workers as the machine offers; the fill still clamps to
    /// one worker per lane.
    pub fn with_auto_threads(mut self) -> Self {
        self.threads = num_cpus::get() as u32;
        self
    }
}

/// Checks every cost and length parameter against its documented range. This
/// is the sole gate in front of the allocator: it never allocates or mutates,
/// and it must pass before any memory is reserved.
pub fn validate(context: &Context<'_>) -> Result<()> {
    if context.output_length < MIN_OUTPUT_LENGTH {
        return Err(Error::InvalidOutputLength);
    }
    if context.time_cost < MIN_TIME_COST {
        return Err(Error::InvalidTimeCost);
    }
    if context.lanes < 1 || context.lanes > MAX_LANES {
        return Err(Error::InvalidParallelism);
    }
    if context.threads < 1 || context.threads > MAX_LANES {
        return Err(Error::InvalidParallelism);
    }
    if context.memory_cost < MIN_MEMORY_PER_LANE * context.lanes {
        return Err(Error::InvalidMemoryCost);
    }
    if context.password.len() > MAX_INPUT_LENGTH {
        return Err(Error::InvalidPasswordLength);
    }
    if context.salt.len() < MIN_SALT_LENGTH || context.salt.len() > MAX_INPUT_LENGTH {
        return Err(Error::InvalidSaltLength);
    }
    if context.secret.len() > MAX_INPUT_LENGTH {
        return Err(Error::InvalidSecretLength);
    }
    if context.associated_data.len() > MAX_INPUT_LENGTH {
        return Err(Error::InvalidAssociatedDataLength);
    }
    Ok(())
}
