// Copyright 2020-2021 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Memory-hard password hashing for the engine.
//!
//! This crate implements the Argon2 key derivation function: a password, a
//! salt and a set of cost parameters are stretched into a derived key by
//! filling a large block array in multiple interdependent passes, so that an
//! attacker cannot shortcut the computation without paying for the configured
//! memory. All three addressing variants are provided for both wire versions
//! 0x10 and 0x13: [`Variant::Argon2d`] (data-dependent), [`Variant::Argon2i`]
//! (data-independent) and [`Variant::Argon2id`] (hybrid). Multi-lane fills
//! run on worker threads that synchronize at slice boundaries.
//!
//! The BLAKE2b primitive underneath is consumed from the `blake2` crate; the
//! layers above it are implemented here and checked against the published
//! reference vectors.

use thiserror::Error as DeriveError;

#[macro_use]
mod internal;

mod argon2;
mod blake2long;
mod block;
mod context;
mod core;
mod memory;

pub use crate::{
    argon2::{hash, hash_into, initialize_into, memory_size, Argon2},
    blake2long::{Blake2bLong, SHORT_DIGEST_LENGTH},
    block::{BLOCK_SIZE, QWORDS_IN_BLOCK},
    context::{
        validate, Context, Variant, Version, MAX_LANES, MIN_OUTPUT_LENGTH, MIN_SALT_LENGTH,
        SYNC_POINTS,
    },
};
pub use primitives;

/// Failures surfaced by the engine. Parameter-shape errors are raised by the
/// validator before any memory is reserved; the engine itself never logs and
/// never aborts the process.
#[derive(DeriveError, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid output length")]
    InvalidOutputLength,
    #[error("Invalid memory cost")]
    InvalidMemoryCost,
    #[error("Invalid time cost")]
    InvalidTimeCost,
    #[error("Invalid degree of parallelism")]
    InvalidParallelism,
    #[error("Invalid password length")]
    InvalidPasswordLength,
    #[error("Invalid salt length")]
    InvalidSaltLength,
    #[error("Invalid secret length")]
    InvalidSecretLength,
    #[error("Invalid associated data length")]
    InvalidAssociatedDataLength,
    #[error("Unknown variant or version tag")]
    InvalidVariant,
    #[error("Memory allocation failed")]
    AllocationFailure,
    #[error("Hash primitive failure: `{0}`")]
    PrimitiveFailure(String),
}

pub type Result<T> = std::result::Result<T, Error>;
