// Copyright 2020-2021 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! A system for stretching passwords into keys an attacker has to buy memory
//! to guess.
//!
//! This top-level crate contains references to the others that make up the
//! low-level crates known as the "Redoubt Engine".
//!
//! # Layout
//!
//! This framework is divided into the following crates:
//!
//! - `kdf`: the memory-hard password-hashing engine (Argon2)
//! - `primitives`: capability traits the engine implements
//! - `runtime`: memory-hygiene support, notably the zeroing allocator
//!
//! ## WARNING
//!
//! This library has not yet been audited for security, so use at your own
//! peril. Until a formal third-party security audit has taken place, no
//! guarantees are made to the fitness of this library for any purposes.

use runtime::ZeroingAlloc;

pub use kdf;
pub use primitives;
pub use runtime;

/// A zeroing allocator which wraps the standard memory allocator. This
/// allocator zeroes out memory when it is dropped. Works on any application
/// that imports the engine.
#[global_allocator]
static ALLOC: ZeroingAlloc<std::alloc::System> = ZeroingAlloc(std::alloc::System);
