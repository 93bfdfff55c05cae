// Copyright 2020-2021 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! A general purpose API for the engine's cryptographic capabilities.
//!
//! Each capability is described by an info data structure carrying the
//! constraints of the algorithm and at least one trait. Implementations live
//! in the sibling crates; consumers program against the traits so a
//! capability can be swapped without touching call sites.

/// Hash functions, fixed and variable length
pub mod hash;
/// Password-based key derivation
pub mod pbkdf;
