// Copyright 2020-2021 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use std::error;

use primitives::pbkdf::{MemoryHardPbkdf, Pbkdf, PbkdfInfo};

use crate::{
    block::BLOCK_SIZE,
    context::{validate, Context, Variant, Version, MAX_LANES, MIN_OUTPUT_LENGTH},
    core::{prefill_into, Instance, Layout},
    Error, Result,
};

/// Derives a key of `context.output_length` bytes.
///
/// Runs the full pipeline: validation, initialization, the memory fill and
/// finalization. The working memory is private to the call and wiped before
/// the function returns, on success and on failure.
pub fn hash(context: &Context<'_>) -> Result<Vec<u8>> {
    validate(context)?;
    let mut out = vec![0u8; context.output_length as usize];
    hash_into(context, &mut out)?;
    Ok(out)
}

/// Like [`hash`], but writes the derived key into a caller-provided buffer
/// whose length must equal the requested output length.
pub fn hash_into(context: &Context<'_>, out: &mut [u8]) -> Result<()> {
    validate(context)?;
    if out.len() != context.output_length as usize {
        return Err(Error::InvalidOutputLength);
    }

    let mut instance = Instance::new(context)?;
    instance.fill_memory_blocks();
    instance.finalize(out)
}

/// Initialization entry point for accelerator offload: writes the pre-fill
/// state (zeroed arena, first two blocks of every lane) into `buffer` instead
/// of internally managed memory, byte-identical to what [`hash`] starts from,
/// so an external backend can run the fill. `buffer` must hold exactly
/// [`memory_size`] bytes.
pub fn initialize_into(context: &Context<'_>, buffer: &mut [u8]) -> Result<()> {
    validate(context)?;
    prefill_into(context, buffer)
}

/// Number of bytes of working memory the fill for `context` operates on;
/// the buffer size [`initialize_into`] expects.
pub fn memory_size(context: &Context<'_>) -> Result<usize> {
    validate(context)?;
    Ok(Layout::new(context).memory_blocks as usize * BLOCK_SIZE)
}

/// The engine as a memory-hard PBKDF with the reference cost defaults, for
/// consumers that program against the capability traits.
#[derive(Debug, Clone, Copy)]
pub struct Argon2 {
    pub variant: Variant,
    pub version: Version,
}

impl Argon2 {
    pub const fn new(variant: Variant) -> Self {
        Self {
            variant,
            version: Version::latest(),
        }
    }
}

impl Default for Argon2 {
    fn default() -> Self {
        Self::new(Variant::Argon2id)
    }
}

fn cost_context<'a>(
    pbkdf: &Argon2,
    password: &'a [u8],
    salt: &'a [u8],
    output_length: usize,
    cpu_cost: u64,
) -> Result<Context<'a>> {
    if output_length > u32::MAX as usize {
        return Err(Error::InvalidOutputLength);
    }

    let mut context = Context::new(password, salt);
    context.variant = pbkdf.variant;
    context.version = pbkdf.version;
    context.output_length = output_length as u32;
    context.time_cost = cpu_cost.min(u32::MAX as u64) as u32;
    Ok(context)
}

impl Pbkdf for Argon2 {
    fn info(&self) -> PbkdfInfo {
        PbkdfInfo {
            id: "argon2",
            output_lens: MIN_OUTPUT_LENGTH as u64..u32::MAX as u64,
            password_lens: 0..u32::MAX as u64,
            salt_lens: 8..u32::MAX as u64,
            cpu_cost: 3,
            cpu_costs: 1..u32::MAX as u64,
            memory_cost: 4096,
            memory_costs: 8..u32::MAX as u64,
            parallelism: 1,
            parallelisms: 1..MAX_LANES as u64 + 1,
        }
    }

    fn derive(
        &self,
        buf: &mut [u8],
        password: &[u8],
        salt: &[u8],
        cpu_cost: u64,
    ) -> std::result::Result<(), Box<dyn error::Error + 'static>> {
        let context = cost_context(self, password, salt, buf.len(), cpu_cost)?;
        hash_into(&context, buf)?;
        Ok(())
    }
}

impl MemoryHardPbkdf for Argon2 {
    fn derive_memory_hard(
        &self,
        buf: &mut [u8],
        password: &[u8],
        salt: &[u8],
        cpu_cost: u64,
        memory_cost: u64,
        parallelism: u64,
    ) -> std::result::Result<(), Box<dyn error::Error + 'static>> {
        let mut context = cost_context(self, password, salt, buf.len(), cpu_cost)?;
        context.memory_cost = memory_cost.min(u32::MAX as u64) as u32;
        context.lanes = parallelism.min(u32::MAX as u64) as u32;
        context.threads = context.lanes;
        hash_into(&context, buf)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trait_and_direct_derivations_agree() {
        let mut context = Context::argon2id(b"trait password", b"trait salt");
        context.memory_cost = 64;
        context.time_cost = 2;
        context.lanes = 2;
        context.threads = 2;
        let direct = hash(&context).unwrap();

        let mut via_trait = [0u8; 32];
        Argon2::default()
            .derive_memory_hard(&mut via_trait, b"trait password", b"trait salt", 2, 64, 2)
            .unwrap();
        assert_eq!(direct, via_trait);
    }

    #[test]
    fn derive_uses_the_default_costs() {
        let mut context = Context::argon2id(b"pw", b"defaults-salt");
        context.memory_cost = Argon2::default().info().memory_cost as u32;
        context.time_cost = 2;
        let direct = hash(&context).unwrap();

        let mut via_trait = [0u8; 32];
        Argon2::default()
            .derive(&mut via_trait, b"pw", b"defaults-salt", 2)
            .unwrap();
        assert_eq!(direct, via_trait);
    }
}
