// Copyright 2020-2021 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! The variable-length hash H' used for seeding the memory array and for
//! stretching the final accumulator into the tag. Digests up to 64 bytes are
//! a single BLAKE2b call; longer outputs chain 64-byte digests, emitting 32
//! bytes per link, exactly as the reference construction prescribes. The
//! underlying primitive is consumed as a black box from the `blake2` crate.

use std::error;

use blake2::{
    digest::{Digest, Update, VariableOutput},
    Blake2b512, Blake2bVar,
};
use primitives::hash::{Hash, HashInfo, VarLenHash};

use crate::{Error, Result};

/// Digest length of the underlying primitive in bytes
pub const SHORT_DIGEST_LENGTH: usize = 64;

const HALF_DIGEST_LENGTH: usize = SHORT_DIGEST_LENGTH / 2;

/// BLAKE2b with the reference length-extension on top.
pub struct Blake2bLong;

impl Blake2bLong {
    /// Plain 64-byte digest over the concatenation of `inputs`.
    pub fn digest(inputs: &[&[u8]]) -> [u8; SHORT_DIGEST_LENGTH] {
        let mut state = Blake2b512::new();
        for input in inputs {
            Digest::update(&mut state, input);
        }
        state.finalize().into()
    }

    /// Fills all of `out` with the H' expansion of `inputs`. The output
    /// length itself is bound into the digest as a 4-byte prefix.
    pub fn digest_into(inputs: &[&[u8]], out: &mut [u8]) -> Result<()> {
        let length_prefix = (out.len() as u32).to_le_bytes();

        if out.len() <= SHORT_DIGEST_LENGTH {
            let mut state = Blake2bVar::new(out.len()).map_err(primitive_failure)?;
            state.update(&length_prefix);
            for input in inputs {
                state.update(input);
            }
            return state.finalize_variable(out).map_err(primitive_failure);
        }

        let mut state = Blake2b512::new();
        Digest::update(&mut state, length_prefix);
        for input in inputs {
            Digest::update(&mut state, input);
        }
        let mut chain = state.finalize();

        out[..HALF_DIGEST_LENGTH].copy_from_slice(&chain[..HALF_DIGEST_LENGTH]);
        let mut written = HALF_DIGEST_LENGTH;
        while out.len() - written > SHORT_DIGEST_LENGTH {
            chain = Blake2b512::digest(&chain);
            out[written..written + HALF_DIGEST_LENGTH].copy_from_slice(&chain[..HALF_DIGEST_LENGTH]);
            written += HALF_DIGEST_LENGTH;
        }

        let mut state = Blake2bVar::new(out.len() - written).map_err(primitive_failure)?;
        state.update(&chain);
        state
            .finalize_variable(&mut out[written..])
            .map_err(primitive_failure)
    }
}

fn primitive_failure(error: impl std::fmt::Display) -> Error {
    Error::PrimitiveFailure(error.to_string())
}

impl Hash for Blake2bLong {
    fn info(&self) -> HashInfo {
        HashInfo {
            id: "blake2b-long",
            hash_len: SHORT_DIGEST_LENGTH,
            hash_lens: 1..u32::MAX as usize,
        }
    }

    fn hash(&self, buf: &mut [u8], data: &[u8]) -> std::result::Result<usize, Box<dyn error::Error + 'static>> {
        if buf.len() < SHORT_DIGEST_LENGTH {
            return Err(Box::new(Error::InvalidOutputLength));
        }
        buf[..SHORT_DIGEST_LENGTH].copy_from_slice(&Self::digest(&[data]));
        Ok(SHORT_DIGEST_LENGTH)
    }
}

impl VarLenHash for Blake2bLong {
    fn var_len_hash(&self, buf: &mut [u8], data: &[u8]) -> std::result::Result<usize, Box<dyn error::Error + 'static>> {
        Self::digest_into(&[data], buf)?;
        Ok(buf.len())
    }
}
