// Copyright 2020-2021 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! The block-mixing primitive: a BLAKE2b round (with the multiplication-
//! hardened quarter step) applied row-wise and then column-wise over the 8x16
//! word matrix of a block, wrapped in the feed-forward XORs that make the
//! compression non-invertible.

use crate::block::Block;

/// Mixes two blocks into `next`: `next = P(prev ^ ref) ^ prev ^ ref`, where
/// `P` is the permutation below. With `with_xor` the previous contents of
/// `next` are folded in as well, which is how refill passes preserve earlier
/// work instead of replacing it.
pub(crate) fn fill_block(prev: &Block, reference: &Block, next: &mut Block, with_xor: bool) {
    let mut r = *reference;
    r ^= prev;

    let mut tmp = r;
    if with_xor {
        tmp ^= &*next;
    }

    permute(&mut r);

    *next = tmp;
    *next ^= &r;
}

/// Advances the counter-based address generator: bumps the running counter in
/// `input` and double-compresses it against the zero block, yielding the next
/// 128 pseudo-random reference addresses.
pub(crate) fn next_addresses(address: &mut Block, input: &mut Block) {
    const ZERO: Block = Block::zeroed();

    input.0[6] = add!(input.0[6], 1);
    fill_block(&ZERO, input, address, false);
    let seed = *address;
    fill_block(&ZERO, &seed, address, false);
}

/// The permutation `P`: eight rounds over the rows of the word matrix, then
/// eight over its 2-word-wide columns.
fn permute(block: &mut Block) {
    // the quarter step: BLAKE2b's G with the lower-half multiplication
    macro_rules! mix {
        ($a:expr, $b:expr, $c:expr, $d:expr) => {{
            $a = add!($a, $b, mult!(mult!(truncate32!($a), truncate32!($b)), 2));
            $d = xor!($d, $a).rotate_right(32);
            $c = add!($c, $d, mult!(mult!(truncate32!($c), truncate32!($d)), 2));
            $b = xor!($b, $c).rotate_right(24);
            $a = add!($a, $b, mult!(mult!(truncate32!($a), truncate32!($b)), 2));
            $d = xor!($d, $a).rotate_right(16);
            $c = add!($c, $d, mult!(mult!(truncate32!($c), truncate32!($d)), 2));
            $b = xor!($b, $c).rotate_right(63);
        }};
    }

    // one full round over sixteen words
    macro_rules! mix_round {
        ($v0:expr, $v1:expr, $v2:expr, $v3:expr,
         $v4:expr, $v5:expr, $v6:expr, $v7:expr,
         $v8:expr, $v9:expr, $v10:expr, $v11:expr,
         $v12:expr, $v13:expr, $v14:expr, $v15:expr) => {{
            mix!($v0, $v4, $v8, $v12);
            mix!($v1, $v5, $v9, $v13);
            mix!($v2, $v6, $v10, $v14);
            mix!($v3, $v7, $v11, $v15);
            mix!($v0, $v5, $v10, $v15);
            mix!($v1, $v6, $v11, $v12);
            mix!($v2, $v7, $v8, $v13);
            mix!($v3, $v4, $v9, $v14);
        }};
    }

    for row in block.0.chunks_exact_mut(16) {
        mix_round!(
            row[0], row[1], row[2], row[3], row[4], row[5], row[6], row[7], row[8], row[9],
            row[10], row[11], row[12], row[13], row[14], row[15]
        );
    }

    for col in 0..8 {
        let b = col * 2;
        mix_round!(
            block.0[b],
            block.0[b + 1],
            block.0[b + 16],
            block.0[b + 17],
            block.0[b + 32],
            block.0[b + 33],
            block.0[b + 48],
            block.0[b + 49],
            block.0[b + 64],
            block.0[b + 65],
            block.0[b + 80],
            block.0[b + 81],
            block.0[b + 96],
            block.0[b + 97],
            block.0[b + 112],
            block.0[b + 113]
        );
    }
}
