// Copyright 2020-2021 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! The fill machinery: instance layout, the skewed addressing function, the
//! segment filler and the pass/slice/lane orchestration.
//!
//! A pass walks the whole memory array once; each lane of a pass is cut into
//! four slices. Blocks within a segment (one lane of one slice) depend
//! strictly sequentially on each other, segments of the same slice are
//! independent across lanes, and every block of slice `s` is visible to all
//! lanes of slice `s + 1`. That ordering is exactly what the orchestrator
//! enforces: one task per lane, joined at every slice boundary.

use std::{cmp::min, thread};

use zeroize::Zeroize;

use crate::{
    blake2long::{Blake2bLong, SHORT_DIGEST_LENGTH},
    block::{Block, BLOCK_SIZE},
    context::{Context, Variant, Version, SYNC_POINTS},
    internal::compress::{fill_block, next_addresses},
    memory::{Memory, MemoryView},
    Error, Result,
};

/// Pseudo-random references delivered by one address block
pub(crate) const ADDRESSES_IN_BLOCK: u32 = 128;
/// Pre-hash digest plus the two 4-byte counters appended to it
pub(crate) const PREHASH_SEED_LENGTH: usize = SHORT_DIGEST_LENGTH + 8;

/// Derived layout of one hashing operation, computed once from a validated
/// context. `memory_blocks = lanes * lane_length` and `lane_length` is four
/// segments; the requested memory cost is rounded down to keep it that way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Layout {
    pub passes: u32,
    pub memory_blocks: u32,
    pub segment_length: u32,
    pub lane_length: u32,
    pub lanes: u32,
    pub threads: u32,
    pub variant: Variant,
    pub version: Version,
}

impl Layout {
    pub fn new(context: &Context<'_>) -> Self {
        let min_blocks = 2 * SYNC_POINTS * context.lanes;
        let blocks = context.memory_cost.max(min_blocks);
        let segment_length = blocks / (context.lanes * SYNC_POINTS);

        Self {
            passes: context.time_cost,
            memory_blocks: segment_length * context.lanes * SYNC_POINTS,
            segment_length,
            lane_length: segment_length * SYNC_POINTS,
            lanes: context.lanes,
            threads: min(context.threads, context.lanes),
            variant: context.variant,
            version: context.version,
        }
    }
}

/// Coordinate of the block currently being computed. Recreated for every
/// (pass, slice, lane) dispatch, never persisted.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Position {
    pub pass: u32,
    pub lane: u32,
    pub slice: u32,
    pub index: u32,
}

/// One hashing operation's private working state: the derived layout plus
/// the exclusively owned memory arena.
pub(crate) struct Instance {
    pub layout: Layout,
    pub memory: Memory,
}

impl Instance {
    /// Allocates the arena and computes the first two blocks of every lane
    /// from the parameter pre-hash. All-or-nothing: on failure no memory is
    /// retained.
    pub fn new(context: &Context<'_>) -> Result<Self> {
        let layout = Layout::new(context);
        let mut memory = Memory::new(layout.memory_blocks as usize)?;

        let mut seed = [0u8; PREHASH_SEED_LENGTH];
        seed[..SHORT_DIGEST_LENGTH].copy_from_slice(&prehash(context));

        let result = seed_lanes(&layout, &mut seed, |offset, image| {
            memory.block_mut(offset).load(image);
        });

        seed.zeroize();
        result?;

        debug_assert_eq!(memory.len(), layout.memory_blocks as usize);
        Ok(Self { layout, memory })
    }

    /// Runs the pass x slice x lane grid over the arena. Lane tasks of one
    /// slice run in parallel; the join before the next slice is the
    /// visibility barrier that cross-lane references rely on.
    pub fn fill_memory_blocks(&mut self) {
        let layout = self.layout;
        let view = self.memory.view();

        if layout.threads > 1 {
            fill_parallel(&layout, &view);
        } else {
            fill_sequential(&layout, &view);
        }
    }

    /// XORs the last block of every lane into one accumulator and stretches
    /// it to the requested tag length. Consumes the instance; the arena is
    /// wiped when it drops, whether or not the expansion succeeded.
    pub fn finalize(self, out: &mut [u8]) -> Result<()> {
        let layout = self.layout;

        let mut accumulator = *self.memory.block(layout.lane_length - 1);
        for lane in 1..layout.lanes {
            accumulator ^= self
                .memory
                .block(lane * layout.lane_length + layout.lane_length - 1);
        }

        let mut bytes = [0u8; BLOCK_SIZE];
        accumulator.store(&mut bytes);
        let result = Blake2bLong::digest_into(&[&bytes], out);

        accumulator.zeroize();
        bytes.zeroize();
        result
    }
}

/// Writes the pre-fill state for a validated context into a caller-supplied
/// buffer: a zeroed arena image with the first two blocks of every lane
/// computed, byte-identical to the state [`Instance::new`] builds internally.
/// An external backend can take the buffer from here and run the fill.
pub(crate) fn prefill_into(context: &Context<'_>, buffer: &mut [u8]) -> Result<()> {
    let layout = Layout::new(context);
    if buffer.len() != layout.memory_blocks as usize * BLOCK_SIZE {
        return Err(Error::InvalidMemoryCost);
    }

    buffer.fill(0);

    let mut seed = [0u8; PREHASH_SEED_LENGTH];
    seed[..SHORT_DIGEST_LENGTH].copy_from_slice(&prehash(context));

    let result = seed_lanes(&layout, &mut seed, |offset, image| {
        let at = offset as usize * BLOCK_SIZE;
        buffer[at..at + BLOCK_SIZE].copy_from_slice(image);
    });

    seed.zeroize();
    result
}

/// The 64-byte pre-hash binding every parameter and secret input, in wire
/// order, with each byte input preceded by its 4-byte length.
fn prehash(context: &Context<'_>) -> [u8; SHORT_DIGEST_LENGTH] {
    Blake2bLong::digest(&[
        &context.lanes.to_le_bytes(),
        &context.output_length.to_le_bytes(),
        &context.memory_cost.to_le_bytes(),
        &context.time_cost.to_le_bytes(),
        &context.version.tag().to_le_bytes(),
        &context.variant.tag().to_le_bytes(),
        &(context.password.len() as u32).to_le_bytes(),
        context.password,
        &(context.salt.len() as u32).to_le_bytes(),
        context.salt,
        &(context.secret.len() as u32).to_le_bytes(),
        context.secret,
        &(context.associated_data.len() as u32).to_le_bytes(),
        context.associated_data,
    ])
}

/// Expands the seeded pre-hash into the first two blocks of every lane and
/// hands each 1024-byte image to `write` together with its block offset.
fn seed_lanes(
    layout: &Layout,
    seed: &mut [u8; PREHASH_SEED_LENGTH],
    mut write: impl FnMut(u32, &[u8]),
) -> Result<()> {
    let mut image = [0u8; BLOCK_SIZE];
    for lane in 0..layout.lanes {
        seed[SHORT_DIGEST_LENGTH + 4..].copy_from_slice(&lane.to_le_bytes());
        for index in 0..2u32 {
            seed[SHORT_DIGEST_LENGTH..SHORT_DIGEST_LENGTH + 4]
                .copy_from_slice(&index.to_le_bytes());
            Blake2bLong::digest_into(&[&seed[..]], &mut image)?;
            write(lane * layout.lane_length + index, &image);
        }
    }
    image.zeroize();
    Ok(())
}

/// Maps a 32-bit pseudo-random value onto the index of the reference block
/// within the eligible window, skewed so that recently written blocks are
/// preferred. Pure function of the layout, the position and the two
/// pseudo-random words.
pub(crate) fn index_alpha(
    layout: &Layout,
    position: &Position,
    pseudo_rand: u32,
    same_lane: bool,
) -> u32 {
    let reference_area_size: u32 = if position.pass == 0 {
        if position.slice == 0 {
            // everything before the previous block in this first segment
            position.index - 1
        } else if same_lane {
            position.slice * layout.segment_length + position.index - 1
        } else if position.index == 0 {
            position.slice * layout.segment_length - 1
        } else {
            position.slice * layout.segment_length
        }
    } else if same_lane {
        layout.lane_length - layout.segment_length + position.index - 1
    } else if position.index == 0 {
        layout.lane_length - layout.segment_length - 1
    } else {
        layout.lane_length - layout.segment_length
    };

    let area = reference_area_size as u64;
    let mut relative_position = pseudo_rand as u64;
    relative_position = shift_right!(mult!(relative_position, relative_position), 32);
    relative_position = area - 1 - shift_right!(mult!(area, relative_position), 32);

    let start_position = if position.pass != 0 && position.slice != SYNC_POINTS - 1 {
        (position.slice + 1) * layout.segment_length
    } else {
        0
    };

    ((start_position as u64 + relative_position) % layout.lane_length as u64) as u32
}

/// Fills one (pass, lane, slice) segment in block order. The calling task
/// owns the lane's segment for the duration of the slice.
pub(crate) fn fill_segment(layout: &Layout, memory: &MemoryView<'_>, mut position: Position) {
    let data_independent = match layout.variant {
        Variant::Argon2i => true,
        Variant::Argon2id => position.pass == 0 && position.slice < SYNC_POINTS / 2,
        Variant::Argon2d => false,
    };

    let mut address_block = Block::zeroed();
    let mut input_block = Block::zeroed();
    if data_independent {
        input_block.0[0] = position.pass as u64;
        input_block.0[1] = position.lane as u64;
        input_block.0[2] = position.slice as u64;
        input_block.0[3] = layout.memory_blocks as u64;
        input_block.0[4] = layout.passes as u64;
        input_block.0[5] = layout.variant.tag() as u64;
    }

    let mut starting_index = 0;
    if position.pass == 0 && position.slice == 0 {
        // the first two blocks of every lane are seeded by the initializer
        starting_index = 2;
        if data_independent {
            next_addresses(&mut address_block, &mut input_block);
        }
    }

    let segment_start =
        position.lane * layout.lane_length + position.slice * layout.segment_length;

    for index in starting_index..layout.segment_length {
        let current_offset = segment_start + index;
        let previous_offset = if current_offset % layout.lane_length == 0 {
            // first block of the lane wraps back to the lane's last block
            current_offset + layout.lane_length - 1
        } else {
            current_offset - 1
        };

        let pseudo_rand = if data_independent {
            if index % ADDRESSES_IN_BLOCK == 0 {
                next_addresses(&mut address_block, &mut input_block);
            }
            address_block.0[(index % ADDRESSES_IN_BLOCK) as usize]
        } else {
            memory.block(previous_offset).0[0]
        };

        let mut ref_lane = (shift_right!(pseudo_rand, 32) % layout.lanes as u64) as u32;
        if position.pass == 0 && position.slice == 0 {
            // no other lane has anything to offer yet
            ref_lane = position.lane;
        }

        position.index = index;
        let ref_index = index_alpha(
            layout,
            &position,
            truncate32!(pseudo_rand) as u32,
            ref_lane == position.lane,
        );
        let ref_offset = ref_lane * layout.lane_length + ref_index;

        debug_assert_ne!(current_offset, previous_offset);
        debug_assert_ne!(current_offset, ref_offset);

        let with_xor = layout.version == Version::V0x13 && position.pass > 0;
        fill_block(
            memory.block(previous_offset),
            memory.block(ref_offset),
            memory.block_mut(current_offset),
            with_xor,
        );
    }
}

fn fill_sequential(layout: &Layout, memory: &MemoryView<'_>) {
    for pass in 0..layout.passes {
        for slice in 0..SYNC_POINTS {
            for lane in 0..layout.lanes {
                let position = Position {
                    pass,
                    lane,
                    slice,
                    index: 0,
                };
                fill_segment(layout, memory, position);
            }
        }
    }
}

fn fill_parallel(layout: &Layout, memory: &MemoryView<'_>) {
    let lanes: Vec<u32> = (0..layout.lanes).collect();
    let lanes_per_worker = lanes.len().div_ceil(layout.threads as usize);

    for pass in 0..layout.passes {
        for slice in 0..SYNC_POINTS {
            // the scope join is the slice barrier
            thread::scope(|scope| {
                for assigned in lanes.chunks(lanes_per_worker) {
                    scope.spawn(move || {
                        for &lane in assigned {
                            let position = Position {
                                pass,
                                lane,
                                slice,
                                index: 0,
                            };
                            fill_segment(layout, memory, position);
                        }
                    });
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::validate;

    fn small_context<'a>() -> Context<'a> {
        let mut context = Context::argon2d(b"core test password", b"core test salt");
        context.memory_cost = 32;
        context.time_cost = 1;
        context.lanes = 2;
        context.threads = 2;
        context
    }

    #[test]
    fn layout_rounds_memory_down_to_whole_segments() {
        let mut context = small_context();
        context.memory_cost = 39;
        let layout = Layout::new(&context);

        assert_eq!(layout.segment_length, 4);
        assert_eq!(layout.lane_length, 16);
        assert_eq!(layout.memory_blocks, 32);
        assert_eq!(layout.memory_blocks, layout.lanes * layout.lane_length);
    }

    #[test]
    fn layout_clamps_workers_to_lanes() {
        let mut context = small_context();
        context.threads = 64;
        assert_eq!(Layout::new(&context).threads, 2);
    }

    #[test]
    fn first_segment_references_only_earlier_blocks() {
        let context = small_context();
        let layout = Layout::new(&context);
        let position = Position {
            pass: 0,
            lane: 0,
            slice: 0,
            index: 2,
        };

        // with one eligible block every pseudo-random value must map to it
        for pseudo_rand in [0, 1, 0x8000_0000, u32::MAX] {
            assert_eq!(index_alpha(&layout, &position, pseudo_rand, true), 0);
        }
    }

    #[test]
    fn cross_lane_window_excludes_the_in_progress_segment() {
        let context = small_context();
        let layout = Layout::new(&context);

        // lane_length 16, segment_length 4: for pass > 0 the window spans the
        // three finished segments, one block short when the segment has not
        // produced anything yet
        let fresh = Position {
            pass: 1,
            lane: 0,
            slice: 1,
            index: 0,
        };
        let started = Position {
            index: 1,
            ..fresh
        };

        for pseudo_rand in [0u32, 77, 0x1234_5678, u32::MAX] {
            let a = index_alpha(&layout, &fresh, pseudo_rand, false);
            let b = index_alpha(&layout, &started, pseudo_rand, false);
            for abs in [a, b] {
                // slice 1 occupies blocks 4..8 of the lane; never land there
                assert!(!(4..8).contains(&abs), "index {abs} is in slice 1");
            }
        }
    }

    #[test]
    fn skew_prefers_recent_blocks() {
        let context = small_context();
        let layout = Layout::new(&context);
        let position = Position {
            pass: 0,
            lane: 0,
            slice: 3,
            index: 3,
        };

        // J1 = 0 selects the most recent eligible block, J1 = MAX the oldest
        let recent = index_alpha(&layout, &position, 0, true);
        let oldest = index_alpha(&layout, &position, u32::MAX, true);
        assert_eq!(recent, 3 * layout.segment_length + position.index - 2);
        assert_eq!(oldest, 0);
    }

    #[test]
    fn filled_memory_contains_cross_lane_references() {
        let context = small_context();
        let mut instance = Instance::new(&context).unwrap();
        instance.fill_memory_blocks();

        // single pass, data-dependent: the J-values each block was addressed
        // with are still in memory, so the fill can be replayed and checked
        let layout = instance.layout;
        let mut cross_lane = 0;
        for slice in 1..SYNC_POINTS {
            for lane in 0..layout.lanes {
                for index in 0..layout.segment_length {
                    let current = lane * layout.lane_length
                        + slice * layout.segment_length
                        + index;
                    let pseudo_rand = instance.memory.block(current - 1).0[0];
                    if (pseudo_rand >> 32) % layout.lanes as u64 != lane as u64 {
                        cross_lane += 1;
                    }
                }
            }
        }
        assert!(cross_lane > 0, "no block ever referenced another lane");
    }

    #[test]
    fn worker_count_does_not_change_the_fill() {
        let mut sequential_ctx = small_context();
        sequential_ctx.threads = 1;
        let parallel_ctx = small_context();

        let mut sequential = Instance::new(&sequential_ctx).unwrap();
        let mut parallel = Instance::new(&parallel_ctx).unwrap();
        sequential.fill_memory_blocks();
        parallel.fill_memory_blocks();

        for index in 0..sequential.layout.memory_blocks {
            assert_eq!(
                sequential.memory.block(index).0,
                parallel.memory.block(index).0
            );
        }
    }

    #[test]
    fn prefill_matches_the_internal_initialization() {
        let context = small_context();
        validate(&context).unwrap();

        let layout = Layout::new(&context);
        let mut buffer = vec![0xffu8; layout.memory_blocks as usize * BLOCK_SIZE];
        prefill_into(&context, &mut buffer).unwrap();

        let instance = Instance::new(&context).unwrap();
        let mut image = [0u8; BLOCK_SIZE];
        for index in 0..layout.memory_blocks {
            instance.memory.block(index).store(&mut image);
            let at = index as usize * BLOCK_SIZE;
            assert_eq!(&buffer[at..at + BLOCK_SIZE], &image[..], "block {index}");
        }
    }

    #[test]
    fn prefill_rejects_a_mismatched_buffer() {
        let context = small_context();
        let mut buffer = vec![0u8; 1024];
        assert_eq!(
            prefill_into(&context, &mut buffer),
            Err(Error::InvalidMemoryCost)
        );
    }
}
