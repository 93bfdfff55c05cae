// Copyright 2020-2021 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

/// all macros avoid overflow and underflow.
/// addition macro
#[macro_export]
macro_rules! add {
    ($a:expr, $b:expr) => {{
        $a.wrapping_add($b)
    }};
    ($a:expr, $b:expr, $c:expr) => {{
        $a.wrapping_add($b).wrapping_add($c)
    }};
}

/// multiplication macro
#[macro_export]
macro_rules! mult {
    ($a:expr, $b:expr) => {{
        $a.wrapping_mul($b)
    }};
}

/// bit shift right macro
#[macro_export]
macro_rules! shift_right {
    ($a:expr, $b:expr) => {{
        $a.wrapping_shr($b)
    }};
}

/// bit shift left macro
#[macro_export]
macro_rules! shift_left {
    ($a:expr, $b:expr) => {{
        $a.wrapping_shl($b)
    }};
}

/// logical or macro
#[macro_export]
macro_rules! or {
    ($a:expr, $b:expr) => {{
        $a | $b
    }};
    ($a:expr, $b:expr, $c:expr, $d:expr) => {{
        $a | $b | $c | $d
    }};
}

/// logical and macro
#[macro_export]
macro_rules! and {
    ($a:expr, $b:expr) => {{
        $a & $b
    }};
}

/// logical xor macro
#[macro_export]
macro_rules! xor {
    ($a:expr, $b:expr) => {{
        $a ^ $b
    }};
}

/// keeps the low 32 bits of a 64-bit word
#[macro_export]
macro_rules! truncate32 {
    ($a:expr) => {{
        and!($a, 0xFFFF_FFFF)
    }};
}

/// Little Endian Decode macro u64
#[macro_export]
macro_rules! read64_little_endian {
    ($data:expr) => {{
        or!(
            or!(
                shift_left!($data[0] as u64, 0),
                shift_left!($data[1] as u64, 8),
                shift_left!($data[2] as u64, 16),
                shift_left!($data[3] as u64, 24)
            ),
            or!(
                shift_left!($data[4] as u64, 32),
                shift_left!($data[5] as u64, 40),
                shift_left!($data[6] as u64, 48),
                shift_left!($data[7] as u64, 56)
            )
        )
    }};
}

/// Little Endian Encode macro u64
#[macro_export]
macro_rules! write64_little_endian {
    ($num:expr => $data:expr) => {{
        $data[0] = shift_right!($num, 0) as u8;
        $data[1] = shift_right!($num, 8) as u8;
        $data[2] = shift_right!($num, 16) as u8;
        $data[3] = shift_right!($num, 24) as u8;
        $data[4] = shift_right!($num, 32) as u8;
        $data[5] = shift_right!($num, 40) as u8;
        $data[6] = shift_right!($num, 48) as u8;
        $data[7] = shift_right!($num, 56) as u8;
    }};
}

pub mod compress;
