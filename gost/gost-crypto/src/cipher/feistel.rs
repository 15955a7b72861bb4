// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! The 32-round Feistel network shared by Magma and GOST 28147-89.
//!
//! Both ciphers use the same round function `g(a, k) = (S(a + k)) <<< 11`; they only differ
//! in the substitution table and in how key words and block halves are read from bytes.

/// Eight 4-bit substitution rows, row `i` applies to nibble `i` counting from the least
/// significant nibble
pub type Sbox = [[u8; 16]; 8];

/// The substitution rows merged pairwise into byte lookup tables
pub type ExpandedSbox = [[u8; 256]; 4];

pub const fn expand(sbox: &Sbox) -> ExpandedSbox {
    let mut out = [[0u8; 256]; 4];
    let mut i = 0;
    while i < 4 {
        let mut byte = 0;
        while byte < 256 {
            let lo = sbox[2 * i][byte & 0xf];
            let hi = sbox[2 * i + 1][byte >> 4];
            out[i][byte] = lo | (hi << 4);
            byte += 1;
        }
        i += 1;
    }
    out
}

/// `id-tc26-gost-28147-param-Z`, the table fixed for Magma by GOST R 34.12-2015
pub const TC26_Z: Sbox = [
    [12, 4, 6, 2, 10, 5, 11, 9, 14, 8, 13, 7, 0, 3, 15, 1],
    [6, 8, 2, 3, 9, 10, 5, 12, 1, 14, 4, 7, 11, 13, 0, 15],
    [11, 3, 5, 8, 2, 15, 10, 13, 14, 1, 7, 4, 12, 9, 6, 0],
    [12, 8, 2, 1, 13, 4, 15, 6, 7, 0, 10, 5, 3, 14, 9, 11],
    [7, 15, 5, 10, 8, 1, 6, 13, 0, 9, 3, 14, 11, 4, 2, 12],
    [5, 13, 15, 6, 9, 2, 12, 10, 11, 7, 8, 1, 4, 3, 14, 0],
    [8, 14, 2, 5, 6, 9, 1, 12, 15, 4, 11, 0, 13, 10, 3, 7],
    [1, 7, 14, 13, 0, 5, 8, 3, 4, 15, 10, 6, 9, 12, 11, 2],
];

pub static TC26_Z_EXPANDED: ExpandedSbox = expand(&TC26_Z);

#[inline(always)]
fn g(sbox: &ExpandedSbox, a: u32, k: u32) -> u32 {
    let x = a.wrapping_add(k).to_le_bytes();
    let y = u32::from_le_bytes([
        sbox[0][x[0] as usize],
        sbox[1][x[1] as usize],
        sbox[2][x[2] as usize],
        sbox[3][x[3] as usize],
    ]);
    y.rotate_left(11)
}

#[inline(always)]
fn rounds<'a>(
    sbox: &ExpandedSbox,
    schedule: impl Iterator<Item = &'a u32>,
    mut a1: u32,
    mut a0: u32,
) -> (u32, u32) {
    for k in schedule {
        (a1, a0) = (a0, a1 ^ g(sbox, a0, *k));
    }
    (a1, a0)
}

/// Runs the 32 encryption rounds on the halves `(a1, a0)`; `a0` enters the round function first
#[inline]
pub fn encrypt(sbox: &ExpandedSbox, key: &[u32; 8], a1: u32, a0: u32) -> (u32, u32) {
    let schedule = key.iter().cycle().take(24).chain(key.iter().rev());
    rounds(sbox, schedule, a1, a0)
}

#[inline]
pub fn decrypt(sbox: &ExpandedSbox, key: &[u32; 8], a1: u32, a0: u32) -> (u32, u32) {
    let schedule = key.iter().chain(key.iter().rev().cycle().take(24));
    rounds(sbox, schedule, a1, a0)
}

/// The 16 rounds of the GOST 28147-89 imitation function (`k0..k7` twice)
#[inline]
pub fn mac_rounds(sbox: &ExpandedSbox, key: &[u32; 8], a1: u32, a0: u32) -> (u32, u32) {
    rounds(sbox, key.iter().cycle().take(16), a1, a0)
}
