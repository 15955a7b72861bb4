// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use super::{Algorithm, BlockCipher, Key};
use core::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

pub const BLOCK_LEN: usize = 16;
pub const ROUNDS: usize = 10;

type State = [u8; BLOCK_LEN];

/// GOST R 34.12-2015 Kuznyechik (Grasshopper)
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Kuznyechik {
    round_keys: [State; ROUNDS],
}

impl fmt::Debug for Kuznyechik {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Kuznyechik { .. }")
    }
}

impl Kuznyechik {
    fn expand(key: &Key) -> [State; ROUNDS] {
        let mut round_keys = [[0u8; BLOCK_LEN]; ROUNDS];
        let mut a: State = [0; BLOCK_LEN];
        let mut b: State = [0; BLOCK_LEN];
        a.copy_from_slice(&key[..BLOCK_LEN]);
        b.copy_from_slice(&key[BLOCK_LEN..]);
        round_keys[0] = a;
        round_keys[1] = b;

        for (i, constant) in ROUND_CONSTANTS.iter().enumerate() {
            let mut t = a;
            xor(&mut t, constant);
            substitute(&mut t, &PI);
            linear(&mut t);
            xor(&mut t, &b);
            b = a;
            a = t;

            if (i + 1) % 8 == 0 {
                let idx = 2 + (i / 8) * 2;
                round_keys[idx] = a;
                round_keys[idx + 1] = b;
            }
        }

        a.zeroize();
        b.zeroize();

        round_keys
    }
}

impl BlockCipher for Kuznyechik {
    type Block = State;

    const ALGORITHM: Algorithm = Algorithm::Kuznyechik;

    #[inline]
    fn new(key: &Key) -> Self {
        Self {
            round_keys: Self::expand(key),
        }
    }

    #[inline]
    fn set_key(&mut self, key: &Key) {
        self.round_keys = Self::expand(key);
    }

    #[inline]
    fn encrypt_block(&self, block: &mut Self::Block) {
        let (keys, last) = self.round_keys.split_at(ROUNDS - 1);
        for key in keys {
            xor(block, key);
            substitute(block, &PI);
            linear(block);
        }
        xor(block, &last[0]);
    }

    #[inline]
    fn decrypt_block(&self, block: &mut Self::Block) {
        let (keys, last) = self.round_keys.split_at(ROUNDS - 1);
        xor(block, &last[0]);
        for key in keys.iter().rev() {
            linear_inv(block);
            substitute(block, &PI_INV);
            xor(block, key);
        }
    }
}

#[inline(always)]
fn xor(state: &mut State, other: &State) {
    for (a, b) in state.iter_mut().zip(other) {
        *a ^= b;
    }
}

#[inline(always)]
fn substitute(state: &mut State, table: &[u8; 256]) {
    for byte in state.iter_mut() {
        *byte = table[*byte as usize];
    }
}

/// `l(a_15, ..., a_0)` with the linear combination coefficients
#[inline(always)]
fn combine(state: &State) -> u8 {
    state
        .iter()
        .zip(MUL.iter())
        .fold(0, |acc, (byte, row)| acc ^ row[*byte as usize])
}

/// Applies `R` sixteen times
#[inline]
fn linear(state: &mut State) {
    for _ in 0..BLOCK_LEN {
        let x = combine(state);
        state.rotate_right(1);
        state[0] = x;
    }
}

#[inline]
fn linear_inv(state: &mut State) {
    for _ in 0..BLOCK_LEN {
        // the coefficient of the recovered byte is 1
        let first = state[0];
        state.rotate_left(1);
        state[BLOCK_LEN - 1] = 0;
        state[BLOCK_LEN - 1] = first ^ combine(state);
    }
}

const COEFFICIENTS: [u8; BLOCK_LEN] = [
    0x94, 0x20, 0x85, 0x10, 0xc2, 0xc0, 0x01, 0xfb, 0x01, 0xc0, 0xc2, 0x10, 0x85, 0x20, 0x94, 0x01,
];

/// Multiplication in GF(2^8) modulo `x^8 + x^7 + x^6 + x + 1`
const fn gf_mul(mut a: u8, mut b: u8) -> u8 {
    let mut r = 0u8;
    while b != 0 {
        if b & 1 == 1 {
            r ^= a;
        }
        let hi = a & 0x80;
        a <<= 1;
        if hi != 0 {
            a ^= 0xc3;
        }
        b >>= 1;
    }
    r
}

/// `MUL[i][x] = COEFFICIENTS[i] * x`
static MUL: [[u8; 256]; BLOCK_LEN] = {
    let mut table = [[0u8; 256]; BLOCK_LEN];
    let mut i = 0;
    while i < BLOCK_LEN {
        let mut x = 0;
        while x < 256 {
            table[i][x] = gf_mul(COEFFICIENTS[i], x as u8);
            x += 1;
        }
        i += 1;
    }
    table
};

const fn const_linear(mut state: State) -> State {
    let mut round = 0;
    while round < BLOCK_LEN {
        let mut x = 0u8;
        let mut i = 0;
        while i < BLOCK_LEN {
            x ^= gf_mul(COEFFICIENTS[i], state[i]);
            i += 1;
        }
        let mut j = BLOCK_LEN - 1;
        while j > 0 {
            state[j] = state[j - 1];
            j -= 1;
        }
        state[0] = x;
        round += 1;
    }
    state
}

/// `C_i = L(Vec_128(i))` for `i` in `1..=32`
static ROUND_CONSTANTS: [State; 32] = {
    let mut constants = [[0u8; BLOCK_LEN]; 32];
    let mut i = 0;
    while i < 32 {
        let mut v = [0u8; BLOCK_LEN];
        v[BLOCK_LEN - 1] = (i + 1) as u8;
        constants[i] = const_linear(v);
        i += 1;
    }
    constants
};

static PI: [u8; 256] = [
    0xfc, 0xee, 0xdd, 0x11, 0xcf, 0x6e, 0x31, 0x16, 0xfb, 0xc4, 0xfa, 0xda, 0x23, 0xc5, 0x04, 0x4d,
    0xe9, 0x77, 0xf0, 0xdb, 0x93, 0x2e, 0x99, 0xba, 0x17, 0x36, 0xf1, 0xbb, 0x14, 0xcd, 0x5f, 0xc1,
    0xf9, 0x18, 0x65, 0x5a, 0xe2, 0x5c, 0xef, 0x21, 0x81, 0x1c, 0x3c, 0x42, 0x8b, 0x01, 0x8e, 0x4f,
    0x05, 0x84, 0x02, 0xae, 0xe3, 0x6a, 0x8f, 0xa0, 0x06, 0x0b, 0xed, 0x98, 0x7f, 0xd4, 0xd3, 0x1f,
    0xeb, 0x34, 0x2c, 0x51, 0xea, 0xc8, 0x48, 0xab, 0xf2, 0x2a, 0x68, 0xa2, 0xfd, 0x3a, 0xce, 0xcc,
    0xb5, 0x70, 0x0e, 0x56, 0x08, 0x0c, 0x76, 0x12, 0xbf, 0x72, 0x13, 0x47, 0x9c, 0xb7, 0x5d, 0x87,
    0x15, 0xa1, 0x96, 0x29, 0x10, 0x7b, 0x9a, 0xc7, 0xf3, 0x91, 0x78, 0x6f, 0x9d, 0x9e, 0xb2, 0xb1,
    0x32, 0x75, 0x19, 0x3d, 0xff, 0x35, 0x8a, 0x7e, 0x6d, 0x54, 0xc6, 0x80, 0xc3, 0xbd, 0x0d, 0x57,
    0xdf, 0xf5, 0x24, 0xa9, 0x3e, 0xa8, 0x43, 0xc9, 0xd7, 0x79, 0xd6, 0xf6, 0x7c, 0x22, 0xb9, 0x03,
    0xe0, 0x0f, 0xec, 0xde, 0x7a, 0x94, 0xb0, 0xbc, 0xdc, 0xe8, 0x28, 0x50, 0x4e, 0x33, 0x0a, 0x4a,
    0xa7, 0x97, 0x60, 0x73, 0x1e, 0x00, 0x62, 0x44, 0x1a, 0xb8, 0x38, 0x82, 0x64, 0x9f, 0x26, 0x41,
    0xad, 0x45, 0x46, 0x92, 0x27, 0x5e, 0x55, 0x2f, 0x8c, 0xa3, 0xa5, 0x7d, 0x69, 0xd5, 0x95, 0x3b,
    0x07, 0x58, 0xb3, 0x40, 0x86, 0xac, 0x1d, 0xf7, 0x30, 0x37, 0x6b, 0xe4, 0x88, 0xd9, 0xe7, 0x89,
    0xe1, 0x1b, 0x83, 0x49, 0x4c, 0x3f, 0xf8, 0xfe, 0x8d, 0x53, 0xaa, 0x90, 0xca, 0xd8, 0x85, 0x61,
    0x20, 0x71, 0x67, 0xa4, 0x2d, 0x2b, 0x09, 0x5b, 0xcb, 0x9b, 0x25, 0xd0, 0xbe, 0xe5, 0x6c, 0x52,
    0x59, 0xa6, 0x74, 0xd2, 0xe6, 0xf4, 0xb4, 0xc0, 0xd1, 0x66, 0xaf, 0xc2, 0x39, 0x4b, 0x63, 0xb6,
];

static PI_INV: [u8; 256] = {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        table[PI[i] as usize] = i as u8;
        i += 1;
    }
    table
};
