// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Carry-less multiplication used by MGM to accumulate the authentication sum.
//!
//! Blocks are read as big-endian integers, so the first byte of a block holds the
//! highest-degree coefficients. The reduction polynomials are
//!
//! * `x^64 + x^4 + x^3 + x + 1` for 64-bit blocks
//! * `x^128 + x^7 + x^2 + x + 1` for 128-bit blocks

use crate::block::Block;

/// Low-order terms of `x^64 + x^4 + x^3 + x + 1`
const POLY_64: u64 = 0x1b;
/// Low-order terms of `x^128 + x^7 + x^2 + x + 1`
const POLY_128: u128 = 0x87;

macro_rules! gf_mul {
    ($name:ident, $int:ty, $poly:expr) => {
        /// Multiplies `a` and `b` modulo the field polynomial.
        ///
        /// The loop always runs once per bit of `b` and selects with masks rather than
        /// branching on key-dependent values.
        #[inline]
        pub fn $name(a: $int, b: $int) -> $int {
            let mut x = a;
            let mut y = b;
            let mut z: $int = 0;

            for _ in 0..<$int>::BITS {
                let mask = (0 as $int).wrapping_sub(y & 1);
                z ^= x & mask;

                let carry = (0 as $int).wrapping_sub(x >> (<$int>::BITS - 1));
                x = (x << 1) ^ ($poly & carry);
                y >>= 1;
            }

            z
        }
    };
}

gf_mul!(gf64_mul, u64, POLY_64);
gf_mul!(gf128_mul, u128, POLY_128);

/// Multiplies two blocks in the field matching their size
#[inline]
pub fn gf_mul<B: Block>(a: &B, b: &B) -> B {
    a.gf_mul(b)
}
