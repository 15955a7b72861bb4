// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use crate::{
    error::{Kind, Result},
    gf,
};
use core::fmt;
use zeroize::Zeroize;

/// A cipher block: 8 bytes for Magma / GOST 28147-89, 16 bytes for Kuznyechik
pub trait Block:
    'static
    + Copy
    + Default
    + PartialEq
    + Eq
    + fmt::Debug
    + AsRef<[u8]>
    + AsMut<[u8]>
    + Zeroize
    + Send
    + Sync
{
    const LEN: usize;
    const HALF_LEN: usize = Self::LEN / 2;

    /// Multiplies two blocks in GF(2^n) (see [`gf`])
    fn gf_mul(&self, other: &Self) -> Self;

    /// Doubles the block the way OMAC derives `K1` and `K2`
    fn dbl(&self) -> Self;

    #[inline]
    fn zeroed() -> Self {
        Self::default()
    }

    #[inline]
    fn xor(mut self, other: &Self) -> Self {
        xor_in_place(self.as_mut(), other.as_ref());
        self
    }

    /// Loads up to `LEN` bytes and fills the rest with zeros
    #[inline]
    fn load_padded(bytes: &[u8]) -> Self {
        debug_assert!(bytes.len() <= Self::LEN);
        let mut block = Self::zeroed();
        block.as_mut()[..bytes.len()].copy_from_slice(bytes);
        block
    }

    #[inline]
    fn try_from_slice(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != Self::LEN {
            return Err(Kind::InvalidLength {
                expected: Self::LEN,
                actual: bytes.len(),
            }
            .err());
        }
        Ok(Self::load_padded(bytes))
    }

    /// Increments the whole block as a big-endian integer, wrapping on overflow
    #[inline]
    fn increment(&mut self) {
        increment_be(self.as_mut())
    }

    /// Increments the leading half modulo `2^(n/2)`
    #[inline]
    fn increment_left(&mut self) {
        increment_be(&mut self.as_mut()[..Self::HALF_LEN])
    }

    /// Increments the trailing half modulo `2^(n/2)`
    #[inline]
    fn increment_right(&mut self) {
        increment_be(&mut self.as_mut()[Self::HALF_LEN..])
    }
}

macro_rules! impl_block {
    ($len:literal, $int:ty, $mul:path, $poly:literal) => {
        impl Block for [u8; $len] {
            const LEN: usize = $len;

            #[inline]
            fn gf_mul(&self, other: &Self) -> Self {
                $mul(<$int>::from_be_bytes(*self), <$int>::from_be_bytes(*other)).to_be_bytes()
            }

            #[inline]
            fn dbl(&self) -> Self {
                let value = <$int>::from_be_bytes(*self);
                let carry = value >> (<$int>::BITS - 1);
                ((value << 1) ^ (carry * $poly)).to_be_bytes()
            }
        }
    };
}

impl_block!(8, u64, gf::gf64_mul, 0x1b);
impl_block!(16, u128, gf::gf128_mul, 0x87);

#[inline]
pub fn xor_in_place(target: &mut [u8], other: &[u8]) {
    for (a, b) in target.iter_mut().zip(other) {
        *a ^= b;
    }
}

#[inline]
pub fn increment_be(bytes: &mut [u8]) {
    for byte in bytes.iter_mut().rev() {
        let (value, overflowed) = byte.overflowing_add(1);
        *byte = value;
        if !overflowed {
            break;
        }
    }
}
