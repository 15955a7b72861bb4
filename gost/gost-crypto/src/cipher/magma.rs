// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use super::{
    feistel::{self, TC26_Z_EXPANDED},
    Algorithm, BlockCipher, Key,
};
use core::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

pub const BLOCK_LEN: usize = 8;

/// GOST R 34.12-2015 Magma.
///
/// Key words and block halves are big-endian.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Magma {
    key: [u32; 8],
}

impl fmt::Debug for Magma {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Magma { .. }")
    }
}

#[inline]
fn load_key(key: &Key) -> [u32; 8] {
    let mut words = [0u32; 8];
    for (word, chunk) in words.iter_mut().zip(key.chunks_exact(4)) {
        *word = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    words
}

#[inline]
fn split(block: &[u8; BLOCK_LEN]) -> (u32, u32) {
    let a1 = u32::from_be_bytes([block[0], block[1], block[2], block[3]]);
    let a0 = u32::from_be_bytes([block[4], block[5], block[6], block[7]]);
    (a1, a0)
}

#[inline]
fn join(block: &mut [u8; BLOCK_LEN], (a1, a0): (u32, u32)) {
    block[..4].copy_from_slice(&a0.to_be_bytes());
    block[4..].copy_from_slice(&a1.to_be_bytes());
}

impl BlockCipher for Magma {
    type Block = [u8; BLOCK_LEN];

    const ALGORITHM: Algorithm = Algorithm::Magma;

    #[inline]
    fn new(key: &Key) -> Self {
        Self {
            key: load_key(key),
        }
    }

    #[inline]
    fn set_key(&mut self, key: &Key) {
        self.key = load_key(key);
    }

    #[inline]
    fn encrypt_block(&self, block: &mut Self::Block) {
        let (a1, a0) = split(block);
        join(block, feistel::encrypt(&TC26_Z_EXPANDED, &self.key, a1, a0));
    }

    #[inline]
    fn decrypt_block(&self, block: &mut Self::Block) {
        let (a1, a0) = split(block);
        join(block, feistel::decrypt(&TC26_Z_EXPANDED, &self.key, a1, a0));
    }
}
