// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! CTR mode (GOST R 34.13-2015 §5.2) with optional ACPKM section rekeying.

use crate::{
    acpkm,
    block::{xor_in_place, Block},
    cipher::{BlockCipher, Key},
    config::Limits,
    error::{Kind, Result},
};
use core::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Ctr<C: BlockCipher> {
    cipher: C,
    counter: C::Block,
    keystream: C::Block,
    /// Bytes of `keystream` already consumed; `LEN` when a new block is needed
    position: usize,
    /// Zero disables meshing
    section: usize,
    /// Keystream bytes generated under the current section key
    num: usize,
}

impl<C: BlockCipher> fmt::Debug for Ctr<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ctr")
            .field("algorithm", &C::ALGORITHM)
            .field("section", &self.section)
            .field("num", &self.num)
            .finish_non_exhaustive()
    }
}

impl<C: BlockCipher> Ctr<C> {
    /// Plain CTR, meshing disabled
    pub fn new(key: &Key, iv: &[u8]) -> Result<Self> {
        Self::from_cipher(C::new(key), iv, 0)
    }

    /// CTR-ACPKM with the recommended section size for `C`
    pub fn acpkm(key: &Key, iv: &[u8]) -> Result<Self> {
        Self::with_limits(key, iv, &Limits::new(C::ALGORITHM))
    }

    pub fn with_limits(key: &Key, iv: &[u8], limits: &Limits) -> Result<Self> {
        limits.ensure_algorithm(C::ALGORITHM)?;
        Self::from_cipher(C::new(key), iv, limits.ctr_section())
    }

    /// Takes ownership of an already keyed cipher; `iv` is half a block
    pub fn from_cipher(cipher: C, iv: &[u8], section: usize) -> Result<Self> {
        let section = Limits::check_ctr_section(C::ALGORITHM, section)?;
        let half = C::Block::HALF_LEN;
        if iv.len() != half {
            return Err(Kind::InvalidLength {
                expected: half,
                actual: iv.len(),
            }
            .err());
        }

        let counter = C::Block::load_padded(iv);

        Ok(Self {
            cipher,
            counter,
            keystream: C::Block::zeroed(),
            position: C::BLOCK_LEN,
            section,
            num: 0,
        })
    }

    #[inline]
    pub fn section(&self) -> usize {
        self.section
    }

    /// Changes the section size for keystream generated from now on
    pub fn set_section(&mut self, section: usize) -> Result {
        self.section = Limits::check_ctr_section(C::ALGORITHM, section)?;
        Ok(())
    }

    /// XORs the next `data.len()` keystream bytes into `data`
    ///
    /// Encryption and decryption are the same operation.
    pub fn apply_keystream(&mut self, data: &mut [u8]) {
        let mut data = data;

        // drain the rest of the current block
        if self.position < C::BLOCK_LEN {
            let len = data.len().min(C::BLOCK_LEN - self.position);
            let (head, rest) = core::mem::take(&mut data).split_at_mut(len);
            xor_in_place(head, &self.keystream.as_ref()[self.position..]);
            self.position += len;
            data = rest;
        }

        let mut chunks = data.chunks_exact_mut(C::BLOCK_LEN);
        for chunk in &mut chunks {
            self.next_block();
            xor_in_place(chunk, self.keystream.as_ref());
            self.position = C::BLOCK_LEN;
        }

        let rest = chunks.into_remainder();
        if !rest.is_empty() {
            self.next_block();
            xor_in_place(rest, self.keystream.as_ref());
            self.position = rest.len();
        }
    }

    /// Writes raw keystream into `out`
    pub fn keystream(&mut self, out: &mut [u8]) {
        out.fill(0);
        self.apply_keystream(out);
    }

    #[inline]
    fn next_block(&mut self) {
        if self.section != 0 && self.num >= self.section {
            acpkm::mesh(&mut self.cipher);
            self.num &= C::BLOCK_LEN - 1;
        }

        self.keystream = self.cipher.encrypt_copy(&self.counter);
        self.counter.increment();
        self.num += C::BLOCK_LEN;
    }
}
