// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Multilinear Galois Mode (RFC 9058, R 1323565.1.026-2019).
//!
//! A context walks `KeySet -> IvSet -> Aad -> Data -> Finalized`. Associated data must be
//! complete before the first message byte; `set_iv` is the only way out of `Finalized`.

use crate::{
    block::Block,
    cipher::{BlockCipher, Key},
    config::Limits,
    error::{Kind, Result},
    mac::Tag,
};
use core::fmt;
use s2n_codec::{Encoder, EncoderBuffer};
use zeroize::{Zeroize, ZeroizeOnDrop};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    KeySet,
    IvSet,
    Aad,
    Data,
    Finalized,
}

#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Mgm<C: BlockCipher> {
    cipher: Option<C>,
    #[zeroize(skip)]
    state: State,
    /// `Y_i`, the keystream counter
    y: C::Block,
    /// `Z_i`, the authentication key counter
    z: C::Block,
    sum: C::Block,
    aad_len: u64,
    data_len: u64,
    /// Pending AAD bytes or ciphertext bytes not yet folded into `sum`
    partial: C::Block,
    partial_len: usize,
    keystream: C::Block,
    tag_len: usize,
}

impl<C: BlockCipher> fmt::Debug for Mgm<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mgm")
            .field("algorithm", &C::ALGORITHM)
            .field("keyed", &self.cipher.is_some())
            .field("state", &self.state)
            .field("aad_len", &self.aad_len)
            .field("data_len", &self.data_len)
            .field("tag_len", &self.tag_len)
            .finish_non_exhaustive()
    }
}

impl<C: BlockCipher> Default for Mgm<C> {
    /// An unkeyed context; processing fails with `KeyNotSet` until [`Mgm::set_key`]
    fn default() -> Self {
        Self {
            cipher: None,
            state: State::KeySet,
            y: C::Block::zeroed(),
            z: C::Block::zeroed(),
            sum: C::Block::zeroed(),
            aad_len: 0,
            data_len: 0,
            partial: C::Block::zeroed(),
            partial_len: 0,
            keystream: C::Block::zeroed(),
            tag_len: C::BLOCK_LEN,
        }
    }
}

impl<C: BlockCipher> Mgm<C> {
    /// Bytes of AAD and message together; keeps both bit lengths within half a block.
    ///
    /// A total of exactly `2^(n/2-3)` bytes is rejected as its bit length would not fit.
    pub const MAX_LEN: u64 = (1u64 << (C::BLOCK_LEN * 4 - 3)) - 1;

    pub fn new(key: &Key) -> Self {
        Self::from_cipher(C::new(key))
    }

    pub fn from_cipher(cipher: C) -> Self {
        let mut mgm = Self::default();
        mgm.cipher = Some(cipher);
        mgm
    }

    pub fn with_limits(key: &Key, limits: &Limits) -> Result<Self> {
        limits.ensure_algorithm(C::ALGORITHM)?;
        let mut mgm = Self::new(key);
        mgm.set_tag_len(limits.tag_len())?;
        Ok(mgm)
    }

    /// Re-keys the context; a new nonce is required before any further processing
    pub fn set_key(&mut self, key: &Key) {
        match self.cipher.as_mut() {
            Some(cipher) => cipher.set_key(key),
            None => self.cipher = Some(C::new(key)),
        }
        self.clear();
        self.transition(State::KeySet);
    }

    pub fn set_tag_len(&mut self, len: usize) -> Result {
        self.tag_len = Limits::check_tag_len(C::ALGORITHM, len)?;
        Ok(())
    }

    #[inline]
    pub fn tag_len(&self) -> usize {
        self.tag_len
    }

    #[inline]
    pub fn state(&self) -> State {
        self.state
    }

    /// Starts a new message; the top bit of `nonce` is ignored
    pub fn set_iv(&mut self, nonce: &[u8]) -> Result {
        let cipher = self.cipher.as_ref().ok_or_else(|| Kind::KeyNotSet.err())?;
        let mut nonce = C::Block::try_from_slice(nonce)?;

        nonce.as_mut()[0] &= 0x7f;
        let y = cipher.encrypt_copy(&nonce);
        nonce.as_mut()[0] |= 0x80;
        let z = cipher.encrypt_copy(&nonce);
        nonce.zeroize();

        self.clear();
        self.y = y;
        self.z = z;
        self.transition(State::IvSet);
        Ok(())
    }

    pub fn update_aad(&mut self, aad: &[u8]) -> Result {
        self.ensure_state(&[State::IvSet, State::Aad])?;
        self.reserve(aad.len())?;
        self.transition(State::Aad);
        self.aad_len += aad.len() as u64;

        let mut aad = aad;
        while !aad.is_empty() {
            let len = aad.len().min(C::BLOCK_LEN - self.partial_len);
            let (head, rest) = aad.split_at(len);
            self.partial.as_mut()[self.partial_len..self.partial_len + len].copy_from_slice(head);
            self.partial_len += len;
            aad = rest;

            if self.partial_len == C::BLOCK_LEN {
                self.fold_partial()?;
            }
        }

        Ok(())
    }

    /// Encrypts `data` in place
    pub fn encrypt(&mut self, data: &mut [u8]) -> Result {
        self.process(data, true)
    }

    /// Decrypts `data` in place.
    ///
    /// The plaintext is provisional until [`Mgm::verify`] succeeds.
    pub fn decrypt(&mut self, data: &mut [u8]) -> Result {
        self.process(data, false)
    }

    /// Completes the message and returns the tag truncated to [`Mgm::tag_len`]
    pub fn finish(&mut self) -> Result<Tag> {
        let mut full = self.finalize()?;
        let tag = Tag::new(&full.as_ref()[..self.tag_len]);
        full.zeroize();
        Ok(tag)
    }

    /// Completes the message and checks `expected` in constant time.
    ///
    /// The comparison covers `expected.len()` leading bytes of the tag.
    pub fn verify(&mut self, expected: &[u8]) -> Result {
        Limits::check_tag_len(C::ALGORITHM, expected.len())?;
        let mut full = self.finalize()?;
        let tag = Tag::new(&full.as_ref()[..expected.len()]);
        full.zeroize();

        if !tag.verify(expected) {
            tracing::debug!(algorithm = ?C::ALGORITHM, "mgm_verify_failed");
            return Err(Kind::AuthenticationFailed.err());
        }

        Ok(())
    }

    fn process(&mut self, data: &mut [u8], encrypt: bool) -> Result {
        self.ensure_state(&[State::IvSet, State::Aad, State::Data])?;
        self.reserve(data.len())?;

        // AAD stays open until a message byte arrives
        if data.is_empty() {
            return Ok(());
        }

        if self.state != State::Data {
            // zero-pad the trailing AAD block
            if self.partial_len > 0 {
                self.fold_partial()?;
            }
            self.transition(State::Data);
        }
        self.data_len += data.len() as u64;

        for byte in data.iter_mut() {
            if self.partial_len == 0 {
                let cipher = self.cipher.as_ref().ok_or_else(|| Kind::KeyNotSet.err())?;
                self.keystream = cipher.encrypt_copy(&self.y);
                self.y.increment_right();
            }

            let input = *byte;
            *byte ^= self.keystream.as_ref()[self.partial_len];
            let ciphertext = if encrypt { *byte } else { input };

            self.partial.as_mut()[self.partial_len] = ciphertext;
            self.partial_len += 1;

            if self.partial_len == C::BLOCK_LEN {
                self.fold_partial()?;
            }
        }

        Ok(())
    }

    fn finalize(&mut self) -> Result<C::Block> {
        self.ensure_state(&[State::IvSet, State::Aad, State::Data])?;

        if self.partial_len > 0 {
            self.fold_partial()?;
        }

        let mut lengths = C::Block::zeroed();
        let half = C::Block::HALF_LEN;
        {
            let mut encoder = EncoderBuffer::new(lengths.as_mut());
            encoder.write_slice(&(self.aad_len * 8).to_be_bytes()[8 - half..]);
            encoder.write_slice(&(self.data_len * 8).to_be_bytes()[8 - half..]);
        }
        self.fold(&lengths)?;

        let cipher = self.cipher()?;
        let tag = cipher.encrypt_copy(&self.sum);

        self.clear();
        self.transition(State::Finalized);
        Ok(tag)
    }

    /// Folds the zero-padded partial block into the accumulator
    #[inline]
    fn fold_partial(&mut self) -> Result {
        let mut block = self.partial;
        block.as_mut()[self.partial_len..].fill(0);
        let result = self.fold(&block);
        block.zeroize();
        self.partial_len = 0;
        result
    }

    /// `sum ^= E_K(Z_i) * block`, then advances `Z`
    #[inline]
    fn fold(&mut self, block: &C::Block) -> Result {
        let mut h = self.cipher()?.encrypt_copy(&self.z);
        self.sum = self.sum.xor(&h.gf_mul(block));
        h.zeroize();
        self.z.increment_left();
        Ok(())
    }

    #[inline]
    fn cipher(&self) -> Result<&C> {
        self.cipher.as_ref().ok_or_else(|| Kind::KeyNotSet.err())
    }

    #[inline]
    fn ensure_state(&self, allowed: &[State]) -> Result {
        self.cipher()?;
        if !allowed.contains(&self.state) {
            return Err(Kind::BadOrder.err());
        }
        Ok(())
    }

    #[inline]
    fn reserve(&self, len: usize) -> Result {
        let total = self
            .aad_len
            .checked_add(self.data_len)
            .and_then(|total| total.checked_add(len as u64));
        match total {
            Some(total) if total <= Self::MAX_LEN => Ok(()),
            _ => Err(Kind::DataTooLarge.err()),
        }
    }

    #[inline]
    fn transition(&mut self, state: State) {
        if self.state != state {
            tracing::trace!(algorithm = ?C::ALGORITHM, from = ?self.state, to = ?state, "mgm_state");
            self.state = state;
        }
    }

    fn clear(&mut self) {
        self.y.zeroize();
        self.z.zeroize();
        self.sum.zeroize();
        self.partial.zeroize();
        self.keystream.zeroize();
        self.aad_len = 0;
        self.data_len = 0;
        self.partial_len = 0;
    }
}

#[cfg(test)]
mod tests;
