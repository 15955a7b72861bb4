// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! OMAC (GOST R 34.13-2015 §5.6) and OMAC-ACPKM (R 1323565.1.017-2018).
//!
//! Both engines hold back the most recent complete block until more input arrives, since
//! the last block is whitened with `K1` or `K2` depending on whether it is complete.

use crate::{
    block::Block,
    cipher::{BlockCipher, Key, KEY_LEN},
    config::Limits,
    ctr::Ctr,
    error::{Kind, Result},
};
use core::fmt;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

pub const MAX_TAG_LEN: usize = 16;

/// A MAC or AEAD tag truncated to its configured length
#[derive(Clone, Copy, Zeroize)]
pub struct Tag {
    bytes: [u8; MAX_TAG_LEN],
    len: usize,
}

impl Tag {
    #[inline]
    pub(crate) fn new(bytes: &[u8]) -> Self {
        debug_assert!(bytes.len() <= MAX_TAG_LEN);
        let mut tag = Self {
            bytes: [0; MAX_TAG_LEN],
            len: bytes.len(),
        };
        tag.bytes[..bytes.len()].copy_from_slice(bytes);
        tag
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    /// Constant time comparison; tags of different lengths never match
    #[inline]
    pub fn verify(&self, expected: &[u8]) -> bool {
        self.as_bytes().ct_eq(expected).into()
    }
}

impl AsRef<[u8]> for Tag {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl ConstantTimeEq for Tag {
    fn ct_eq(&self, other: &Self) -> subtle::Choice {
        self.as_bytes().ct_eq(other.as_bytes())
    }
}

impl PartialEq for Tag {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for Tag {}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag(")?;
        for byte in self.as_bytes() {
            write!(f, "{byte:02x}")?;
        }
        write!(f, ")")
    }
}

/// The chaining state shared by both OMAC variants
#[derive(Clone, Zeroize)]
struct Chain<B: Block> {
    state: B,
    buffer: B,
    buffered: usize,
}

impl<B: Block> Chain<B> {
    #[inline]
    fn new() -> Self {
        Self {
            state: B::zeroed(),
            buffer: B::zeroed(),
            buffered: 0,
        }
    }

    /// Feeds `data`, calling `process` for every block known not to be the last one
    #[inline]
    fn update<F: FnMut(&mut B, &B)>(&mut self, mut data: &[u8], mut process: F) {
        while !data.is_empty() {
            if self.buffered == B::LEN {
                process(&mut self.state, &self.buffer);
                self.buffered = 0;
            }

            let len = data.len().min(B::LEN - self.buffered);
            let (head, rest) = data.split_at(len);
            self.buffer.as_mut()[self.buffered..self.buffered + len].copy_from_slice(head);
            self.buffered += len;
            data = rest;
        }
    }

    /// Whitens the final block with `k1` if complete, otherwise pads it and uses `dbl(k1)`
    #[inline]
    fn last_block(&self, k1: &B) -> B {
        let mut last = self.buffer;
        if self.buffered == B::LEN {
            return last.xor(k1);
        }

        last.as_mut()[self.buffered] = 0x80;
        last.as_mut()[self.buffered + 1..].fill(0);
        let mut k2 = k1.dbl();
        let out = last.xor(&k2);
        k2.zeroize();
        out
    }
}

#[derive(Clone, Zeroize, ZeroizeOnDrop)]
struct OmacKey<C: BlockCipher> {
    cipher: C,
    k1: C::Block,
}

impl<C: BlockCipher> OmacKey<C> {
    fn new(cipher: C) -> Self {
        let l = cipher.encrypt_copy(&C::Block::zeroed());
        let k1 = l.dbl();
        Self { cipher, k1 }
    }
}

/// OMAC1 / CMAC over a GOST block cipher
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Omac<C: BlockCipher> {
    key: Option<OmacKey<C>>,
    chain: Chain<C::Block>,
    mac_len: usize,
    finished: bool,
}

impl<C: BlockCipher> fmt::Debug for Omac<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Omac")
            .field("algorithm", &C::ALGORITHM)
            .field("keyed", &self.key.is_some())
            .field("mac_len", &self.mac_len)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

impl<C: BlockCipher> Default for Omac<C> {
    /// An unkeyed context; every operation but [`Omac::set_key`] fails with `MacKeyNotSet`
    fn default() -> Self {
        Self {
            key: None,
            chain: Chain::new(),
            mac_len: C::BLOCK_LEN,
            finished: false,
        }
    }
}

impl<C: BlockCipher> Omac<C> {
    pub fn new(key: &Key) -> Self {
        Self::from_cipher(C::new(key))
    }

    pub fn from_cipher(cipher: C) -> Self {
        let mut mac = Self::default();
        mac.key = Some(OmacKey::new(cipher));
        mac
    }

    pub fn with_limits(key: &Key, limits: &Limits) -> Result<Self> {
        limits.ensure_algorithm(C::ALGORITHM)?;
        let mut mac = Self::new(key);
        mac.set_mac_size(limits.mac_len())?;
        Ok(mac)
    }

    /// Keys the context and restarts it
    pub fn set_key(&mut self, key: &Key) {
        self.key = Some(OmacKey::new(C::new(key)));
        self.reset();
    }

    pub fn set_mac_size(&mut self, size: usize) -> Result {
        self.mac_len = Limits::check_mac_len(C::ALGORITHM, size)?;
        Ok(())
    }

    #[inline]
    pub fn mac_size(&self) -> usize {
        self.mac_len
    }

    /// Restarts the chain with the same key and MAC size
    pub fn reset(&mut self) {
        self.chain.zeroize();
        self.chain = Chain::new();
        self.finished = false;
    }

    pub fn update(&mut self, data: &[u8]) -> Result {
        if self.finished {
            return Err(Kind::BadOrder.err());
        }
        let key = self.key.as_ref().ok_or_else(|| Kind::MacKeyNotSet.err())?;

        self.chain.update(data, |state, block| {
            *state = state.xor(block);
            key.cipher.encrypt_block(state);
        });

        Ok(())
    }

    pub fn finish(&mut self) -> Result<Tag> {
        if self.finished {
            return Err(Kind::BadOrder.err());
        }
        let key = self.key.as_ref().ok_or_else(|| Kind::MacKeyNotSet.err())?;

        let mut last = self.chain.last_block(&key.k1);
        let mut mac = self.chain.state.xor(&last);
        key.cipher.encrypt_block(&mut mac);
        let tag = Tag::new(&mac.as_ref()[..self.mac_len]);

        last.zeroize();
        mac.zeroize();
        self.finished = true;

        Ok(tag)
    }

    /// Finishes and compares against `expected` in constant time
    pub fn verify(&mut self, expected: &[u8]) -> Result {
        let tag = self.finish()?;
        if !tag.verify(expected) {
            tracing::debug!(algorithm = ?C::ALGORITHM, "omac_verify_failed");
            return Err(Kind::AuthenticationFailed.err());
        }
        Ok(())
    }

    /// One-shot MAC over `data` with the full block size
    pub fn compute(key: &Key, data: &[u8]) -> Result<Tag> {
        let mut mac = Self::new(key);
        mac.update(data)?;
        mac.finish()
    }
}

#[derive(Clone, Zeroize, ZeroizeOnDrop)]
struct AcpkmKeys<C: BlockCipher> {
    /// CTR-ACPKM stream producing `section key || K1` pairs
    master: Ctr<C>,
    current: OmacKey<C>,
}

impl<C: BlockCipher> AcpkmKeys<C> {
    fn new(key: &Key, master_section: usize) -> Result<Self> {
        let iv = [0xff; MAX_TAG_LEN / 2];
        let iv = &iv[..C::Block::HALF_LEN];
        let mut master = Ctr::from_cipher(C::new(key), iv, master_section)?;
        let current = Self::derive(&mut master);
        Ok(Self { master, current })
    }

    fn derive(master: &mut Ctr<C>) -> OmacKey<C> {
        let mut material = [0u8; KEY_LEN + MAX_TAG_LEN];
        let material_len = KEY_LEN + C::BLOCK_LEN;
        master.keystream(&mut material[..material_len]);

        let mut key = [0u8; KEY_LEN];
        key.copy_from_slice(&material[..KEY_LEN]);
        let mut k1 = C::Block::zeroed();
        k1.as_mut().copy_from_slice(&material[KEY_LEN..material_len]);

        let derived = OmacKey {
            cipher: C::new(&key),
            k1,
        };

        key.zeroize();
        k1.zeroize();
        material.zeroize();

        derived
    }

    fn rotate(&mut self) {
        self.current = Self::derive(&mut self.master);
    }
}

/// OMAC with ACPKM section rekeying of the CBC key and the whitening keys
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct OmacAcpkm<C: BlockCipher> {
    /// Snapshot taken right after keying, used by `reset`
    initial: Option<AcpkmKeys<C>>,
    keys: Option<AcpkmKeys<C>>,
    chain: Chain<C::Block>,
    /// Bytes already run through the CBC chain
    processed: u64,
    section: usize,
    master_section: usize,
    mac_len: usize,
    finished: bool,
}

impl<C: BlockCipher> fmt::Debug for OmacAcpkm<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OmacAcpkm")
            .field("algorithm", &C::ALGORITHM)
            .field("keyed", &self.keys.is_some())
            .field("section", &self.section)
            .field("master_section", &self.master_section)
            .field("processed", &self.processed)
            .field("mac_len", &self.mac_len)
            .finish_non_exhaustive()
    }
}

impl<C: BlockCipher> Default for OmacAcpkm<C> {
    fn default() -> Self {
        let limits = Limits::new(C::ALGORITHM);
        Self {
            initial: None,
            keys: None,
            chain: Chain::new(),
            processed: 0,
            section: limits.omac_section(),
            master_section: limits.omac_master_section(),
            mac_len: limits.mac_len(),
            finished: false,
        }
    }
}

impl<C: BlockCipher> OmacAcpkm<C> {
    /// `section` is `N`, the CBC bytes per section key; `master_section` is `T*`
    pub fn new(key: &Key, section: usize, master_section: usize) -> Result<Self> {
        let mut mac = Self::default();
        mac.set_sections(section, master_section)?;
        mac.set_key(key)?;
        Ok(mac)
    }

    pub fn with_limits(key: &Key, limits: &Limits) -> Result<Self> {
        limits.ensure_algorithm(C::ALGORITHM)?;
        let mut mac = Self::new(key, limits.omac_section(), limits.omac_master_section())?;
        mac.set_mac_size(limits.mac_len())?;
        Ok(mac)
    }

    /// Changes `N` and `T*`; the next [`OmacAcpkm::set_key`] picks up the new master section
    pub fn set_sections(&mut self, section: usize, master_section: usize) -> Result {
        let section = Limits::check_omac_section(C::ALGORITHM, section)?;
        let master_section = Limits::check_omac_section(C::ALGORITHM, master_section)?;
        self.section = section;
        self.master_section = master_section;
        Ok(())
    }

    pub fn set_key(&mut self, key: &Key) -> Result {
        let keys = AcpkmKeys::new(key, self.master_section)?;
        self.initial = Some(keys.clone());
        self.keys = Some(keys);
        self.restart();
        Ok(())
    }

    pub fn set_mac_size(&mut self, size: usize) -> Result {
        self.mac_len = Limits::check_mac_len(C::ALGORITHM, size)?;
        Ok(())
    }

    #[inline]
    pub fn mac_size(&self) -> usize {
        self.mac_len
    }

    /// Restarts from the first section key
    pub fn reset(&mut self) {
        self.keys.clone_from(&self.initial);
        self.restart();
    }

    fn restart(&mut self) {
        self.chain.zeroize();
        self.chain = Chain::new();
        self.processed = 0;
        self.finished = false;
    }

    fn ensure_ready(&self) -> Result {
        if self.finished {
            return Err(Kind::BadOrder.err());
        }
        if self.keys.is_none() {
            return Err(Kind::MacKeyNotSet.err());
        }
        Ok(())
    }

    pub fn update(&mut self, data: &[u8]) -> Result {
        self.ensure_ready()?;
        let Self {
            keys,
            chain,
            processed,
            section,
            ..
        } = self;
        let keys = keys.as_mut().ok_or_else(|| Kind::MacKeyNotSet.err())?;
        let section = *section as u64;

        chain.update(data, |state, block| {
            Self::before_block(keys, processed, section);
            *state = state.xor(block);
            keys.current.cipher.encrypt_block(state);
        });

        Ok(())
    }

    pub fn finish(&mut self) -> Result<Tag> {
        self.ensure_ready()?;
        let section = self.section as u64;
        let keys = self
            .keys
            .as_mut()
            .ok_or_else(|| Kind::MacKeyNotSet.err())?;

        Self::before_block(keys, &mut self.processed, section);

        let mut last = self.chain.last_block(&keys.current.k1);
        let mut mac = self.chain.state.xor(&last);
        keys.current.cipher.encrypt_block(&mut mac);
        let tag = Tag::new(&mac.as_ref()[..self.mac_len]);

        last.zeroize();
        mac.zeroize();
        self.finished = true;

        Ok(tag)
    }

    pub fn verify(&mut self, expected: &[u8]) -> Result {
        let tag = self.finish()?;
        if !tag.verify(expected) {
            tracing::debug!(algorithm = ?C::ALGORITHM, "omac_acpkm_verify_failed");
            return Err(Kind::AuthenticationFailed.err());
        }
        Ok(())
    }

    #[inline]
    fn before_block(keys: &mut AcpkmKeys<C>, processed: &mut u64, section: u64) {
        if *processed > 0 && *processed % section == 0 {
            keys.rotate();
            tracing::debug!(
                algorithm = ?C::ALGORITHM,
                processed = *processed,
                "omac_acpkm_section_key"
            );
        }
        *processed += C::BLOCK_LEN as u64;
    }
}
