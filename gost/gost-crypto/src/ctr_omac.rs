// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! CTR-ACPKM encryption authenticated with OMAC over the plaintext.
//!
//! The session key is split with `KDF_TREE(K, "kdf tree", seed)` into an encryption key and
//! a MAC key. The MAC is encrypted with the keystream that follows the payload and returned
//! as the tag.

use crate::{
    cipher::{BlockCipher, Key, KEY_LEN},
    config::Limits,
    ctr::Ctr,
    error::{Kind, Result},
    kdf,
    mac::{Omac, Tag, MAX_TAG_LEN},
};
use core::fmt;
use zeroize::Zeroize;

pub const SEED_LEN: usize = 8;

const KDF_LABEL: &[u8] = b"kdf tree";

#[derive(Clone)]
pub struct CtrAcpkmOmac<C: BlockCipher> {
    ctr: Ctr<C>,
    omac: Omac<C>,
    finished: bool,
}

impl<C: BlockCipher> fmt::Debug for CtrAcpkmOmac<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CtrAcpkmOmac")
            .field("algorithm", &C::ALGORITHM)
            .field("section", &self.ctr.section())
            .field("mac_len", &self.omac.mac_size())
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

impl<C: BlockCipher> CtrAcpkmOmac<C> {
    /// Derives both keys from `key` and `seed`; `iv` is half a block
    pub fn new(key: &Key, seed: &[u8], iv: &[u8], section: usize) -> Result<Self> {
        Self::derive(key, seed, iv, section, 1)
    }

    pub fn with_limits(key: &Key, seed: &[u8], iv: &[u8], limits: &Limits) -> Result<Self> {
        limits.ensure_algorithm(C::ALGORITHM)?;
        let mut mode = Self::derive(
            key,
            seed,
            iv,
            limits.ctr_section(),
            limits.kdf_counter_len(),
        )?;
        mode.omac.set_mac_size(limits.mac_len())?;
        Ok(mode)
    }

    fn derive(
        key: &Key,
        seed: &[u8],
        iv: &[u8],
        section: usize,
        counter_len: usize,
    ) -> Result<Self> {
        if seed.len() != SEED_LEN {
            return Err(Kind::InvalidLength {
                expected: SEED_LEN,
                actual: seed.len(),
            }
            .err());
        }

        let mut keys = [0u8; 2 * KEY_LEN];
        kdf::kdftree2012_256(key, KDF_LABEL, seed, counter_len, &mut keys)?;

        let mut cipher_key = Key::default();
        let mut mac_key = Key::default();
        cipher_key.copy_from_slice(&keys[..KEY_LEN]);
        mac_key.copy_from_slice(&keys[KEY_LEN..]);
        keys.zeroize();

        let ctr = Ctr::from_cipher(C::new(&cipher_key), iv, section);
        let omac = Omac::new(&mac_key);
        cipher_key.zeroize();
        mac_key.zeroize();

        Ok(Self {
            ctr: ctr?,
            omac,
            finished: false,
        })
    }

    #[inline]
    pub fn mac_size(&self) -> usize {
        self.omac.mac_size()
    }

    pub fn set_mac_size(&mut self, size: usize) -> Result {
        self.omac.set_mac_size(size)
    }

    /// Authenticates then encrypts `data` in place
    pub fn encrypt(&mut self, data: &mut [u8]) -> Result {
        self.ensure_open()?;
        self.omac.update(data)?;
        self.ctr.apply_keystream(data);
        Ok(())
    }

    /// Decrypts `data` in place; the plaintext is provisional until [`Self::verify`] succeeds
    pub fn decrypt(&mut self, data: &mut [u8]) -> Result {
        self.ensure_open()?;
        self.ctr.apply_keystream(data);
        self.omac.update(data)
    }

    /// Returns the encrypted MAC
    pub fn finish(&mut self) -> Result<Tag> {
        self.ensure_open()?;
        let mut mac = self.omac.finish()?;
        self.finished = true;

        let mut buffer = [0u8; MAX_TAG_LEN];
        let buffer = &mut buffer[..mac.len()];
        buffer.copy_from_slice(mac.as_ref());
        mac.zeroize();

        self.ctr.apply_keystream(buffer);
        let tag = Tag::new(buffer);
        buffer.zeroize();
        Ok(tag)
    }

    pub fn verify(&mut self, expected: &[u8]) -> Result {
        let tag = self.finish()?;
        if !tag.verify(expected) {
            tracing::debug!(algorithm = ?C::ALGORITHM, "ctr_omac_verify_failed");
            return Err(Kind::AuthenticationFailed.err());
        }
        Ok(())
    }

    #[inline]
    fn ensure_open(&self) -> Result {
        if self.finished {
            return Err(Kind::BadOrder.err());
        }
        Ok(())
    }
}
