// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use crate::{
    cipher::{BlockCipher, Key},
    config::Limits,
    error::{Kind, Result},
    mac::Tag,
    mgm::Mgm,
};
use core::fmt;
use zeroize::Zeroize;

/// One-shot authenticated encryption with a reusable key
pub trait Aead {
    type Nonce;

    fn encrypt(&self, nonce: &Self::Nonce, aad: &[u8], payload: &mut [u8]) -> Result<Tag>;

    /// Opens `payload` in place; on authentication failure the payload is zeroed
    fn decrypt(&self, nonce: &Self::Nonce, aad: &[u8], payload: &mut [u8], tag: &[u8])
        -> Result;
}

/// An MGM key with its expanded schedule and tag length
#[derive(Clone)]
pub struct MgmKey<C: BlockCipher> {
    mgm: Mgm<C>,
}

impl<C: BlockCipher> fmt::Debug for MgmKey<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MgmKey")
            .field("algorithm", &C::ALGORITHM)
            .field("tag_len", &self.mgm.tag_len())
            .finish_non_exhaustive()
    }
}

impl<C: BlockCipher> MgmKey<C> {
    pub fn new(key: &Key) -> Self {
        Self { mgm: Mgm::new(key) }
    }

    pub fn with_limits(key: &Key, limits: &Limits) -> Result<Self> {
        Ok(Self {
            mgm: Mgm::with_limits(key, limits)?,
        })
    }

    #[inline]
    pub fn tag_len(&self) -> usize {
        self.mgm.tag_len()
    }
}

impl<C: BlockCipher> Aead for MgmKey<C> {
    type Nonce = C::Block;

    #[inline]
    fn encrypt(&self, nonce: &C::Block, aad: &[u8], payload: &mut [u8]) -> Result<Tag> {
        let mut mgm = self.mgm.clone();
        mgm.set_iv(nonce.as_ref())?;
        mgm.update_aad(aad)?;
        mgm.encrypt(payload)?;
        mgm.finish()
    }

    #[inline]
    fn decrypt(&self, nonce: &C::Block, aad: &[u8], payload: &mut [u8], tag: &[u8]) -> Result {
        // only the configured length is accepted here
        if tag.len() != self.tag_len() {
            return Err(Kind::InvalidTagLength {
                len: tag.len(),
                max: C::BLOCK_LEN,
            }
            .err());
        }

        let mut mgm = self.mgm.clone();
        mgm.set_iv(nonce.as_ref())?;
        mgm.update_aad(aad)?;
        mgm.decrypt(payload)?;

        let result = mgm.verify(tag);
        if result.is_err() {
            payload.zeroize();
        }
        result
    }
}
