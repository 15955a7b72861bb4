// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use crate::{
    block::Block,
    error::{Kind, Result},
};
use zeroize::Zeroize;

mod feistel;
pub mod gost89;
pub mod kuznyechik;
pub mod magma;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use gost89::{Gost89, ParamSet};
pub use kuznyechik::Kuznyechik;
pub use magma::Magma;

pub const KEY_LEN: usize = 32;

pub type Key = [u8; KEY_LEN];

/// The block ciphers this crate can drive
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Algorithm {
    /// GOST R 34.12-2015, 64-bit block
    Magma,
    /// GOST R 34.12-2015, 128-bit block
    Kuznyechik,
    /// GOST 28147-89 with a CryptoPro/TC26 parameter set
    Gost89,
}

impl Algorithm {
    #[inline]
    pub const fn block_len(self) -> usize {
        match self {
            Self::Kuznyechik => 16,
            Self::Magma | Self::Gost89 => 8,
        }
    }

    /// Length of the IV used by CTR based modes and key export
    #[inline]
    pub const fn half_block_len(self) -> usize {
        self.block_len() / 2
    }

    #[inline]
    pub const fn key_len(self) -> usize {
        KEY_LEN
    }

    /// Natural MAC length of OMAC over this cipher
    #[inline]
    pub const fn mac_len(self) -> usize {
        self.block_len()
    }
}

pub trait BlockCipher: Clone + Send + Sync + Zeroize {
    type Block: Block;

    const ALGORITHM: Algorithm;
    const BLOCK_LEN: usize = <Self::Block as Block>::LEN;

    fn new(key: &Key) -> Self;

    /// Re-expands the round keys from `key`, keeping any non-key parameters
    fn set_key(&mut self, key: &Key);

    fn encrypt_block(&self, block: &mut Self::Block);

    fn decrypt_block(&self, block: &mut Self::Block);

    #[inline]
    fn new_from_slice(key: &[u8]) -> Result<Self> {
        let key: &Key = key.try_into().map_err(|_| {
            Kind::InvalidLength {
                expected: KEY_LEN,
                actual: key.len(),
            }
            .err()
        })?;
        Ok(Self::new(key))
    }

    #[inline]
    fn encrypt_copy(&self, block: &Self::Block) -> Self::Block {
        let mut block = *block;
        self.encrypt_block(&mut block);
        block
    }
}
