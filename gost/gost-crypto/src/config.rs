// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use crate::{
    cipher::Algorithm,
    error::{Kind, Result},
};

/// Per-context tunables with the recommended defaults for each cipher
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Limits {
    pub(crate) algorithm: Algorithm,
    pub(crate) tag_len: usize,
    pub(crate) mac_len: usize,
    pub(crate) ctr_section: usize,
    pub(crate) omac_section: usize,
    pub(crate) omac_master_section: usize,
    pub(crate) kdf_counter_len: usize,
}

macro_rules! setter {
    ($name:ident, $field:ident, $check:ident) => {
        pub fn $name(mut self, value: usize) -> Result<Self> {
            self.$field = Self::$check(self.algorithm, value)?;
            Ok(self)
        }
    };
}

impl Limits {
    pub const fn new(algorithm: Algorithm) -> Self {
        let block_len = algorithm.block_len();
        let ctr_section = match algorithm {
            Algorithm::Kuznyechik => 4096,
            Algorithm::Magma | Algorithm::Gost89 => 1024,
        };
        Self {
            algorithm,
            tag_len: block_len,
            mac_len: block_len,
            ctr_section,
            omac_section: ctr_section,
            // 16 derivations of `key || K1` per master section
            omac_master_section: 16 * (algorithm.key_len() + block_len),
            kdf_counter_len: 1,
        }
    }

    setter!(with_tag_len, tag_len, check_tag_len);
    setter!(with_mac_len, mac_len, check_mac_len);
    setter!(with_ctr_section, ctr_section, check_ctr_section);
    setter!(with_omac_section, omac_section, check_omac_section);
    setter!(
        with_omac_master_section,
        omac_master_section,
        check_omac_section
    );
    setter!(with_kdf_counter_len, kdf_counter_len, check_kdf_counter_len);

    #[inline]
    pub const fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    #[inline]
    pub const fn tag_len(&self) -> usize {
        self.tag_len
    }

    #[inline]
    pub const fn mac_len(&self) -> usize {
        self.mac_len
    }

    #[inline]
    pub const fn ctr_section(&self) -> usize {
        self.ctr_section
    }

    #[inline]
    pub const fn omac_section(&self) -> usize {
        self.omac_section
    }

    #[inline]
    pub const fn omac_master_section(&self) -> usize {
        self.omac_master_section
    }

    #[inline]
    pub const fn kdf_counter_len(&self) -> usize {
        self.kdf_counter_len
    }

    /// Fails unless these limits were built for `algorithm`
    #[inline]
    pub(crate) fn ensure_algorithm(&self, algorithm: Algorithm) -> Result {
        if self.algorithm != algorithm {
            return Err(Kind::UnsupportedAlgorithm { algorithm }.err());
        }
        Ok(())
    }

    pub(crate) fn check_tag_len(algorithm: Algorithm, len: usize) -> Result<usize> {
        let max = algorithm.block_len();
        if !(1..=max).contains(&len) {
            return Err(Kind::InvalidTagLength { len, max }.err());
        }
        Ok(len)
    }

    pub(crate) fn check_mac_len(algorithm: Algorithm, size: usize) -> Result<usize> {
        let max = algorithm.mac_len();
        if !(1..=max).contains(&size) {
            return Err(Kind::InvalidMacSize { size, max }.err());
        }
        Ok(size)
    }

    /// Zero disables meshing
    pub(crate) fn check_ctr_section(algorithm: Algorithm, size: usize) -> Result<usize> {
        let block_len = algorithm.block_len();
        if size % block_len != 0 {
            return Err(Kind::InvalidSectionSize { size, block_len }.err());
        }
        Ok(size)
    }

    pub(crate) fn check_omac_section(algorithm: Algorithm, size: usize) -> Result<usize> {
        let block_len = algorithm.block_len();
        if size == 0 || size % block_len != 0 {
            return Err(Kind::InvalidSectionSize { size, block_len }.err());
        }
        Ok(size)
    }

    pub(crate) fn check_kdf_counter_len(_algorithm: Algorithm, len: usize) -> Result<usize> {
        crate::kdf::check_counter_len(len)?;
        Ok(len)
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self::new(Algorithm::Kuznyechik)
    }
}

#[cfg(test)]
mod tests;
