// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Key derivation: KDF_TREE_GOSTR3411_2012_256 (R 50.1.113-2016) and the TLSTREE
//! per-record cascade (R 1323565.1.043-2022).

use crate::{
    cipher::{Algorithm, BlockCipher, Key, KEY_LEN},
    error::{Kind, Result},
};
use core::fmt;
use hmac::{Hmac, Mac};
use s2n_codec::{Encoder, EncoderBuffer};
use streebog::Streebog256;
use zeroize::{Zeroize, ZeroizeOnDrop};

type HmacStreebog256 = Hmac<Streebog256>;

/// Output length of a single HMAC-Streebog256 iteration
pub const BLOCK_LEN: usize = 32;

const TLSTREE_LABELS: [&[u8]; 3] = [b"level1", b"level2", b"level3"];

/// Fills `out` with `KDF_TREE(key, label, seed)` using a `counter_len`-byte iteration counter.
///
/// Each 32-byte block is `HMAC(key, i || label || 0x00 || seed || L)` where `i` counts from
/// one and `L` is the output length in bits with leading zero bytes removed.
pub fn kdftree2012_256(
    key: &[u8],
    label: &[u8],
    seed: &[u8],
    counter_len: usize,
    out: &mut [u8],
) -> Result {
    check_counter_len(counter_len)?;

    if out.is_empty() || out.len() % BLOCK_LEN != 0 {
        return Err(Kind::InternalError {
            reason: "KDF output must be a nonzero multiple of 32 bytes",
        }
        .err());
    }

    let iterations = (out.len() / BLOCK_LEN) as u64;
    let max = (1u64 << (8 * counter_len)) - 1;
    if iterations > max {
        return Err(Kind::InternalError {
            reason: "the KDF counter cannot represent the output length",
        }
        .err());
    }

    let bits = (out.len() as u64 * 8).to_be_bytes();
    let leading_zeros = bits.iter().take_while(|b| **b == 0).count();
    let bits = &bits[leading_zeros..];

    let keyed = HmacStreebog256::new_from_slice(key).map_err(|_| {
        Kind::InternalError {
            reason: "HMAC rejected the key",
        }
        .err()
    })?;

    for (i, chunk) in out.chunks_exact_mut(BLOCK_LEN).enumerate() {
        let counter = (i as u32 + 1).to_be_bytes();

        let mut mac = keyed.clone();
        mac.update(&counter[4 - counter_len..]);
        mac.update(label);
        mac.update(&[0]);
        mac.update(seed);
        mac.update(bits);

        let mut block = mac.finalize().into_bytes();
        chunk.copy_from_slice(&block);
        block.as_mut_slice().zeroize();
    }

    Ok(())
}

/// Counters are one to four bytes wide
pub(crate) fn check_counter_len(len: usize) -> Result {
    if !(1..=4).contains(&len) {
        return Err(Kind::InternalError {
            reason: "the KDF counter must be 1 to 4 bytes",
        }
        .err());
    }
    Ok(())
}

/// Derives the record key for `seq` from `root` in one shot
pub fn tlstree(algorithm: Algorithm, root: &Key, seq: u64) -> Result<Key> {
    let mut tree = TlsTree::new(algorithm, root)?;
    Ok(*tree.key(seq)?)
}

/// Sequence number masks `C1`, `C2`, `C3` of each cipher's TLSTREE profile
const fn masks(algorithm: Algorithm) -> Option<[u64; 3]> {
    match algorithm {
        Algorithm::Kuznyechik => Some([
            0xFFFF_FFFF_0000_0000,
            0xFFFF_FFFF_FFF8_0000,
            0xFFFF_FFFF_FFFF_FFC0,
        ]),
        Algorithm::Magma => Some([
            0xFFFF_FFC0_0000_0000,
            0xFFFF_FFFF_FE00_0000,
            0xFFFF_FFFF_FFFF_F000,
        ]),
        Algorithm::Gost89 => None,
    }
}

/// TLSTREE with the intermediate keys cached between records.
///
/// Consecutive sequence numbers usually share their upper levels, so only the levels whose
/// masked sequence number changed are recomputed.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct TlsTree {
    #[zeroize(skip)]
    algorithm: Algorithm,
    #[zeroize(skip)]
    masks: [u64; 3],
    root: Key,
    keys: [Key; 3],
    /// Masked sequence numbers `keys` were derived for
    #[zeroize(skip)]
    seeds: Option<[u64; 3]>,
}

impl fmt::Debug for TlsTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TlsTree")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

impl TlsTree {
    pub fn new(algorithm: Algorithm, root: &Key) -> Result<Self> {
        let masks = masks(algorithm).ok_or_else(|| Kind::UnsupportedAlgorithm { algorithm }.err())?;
        Ok(Self {
            algorithm,
            masks,
            root: *root,
            keys: [[0; KEY_LEN]; 3],
            seeds: None,
        })
    }

    #[inline]
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Returns the record key for `seq`
    pub fn key(&mut self, seq: u64) -> Result<&Key> {
        let seeds = self.masks.map(|mask| seq & mask);

        let first = match self.seeds {
            Some(prev) => prev.iter().zip(&seeds).position(|(a, b)| a != b),
            None => Some(0),
        };

        if let Some(first) = first {
            self.seeds = None;

            for (level, seed) in seeds.iter().enumerate().skip(first) {
                let mut encoded = [0u8; 8];
                EncoderBuffer::new(&mut encoded).encode(seed);

                let (parents, rest) = self.keys.split_at_mut(level);
                let parent = parents.last().unwrap_or(&self.root);
                kdftree2012_256(parent, TLSTREE_LABELS[level], &encoded, 1, &mut rest[0])?;

                tracing::debug!(algorithm = ?self.algorithm, level = level + 1, "tlstree_level_refresh");
            }

            self.seeds = Some(seeds);
        }

        Ok(&self.keys[2])
    }

    /// Returns a cipher keyed for record `seq`
    pub fn cipher<C: BlockCipher>(&mut self, seq: u64) -> Result<C> {
        if C::ALGORITHM != self.algorithm {
            return Err(Kind::UnsupportedAlgorithm {
                algorithm: C::ALGORITHM,
            }
            .err());
        }
        Ok(C::new(self.key(seq)?))
    }
}
