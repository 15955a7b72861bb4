// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use super::{
    feistel::{self, expand, ExpandedSbox, Sbox, TC26_Z_EXPANDED},
    Algorithm, BlockCipher, Key,
};
use core::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

pub const BLOCK_LEN: usize = 8;

/// Substitution tables defined for GOST 28147-89
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ParamSet {
    /// `id-GostR3411-94-TestParamSet`
    Test,
    /// `id-Gost28147-89-CryptoPro-A-ParamSet`
    #[default]
    CryptoProA,
    /// `id-Gost28147-89-CryptoPro-B-ParamSet`
    CryptoProB,
    /// `id-Gost28147-89-CryptoPro-C-ParamSet`
    CryptoProC,
    /// `id-Gost28147-89-CryptoPro-D-ParamSet`
    CryptoProD,
    /// `id-tc26-gost-28147-param-Z`
    Tc26Z,
}

impl ParamSet {
    pub const ALL: [Self; 6] = [
        Self::Test,
        Self::CryptoProA,
        Self::CryptoProB,
        Self::CryptoProC,
        Self::CryptoProD,
        Self::Tc26Z,
    ];

    pub const fn oid(self) -> &'static str {
        match self {
            Self::Test => "1.2.643.2.2.31.0",
            Self::CryptoProA => "1.2.643.2.2.31.1",
            Self::CryptoProB => "1.2.643.2.2.31.2",
            Self::CryptoProC => "1.2.643.2.2.31.3",
            Self::CryptoProD => "1.2.643.2.2.31.4",
            Self::Tc26Z => "1.2.643.7.1.2.5.1.1",
        }
    }

    pub fn from_oid(oid: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|set| set.oid() == oid)
    }

    #[inline]
    fn sbox(self) -> &'static ExpandedSbox {
        match self {
            Self::Test => &TEST_EXPANDED,
            Self::CryptoProA => &CRYPTO_PRO_A_EXPANDED,
            Self::CryptoProB => &CRYPTO_PRO_B_EXPANDED,
            Self::CryptoProC => &CRYPTO_PRO_C_EXPANDED,
            Self::CryptoProD => &CRYPTO_PRO_D_EXPANDED,
            Self::Tc26Z => &TC26_Z_EXPANDED,
        }
    }
}

/// GOST 28147-89 in the byte order used by CryptoPro key transport structures.
///
/// This is the Magma network with little-endian key words and block halves and the
/// output halves swapped, so `Magma(K, P) == rev(Gost89[Tc26Z](K', rev(P)))` where
/// `K'` byte-reverses every 4-byte key word.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Gost89 {
    key: [u32; 8],
    #[zeroize(skip)]
    param_set: ParamSet,
}

impl fmt::Debug for Gost89 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gost89")
            .field("param_set", &self.param_set)
            .finish_non_exhaustive()
    }
}

impl Gost89 {
    #[inline]
    pub fn with_param_set(key: &Key, param_set: ParamSet) -> Self {
        Self {
            key: load_key(key),
            param_set,
        }
    }

    #[inline]
    pub fn param_set(&self) -> ParamSet {
        self.param_set
    }

    /// Folds `block` into the imitation state with 16 rounds
    #[inline]
    pub(crate) fn imit_step(&self, state: &mut [u8; BLOCK_LEN], block: &[u8; BLOCK_LEN]) {
        for (s, b) in state.iter_mut().zip(block) {
            *s ^= b;
        }
        let (a1, a0) = split(state);
        let (a1, a0) = feistel::mac_rounds(self.param_set.sbox(), &self.key, a1, a0);
        state[..4].copy_from_slice(&a0.to_le_bytes());
        state[4..].copy_from_slice(&a1.to_le_bytes());
    }
}

#[inline]
fn load_key(key: &Key) -> [u32; 8] {
    let mut words = [0u32; 8];
    for (word, chunk) in words.iter_mut().zip(key.chunks_exact(4)) {
        *word = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    words
}

#[inline]
fn split(block: &[u8; BLOCK_LEN]) -> (u32, u32) {
    let a0 = u32::from_le_bytes([block[0], block[1], block[2], block[3]]);
    let a1 = u32::from_le_bytes([block[4], block[5], block[6], block[7]]);
    (a1, a0)
}

#[inline]
fn join(block: &mut [u8; BLOCK_LEN], (a1, a0): (u32, u32)) {
    block[..4].copy_from_slice(&a1.to_le_bytes());
    block[4..].copy_from_slice(&a0.to_le_bytes());
}

impl BlockCipher for Gost89 {
    type Block = [u8; BLOCK_LEN];

    const ALGORITHM: Algorithm = Algorithm::Gost89;

    #[inline]
    fn new(key: &Key) -> Self {
        Self::with_param_set(key, ParamSet::default())
    }

    #[inline]
    fn set_key(&mut self, key: &Key) {
        self.key = load_key(key);
    }

    #[inline]
    fn encrypt_block(&self, block: &mut Self::Block) {
        let (a1, a0) = split(block);
        join(
            block,
            feistel::encrypt(self.param_set.sbox(), &self.key, a1, a0),
        );
    }

    #[inline]
    fn decrypt_block(&self, block: &mut Self::Block) {
        let (a1, a0) = split(block);
        join(
            block,
            feistel::decrypt(self.param_set.sbox(), &self.key, a1, a0),
        );
    }
}

const TEST: Sbox = [
    [4, 10, 9, 2, 13, 8, 0, 14, 6, 11, 1, 12, 7, 15, 5, 3],
    [14, 11, 4, 12, 6, 13, 15, 10, 2, 3, 8, 1, 0, 7, 5, 9],
    [5, 8, 1, 13, 10, 3, 4, 2, 14, 15, 12, 7, 6, 0, 9, 11],
    [7, 13, 10, 1, 0, 8, 9, 15, 14, 4, 6, 12, 11, 2, 5, 3],
    [6, 12, 7, 1, 5, 15, 13, 8, 4, 10, 9, 14, 0, 3, 11, 2],
    [4, 11, 10, 0, 7, 2, 1, 13, 3, 6, 8, 5, 9, 12, 15, 14],
    [13, 11, 4, 1, 3, 15, 5, 9, 0, 10, 14, 7, 6, 8, 2, 12],
    [1, 15, 13, 0, 5, 7, 10, 4, 9, 2, 3, 14, 6, 11, 8, 12],
];

const CRYPTO_PRO_A: Sbox = [
    [9, 6, 3, 2, 8, 11, 1, 7, 10, 4, 14, 15, 12, 0, 13, 5],
    [3, 7, 14, 9, 8, 10, 15, 0, 5, 2, 6, 12, 11, 4, 13, 1],
    [14, 4, 6, 2, 11, 3, 13, 8, 12, 15, 5, 10, 0, 7, 1, 9],
    [14, 7, 10, 12, 13, 1, 3, 9, 0, 2, 11, 4, 15, 8, 5, 6],
    [11, 5, 1, 9, 8, 13, 15, 0, 14, 4, 2, 3, 12, 7, 10, 6],
    [3, 10, 13, 12, 1, 2, 0, 11, 7, 5, 9, 4, 8, 15, 14, 6],
    [1, 13, 2, 9, 7, 10, 6, 0, 8, 12, 4, 5, 15, 3, 11, 14],
    [11, 10, 15, 5, 0, 12, 14, 8, 6, 2, 3, 9, 1, 7, 13, 4],
];

const CRYPTO_PRO_B: Sbox = [
    [8, 4, 11, 1, 3, 5, 0, 9, 2, 14, 10, 12, 13, 6, 7, 15],
    [0, 1, 2, 10, 4, 13, 5, 12, 9, 7, 3, 15, 11, 8, 6, 14],
    [14, 12, 0, 10, 9, 2, 13, 11, 7, 5, 8, 15, 3, 6, 1, 4],
    [7, 5, 0, 13, 11, 6, 1, 2, 3, 10, 12, 15, 4, 14, 9, 8],
    [2, 7, 12, 15, 9, 5, 10, 11, 1, 4, 0, 13, 6, 8, 14, 3],
    [8, 3, 2, 6, 4, 13, 14, 11, 12, 1, 7, 15, 10, 0, 9, 5],
    [5, 2, 10, 11, 9, 1, 12, 3, 7, 4, 13, 0, 6, 15, 8, 14],
    [0, 4, 11, 14, 8, 3, 7, 1, 10, 2, 9, 6, 15, 13, 5, 12],
];

const CRYPTO_PRO_C: Sbox = [
    [1, 11, 12, 2, 9, 13, 0, 15, 4, 5, 8, 14, 10, 7, 6, 3],
    [0, 1, 7, 13, 11, 4, 5, 2, 8, 14, 15, 12, 9, 10, 6, 3],
    [8, 2, 5, 0, 4, 9, 15, 10, 3, 7, 12, 13, 6, 14, 1, 11],
    [3, 6, 0, 1, 5, 13, 10, 8, 11, 2, 9, 7, 14, 15, 12, 4],
    [8, 13, 11, 0, 4, 5, 1, 2, 9, 3, 12, 14, 6, 15, 10, 7],
    [12, 9, 11, 1, 8, 14, 2, 4, 7, 3, 6, 5, 10, 0, 15, 13],
    [10, 9, 6, 8, 13, 14, 2, 0, 15, 3, 5, 11, 4, 1, 12, 7],
    [7, 4, 0, 5, 10, 2, 15, 14, 12, 6, 1, 11, 13, 9, 3, 8],
];

const CRYPTO_PRO_D: Sbox = [
    [10, 4, 5, 6, 8, 1, 3, 7, 13, 12, 14, 0, 9, 2, 11, 15],
    [5, 15, 4, 0, 2, 13, 11, 9, 1, 7, 6, 3, 12, 14, 10, 8],
    [7, 15, 12, 14, 9, 4, 1, 0, 3, 11, 5, 2, 6, 10, 8, 13],
    [4, 10, 7, 12, 0, 15, 2, 8, 14, 1, 6, 5, 13, 11, 9, 3],
    [7, 6, 4, 11, 9, 12, 2, 10, 1, 8, 0, 14, 15, 13, 3, 5],
    [7, 6, 2, 4, 13, 9, 15, 0, 10, 1, 5, 11, 8, 14, 12, 3],
    [13, 14, 4, 1, 7, 0, 5, 10, 3, 12, 8, 15, 6, 2, 9, 11],
    [1, 3, 10, 9, 5, 11, 4, 15, 8, 6, 7, 14, 13, 0, 2, 12],
];

static TEST_EXPANDED: ExpandedSbox = expand(&TEST);
static CRYPTO_PRO_A_EXPANDED: ExpandedSbox = expand(&CRYPTO_PRO_A);
static CRYPTO_PRO_B_EXPANDED: ExpandedSbox = expand(&CRYPTO_PRO_B);
static CRYPTO_PRO_C_EXPANDED: ExpandedSbox = expand(&CRYPTO_PRO_C);
static CRYPTO_PRO_D_EXPANDED: ExpandedSbox = expand(&CRYPTO_PRO_D);

