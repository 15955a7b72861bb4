// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! CryptoPro key wrapping (RFC 4357 §6.3, §6.4) and the GOST 28147-89 imitation MAC.
//!
//! A wrapped key is `ukm || ECB_K'(cek) || imit_K'(ukm, cek)` where `K'` is the KEK diversified
//! by the UKM and the imitation chain starts from the UKM.

use crate::{
    block::{xor_in_place, Block},
    cipher::{gost89, Algorithm, BlockCipher, Gost89, Key, ParamSet, KEY_LEN},
    config::Limits,
    error::{Kind, Result},
    mac::Tag,
};
use s2n_codec::{DecoderBuffer, Encoder, EncoderBuffer};
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, Zeroizing};

pub const UKM_LEN: usize = 8;
pub const IMIT_LEN: usize = 4;
pub const WRAPPED_LEN: usize = UKM_LEN + KEY_LEN + IMIT_LEN;

pub type Ukm = [u8; UKM_LEN];

type ImitBlock = [u8; gost89::BLOCK_LEN];

/// Computes the first `len` bytes of the GOST 28147-89 imitation MAC of `data`
pub fn imit(cipher: &Gost89, data: &[u8], len: usize) -> Result<Tag> {
    let len = Limits::check_mac_len(Algorithm::Gost89, len)?;
    let mut state = imit_state(cipher, &ImitBlock::zeroed(), data);
    let tag = Tag::new(&state[..len]);
    state.zeroize();
    Ok(tag)
}

/// Runs the imitation chain over `data` starting from `iv`
fn imit_state(cipher: &Gost89, iv: &ImitBlock, data: &[u8]) -> ImitBlock {
    let mut state = *iv;
    let mut blocks = 0usize;

    for chunk in data.chunks(gost89::BLOCK_LEN) {
        let mut block = ImitBlock::load_padded(chunk);
        cipher.imit_step(&mut state, &block);
        block.zeroize();
        blocks += 1;
    }

    // a single block is followed by a block of zeros
    if blocks == 1 {
        cipher.imit_step(&mut state, &ImitBlock::zeroed());
    }

    state
}

/// CryptoPro KEK diversification
pub fn diversify(kek: &Key, ukm: &Ukm, param_set: ParamSet) -> Key {
    let mut key = *kek;

    for bits in ukm {
        let mut s1 = 0u32;
        let mut s2 = 0u32;
        for (j, word) in key.chunks_exact(4).enumerate() {
            let word = u32::from_le_bytes([word[0], word[1], word[2], word[3]]);
            if (bits >> j) & 1 == 1 {
                s1 = s1.wrapping_add(word);
            } else {
                s2 = s2.wrapping_add(word);
            }
        }

        let mut iv = ImitBlock::zeroed();
        iv[..4].copy_from_slice(&s1.to_le_bytes());
        iv[4..].copy_from_slice(&s2.to_le_bytes());

        // CFB over the current key under itself
        let cipher = Gost89::with_param_set(&key, param_set);
        for chunk in key.chunks_exact_mut(gost89::BLOCK_LEN) {
            cipher.encrypt_block(&mut iv);
            xor_in_place(chunk, &iv);
            iv.copy_from_slice(chunk);
        }

        iv.zeroize();
        s1.zeroize();
        s2.zeroize();
    }

    key
}

/// Wraps `cek` under `kek` diversified by `ukm`
pub fn wrap(param_set: ParamSet, kek: &Key, ukm: &Ukm, cek: &Key) -> [u8; WRAPPED_LEN] {
    let mut kek = diversify(kek, ukm, param_set);
    let cipher = Gost89::with_param_set(&kek, param_set);
    kek.zeroize();

    let mut encrypted = *cek;
    for chunk in encrypted.chunks_exact_mut(gost89::BLOCK_LEN) {
        let mut block = ImitBlock::load_padded(chunk);
        cipher.encrypt_block(&mut block);
        chunk.copy_from_slice(&block);
        block.zeroize();
    }
    let mut mac = imit_state(&cipher, ukm, cek);

    let mut wrapped = [0u8; WRAPPED_LEN];
    {
        let mut encoder = EncoderBuffer::new(&mut wrapped);
        encoder.write_slice(ukm);
        encoder.write_slice(&encrypted);
        encoder.write_slice(&mac[..IMIT_LEN]);
    }

    mac.zeroize();
    encrypted.zeroize();
    wrapped
}

/// Recovers the key from a `ukm || ciphertext || imit` record produced by [`wrap`]
pub fn unwrap(param_set: ParamSet, kek: &Key, wrapped: &[u8]) -> Result<Zeroizing<Key>> {
    if wrapped.len() != WRAPPED_LEN {
        return Err(Kind::InvalidLength {
            expected: WRAPPED_LEN,
            actual: wrapped.len(),
        }
        .err());
    }

    let malformed = |_| {
        Kind::InvalidLength {
            expected: WRAPPED_LEN,
            actual: wrapped.len(),
        }
        .err()
    };
    let buffer = DecoderBuffer::new(wrapped);
    let (ukm, buffer) = buffer.decode_slice(UKM_LEN).map_err(malformed)?;
    let (encrypted, buffer) = buffer.decode_slice(KEY_LEN).map_err(malformed)?;
    let (received, _) = buffer.decode_slice(IMIT_LEN).map_err(malformed)?;

    let mut ukm_bytes = Ukm::default();
    ukm_bytes.copy_from_slice(ukm.into_less_safe_slice());

    let mut kek = diversify(kek, &ukm_bytes, param_set);
    let cipher = Gost89::with_param_set(&kek, param_set);
    kek.zeroize();

    let mut cek = Zeroizing::new([0u8; KEY_LEN]);
    cek.copy_from_slice(encrypted.into_less_safe_slice());
    for chunk in cek.chunks_exact_mut(gost89::BLOCK_LEN) {
        let mut block = ImitBlock::load_padded(chunk);
        cipher.decrypt_block(&mut block);
        chunk.copy_from_slice(&block);
        block.zeroize();
    }

    let mut mac = imit_state(&cipher, &ukm_bytes, &cek[..]);
    let valid: bool = mac[..IMIT_LEN]
        .ct_eq(received.into_less_safe_slice())
        .into();
    mac.zeroize();

    if !valid {
        tracing::debug!(param_set = ?param_set, "key_unwrap_bad_mac");
        return Err(Kind::BadMac.err());
    }

    Ok(cek)
}
