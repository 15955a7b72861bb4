// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! KExp15 / KImp15 key export (R 1323565.1.017-2018 §4.3).
//!
//! The record is `CTR_Kenc(iv)(shared_key || OMAC_Kmac(iv || shared_key))`. The IV is half a
//! block and forms the upper half of the initial counter.

use crate::{
    cipher::{BlockCipher, Key},
    ctr::Ctr,
    error::{Kind, Result},
    mac::{Omac, Tag},
};
use s2n_codec::{DecoderBuffer, Encoder, EncoderBuffer};
use zeroize::{Zeroize, Zeroizing};

/// Length of the record produced for a `shared_key_len`-byte key under `C`
#[inline]
pub const fn record_len<C: BlockCipher>(shared_key_len: usize) -> usize {
    shared_key_len + C::BLOCK_LEN
}

/// Exports `shared_key` under `cipher_key` and `mac_key`
pub fn kexp15<C: BlockCipher>(
    shared_key: &[u8],
    cipher_key: &Key,
    mac_key: &Key,
    iv: &[u8],
) -> Result<Vec<u8>> {
    let mut ctr = Ctr::<C>::new(cipher_key, iv)?;
    let mut mac = compute_mac::<C>(mac_key, iv, shared_key)?;

    let mut record = vec![0u8; record_len::<C>(shared_key.len())];
    {
        let mut encoder = EncoderBuffer::new(&mut record);
        encoder.write_slice(shared_key);
        encoder.write_slice(mac.as_ref());
    }
    mac.zeroize();

    ctr.apply_keystream(&mut record);

    Ok(record)
}

/// Recovers the shared key from a KExp15 `record`.
///
/// Fails with `BadMac` when the record was not produced under the same keys and IV.
pub fn kimp15<C: BlockCipher>(
    record: &[u8],
    cipher_key: &Key,
    mac_key: &Key,
    iv: &[u8],
) -> Result<Zeroizing<Vec<u8>>> {
    if record.len() < C::BLOCK_LEN {
        return Err(Kind::InvalidLength {
            expected: C::BLOCK_LEN,
            actual: record.len(),
        }
        .err());
    }

    let mut ctr = Ctr::<C>::new(cipher_key, iv)?;
    let mut plaintext = Zeroizing::new(record.to_vec());
    ctr.apply_keystream(&mut plaintext);

    let malformed = |_| {
        Kind::InvalidLength {
            expected: C::BLOCK_LEN,
            actual: record.len(),
        }
        .err()
    };
    let buffer = DecoderBuffer::new(&plaintext);
    let (shared_key, buffer) = buffer
        .decode_slice(record.len() - C::BLOCK_LEN)
        .map_err(malformed)?;
    let (received, _) = buffer.decode_slice(C::BLOCK_LEN).map_err(malformed)?;
    let shared_key = shared_key.into_less_safe_slice();

    let mut expected = compute_mac::<C>(mac_key, iv, shared_key)?;
    let valid = expected.verify(received.into_less_safe_slice());
    expected.zeroize();

    if !valid {
        tracing::debug!(algorithm = ?C::ALGORITHM, "kimp15_bad_mac");
        return Err(Kind::BadMac.err());
    }

    Ok(Zeroizing::new(shared_key.to_vec()))
}

#[inline]
fn compute_mac<C: BlockCipher>(mac_key: &Key, iv: &[u8], shared_key: &[u8]) -> Result<Tag> {
    let mut omac = Omac::<C>::new(mac_key);
    omac.update(iv)?;
    omac.update(shared_key)?;
    omac.finish()
}
