// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! ACPKM key meshing (R 1323565.1.017-2018).
//!
//! The next section key is `E_K(D_1) || ... || E_K(D_J)` where `D` is the fixed byte
//! string `80 81 .. 9f` cut into `J = 32 / n` blocks.

use crate::{
    block::Block,
    cipher::{BlockCipher, Key, KEY_LEN},
};
use zeroize::Zeroize;

pub const D: [u8; KEY_LEN] = {
    let mut d = [0u8; KEY_LEN];
    let mut i = 0;
    while i < KEY_LEN {
        d[i] = 0x80 + i as u8;
        i += 1;
    }
    d
};

/// Derives the key of the next section without touching `cipher`
pub fn next_key<C: BlockCipher>(cipher: &C) -> Key {
    let mut key = D;
    for chunk in key.chunks_exact_mut(C::BLOCK_LEN) {
        let mut block = C::Block::zeroed();
        block.as_mut().copy_from_slice(chunk);
        cipher.encrypt_block(&mut block);
        chunk.copy_from_slice(block.as_ref());
        block.zeroize();
    }
    key
}

/// Re-keys `cipher` with the key of the next section
pub fn mesh<C: BlockCipher>(cipher: &mut C) {
    let mut key = next_key(cipher);
    cipher.set_key(&key);
    key.zeroize();
    tracing::debug!(algorithm = ?C::ALGORITHM, "acpkm_mesh");
}
