// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use super::Cipher;
use ::kuznyechik::cipher::{generic_array::GenericArray, BlockDecrypt, BlockEncrypt, KeyInit};

struct RustCrypto<C>(C);

impl<C> Cipher for RustCrypto<C>
where
    C: BlockEncrypt + BlockDecrypt + Send + Sync,
{
    fn block_len(&self) -> usize {
        C::block_size()
    }

    fn encrypt(&self, input: &mut [u8]) {
        for chunk in input.chunks_exact_mut(C::block_size()) {
            self.0.encrypt_block(GenericArray::from_mut_slice(chunk));
        }
    }

    fn decrypt(&self, input: &mut [u8]) {
        for chunk in input.chunks_exact_mut(C::block_size()) {
            self.0.decrypt_block(GenericArray::from_mut_slice(chunk));
        }
    }
}

/// RustCrypto reads GOST 28147-89 words big-endian; `Gost89(K, P)` is
/// `rev(Gost89BE(K', rev(P)))` with every key word byte-reversed in `K'`
struct Reversed<C>(C);

impl<C> Cipher for Reversed<C>
where
    C: BlockEncrypt + BlockDecrypt + Send + Sync,
{
    fn block_len(&self) -> usize {
        C::block_size()
    }

    fn encrypt(&self, input: &mut [u8]) {
        for chunk in input.chunks_exact_mut(C::block_size()) {
            chunk.reverse();
            self.0.encrypt_block(GenericArray::from_mut_slice(chunk));
            chunk.reverse();
        }
    }

    fn decrypt(&self, input: &mut [u8]) {
        for chunk in input.chunks_exact_mut(C::block_size()) {
            chunk.reverse();
            self.0.decrypt_block(GenericArray::from_mut_slice(chunk));
            chunk.reverse();
        }
    }
}

pub mod magma {
    use super::*;
    use crate::cipher::testing::magma::Implementation;

    pub fn implementations(impls: &mut Vec<Implementation>) {
        impls.push(Implementation {
            name: "RustCrypto",
            new: |key| Box::new(RustCrypto(::magma::Magma::new(&key.into()))),
        });
    }
}

pub mod kuznyechik {
    use super::*;
    use crate::cipher::testing::kuznyechik::Implementation;

    pub fn implementations(impls: &mut Vec<Implementation>) {
        impls.push(Implementation {
            name: "RustCrypto",
            new: |key| Box::new(RustCrypto(::kuznyechik::Kuznyechik::new(&key.into()))),
        });
    }
}

pub mod gost89 {
    use super::*;
    use crate::cipher::testing::gost89::Implementation;

    pub fn implementations(impls: &mut Vec<Implementation>) {
        impls.push(Implementation {
            name: "RustCrypto",
            new: |mut key| {
                for word in key.chunks_exact_mut(4) {
                    word.reverse();
                }
                Box::new(Reversed(::magma::Gost89CryptoProA::new(&key.into())))
            },
        });
    }
}
