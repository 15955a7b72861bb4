// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use super::{BlockCipher, Key};
use crate::block::Block;

/// Object safe view of a block cipher in ECB over whole blocks
pub trait Cipher: Send + Sync {
    fn block_len(&self) -> usize;

    /// Encrypts every complete block of `input`; a trailing partial block is left untouched
    fn encrypt(&self, input: &mut [u8]);

    fn decrypt(&self, input: &mut [u8]);
}

pub(crate) struct Ours<C>(pub(crate) C);

impl<C: BlockCipher> Cipher for Ours<C> {
    fn block_len(&self) -> usize {
        C::BLOCK_LEN
    }

    fn encrypt(&self, input: &mut [u8]) {
        for_each_block::<C, _>(input, |block| self.0.encrypt_block(block))
    }

    fn decrypt(&self, input: &mut [u8]) {
        for_each_block::<C, _>(input, |block| self.0.decrypt_block(block))
    }
}

#[inline]
pub fn for_each_block<C: BlockCipher, F: FnMut(&mut C::Block)>(input: &mut [u8], mut f: F) {
    for chunk in input.chunks_exact_mut(C::BLOCK_LEN) {
        let mut block = C::Block::zeroed();
        block.as_mut().copy_from_slice(chunk);
        f(&mut block);
        chunk.copy_from_slice(block.as_ref());
    }
}

macro_rules! cipher_impl {
    ($name:ident, $cipher:ty) => {
        pub mod $name {
            use super::*;
            use lazy_static::lazy_static;

            pub struct Implementation {
                pub(crate) name: &'static str,
                pub(crate) new: fn(key: Key) -> Box<dyn Cipher>,
            }

            impl Implementation {
                pub fn name(&self) -> &'static str {
                    self.name
                }

                #[allow(clippy::new_ret_no_self)]
                pub fn new(&self, key: Key) -> Box<dyn Cipher> {
                    (self.new)(key)
                }
            }

            lazy_static! {
                static ref IMPLEMENTATIONS: Vec<Implementation> = {
                    let mut impls = vec![Implementation {
                        name: "gost-crypto",
                        new: |key| Box::new(Ours(<$cipher as BlockCipher>::new(&key))),
                    }];

                    super::rust_crypto::$name::implementations(&mut impls);

                    impls
                };
            }

            pub fn implementations() -> &'static [Implementation] {
                &*IMPLEMENTATIONS
            }
        }
    };
}

cipher_impl!(magma, crate::cipher::Magma);
cipher_impl!(kuznyechik, crate::cipher::Kuznyechik);
cipher_impl!(gost89, crate::cipher::Gost89);

mod rust_crypto;
