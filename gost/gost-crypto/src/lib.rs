// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! GOST block ciphers and the modes layered on top of them.
//!
//! The crate is organised leaf-first:
//!
//! * [`cipher`] provides Magma, Kuznyechik and GOST 28147-89 behind the [`BlockCipher`] trait
//! * [`gf`] multiplies blocks in GF(2^64) / GF(2^128) for [`mgm`]
//! * [`ctr`] and [`acpkm`] generate keystream with optional section rekeying
//! * [`mac`] implements OMAC and OMAC-ACPKM
//! * [`mgm`], [`aead`] and [`ctr_omac`] provide authenticated encryption
//! * [`kdf`], [`kexp`] and [`keywrap`] derive, export and wrap keys
//!
//! Every context is a plain value: cloning it forks the whole state, including buffered
//! partial blocks and derived subkeys. Key material is zeroized on drop.

#![forbid(unsafe_code)]

pub mod acpkm;
pub mod aead;
pub mod block;
pub mod cipher;
pub mod config;
pub mod ctr;
pub mod ctr_omac;
pub mod error;
pub mod gf;
pub mod kdf;
pub mod kexp;
pub mod keywrap;
pub mod mac;
pub mod mgm;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use block::Block;
pub use cipher::{Algorithm, BlockCipher, Gost89, Key, Kuznyechik, Magma, ParamSet, KEY_LEN};
pub use config::Limits;
pub use error::{Error, Kind, Result};
