// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use crate::cipher::Algorithm;
use core::{fmt, panic::Location};

pub type Result<T = (), E = Error> = core::result::Result<T, E>;

#[derive(Clone, Copy)]
pub struct Error {
    kind: Kind,
    location: &'static Location<'static>,
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Error")
            .field("kind", &self.kind)
            .field("crate", &"gost-crypto")
            .field("file", &self.file())
            .field("line", &self.location.line())
            .finish()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let Self { kind, location } = self;
        let file = self.file();
        let line = location.line();
        write!(f, "[gost-crypto::{file}:{line}]: {kind}")
    }
}

impl std::error::Error for Error {}

impl Error {
    #[track_caller]
    #[inline]
    pub fn new(kind: Kind) -> Self {
        Self {
            kind,
            location: Location::caller(),
        }
    }

    #[inline]
    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    #[inline]
    fn file(&self) -> &'static str {
        self.location
            .file()
            .trim_start_matches(concat!(env!("CARGO_MANIFEST_DIR"), "/src/"))
    }
}

impl From<Kind> for Error {
    #[track_caller]
    #[inline]
    fn from(kind: Kind) -> Self {
        Self::new(kind)
    }
}

impl PartialEq<Kind> for Error {
    fn eq(&self, other: &Kind) -> bool {
        self.kind == *other
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Kind {
    #[error("the operation is not valid in the current state")]
    BadOrder,
    #[error("the input exceeds the mode's length limit")]
    DataTooLarge,
    #[error("the authentication tag did not match")]
    AuthenticationFailed,
    #[error("the key transport MAC did not match")]
    BadMac,
    #[error("MAC size {size} is outside of 1..={max}")]
    InvalidMacSize { size: usize, max: usize },
    #[error("tag length {len} is outside of 1..={max}")]
    InvalidTagLength { len: usize, max: usize },
    #[error("the MAC key has not been set")]
    MacKeyNotSet,
    #[error("the cipher key has not been set")]
    KeyNotSet,
    #[error("internal error: {reason}")]
    InternalError { reason: &'static str },
    #[error("expected {expected} bytes but got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("section size {size} is not a multiple of the {block_len} byte block")]
    InvalidSectionSize { size: usize, block_len: usize },
    #[error("{algorithm:?} is not supported by this operation")]
    UnsupportedAlgorithm { algorithm: Algorithm },
}

impl Kind {
    #[inline]
    #[track_caller]
    pub(crate) fn err(self) -> Error {
        Error::new(self)
    }
}
