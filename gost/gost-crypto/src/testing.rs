// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use core::{fmt, ops::Range};
use pretty_hex::PrettyHex;

/// Upper bound on generated payload lengths, large enough to cross several ACPKM sections
pub const MAX_PAYLOAD: usize = 1024 * 4 + 37;

pub struct Outcome {
    pub name: &'static str,
    pub output: Vec<u8>,
}

impl fmt::Debug for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Outcome")
            .field("name", &self.name)
            .field("output", &format_args!("{:?}", self.output.hex_dump()))
            .finish()
    }
}

/// Asserts every implementation produced the same bytes and returns them
pub fn assert_outcomes(mut outcomes: Vec<Outcome>) -> Vec<u8> {
    assert!(!outcomes.is_empty());

    let first = &outcomes[0].output;
    let all_match = outcomes[1..].iter().all(|res| first == &res.output);

    assert!(all_match, "{:#?}", outcomes);

    core::mem::take(&mut outcomes[0].output)
}

/// Cuts `0..len` into consecutive ranges, cycling through `sizes` (a zero size counts as one byte)
pub fn chunk_ranges(len: usize, sizes: &[u8]) -> Vec<Range<usize>> {
    let mut ranges = vec![];
    let mut start = 0;
    let mut sizes = sizes.iter().cycle();

    while start < len {
        let size = sizes.next().map_or(len, |size| (*size as usize).max(1));
        let end = (start + size).min(len);
        ranges.push(start..end);
        start = end;
    }

    ranges
}

pub fn init_tracing() {
    if cfg!(any(miri, fuzzing)) {
        return;
    }

    use std::sync::Once;

    static TRACING: Once = Once::new();

    TRACING.call_once(|| {
        let format = tracing_subscriber::fmt::format().compact();

        let default_level = if std::env::var("CI").is_ok() {
            tracing::Level::INFO
        } else if cfg!(debug_assertions) {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        };

        let env_filter = tracing_subscriber::EnvFilter::builder()
            .with_default_directive(default_level.into())
            .with_env_var("GOST_LOG")
            .from_env_lossy();

        // another harness may have installed a global subscriber already
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .event_format(format)
            .with_test_writer()
            .try_init();
    });
}
