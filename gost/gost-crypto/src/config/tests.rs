// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use super::*;
use bolero::check;

#[test]
fn defaults_test() {
    let magma = Limits::new(Algorithm::Magma);
    assert_eq!(magma.tag_len(), 8);
    assert_eq!(magma.mac_len(), 8);
    assert_eq!(magma.ctr_section(), 1024);
    assert_eq!(magma.omac_section(), 1024);
    assert_eq!(magma.omac_master_section(), 640);
    assert_eq!(magma.kdf_counter_len(), 1);

    let kuznyechik = Limits::new(Algorithm::Kuznyechik);
    assert_eq!(kuznyechik.tag_len(), 16);
    assert_eq!(kuznyechik.mac_len(), 16);
    assert_eq!(kuznyechik.ctr_section(), 4096);
    assert_eq!(kuznyechik.omac_master_section(), 768);
    assert_eq!(Limits::default(), kuznyechik);
}

#[test]
fn setter_validation_test() {
    let limits = Limits::new(Algorithm::Magma);

    assert_eq!(
        limits.with_tag_len(9).unwrap_err(),
        Kind::InvalidTagLength { len: 9, max: 8 }
    );
    assert_eq!(
        limits.with_tag_len(0).unwrap_err(),
        Kind::InvalidTagLength { len: 0, max: 8 }
    );
    assert_eq!(
        limits.with_mac_len(0).unwrap_err(),
        Kind::InvalidMacSize { size: 0, max: 8 }
    );
    assert_eq!(
        limits.with_ctr_section(12).unwrap_err(),
        Kind::InvalidSectionSize {
            size: 12,
            block_len: 8
        }
    );
    assert_eq!(
        limits.with_omac_section(0).unwrap_err(),
        Kind::InvalidSectionSize {
            size: 0,
            block_len: 8
        }
    );
    assert!(limits.with_kdf_counter_len(5).is_err());

    let limits = limits
        .with_tag_len(4)
        .unwrap()
        .with_ctr_section(0)
        .unwrap()
        .with_omac_master_section(24)
        .unwrap()
        .with_kdf_counter_len(4)
        .unwrap();
    assert_eq!(limits.tag_len(), 4);
    assert_eq!(limits.ctr_section(), 0);
    assert_eq!(limits.omac_master_section(), 24);
    assert_eq!(limits.kdf_counter_len(), 4);
}

#[test]
fn section_multiples_test() {
    check!().with_type::<u16>().for_each(|size| {
        let size = *size as usize;
        let limits = Limits::new(Algorithm::Kuznyechik);
        assert_eq!(limits.with_ctr_section(size).is_ok(), size % 16 == 0);
        assert_eq!(
            limits.with_omac_section(size).is_ok(),
            size != 0 && size % 16 == 0
        );
    });
}

#[test]
fn algorithm_mismatch_test() {
    let limits = Limits::new(Algorithm::Magma);
    assert!(limits.ensure_algorithm(Algorithm::Magma).is_ok());
    assert_eq!(
        limits.ensure_algorithm(Algorithm::Kuznyechik).unwrap_err(),
        Kind::UnsupportedAlgorithm {
            algorithm: Algorithm::Kuznyechik
        }
    );
}
