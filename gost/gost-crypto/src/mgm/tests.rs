// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use super::*;
use crate::{
    cipher::{Algorithm, Kuznyechik, Magma},
    testing::{chunk_ranges, init_tracing, MAX_PAYLOAD},
};
use bolero::{check, generator::*};
use hex_literal::hex;
use pretty_hex::{pretty_hex, simple_hex};

struct Vector {
    key: Key,
    nonce: &'static [u8],
    aad: &'static [u8],
    plaintext: &'static [u8],
    ciphertext: &'static [u8],
    tag: &'static [u8],
}

/// RFC 9058 A.1
const KUZNYECHIK: Vector = Vector {
    key: hex!("8899aabbccddeeff0011223344556677fedcba98765432100123456789abcdef"),
    nonce: &hex!("1122334455667700ffeeddccbbaa9988"),
    aad: &hex!(
        "02020202020202020101010101010101"
        "04040404040404040303030303030303"
        "ea0505050505050505"
    ),
    plaintext: &hex!(
        "1122334455667700ffeeddccbbaa9988"
        "00112233445566778899aabbcceeff0a"
        "112233445566778899aabbcceeff0a00"
        "2233445566778899aabbcceeff0a0011"
        "aabbcc"
    ),
    ciphertext: &hex!(
        "a9757b8147956e9055b8a33de89f42fc"
        "8075d2212bf9fd5bd3f7069aadc16b39"
        "497ab15915a6ba85936b5d0ea9f6851c"
        "c60c14d4d3f883d0ab94420695c76deb"
        "2c7552"
    ),
    tag: &hex!("cf5d656f40c34f5c46e8bb0e29fcdb4c"),
};

/// RFC 9058 A.2
const MAGMA: Vector = Vector {
    key: hex!("ffeeddccbbaa99887766554433221100f0f1f2f3f4f5f6f7f8f9fafbfcfdfeff"),
    nonce: &hex!("12def06b3c130a59"),
    aad: &hex!(
        "0101010101010101020202020202020203030303030303030404040404040404"
        "0505050505050505ea"
    ),
    plaintext: &hex!(
        "ffeeddccbbaa99881122334455667700"
        "8899aabbcceeff0a0011223344556677"
        "99aabbcceeff0a001122334455667788"
        "aabbcceeff0a00112233445566778899"
        "aabbcc"
    ),
    ciphertext: &hex!(
        "c795066c5f9ea03b85113342459185ae"
        "1f2e00d6bf2b785d940470b8bb9c8e7d"
        "9a5dd3731f7ddc70ec27cb0ace6fa576"
        "70f65c646abb75d547aa37c3bcb5c34e"
        "03bb9c"
    ),
    tag: &hex!("a7928069aa10fd10"),
};

#[derive(TypeGenerator)]
struct Input {
    key: Key,
    nonce: [u8; 16],
    #[generator(0..64)]
    aad_len: usize,
    #[generator(produce::<Vec<u8>>().with().len(0..MAX_PAYLOAD))]
    aad_and_payload: Vec<u8>,
    chunks: Vec<u8>,
}

impl fmt::Debug for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "    key = {}", simple_hex(&self.key))?;
        writeln!(f, "  nonce = {}", simple_hex(&self.nonce))?;
        writeln!(f, " chunks = {:?}", self.chunks)?;

        let (aad, payload) = self.aad_and_payload();

        writeln!(f)?;
        writeln!(f, "aad:\n{}", pretty_hex(&aad))?;
        writeln!(f)?;
        writeln!(f, "payload:\n{}", pretty_hex(&payload))?;
        Ok(())
    }
}

impl Input {
    fn aad_and_payload(&self) -> (&[u8], &[u8]) {
        let aad_and_payload = &self.aad_and_payload[..];
        let idx = self.aad_len.min(aad_and_payload.len());
        aad_and_payload.split_at(idx)
    }
}

fn seal<C: BlockCipher>(key: &Key, nonce: &[u8], aad: &[u8], payload: &mut [u8]) -> Tag {
    let mut mgm = Mgm::<C>::new(key);
    mgm.set_iv(nonce).unwrap();
    mgm.update_aad(aad).unwrap();
    mgm.encrypt(payload).unwrap();
    mgm.finish().unwrap()
}

fn check_vector<C: BlockCipher>(vector: &Vector) {
    init_tracing();

    // one shot
    let mut data = vector.plaintext.to_vec();
    let tag = seal::<C>(&vector.key, vector.nonce, vector.aad, &mut data);
    assert_eq!(data, vector.ciphertext);
    assert_eq!(tag.as_ref(), vector.tag);

    // byte at a time
    let mut mgm = Mgm::<C>::new(&vector.key);
    mgm.set_iv(vector.nonce).unwrap();
    for byte in vector.aad.chunks(1) {
        mgm.update_aad(byte).unwrap();
    }
    let mut data = vector.plaintext.to_vec();
    for byte in data.chunks_mut(1) {
        mgm.encrypt(byte).unwrap();
    }
    assert_eq!(data, vector.ciphertext);
    assert_eq!(mgm.finish().unwrap().as_ref(), vector.tag);

    // decrypt and verify
    mgm.set_iv(vector.nonce).unwrap();
    mgm.update_aad(vector.aad).unwrap();
    let mut data = vector.ciphertext.to_vec();
    mgm.decrypt(&mut data).unwrap();
    assert_eq!(data, vector.plaintext);
    mgm.verify(vector.tag).unwrap();
    assert_eq!(mgm.state(), State::Finalized);
}

#[test]
fn kuznyechik_test_vector() {
    check_vector::<Kuznyechik>(&KUZNYECHIK);
}

#[test]
fn magma_test_vector() {
    check_vector::<Magma>(&MAGMA);
}

macro_rules! impl_tests {
    ($name:ident, $cipher:ty) => {
        mod $name {
            use super::*;

            const BLOCK_LEN: usize = <$cipher as BlockCipher>::BLOCK_LEN;

            fn nonce(input: &Input) -> &[u8] {
                &input.nonce[..BLOCK_LEN]
            }

            #[test]
            fn round_trip_test() {
                check!().with_type::<Input>().for_each(|input| {
                    let (aad, payload) = input.aad_and_payload();
                    let mut data = payload.to_vec();
                    let tag = seal::<$cipher>(&input.key, nonce(input), aad, &mut data);

                    let mut mgm = Mgm::<$cipher>::new(&input.key);
                    mgm.set_iv(nonce(input)).unwrap();
                    mgm.update_aad(aad).unwrap();
                    mgm.decrypt(&mut data).unwrap();
                    mgm.verify(tag.as_ref()).unwrap();
                    assert_eq!(data, payload);
                });
            }

            #[test]
            fn chunking_test() {
                check!().with_type::<Input>().for_each(|input| {
                    let (aad, payload) = input.aad_and_payload();
                    let mut expected = payload.to_vec();
                    let expected_tag = seal::<$cipher>(&input.key, nonce(input), aad, &mut expected);

                    let mut mgm = Mgm::<$cipher>::new(&input.key);
                    mgm.set_iv(nonce(input)).unwrap();
                    for range in chunk_ranges(aad.len(), &input.chunks) {
                        mgm.update_aad(&aad[range]).unwrap();
                    }
                    let mut actual = payload.to_vec();
                    for range in chunk_ranges(actual.len(), &input.chunks) {
                        mgm.encrypt(&mut actual[range]).unwrap();
                    }

                    assert_eq!(expected, actual);
                    assert_eq!(expected_tag, mgm.finish().unwrap());
                });
            }

            #[test]
            fn tamper_test() {
                check!()
                    .with_type::<(Input, usize, u8)>()
                    .for_each(|(input, flip_idx, bit)| {
                        let (aad, payload) = input.aad_and_payload();
                        let mut data = payload.to_vec();
                        let tag = seal::<$cipher>(&input.key, nonce(input), aad, &mut data);
                        let mut tag = tag.as_ref().to_vec();

                        // flip one bit of the ciphertext or the tag
                        let idx = flip_idx % (data.len() + tag.len());
                        let mask = 1 << (bit % 8);
                        if idx < data.len() {
                            data[idx] ^= mask;
                        } else {
                            tag[idx - data.len()] ^= mask;
                        }

                        let mut mgm = Mgm::<$cipher>::new(&input.key);
                        mgm.set_iv(nonce(input)).unwrap();
                        mgm.update_aad(aad).unwrap();
                        mgm.decrypt(&mut data).unwrap();
                        assert_eq!(
                            mgm.verify(&tag).unwrap_err(),
                            Kind::AuthenticationFailed
                        );
                        assert_eq!(mgm.state(), State::Finalized);
                    });
            }

            /// ensures that we can't pull a valid payload out of thin air
            #[test]
            fn decrypt_failure_test() {
                check!()
                    .with_type::<(Input, [u8; BLOCK_LEN])>()
                    .for_each(|(input, tag)| {
                        let (aad, ciphertext) = input.aad_and_payload();
                        let mut data = ciphertext.to_vec();

                        let mut mgm = Mgm::<$cipher>::new(&input.key);
                        mgm.set_iv(nonce(input)).unwrap();
                        mgm.update_aad(aad).unwrap();
                        mgm.decrypt(&mut data).unwrap();
                        assert!(mgm.verify(tag).is_err());
                    });
            }

            #[test]
            fn clone_test() {
                check!().with_type::<(Input, usize)>().for_each(|(input, split)| {
                    let (aad, payload) = input.aad_and_payload();
                    let mut expected = payload.to_vec();
                    let expected_tag = seal::<$cipher>(&input.key, nonce(input), aad, &mut expected);

                    let split = split % (payload.len() + 1);
                    let mut actual = payload.to_vec();
                    let (head, tail) = actual.split_at_mut(split);

                    let mut mgm = Mgm::<$cipher>::new(&input.key);
                    mgm.set_iv(nonce(input)).unwrap();
                    mgm.update_aad(aad).unwrap();
                    mgm.encrypt(head).unwrap();

                    let mut fork = mgm.clone();
                    mgm.encrypt(&mut [0u8; 33]).unwrap();
                    mgm.finish().unwrap();

                    fork.encrypt(tail).unwrap();
                    let tag = fork.finish().unwrap();

                    assert_eq!(expected, actual);
                    assert_eq!(expected_tag, tag);
                });
            }

            #[test]
            fn truncation_test() {
                check!().with_type::<(Input, u8)>().for_each(|(input, len)| {
                    let len = (*len as usize % BLOCK_LEN) + 1;
                    let (aad, payload) = input.aad_and_payload();
                    let mut data = payload.to_vec();
                    let full = seal::<$cipher>(&input.key, nonce(input), aad, &mut data);

                    let mut mgm = Mgm::<$cipher>::new(&input.key);
                    mgm.set_tag_len(len).unwrap();
                    mgm.set_iv(nonce(input)).unwrap();
                    mgm.update_aad(aad).unwrap();
                    mgm.encrypt(&mut payload.to_vec()).unwrap();
                    let tag = mgm.finish().unwrap();
                    assert_eq!(tag.as_ref(), &full.as_ref()[..len]);

                    // verification accepts any leading prefix of the tag
                    mgm.set_iv(nonce(input)).unwrap();
                    mgm.update_aad(aad).unwrap();
                    mgm.decrypt(&mut data).unwrap();
                    mgm.verify(&full.as_ref()[..len]).unwrap();
                });
            }

            #[test]
            fn nonce_top_bit_test() {
                check!().with_type::<Input>().for_each(|input| {
                    let (aad, payload) = input.aad_and_payload();
                    let mut nonce = nonce(input).to_vec();
                    nonce[0] &= 0x7f;
                    let mut cleared = payload.to_vec();
                    let cleared_tag = seal::<$cipher>(&input.key, &nonce, aad, &mut cleared);

                    nonce[0] |= 0x80;
                    let mut set = payload.to_vec();
                    let set_tag = seal::<$cipher>(&input.key, &nonce, aad, &mut set);

                    assert_eq!(cleared, set);
                    assert_eq!(cleared_tag, set_tag);
                });
            }
        }
    };
}

impl_tests!(kuznyechik, Kuznyechik);
impl_tests!(magma, Magma);

#[test]
fn ordering_test() {
    let mut mgm = Mgm::<Kuznyechik>::new(&KUZNYECHIK.key);

    // no nonce yet
    assert_eq!(mgm.update_aad(b"aad").unwrap_err(), Kind::BadOrder);
    assert_eq!(mgm.encrypt(&mut [0; 4]).unwrap_err(), Kind::BadOrder);
    assert_eq!(mgm.finish().unwrap_err(), Kind::BadOrder);

    mgm.set_iv(KUZNYECHIK.nonce).unwrap();
    mgm.update_aad(b"aad").unwrap();
    mgm.encrypt(&mut [0; 4]).unwrap();
    assert_eq!(mgm.state(), State::Data);
    assert_eq!(mgm.update_aad(b"more").unwrap_err(), Kind::BadOrder);

    mgm.finish().unwrap();
    assert_eq!(mgm.state(), State::Finalized);
    assert_eq!(mgm.encrypt(&mut [0; 4]).unwrap_err(), Kind::BadOrder);
    assert_eq!(mgm.update_aad(b"aad").unwrap_err(), Kind::BadOrder);
    assert_eq!(mgm.finish().unwrap_err(), Kind::BadOrder);
    assert_eq!(mgm.verify(&[0; 16]).unwrap_err(), Kind::BadOrder);

    // a fresh nonce restarts the context
    mgm.set_iv(KUZNYECHIK.nonce).unwrap();
    mgm.update_aad(KUZNYECHIK.aad).unwrap();
    let mut data = KUZNYECHIK.plaintext.to_vec();
    mgm.encrypt(&mut data).unwrap();
    assert_eq!(mgm.finish().unwrap().as_ref(), KUZNYECHIK.tag);
}

#[test]
fn empty_data_keeps_aad_open_test() {
    let (head, tail) = KUZNYECHIK.aad.split_at(5);

    let mut mgm = Mgm::<Kuznyechik>::new(&KUZNYECHIK.key);
    mgm.set_iv(KUZNYECHIK.nonce).unwrap();
    mgm.update_aad(head).unwrap();
    mgm.encrypt(&mut []).unwrap();
    assert_eq!(mgm.state(), State::Aad);
    mgm.update_aad(tail).unwrap();

    let mut data = KUZNYECHIK.plaintext.to_vec();
    mgm.encrypt(&mut data).unwrap();
    assert_eq!(data, KUZNYECHIK.ciphertext);
    assert_eq!(mgm.finish().unwrap().as_ref(), KUZNYECHIK.tag);

    let mut mgm = Mgm::<Kuznyechik>::new(&KUZNYECHIK.key);
    mgm.set_iv(KUZNYECHIK.nonce).unwrap();
    mgm.decrypt(&mut []).unwrap();
    assert_eq!(mgm.state(), State::IvSet);
    mgm.update_aad(head).unwrap();
    mgm.decrypt(&mut []).unwrap();
    mgm.update_aad(tail).unwrap();
    mgm.decrypt(&mut data).unwrap();
    mgm.decrypt(&mut []).unwrap();
    assert_eq!(mgm.state(), State::Data);
    assert_eq!(data, KUZNYECHIK.plaintext);
    mgm.verify(KUZNYECHIK.tag).unwrap();
}

#[test]
fn unkeyed_test() {
    let mut mgm = Mgm::<Magma>::default();
    assert_eq!(mgm.set_iv(MAGMA.nonce).unwrap_err(), Kind::KeyNotSet);
    assert_eq!(mgm.update_aad(b"aad").unwrap_err(), Kind::KeyNotSet);
    assert_eq!(mgm.encrypt(&mut [0; 4]).unwrap_err(), Kind::KeyNotSet);
    assert_eq!(mgm.finish().unwrap_err(), Kind::KeyNotSet);

    mgm.set_key(&MAGMA.key);
    assert_eq!(mgm.state(), State::KeySet);
    mgm.set_iv(MAGMA.nonce).unwrap();
    mgm.update_aad(MAGMA.aad).unwrap();
    let mut data = MAGMA.plaintext.to_vec();
    mgm.encrypt(&mut data).unwrap();
    assert_eq!(mgm.finish().unwrap().as_ref(), MAGMA.tag);
}

#[test]
fn empty_message_test() {
    // only AAD authenticates
    let mut mgm = Mgm::<Kuznyechik>::new(&KUZNYECHIK.key);
    mgm.set_iv(KUZNYECHIK.nonce).unwrap();
    mgm.update_aad(KUZNYECHIK.aad).unwrap();
    let aad_only = mgm.finish().unwrap();

    mgm.set_iv(KUZNYECHIK.nonce).unwrap();
    let nothing = mgm.finish().unwrap();

    assert_ne!(aad_only, nothing);
    assert_eq!(nothing.len(), 16);
}

#[test]
fn nonce_length_test() {
    let mut mgm = Mgm::<Magma>::new(&MAGMA.key);
    assert_eq!(
        mgm.set_iv(KUZNYECHIK.nonce).unwrap_err(),
        Kind::InvalidLength {
            expected: 8,
            actual: 16
        }
    );
}

#[test]
fn tag_len_test() {
    let mut mgm = Mgm::<Kuznyechik>::new(&KUZNYECHIK.key);
    assert_eq!(mgm.tag_len(), 16);
    assert_eq!(
        mgm.set_tag_len(17).unwrap_err(),
        Kind::InvalidTagLength { len: 17, max: 16 }
    );
    assert_eq!(
        mgm.set_tag_len(0).unwrap_err(),
        Kind::InvalidTagLength { len: 0, max: 16 }
    );
    mgm.set_tag_len(8).unwrap();
    assert_eq!(mgm.tag_len(), 8);

    mgm.set_iv(KUZNYECHIK.nonce).unwrap();
    assert_eq!(
        mgm.verify(&[]).unwrap_err(),
        Kind::InvalidTagLength { len: 0, max: 16 }
    );

    let limits = Limits::new(Algorithm::Magma).with_tag_len(4).unwrap();
    let mgm = Mgm::<Magma>::with_limits(&MAGMA.key, &limits).unwrap();
    assert_eq!(mgm.tag_len(), 4);
    assert!(Mgm::<Kuznyechik>::with_limits(&KUZNYECHIK.key, &limits).is_err());
}

#[test]
fn data_too_large_test() {
    assert_eq!(Mgm::<Magma>::MAX_LEN, (1 << 29) - 1);
    assert_eq!(Mgm::<Kuznyechik>::MAX_LEN, (1 << 61) - 1);

    let mut mgm = Mgm::<Magma>::new(&MAGMA.key);
    mgm.set_iv(MAGMA.nonce).unwrap();
    mgm.update_aad(&[0; 8]).unwrap();
    mgm.aad_len = Mgm::<Magma>::MAX_LEN - 4;

    assert_eq!(mgm.update_aad(&[0; 5]).unwrap_err(), Kind::DataTooLarge);
    mgm.update_aad(&[0; 2]).unwrap();
    assert_eq!(mgm.encrypt(&mut [0; 3]).unwrap_err(), Kind::DataTooLarge);
    mgm.encrypt(&mut [0; 2]).unwrap();
    assert_eq!(mgm.encrypt(&mut [0; 1]).unwrap_err(), Kind::DataTooLarge);
    assert!(mgm.finish().is_ok());
}
