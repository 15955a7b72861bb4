// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use bolero::{check, generator::*};
use gost_crypto::{
    aead::{Aead, MgmKey},
    ctr_omac::CtrAcpkmOmac,
    kdf::TlsTree,
    kexp::{kexp15, kimp15},
    keywrap, BlockCipher, Key, Kind, Kuznyechik, Limits, Magma, ParamSet,
};

#[derive(Debug, TypeGenerator)]
struct Session {
    kek: Key,
    ukm: [u8; 8],
    root: Key,
    cipher_key: Key,
    mac_key: Key,
    iv: [u8; 8],
    seq: u64,
    nonce: [u8; 16],
    #[generator(produce::<Vec<u8>>().with().len(0usize..64))]
    aad: Vec<u8>,
    #[generator(produce::<Vec<u8>>().with().len(0usize..512))]
    payload: Vec<u8>,
}

fn main() {
    check!().with_type::<Session>().for_each(|session| {
        round_trip::<Kuznyechik>(session);
        round_trip::<Magma>(session);
    });
}

/// Transports a root key, derives a record key from it and protects one record
fn round_trip<C: BlockCipher>(session: &Session) {
    let block_len = C::BLOCK_LEN;
    let iv = &session.iv[..block_len / 2];

    // the root travels wrapped twice: CryptoPro for the KEK holder, KExp15 on the wire
    let wrapped = keywrap::wrap(ParamSet::CryptoProA, &session.kek, &session.ukm, &session.root);
    let root = keywrap::unwrap(ParamSet::CryptoProA, &session.kek, &wrapped).unwrap();

    let record = kexp15::<C>(&root[..], &session.cipher_key, &session.mac_key, iv).unwrap();
    let imported = kimp15::<C>(&record, &session.cipher_key, &session.mac_key, iv).unwrap();
    assert_eq!(imported[..], session.root[..]);

    let mut root = Key::default();
    root.copy_from_slice(&imported);

    let mut sender = TlsTree::new(C::ALGORITHM, &root).unwrap();
    let mut receiver = TlsTree::new(C::ALGORITHM, &root).unwrap();
    let key = *sender.key(session.seq).unwrap();
    assert_eq!(*receiver.key(session.seq).unwrap(), key);

    let limits = Limits::new(C::ALGORITHM);
    let mgm = MgmKey::<C>::with_limits(&key, &limits).unwrap();
    let mut nonce = C::Block::default();
    nonce.as_mut().copy_from_slice(&session.nonce[..block_len]);

    let mut payload = session.payload.clone();
    let tag = mgm.encrypt(&nonce, &session.aad, &mut payload).unwrap();
    mgm.decrypt(&nonce, &session.aad, &mut payload, tag.as_ref())
        .unwrap();
    assert_eq!(payload, session.payload);

    // the stream mode shares nothing with MGM but the record key
    let mut stream = CtrAcpkmOmac::<C>::with_limits(&key, &session.ukm, iv, &limits).unwrap();
    stream.encrypt(&mut payload).unwrap();
    let tag = stream.finish().unwrap();

    let mut stream = CtrAcpkmOmac::<C>::with_limits(&key, &session.ukm, iv, &limits).unwrap();
    stream.decrypt(&mut payload).unwrap();
    stream.verify(tag.as_ref()).unwrap();
    assert_eq!(payload, session.payload);

    // a record key is not interchangeable across sequence numbers of another epoch
    let other = *receiver.key(session.seq ^ (1 << 63)).unwrap();
    let mgm = MgmKey::<C>::new(&other);
    let mut payload = session.payload.clone();
    let tag = mgm.encrypt(&nonce, &session.aad, &mut payload).unwrap();
    let result = MgmKey::<C>::new(&key).decrypt(&nonce, &session.aad, &mut payload, tag.as_ref());
    assert_eq!(result.unwrap_err(), Kind::AuthenticationFailed);
}
