mod common;

use common::{hex_bytes, parse_rsp, read_vector};
use ssh_primitives::cipher::Rijndael;
use ssh_primitives::modes::{Gcm, GcmConfig};
use ssh_primitives::{CryptoError, Verification};

fn gcm_for(key: &[u8], tag_len: usize) -> Gcm<Rijndael> {
    Gcm::with_config(Rijndael::new(key).unwrap(), GcmConfig { tag_len }).unwrap()
}

#[test]
fn test_gcm_encrypt_vectors() {
    let records = parse_rsp(&read_vector("gcmEncryptExtIV.rsp"));
    assert!(!records.is_empty());

    for rec in &records {
        let tag = rec.hex("Tag");
        let pt = rec.hex("PT");
        let mut gcm = gcm_for(&rec.hex("Key"), tag.len());

        gcm.set_nonce(&rec.hex("IV")).unwrap();
        gcm.set_aad(&rec.hex("AAD")).unwrap();
        let mut ct = vec![0u8; pt.len()];
        let computed = gcm.encrypt(&pt, 0, pt.len(), &mut ct, 0).unwrap();

        assert_eq!(ct, rec.hex("CT"), "[{}] count {}", rec.section, rec.get("Count"));
        assert_eq!(computed.as_bytes(), &tag[..], "[{}] count {}", rec.section, rec.get("Count"));
    }
}

#[test]
fn test_gcm_decrypt_vectors() {
    common::init_tracing();
    let records = parse_rsp(&read_vector("gcmDecrypt.rsp"));
    let mut failures = 0;

    for rec in &records {
        let ct = rec.hex("CT");
        let tag = rec.hex("Tag");
        let mut gcm = gcm_for(&rec.hex("Key"), tag.len());
        gcm.set_nonce(&rec.hex("IV")).unwrap();
        gcm.set_aad(&rec.hex("AAD")).unwrap();

        let sentinel = vec![0x5a; ct.len()];
        let mut out = sentinel.clone();
        let verdict = gcm.decrypt(&ct, 0, ct.len(), &tag, &mut out, 0).unwrap();

        if rec.has_flag("FAIL") {
            failures += 1;
            assert_eq!(verdict, Verification::Invalid, "count {}", rec.get("Count"));
            assert_eq!(out, sentinel, "forged message must not be released");
        } else {
            assert_eq!(verdict, Verification::Valid, "count {}", rec.get("Count"));
            assert_eq!(out, rec.hex("PT"));
        }
    }

    assert!(failures > 0);
}

#[test]
fn test_gcm_in_place_round_trip_with_guards() {
    let key = hex_bytes("feffe9928665731c6d6a8f9467308308");
    let nonce = hex_bytes("cafebabefacedbaddecaf888");
    let plain: Vec<u8> = (0u8..61).collect();

    let mut buf = vec![0xee; 7 + plain.len() + 5];
    buf[7..7 + plain.len()].copy_from_slice(&plain);

    let mut gcm = gcm_for(&key, 16);
    gcm.set_nonce(&nonce).unwrap();
    gcm.set_aad(b"header").unwrap();
    let tag = gcm.encrypt_in_place(&mut buf, 7, plain.len()).unwrap();

    let mut expected = vec![0u8; plain.len()];
    let mut reference = gcm_for(&key, 16);
    reference.set_nonce(&nonce).unwrap();
    reference.set_aad(b"header").unwrap();
    let reference_tag = reference.encrypt(&plain, 0, plain.len(), &mut expected, 0).unwrap();
    assert_eq!(&buf[7..7 + plain.len()], &expected[..]);
    assert_eq!(tag, reference_tag);

    gcm.set_nonce(&nonce).unwrap();
    gcm.set_aad(b"header").unwrap();
    let verdict = gcm
        .decrypt_in_place(&mut buf, 7, plain.len(), tag.as_bytes())
        .unwrap();
    assert!(verdict.is_valid());
    assert_eq!(&buf[7..7 + plain.len()], &plain[..]);
    assert!(buf[..7].iter().all(|&b| b == 0xee));
    assert!(buf[7 + plain.len()..].iter().all(|&b| b == 0xee));
}

#[test]
fn test_gcm_tampered_aad_leaves_buffer_untouched() {
    let key = [0x11u8; 32];
    let nonce = [0x22u8; 12];
    let mut gcm = gcm_for(&key, 16);

    gcm.set_nonce(&nonce).unwrap();
    gcm.set_aad(b"packet length").unwrap();
    let mut buf = *b"some ssh payload";
    let tag = gcm.encrypt_in_place(&mut buf, 0, 16).unwrap();
    let sealed = buf;

    gcm.set_nonce(&nonce).unwrap();
    gcm.set_aad(b"packet lengtH").unwrap();
    let verdict = gcm
        .decrypt_in_place(&mut buf, 0, 16, tag.as_bytes())
        .unwrap();
    assert_eq!(verdict, Verification::Invalid);
    assert_eq!(buf, sealed);
}

#[test]
fn test_gcm_requires_fresh_nonce() {
    let mut gcm = gcm_for(&[0u8; 16], 16);
    let mut out = [0u8; 4];
    assert!(matches!(
        gcm.encrypt(&[1, 2, 3, 4], 0, 4, &mut out, 0),
        Err(CryptoError::InvalidState(_))
    ));

    gcm.set_nonce(&[0u8; 12]).unwrap();
    gcm.encrypt(&[1, 2, 3, 4], 0, 4, &mut out, 0).unwrap();
    assert!(gcm.encrypt(&[1, 2, 3, 4], 0, 4, &mut out, 0).is_err());
}

#[test]
fn test_gcm_wrong_tag_length_is_malformed() {
    let mut gcm = gcm_for(&[0u8; 16], 12);
    gcm.set_nonce(&[0u8; 12]).unwrap();
    let mut buf = [0u8; 8];
    let verdict = gcm.decrypt_in_place(&mut buf, 0, 8, &[0u8; 16]).unwrap();
    assert!(matches!(verdict, Verification::Malformed(_)));
}

#[test]
fn test_gcm_rejects_bad_configuration() {
    assert!(matches!(
        Gcm::with_config(Rijndael::new(&[0u8; 16]).unwrap(), GcmConfig { tag_len: 3 }),
        Err(CryptoError::InvalidTagLength(3))
    ));
    let blowfish = ssh_primitives::cipher::Blowfish::new(b"key").unwrap();
    assert!(matches!(
        Gcm::new(blowfish),
        Err(CryptoError::InvalidBlockSize(8))
    ));
}

#[test]
fn test_gcm_fixed_iv_invocation_counter() {
    let iv = hex_bytes("000000010000000000000001");
    let key = [0x42u8; 16];
    let mut ssh =
        Gcm::with_fixed_iv(Rijndael::new(&key).unwrap(), &iv, GcmConfig::default()).unwrap();

    let mut tags = Vec::new();
    for expected_next in ["000000010000000000000002", "000000010000000000000003"] {
        ssh.next_packet().unwrap();
        assert_eq!(hex::encode(ssh.current_iv().unwrap()), expected_next);
        let mut buf = [0u8; 16];
        tags.push(ssh.encrypt_in_place(&mut buf, 0, 16).unwrap());
    }

    // the first packet used the IV as given
    let mut plain = gcm_for(&key, 16);
    plain.set_nonce(&iv).unwrap();
    let mut buf = [0u8; 16];
    assert_eq!(plain.encrypt_in_place(&mut buf, 0, 16).unwrap(), tags[0]);
    assert_ne!(tags[0], tags[1]);
}

#[test]
fn test_gcm_fixed_iv_counter_wraps() {
    let iv = hex_bytes("00000001ffffffffffffffff");
    let mut ssh =
        Gcm::with_fixed_iv(Rijndael::new(&[0u8; 16]).unwrap(), &iv, GcmConfig::default()).unwrap();
    ssh.next_packet().unwrap();
    assert_eq!(
        hex::encode(ssh.current_iv().unwrap()),
        "000000010000000000000000"
    );
}
