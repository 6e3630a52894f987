mod common;

use common::{hex_bytes, read_vector};
use ssh_primitives::CryptoError;
use ssh_primitives::cipher::{BlockCipher, Blowfish};
use ssh_primitives::modes::{Cbc, Ecb};

#[test]
fn test_blowfish_ecb_vectors() {
    let text = read_vector("blowfish_ecb.txt");
    let mut count = 0;

    for line in text.lines().filter(|l| !l.trim().is_empty() && !l.starts_with('#')) {
        let fields: Vec<Vec<u8>> = line.split_whitespace().map(hex_bytes).collect();
        let (key, plain, cipher) = (&fields[0], &fields[1], &fields[2]);

        let bf = Blowfish::new(key).unwrap();
        let mut out = [0u8; 8];
        bf.encrypt_block(plain, 0, &mut out, 0);
        assert_eq!(&out[..], &cipher[..], "encrypt with key {}", hex::encode(key));

        let mut back = [0u8; 8];
        bf.decrypt_block(&out, 0, &mut back, 0);
        assert_eq!(&back[..], &plain[..], "decrypt with key {}", hex::encode(key));
        count += 1;
    }

    assert_eq!(count, 57);
}

#[test]
fn test_blowfish_cbc_schneier_vector() {
    let key = hex_bytes("0123456789abcdeff0e1d2c3b4a59687");
    let iv = hex_bytes("fedcba9876543210");
    let plain = hex_bytes("37363534333231204e6f77206973207468652074696d6520666f722000000000");
    let expected = hex_bytes("6b77b4d63006dee605b156e27403979358deb9e7154616d959f1652bd5ff92cc");

    let mut cbc = Cbc::new(Blowfish::new(&key).unwrap(), &iv).unwrap();
    let mut out = vec![0u8; plain.len()];
    cbc.encrypt(&plain, 0, plain.len(), &mut out, 0);
    assert_eq!(out, expected);

    let mut cbc = Cbc::new(Blowfish::new(&key).unwrap(), &iv).unwrap();
    cbc.decrypt_in_place(&mut out, 0, expected.len());
    assert_eq!(out, plain);
}

#[test]
fn test_blowfish_key_lengths() {
    assert!(Blowfish::new(&[0x42; 1]).is_ok());
    assert!(Blowfish::new(&[0x42; 56]).is_ok());

    for len in [0, 57, 64] {
        let err = Blowfish::new(&vec![0u8; len]).err();
        assert!(
            matches!(err, Some(CryptoError::InvalidKeyLength { len: l, .. }) if l == len),
            "key length {len} must be rejected"
        );
    }
}

#[test]
fn test_blowfish_ecb_offsets_and_guards() {
    let bf = Blowfish::new(b"offset test key").unwrap();
    let ecb = Ecb::new(&bf);

    let plain: Vec<u8> = (0u8..24).collect();
    let mut reference = vec![0u8; 24];
    ecb.encrypt(&plain, 0, 24, &mut reference, 0);

    let mut input = vec![0xaa; 40];
    input[5..29].copy_from_slice(&plain);
    let mut output = vec![0x55; 40];
    ecb.encrypt(&input, 5, 24, &mut output, 11);

    assert_eq!(&output[11..35], &reference[..]);
    assert!(output[..11].iter().all(|&b| b == 0x55));
    assert!(output[35..].iter().all(|&b| b == 0x55));

    ecb.decrypt_in_place(&mut output, 11, 24);
    assert_eq!(&output[11..35], &plain[..]);
}

#[test]
#[should_panic(expected = "multiple")]
fn test_blowfish_ecb_rejects_partial_block() {
    let bf = Blowfish::new(b"key").unwrap();
    let mut buf = [0u8; 12];
    Ecb::new(bf).encrypt_in_place(&mut buf, 0, 12);
}
