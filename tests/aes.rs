mod common;

use common::hex_bytes;
use ssh_primitives::CryptoError;
use ssh_primitives::cipher::{BlockCipher, Rijndael};
use ssh_primitives::modes::{Cbc, Ctr, Ecb};

// NIST SP 800-38A appendix F
const PLAINTEXT: &str = "6bc1bee22e409f96e93d7e117393172aae2d8a571e03ac9c9eb76fac45af8e51\
                         30c81c46a35ce411e5fbc1191a0a52eff69f2445df4f9b17ad2b417be66c3710";
const KEY_128: &str = "2b7e151628aed2a6abf7158809cf4f3c";
const KEY_192: &str = "8e73b0f7da0e6452c810f32b809079e562f8ead2522c6b7b";
const KEY_256: &str = "603deb1015ca71be2b73aef0857d77811f352c073b6108d72d9810a30914dff4";
const IV: &str = "000102030405060708090a0b0c0d0e0f";
const COUNTER: &str = "f0f1f2f3f4f5f6f7f8f9fafbfcfdfeff";

struct ModeVector {
    key: &'static str,
    ecb: &'static str,
    cbc: &'static str,
    ctr: &'static str,
}

const VECTORS: [ModeVector; 3] = [
    ModeVector {
        key: KEY_128,
        ecb: "3ad77bb40d7a3660a89ecaf32466ef97f5d3d58503b9699de785895a96fdbaaf\
              43b1cd7f598ece23881b00e3ed0306887b0c785e27e8ad3f8223207104725dd4",
        cbc: "7649abac8119b246cee98e9b12e9197d5086cb9b507219ee95db113a917678b2\
              73bed6b8e3c1743b7116e69e222295163ff1caa1681fac09120eca307586e1a7",
        ctr: "874d6191b620e3261bef6864990db6ce9806f66b7970fdff8617187bb9fffdff\
              5ae4df3edbd5d35e5b4f09020db03eab1e031dda2fbe03d1792170a0f3009cee",
    },
    ModeVector {
        key: KEY_192,
        ecb: "bd334f1d6e45f25ff712a214571fa5cc974104846d0ad3ad7734ecb3ecee4eef\
              ef7afd2270e2e60adce0ba2face6444e9a4b41ba738d6c72fb16691603c18e0e",
        cbc: "4f021db243bc633d7178183a9fa071e8b4d9ada9ad7dedf4e5e738763f69145a\
              571b242012fb7ae07fa9baac3df102e008b0e27988598881d920a9e64f5615cd",
        ctr: "1abc932417521ca24f2b0459fe7e6e0b090339ec0aa6faefd5ccc2c6f4ce8e94\
              1e36b26bd1ebc670d1bd1d665620abf74f78a7f6d29809585a97daec58c6b050",
    },
    ModeVector {
        key: KEY_256,
        ecb: "f3eed1bdb5d2a03c064b5a7e3db181f8591ccb10d410ed26dc5ba74a31362870\
              b6ed21b99ca6f4f9f153e7b1beafed1d23304b7a39f9f3ff067d8d8f9e24ecc7",
        cbc: "f58c4c04d6e5f1ba779eabfb5f7bfbd69cfc4e967edb808d679f777bc6702c7d\
              39f23369a9d9bacfa530e26304231461b2eb05e2c39be9fcda6c19078c6a9d1b",
        ctr: "601ec313775789a5b7a7f504bbf3d228f443e3ca4d62b59aca84e990cacaf5c5\
              2b0930daa23de94ce87017ba2d84988ddfc9c58db67aada613c2dd08457941a6",
    },
];

#[test]
fn test_fips197_single_blocks() {
    let plain = hex_bytes("00112233445566778899aabbccddeeff");
    let cases = [
        (
            "000102030405060708090a0b0c0d0e0f",
            "69c4e0d86a7b0430d8cdb78070b4c55a",
            10,
        ),
        (
            "000102030405060708090a0b0c0d0e0f1011121314151617",
            "dda97ca4864cdfe06eaf70a0ec0d7191",
            12,
        ),
        (
            "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f",
            "8ea2b7ca516745bfeafc49904b496089",
            14,
        ),
    ];

    for (key, expected, rounds) in cases {
        let aes = Rijndael::new(&hex_bytes(key)).unwrap();
        assert_eq!(aes.rounds(), rounds);

        let mut block = plain.clone();
        aes.encrypt_block_in_place(&mut block, 0);
        assert_eq!(hex::encode(&block), expected);

        aes.decrypt_block_in_place(&mut block, 0);
        assert_eq!(block, plain);
    }
}

#[test]
fn test_sp800_38a_ecb() {
    let plain = hex_bytes(PLAINTEXT);
    for v in &VECTORS {
        let ecb = Ecb::new(Rijndael::new(&hex_bytes(v.key)).unwrap());
        let mut out = vec![0u8; plain.len()];
        ecb.encrypt(&plain, 0, plain.len(), &mut out, 0);
        assert_eq!(hex::encode(&out), v.ecb, "key {}", v.key);

        ecb.decrypt_in_place(&mut out, 0, plain.len());
        assert_eq!(out, plain);
    }
}

#[test]
fn test_sp800_38a_cbc() {
    let plain = hex_bytes(PLAINTEXT);
    for v in &VECTORS {
        let key = hex_bytes(v.key);
        let mut enc = Cbc::new(Rijndael::new(&key).unwrap(), &hex_bytes(IV)).unwrap();
        let mut out = vec![0u8; plain.len()];
        enc.encrypt(&plain, 0, plain.len(), &mut out, 0);
        assert_eq!(hex::encode(&out), v.cbc, "key {}", v.key);

        let mut dec = Cbc::new(Rijndael::new(&key).unwrap(), &hex_bytes(IV)).unwrap();
        let mut back = vec![0u8; plain.len()];
        dec.decrypt(&out, 0, out.len(), &mut back, 0);
        assert_eq!(back, plain);
    }
}

#[test]
fn test_cbc_first_block_prefix() {
    let mut cbc = Cbc::new(
        Rijndael::new(&hex_bytes(KEY_128)).unwrap(),
        &hex_bytes(IV),
    )
    .unwrap();
    let mut buf = hex_bytes(PLAINTEXT);
    cbc.encrypt_in_place(&mut buf, 0, 16);
    assert_eq!(hex::encode(&buf[..16]), "7649abac8119b246cee98e9b12e9197d");
    assert_eq!(cbc.iv(), &buf[..16]);
}

#[test]
fn test_cbc_chaining_carries_across_calls() {
    let plain = hex_bytes(PLAINTEXT);
    let key = hex_bytes(KEY_256);
    let mut cbc = Cbc::new(Rijndael::new(&key).unwrap(), &hex_bytes(IV)).unwrap();

    let mut out = vec![0u8; plain.len()];
    cbc.encrypt(&plain, 0, 16, &mut out, 0);
    cbc.encrypt(&plain, 16, 48, &mut out, 16);
    assert_eq!(hex::encode(&out), VECTORS[2].cbc);
}

#[test]
fn test_cbc_set_iv_restarts_chain() {
    let plain = hex_bytes(PLAINTEXT);
    let mut cbc = Cbc::new(Rijndael::new(&hex_bytes(KEY_128)).unwrap(), &[0u8; 16]).unwrap();
    let mut scratch = [0u8; 16];
    cbc.encrypt(&plain, 0, 16, &mut scratch, 0);

    cbc.set_iv(&hex_bytes(IV)).unwrap();
    let mut out = vec![0u8; plain.len()];
    cbc.encrypt(&plain, 0, plain.len(), &mut out, 0);
    assert_eq!(hex::encode(&out), VECTORS[0].cbc);
    assert!(cbc.set_iv(&[0u8; 15]).is_err());
}

#[test]
fn test_ctr_set_counter_discards_buffered_keystream() {
    let plain = hex_bytes(PLAINTEXT);
    let mut ctr = Ctr::new(Rijndael::new(&hex_bytes(KEY_128)).unwrap(), &[0u8; 16]).unwrap();
    let mut scratch = [0u8; 5];
    ctr.apply(&plain, 0, 5, &mut scratch, 0);

    ctr.set_counter(&hex_bytes(COUNTER)).unwrap();
    assert_eq!(ctr.counter(), &hex_bytes(COUNTER)[..]);
    let mut out = vec![0u8; plain.len()];
    ctr.apply(&plain, 0, plain.len(), &mut out, 0);
    assert_eq!(hex::encode(&out), VECTORS[0].ctr);
}

#[test]
fn test_sp800_38a_ctr() {
    let plain = hex_bytes(PLAINTEXT);
    for v in &VECTORS {
        let key = hex_bytes(v.key);
        let mut ctr = Ctr::new(Rijndael::new(&key).unwrap(), &hex_bytes(COUNTER)).unwrap();
        let mut out = vec![0u8; plain.len()];
        // uneven split exercises the buffered partial keystream block
        ctr.apply(&plain, 0, 7, &mut out, 0);
        ctr.apply(&plain, 7, plain.len() - 7, &mut out, 7);
        assert_eq!(hex::encode(&out), v.ctr, "key {}", v.key);
    }
}

#[test]
fn test_ctr_counter_wraps_to_zero() {
    let key = hex_bytes(KEY_128);
    let mut ctr = Ctr::new(Rijndael::new(&key).unwrap(), &[0xff; 16]).unwrap();
    let mut buf = [0u8; 32];
    ctr.apply_in_place(&mut buf, 0, 32);

    assert_eq!(hex::encode(&buf[..16]), "8af2860142f786f409307c1a3f7eaaac");
    assert_eq!(hex::encode(&buf[16..]), "7df76b0c1ab899b33e42f047b91b546f");
    let mut next = [0u8; 16];
    next[15] = 1;
    assert_eq!(ctr.counter(), &next[..]);
}

#[test]
fn test_in_place_matches_out_of_place_with_guards() {
    let key = hex_bytes(KEY_192);
    let plain = hex_bytes(PLAINTEXT);

    let mut reference = vec![0u8; 64];
    Cbc::new(Rijndael::new(&key).unwrap(), &hex_bytes(IV))
        .unwrap()
        .encrypt(&plain, 0, 64, &mut reference, 0);

    let mut buf = vec![0xc3; 64 + 9 + 13];
    buf[9..73].copy_from_slice(&plain);
    Cbc::new(Rijndael::new(&key).unwrap(), &hex_bytes(IV))
        .unwrap()
        .encrypt_in_place(&mut buf, 9, 64);

    assert_eq!(&buf[9..73], &reference[..]);
    assert!(buf[..9].iter().all(|&b| b == 0xc3));
    assert!(buf[73..].iter().all(|&b| b == 0xc3));
}

#[test]
fn test_rijndael_key_lengths() {
    for len in [16, 24, 32] {
        assert!(Rijndael::new(&vec![0u8; len]).is_ok());
    }
    for len in [0, 8, 15, 20, 33] {
        assert!(matches!(
            Rijndael::new(&vec![0u8; len]),
            Err(CryptoError::InvalidKeyLength { .. })
        ));
    }
}

#[test]
fn test_mode_iv_lengths() {
    let aes = Rijndael::new(&hex_bytes(KEY_128)).unwrap();
    assert!(matches!(
        Cbc::new(&aes, &[0u8; 8]),
        Err(CryptoError::InvalidIvLength { expected: 16, actual: 8 })
    ));
    assert!(Ctr::new(&aes, &[0u8; 17]).is_err());
}

#[test]
#[should_panic(expected = "exceeds buffer")]
fn test_window_past_end_panics() {
    let aes = Rijndael::new(&hex_bytes(KEY_128)).unwrap();
    let mut buf = [0u8; 20];
    Ecb::new(&aes).encrypt_in_place(&mut buf, 8, 16);
}
