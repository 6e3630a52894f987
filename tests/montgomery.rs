mod common;

use common::hex_bytes;
use ssh_primitives::CryptoError;
use ssh_primitives::ec::montgomery::MontgomeryCurve;
use ssh_primitives::ec::{Curve, ScalarMultiplication};
use ssh_primitives::rng::Csprng;

fn iterate(curve: MontgomeryCurve, iterations: usize) -> String {
    let mut k = curve.base_point();
    let mut u = curve.base_point();
    for _ in 0..iterations {
        let next = curve.scalar_multiplication(&k, &u).unwrap();
        u = std::mem::replace(&mut k, next);
    }
    hex::encode(k)
}

#[test]
fn test_x25519_rfc7748_vectors() {
    let cases = [
        (
            "a546e36bf0527c9d3b16154b82465edd62144c0ac1fc5a18506a2244ba449ac4",
            "e6db6867583030db3594c1a424b15f7c726624ec26b3353b10a903a6d0ab1c4c",
            "c3da55379de9c6908e94ea4df28d084f32eccf03491c71f754b4075577a28552",
        ),
        (
            "4b66e9d4d1b4673c5ad22691957d6af5c11b6421e0ea01d42ca4169e7918ba0d",
            "e5210f12786811d3f4b7959d0538ae2c31dbe7106fc03c3efc4cd549c715a493",
            "95cbde9476e8907d7aade45cb4b873f88b595a68799fa152e6f8f7647aac7957",
        ),
    ];
    for (scalar, u, expected) in cases {
        let out = MontgomeryCurve::X25519
            .scalar_multiplication(&hex_bytes(scalar), &hex_bytes(u))
            .unwrap();
        assert_eq!(hex::encode(out), expected);
    }
}

#[test]
fn test_x448_rfc7748_vectors() {
    let cases = [
        (
            "3d262fddf9ec8e88495266fea19a34d28882acef045104d0d1aae121700a779c\
             984c24f8cdd78fbff44943eba368f54b29259a4f1c600ad3",
            "06fce640fa3487bfda5f6cf2d5263f8aad88334cbd07437f020f08f9814dc031\
             ddbdc38c19c6da2583fa5429db94ada18aa7a7fb4ef8a086",
            "ce3e4ff95a60dc6697da1db1d85e6afbdf79b50a2412d7546d5f239fe14fbaad\
             eb445fc66a01b0779d98223961111e21766282f73dd96b6f",
        ),
        (
            "203d494428b8399352665ddca42f9de8fef600908e0d461cb021f8c538345dd7\
             7c3e4806e25f46d3315c44e0a5b4371282dd2c8d5be3095f",
            "0fbcc2f993cd56d3305b0b7d9e55d4c1a8fb5dbb52f8e9a1e9b6201b165d0158\
             94e56c4d3570bee52fe205e28a78b91cdfbde71ce8d157db",
            "884a02576239ff7a2f2f63b2db6a9ff37047ac13568e1e30fe63c4a7ad1b3ee3\
             a5700df34321d62077e63633c575c1c954514e99da7c179d",
        ),
    ];
    for (scalar, u, expected) in cases {
        let out = MontgomeryCurve::X448
            .scalar_multiplication(&hex_bytes(scalar), &hex_bytes(u))
            .unwrap();
        assert_eq!(hex::encode(out), expected);
    }
}

#[test]
fn test_x25519_iterated() {
    assert_eq!(
        iterate(MontgomeryCurve::X25519, 1),
        "422c8e7a6227d7bca1350b3e2bb7279f7897b87bb6854b783c60e80311ae3079"
    );
    assert_eq!(
        iterate(MontgomeryCurve::X25519, 1000),
        "684cf59ba83309552800ef566f2f4d3c1c3887c49360e3875f2eb94d99532c51"
    );
}

#[test]
fn test_x448_iterated() {
    assert_eq!(
        iterate(MontgomeryCurve::X448, 1),
        "3f482c8a9f19b01e6c46ee9711d9dc14fd4bf67af30765c2ae2b846a4d23a8cd\
         0db897086239492caf350b51f833868b9bc2b3bca9cf4113"
    );
    assert_eq!(
        iterate(MontgomeryCurve::X448, 1000),
        "aa3b4749d55b9daf1e5b00288826c467274ce3ebbdd5c17b975e09d4af6c67cf\
         10d087202db88286e2b79fceea3ec353ef54faa26e219f38"
    );
}

#[test]
#[cfg_attr(not(feature = "slow-tests"), ignore = "one million ladder steps")]
fn test_x25519_iterated_million() {
    assert_eq!(
        iterate(MontgomeryCurve::X25519, 1_000_000),
        "7c3911e0ab2586fd864497297e575e6f3bc601c0883c30df5f4dd2d24f131654"
    );
}

#[test]
#[cfg_attr(not(feature = "slow-tests"), ignore = "one million ladder steps")]
fn test_x448_iterated_million() {
    assert_eq!(
        iterate(MontgomeryCurve::X448, 1_000_000),
        "077f453681caca3693198420bbe515cae0002472519b3e67661a7e89cab94695\
         c8f4bcd66e61b9b9c946da8d524de3d69bd9d9d66b997e37"
    );
}

#[test]
fn test_x25519_key_agreement_vectors() {
    let curve = MontgomeryCurve::X25519;
    let alice = hex_bytes("77076d0a7318a57d3c16c17251b26645df4c2f87ebc0992ab177fba51db92c2a");
    let bob = hex_bytes("5dab087e624a8a4b79e17f8b83800ee66f3bb1292618b6fd1c2f8b27ff88e0eb");

    let alice_pub = curve.public_key(&alice).unwrap();
    let bob_pub = curve.public_key(&bob).unwrap();
    assert_eq!(
        hex::encode(&alice_pub),
        "8520f0098930a754748b7ddcb43ef75a0dbf3a0d26381af4eba4a98eaa9b4e6a"
    );
    assert_eq!(
        hex::encode(&bob_pub),
        "de9edb7d7b7dc1b4d35b61c2ece435373f8343c85b78674dadfc7e146f882b4f"
    );

    let shared = "4a5d9d5ba4ce2de1728e3bf480350f25e07e21c947d19e3376f09b3c1e161742";
    assert_eq!(hex::encode(curve.agree(&alice, &bob_pub).unwrap()), shared);
    assert_eq!(hex::encode(curve.agree(&bob, &alice_pub).unwrap()), shared);
}

#[test]
fn test_x448_key_agreement_vectors() {
    let curve = MontgomeryCurve::X448;
    let alice = hex_bytes(
        "9a8f4925d1519f5775cf46b04b5800d4ee9ee8bae8bc5565d498c28dd9c9baf5\
         74a9419744897391006382a6f127ab1d9ac2d8c0a598726b",
    );
    let bob_pub = hex_bytes(
        "3eb7a829b0cd20f5bcfc0b599b6feccf6da4627107bdb0d4f345b43027d8b972\
         fc3e34fb4232a13ca706dcb57aec3dae07bdc1c67bf33609",
    );
    assert_eq!(
        hex::encode(curve.agree(&alice, &bob_pub).unwrap()),
        "07fff4181ac6cc95ec1c16a94a0f74d12da232ce40a77552281d282bb60c0b56\
         fd2464c335543936521c24403085d59a449a5037514a879d"
    );
}

#[test]
fn test_fix_scalar_and_u_coordinate() {
    let mut k = [0xffu8; 32];
    MontgomeryCurve::X25519.fix_scalar(&mut k).unwrap();
    assert_eq!(k[0], 0xf8);
    assert_eq!(k[31], 0x7f);

    let mut k = [0u8; 56];
    MontgomeryCurve::X448.fix_scalar(&mut k).unwrap();
    assert_eq!(k[0], 0);
    assert_eq!(k[55], 0x80);

    let mut u = [0xffu8; 32];
    MontgomeryCurve::X25519.fix_u_coordinate(&mut u).unwrap();
    assert_eq!(u[31], 0x7f);

    let mut u = [0xffu8; 56];
    MontgomeryCurve::X448.fix_u_coordinate(&mut u).unwrap();
    assert!(u.iter().all(|&b| b == 0xff));
}

#[test]
fn test_scalar_multiplication_does_not_modify_inputs() {
    let scalar = [0xffu8; 32];
    let u = [0xffu8; 32];
    MontgomeryCurve::X25519.scalar_multiplication(&scalar, &u).unwrap();
    assert_eq!(scalar, [0xff; 32]);
    assert_eq!(u, [0xff; 32]);
}

#[test]
fn test_wrong_lengths_are_rejected() {
    assert!(matches!(
        MontgomeryCurve::X25519.scalar_multiplication(&[0u8; 31], &[9u8; 32]),
        Err(CryptoError::MalformedInput(_))
    ));
    assert!(MontgomeryCurve::X448.scalar_multiplication(&[0u8; 56], &[5u8; 32]).is_err());
    assert!(MontgomeryCurve::X448.fix_scalar(&mut [0u8; 57]).is_err());
}

#[test]
fn test_agree_rejects_low_order_point() {
    common::init_tracing();
    for curve in [MontgomeryCurve::X25519, MontgomeryCurve::X448] {
        let private = vec![0x42u8; curve.key_len()];
        let zero = vec![0u8; curve.key_len()];
        assert_eq!(curve.agree(&private, &zero), Err(CryptoError::InvalidPoint));
    }
}

#[test]
fn test_generated_keys_agree() {
    let mut rng = Csprng::from_seed([7u8; 32]);
    for curve in [MontgomeryCurve::X25519, MontgomeryCurve::X448] {
        let a = curve.generate_private(&mut rng);
        let b = curve.generate_private(&mut rng);
        let a_pub = curve.public_key(&a).unwrap();
        let b_pub = curve.public_key(&b).unwrap();
        assert_eq!(curve.agree(&a, &b_pub).unwrap(), curve.agree(&b, &a_pub).unwrap());
    }
}

#[test]
fn test_curve_dispatch_matches_engine() {
    for name in ["curve25519", "x25519", "curve448", "x448"] {
        let curve = Curve::find_by_name(name).unwrap();
        let Curve::Montgomery(engine) = curve else {
            panic!("{name} resolved to the wrong family");
        };
        let scalar = vec![0x31u8; engine.key_len()];
        assert_eq!(
            curve.scalar_multiply(&scalar, &curve.base_point()).unwrap(),
            engine.public_key(&scalar).unwrap()
        );
        assert_eq!(ScalarMultiplication::name(&curve), engine.name());
    }
}
