use rand_core::RngCore;
use ssh_primitives::rng::Csprng;

#[test]
fn test_csprng_deterministic_from_seed() {
    let mut rng1 = Csprng::from_seed([0x42u8; 32]);
    let mut rng2 = Csprng::from_seed([0x42u8; 32]);

    let mut a = [0u8; 128];
    let mut b = [0u8; 128];
    rng1.fill_bytes(&mut a);
    rng2.fill_bytes(&mut b);
    assert_eq!(a, b);

    assert_eq!(rng1.next_u64(), rng2.next_u64());
}

#[test]
fn test_csprng_rekey_changes_output() {
    let mut rng = Csprng::from_seed([0xaau8; 32]);

    let mut a = [0u8; 64];
    let mut b = [0u8; 64];
    rng.fill_bytes(&mut a);
    rng.fill_bytes(&mut b);
    assert_ne!(a, b);
}

#[test]
fn test_csprng_request_boundaries_matter() {
    // one 64-byte request and two 32-byte requests rekey at different points
    let mut whole = Csprng::from_seed([1u8; 32]);
    let mut split = Csprng::from_seed([1u8; 32]);

    let mut a = [0u8; 64];
    whole.fill(&mut a);

    let mut b = [0u8; 64];
    split.fill(&mut b[..32]);
    split.fill(&mut b[32..]);

    assert_eq!(a[..32], b[..32]);
    assert_ne!(a[32..], b[32..]);
}

#[test]
fn test_csprng_seeds_are_independent() {
    let mut a = [0u8; 32];
    let mut b = [0u8; 32];
    Csprng::from_seed([0u8; 32]).fill(&mut a);
    Csprng::from_seed([1u8; 32]).fill(&mut b);
    assert_ne!(a, b);
    assert!(a.iter().any(|&x| x != 0));
}

#[test]
fn test_csprng_from_os() {
    let mut rng1 = Csprng::from_os().unwrap();
    let mut rng2 = Csprng::from_os().unwrap();

    let mut a = [0u8; 32];
    let mut b = [0u8; 32];
    rng1.try_fill_bytes(&mut a).unwrap();
    rng2.try_fill_bytes(&mut b).unwrap();
    assert_ne!(a, b);
}

#[test]
fn test_csprng_odd_lengths() {
    let mut rng = Csprng::from_seed([9u8; 32]);
    for len in [0usize, 1, 63, 65, 200] {
        let mut buf = vec![0u8; len];
        rng.fill_bytes(&mut buf);
        if len >= 63 {
            assert!(buf.iter().any(|&b| b != 0), "length {len}");
        }
    }
}

#[test]
fn test_csprng_debug_hides_state() {
    let rng = Csprng::from_seed([0x77u8; 32]);
    let debug = format!("{rng:?}");
    assert!(!debug.contains("77"));
}
