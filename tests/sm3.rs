use hex_literal::hex;
use proptest::prelude::*;
use sm_suite::{hmac_sm3, sm3_hash, sm3_hash_hex, Sm3Digest};

#[test]
fn one_shot_vectors() {
    assert_eq!(
        sm3_hash(b"abc"),
        hex!("66c7f0f462eeedd9d1f2d46bdc10e4e24167c4875cf2f7a2297da02b8f4ba8e0")
    );
    assert_eq!(
        sm3_hash_hex(b""),
        "1AB21D8355CFA17F8E61194831E81A8F22BEC8C728FEFB747ED035EB5082AA2B"
    );
}

#[test]
fn million_a() {
    let mut ctx = Sm3Digest::new();
    let chunk = [b'a'; 1000];
    for _ in 0..1000 {
        ctx.update(&chunk);
    }
    assert_eq!(
        ctx.finalize(),
        hex!("c8aaf89429554029e231941a2acc0ad61ff2a5acd8fadd25847a3a732b3b02c3")
    );
}

proptest! {
    #[test]
    fn split_updates_match_one_shot(
        msg in proptest::collection::vec(any::<u8>(), 0..300),
        cuts in proptest::collection::vec(any::<prop::sample::Index>(), 0..6),
    ) {
        let mut points: Vec<usize> = cuts.iter().map(|i| i.index(msg.len() + 1)).collect();
        points.sort_unstable();

        let mut ctx = Sm3Digest::new();
        let mut last = 0;
        for p in points {
            ctx.update(&msg[last..p]);
            last = p;
        }
        ctx.update(&msg[last..]);
        prop_assert_eq!(ctx.finalize(), sm3_hash(&msg));
    }

    #[test]
    fn reset_forgets_input(a in proptest::collection::vec(any::<u8>(), 0..100), b in proptest::collection::vec(any::<u8>(), 0..100)) {
        let mut ctx = Sm3Digest::new();
        ctx.update(&a);
        ctx.reset();
        ctx.update(&b);
        prop_assert_eq!(ctx.finalize(), sm3_hash(&b));
    }

    #[test]
    fn hmac_depends_on_key(key in proptest::collection::vec(any::<u8>(), 1..100), msg in proptest::collection::vec(any::<u8>(), 0..100)) {
        let mut other = key.clone();
        other[0] ^= 1;
        prop_assert_ne!(hmac_sm3(&key, &msg), hmac_sm3(&other, &msg));
    }
}
