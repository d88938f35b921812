use hex_literal::hex;
use proptest::prelude::*;
use sm_suite::sm4::SM4_BLOCK_SIZE;
use sm_suite::text::{sm4_decrypt_cbc, sm4_encrypt_cbc, sm4_encrypt_ecb, Sm4Options, TextEncoding};
use sm_suite::{Error, Sm4Context, Sm4Mode};

#[test]
fn standard_vector_ecb() {
    let key = hex!("0123456789abcdeffedcba9876543210");
    let enc = Sm4Context::set_key_enc(&key).unwrap().with_padding(false);
    assert_eq!(enc.mode(), Sm4Mode::Encrypt);
    assert_eq!(
        enc.crypt_ecb(&key).unwrap(),
        hex!("681edf34d206965e86b3e94f536e4246").to_vec()
    );
}

#[test]
fn million_rounds() {
    // GB/T 32907 example 2
    let key = hex!("0123456789abcdeffedcba9876543210");
    let enc = Sm4Context::set_key_enc(&key).unwrap();
    let mut block = key;
    for _ in 0..1_000_000 {
        block = enc.crypt_block(&block);
    }
    assert_eq!(block, hex!("595298c7c6fd271f0402f804c33d3f66"));
}

#[test]
fn unpadded_decrypt_needs_whole_blocks() {
    let dec = Sm4Context::set_key_dec(&[7u8; 16]).unwrap().with_padding(false);
    assert!(!dec.is_padding());
    assert_eq!(dec.crypt_ecb(&[0u8; 20]).err(), Some(Error::InvalidDataLength(20)));
    assert_eq!(
        dec.crypt_cbc(&[0u8; 16], &[0u8; 31]).err(),
        Some(Error::InvalidDataLength(31))
    );
}

proptest! {
    #[test]
    fn ecb_round_trip(key in any::<[u8; 16]>(), msg in proptest::collection::vec(any::<u8>(), 0..200)) {
        let enc = Sm4Context::set_key_enc(&key).unwrap();
        let dec = Sm4Context::set_key_dec(&key).unwrap();
        let c = enc.crypt_ecb(&msg).unwrap();
        prop_assert_eq!(c.len() % SM4_BLOCK_SIZE, 0);
        prop_assert!(c.len() > msg.len());
        prop_assert_eq!(dec.crypt_ecb(&c).unwrap(), msg);
    }

    #[test]
    fn cbc_round_trip(
        key in any::<[u8; 16]>(),
        iv in any::<[u8; 16]>(),
        msg in proptest::collection::vec(any::<u8>(), 0..200),
    ) {
        let enc = Sm4Context::set_key_enc(&key).unwrap();
        let dec = Sm4Context::set_key_dec(&key).unwrap();
        let c = enc.crypt_cbc(&iv, &msg).unwrap();
        prop_assert_eq!(dec.crypt_cbc(&iv, &c).unwrap(), msg);
    }

    #[test]
    fn unpadded_round_trip(key in any::<[u8; 16]>(), blocks in proptest::collection::vec(any::<[u8; 16]>(), 0..8)) {
        let msg = blocks.concat();
        let enc = Sm4Context::set_key_enc(&key).unwrap().with_padding(false);
        let dec = Sm4Context::set_key_dec(&key).unwrap().with_padding(false);
        let c = enc.crypt_ecb(&msg).unwrap();
        prop_assert_eq!(c.len(), msg.len());
        prop_assert_eq!(dec.crypt_ecb(&c).unwrap(), msg);
    }

    #[test]
    fn text_facade_matches_context(
        key in "[a-zA-Z0-9]{16}",
        iv in "[a-zA-Z0-9]{16}",
        msg in "\\PC{0,40}",
    ) {
        let opts = Sm4Options {
            key: key.clone(),
            iv: iv.clone(),
            output: TextEncoding::Hex,
            ..Default::default()
        };
        let enc = Sm4Context::set_key_enc(key.as_bytes()).unwrap();

        let ecb = sm4_encrypt_ecb(&opts, &msg).unwrap();
        prop_assert_eq!(hex::decode(&ecb).unwrap(), enc.crypt_ecb(msg.as_bytes()).unwrap());

        let cbc = sm4_encrypt_cbc(&opts, &msg).unwrap();
        prop_assert_eq!(
            hex::decode(&cbc).unwrap(),
            enc.crypt_cbc(iv.as_bytes(), msg.as_bytes()).unwrap()
        );
        prop_assert_eq!(sm4_decrypt_cbc(&opts, &cbc).unwrap(), msg);
    }
}
