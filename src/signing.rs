// Copyright 2020 Yao Pengfei.
//
// Permission to use, copy, modify, and/or distribute this software for any
// purpose with or without fee is hereby granted, provided that the above
// copyright notice and this permission notice appear in all copies.
//
// THE SOFTWARE IS PROVIDED "AS IS" AND THE AUTHORS DISCLAIM ALL WARRANTIES
// WITH REGARD TO THIS SOFTWARE INCLUDING ALL IMPLIED WARRANTIES OF
// MERCHANTABILITY AND FITNESS. IN NO EVENT SHALL THE AUTHORS BE LIABLE FOR ANY
// SPECIAL, DIRECT, INDIRECT, OR CONSEQUENTIAL DAMAGES OR ANY DAMAGES
// WHATSOEVER RESULTING FROM LOSS OF USE, DATA OR PROFITS, WHETHER IN AN ACTION
// OF CONTRACT, NEGLIGENCE OR OTHER TORTIOUS ACTION, ARISING OUT OF OR IN
// CONNECTION WITH THE USE OR PERFORMANCE OF THIS SOFTWARE.

use crate::curve::{
    affine_from_jacobian, bn_point_mul, bn_scalar_add_mod, bn_scalar_mul_mod, bn_scalar_sub_mod,
    bn_scalar_to_inv, bn_to_bytes,
};
use crate::error::{Error, Result};
use crate::param::CurveCtx;
use crate::private::{check_private_key, create_private_key, random_scalar, MAX_RETRIES};
use crate::public::{Point, PublicKey, BN_LENGTH};
use crate::rand::SecureRandom;
use crate::sm3::{Sm3Digest, SM3_DIGEST_LEN};
use crate::verification::Signature;
use num_bigint::BigUint;
use num_traits::{One, Zero};
use std::fmt;

/// User id assumed when the caller gives none.
pub const DEFAULT_USER_ID: &[u8] = b"1234567812345678";

/// `Z = SM3(ENTL ‖ ID ‖ a ‖ b ‖ Gx ‖ Gy ‖ Qx ‖ Qy)`.
pub fn sm2_za(pk: &PublicKey, user_id: &[u8], cctx: &CurveCtx) -> Result<[u8; SM3_DIGEST_LEN]> {
    // ENTL is the id length in bits, two bytes
    let entl = user_id
        .len()
        .checked_mul(8)
        .filter(|bits| *bits <= u16::MAX as usize)
        .ok_or(Error::UserIdTooLong(user_id.len()))? as u16;

    let mut ctx = Sm3Digest::new();
    ctx.update(&entl.to_be_bytes());
    ctx.update(user_id);
    ctx.update(&bn_to_bytes(&cctx.a));
    ctx.update(&bn_to_bytes(&cctx.b));
    ctx.update(&bn_to_bytes(&cctx.g_x));
    ctx.update(&bn_to_bytes(&cctx.g_y));
    ctx.update(pk.x_bytes());
    ctx.update(pk.y_bytes());
    Ok(ctx.finalize())
}

/// The signed digest `e = SM3(Z ‖ M)`.
pub fn sm2_digest(
    pk: &PublicKey,
    user_id: &[u8],
    msg: &[u8],
    cctx: &CurveCtx,
) -> Result<[u8; SM3_DIGEST_LEN]> {
    let za = sm2_za(pk, user_id, cctx)?;
    let mut ctx = Sm3Digest::new();
    ctx.update(&za);
    ctx.update(msg);
    Ok(ctx.finalize())
}

pub struct KeyPair {
    d: BigUint,
    pk: PublicKey,
}

impl KeyPair {
    /// Imports a big-endian private scalar; leading zero bytes may be
    /// trimmed, so anything from 1 to 32 bytes is accepted.
    pub fn new(private_key: &[u8], cctx: &CurveCtx) -> Result<Self> {
        if private_key.is_empty() {
            return Err(Error::EmptyInput);
        }
        if private_key.len() > BN_LENGTH {
            return Err(Error::InvalidPrivateKey);
        }
        let d = BigUint::from_bytes_be(private_key);
        check_private_key(&d, cctx)?;
        let pk = public_from_private(&d, cctx)?;
        Ok(KeyPair { d, pk })
    }

    pub fn from_hex(private_key: &str, cctx: &CurveCtx) -> Result<Self> {
        let private_key = private_key.trim();
        if private_key.is_empty() {
            return Err(Error::EmptyInput);
        }
        // odd-length hex comes from trimmed leading zeros
        let bytes = if private_key.len() % 2 == 1 {
            hex::decode(format!("0{}", private_key))?
        } else {
            hex::decode(private_key)?
        };
        Self::new(&bytes, cctx)
    }

    pub fn generate(rng: &mut dyn SecureRandom, cctx: &CurveCtx) -> Result<Self> {
        let d = create_private_key(rng, cctx)?;
        let pk = public_from_private(&d, cctx)?;
        log::debug!("generated sm2 key pair {}", pk.to_hex());
        Ok(KeyPair { d, pk })
    }

    pub fn public_key(&self) -> PublicKey {
        self.pk
    }

    pub fn private_key_bytes(&self) -> [u8; BN_LENGTH] {
        bn_to_bytes(&self.d)
    }

    pub fn private_key_hex(&self) -> String {
        hex::encode_upper(self.private_key_bytes())
    }

    pub(crate) fn d(&self) -> &BigUint {
        &self.d
    }

    pub fn sm2_sign(
        &self,
        rng: &mut dyn SecureRandom,
        message: &[u8],
        cctx: &CurveCtx,
    ) -> Result<Signature> {
        self.sm2_sign_with_id(rng, DEFAULT_USER_ID, message, cctx)
    }

    pub fn sm2_sign_with_id(
        &self,
        rng: &mut dyn SecureRandom,
        user_id: &[u8],
        message: &[u8],
        cctx: &CurveCtx,
    ) -> Result<Signature> {
        let digest = sm2_digest(&self.pk, user_id, message, cctx)?;

        self.sm2_sign_digest(rng, &digest, cctx)
    }

    /// Signs a precomputed `e`. Both `r` and `s` are redrawn until they fill
    /// all 32 bytes, so the fixed-width encodings never need padding.
    pub fn sm2_sign_digest(
        &self,
        rng: &mut dyn SecureRandom,
        digest: &[u8],
        cctx: &CurveCtx,
    ) -> Result<Signature> {
        let e = BigUint::from_bytes_be(digest);
        let left = bn_scalar_to_inv(&bn_scalar_add_mod(&self.d, &BigUint::one(), cctx), cctx);

        for attempt in 0..MAX_RETRIES {
            let rk = random_scalar(rng, &cctx.n)?;
            let rq = bn_point_mul(&cctx.g_point, &rk, cctx);
            let (x1, _) = affine_from_jacobian(&rq, cctx)?;

            let r = (&e + &x1) % &cctx.n;
            if r.is_zero() || &r + &rk == cctx.n || !fills_field(&r) {
                log::trace!("sm2 sign: degenerate r, attempt {}", attempt);
                continue;
            }

            let dr = bn_scalar_mul_mod(&self.d, &r, cctx);
            let right = bn_scalar_sub_mod(&rk, &dr, cctx);
            let s = bn_scalar_mul_mod(&left, &right, cctx);
            if s.is_zero() || !fills_field(&s) {
                log::trace!("sm2 sign: degenerate s, attempt {}", attempt);
                continue;
            }

            return Signature::from_scalars(r, s);
        }
        Err(Error::RetryExhausted("sm2 sign"))
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair").field("pk", &self.pk).finish()
    }
}

fn fills_field(a: &BigUint) -> bool {
    a.bits() > (BN_LENGTH - 1) * 8
}

pub fn public_from_private(private_key: &BigUint, cctx: &CurveCtx) -> Result<PublicKey> {
    let pk_point = Point::new(bn_point_mul(&cctx.g_point, private_key, cctx));

    PublicKey::from_point(&pk_point, cctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rand::testing::FixedRandom;
    use crate::rand::SystemRandom;
    use hex_literal::hex;

    const PRIVATE_KEY: [u8; 32] =
        hex!("3945208f7b2144b13f36e38ac6d39f95889393692860b51a42fb81ef4df7c5b8");
    const K: [u8; 32] = hex!("59276e27d506861a16680f3ad9c02dccef3cc1fa3cdbe4ce6d54b80deac1bc21");

    #[test]
    fn public_from_private_test() {
        let cctx = CurveCtx::sm2p256();
        let key_pair = KeyPair::new(&PRIVATE_KEY, cctx).unwrap();
        assert_eq!(
            key_pair.public_key().to_hex(),
            "0409F9DF311E5421A150DD7D161E4BC5C672179FAD1833FC076BB08FF356F35020\
             CCEA490CE26775A52DC6EA718CC1AA600AED05FBF35E084A6632F6072DA9AD13"
        );
        assert_eq!(key_pair.private_key_bytes(), PRIVATE_KEY);
    }

    #[test]
    fn za_and_digest_test() {
        let cctx = CurveCtx::sm2p256();
        let pk = KeyPair::new(&PRIVATE_KEY, cctx).unwrap().public_key();
        assert_eq!(
            sm2_za(&pk, DEFAULT_USER_ID, cctx).unwrap(),
            hex!("b2e14c5c79c6df5b85f4fe7ed8db7a262b9da7e07ccb0ea9f4747b8ccda8a4f3")
        );
        assert_eq!(
            sm2_digest(&pk, DEFAULT_USER_ID, b"message digest", cctx).unwrap(),
            hex!("f0b43e94ba45accaace692ed534382eb17e6ab5a19ce7b31f4486fdfc0d28640")
        );
    }

    #[test]
    fn digest_matches_libsm_test() {
        let cctx = CurveCtx::sm2p256();
        let pk = KeyPair::new(&PRIVATE_KEY, cctx).unwrap().public_key();
        let ctx = libsm::sm2::signature::SigCtx::new();
        let pk_point = ctx.load_pubkey(pk.bytes_less_safe()).unwrap();
        let expected = ctx.hash("1234567812345678", &pk_point, b"hello world");
        assert_eq!(
            sm2_digest(&pk, DEFAULT_USER_ID, b"hello world", cctx).unwrap(),
            expected
        );
    }

    #[test]
    fn user_id_too_long_test() {
        let cctx = CurveCtx::sm2p256();
        let pk = KeyPair::new(&PRIVATE_KEY, cctx).unwrap().public_key();
        let id = vec![0x61u8; 8192];
        assert_eq!(sm2_za(&pk, &id, cctx), Err(Error::UserIdTooLong(8192)));
        assert!(sm2_za(&pk, &id[..8191], cctx).is_ok());
    }

    #[test]
    fn sm2_sign_known_answer_test() {
        let cctx = CurveCtx::sm2p256();
        let key_pair = KeyPair::new(&PRIVATE_KEY, cctx).unwrap();
        let mut rng = FixedRandom::new(&K);

        let sig = key_pair
            .sm2_sign(&mut rng, b"message digest", cctx)
            .unwrap();

        assert_eq!(
            sig.r(),
            hex!("f5a03b0648d2c4630eeac513e1bb81a15944da3827d5b74143ac7eaceee720b3")
        );
        assert_eq!(
            sig.s(),
            hex!("b1b6aa29df212fd8763182bc0d421ca1bb9038fd1f7f42d4840b69c485bbc1aa")
        );
    }

    #[test]
    fn sm2_sign_verify_test() {
        let test_word = b"hello world";
        let mut rng = SystemRandom::new();
        let cctx = CurveCtx::sm2p256();

        let key_pair = KeyPair::generate(&mut rng, cctx).unwrap();

        let sig = key_pair.sm2_sign(&mut rng, test_word, cctx).unwrap();

        let r = sig.r();
        let s = sig.s();
        let sig2 = Signature::new(&r, &s);

        assert!(sig2.sm2_verify(&key_pair.public_key(), test_word, cctx));
        assert!(!sig2.sm2_verify(&key_pair.public_key(), b"hello worle", cctx));
    }

    #[test]
    fn private_key_import_test() {
        let cctx = CurveCtx::sm2p256();
        let one = KeyPair::new(&[1u8], cctx).unwrap();
        assert_eq!(one.public_key().x_bytes(), &bn_to_bytes(&cctx.g_x)[..]);
        let one_hex = KeyPair::from_hex("001", cctx).unwrap();
        assert_eq!(one_hex.public_key(), one.public_key());

        assert_eq!(KeyPair::new(&[], cctx).unwrap_err(), Error::EmptyInput);
        assert_eq!(
            KeyPair::new(&[0u8; 32], cctx).unwrap_err(),
            Error::InvalidPrivateKey
        );
        assert_eq!(
            KeyPair::new(&[1u8; 33], cctx).unwrap_err(),
            Error::InvalidPrivateKey
        );
        assert_eq!(
            KeyPair::from_hex("xyz", cctx).unwrap_err(),
            Error::InvalidHex
        );
    }

    #[test]
    fn debug_hides_private_key_test() {
        let cctx = CurveCtx::sm2p256();
        let key_pair = KeyPair::new(&PRIVATE_KEY, cctx).unwrap();
        let shown = format!("{:?}", key_pair);
        assert!(!shown.to_lowercase().contains(&hex::encode(PRIVATE_KEY)));
    }
}
