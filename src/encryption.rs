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

//! SM2 public-key encryption (GB/T 32918.4).
//!
//! Ciphertext is `C1 ‖ C2 ‖ C3` or `C1 ‖ C3 ‖ C2`:
//! * `C1 = k·G`, 65-byte uncompressed point;
//! * `C2 = M ⊕ KDF(x2 ‖ y2)`, as long as the message;
//! * `C3 = SM3(x2 ‖ M ‖ y2)`;
//!
//! where `(x2, y2) = k·Q = d·C1`.

use crate::curve::{affine_from_jacobian, bn_point_mul, bn_to_bytes};
use crate::error::{Error, Result};
use crate::param::CurveCtx;
use crate::private::{check_private_key, random_scalar, MAX_RETRIES};
use crate::public::{Point, PublicKey, BN_LENGTH, PUBLIC_KEY_LEN};
use crate::rand::SecureRandom;
use crate::signing::KeyPair;
use crate::sm3::{Sm3Digest, SM3_DIGEST_LEN};
use num_bigint::BigUint;
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

pub const C1_LEN: usize = PUBLIC_KEY_LEN;
pub const C3_LEN: usize = SM3_DIGEST_LEN;
/// `C1` and `C3` with an empty `C2`.
pub const MIN_CIPHERTEXT_LEN: usize = C1_LEN + C3_LEN;

/// Order of the three ciphertext components.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CipherMode {
    C1C2C3,
    C1C3C2,
}

impl Default for CipherMode {
    fn default() -> Self {
        CipherMode::C1C2C3
    }
}

/// Per-message state: the KDF counter and keystream block, and the running
/// `C3` digest.
struct Sm2Cipher {
    // None once the 32-bit counter is spent
    ct: Option<u32>,
    key: [u8; SM3_DIGEST_LEN],
    key_off: usize,
    // SM3 over x2 ‖ y2, forked for every counter value
    sm3keybase: Sm3Digest,
    sm3c3: Sm3Digest,
    p2_y: [u8; BN_LENGTH],
}

impl Sm2Cipher {
    fn new(p2_x: &[u8; BN_LENGTH], p2_y: &[u8; BN_LENGTH]) -> Self {
        let mut sm3keybase = Sm3Digest::new();
        sm3keybase.update(p2_x);
        sm3keybase.update(p2_y);
        let mut sm3c3 = Sm3Digest::new();
        sm3c3.update(p2_x);

        Sm2Cipher {
            ct: Some(1),
            key: [0; SM3_DIGEST_LEN],
            key_off: SM3_DIGEST_LEN,
            sm3keybase,
            sm3c3,
            p2_y: *p2_y,
        }
    }

    fn next_key(&mut self) -> Result<()> {
        let ct = self.ct.ok_or(Error::MessageTooLong)?;
        let mut sm3keycur = self.sm3keybase.clone();
        sm3keycur.update(&ct.to_be_bytes());
        self.key = sm3keycur.finalize();
        self.key_off = 0;
        self.ct = ct.checked_add(1);
        Ok(())
    }

    fn xor_key(&mut self, data: &mut [u8]) -> Result<()> {
        for b in data.iter_mut() {
            if self.key_off == self.key.len() {
                self.next_key()?;
            }
            *b ^= self.key[self.key_off];
            self.key_off += 1;
        }
        Ok(())
    }

    fn encrypt(&mut self, data: &mut [u8]) -> Result<()> {
        self.sm3c3.update(data);
        self.xor_key(data)
    }

    fn decrypt(&mut self, data: &mut [u8]) -> Result<()> {
        self.xor_key(data)?;
        self.sm3c3.update(data);
        Ok(())
    }

    fn dofinal(mut self) -> [u8; C3_LEN] {
        self.sm3c3.update(&self.p2_y);
        core::mem::take(&mut self.sm3c3).finalize()
    }
}

impl Drop for Sm2Cipher {
    fn drop(&mut self) {
        self.key.zeroize();
        self.p2_y.zeroize();
    }
}

fn shared_point(point: &[BigUint; 3], scalar: &BigUint, cctx: &CurveCtx) -> Result<([u8; BN_LENGTH], [u8; BN_LENGTH])> {
    let (x2, y2) = affine_from_jacobian(&bn_point_mul(point, scalar, cctx), cctx)?;
    Ok((bn_to_bytes(&x2), bn_to_bytes(&y2)))
}

pub fn sm2_encrypt(
    pk: &PublicKey,
    msg: &[u8],
    rng: &mut dyn SecureRandom,
    mode: CipherMode,
    cctx: &CurveCtx,
) -> Result<Vec<u8>> {
    if msg.is_empty() {
        return Err(Error::EmptyInput);
    }
    let q = pk.to_point().to_bns();

    for attempt in 0..MAX_RETRIES {
        let k = random_scalar(rng, &cctx.n)?;
        let c1 = PublicKey::from_point(&Point::new(bn_point_mul(&cctx.g_point, &k, cctx)), cctx)?;
        let (x2, y2) = shared_point(&q, &k, cctx)?;

        let mut cipher = Sm2Cipher::new(&x2, &y2);
        let mut c2 = msg.to_vec();
        cipher.encrypt(&mut c2)?;
        // an all-zero keystream leaves the message unmasked
        if c2 == msg {
            log::trace!("sm2 encrypt: zero keystream, attempt {}", attempt);
            continue;
        }
        let c3 = cipher.dofinal();

        let mut out = Vec::with_capacity(C1_LEN + c2.len() + C3_LEN);
        out.extend_from_slice(c1.bytes_less_safe());
        match mode {
            CipherMode::C1C2C3 => {
                out.extend_from_slice(&c2);
                out.extend_from_slice(&c3);
            }
            CipherMode::C1C3C2 => {
                out.extend_from_slice(&c3);
                out.extend_from_slice(&c2);
            }
        }
        return Ok(out);
    }
    Err(Error::RetryExhausted("sm2 encrypt"))
}

/// Recovers the message and checks `C3`; a mismatch is
/// [`Error::IntegrityCheckFailed`] and no plaintext is released.
pub fn sm2_decrypt(
    d: &BigUint,
    ciphertext: &[u8],
    mode: CipherMode,
    cctx: &CurveCtx,
) -> Result<Vec<u8>> {
    check_private_key(d, cctx)?;
    if ciphertext.len() < MIN_CIPHERTEXT_LEN {
        return Err(Error::CiphertextTooShort {
            need: MIN_CIPHERTEXT_LEN,
            got: ciphertext.len(),
        });
    }

    let (c1, rest) = ciphertext.split_at(C1_LEN);
    let (c2, c3) = match mode {
        CipherMode::C1C2C3 => {
            let (c2, c3) = rest.split_at(rest.len() - C3_LEN);
            (c2, c3)
        }
        CipherMode::C1C3C2 => {
            let (c3, c2) = rest.split_at(C3_LEN);
            (c2, c3)
        }
    };

    let c1 = PublicKey::from_bytes(c1, cctx)?;
    let (x2, y2) = shared_point(&c1.to_point().to_bns(), d, cctx)?;

    let mut cipher = Sm2Cipher::new(&x2, &y2);
    let mut plain = c2.to_vec();
    cipher.decrypt(&mut plain)?;
    let c3_check = cipher.dofinal();

    if !bool::from(c3_check.ct_eq(c3)) {
        plain.zeroize();
        log::debug!("sm2 decrypt: C3 mismatch");
        return Err(Error::IntegrityCheckFailed);
    }
    Ok(plain)
}

impl PublicKey {
    pub fn sm2_encrypt(
        &self,
        rng: &mut dyn SecureRandom,
        msg: &[u8],
        mode: CipherMode,
        cctx: &CurveCtx,
    ) -> Result<Vec<u8>> {
        sm2_encrypt(self, msg, rng, mode, cctx)
    }
}

impl KeyPair {
    pub fn sm2_decrypt(&self, ciphertext: &[u8], mode: CipherMode, cctx: &CurveCtx) -> Result<Vec<u8>> {
        sm2_decrypt(self.d(), ciphertext, mode, cctx)
    }
}
