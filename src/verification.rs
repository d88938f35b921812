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

use crate::curve::{affine_from_jacobian, bn_point_add, bn_point_mul, bn_scalar_add_mod, bn_to_bytes};
use crate::der::{decode_der, encode_der, HARD_SIGNATURE_LEN};
use crate::error::{Error, Result};
use crate::param::CurveCtx;
use crate::public::{PublicKey, BN_LENGTH};
use crate::signing::{sm2_digest, DEFAULT_USER_ID};
use num_bigint::BigUint;
use num_traits::Zero;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    r: BigUint,
    s: BigUint,
}

impl Signature {
    pub fn new(r: &[u8; BN_LENGTH], s: &[u8; BN_LENGTH]) -> Self {
        let r = BigUint::from_bytes_be(r);
        let s = BigUint::from_bytes_be(s);

        Signature { r, s }
    }

    /// Both scalars must fit in 32 bytes.
    pub fn from_scalars(r: BigUint, s: BigUint) -> Result<Self> {
        if r.bits() > BN_LENGTH * 8 || s.bits() > BN_LENGTH * 8 {
            return Err(Error::InvalidSignature);
        }
        Ok(Signature { r, s })
    }

    /// Parses the "hard" form `r ‖ s`, 32 bytes each.
    pub fn from_hard(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != HARD_SIGNATURE_LEN {
            return Err(Error::InvalidSignature);
        }
        let (r, s) = bytes.split_at(BN_LENGTH);
        Ok(Signature {
            r: BigUint::from_bytes_be(r),
            s: BigUint::from_bytes_be(s),
        })
    }

    /// Parses the "soft" form, a DER `SEQUENCE { INTEGER r, INTEGER s }`.
    pub fn from_der(bytes: &[u8]) -> Result<Self> {
        let (r, s) = decode_der(bytes)?;
        Signature::from_scalars(r, s)
    }

    pub fn r(&self) -> [u8; BN_LENGTH] {
        bn_to_bytes(&self.r)
    }

    pub fn s(&self) -> [u8; BN_LENGTH] {
        bn_to_bytes(&self.s)
    }

    pub fn to_hard(&self) -> [u8; HARD_SIGNATURE_LEN] {
        let mut out = [0u8; HARD_SIGNATURE_LEN];
        out[..BN_LENGTH].copy_from_slice(&self.r());
        out[BN_LENGTH..].copy_from_slice(&self.s());
        out
    }

    pub fn to_der(&self) -> Vec<u8> {
        encode_der(&self.r, &self.s)
    }

    pub fn sm2_verify(&self, pk: &PublicKey, msg: &[u8], cctx: &CurveCtx) -> bool {
        self.sm2_verify_with_id(pk, DEFAULT_USER_ID, msg, cctx)
    }

    pub fn sm2_verify_with_id(
        &self,
        pk: &PublicKey,
        user_id: &[u8],
        msg: &[u8],
        cctx: &CurveCtx,
    ) -> bool {
        match sm2_digest(pk, user_id, msg, cctx) {
            Ok(digest) => self.sm2_verify_digest(pk, &digest, cctx),
            Err(e) => {
                log::debug!("sm2 verify: {}", e);
                false
            }
        }
    }

    /// Accepts iff `(e + x1') mod n == r` with `(x1', y1') = s·G + (r + s)·Q`.
    pub fn sm2_verify_digest(&self, pk: &PublicKey, digest: &[u8], cctx: &CurveCtx) -> bool {
        if self.r.is_zero() || self.r >= cctx.n || self.s.is_zero() || self.s >= cctx.n {
            log::debug!("sm2 verify: r or s out of range");
            return false;
        }

        let e = BigUint::from_bytes_be(digest);

        let t = bn_scalar_add_mod(&self.r, &self.s, cctx);
        if t.is_zero() {
            log::debug!("sm2 verify: r + s == n");
            return false;
        }

        let g_point = bn_point_mul(&cctx.g_point, &self.s, cctx);
        let p_point = bn_point_mul(&pk.to_point().to_bns(), &t, cctx);
        let point = bn_point_add(&g_point, &p_point, cctx);

        let x1 = match affine_from_jacobian(&point, cctx) {
            Ok((x1, _)) => x1,
            Err(e) => {
                log::debug!("sm2 verify: {}", e);
                return false;
            }
        };

        (e + x1) % &cctx.n == self.r
    }
}
