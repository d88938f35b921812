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
    affine_from_jacobian, bn_to_bytes, bn_to_jacobi, verify_affine_point_is_on_the_curve,
    verify_jacobian_point_is_on_the_curve,
};
use crate::error::{Error, Result};
use crate::param::CurveCtx;
use num_bigint::BigUint;
use num_traits::Zero;
use std::fmt;

pub const BN_LENGTH: usize = 32;
pub const PUBLIC_KEY_LEN: usize = 1 + (2 * BN_LENGTH);
pub const UNCOMPRESSED_TAG: u8 = 0x04;

/// A curve point in jacobian coordinates, z == 0 is the point at infinity.
#[derive(Clone, Debug)]
pub struct Point([BigUint; 3]);

impl Point {
    pub fn new(a: [BigUint; 3]) -> Self {
        Point(a)
    }

    pub fn point_x(&self) -> BigUint {
        self.0[0].clone()
    }

    pub fn is_infinity(&self) -> bool {
        self.0[2].is_zero()
    }

    pub fn to_bns(&self) -> [BigUint; 3] {
        self.0.clone()
    }

    pub(crate) fn as_bns(&self) -> &[BigUint; 3] {
        &self.0
    }
}

/// An SM2 public key kept in its uncompressed `04 ‖ X ‖ Y` encoding.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct PublicKey {
    bytes: [u8; PUBLIC_KEY_LEN],
}

impl PublicKey {
    pub(crate) fn new(x: &[u8; BN_LENGTH], y: &[u8; BN_LENGTH]) -> Self {
        let mut public = PublicKey {
            bytes: [0; PUBLIC_KEY_LEN],
        };
        public.bytes[0] = UNCOMPRESSED_TAG;
        public.bytes[1..1 + BN_LENGTH].copy_from_slice(x);
        public.bytes[1 + BN_LENGTH..].copy_from_slice(y);

        public
    }

    /// Decodes `04 ‖ X ‖ Y`, or the legacy 64-byte `X ‖ Y` form, and checks
    /// that the point lies on the curve.
    pub fn from_bytes(bytes: &[u8], cctx: &CurveCtx) -> Result<Self> {
        let pk = Self::from_bytes_unchecked(bytes)?;
        let x = BigUint::from_bytes_be(pk.x_bytes());
        let y = BigUint::from_bytes_be(pk.y_bytes());
        verify_affine_point_is_on_the_curve((&x, &y), &cctx.a, &cctx.b, cctx)?;
        Ok(pk)
    }

    /// Only checks the encoding. Use for keys from a trusted store.
    pub fn from_bytes_unchecked(bytes: &[u8]) -> Result<Self> {
        let mut public = PublicKey {
            bytes: [0; PUBLIC_KEY_LEN],
        };
        match bytes.len() {
            PUBLIC_KEY_LEN if bytes[0] == UNCOMPRESSED_TAG => {
                public.bytes.copy_from_slice(bytes);
            }
            len if len == PUBLIC_KEY_LEN - 1 => {
                public.bytes[0] = UNCOMPRESSED_TAG;
                public.bytes[1..].copy_from_slice(bytes);
            }
            _ => return Err(Error::InvalidPublicKey),
        }
        Ok(public)
    }

    pub fn from_hex(s: &str, cctx: &CurveCtx) -> Result<Self> {
        Self::from_bytes(&hex::decode(s.trim())?, cctx)
    }

    pub fn from_point(point: &Point, cctx: &CurveCtx) -> Result<Self> {
        verify_jacobian_point_is_on_the_curve(point.as_bns(), cctx)?;
        let (x, y) = affine_from_jacobian(point.as_bns(), cctx)?;
        Ok(PublicKey::new(&bn_to_bytes(&x), &bn_to_bytes(&y)))
    }

    pub fn bytes_less_safe(&self) -> &[u8] {
        &self.bytes
    }

    pub fn x_bytes(&self) -> &[u8] {
        &self.bytes[1..1 + BN_LENGTH]
    }

    pub fn y_bytes(&self) -> &[u8] {
        &self.bytes[1 + BN_LENGTH..]
    }

    /// Uppercase hex of the 65-byte encoding.
    pub fn to_hex(&self) -> String {
        hex::encode_upper(&self.bytes[..])
    }

    pub fn to_point(&self) -> Point {
        let x = BigUint::from_bytes_be(self.x_bytes());
        let y = BigUint::from_bytes_be(self.y_bytes());

        Point(bn_to_jacobi(&[x, y]))
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_hex())
    }
}
