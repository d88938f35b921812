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

use crate::curve::bn_to_jacobi;
use hex_literal::hex;
use num_bigint::BigUint;
use once_cell::sync::Lazy;

static SM2P256: Lazy<CurveCtx> = Lazy::new(CurveCtx::sm2p256_new);

/// ecc equation: y^2 == x^3 +ax + b (modp)
///
/// Domain parameters of the recommended SM2 curve. Nothing mutates a
/// `CurveCtx` after construction, so one instance serves every thread.
pub struct CurveCtx {
    pub p: BigUint,
    pub a: BigUint,
    pub b: BigUint,
    pub n: BigUint,
    pub g_x: BigUint,
    pub g_y: BigUint,
    // generator point at jacobi, z = 1
    pub g_point: [BigUint; 3],
}

impl CurveCtx {
    /// The process-wide sm2p256v1 parameters, built on first use.
    pub fn sm2p256() -> &'static CurveCtx {
        &SM2P256
    }

    pub fn sm2p256_new() -> CurveCtx {
        let p = BigUint::from_bytes_be(&hex!(
            "fffffffeffffffffffffffffffffffffffffffff00000000ffffffffffffffff"
        ));
        let n = BigUint::from_bytes_be(&hex!(
            "fffffffeffffffffffffffffffffffff7203df6b21c6052b53bbf40939d54123"
        ));
        let a = BigUint::from_bytes_be(&hex!(
            "fffffffeffffffffffffffffffffffffffffffff00000000fffffffffffffffc"
        ));
        let b = BigUint::from_bytes_be(&hex!(
            "28e9fa9e9d9f5e344d5a9e4bcf6509a7f39789f515ab8f92ddbcbd414d940e93"
        ));
        let g_x = BigUint::from_bytes_be(&hex!(
            "32c4ae2c1f1981195f9904466a39c9948fe30bbff2660be1715a4589334c74c7"
        ));
        let g_y = BigUint::from_bytes_be(&hex!(
            "bc3736a2f4f6779c59bdcee36b692153d0a9877cc62a474002df32e52139f0a0"
        ));

        let g_point = bn_to_jacobi(&[g_x.clone(), g_y.clone()]);

        CurveCtx {
            p,
            a,
            b,
            n,
            g_x,
            g_y,
            g_point,
        }
    }
}
