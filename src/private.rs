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

use crate::error::{Error, Result};
use crate::param::CurveCtx;
use crate::public::BN_LENGTH;
use crate::rand::SecureRandom;
use num_bigint::BigUint;
use num_traits::Zero;

/// Upper bound on every rejection-sampling loop of the crate.
pub const MAX_RETRIES: usize = 1000;

/// Draws a uniform scalar in `[1, upper)`.
pub(crate) fn random_scalar(
    rng: &mut dyn SecureRandom,
    upper: &BigUint,
) -> Result<BigUint> {
    let mut bytes = [0u8; BN_LENGTH];
    for attempt in 0..MAX_RETRIES {
        rng.fill(&mut bytes);
        let k = BigUint::from_bytes_be(&bytes);
        if !k.is_zero() && &k < upper {
            return Ok(k);
        }
        log::trace!("random scalar out of range, attempt {}", attempt);
    }
    Err(Error::RetryExhausted("random scalar"))
}

/// A private key `d` in `[1, n - 2]`; `1 + d` has to stay invertible mod n.
pub(crate) fn create_private_key(rng: &mut dyn SecureRandom, cctx: &CurveCtx) -> Result<BigUint> {
    random_scalar(rng, &(&cctx.n - 1u32))
}

pub(crate) fn check_private_key(d: &BigUint, cctx: &CurveCtx) -> Result<()> {
    if d.is_zero() || d >= &(&cctx.n - 1u32) {
        return Err(Error::InvalidPrivateKey);
    }
    Ok(())
}
