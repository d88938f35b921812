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

//! Signature wire formats.
//!
//! "soft": DER `SEQUENCE { INTEGER r, INTEGER s }`, integers minimal and
//! non-negative (a zero byte is prepended when the top bit is set).
//!
//! "hard": `r ‖ s`, each left-padded to 32 bytes, no framing.

use crate::curve::bn_to_bytes;
use crate::error::{Error, Result};
use crate::public::BN_LENGTH;
use num_bigint::BigUint;

pub const HARD_SIGNATURE_LEN: usize = 2 * BN_LENGTH;

pub(crate) fn encode_der(r: &BigUint, s: &BigUint) -> Vec<u8> {
    yasna::construct_der(|writer| {
        writer.write_sequence(|writer| {
            writer.next().write_biguint(r);
            writer.next().write_biguint(s);
        })
    })
}

pub(crate) fn decode_der(buf: &[u8]) -> Result<(BigUint, BigUint)> {
    yasna::parse_der(buf, |reader| {
        reader.read_sequence(|reader| {
            let r = reader.next().read_biguint()?;
            let s = reader.next().read_biguint()?;
            Ok((r, s))
        })
    })
    .map_err(|_| Error::InvalidSignature)
}

/// DER ("soft") signature to the 64-byte `r ‖ s` ("hard") form.
pub fn der_to_hard(der: &[u8]) -> Result<[u8; HARD_SIGNATURE_LEN]> {
    let (r, s) = decode_der(der)?;
    if r.bits() > BN_LENGTH * 8 || s.bits() > BN_LENGTH * 8 {
        return Err(Error::InvalidSignature);
    }
    let mut out = [0u8; HARD_SIGNATURE_LEN];
    out[..BN_LENGTH].copy_from_slice(&bn_to_bytes(&r));
    out[BN_LENGTH..].copy_from_slice(&bn_to_bytes(&s));
    Ok(out)
}

/// 64-byte `r ‖ s` ("hard") signature to DER ("soft").
pub fn hard_to_der(hard: &[u8]) -> Result<Vec<u8>> {
    if hard.len() != HARD_SIGNATURE_LEN {
        return Err(Error::InvalidSignature);
    }
    let r = BigUint::from_bytes_be(&hard[..BN_LENGTH]);
    let s = BigUint::from_bytes_be(&hard[BN_LENGTH..]);
    Ok(encode_der(&r, &s))
}
