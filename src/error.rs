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

use std::string::FromUtf8Error;

pub type Result<T> = core::result::Result<T, Error>;

/// Errors reported by the SM2/SM3/SM4 operations.
///
/// Bad caller input and failed integrity checks are distinct variants, see
/// [`Error::is_validation`] and [`Error::is_integrity`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("null or empty input")]
    EmptyInput,
    #[error("invalid key length: expected {expected}, got {got}")]
    InvalidKeyLength { expected: usize, got: usize },
    #[error("invalid data length: {0} is not a multiple of the block size")]
    InvalidDataLength(usize),
    #[error("invalid private key")]
    InvalidPrivateKey,
    #[error("invalid public key")]
    InvalidPublicKey,
    #[error("ecc: point not on curve")]
    NotOnCurve,
    #[error("ecc: point at infinity")]
    PointAtInfinity,
    #[error("user id too long: {0} bytes")]
    UserIdTooLong(usize),
    #[error("ciphertext too short: need at least {need}, got {got}")]
    CiphertextTooShort { need: usize, got: usize },
    #[error("invalid hex string")]
    InvalidHex,
    #[error("invalid base64 string")]
    InvalidBase64,
    #[error("decrypted data is not valid utf-8")]
    InvalidUtf8,
    #[error("invalid signature encoding")]
    InvalidSignature,
    #[error("invalid padding")]
    InvalidPadding,
    #[error("sm2: message too long for the kdf counter")]
    MessageTooLong,
    #[error("sm2: ciphertext integrity check failed")]
    IntegrityCheckFailed,
    #[error("{0}: retry limit exceeded")]
    RetryExhausted(&'static str),
}

impl Error {
    /// The caller handed in something malformed.
    pub fn is_validation(&self) -> bool {
        !self.is_integrity() && !matches!(self, Error::RetryExhausted(_))
    }

    /// Well-formed input that failed authentication.
    pub fn is_integrity(&self) -> bool {
        matches!(self, Error::IntegrityCheckFailed)
    }
}

impl From<hex::FromHexError> for Error {
    fn from(_: hex::FromHexError) -> Self {
        Error::InvalidHex
    }
}

impl From<base64::DecodeError> for Error {
    fn from(_: base64::DecodeError) -> Self {
        Error::InvalidBase64
    }
}

impl From<FromUtf8Error> for Error {
    fn from(_: FromUtf8Error) -> Self {
        Error::InvalidUtf8
    }
}
