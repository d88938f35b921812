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

//! SM2 public-key cryptography, the SM3 hash and the SM4 block cipher.
//!
//! ```
//! use sm_suite::{CurveCtx, KeyPair, SystemRandom};
//!
//! let cctx = CurveCtx::sm2p256();
//! let mut rng = SystemRandom::new();
//! let key_pair = KeyPair::generate(&mut rng, cctx).unwrap();
//! let sig = key_pair.sm2_sign(&mut rng, b"hello world", cctx).unwrap();
//! assert!(sig.sm2_verify(&key_pair.public_key(), b"hello world", cctx));
//! ```

#![cfg_attr(feature = "internal_benches", feature(test))]

mod curve;
pub mod der;
pub mod encryption;
pub mod error;
pub mod param;
mod private;
pub mod public;
pub mod rand;
pub mod signing;
pub mod sm3;
pub mod sm4;
pub mod text;
pub mod verification;

pub use crate::encryption::{sm2_decrypt, sm2_encrypt, CipherMode};
pub use crate::error::{Error, Result};
pub use crate::param::CurveCtx;
pub use crate::private::MAX_RETRIES;
pub use crate::public::{Point, PublicKey};
pub use crate::rand::{SecureRandom, SystemRandom};
pub use crate::signing::{KeyPair, DEFAULT_USER_ID};
pub use crate::sm3::{hmac_sm3, sm3_hash, sm3_hash_hex, Sm3Digest};
pub use crate::sm4::{Sm4Context, Sm4Mode};
pub use crate::verification::Signature;
