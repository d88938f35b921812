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

//! String-in, string-out helpers over the byte APIs.
//!
//! Hex output is uppercase. Plaintexts are UTF-8 strings; decrypting to
//! bytes that are not UTF-8 is [`Error::InvalidUtf8`].

use crate::der::{der_to_hard, hard_to_der};
use crate::encryption::CipherMode;
use crate::error::{Error, Result};
use crate::param::CurveCtx;
use crate::public::PublicKey;
use crate::rand::SecureRandom;
use crate::signing::KeyPair;
use crate::sm4::Sm4Context;
use crate::verification::Signature;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextEncoding {
    Hex,
    Base64,
}

fn encode(bytes: &[u8], encoding: TextEncoding) -> String {
    match encoding {
        TextEncoding::Hex => hex::encode_upper(bytes),
        TextEncoding::Base64 => base64::encode(bytes),
    }
}

fn decode(s: &str, encoding: TextEncoding) -> Result<Vec<u8>> {
    match encoding {
        TextEncoding::Hex => Ok(hex::decode(s.trim())?),
        TextEncoding::Base64 => Ok(base64::decode(s.trim())?),
    }
}

/// SM4 options for the string API.
///
/// `key` and `iv` are taken as raw UTF-8 bytes, or as hex when `hex_string`
/// is set; either way they must come out at 16 bytes.
#[derive(Clone, Debug)]
pub struct Sm4Options {
    pub key: String,
    pub iv: String,
    pub hex_string: bool,
    pub padding: bool,
    pub output: TextEncoding,
}

impl Default for Sm4Options {
    fn default() -> Self {
        Sm4Options {
            key: String::new(),
            iv: String::new(),
            hex_string: false,
            padding: true,
            output: TextEncoding::Base64,
        }
    }
}

impl Sm4Options {
    pub fn new(key: &str) -> Self {
        Sm4Options {
            key: key.to_string(),
            ..Default::default()
        }
    }

    fn material(&self, s: &str) -> Result<Vec<u8>> {
        if s.is_empty() {
            return Err(Error::EmptyInput);
        }
        if self.hex_string {
            Ok(hex::decode(s)?)
        } else {
            Ok(s.as_bytes().to_vec())
        }
    }

    fn enc_context(&self) -> Result<Sm4Context> {
        Ok(Sm4Context::set_key_enc(&self.material(&self.key)?)?.with_padding(self.padding))
    }

    fn dec_context(&self) -> Result<Sm4Context> {
        Ok(Sm4Context::set_key_dec(&self.material(&self.key)?)?.with_padding(self.padding))
    }
}

pub fn sm4_encrypt_ecb(opts: &Sm4Options, plaintext: &str) -> Result<String> {
    let out = opts.enc_context()?.crypt_ecb(plaintext.as_bytes())?;
    Ok(encode(&out, opts.output))
}

pub fn sm4_decrypt_ecb(opts: &Sm4Options, ciphertext: &str) -> Result<String> {
    let out = opts.dec_context()?.crypt_ecb(&decode(ciphertext, opts.output)?)?;
    Ok(String::from_utf8(out)?)
}

pub fn sm4_encrypt_cbc(opts: &Sm4Options, plaintext: &str) -> Result<String> {
    let iv = opts.material(&opts.iv)?;
    let out = opts.enc_context()?.crypt_cbc(&iv, plaintext.as_bytes())?;
    Ok(encode(&out, opts.output))
}

pub fn sm4_decrypt_cbc(opts: &Sm4Options, ciphertext: &str) -> Result<String> {
    let iv = opts.material(&opts.iv)?;
    let out = opts
        .dec_context()?
        .crypt_cbc(&iv, &decode(ciphertext, opts.output)?)?;
    Ok(String::from_utf8(out)?)
}

/// A key pair in uppercase hex: the 65-byte `04 ‖ X ‖ Y` public key and
/// the 32-byte private scalar.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyPairHex {
    pub public_key: String,
    pub private_key: String,
}

impl core::fmt::Debug for KeyPairHex {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("KeyPairHex")
            .field("public_key", &self.public_key)
            .finish()
    }
}

pub fn generate_key_pair_hex(rng: &mut dyn SecureRandom) -> Result<KeyPairHex> {
    let key_pair = KeyPair::generate(rng, CurveCtx::sm2p256())?;
    Ok(KeyPairHex {
        public_key: key_pair.public_key().to_hex(),
        private_key: key_pair.private_key_hex(),
    })
}

pub fn sm2_encrypt_hex(
    public_key: &str,
    plaintext: &str,
    rng: &mut dyn SecureRandom,
    mode: CipherMode,
) -> Result<String> {
    let cctx = CurveCtx::sm2p256();
    let pk = PublicKey::from_hex(public_key, cctx)?;
    let cipher = pk.sm2_encrypt(rng, plaintext.as_bytes(), mode, cctx)?;
    Ok(hex::encode_upper(cipher))
}

pub fn sm2_decrypt_hex(private_key: &str, ciphertext: &str, mode: CipherMode) -> Result<String> {
    let cctx = CurveCtx::sm2p256();
    let key_pair = KeyPair::from_hex(private_key, cctx)?;
    let plain = key_pair.sm2_decrypt(&hex::decode(ciphertext.trim())?, mode, cctx)?;
    Ok(String::from_utf8(plain)?)
}

/// Textual signature encodings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignatureFormat {
    /// DER `SEQUENCE { r, s }`.
    Soft,
    /// Raw `r ‖ s`, 64 bytes.
    Hard,
}

impl Default for SignatureFormat {
    fn default() -> Self {
        SignatureFormat::Soft
    }
}

pub fn sm2_sign_hex(
    private_key: &str,
    msg: &[u8],
    rng: &mut dyn SecureRandom,
    format: SignatureFormat,
) -> Result<String> {
    let cctx = CurveCtx::sm2p256();
    let sig = KeyPair::from_hex(private_key, cctx)?.sm2_sign(rng, msg, cctx)?;
    Ok(match format {
        SignatureFormat::Soft => hex::encode_upper(sig.to_der()),
        SignatureFormat::Hard => hex::encode_upper(&sig.to_hard()[..]),
    })
}

/// `false` for any malformed key or signature as well as for a signature
/// that does not verify.
pub fn sm2_verify_hex(public_key: &str, msg: &[u8], signature: &str, format: SignatureFormat) -> bool {
    let cctx = CurveCtx::sm2p256();
    let parsed = PublicKey::from_hex(public_key, cctx).and_then(|pk| {
        let bytes = hex::decode(signature.trim())?;
        let sig = match format {
            SignatureFormat::Soft => Signature::from_der(&bytes)?,
            SignatureFormat::Hard => Signature::from_hard(&bytes)?,
        };
        Ok((pk, sig))
    });

    match parsed {
        Ok((pk, sig)) => sig.sm2_verify(&pk, msg, cctx),
        Err(e) => {
            log::debug!("sm2 verify: {}", e);
            false
        }
    }
}

pub fn der_to_hard_hex(der: &str) -> Result<String> {
    let hard = der_to_hard(&hex::decode(der.trim())?)?;
    Ok(hex::encode_upper(&hard[..]))
}

pub fn hard_to_der_hex(hard: &str) -> Result<String> {
    Ok(hex::encode_upper(hard_to_der(&hex::decode(hard.trim())?)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rand::SystemRandom;

    const PRIVATE_KEY: &str = "3945208F7B2144B13F36E38AC6D39F95889393692860B51A42FB81EF4DF7C5B8";

    #[test]
    fn sm4_ecb_text_test() {
        let opts = Sm4Options::new("JeF8U9wHFOMfs2Y8");
        let c = sm4_encrypt_ecb(&opts, "hello sm4, 你好").unwrap();
        assert_eq!(sm4_decrypt_ecb(&opts, &c).unwrap(), "hello sm4, 你好");

        let hex_out = Sm4Options {
            output: TextEncoding::Hex,
            ..opts.clone()
        };
        let h = sm4_encrypt_ecb(&hex_out, "hello sm4, 你好").unwrap();
        assert_eq!(base64::decode(&c).unwrap(), hex::decode(&h).unwrap());
        assert_eq!(sm4_decrypt_ecb(&hex_out, &h).unwrap(), "hello sm4, 你好");
    }

    #[test]
    fn sm4_zero_key_text_test() {
        let opts = Sm4Options {
            key: "00000000000000000000000000000000".to_string(),
            hex_string: true,
            output: TextEncoding::Hex,
            ..Default::default()
        };
        let c = sm4_encrypt_ecb(&opts, "\u{0}\u{0}\u{0}\u{0}\u{0}\u{0}\u{0}\u{0}\u{0}\u{0}\u{0}\u{0}\u{0}\u{0}\u{0}\u{0}").unwrap();
        assert_eq!(
            c,
            "9F1F7BFF6F5511384D9430531E538FD3A83F90CC9F35CAC4DAF66BFA071C4182"
        );
    }

    #[test]
    fn sm4_cbc_text_test() {
        let opts = Sm4Options {
            key: "JeF8U9wHFOMfs2Y8".to_string(),
            iv: "UISwD9fW6cFh9SNS".to_string(),
            ..Default::default()
        };
        let c = sm4_encrypt_cbc(&opts, "a longer message spanning several blocks").unwrap();
        assert_eq!(
            sm4_decrypt_cbc(&opts, &c).unwrap(),
            "a longer message spanning several blocks"
        );
        assert_ne!(c, sm4_encrypt_ecb(&opts, "a longer message spanning several blocks").unwrap());

        let hex_opts = Sm4Options {
            key: hex::encode("JeF8U9wHFOMfs2Y8"),
            iv: hex::encode("UISwD9fW6cFh9SNS"),
            hex_string: true,
            ..Default::default()
        };
        assert_eq!(
            sm4_decrypt_cbc(&hex_opts, &c).unwrap(),
            "a longer message spanning several blocks"
        );
    }

    #[test]
    fn sm4_text_errors_test() {
        let short = Sm4Options::new("short");
        assert_eq!(
            sm4_encrypt_ecb(&short, "x"),
            Err(Error::InvalidKeyLength { expected: 16, got: 5 })
        );
        let opts = Sm4Options::new("JeF8U9wHFOMfs2Y8");
        assert_eq!(sm4_encrypt_cbc(&opts, "x"), Err(Error::EmptyInput));
        assert_eq!(sm4_decrypt_ecb(&opts, "not base64!"), Err(Error::InvalidBase64));
        let bad_hex = Sm4Options {
            key: "zz".to_string(),
            hex_string: true,
            ..Default::default()
        };
        assert_eq!(sm4_encrypt_ecb(&bad_hex, "x"), Err(Error::InvalidHex));
    }

    #[test]
    fn sm2_text_round_trip_test() {
        let mut rng = SystemRandom::new();
        let pair = generate_key_pair_hex(&mut rng).unwrap();
        assert_eq!(pair.public_key.len(), 130);
        assert!(pair.public_key.starts_with("04"));
        assert_eq!(pair.private_key.len(), 64);

        for mode in [CipherMode::C1C2C3, CipherMode::C1C3C2].iter() {
            let c = sm2_encrypt_hex(&pair.public_key, "国密 sm2", &mut rng, *mode).unwrap();
            assert_eq!(c, c.to_uppercase());
            assert_eq!(sm2_decrypt_hex(&pair.private_key, &c, *mode).unwrap(), "国密 sm2");
        }
        // lower case input is accepted
        let c = sm2_encrypt_hex(&pair.public_key.to_lowercase(), "x", &mut rng, CipherMode::C1C2C3).unwrap();
        assert_eq!(
            sm2_decrypt_hex(&pair.private_key.to_lowercase(), &c.to_lowercase(), CipherMode::C1C2C3).unwrap(),
            "x"
        );
    }

    #[test]
    fn sm2_text_errors_test() {
        let mut rng = SystemRandom::new();
        assert_eq!(
            sm2_encrypt_hex("04abcd", "x", &mut rng, CipherMode::C1C2C3),
            Err(Error::InvalidPublicKey)
        );
        assert_eq!(
            sm2_decrypt_hex(PRIVATE_KEY, "04", CipherMode::C1C2C3),
            Err(Error::CiphertextTooShort { need: 97, got: 1 })
        );
        assert_eq!(
            sm2_decrypt_hex("", "04", CipherMode::C1C2C3),
            Err(Error::EmptyInput)
        );
    }

    #[test]
    fn sm2_sign_text_test() {
        let mut rng = SystemRandom::new();
        let pk = KeyPair::from_hex(PRIVATE_KEY, CurveCtx::sm2p256())
            .unwrap()
            .public_key()
            .to_hex();

        for format in [SignatureFormat::Soft, SignatureFormat::Hard].iter() {
            let sig = sm2_sign_hex(PRIVATE_KEY, b"message digest", &mut rng, *format).unwrap();
            assert!(sm2_verify_hex(&pk, b"message digest", &sig, *format));
            assert!(!sm2_verify_hex(&pk, b"message digesT", &sig, *format));
        }

        let hard = sm2_sign_hex(PRIVATE_KEY, b"abc", &mut rng, SignatureFormat::Hard).unwrap();
        assert_eq!(hard.len(), 128);
        let der = hard_to_der_hex(&hard).unwrap();
        assert!(sm2_verify_hex(&pk, b"abc", &der, SignatureFormat::Soft));
        assert_eq!(der_to_hard_hex(&der).unwrap(), hard);
        // wrong format for the bytes
        assert!(!sm2_verify_hex(&pk, b"abc", &der, SignatureFormat::Hard));
    }

    #[test]
    fn sm2_verify_text_is_total_test() {
        assert!(!sm2_verify_hex("", b"m", "", SignatureFormat::Soft));
        assert!(!sm2_verify_hex("zz", b"m", "3006", SignatureFormat::Soft));
        let pk = KeyPair::from_hex(PRIVATE_KEY, CurveCtx::sm2p256())
            .unwrap()
            .public_key()
            .to_hex();
        assert!(!sm2_verify_hex(&pk, b"m", "30ff", SignatureFormat::Soft));
        assert!(!sm2_verify_hex(&pk, b"m", &"00".repeat(64), SignatureFormat::Hard));
        assert!(!sm2_verify_hex(&pk, b"m", "not hex", SignatureFormat::Hard));
    }
}
