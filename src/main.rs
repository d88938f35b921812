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

use log::{error, info};
use sm_suite::text::{self, SignatureFormat, Sm4Options, TextEncoding};
use sm_suite::{sm3_hash_hex, CipherMode, CurveCtx, KeyPair, Result, Signature, SystemRandom};

mod logging;

fn run() -> Result<()> {
    let test_word = b"hello world";
    let mut rng = SystemRandom::new();
    let cctx = CurveCtx::sm2p256();

    info!("sm3(\"hello world\") = {}", sm3_hash_hex(test_word));

    let key_pair = KeyPair::from_hex(
        "b8aa2a5bd9a9cf448984a247e63cb3878859d02b886e1bc63cd5c6dd46a744ab",
        cctx,
    )?;
    let pk = key_pair.public_key();
    info!("public key {}", pk.to_hex());

    let sig = key_pair.sm2_sign(&mut rng, test_word, cctx)?;
    let sig2 = Signature::new(&sig.r(), &sig.s());
    info!(
        "sign/verify: {}",
        sig2.sm2_verify(&pk, test_word, cctx)
    );

    let cipher = pk.sm2_encrypt(&mut rng, test_word, CipherMode::C1C3C2, cctx)?;
    let plain = key_pair.sm2_decrypt(&cipher, CipherMode::C1C3C2, cctx)?;
    info!(
        "sm2 encrypt/decrypt: {} bytes, round trip {}",
        cipher.len(),
        plain == test_word
    );

    let pair = text::generate_key_pair_hex(&mut rng)?;
    let signed = text::sm2_sign_hex(&pair.private_key, test_word, &mut rng, SignatureFormat::Hard)?;
    info!(
        "hex sign/verify: {}",
        text::sm2_verify_hex(&pair.public_key, test_word, &signed, SignatureFormat::Hard)
    );

    let opts = Sm4Options {
        key: "JeF8U9wHFOMfs2Y8".to_string(),
        iv: "UISwD9fW6cFh9SNS".to_string(),
        output: TextEncoding::Hex,
        ..Default::default()
    };
    let sm4_cipher = text::sm4_encrypt_cbc(&opts, "hello world")?;
    info!(
        "sm4-cbc {} -> {}",
        sm4_cipher,
        text::sm4_decrypt_cbc(&opts, &sm4_cipher)?
    );

    Ok(())
}

fn main() {
    if let Err(e) = logging::init() {
        eprintln!("logger: {}", e);
    }
    if let Err(e) = run() {
        error!("{}", e);
        std::process::exit(1);
    }
}
