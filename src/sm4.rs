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

//! SM4 block cipher (GB/T 32907) with ECB and CBC chaining and PKCS#7
//! padding.

use crate::error::{Error, Result};
use zeroize::Zeroize;

pub const SM4_BLOCK_SIZE: usize = 16;
pub const SM4_KEY_SIZE: usize = 16;
const SM4_ROUNDS: usize = 32;

static SBOX: [u8; 256] = [
    0xd6, 0x90, 0xe9, 0xfe, 0xcc, 0xe1, 0x3d, 0xb7, 0x16, 0xb6, 0x14, 0xc2, 0x28, 0xfb, 0x2c, 0x05,
    0x2b, 0x67, 0x9a, 0x76, 0x2a, 0xbe, 0x04, 0xc3, 0xaa, 0x44, 0x13, 0x26, 0x49, 0x86, 0x06, 0x99,
    0x9c, 0x42, 0x50, 0xf4, 0x91, 0xef, 0x98, 0x7a, 0x33, 0x54, 0x0b, 0x43, 0xed, 0xcf, 0xac, 0x62,
    0xe4, 0xb3, 0x1c, 0xa9, 0xc9, 0x08, 0xe8, 0x95, 0x80, 0xdf, 0x94, 0xfa, 0x75, 0x8f, 0x3f, 0xa6,
    0x47, 0x07, 0xa7, 0xfc, 0xf3, 0x73, 0x17, 0xba, 0x83, 0x59, 0x3c, 0x19, 0xe6, 0x85, 0x4f, 0xa8,
    0x68, 0x6b, 0x81, 0xb2, 0x71, 0x64, 0xda, 0x8b, 0xf8, 0xeb, 0x0f, 0x4b, 0x70, 0x56, 0x9d, 0x35,
    0x1e, 0x24, 0x0e, 0x5e, 0x63, 0x58, 0xd1, 0xa2, 0x25, 0x22, 0x7c, 0x3b, 0x01, 0x21, 0x78, 0x87,
    0xd4, 0x00, 0x46, 0x57, 0x9f, 0xd3, 0x27, 0x52, 0x4c, 0x36, 0x02, 0xe7, 0xa0, 0xc4, 0xc8, 0x9e,
    0xea, 0xbf, 0x8a, 0xd2, 0x40, 0xc7, 0x38, 0xb5, 0xa3, 0xf7, 0xf2, 0xce, 0xf9, 0x61, 0x15, 0xa1,
    0xe0, 0xae, 0x5d, 0xa4, 0x9b, 0x34, 0x1a, 0x55, 0xad, 0x93, 0x32, 0x30, 0xf5, 0x8c, 0xb1, 0xe3,
    0x1d, 0xf6, 0xe2, 0x2e, 0x82, 0x66, 0xca, 0x60, 0xc0, 0x29, 0x23, 0xab, 0x0d, 0x53, 0x4e, 0x6f,
    0xd5, 0xdb, 0x37, 0x45, 0xde, 0xfd, 0x8e, 0x2f, 0x03, 0xff, 0x6a, 0x72, 0x6d, 0x6c, 0x5b, 0x51,
    0x8d, 0x1b, 0xaf, 0x92, 0xbb, 0xdd, 0xbc, 0x7f, 0x11, 0xd9, 0x5c, 0x41, 0x1f, 0x10, 0x5a, 0xd8,
    0x0a, 0xc1, 0x31, 0x88, 0xa5, 0xcd, 0x7b, 0xbd, 0x2d, 0x74, 0xd0, 0x12, 0xb8, 0xe5, 0xb4, 0xb0,
    0x89, 0x69, 0x97, 0x4a, 0x0c, 0x96, 0x77, 0x7e, 0x65, 0xb9, 0xf1, 0x09, 0xc5, 0x6e, 0xc6, 0x84,
    0x18, 0xf0, 0x7d, 0xec, 0x3a, 0xdc, 0x4d, 0x20, 0x79, 0xee, 0x5f, 0x3e, 0xd7, 0xcb, 0x39, 0x48,
];

static FK: [u32; 4] = [0xa3b1bac6, 0x56aa3350, 0x677d9197, 0xb27022dc];

static CK: [u32; SM4_ROUNDS] = [
    0x00070e15, 0x1c232a31, 0x383f464d, 0x545b6269, 0x70777e85, 0x8c939aa1, 0xa8afb6bd, 0xc4cbd2d9,
    0xe0e7eef5, 0xfc030a11, 0x181f262d, 0x343b4249, 0x50575e65, 0x6c737a81, 0x888f969d, 0xa4abb2b9,
    0xc0c7ced5, 0xdce3eaf1, 0xf8ff060d, 0x141b2229, 0x30373e45, 0x4c535a61, 0x686f767d, 0x848b9299,
    0xa0a7aeb5, 0xbcc3cad1, 0xd8dfe6ed, 0xf4fb0209, 0x10171e25, 0x2c333a41, 0x484f565d, 0x646b7279,
];

#[inline]
fn tau(a: u32) -> u32 {
    let b = a.to_be_bytes();
    u32::from_be_bytes([
        SBOX[b[0] as usize],
        SBOX[b[1] as usize],
        SBOX[b[2] as usize],
        SBOX[b[3] as usize],
    ])
}

/// Round transform `T = L ∘ τ`.
#[inline]
fn t(x: u32) -> u32 {
    let b = tau(x);
    b ^ b.rotate_left(2) ^ b.rotate_left(10) ^ b.rotate_left(18) ^ b.rotate_left(24)
}

/// Key schedule transform `T' = L' ∘ τ`.
#[inline]
fn t_prime(x: u32) -> u32 {
    let b = tau(x);
    b ^ b.rotate_left(13) ^ b.rotate_left(23)
}

fn expand_key(key: &[u8]) -> Result<[u32; SM4_ROUNDS]> {
    if key.len() != SM4_KEY_SIZE {
        return Err(Error::InvalidKeyLength {
            expected: SM4_KEY_SIZE,
            got: key.len(),
        });
    }

    let mut k = [0u32; SM4_ROUNDS + 4];
    for (i, chunk) in key.chunks_exact(4).enumerate() {
        k[i] = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]) ^ FK[i];
    }
    let mut sk = [0u32; SM4_ROUNDS];
    for i in 0..SM4_ROUNDS {
        k[i + 4] = k[i] ^ t_prime(k[i + 1] ^ k[i + 2] ^ k[i + 3] ^ CK[i]);
        sk[i] = k[i + 4];
    }
    k.zeroize();
    Ok(sk)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sm4Mode {
    Encrypt,
    Decrypt,
}

/// An SM4 key schedule bound to one direction.
///
/// Decryption runs the encryption rounds with the round keys reversed.
pub struct Sm4Context {
    sk: [u32; SM4_ROUNDS],
    mode: Sm4Mode,
    is_padding: bool,
}

impl Sm4Context {
    pub fn set_key_enc(key: &[u8]) -> Result<Self> {
        Ok(Sm4Context {
            sk: expand_key(key)?,
            mode: Sm4Mode::Encrypt,
            is_padding: true,
        })
    }

    pub fn set_key_dec(key: &[u8]) -> Result<Self> {
        let mut sk = expand_key(key)?;
        sk.reverse();
        Ok(Sm4Context {
            sk,
            mode: Sm4Mode::Decrypt,
            is_padding: true,
        })
    }

    pub fn with_padding(mut self, padding: bool) -> Self {
        self.is_padding = padding;
        self
    }

    pub fn set_padding(&mut self, padding: bool) {
        self.is_padding = padding;
    }

    pub fn mode(&self) -> Sm4Mode {
        self.mode
    }

    pub fn is_padding(&self) -> bool {
        self.is_padding
    }

    pub fn crypt_block(&self, input: &[u8; SM4_BLOCK_SIZE]) -> [u8; SM4_BLOCK_SIZE] {
        let mut x = [0u32; 4];
        for (word, chunk) in x.iter_mut().zip(input.chunks_exact(4)) {
            *word = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        for rk in self.sk.iter() {
            let next = x[0] ^ t(x[1] ^ x[2] ^ x[3] ^ rk);
            x = [x[1], x[2], x[3], next];
        }

        // reverse substitution R
        let mut out = [0u8; SM4_BLOCK_SIZE];
        for (chunk, word) in out.chunks_exact_mut(4).zip(x.iter().rev()) {
            chunk.copy_from_slice(&word.to_be_bytes());
        }
        out
    }

    pub fn crypt_ecb(&self, input: &[u8]) -> Result<Vec<u8>> {
        let data = self.prepare(input)?;
        let mut out = Vec::with_capacity(data.len());
        for block in data.chunks_exact(SM4_BLOCK_SIZE) {
            out.extend_from_slice(&self.crypt_block(&load_block(block)));
        }
        self.finish(out)
    }

    pub fn crypt_cbc(&self, iv: &[u8], input: &[u8]) -> Result<Vec<u8>> {
        if iv.len() != SM4_BLOCK_SIZE {
            return Err(Error::InvalidKeyLength {
                expected: SM4_BLOCK_SIZE,
                got: iv.len(),
            });
        }
        let data = self.prepare(input)?;
        let mut chain = load_block(iv);
        let mut out = Vec::with_capacity(data.len());

        for block in data.chunks_exact(SM4_BLOCK_SIZE) {
            let block = load_block(block);
            match self.mode {
                Sm4Mode::Encrypt => {
                    let mut x = block;
                    xor_block(&mut x, &chain);
                    chain = self.crypt_block(&x);
                    out.extend_from_slice(&chain);
                }
                Sm4Mode::Decrypt => {
                    let mut x = self.crypt_block(&block);
                    xor_block(&mut x, &chain);
                    chain = block;
                    out.extend_from_slice(&x);
                }
            }
        }
        self.finish(out)
    }

    fn prepare(&self, input: &[u8]) -> Result<Vec<u8>> {
        if self.mode == Sm4Mode::Encrypt && self.is_padding {
            return Ok(pkcs7_pad(input));
        }
        if input.len() % SM4_BLOCK_SIZE != 0 {
            return Err(Error::InvalidDataLength(input.len()));
        }
        Ok(input.to_vec())
    }

    fn finish(&self, out: Vec<u8>) -> Result<Vec<u8>> {
        if self.mode == Sm4Mode::Decrypt && self.is_padding {
            return pkcs7_unpad(out);
        }
        Ok(out)
    }
}

impl Drop for Sm4Context {
    fn drop(&mut self) {
        self.sk.zeroize();
    }
}

fn load_block(bytes: &[u8]) -> [u8; SM4_BLOCK_SIZE] {
    let mut block = [0u8; SM4_BLOCK_SIZE];
    block.copy_from_slice(bytes);
    block
}

fn xor_block(a: &mut [u8; SM4_BLOCK_SIZE], b: &[u8; SM4_BLOCK_SIZE]) {
    for (x, y) in a.iter_mut().zip(b.iter()) {
        *x ^= y;
    }
}

fn pkcs7_pad(input: &[u8]) -> Vec<u8> {
    let pad = SM4_BLOCK_SIZE - input.len() % SM4_BLOCK_SIZE;
    let mut out = Vec::with_capacity(input.len() + pad);
    out.extend_from_slice(input);
    out.resize(input.len() + pad, pad as u8);
    out
}

/// Strips the trailing pad by its length byte only; pad contents are not
/// checked.
fn pkcs7_unpad(mut data: Vec<u8>) -> Result<Vec<u8>> {
    let pad = match data.last() {
        Some(&b) => b as usize,
        None => return Err(Error::InvalidPadding),
    };
    if pad == 0 || pad > SM4_BLOCK_SIZE || pad > data.len() {
        return Err(Error::InvalidPadding);
    }
    data.truncate(data.len() - pad);
    Ok(data)
}
