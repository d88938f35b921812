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

//! SM3 cryptographic hash (GB/T 32905-2016).
//!
//! The state is an ordinary value: clone it to fork a running digest, the
//! KDF of SM2 encryption does exactly that for every keystream block.

pub const SM3_DIGEST_LEN: usize = 32;
pub const SM3_BLOCK_LEN: usize = 64;

static IV: [u32; 8] = [
    0x7380166f, 0x4914b2b9, 0x172442d7, 0xda8a0600, 0xa96f30bc, 0x163138aa, 0xe38dee4d, 0xb0fb0e4e,
];

const T_LOW: u32 = 0x79cc4519;
const T_HIGH: u32 = 0x7a879d8a;

#[inline]
fn ff(x: u32, y: u32, z: u32, j: usize) -> u32 {
    if j < 16 {
        x ^ y ^ z
    } else {
        (x & y) | (x & z) | (y & z)
    }
}

#[inline]
fn gg(x: u32, y: u32, z: u32, j: usize) -> u32 {
    if j < 16 {
        x ^ y ^ z
    } else {
        (x & y) | (!x & z)
    }
}

#[inline]
fn p0(x: u32) -> u32 {
    x ^ x.rotate_left(9) ^ x.rotate_left(17)
}

#[inline]
fn p1(x: u32) -> u32 {
    x ^ x.rotate_left(15) ^ x.rotate_left(23)
}

fn compress(v: &mut [u32; 8], block: &[u8]) {
    debug_assert_eq!(block.len(), SM3_BLOCK_LEN);

    let mut w = [0u32; 68];
    for (j, word) in block.chunks_exact(4).enumerate() {
        w[j] = u32::from_be_bytes([word[0], word[1], word[2], word[3]]);
    }
    for j in 16..68 {
        w[j] = p1(w[j - 16] ^ w[j - 9] ^ w[j - 3].rotate_left(15))
            ^ w[j - 13].rotate_left(7)
            ^ w[j - 6];
    }
    let mut w1 = [0u32; 64];
    for j in 0..64 {
        w1[j] = w[j] ^ w[j + 4];
    }

    let [mut a, mut b, mut c, mut d, mut e, mut f, mut g, mut h] = *v;

    for j in 0..64 {
        let t = if j < 16 { T_LOW } else { T_HIGH };
        let ss1 = a
            .rotate_left(12)
            .wrapping_add(e)
            .wrapping_add(t.rotate_left((j % 32) as u32))
            .rotate_left(7);
        let ss2 = ss1 ^ a.rotate_left(12);
        let tt1 = ff(a, b, c, j)
            .wrapping_add(d)
            .wrapping_add(ss2)
            .wrapping_add(w1[j]);
        let tt2 = gg(e, f, g, j)
            .wrapping_add(h)
            .wrapping_add(ss1)
            .wrapping_add(w[j]);
        d = c;
        c = b.rotate_left(9);
        b = a;
        a = tt1;
        h = g;
        g = f.rotate_left(19);
        f = e;
        e = p0(tt2);
    }

    for (vi, x) in v.iter_mut().zip([a, b, c, d, e, f, g, h].iter()) {
        *vi ^= x;
    }
}

/// Running SM3 computation.
#[derive(Clone)]
pub struct Sm3Digest {
    v: [u32; 8],
    buf: [u8; SM3_BLOCK_LEN],
    buf_len: usize,
    // full blocks compressed so far
    block_count: u64,
}

impl Default for Sm3Digest {
    fn default() -> Self {
        Self::new()
    }
}

impl Sm3Digest {
    pub fn new() -> Self {
        Sm3Digest {
            v: IV,
            buf: [0; SM3_BLOCK_LEN],
            buf_len: 0,
            block_count: 0,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn update(&mut self, mut data: &[u8]) {
        if self.buf_len > 0 {
            let take = core::cmp::min(SM3_BLOCK_LEN - self.buf_len, data.len());
            self.buf[self.buf_len..self.buf_len + take].copy_from_slice(&data[..take]);
            self.buf_len += take;
            data = &data[take..];
            if self.buf_len < SM3_BLOCK_LEN {
                return;
            }
            let block = self.buf;
            compress(&mut self.v, &block);
            self.block_count += 1;
            self.buf_len = 0;
        }

        let mut blocks = data.chunks_exact(SM3_BLOCK_LEN);
        for block in &mut blocks {
            compress(&mut self.v, block);
            self.block_count += 1;
        }
        let rest = blocks.remainder();
        self.buf[..rest.len()].copy_from_slice(rest);
        self.buf_len = rest.len();
    }

    /// Pads the message, compresses the tail and returns the digest.
    pub fn finalize(mut self) -> [u8; SM3_DIGEST_LEN] {
        let bit_len = (self.block_count * SM3_BLOCK_LEN as u64 + self.buf_len as u64) * 8;

        let mut tail = [0u8; 2 * SM3_BLOCK_LEN];
        tail[..self.buf_len].copy_from_slice(&self.buf[..self.buf_len]);
        tail[self.buf_len] = 0x80;
        // one block if "1" and the 64-bit length still fit, two otherwise
        let tail_len = if self.buf_len + 1 + 8 <= SM3_BLOCK_LEN {
            SM3_BLOCK_LEN
        } else {
            2 * SM3_BLOCK_LEN
        };
        tail[tail_len - 8..tail_len].copy_from_slice(&bit_len.to_be_bytes());

        for block in tail[..tail_len].chunks_exact(SM3_BLOCK_LEN) {
            compress(&mut self.v, block);
        }

        let mut out = [0u8; SM3_DIGEST_LEN];
        for (chunk, word) in out.chunks_exact_mut(4).zip(self.v.iter()) {
            chunk.copy_from_slice(&word.to_be_bytes());
        }
        out
    }
}

pub fn sm3_hash(data: &[u8]) -> [u8; SM3_DIGEST_LEN] {
    let mut ctx = Sm3Digest::new();
    ctx.update(data);
    ctx.finalize()
}

/// Uppercase hex digest, the textual form used by the string API.
pub fn sm3_hash_hex(data: &[u8]) -> String {
    hex::encode_upper(sm3_hash(data))
}

/// HMAC (RFC 2104) keyed with SM3.
pub fn hmac_sm3(key: &[u8], data: &[u8]) -> [u8; SM3_DIGEST_LEN] {
    let mut block_key = [0u8; SM3_BLOCK_LEN];
    if key.len() > SM3_BLOCK_LEN {
        block_key[..SM3_DIGEST_LEN].copy_from_slice(&sm3_hash(key));
    } else {
        block_key[..key.len()].copy_from_slice(key);
    }

    let mut ipad = [0x36u8; SM3_BLOCK_LEN];
    let mut opad = [0x5cu8; SM3_BLOCK_LEN];
    for i in 0..SM3_BLOCK_LEN {
        ipad[i] ^= block_key[i];
        opad[i] ^= block_key[i];
    }

    let mut inner = Sm3Digest::new();
    inner.update(&ipad);
    inner.update(data);
    let inner_hash = inner.finalize();

    let mut outer = Sm3Digest::new();
    outer.update(&opad);
    outer.update(&inner_hash);
    outer.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sm3_empty_test() {
        assert_eq!(
            sm3_hash_hex(b""),
            "1AB21D8355CFA17F8E61194831E81A8F22BEC8C728FEFB747ED035EB5082AA2B"
        );
    }

    #[test]
    fn sm3_abc_test() {
        assert_eq!(
            hex::encode(sm3_hash(b"abc")),
            "66c7f0f462eeedd9d1f2d46bdc10e4e24167c4875cf2f7a2297da02b8f4ba8e0"
        );
    }

    #[test]
    fn sm3_two_block_test() {
        let msg = b"abcdabcdabcdabcdabcdabcdabcdabcdabcdabcdabcdabcdabcdabcdabcdabcd";
        assert_eq!(
            hex::encode(sm3_hash(msg)),
            "debe9ff92275b8a138604889c18e5a4d6fdb70e5387e5765293dcba39c0c5732"
        );
    }

    #[test]
    fn sm3_split_updates_test() {
        let msg: Vec<u8> = (0..200u32).map(|i| (i * 7) as u8).collect();
        let whole = sm3_hash(&msg);
        for split in [0, 1, 55, 56, 63, 64, 65, 127, 128, 199, 200].iter() {
            let mut ctx = Sm3Digest::new();
            ctx.update(&msg[..*split]);
            ctx.update(&msg[*split..]);
            assert_eq!(ctx.finalize(), whole, "split at {}", split);
        }
    }

    #[test]
    fn sm3_clone_forks_state_test() {
        let mut base = Sm3Digest::new();
        base.update(b"shared prefix ");
        let mut left = base.clone();
        left.update(b"left");
        let mut right = base;
        right.update(b"right");
        assert_eq!(left.finalize(), sm3_hash(b"shared prefix left"));
        assert_eq!(right.finalize(), sm3_hash(b"shared prefix right"));
    }

    #[test]
    fn sm3_padding_boundaries_test() {
        // 55 bytes pads into one block, 56 spills the length into a second
        for len in 54..=66 {
            let msg = vec![0x61u8; len];
            let mut ctx = Sm3Digest::new();
            for b in msg.iter() {
                ctx.update(core::slice::from_ref(b));
            }
            assert_eq!(ctx.finalize(), sm3_hash(&msg));
        }
    }

    #[test]
    fn sm3_matches_libsm_test() {
        for len in [0usize, 3, 55, 56, 64, 100, 1000].iter() {
            let msg: Vec<u8> = (0..*len).map(|i| i as u8).collect();
            let expected = libsm::sm3::hash::Sm3Hash::new(&msg).get_hash();
            assert_eq!(sm3_hash(&msg), expected);
        }
    }

    #[test]
    fn hmac_sm3_keys_test() {
        let short = hmac_sm3(b"key", b"The quick brown fox jumps over the lazy dog");
        let long_key = [0x0bu8; 100];
        let long = hmac_sm3(&long_key, b"The quick brown fox jumps over the lazy dog");
        // a key longer than a block is replaced by its digest
        let hashed = hmac_sm3(&sm3_hash(&long_key), b"The quick brown fox jumps over the lazy dog");
        assert_eq!(long, hashed);
        assert_ne!(short, long);
    }
}
