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

use ::rand::rngs::ThreadRng;
use ::rand::{thread_rng, RngCore};

/// A source of cryptographically secure random bytes.
pub trait SecureRandom {
    fn fill(&mut self, dest: &mut [u8]);
}

/// The thread-local CSPRNG of the `rand` crate.
pub struct SystemRandom(ThreadRng);

impl SystemRandom {
    pub fn new() -> Self {
        SystemRandom(thread_rng())
    }
}

impl Default for SystemRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl SecureRandom for SystemRandom {
    fn fill(&mut self, dest: &mut [u8]) {
        self.0.fill_bytes(dest)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::SecureRandom;

    /// Replays `bytes` cyclically, so a single 32-byte value pins every
    /// scalar drawn from it.
    pub struct FixedRandom {
        bytes: Vec<u8>,
        pos: usize,
    }

    impl FixedRandom {
        pub fn new(bytes: &[u8]) -> Self {
            FixedRandom {
                bytes: bytes.to_vec(),
                pos: 0,
            }
        }
    }

    impl SecureRandom for FixedRandom {
        fn fill(&mut self, dest: &mut [u8]) {
            for b in dest.iter_mut() {
                *b = self.bytes[self.pos % self.bytes.len()];
                self.pos += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_random_fills() {
        let mut rng = SystemRandom::new();
        let mut a = [0u8; 32];
        let mut b = [0u8; 32];
        rng.fill(&mut a);
        rng.fill(&mut b);
        assert_ne!(a, b);
    }
}
