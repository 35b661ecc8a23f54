use core::ops::{BitXor, BitXorAssign};

use rand::{CryptoRng, Rng};
use serde::{Deserialize, Serialize};

/// Length of a [`Block`] in bytes.
pub const BLOCK_LEN: usize = 16;

/// A 128-bit symmetric key.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Block(u128);

impl Block {
    /// Creates a new block.
    #[inline]
    pub fn new(b: u128) -> Self {
        Self(b)
    }

    /// Samples a uniformly random block.
    #[inline]
    pub fn random<R: Rng + CryptoRng + ?Sized>(rng: &mut R) -> Self {
        Self(rng.random())
    }

    /// Returns the inner value.
    #[inline]
    pub fn into_inner(self) -> u128 {
        self.0
    }

    /// Returns the big-endian byte representation.
    #[inline]
    pub fn to_bytes(&self) -> [u8; BLOCK_LEN] {
        self.0.to_be_bytes()
    }

    /// Creates a block from its big-endian byte representation.
    #[inline]
    pub fn from_bytes(bytes: [u8; BLOCK_LEN]) -> Self {
        Self(u128::from_be_bytes(bytes))
    }
}

impl From<[u8; BLOCK_LEN]> for Block {
    fn from(bytes: [u8; BLOCK_LEN]) -> Self {
        Self::from_bytes(bytes)
    }
}

impl BitXor for Block {
    type Output = Self;

    #[inline]
    fn bitxor(self, other: Self) -> Self::Output {
        Self(self.0 ^ other.0)
    }
}

impl BitXorAssign for Block {
    #[inline]
    fn bitxor_assign(&mut self, other: Self) {
        self.0 ^= other.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;

    #[test]
    fn test_bytes_are_big_endian() {
        let b = Block::new(1);

        assert_eq!(b.to_bytes()[BLOCK_LEN - 1], 1);
        assert_eq!(Block::from_bytes(b.to_bytes()), b);
    }

    #[test]
    fn test_bitxor() {
        let a = Block::new(0b1100);
        let mut b = Block::new(0b1010);

        assert_eq!(a ^ b, Block::new(0b0110));

        b ^= a;
        assert_eq!(b, Block::new(0b0110));
    }

    #[test]
    fn test_random_is_seeded() {
        let a = Block::random(&mut ChaCha12Rng::seed_from_u64(0));
        let b = Block::random(&mut ChaCha12Rng::seed_from_u64(0));
        let c = Block::random(&mut ChaCha12Rng::seed_from_u64(1));

        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
