use rand::{CryptoRng, Rng};
use serde::{Deserialize, Serialize};

use crate::{block::BLOCK_LEN, Block};

/// Length of an encoded [`Label`] in bytes: the key followed by the external bit.
pub const LABEL_LEN: usize = BLOCK_LEN + 1;

/// The active value of a wire, as seen by the evaluator.
///
/// The external bit is the logical value masked with the wire's permute bit,
/// so it reveals nothing about the logical value on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    key: Block,
    external: bool,
}

impl Label {
    /// Creates a new label.
    pub fn new(key: Block, external: bool) -> Self {
        Self { key, external }
    }

    /// Returns the key.
    pub fn key(&self) -> Block {
        self.key
    }

    /// Returns the external (permuted) bit.
    pub fn external(&self) -> bool {
        self.external
    }

    /// Encodes the label as `key ‖ external`.
    pub fn to_bytes(&self) -> [u8; LABEL_LEN] {
        let mut bytes = [0u8; LABEL_LEN];
        bytes[..BLOCK_LEN].copy_from_slice(&self.key.to_bytes());
        bytes[BLOCK_LEN] = self.external as u8;
        bytes
    }

    /// Decodes a label encoded with [`Label::to_bytes`].
    ///
    /// Returns `None` if the slice has the wrong length or the external byte
    /// is not a bit.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != LABEL_LEN {
            return None;
        }

        let key: [u8; BLOCK_LEN] = bytes[..BLOCK_LEN].try_into().ok()?;
        let external = match bytes[BLOCK_LEN] {
            0 => false,
            1 => true,
            _ => return None,
        };

        Some(Self::new(Block::from_bytes(key), external))
    }
}

/// Both keys of a wire together with its permute bit.
///
/// Only the garbler ever holds these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireKeys {
    keys: [Block; 2],
    pbit: bool,
}

impl WireKeys {
    /// Creates wire keys from their parts.
    pub fn new(keys: [Block; 2], pbit: bool) -> Self {
        Self { keys, pbit }
    }

    /// Samples two independent keys and a uniform permute bit.
    pub fn random<R: Rng + CryptoRng + ?Sized>(rng: &mut R) -> Self {
        Self {
            keys: [Block::random(rng), Block::random(rng)],
            pbit: rng.random(),
        }
    }

    /// Returns the key for the logical value `value`.
    pub fn key(&self, value: bool) -> Block {
        self.keys[value as usize]
    }

    /// Returns both keys, indexed by logical value.
    pub fn keys(&self) -> &[Block; 2] {
        &self.keys
    }

    /// Returns the permute bit.
    pub fn pbit(&self) -> bool {
        self.pbit
    }

    /// Returns the label encoding the logical value `value`.
    pub fn label(&self, value: bool) -> Label {
        Label::new(self.key(value), value ^ self.pbit)
    }

    /// Returns both labels, indexed by logical value.
    pub fn labels(&self) -> [Label; 2] {
        [self.label(false), self.label(true)]
    }
}
