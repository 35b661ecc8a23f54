//! Authenticated encryption of garbled table rows.
//!
//! Rows are sealed with AES-128-GCM. Each (gate, row, layer) triple gets its
//! own nonce, so a key is never used twice with the same nonce.

use aes_gcm::{
    aead::{generic_array::GenericArray, Aead, NewAead},
    Aes128Gcm,
};
use yao_circuits::WireId;

use crate::{Block, CryptoError};

pub(crate) const NONCE_LEN: usize = 12;

/// Layer of a doubly encrypted row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub(crate) enum Layer {
    /// Encrypted under the left input key. Also used for single encryption.
    Outer = 0,
    /// Encrypted under the right input key.
    Inner = 1,
}

/// Nonce layout: gate id (u32 BE) ‖ row ‖ layer ‖ zero padding.
pub(crate) fn nonce(gate: WireId, row: u8, layer: Layer) -> [u8; NONCE_LEN] {
    let mut nonce = [0u8; NONCE_LEN];
    nonce[..4].copy_from_slice(&gate.to_be_bytes());
    nonce[4] = row;
    nonce[5] = layer as u8;
    nonce
}

fn cipher(key: &Block) -> Aes128Gcm {
    Aes128Gcm::new(GenericArray::from_slice(&key.to_bytes()))
}

pub(crate) fn seal(
    key: &Block,
    gate: WireId,
    row: u8,
    layer: Layer,
    plaintext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let nonce = nonce(gate, row, layer);
    cipher(key)
        .encrypt(GenericArray::from_slice(&nonce), plaintext)
        .map_err(|_| CryptoError::EncryptionFailed { gate })
}

pub(crate) fn open(
    key: &Block,
    gate: WireId,
    row: u8,
    layer: Layer,
    ciphertext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let nonce = nonce(gate, row, layer);
    cipher(key)
        .decrypt(GenericArray::from_slice(&nonce), ciphertext)
        .map_err(|_| CryptoError::DecryptionFailed { gate })
}
