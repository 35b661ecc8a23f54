//! Messages of the oblivious transfer protocol.

use curve25519_dalek::ristretto::CompressedRistretto;
use serde::{Deserialize, Serialize};

/// Sender's public key `S = yG`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderSetup {
    /// The sender's public key.
    pub public_key: CompressedRistretto,
}

/// Receiver's blinded choices `R_i = c_i S + x_i G`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiverSetup {
    /// One blinded choice per transfer.
    pub blinded_choices: Vec<CompressedRistretto>,
}

/// Both messages of every transfer, each masked with its own pad.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderPayload {
    /// Masked message pairs, one per transfer.
    pub ciphertexts: Vec<[Vec<u8>; 2]>,
}
