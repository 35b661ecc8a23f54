//! Core state machines of the Chou-Orlandi "simplest" oblivious transfer,
//! see <https://eprint.iacr.org/2015/267.pdf> (Figure 1).
//!
//! The sender publishes `S = yG`. For each transfer the receiver sends
//! `R_i = c_i S + x_i G` and derives its pad from `x_i S`. The sender masks
//! message 0 with a pad derived from `yR_i` and message 1 with a pad derived
//! from `y(R_i - S)`. A merlin transcript over all exchanged points supplies a
//! distinct tweak per transfer.
//!
//! These types perform no I/O. They are driven by a channel-level wrapper.

#![deny(missing_docs, unreachable_pub, unused_must_use)]
#![deny(clippy::all)]

mod error;
pub mod msgs;
mod receiver;
mod sender;

pub use error::{ReceiverCoreError, SenderCoreError};
pub use receiver::{Receiver, ReceiverState};
pub use sender::{Sender, SenderState};

use curve25519_dalek::{ristretto::RistrettoPoint, scalar::Scalar};
use rand::{CryptoRng, Rng};

pub(crate) const DOMAIN_SEP: &[u8] = b"yao CO15 DH-OT";

/// Derives an `N`-byte pad from a point: the blake3 XOF of `tweak ‖ point`.
pub(crate) fn pad<const N: usize>(point: &RistrettoPoint, tweak: &[u8]) -> [u8; N] {
    let mut hasher = blake3::Hasher::new();
    hasher.update(tweak);
    hasher.update(point.compress().as_bytes());

    let mut pad = [0u8; N];
    hasher.finalize_xof().fill(&mut pad);
    pad
}

pub(crate) fn xor(a: &[u8], b: &[u8]) -> Vec<u8> {
    a.iter().zip(b).map(|(a, b)| a ^ b).collect()
}

/// Samples a uniform scalar by reducing 64 random bytes.
pub(crate) fn random_scalar<R: Rng + CryptoRng + ?Sized>(rng: &mut R) -> Scalar {
    let mut bytes = [0u8; 64];
    rng.fill_bytes(&mut bytes);
    Scalar::from_bytes_mod_order_wide(&bytes)
}
