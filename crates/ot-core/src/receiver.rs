use curve25519_dalek::{
    ristretto::RistrettoPoint,
    scalar::Scalar,
    traits::Identity,
};
use merlin::Transcript;
use rand::{CryptoRng, Rng};

use crate::{
    msgs::{ReceiverSetup, SenderPayload, SenderSetup},
    pad, random_scalar, xor, ReceiverCoreError, DOMAIN_SEP,
};

/// State of the OT receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiverState {
    /// Fresh receiver.
    Initialized,
    /// Blinded choices sent.
    Setup,
    /// Payload received. The receiver cannot be reused.
    Complete,
}

/// OT receiver.
pub struct Receiver {
    /// The current state of the protocol
    state: ReceiverState,
    /// The transcript of the protocol so far
    transcript: Transcript,
    /// `x_i S` for every transfer, from which the pads are derived
    shared_points: Option<Vec<(RistrettoPoint, [u8; 16])>>,
    /// The bits that this receiver picked
    choices: Option<Vec<bool>>,
}

impl Default for Receiver {
    fn default() -> Self {
        Self {
            state: ReceiverState::Initialized,
            transcript: Transcript::new(DOMAIN_SEP),
            shared_points: None,
            choices: None,
        }
    }
}

impl std::fmt::Debug for Receiver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Receiver")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

fn check_state(expected: ReceiverState, actual: ReceiverState) -> Result<(), ReceiverCoreError> {
    if expected != actual {
        Err(ReceiverCoreError::BadState(
            format!("{expected:?}"),
            format!("{actual:?}"),
        ))
    } else {
        Ok(())
    }
}

/// Computes the blinded choice `R = cS + xG`.
///
/// For a uniform `x`, `R` is uniform whatever `c` is.
pub(crate) fn blind(choice: bool, x: &Scalar, public_key: &RistrettoPoint) -> RistrettoPoint {
    let blinding = RistrettoPoint::mul_base(x);
    if choice {
        public_key + blinding
    } else {
        blinding
    }
}

impl Receiver {
    /// Returns the current state.
    pub fn state(&self) -> ReceiverState {
        self.state
    }

    /// Blinds the choice bits against the sender's public key.
    pub fn setup<R: Rng + CryptoRng + ?Sized>(
        &mut self,
        rng: &mut R,
        choices: &[bool],
        sender_setup: SenderSetup,
    ) -> Result<ReceiverSetup, ReceiverCoreError> {
        check_state(ReceiverState::Initialized, self.state)?;

        self.transcript
            .append_message(b"pubkey", sender_setup.public_key.as_bytes());

        let public_key = sender_setup
            .public_key
            .decompress()
            .filter(|point| *point != RistrettoPoint::identity())
            .ok_or(ReceiverCoreError::InvalidPoint)?;

        let (blinded_choices, shared_points): (Vec<_>, Vec<_>) = choices
            .iter()
            .map(|&choice| {
                let x = random_scalar(rng);
                let blinded_choice = blind(choice, &x, &public_key).compress();

                self.transcript
                    .append_message(b"R", blinded_choice.as_bytes());

                let mut tweak = [0u8; 16];
                self.transcript.challenge_bytes(b"tweak", &mut tweak);

                (blinded_choice, (x * public_key, tweak))
            })
            .unzip();

        self.shared_points = Some(shared_points);
        self.choices = Some(choices.to_vec());
        self.state = ReceiverState::Setup;

        Ok(ReceiverSetup { blinded_choices })
    }

    /// Unmasks the chosen message of every transfer.
    pub fn receive<const N: usize>(
        &mut self,
        payload: SenderPayload,
    ) -> Result<Vec<[u8; N]>, ReceiverCoreError> {
        check_state(ReceiverState::Setup, self.state)?;

        // The receiver is spent whether or not the payload is well formed.
        self.state = ReceiverState::Complete;

        let (Some(shared_points), Some(choices)) = (self.shared_points.take(), self.choices.take())
        else {
            return Err(ReceiverCoreError::BadState(
                "choices set".to_string(),
                "choices missing".to_string(),
            ));
        };

        if payload.ciphertexts.len() != choices.len() {
            return Err(ReceiverCoreError::CountMismatch {
                expected: choices.len(),
                actual: payload.ciphertexts.len(),
            });
        }

        choices
            .iter()
            .zip(shared_points)
            .zip(payload.ciphertexts)
            .map(|((&choice, (point, tweak)), [ct0, ct1])| {
                let ct = if choice { ct1 } else { ct0 };
                if ct.len() != N {
                    return Err(ReceiverCoreError::CiphertextLength {
                        expected: N,
                        actual: ct.len(),
                    });
                }

                let key: [u8; N] = pad(&point, &tweak);
                let mut output = [0u8; N];
                output.copy_from_slice(&xor(&key, &ct));

                Ok(output)
            })
            .collect()
    }
}
