use curve25519_dalek::{ristretto::RistrettoPoint, scalar::Scalar};
use merlin::Transcript;
use rand::{CryptoRng, Rng};

use crate::{
    msgs::{ReceiverSetup, SenderPayload, SenderSetup},
    pad, random_scalar, xor, SenderCoreError, DOMAIN_SEP,
};

/// State of the OT sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SenderState {
    /// Fresh sender.
    Initialized,
    /// Public key sent.
    Setup,
    /// Payload sent. The sender cannot be reused.
    Complete,
}

/// OT sender.
pub struct Sender {
    /// The current state of the protocol
    state: SenderState,
    /// The transcript of the protocol so far
    transcript: Transcript,
    /// The private key `y`
    private_key: Option<Scalar>,
    /// The public key `S = yG`
    public_key: Option<RistrettoPoint>,
}

impl Default for Sender {
    fn default() -> Self {
        Self {
            state: SenderState::Initialized,
            transcript: Transcript::new(DOMAIN_SEP),
            private_key: None,
            public_key: None,
        }
    }
}

impl std::fmt::Debug for Sender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sender")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

fn check_state(expected: SenderState, actual: SenderState) -> Result<(), SenderCoreError> {
    if expected != actual {
        Err(SenderCoreError::BadState(
            format!("{expected:?}"),
            format!("{actual:?}"),
        ))
    } else {
        Ok(())
    }
}

impl Sender {
    /// Returns the current state.
    pub fn state(&self) -> SenderState {
        self.state
    }

    /// Samples the key pair for this transfer and returns the public key.
    pub fn setup<R: Rng + CryptoRng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<SenderSetup, SenderCoreError> {
        check_state(SenderState::Initialized, self.state)?;

        let private_key = random_scalar(rng);
        let public_key = RistrettoPoint::mul_base(&private_key);
        let compressed = public_key.compress();

        self.transcript
            .append_message(b"pubkey", compressed.as_bytes());

        self.private_key = Some(private_key);
        self.public_key = Some(public_key);
        self.state = SenderState::Setup;

        Ok(SenderSetup {
            public_key: compressed,
        })
    }

    /// Masks `inputs[i][0]` and `inputs[i][1]` so that the receiver can only
    /// unmask the one selected by its `i`-th choice.
    pub fn send<const N: usize>(
        &mut self,
        inputs: &[[[u8; N]; 2]],
        receiver_setup: ReceiverSetup,
    ) -> Result<SenderPayload, SenderCoreError> {
        check_state(SenderState::Setup, self.state)?;

        let (Some(private_key), Some(public_key)) = (self.private_key, self.public_key) else {
            return Err(SenderCoreError::BadState(
                "keys set".to_string(),
                "keys missing".to_string(),
            ));
        };

        if inputs.len() != receiver_setup.blinded_choices.len() {
            return Err(SenderCoreError::CountMismatch {
                expected: receiver_setup.blinded_choices.len(),
                actual: inputs.len(),
            });
        }

        // yS
        let ys = private_key * public_key;

        let ciphertexts = inputs
            .iter()
            .zip(&receiver_setup.blinded_choices)
            .map(|(input, blinded_choice)| {
                self.transcript
                    .append_message(b"R", blinded_choice.as_bytes());

                let mut tweak = [0u8; 16];
                self.transcript.challenge_bytes(b"tweak", &mut tweak);

                let blinded_choice = blinded_choice
                    .decompress()
                    .ok_or(SenderCoreError::InvalidPoint)?;

                // yR is the receiver's key if it chose 0, y(R - S) if it chose 1
                let yr = private_key * blinded_choice;
                let k0: [u8; N] = pad(&yr, &tweak);
                let k1: [u8; N] = pad(&(yr - ys), &tweak);

                Ok([xor(&k0, &input[0]), xor(&k1, &input[1])])
            })
            .collect::<Result<Vec<_>, SenderCoreError>>();

        self.state = SenderState::Complete;
        self.private_key = None;

        let ciphertexts = ciphertexts?;

        tracing::trace!(count = ciphertexts.len(), "sent ot payload");

        Ok(SenderPayload { ciphertexts })
    }
}
