//! Private intersection of two sets of `f32` values.
//!
//! Every pair of elements is compared with a fresh execution of the 32-bit
//! equality circuit. Alice garbles, Bob evaluates, and both learn the result
//! of every comparison. Alice walks her elements and compares each against
//! up to `|B|` of Bob's, in Bob's order. Bob walks `|A|` rounds over his
//! elements. Both stop a round at the first match.

use std::sync::Arc;

use futures::SinkExt;
use rand::{CryptoRng, Rng};
use tracing::{debug, instrument, warn};
use yao_circuits::{equality_circuit, Circuit};

use crate::{
    encoding::{dedup_by_bits, to_bits, EncodingError, F32_BITS},
    expect_msg_or_err,
    msg::Message,
    Channel, Evaluator, Garbler, Outcome, ProtocolError, PsiConfig,
};

/// Errors that can occur during a set intersection.
#[derive(Debug, thiserror::Error)]
#[allow(missing_docs)]
pub enum PsiError {
    #[error("comparison failed after {attempts} attempt(s): {source}")]
    TrialFailed {
        attempts: usize,
        #[source]
        source: ProtocolError,
    },
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Alice's side of the set intersection.
pub struct PsiGarbler<C, R> {
    config: PsiConfig,
    garbler: Garbler<C, R>,
    circ: Arc<Circuit>,
}

impl<C, R> PsiGarbler<C, R>
where
    C: Channel<Message>,
    R: Rng + CryptoRng + Send,
{
    /// Creates a new set intersection garbler.
    ///
    /// Fails if the configured bit width is not that of an `f32`.
    pub fn new(config: PsiConfig, channel: C, rng: R) -> Result<Self, PsiError> {
        let circ = comparison_circuit(config.bit_width())?;
        let garbler = Garbler::new(config.protocol().clone(), channel, rng);

        Ok(Self {
            config,
            garbler,
            circ,
        })
    }

    /// Compares `value` with the element Bob offers for this comparison.
    ///
    /// Failed executions are repeated with fresh keys as long as they are
    /// retryable and attempts remain.
    #[instrument(level = "debug", skip(self), err)]
    pub async fn test_equal(&mut self, value: f32) -> Result<bool, PsiError> {
        let bits = to_bits(value.to_bits());

        let mut attempts = 0;
        loop {
            attempts += 1;
            match self.garbler.run(self.circ.clone(), &bits).await {
                Ok(outcome) => return equal(&self.circ, &outcome),
                Err(err) if err.is_retryable() && attempts < self.config.max_attempts() => {
                    warn!("comparison attempt {attempts} failed, retrying: {err}");
                }
                Err(source) => return Err(PsiError::TrialFailed { attempts, source }),
            }
        }
    }

    /// Computes the intersection of `set` with Bob's set.
    ///
    /// The elements are returned in the order of `set`. Elements with the
    /// same bit pattern count once.
    #[instrument(level = "debug", skip_all, err)]
    pub async fn intersect(&mut self, set: &[f32]) -> Result<Vec<f32>, PsiError> {
        let set = dedup_by_bits(set.iter().copied());

        let channel = self.garbler.channel_mut();
        channel
            .send(Message::SetSize(set.len() as u64))
            .await
            .map_err(ProtocolError::from)?;
        let peer_len = expect_msg_or_err!(*channel, Message::SetSize)?;

        debug!("intersecting {} elements with {peer_len}", set.len());

        let mut common = Vec::new();
        for value in set {
            for _ in 0..peer_len {
                if self.test_equal(value).await? {
                    common.push(value);
                    break;
                }
            }
        }

        self.garbler.finish().await?;

        Ok(common)
    }

    /// Returns the channel.
    pub fn into_inner(self) -> C {
        self.garbler.into_inner()
    }
}

/// Bob's side of the set intersection.
pub struct PsiEvaluator<C, R> {
    config: PsiConfig,
    evaluator: Evaluator<C, R>,
    circ: Arc<Circuit>,
}

impl<C, R> PsiEvaluator<C, R>
where
    C: Channel<Message>,
    R: Rng + CryptoRng + Send,
{
    /// Creates a new set intersection evaluator.
    ///
    /// Fails if the configured bit width is not that of an `f32`.
    pub fn new(config: PsiConfig, channel: C, rng: R) -> Result<Self, PsiError> {
        let circ = comparison_circuit(config.bit_width())?;
        let evaluator = Evaluator::new(config.protocol().clone(), channel, rng);

        Ok(Self {
            config,
            evaluator,
            circ,
        })
    }

    /// Compares `value` with the element Alice offers for this comparison.
    ///
    /// Failed executions are repeated with fresh keys as long as they are
    /// retryable and attempts remain.
    #[instrument(level = "debug", skip(self), err)]
    pub async fn test_equal(&mut self, value: f32) -> Result<bool, PsiError> {
        let bits = to_bits(value.to_bits());

        let mut attempts = 0;
        loop {
            attempts += 1;
            match self.evaluator.run(&self.circ, &bits).await {
                Ok(outcome) => return equal(&self.circ, &outcome),
                Err(err) if err.is_retryable() && attempts < self.config.max_attempts() => {
                    warn!("comparison attempt {attempts} failed, retrying: {err}");
                }
                Err(source) => return Err(PsiError::TrialFailed { attempts, source }),
            }
        }
    }

    /// Computes the intersection of `set` with Alice's set.
    ///
    /// The elements are returned in the order they were matched. Elements
    /// with the same bit pattern count once.
    #[instrument(level = "debug", skip_all, err)]
    pub async fn intersect(&mut self, set: &[f32]) -> Result<Vec<f32>, PsiError> {
        let set = dedup_by_bits(set.iter().copied());

        let channel = self.evaluator.channel_mut();
        let peer_len = expect_msg_or_err!(*channel, Message::SetSize)?;
        channel
            .send(Message::SetSize(set.len() as u64))
            .await
            .map_err(ProtocolError::from)?;

        debug!("intersecting {} elements with {peer_len}", set.len());

        let mut common = Vec::new();
        for _ in 0..peer_len {
            for &value in &set {
                if self.test_equal(value).await? {
                    common.push(value);
                    break;
                }
            }
        }

        self.evaluator.await_finish().await?;

        Ok(common)
    }

    /// Returns the channel.
    pub fn into_inner(self) -> C {
        self.evaluator.into_inner()
    }
}

/// Builds the circuit comparing two encoded elements of `bit_width` bits.
fn comparison_circuit(bit_width: usize) -> Result<Arc<Circuit>, PsiError> {
    if bit_width != F32_BITS {
        return Err(ProtocolError::from(EncodingError::BitWidthMismatch {
            expected: F32_BITS,
            actual: bit_width,
        })
        .into());
    }

    let circ = equality_circuit(bit_width).map_err(ProtocolError::from)?;

    Ok(Arc::new(circ))
}

fn equal(circ: &Circuit, outcome: &Outcome) -> Result<bool, PsiError> {
    match outcome.output_bits().as_slice() {
        [equal] => Ok(*equal),
        _ => Err(ProtocolError::InvalidOutput {
            expected: circ.outputs().to_vec(),
            actual: outcome.outputs().keys().copied().collect(),
        }
        .into()),
    }
}
