use std::{collections::BTreeSet, sync::Arc};

use futures::SinkExt;
use garble_core::{garble, WireKeys};
use rand::{CryptoRng, Rng};
use tracing::{debug, instrument, warn};
use yao_circuits::Circuit;

use crate::{
    expect_msg_or_err,
    msg::{self, Message},
    ot::{DhOtSender, InsecureSender, ObliviousSend},
    Channel, OtMode, Outcome, ProtocolConfig, ProtocolError,
};

/// The garbling party (Alice).
///
/// Garbles a circuit with fresh keys for every execution, hands the tables to
/// the evaluator and learns the outputs the evaluator reports back.
pub struct Garbler<C, R> {
    config: ProtocolConfig,
    channel: C,
    rng: R,
}

impl<C, R> Garbler<C, R>
where
    C: Channel<Message>,
    R: Rng + CryptoRng + Send,
{
    /// Creates a new garbler.
    pub fn new(config: ProtocolConfig, channel: C, rng: R) -> Self {
        Self {
            config,
            channel,
            rng,
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    pub(crate) fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    /// Runs one execution of `circ` with the garbler's input bits.
    ///
    /// If the execution fails locally the evaluator is sent an abort.
    #[instrument(level = "debug", skip_all, fields(circuit = %circ.id()), err)]
    pub async fn run(
        &mut self,
        circ: Arc<Circuit>,
        input: &[bool],
    ) -> Result<Outcome, ProtocolError> {
        match self.execute(&circ, input).await {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                if err.notifies_peer() {
                    if let Err(send_err) = self.channel.send(Message::Abort(err.to_abort())).await
                    {
                        debug!("failed to notify evaluator: {send_err}");
                    }
                }
                Err(err)
            }
        }
    }

    async fn execute(
        &mut self,
        circ: &Arc<Circuit>,
        input: &[bool],
    ) -> Result<Outcome, ProtocolError> {
        if input.len() != circ.alice().len() {
            return Err(ProtocolError::InputLength {
                expected: circ.alice().len(),
                actual: input.len(),
            });
        }

        let garbled = garble(circ.clone(), &mut self.rng)?;

        debug!("sending garbled circuit");
        self.channel
            .send(Message::GarbledCircuit(msg::GarbledCircuit {
                circuit: circ.as_ref().clone(),
                tables: garbled.tables().to_vec(),
                pbits_out: garbled.pbits_out(),
            }))
            .await?;

        expect_msg_or_err!(self.channel, @unit Message::Ack)?;

        let labels = garbled.encode(circ.alice(), input)?;
        self.channel.send(Message::GarblerInputs(labels)).await?;

        let pairs = circ
            .bob()
            .iter()
            .map(|wire| garbled.wire_keys(*wire).map(WireKeys::labels))
            .collect::<Result<Vec<_>, _>>()?;

        debug!("transferring {} evaluator labels", pairs.len());
        match self.config.ot_mode() {
            OtMode::Enabled => {
                DhOtSender::new(&mut self.channel, &mut self.rng)
                    .send(pairs)
                    .await?
            }
            OtMode::InsecureNoOt => {
                warn!("sending both labels of every evaluator wire, the evaluator can decode every gate");
                InsecureSender::new(&mut self.channel).send(pairs).await?
            }
        }

        let outputs = expect_msg_or_err!(self.channel, Message::Output)?;

        let expected: BTreeSet<_> = circ.outputs().iter().copied().collect();
        if outputs.keys().copied().collect::<BTreeSet<_>>() != expected {
            return Err(ProtocolError::InvalidOutput {
                expected: expected.into_iter().collect(),
                actual: outputs.into_keys().collect(),
            });
        }

        debug!("execution complete");

        Ok(Outcome::new(circ.id(), input.to_vec(), outputs))
    }

    /// Tells the evaluator that no further executions follow.
    pub async fn finish(&mut self) -> Result<(), ProtocolError> {
        self.channel.send(Message::Finish).await?;

        Ok(())
    }

    /// Returns the channel.
    pub fn into_inner(self) -> C {
        self.channel
    }
}
