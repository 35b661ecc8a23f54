use futures::{SinkExt, StreamExt};
use rand::{CryptoRng, Rng};
use tracing::{debug, instrument, warn};
use yao_circuits::Circuit;

use crate::{
    expect_msg_or_err,
    msg::{self, Message},
    ot::{DhOtReceiver, InsecureReceiver, ObliviousReceive},
    Channel, OtMode, Outcome, ProtocolConfig, ProtocolError,
};

/// The evaluating party (Bob).
///
/// Evaluates whatever circuit the garbler sends, obtaining the labels of its
/// own input wires by oblivious transfer, and reports the outputs back.
pub struct Evaluator<C, R> {
    config: ProtocolConfig,
    channel: C,
    rng: R,
}

impl<C, R> Evaluator<C, R>
where
    C: Channel<Message>,
    R: Rng + CryptoRng + Send,
{
    /// Creates a new evaluator.
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

    /// Evaluates the next circuit the garbler sends.
    ///
    /// Returns `None` if the garbler finished the session instead.
    #[instrument(level = "debug", skip_all, err)]
    pub async fn execute(&mut self, input: &[bool]) -> Result<Option<Outcome>, ProtocolError> {
        self.execute_with(None, |_| input.to_vec()).await
    }

    /// Evaluates the next circuit the garbler sends, with the input bits
    /// `input` chooses for it.
    ///
    /// Returns `None` if the garbler finished the session instead.
    #[instrument(level = "debug", skip_all, err)]
    pub async fn execute_for<F>(&mut self, input: F) -> Result<Option<Outcome>, ProtocolError>
    where
        F: FnOnce(&Circuit) -> Vec<bool>,
    {
        self.execute_with(None, input).await
    }

    /// Evaluates the next circuit, which must be `circ`.
    #[instrument(level = "debug", skip_all, fields(circuit = %circ.id()), err)]
    pub async fn run(&mut self, circ: &Circuit, input: &[bool]) -> Result<Outcome, ProtocolError> {
        self.execute_with(Some(circ), |_| input.to_vec())
            .await?
            .ok_or(ProtocolError::SessionClosed)
    }

    /// Waits for the garbler to finish the session.
    pub async fn await_finish(&mut self) -> Result<(), ProtocolError> {
        expect_msg_or_err!(self.channel, @unit Message::Finish)
    }

    /// Returns the channel.
    pub fn into_inner(self) -> C {
        self.channel
    }

    async fn execute_with<F>(
        &mut self,
        expected: Option<&Circuit>,
        input: F,
    ) -> Result<Option<Outcome>, ProtocolError>
    where
        F: FnOnce(&Circuit) -> Vec<bool>,
    {
        let garbled = match self.channel.next().await {
            Some(Ok(Message::GarbledCircuit(garbled))) => garbled,
            Some(Ok(Message::Finish)) => {
                debug!("garbler finished the session");
                return Ok(None);
            }
            Some(Ok(other)) => return Err(expect_msg_or_err!(@other other)),
            Some(Err(err)) => return Err(err.into()),
            None => return Err(ProtocolError::SessionClosed),
        };

        let input = input(&garbled.circuit);
        match self.evaluate(garbled, expected, &input).await {
            Ok(outcome) => Ok(Some(outcome)),
            Err(err) => {
                if err.notifies_peer() {
                    if let Err(send_err) = self.channel.send(Message::Abort(err.to_abort())).await
                    {
                        debug!("failed to notify garbler: {send_err}");
                    }
                }
                Err(err)
            }
        }
    }

    async fn evaluate(
        &mut self,
        garbled: msg::GarbledCircuit,
        expected: Option<&Circuit>,
        input: &[bool],
    ) -> Result<Outcome, ProtocolError> {
        let msg::GarbledCircuit {
            circuit,
            tables,
            pbits_out,
        } = garbled;

        debug!(circuit = %circuit.id(), "received garbled circuit");

        if let Some(expected) = expected {
            if *expected != circuit {
                return Err(ProtocolError::CircuitMismatch {
                    expected: expected.id().to_string(),
                    actual: circuit.id().to_string(),
                });
            }
        }

        if input.len() != circuit.bob().len() {
            return Err(ProtocolError::InputLength {
                expected: circuit.bob().len(),
                actual: input.len(),
            });
        }

        self.channel.send(Message::Ack).await?;

        let mut labels = expect_msg_or_err!(self.channel, Message::GarblerInputs)?;

        let own = match self.config.ot_mode() {
            OtMode::Enabled => {
                DhOtReceiver::new(&mut self.channel, &mut self.rng)
                    .receive(input.to_vec())
                    .await?
            }
            OtMode::InsecureNoOt => {
                warn!("receiving both labels of every input wire, oblivious transfer is disabled");
                InsecureReceiver::new(&mut self.channel)
                    .receive(input.to_vec())
                    .await?
            }
        };
        labels.extend(circuit.bob().iter().copied().zip(own));

        let outputs = garble_core::evaluate(&circuit, &tables, &pbits_out, &labels)?;

        self.channel.send(Message::Output(outputs.clone())).await?;

        debug!("execution complete");

        Ok(Outcome::new(circuit.id(), input.to_vec(), outputs))
    }
}
