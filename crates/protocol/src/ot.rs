//! Oblivious transfer of wire labels over a [`Channel`].

use async_trait::async_trait;
use futures::SinkExt;
use garble_core::{Label, LABEL_LEN};
use ot_core::{Receiver, Sender};
use rand::{CryptoRng, Rng};
use tracing::instrument;

use crate::{
    expect_msg_or_err,
    msg::{Message, OtMessage},
    Channel, OtError,
};

/// Sends one of two messages per transfer, without learning which one.
#[async_trait]
pub trait ObliviousSend<T> {
    /// Offers `inputs[i][0]` and `inputs[i][1]` for the `i`-th transfer.
    async fn send(&mut self, inputs: Vec<[T; 2]>) -> Result<(), OtError>;
}

/// Receives one of two messages per transfer, without revealing which one.
#[async_trait]
pub trait ObliviousReceive<T> {
    /// Receives the message selected by each choice bit.
    async fn receive(&mut self, choices: Vec<bool>) -> Result<Vec<T>, OtError>;
}

/// Label sender running the Diffie-Hellman OT over a channel.
pub struct DhOtSender<'a, C, R> {
    channel: &'a mut C,
    rng: &'a mut R,
}

impl<'a, C, R> DhOtSender<'a, C, R> {
    /// Creates a sender using the given channel and randomness.
    pub fn new(channel: &'a mut C, rng: &'a mut R) -> Self {
        Self { channel, rng }
    }
}

#[async_trait]
impl<'a, C, R> ObliviousSend<Label> for DhOtSender<'a, C, R>
where
    C: Channel<Message>,
    R: Rng + CryptoRng + Send,
{
    #[instrument(level = "debug", skip_all, fields(count = inputs.len()), err)]
    async fn send(&mut self, inputs: Vec<[Label; 2]>) -> Result<(), OtError> {
        let mut sender = Sender::default();
        let setup = sender.setup(&mut *self.rng)?;
        self.channel
            .send(OtMessage::SenderSetup(setup).into())
            .await?;

        let receiver_setup = expect_msg_or_err!(self.channel, Message::Ot)?;
        let OtMessage::ReceiverSetup(receiver_setup) = receiver_setup else {
            return Err(OtError::transfer(format!(
                "expected receiver setup, got {}",
                Message::Ot(receiver_setup).name()
            )));
        };

        let inputs: Vec<[[u8; LABEL_LEN]; 2]> = inputs
            .iter()
            .map(|[zero, one]| [zero.to_bytes(), one.to_bytes()])
            .collect();
        let payload = sender.send(&inputs, receiver_setup)?;

        self.channel
            .send(OtMessage::SenderPayload(payload).into())
            .await?;

        Ok(())
    }
}

/// Label receiver running the Diffie-Hellman OT over a channel.
pub struct DhOtReceiver<'a, C, R> {
    channel: &'a mut C,
    rng: &'a mut R,
}

impl<'a, C, R> DhOtReceiver<'a, C, R> {
    /// Creates a receiver using the given channel and randomness.
    pub fn new(channel: &'a mut C, rng: &'a mut R) -> Self {
        Self { channel, rng }
    }
}

#[async_trait]
impl<'a, C, R> ObliviousReceive<Label> for DhOtReceiver<'a, C, R>
where
    C: Channel<Message>,
    R: Rng + CryptoRng + Send,
{
    #[instrument(level = "debug", skip_all, fields(count = choices.len()), err)]
    async fn receive(&mut self, choices: Vec<bool>) -> Result<Vec<Label>, OtError> {
        let mut receiver = Receiver::default();

        let setup = expect_msg_or_err!(self.channel, Message::Ot)?;
        let OtMessage::SenderSetup(setup) = setup else {
            return Err(OtError::transfer(format!(
                "expected sender setup, got {}",
                Message::Ot(setup).name()
            )));
        };

        let receiver_setup = receiver.setup(&mut *self.rng, &choices, setup)?;
        self.channel
            .send(OtMessage::ReceiverSetup(receiver_setup).into())
            .await?;

        let payload = expect_msg_or_err!(self.channel, Message::Ot)?;
        let OtMessage::SenderPayload(payload) = payload else {
            return Err(OtError::transfer(format!(
                "expected sender payload, got {}",
                Message::Ot(payload).name()
            )));
        };

        receiver
            .receive::<LABEL_LEN>(payload)?
            .iter()
            .map(|bytes| {
                Label::from_bytes(bytes).ok_or_else(|| OtError::transfer("received invalid label"))
            })
            .collect()
    }
}

/// Sends both labels of every wire in the clear.
///
/// INSECURE: for debugging the garbling without an OT.
pub struct InsecureSender<'a, C> {
    channel: &'a mut C,
}

impl<'a, C> InsecureSender<'a, C> {
    /// Creates a sender using the given channel.
    pub fn new(channel: &'a mut C) -> Self {
        Self { channel }
    }
}

#[async_trait]
impl<'a, C> ObliviousSend<Label> for InsecureSender<'a, C>
where
    C: Channel<Message>,
{
    async fn send(&mut self, inputs: Vec<[Label; 2]>) -> Result<(), OtError> {
        self.channel.send(Message::InsecureLabels(inputs)).await?;

        Ok(())
    }
}

/// Receives both labels of every wire and keeps the chosen ones.
///
/// INSECURE: for debugging the garbling without an OT.
pub struct InsecureReceiver<'a, C> {
    channel: &'a mut C,
}

impl<'a, C> InsecureReceiver<'a, C> {
    /// Creates a receiver using the given channel.
    pub fn new(channel: &'a mut C) -> Self {
        Self { channel }
    }
}

#[async_trait]
impl<'a, C> ObliviousReceive<Label> for InsecureReceiver<'a, C>
where
    C: Channel<Message>,
{
    async fn receive(&mut self, choices: Vec<bool>) -> Result<Vec<Label>, OtError> {
        let labels = expect_msg_or_err!(self.channel, Message::InsecureLabels)?;
        if labels.len() != choices.len() {
            return Err(OtError::transfer(format!(
                "received {} label pairs for {} choices",
                labels.len(),
                choices.len()
            )));
        }

        Ok(labels
            .into_iter()
            .zip(choices)
            .map(|(labels, choice)| labels[choice as usize])
            .collect())
    }
}
