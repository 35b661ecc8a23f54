//! Two-party execution of garbled circuits, and private set intersection of
//! `f32` sets built on it.
//!
//! The [`Garbler`] (Alice) garbles a circuit and sends the tables along with
//! the labels of her own inputs. The [`Evaluator`] (Bob) obtains the labels of
//! his inputs by oblivious transfer, evaluates, and reports the outputs back.
//! Both parties run over any [`Channel`] of [`Message`](msg::Message)s, such
//! as a [`DuplexChannel`] in process or a [`BincodeChannel`] over TCP.
//!
//! The [`psi`] module repeats the 32-bit equality circuit to intersect two
//! sets, one comparison per execution.

#![deny(missing_docs, unreachable_pub, unused_must_use)]
#![deny(clippy::all)]

mod channel;
mod codec;
mod config;
pub mod encoding;
mod error;
mod evaluator;
mod garbler;
mod local;
pub mod msg;
pub mod ot;
mod party;
pub mod psi;

pub use channel::{Channel, DuplexChannel};
pub use codec::{BincodeChannel, MAX_FRAME_LEN};
pub use config::{
    OtMode, ProtocolConfig, ProtocolConfigBuilder, ProtocolConfigBuilderError, PsiConfig,
    PsiConfigBuilder, PsiConfigBuilderError,
};
pub use error::{OtError, ProtocolError};
pub use evaluator::Evaluator;
pub use garbler::Garbler;
pub use local::{LocalSimulator, PrintMode, MAX_TRUTH_TABLE_INPUTS};
pub use party::{Outcome, Party};
pub use psi::{PsiError, PsiEvaluator, PsiGarbler};
