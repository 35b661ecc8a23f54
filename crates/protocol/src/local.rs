//! Garbling and evaluation within a single process.

use std::{fmt::Write, str::FromStr, sync::Arc};

use garble_core::{garble, GarbledCircuit};
use rand::{CryptoRng, Rng};
use serde::{Deserialize, Serialize};
use tracing::debug;
use yao_circuits::Circuit;

use crate::{encoding::bits_to_string, Outcome, ProtocolError};

/// Largest number of input bits [`PrintMode::Circuit`] enumerates.
pub const MAX_TRUTH_TABLE_INPUTS: usize = 20;

/// What the local simulator prints for a circuit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrintMode {
    /// The garbled evaluation of every input combination.
    #[default]
    Circuit,
    /// The garbled tables, with the keys of every wire in the clear.
    Table,
}

impl FromStr for PrintMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "circuit" => Ok(PrintMode::Circuit),
            "table" => Ok(PrintMode::Table),
            s => Err(format!("unknown print mode {s:?}, expected circuit or table")),
        }
    }
}

/// Plays both parties of an execution.
///
/// The evaluator gets its labels directly from the garbled circuit, so no
/// oblivious transfer takes place.
#[derive(Debug)]
pub struct LocalSimulator<R> {
    rng: R,
}

impl<R> LocalSimulator<R>
where
    R: Rng + CryptoRng,
{
    /// Creates a new simulator.
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Garbles and evaluates `circ`.
    ///
    /// `input` holds the garbler's bits followed by the evaluator's.
    pub fn run(&mut self, circ: Arc<Circuit>, input: &[bool]) -> Result<Outcome, ProtocolError> {
        let garbled = garble(circ.clone(), &mut self.rng)?;

        eval(&garbled, input)
    }

    /// Renders `circ` according to `mode`.
    pub fn print(&mut self, circ: Arc<Circuit>, mode: PrintMode) -> Result<String, ProtocolError> {
        match mode {
            PrintMode::Circuit => self.truth_table(circ),
            PrintMode::Table => self.tables(circ),
        }
    }

    /// Evaluates one garbling of `circ` on every combination of inputs.
    pub fn truth_table(&mut self, circ: Arc<Circuit>) -> Result<String, ProtocolError> {
        let n = circ.input_len();
        if n > MAX_TRUTH_TABLE_INPUTS {
            return Err(ProtocolError::TooManyInputs {
                max: MAX_TRUTH_TABLE_INPUTS,
                actual: n,
            });
        }

        let garbled = garble(circ.clone(), &mut self.rng)?;
        let split = circ.alice().len();

        let mut out = format!("======== {} ========\n", circ.id());
        for combination in 0u32..(1 << n) {
            let input: Vec<bool> = (0..n)
                .rev()
                .map(|i| (combination >> i) & 1 == 1)
                .collect();
            let outcome = eval(&garbled, &input)?;

            let _ = writeln!(
                out,
                "  Alice{:?} = {} Bob{:?} = {}  Outputs{:?} = {}",
                circ.alice(),
                spaced(&input[..split]),
                circ.bob(),
                spaced(&input[split..]),
                circ.outputs(),
                spaced(&outcome.output_bits()),
            );
        }

        Ok(out)
    }

    /// Garbles `circ` and renders its tables and wire keys.
    pub fn tables(&mut self, circ: Arc<Circuit>) -> Result<String, ProtocolError> {
        let garbled = garble(circ.clone(), &mut self.rng)?;

        let mut out = format!("======== {} ========\n", circ.id());
        for (wire, keys) in garbled.keys() {
            let _ = writeln!(
                out,
                "  wire {wire}: k0 {} k1 {} p {}",
                hex::encode(keys.key(false).to_bytes()),
                hex::encode(keys.key(true).to_bytes()),
                u8::from(keys.pbit()),
            );
        }

        for (gate, table) in circ.gates().iter().zip(garbled.tables()) {
            let _ = writeln!(
                out,
                "  gate {} {} {:?}",
                gate.id(),
                gate.kind(),
                gate.inputs()
            );
            for (row, ciphertext) in table.rows().iter().enumerate() {
                let _ = writeln!(out, "    [{row}] {}", hex::encode(ciphertext));
            }
        }

        Ok(out)
    }
}

fn eval(garbled: &GarbledCircuit, input: &[bool]) -> Result<Outcome, ProtocolError> {
    let circ = garbled.circuit();
    if input.len() != circ.input_len() {
        return Err(ProtocolError::InputLength {
            expected: circ.input_len(),
            actual: input.len(),
        });
    }

    let (alice, bob) = input.split_at(circ.alice().len());
    let mut labels = garbled.encode(circ.alice(), alice)?;
    labels.extend(garbled.encode(circ.bob(), bob)?);

    let outputs = garble_core::evaluate(circ, garbled.tables(), &garbled.pbits_out(), &labels)?;

    debug!(circuit = %circ.id(), input = %bits_to_string(input), "evaluated locally");

    Ok(Outcome::new(circ.id(), input.to_vec(), outputs))
}

fn spaced(bits: &[bool]) -> String {
    bits.iter()
        .map(|bit| if *bit { "1" } else { "0" })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;
    use rstest::*;
    use yao_circuits::{equality_circuit, DEFAULT_CIRCUITS};

    use super::*;

    #[fixture]
    fn simulator() -> LocalSimulator<ChaCha12Rng> {
        LocalSimulator::new(ChaCha12Rng::seed_from_u64(0))
    }

    #[rstest]
    fn test_default_circuits(mut simulator: LocalSimulator<ChaCha12Rng>) {
        for circ in DEFAULT_CIRCUITS.iter() {
            let circ = Arc::new(circ.clone());
            let n = circ.input_len();
            for combination in 0u32..(1 << n) {
                let input: Vec<bool> = (0..n).rev().map(|i| (combination >> i) & 1 == 1).collect();
                let (alice, bob) = input.split_at(circ.alice().len());

                let outcome = simulator.run(circ.clone(), &input).unwrap();

                assert_eq!(outcome.outputs(), &circ.evaluate(alice, bob).unwrap());
            }
        }
    }

    #[rstest]
    fn test_truth_table(mut simulator: LocalSimulator<ChaCha12Rng>) {
        let and = Arc::new(DEFAULT_CIRCUITS[0].clone());

        let table = simulator.truth_table(and).unwrap();

        assert_eq!(
            table,
            "======== AND ========\n\
             \x20 Alice[1] = 0 Bob[2] = 0  Outputs[3] = 0\n\
             \x20 Alice[1] = 0 Bob[2] = 1  Outputs[3] = 0\n\
             \x20 Alice[1] = 1 Bob[2] = 0  Outputs[3] = 0\n\
             \x20 Alice[1] = 1 Bob[2] = 1  Outputs[3] = 1\n"
        );
    }

    #[rstest]
    fn test_truth_table_too_large(mut simulator: LocalSimulator<ChaCha12Rng>) {
        let circ = Arc::new(equality_circuit(32).unwrap());

        let err = simulator.truth_table(circ).unwrap_err();

        assert!(matches!(
            err,
            ProtocolError::TooManyInputs { max: 20, actual: 64 }
        ));
    }

    #[rstest]
    fn test_table_view(mut simulator: LocalSimulator<ChaCha12Rng>) {
        let not = DEFAULT_CIRCUITS
            .iter()
            .find(|circ| circ.id() == "NOT")
            .cloned()
            .unwrap();

        let view = simulator.print(Arc::new(not), PrintMode::Table).unwrap();

        assert!(view.starts_with("======== NOT ========\n"));
        assert!(view.contains("  wire 1: k0 "));
        assert!(view.contains("  gate 2 NOT [1]\n"));
        assert!(view.contains("    [1] "));
        assert!(!view.contains("    [2] "));
    }

    #[rstest]
    fn test_input_length(mut simulator: LocalSimulator<ChaCha12Rng>) {
        let and = Arc::new(DEFAULT_CIRCUITS[0].clone());

        let err = simulator.run(and, &[true]).unwrap_err();

        assert!(matches!(
            err,
            ProtocolError::InputLength {
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn test_parse_print_mode() {
        assert_eq!("table".parse::<PrintMode>().unwrap(), PrintMode::Table);
        assert!("tables".parse::<PrintMode>().is_err());
    }
}
