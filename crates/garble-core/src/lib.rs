//! Core components of Yao's garbled circuit protocol.
//!
//! Gates are garbled with point-and-permute: every wire carries a random
//! permute bit, and the evaluator selects a table row by the external
//! (permuted) values of a gate's input labels. Each row holds the output
//! label sealed twice with AES-128-GCM, first under the right input key and
//! then under the left one, so a wrong key is always detected rather than
//! producing a garbage label.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use garble_core::{evaluate, garble};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha12Rng;
//! use yao_circuits::equality_circuit;
//!
//! let circ = Arc::new(equality_circuit(4).unwrap());
//! let garbled = garble(circ.clone(), &mut ChaCha12Rng::seed_from_u64(0)).unwrap();
//!
//! let mut inputs = garbled.encode(circ.alice(), &[true, false, true, true]).unwrap();
//! inputs.extend(garbled.encode(circ.bob(), &[true, false, true, true]).unwrap());
//!
//! let outputs = evaluate(&circ, garbled.tables(), &garbled.pbits_out(), &inputs).unwrap();
//!
//! assert!(outputs[&circ.outputs()[0]]);
//! ```

#![deny(missing_docs, unreachable_pub, unused_must_use)]
#![deny(clippy::all)]

mod block;
mod cipher;
mod circuit;
mod error;
mod evaluator;
mod generator;
mod label;

pub use block::{Block, BLOCK_LEN};
pub use circuit::{GarbledCircuit, GarbledTable};
pub use error::CryptoError;
pub use evaluator::{decode, evaluate, evaluate_labels};
pub use generator::garble;
pub use label::{Label, WireKeys, LABEL_LEN};

#[cfg(test)]
mod tests {
    use std::{collections::BTreeMap, sync::Arc};

    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha12Rng;
    use rstest::*;
    use yao_circuits::{equality_circuit, Circuit, WireId, DEFAULT_CIRCUITS};

    use super::*;

    fn circuit(id: &str) -> Arc<Circuit> {
        Arc::new(
            DEFAULT_CIRCUITS
                .iter()
                .find(|circ| circ.id() == id)
                .unwrap()
                .clone(),
        )
    }

    fn garbled_eval(
        garbled: &GarbledCircuit,
        alice: &[bool],
        bob: &[bool],
    ) -> Result<BTreeMap<WireId, bool>, CryptoError> {
        let circ = garbled.circuit();
        let mut inputs = garbled.encode(circ.alice(), alice).unwrap();
        inputs.extend(garbled.encode(circ.bob(), bob).unwrap());

        evaluate(circ, garbled.tables(), &garbled.pbits_out(), &inputs)
    }

    #[rstest]
    #[case::and("AND")]
    #[case::or("OR")]
    #[case::xor("XOR")]
    #[case::xnor("XNOR")]
    fn test_binary_gate(#[case] id: &str) {
        let circ = circuit(id);

        for seed in 0..128 {
            let mut rng = ChaCha12Rng::seed_from_u64(seed);
            let garbled = garble(circ.clone(), &mut rng).unwrap();

            for (a, b) in [(false, false), (false, true), (true, false), (true, true)] {
                let expected = circ.evaluate(&[a], &[b]).unwrap();

                assert_eq!(garbled_eval(&garbled, &[a], &[b]).unwrap(), expected);
            }
        }
    }

    #[test]
    fn test_not_gate() {
        let circ = circuit("NOT");

        for seed in 0..128 {
            let garbled = garble(circ.clone(), &mut ChaCha12Rng::seed_from_u64(seed)).unwrap();

            for a in [false, true] {
                assert_eq!(garbled_eval(&garbled, &[a], &[]).unwrap()[&2], !a);
            }
        }
    }

    #[test]
    fn test_equality_circuit_random() {
        let circ = Arc::new(equality_circuit(32).unwrap());
        let mut rng = ChaCha12Rng::seed_from_u64(0);

        for _ in 0..16 {
            let garbled = garble(circ.clone(), &mut rng).unwrap();
            let alice: Vec<bool> = (0..32).map(|_| rng.random()).collect();
            let mut bob = alice.clone();
            let equal = rng.random_bool(0.5);
            if !equal {
                let i = rng.random_range(0..32);
                bob[i] = !bob[i];
            }

            let outputs = garbled_eval(&garbled, &alice, &bob).unwrap();

            assert_eq!(outputs[&circ.outputs()[0]], equal);
        }
    }

    #[rstest]
    #[case::row_0(0)]
    #[case::row_1(1)]
    #[case::row_2(2)]
    #[case::row_3(3)]
    fn test_tampered_row_is_detected(#[case] row: usize) {
        let circ = circuit("AND");
        let garbled = garble(circ.clone(), &mut ChaCha12Rng::seed_from_u64(0)).unwrap();

        let mut tables = garbled.tables().to_vec();
        tables[0].rows_mut()[row][0] ^= 0x80;

        let mut inputs = garbled.encode(circ.alice(), &[true]).unwrap();
        inputs.extend(garbled.encode(circ.bob(), &[true]).unwrap());

        let err = evaluate(&circ, &tables, &garbled.pbits_out(), &inputs).unwrap_err();
        assert!(matches!(err, CryptoError::DecryptionFailed { gate: 3 }));

        // The garbler's copy is untouched.
        assert!(garbled_eval(&garbled, &[true], &[true]).is_ok());
    }

    #[test]
    fn test_wrong_label_fails_decryption() {
        let circ = circuit("AND");
        let garbled = garble(circ.clone(), &mut ChaCha12Rng::seed_from_u64(0)).unwrap();

        let mut inputs = garbled.encode(circ.alice(), &[true]).unwrap();
        inputs.extend(garbled.encode(circ.bob(), &[false]).unwrap());
        let label = inputs[&1];
        inputs.insert(1, Label::new(label.key() ^ Block::new(1), label.external()));

        let err = evaluate(&circ, garbled.tables(), &garbled.pbits_out(), &inputs).unwrap_err();

        assert!(matches!(err, CryptoError::DecryptionFailed { gate: 3 }));
    }

    #[test]
    fn test_missing_input() {
        let circ = circuit("AND");
        let garbled = garble(circ.clone(), &mut ChaCha12Rng::seed_from_u64(0)).unwrap();
        let inputs = garbled.encode(circ.alice(), &[true]).unwrap();

        let err = evaluate(&circ, garbled.tables(), &garbled.pbits_out(), &inputs).unwrap_err();

        assert!(matches!(err, CryptoError::MissingInput(2)));
    }

    #[test]
    fn test_missing_output_pbit() {
        let circ = circuit("XOR");
        let garbled = garble(circ.clone(), &mut ChaCha12Rng::seed_from_u64(0)).unwrap();
        let mut inputs = garbled.encode(circ.alice(), &[true]).unwrap();
        inputs.extend(garbled.encode(circ.bob(), &[true]).unwrap());

        let err = evaluate(&circ, garbled.tables(), &BTreeMap::new(), &inputs).unwrap_err();

        assert!(matches!(err, CryptoError::MissingOutputPbit(3)));
    }

    #[test]
    fn test_table_for_wrong_gate() {
        let circ = circuit("AND");
        let other = circuit("NOT");
        let garbled = garble(other, &mut ChaCha12Rng::seed_from_u64(0)).unwrap();
        let garbled_and = garble(circ.clone(), &mut ChaCha12Rng::seed_from_u64(0)).unwrap();

        let mut inputs = garbled_and.encode(circ.alice(), &[true]).unwrap();
        inputs.extend(garbled_and.encode(circ.bob(), &[true]).unwrap());

        let err = evaluate(&circ, garbled.tables(), &garbled_and.pbits_out(), &inputs).unwrap_err();

        assert!(matches!(err, CryptoError::MalformedTable { .. }));
    }

    #[test]
    fn test_external_bits_are_masked() {
        let circ = circuit("AND");
        let mut seen = [false; 2];

        for seed in 0..32 {
            let garbled = garble(circ.clone(), &mut ChaCha12Rng::seed_from_u64(seed)).unwrap();
            let label = garbled.label(1, true).unwrap();
            seen[label.external() as usize] = true;
        }

        assert_eq!(seen, [true, true]);
    }
}
