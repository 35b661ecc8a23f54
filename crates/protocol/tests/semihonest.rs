use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use garble_core::{garble, CryptoError};
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use rstest::*;
use yao_circuits::{equality_circuit, Circuit, DEFAULT_CIRCUITS};
use yao_protocol::{
    msg::{self, Message},
    DuplexChannel, Evaluator, Garbler, OtMode, Party, ProtocolConfig, ProtocolError,
};

type Chan = DuplexChannel<Message>;

fn parties(
    mode: OtMode,
) -> (
    Garbler<Chan, ChaCha12Rng>,
    Evaluator<Chan, ChaCha12Rng>,
) {
    let config = ProtocolConfig::builder().ot_mode(mode).build().unwrap();
    let (a, b) = DuplexChannel::new();

    (
        Garbler::new(config.clone(), a, ChaCha12Rng::seed_from_u64(0)),
        Evaluator::new(config, b, ChaCha12Rng::seed_from_u64(1)),
    )
}

fn bits(value: u32, len: usize) -> Vec<bool> {
    (0..len).rev().map(|i| (value >> i) & 1 == 1).collect()
}

#[rstest]
#[case::ot(OtMode::Enabled)]
#[case::insecure(OtMode::InsecureNoOt)]
#[tokio::test]
async fn test_default_circuits(#[case] mode: OtMode) {
    let (mut garbler, mut evaluator) = parties(mode);

    for circ in DEFAULT_CIRCUITS.iter() {
        let circ = Arc::new(circ.clone());
        for a in 0..(1u32 << circ.alice().len()) {
            for b in 0..(1u32 << circ.bob().len()) {
                let alice = bits(a, circ.alice().len());
                let bob = bits(b, circ.bob().len());
                let expected = circ.evaluate(&alice, &bob).unwrap();

                let (g, e) = futures::join!(
                    garbler.run(circ.clone(), &alice),
                    evaluator.run(&circ, &bob)
                );
                let (g, e) = (g.unwrap(), e.unwrap());

                assert_eq!(g.outputs(), &expected, "{} {a} {b}", circ.id());
                assert_eq!(e.outputs(), &expected, "{} {a} {b}", circ.id());
                assert_eq!(g.inputs(), alice.as_slice());
                assert_eq!(e.inputs(), bob.as_slice());
            }
        }
    }
}

#[rstest]
#[case::equal(0xdead_beef, 0xdead_beef, true)]
#[case::last_bit(0xdead_beef, 0xdead_beee, false)]
#[case::first_bit(0x8000_0000, 0, false)]
#[tokio::test]
async fn test_equality_32(#[case] a: u32, #[case] b: u32, #[case] expected: bool) {
    let (mut garbler, mut evaluator) = parties(OtMode::Enabled);
    let circ = Arc::new(equality_circuit(32).unwrap());

    let (xa, xb) = (bits(a, 32), bits(b, 32));

    let (g, e) = futures::join!(
        garbler.run(circ.clone(), &xa),
        evaluator.run(&circ, &xb)
    );

    assert_eq!(g.unwrap().output_bits(), vec![expected]);
    assert_eq!(e.unwrap().output_bits(), vec![expected]);
}

#[tokio::test]
async fn test_execute_until_finish() {
    let (garbler, evaluator) = parties(OtMode::Enabled);
    let mut garbler = Party::Garbler(garbler);
    let mut evaluator = evaluator;
    let circ = Arc::new(DEFAULT_CIRCUITS[0].clone());

    let garbler_side = async {
        for input in [[false], [true]] {
            garbler.run(circ.clone(), &input).await.unwrap();
        }
        garbler.finish().await.unwrap();
    };

    let evaluator_side = async {
        let mut outcomes = Vec::new();
        while let Some(outcome) = evaluator.execute(&[true]).await.unwrap() {
            outcomes.push(outcome.output_bits());
        }
        outcomes
    };

    let ((), outcomes) = futures::join!(garbler_side, evaluator_side);

    assert_eq!(outcomes, vec![vec![false], vec![true]]);
}

#[tokio::test]
async fn test_execute_for_circuits_chosen_by_garbler() {
    let (mut garbler, mut evaluator) = parties(OtMode::Enabled);
    let circuits = [
        Arc::new(equality_circuit(4).unwrap()),
        Arc::new(DEFAULT_CIRCUITS[2].clone()),
    ];

    let garbler_side = async {
        for circ in &circuits {
            let input = vec![true; circ.alice().len()];
            garbler.run(circ.clone(), &input).await.unwrap();
        }
        garbler.finish().await.unwrap();
    };

    let evaluator_side = async {
        let mut seen = Vec::new();
        loop {
            let mut width = None;
            let outcome = evaluator
                .execute_for(|circ| {
                    width = Some(circ.bob().len());
                    vec![true; circ.bob().len()]
                })
                .await
                .unwrap();
            let Some(outcome) = outcome else {
                assert_eq!(width, None);
                break;
            };
            seen.push((outcome.circuit().to_string(), width, outcome.output_bits()));
        }
        seen
    };

    let ((), seen) = futures::join!(garbler_side, evaluator_side);

    let expected: Vec<_> = circuits
        .iter()
        .map(|circ| {
            let all_ones = |n: usize| vec![true; n];
            let outputs = circ
                .evaluate(&all_ones(circ.alice().len()), &all_ones(circ.bob().len()))
                .unwrap();
            (
                circ.id().to_string(),
                Some(circ.bob().len()),
                outputs.into_values().collect::<Vec<_>>(),
            )
        })
        .collect();
    assert_eq!(seen, expected);
}

#[tokio::test]
async fn test_circuit_mismatch_aborts() {
    let (mut garbler, mut evaluator) = parties(OtMode::Enabled);
    let sent = Arc::new(DEFAULT_CIRCUITS[0].clone());
    let expected: Circuit = DEFAULT_CIRCUITS[1].clone();

    let (g, e) = futures::join!(
        garbler.run(sent, &[true]),
        evaluator.run(&expected, &[true])
    );

    assert!(matches!(
        e.unwrap_err(),
        ProtocolError::CircuitMismatch { .. }
    ));
    let err = g.unwrap_err();
    assert!(matches!(err, ProtocolError::PeerAborted { retryable: false, .. }));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_evaluator_input_length_aborts() {
    let (mut garbler, mut evaluator) = parties(OtMode::Enabled);
    let circ = Arc::new(DEFAULT_CIRCUITS[0].clone());

    let (g, e) = futures::join!(
        garbler.run(circ.clone(), &[true]),
        evaluator.run(&circ, &[true, false])
    );

    assert!(matches!(
        e.unwrap_err(),
        ProtocolError::InputLength {
            expected: 1,
            actual: 2
        }
    ));
    assert!(matches!(g.unwrap_err(), ProtocolError::PeerAborted { .. }));
}

#[tokio::test]
async fn test_garbler_input_length() {
    let (mut garbler, _evaluator) = parties(OtMode::Enabled);
    let circ = Arc::new(DEFAULT_CIRCUITS[0].clone());

    let err = garbler.run(circ, &[]).await.unwrap_err();

    assert!(matches!(
        err,
        ProtocolError::InputLength {
            expected: 1,
            actual: 0
        }
    ));
}

#[tokio::test]
async fn test_tampered_table_aborts_for_good() {
    let config = ProtocolConfig::builder()
        .ot_mode(OtMode::InsecureNoOt)
        .build()
        .unwrap();
    let (mut alice, bob) = DuplexChannel::<Message>::new();
    let mut evaluator = Evaluator::new(config, bob, ChaCha12Rng::seed_from_u64(1));

    let circ = Arc::new(DEFAULT_CIRCUITS[0].clone());
    let garbled = garble(circ.clone(), &mut ChaCha12Rng::seed_from_u64(0)).unwrap();

    let garbler_side = async {
        let mut tables = garbled.tables().to_vec();
        tables[0].rows_mut()[0][0] ^= 1;
        alice
            .send(Message::GarbledCircuit(msg::GarbledCircuit {
                circuit: circ.as_ref().clone(),
                tables,
                pbits_out: garbled.pbits_out(),
            }))
            .await
            .unwrap();

        assert!(matches!(alice.next().await, Some(Ok(Message::Ack))));

        alice
            .send(Message::GarblerInputs(
                garbled.encode(circ.alice(), &[true]).unwrap(),
            ))
            .await
            .unwrap();
        let pair = garbled.wire_keys(circ.bob()[0]).unwrap().labels();
        alice
            .send(Message::InsecureLabels(vec![pair]))
            .await
            .unwrap();

        alice.next().await.unwrap().unwrap()
    };

    let (reply, result) = futures::join!(garbler_side, evaluator.run(&circ, &[true]));

    let err = result.unwrap_err();
    assert!(matches!(
        err,
        ProtocolError::Crypto(CryptoError::DecryptionFailed { gate: 3 })
    ));
    assert!(!err.is_retryable());
    assert!(matches!(reply, Message::Abort(msg::Abort { retryable: false, .. })));
}

#[tokio::test]
async fn test_ot_mode_mismatch_fails() {
    let (a, b) = DuplexChannel::new();
    let mut garbler = Garbler::new(
        ProtocolConfig::builder()
            .ot_mode(OtMode::InsecureNoOt)
            .build()
            .unwrap(),
        a,
        ChaCha12Rng::seed_from_u64(0),
    );
    let mut evaluator = Evaluator::new(
        ProtocolConfig::default(),
        b,
        ChaCha12Rng::seed_from_u64(1),
    );
    let circ = Arc::new(DEFAULT_CIRCUITS[0].clone());

    let (g, e) = futures::join!(
        garbler.run(circ.clone(), &[true]),
        evaluator.run(&circ, &[true])
    );

    let err = e.unwrap_err();
    assert!(matches!(err, ProtocolError::Ot(_)));
    assert!(err.is_retryable());
    assert!(matches!(
        g.unwrap_err(),
        ProtocolError::PeerAborted { retryable: true, .. }
    ));
}

#[tokio::test]
async fn test_garbler_abort_during_transfer_is_not_echoed() {
    let (a, mut bob) = DuplexChannel::<Message>::new();
    let mut garbler = Garbler::new(ProtocolConfig::default(), a, ChaCha12Rng::seed_from_u64(0));
    let circ = Arc::new(DEFAULT_CIRCUITS[0].clone());

    let evaluator_side = async {
        assert!(matches!(
            bob.next().await,
            Some(Ok(Message::GarbledCircuit(_)))
        ));
        bob.send(Message::Ack).await.unwrap();
        assert!(matches!(
            bob.next().await,
            Some(Ok(Message::GarblerInputs(_)))
        ));
        assert!(matches!(bob.next().await, Some(Ok(Message::Ot(_)))));
        bob.send(Message::Abort(msg::Abort {
            reason: "oblivious transfer failed".to_string(),
            retryable: true,
        }))
        .await
        .unwrap();
    };

    let (result, ()) = futures::join!(garbler.run(circ, &[true]), evaluator_side);

    let err = result.unwrap_err();
    assert!(matches!(err, ProtocolError::PeerAborted { retryable: true, .. }));

    // Nothing is sent back once the garbler learns of the abort.
    garbler.finish().await.unwrap();
    assert!(matches!(bob.next().await, Some(Ok(Message::Finish))));
}

#[tokio::test]
async fn test_over_tcp() {
    use tokio::net::{TcpListener, TcpStream};
    use yao_protocol::BincodeChannel;

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let circ = Arc::new(equality_circuit(8).unwrap());

    let evaluator_circ = circ.clone();
    let evaluator = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut evaluator = Evaluator::new(
            ProtocolConfig::default(),
            BincodeChannel::new(stream),
            ChaCha12Rng::seed_from_u64(1),
        );
        evaluator.run(&evaluator_circ, &bits(0x5a, 8)).await.unwrap()
    });

    let stream = TcpStream::connect(addr).await.unwrap();
    let mut garbler = Garbler::new(
        ProtocolConfig::default(),
        BincodeChannel::new(stream),
        ChaCha12Rng::seed_from_u64(0),
    );
    let outcome = garbler.run(circ, &bits(0x5a, 8)).await.unwrap();

    assert_eq!(outcome.output_bits(), vec![true]);
    assert_eq!(evaluator.await.unwrap().output_bits(), vec![true]);
}
