mod cli;
mod logging;

use std::{path::Path, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use rand::{rngs::StdRng, SeedableRng};
use tokio::net::{TcpListener, TcpStream};
use tracing::{info, warn};
use yao_circuits::{equality::equality_file, spec::CircuitFile, Circuit, WireId, DEFAULT_CIRCUITS};
use yao_protocol::{
    encoding::{bits_to_string, parse_bits, parse_set},
    msg::Message,
    BincodeChannel, Evaluator, Garbler, LocalSimulator, OtMode, Outcome, Party, PrintMode,
    ProtocolConfig, PsiConfig, PsiEvaluator, PsiGarbler,
};

use crate::cli::{Cli, Command, ConnectionArgs, PartyArgs, Role};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(&cli.loglevel)?;

    match cli.command {
        Command::Alice { party } => run_party(Role::Alice, party).await,
        Command::Bob { party } => run_party(Role::Bob, party).await,
        Command::Local { circuit, mode } => run_local(circuit.as_deref(), mode),
        Command::Psi {
            role,
            set,
            max_attempts,
            connection,
        } => run_psi(role, &set, max_attempts, connection).await,
        Command::GenEq { bits, output } => {
            let json = equality_file(bits)?.to_json()?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    info!("wrote {bits}-bit equality circuit to {}", path.display());
                }
                None => println!("{json}"),
            }
            Ok(())
        }
    }
}

async fn run_party(role: Role, args: PartyArgs) -> Result<()> {
    let input = args.input.as_deref().map(parse_bits).transpose()?;
    let config = protocol_config(&args.connection)?;
    let rng = StdRng::from_os_rng();

    match role {
        Role::Alice => {
            let circuits = load_circuits(args.circuit.as_deref())?;
            let mut party = Party::Garbler(Garbler::new(config, connect(&args.connection).await?, rng));

            for circ in circuits {
                let input = input
                    .clone()
                    .unwrap_or_else(|| vec![true; circ.alice().len()]);

                let outcome = party.run(circ.clone(), &input).await?;
                println!("{}", format_outcome(role, circ.alice(), &circ, &outcome));
            }

            party.finish().await?;
        }
        Role::Bob => {
            if args.circuit.is_some() {
                warn!("bob evaluates the circuits alice sends, ignoring --circuit");
            }
            let mut evaluator = Evaluator::new(config, accept(&args.connection).await?, rng);

            loop {
                let mut received = None;
                let outcome = evaluator
                    .execute_for(|circ| {
                        received = Some(circ.clone());
                        input.clone().unwrap_or_else(|| vec![true; circ.bob().len()])
                    })
                    .await?;

                let (Some(outcome), Some(circ)) = (outcome, received) else {
                    break;
                };
                println!("{}", format_outcome(role, circ.bob(), &circ, &outcome));
            }
        }
    }

    Ok(())
}

fn run_local(path: Option<&Path>, mode: PrintMode) -> Result<()> {
    let mut simulator = LocalSimulator::new(StdRng::from_os_rng());

    for circ in load_circuits(path)? {
        println!("{}", simulator.print(circ, mode)?);
    }

    Ok(())
}

async fn run_psi(role: Role, set: &str, max_attempts: usize, args: ConnectionArgs) -> Result<()> {
    let set = parse_set(set)?;
    let config = PsiConfig::builder()
        .max_attempts(max_attempts)
        .protocol(protocol_config(&args)?)
        .build()?;
    let rng = StdRng::from_os_rng();

    let common = match role {
        Role::Alice => {
            PsiGarbler::new(config, connect(&args).await?, rng)?
                .intersect(&set)
                .await?
        }
        Role::Bob => {
            PsiEvaluator::new(config, accept(&args).await?, rng)?
                .intersect(&set)
                .await?
        }
    };

    println!("{common:?}");

    Ok(())
}

fn load_circuits(path: Option<&Path>) -> Result<Vec<Arc<Circuit>>> {
    let circuits = match path {
        Some(path) => CircuitFile::load(path)?.validate()?,
        None => DEFAULT_CIRCUITS.to_vec(),
    };

    Ok(circuits.into_iter().map(Arc::new).collect())
}

fn protocol_config(args: &ConnectionArgs) -> Result<ProtocolConfig> {
    let ot_mode = if args.no_oblivious_transfer {
        warn!("oblivious transfer is disabled, bob's inputs are not protected");
        OtMode::InsecureNoOt
    } else {
        OtMode::Enabled
    };

    Ok(ProtocolConfig::builder().ot_mode(ot_mode).build()?)
}

async fn connect(args: &ConnectionArgs) -> Result<BincodeChannel<TcpStream, Message>> {
    let stream = TcpStream::connect(args.address)
        .await
        .with_context(|| format!("failed to connect to {}", args.address))?;
    info!("connected to {}", args.address);

    Ok(BincodeChannel::new(stream))
}

async fn accept(args: &ConnectionArgs) -> Result<BincodeChannel<TcpStream, Message>> {
    let listener = TcpListener::bind(args.address)
        .await
        .with_context(|| format!("failed to listen on {}", args.address))?;
    info!("listening on {}", args.address);

    let (stream, peer) = listener.accept().await?;
    info!("accepted connection from {peer}");

    Ok(BincodeChannel::new(stream))
}

fn format_outcome(role: Role, wires: &[WireId], circ: &Circuit, outcome: &Outcome) -> String {
    let name = match role {
        Role::Alice => "Alice",
        Role::Bob => "Bob",
    };
    let outputs: Vec<bool> = circ
        .outputs()
        .iter()
        .map(|wire| outcome.outputs().get(wire).copied().unwrap_or_default())
        .collect();

    format!(
        "{} {name}{wires:?} = {}, Outputs{:?} = {}",
        circ.id(),
        bits_to_string(outcome.inputs()),
        circ.outputs(),
        bits_to_string(&outputs),
    )
}
