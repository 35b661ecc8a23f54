use std::{net::SocketAddr, path::PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use yao_protocol::PrintMode;

#[derive(Parser)]
#[command(version, about, name = "yao", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
    /// Log level: error, warn, info, debug or trace.
    #[arg(short, long = "loglevel", default_value = "info", global = true)]
    pub loglevel: String,
}

#[derive(Subcommand)]
pub enum Command {
    /// garbles every circuit of a file and sends it to bob.
    Alice {
        #[command(flatten)]
        party: PartyArgs,
    },
    /// evaluates every circuit alice sends, until she finishes.
    Bob {
        #[command(flatten)]
        party: PartyArgs,
    },
    /// garbles and evaluates every circuit of a file in process.
    Local {
        /// Circuit file. Defaults to the bundled gate circuits.
        #[arg(short, long)]
        circuit: Option<PathBuf>,
        /// What to print for each circuit.
        #[arg(short = 'm', long = "mode", default_value = "circuit")]
        mode: PrintMode,
    },
    /// intersects a set of f32 values with the peer's set.
    Psi {
        /// Which side to play. Bob listens, alice connects.
        role: Role,
        /// Comma separated values, e.g. "1.0,2.0,3.5".
        #[arg(short, long, allow_hyphen_values = true)]
        set: String,
        /// How many times a failed comparison is attempted.
        #[arg(long, default_value = "3")]
        max_attempts: usize,
        #[command(flatten)]
        connection: ConnectionArgs,
    },
    /// writes an n-bit equality circuit file.
    GenEq {
        /// Width of each party's input.
        bits: usize,
        /// Output path. Prints to stdout if omitted.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args)]
pub struct PartyArgs {
    /// Circuit file alice garbles. Defaults to the bundled gate circuits.
    #[arg(short, long)]
    pub circuit: Option<PathBuf>,
    /// Input bits, e.g. "0110", used for every circuit. Defaults to all ones.
    #[arg(short, long)]
    pub input: Option<String>,
    #[command(flatten)]
    pub connection: ConnectionArgs,
}

#[derive(Args)]
pub struct ConnectionArgs {
    /// Address bob listens on and alice connects to.
    #[arg(long, default_value = "127.0.0.1:5555")]
    pub address: SocketAddr,
    /// INSECURE: send both labels of bob's wires instead of running oblivious
    /// transfer. Both parties must agree.
    #[arg(long)]
    pub no_oblivious_transfer: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Role {
    Alice,
    Bob,
}
