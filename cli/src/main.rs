use std::fs::File;
use std::io::{self, IsTerminal};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::info;
use thiserror::Error;

use bitblast::{deserialize, serialize, BitError, BitVector, SerializationError};
use bitblast_stdlib::{gamma0, gamma1, sigma0, sigma1, SIZE_WORD};

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Bit(#[from] BitError),
    #[error(transparent)]
    Serialization(#[from] SerializationError),
    #[error("no input bit-vector on {0}; pipe a serialized document in")]
    MissingInput(String),
}

/// Dumps SHA-256 building-block gate networks as YAML documents.
///
/// Without piped input the networks are built over a fresh 32-bit variable
/// word; with piped input the deserialized vector is the variable source.
#[derive(Parser)]
#[command(name = "bitblast", version)]
struct Cli {
    /// Serialized bit-vector to use as the variable source ("-" for
    /// standard input).
    #[arg(short, long, default_value = "-")]
    input: String,

    /// Destination for the serialized network ("-" for standard output).
    #[arg(short, long, default_value = "-")]
    output: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serialize the gamma 0 message-schedule network.
    Gamma0,
    /// Serialize the gamma 1 message-schedule network.
    Gamma1,
    /// Serialize the sigma 0 round network.
    Sigma0,
    /// Serialize the sigma 1 round network.
    Sigma1,
    /// Serialize a one-bit slice of the input vector.
    Bit {
        /// Position of the bit to select.
        index: usize,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    if let Err(error) = run(cli) {
        eprintln!("error: {error}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn run(cli: Cli) -> Result<(), CliError> {
    let source = read_source(&cli.input)?;
    let vector = match cli.command {
        Command::Gamma0 => gamma0(&source_or_fresh_word(source))?,
        Command::Gamma1 => gamma1(&source_or_fresh_word(source))?,
        Command::Sigma0 => sigma0(&source_or_fresh_word(source))?,
        Command::Sigma1 => sigma1(&source_or_fresh_word(source))?,
        Command::Bit { index } => {
            let source = source.ok_or_else(|| CliError::MissingInput(cli.input.clone()))?;
            source.slice(index..index + 1)?
        }
    };
    info!("serializing a {}-bit network to {}", vector.len(), cli.output);
    write_vector(&vector, &cli.output)
}

fn source_or_fresh_word(source: Option<BitVector>) -> BitVector {
    source.unwrap_or_else(|| BitVector::variables(SIZE_WORD))
}

fn read_source(input: &str) -> Result<Option<BitVector>, CliError> {
    if input == "-" {
        let stdin = io::stdin();
        // A terminal on stdin means no piped document; the subcommands fall
        // back to a fresh variable word.
        if stdin.is_terminal() {
            return Ok(None);
        }
        return Ok(Some(deserialize(stdin.lock())?));
    }
    Ok(Some(deserialize(File::open(input)?)?))
}

fn write_vector(vector: &BitVector, output: &str) -> Result<(), CliError> {
    if output == "-" {
        serialize(vector, io::stdout().lock())?;
    } else {
        serialize(vector, File::create(output)?)?;
    }
    Ok(())
}
