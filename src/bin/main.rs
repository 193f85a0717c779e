#[macro_use]
extern crate log;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "idat-cli", about = "Read, inspect and mix Illumina IDAT files")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Read an IDAT file and write it back out, round-tripping the model.
    Copy { input: PathBuf, output: PathBuf },
    /// Read an IDAT file and print a summary of its model.
    Inspect { input: PathBuf },
    /// Mix a reference sample with an admixture sample at a given fraction.
    Mix {
        reference: PathBuf,
        admixture: PathBuf,
        fraction: f64,
        output: PathBuf,
    },
}

fn main() -> ExitCode {
    simple_logger::SimpleLogger::new().init().ok();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Copy { input, output } => run_copy(&input, &output),
        Command::Inspect { input } => run_inspect(&input),
        Command::Mix {
            reference,
            admixture,
            fraction,
            output,
        } => run_mix(&reference, &admixture, fraction, &output),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}

fn run_copy(input: &PathBuf, output: &PathBuf) -> idat::Result<()> {
    let model = idat::read_file(input)?;
    idat::write_file(output, &model)
}

fn run_inspect(input: &PathBuf) -> idat::Result<()> {
    let model = idat::read_file(input)?;
    println!("{}", model);
    Ok(())
}

fn run_mix(
    reference: &PathBuf,
    admixture: &PathBuf,
    fraction: f64,
    output: &PathBuf,
) -> idat::Result<()> {
    let reference = idat::read_file(reference)?;
    let admixture = idat::read_file(admixture)?;
    let mixed = idat::mix(&reference, &admixture, fraction)?;
    idat::write_file(output, &mixed)
}
