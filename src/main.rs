use clap::Parser;
use rsdaily::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
