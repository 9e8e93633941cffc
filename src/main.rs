use clap::Parser;
use goldencross::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
