//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use aquaroute_cli::CliError;

fn main() {
    env_logger::init();
    match aquaroute_cli::run() {
        Ok(()) => {}
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        Err(err) => {
            eprintln!("aquaroute: {err}");
            std::process::exit(1);
        }
    }
}
