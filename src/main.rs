//! hbnb - Command interpreter for the HBnB object store

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = hbnb::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
