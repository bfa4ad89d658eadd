//! crumb - notes and tasks kept in plain-text files next to your work

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = crumb_cli::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
