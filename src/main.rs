//! htrealm - htpasswd/htgroup credential checker
//!
//! Entry point for the htrealm CLI.

use clap::Parser;
use htrealm::{cli::Cli, error::ExitCode};

fn main() {
    let cli = Cli::parse();

    match htrealm::run_app(cli) {
        Ok(code) => std::process::exit(code.as_i32()),
        Err(err) => {
            eprintln!("Error: {err:#}");
            std::process::exit(ExitCode::GeneralError.as_i32());
        }
    }
}
