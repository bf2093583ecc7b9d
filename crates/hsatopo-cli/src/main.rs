//! CLI entry point.

use std::io;
use std::process::ExitCode;

use clap::Parser;

use hsatopo_cli::{Cli, handlers, logging};

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let stdout = io::stdout();
    match handlers::diagnostics::execute(&cli, &mut stdout.lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("[-] {err}");
            ExitCode::from(err.exit_code())
        }
    }
}
