use clap::Parser;
use glsweep::cli::{execute_command, Cli};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = execute_command(cli) {
        eprintln!("glsweep: {}", e);
        std::process::exit(1);
    }
}
