use std::io;

use clap::Parser as _;
use tracing::debug;

use crate::{
    cli::Cli,
    shell::{Shell, ShellError},
};

mod cli;
mod filesystem;
mod shell;

#[snafu::report]
fn main() -> Result<(), ShellError> {
    let cli_args = Cli::parse();
    setup_tracing(&cli_args);
    debug!("Parsed CLI arguments: {cli_args:?}");

    let mut shell = Shell::new(io::stdout());
    shell.run(io::stdin().lock())
}

fn setup_tracing(cli_args: &Cli) {
    if let Some(level) = cli_args.log_level.to_tracing_level() {
        tracing_subscriber::fmt()
            .with_max_level(level)
            .without_time()
            .compact()
            .with_writer(io::stderr)
            .init();
    }
}
