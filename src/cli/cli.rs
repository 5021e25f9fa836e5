use clap::Parser;

use super::LogLevel;

/// An interactive shell over an in-memory filesystem tree.
#[derive(Parser, Debug, Clone)]
pub struct Cli {
    #[clap(long, short, default_value = "warn", value_enum)]
    pub log_level: LogLevel,
}
