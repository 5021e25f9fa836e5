//! Line-oriented command surface over the filesystem tree.

mod command;
mod shell;

pub use command::Command;
pub use shell::{Shell, ShellError};
