use std::fs::File;
use std::io::{BufRead, BufReader, Write};

use snafu::prelude::*;
use tracing::debug;

use crate::filesystem::{FileTree, FilesystemError};

use super::Command;

/// Outcome of one dispatched line.
enum Flow {
    Continue,
    Exit,
}

/// The interactive surface: reads lines, runs them against the tree, and
/// writes every prompt and diagnostic to its output sink.
///
/// Command failures are single lines on the output stream and never end the
/// session; only a failing stream does.
pub struct Shell<W: Write> {
    tree: FileTree,
    out: W,
}

impl<W: Write> Shell<W> {
    pub fn new(out: W) -> Self {
        Shell {
            tree: FileTree::new(),
            out,
        }
    }

    /// Drive a whole session until `exit` or the end of input. The prompt
    /// is written before every read.
    pub fn run<R: BufRead>(&mut self, input: R) -> Result<(), ShellError> {
        self.write_prompt()?;
        for line in input.lines() {
            let line = line.context(ReadSnafu)?;
            if let Flow::Exit = self.dispatch(&line)? {
                return Ok(());
            }
            self.write_prompt()?;
        }
        Ok(())
    }

    fn dispatch(&mut self, line: &str) -> Result<Flow, ShellError> {
        let Some(command) = Command::parse(line) else {
            return Ok(Flow::Continue);
        };
        debug!(
            "Dispatching '{}' with {} argument(s)",
            command.verb,
            command.args.len()
        );

        match command.verb.as_str() {
            "cd" => match command.args.as_slice() {
                [destination] => self.cd(destination)?,
                _ => self.report("cd: missing destination operand")?,
            },
            "mkdir" => {
                if command.args.is_empty() {
                    self.report("mkdir: missing directory name")?;
                } else {
                    for name in &command.args {
                        self.mkdir(name)?;
                    }
                }
            }
            "ls" => match command.args.as_slice() {
                [] => self.ls_cursor()?,
                [target] => self.ls_named(target)?,
                _ => self.report("ls: too many arguments")?,
            },
            "touch" => match command.args.as_slice() {
                [name] => self.touch(name)?,
                _ => self.report("touch: missing file operand")?,
            },
            "cat" => match command.args.as_slice() {
                [name] => self.cat(name)?,
                _ => self.report("cat: missing file operand")?,
            },
            "mv" => match command.args.as_slice() {
                [source, destination] => self.mv(source, destination)?,
                _ => self.report("mv: missing source or destination operand")?,
            },
            "cp" => match command.args.as_slice() {
                [source, destination] => self.cp(source, destination)?,
                _ => self.report("cp: missing source or destination operand")?,
            },
            "rm" => match command.args.as_slice() {
                [target] => self.rm(target)?,
                _ => self.report("rm: missing target operand")?,
            },
            "exit" => return Ok(Flow::Exit),
            unknown => self.report(&format!("Unknown command: {unknown}"))?,
        }

        Ok(Flow::Continue)
    }

    fn cd(&mut self, destination: &str) -> Result<(), ShellError> {
        if let Err(err) = self.tree.cd(destination) {
            self.report(&err.to_string())?;
        }
        Ok(())
    }

    fn mkdir(&mut self, name: &str) -> Result<(), ShellError> {
        if let Err(err) = self.tree.mkdir(name) {
            writeln!(self.out, "mkdir: cannot create directory '{name}': {err}")
                .context(WriteSnafu)?;
        }
        Ok(())
    }

    fn touch(&mut self, name: &str) -> Result<(), ShellError> {
        if let Err(err) = self.tree.touch(name) {
            writeln!(self.out, "touch: cannot create file '{name}': {err}").context(WriteSnafu)?;
        }
        Ok(())
    }

    fn ls_cursor(&mut self) -> Result<(), ShellError> {
        let cursor = self.tree.cursor();
        for (name, kind) in self.tree.entries(cursor) {
            writeln!(self.out, "{name} {kind}").context(WriteSnafu)?;
        }
        Ok(())
    }

    fn ls_named(&mut self, target: &str) -> Result<(), ShellError> {
        match self.tree.list_named(target) {
            Ok(entries) => {
                for (name, kind) in entries {
                    writeln!(self.out, "{name} {kind}").context(WriteSnafu)?;
                }
                Ok(())
            }
            Err(err) => {
                writeln!(self.out, "ls: cannot access '{target}': {err}").context(WriteSnafu)
            }
        }
    }

    /// Content comes from the host file named by the literal argument; the
    /// virtual node only gates whether the read is attempted.
    fn cat(&mut self, name: &str) -> Result<(), ShellError> {
        if let Err(err) = self.tree.resolve_file(name) {
            return writeln!(self.out, "cat: {name}: {err}").context(WriteSnafu);
        }

        match File::open(name) {
            Ok(file) => {
                for line in BufReader::new(file).lines() {
                    // A read failure ends the listing the way end of file does
                    let Ok(line) = line else { break };
                    writeln!(self.out, "{line}").context(WriteSnafu)?;
                }
                Ok(())
            }
            Err(_) => writeln!(self.out, "cat: {name}: Unable to open file").context(WriteSnafu),
        }
    }

    fn mv(&mut self, source: &str, destination: &str) -> Result<(), ShellError> {
        match self.tree.mv(source, destination) {
            Ok(()) => Ok(()),
            Err(err @ FilesystemError::NotADirectory { .. }) => {
                writeln!(self.out, "mv: cannot move to '{destination}': {err}").context(WriteSnafu)
            }
            Err(err @ FilesystemError::IntoOwnSubtree { .. }) => {
                writeln!(self.out, "mv: {err}").context(WriteSnafu)
            }
            Err(err) => {
                writeln!(self.out, "mv: cannot move '{source}': {err}").context(WriteSnafu)
            }
        }
    }

    fn cp(&mut self, source: &str, destination: &str) -> Result<(), ShellError> {
        match self.tree.cp(source, destination) {
            Ok(_) => Ok(()),
            Err(err @ FilesystemError::NotADirectory { .. }) => {
                writeln!(self.out, "cp: cannot copy to '{destination}': {err}").context(WriteSnafu)
            }
            Err(err) => {
                writeln!(self.out, "cp: cannot copy '{source}': {err}").context(WriteSnafu)
            }
        }
    }

    fn rm(&mut self, target: &str) -> Result<(), ShellError> {
        if let Err(err) = self.tree.rm(target) {
            writeln!(self.out, "rm: cannot remove '{target}': {err}").context(WriteSnafu)?;
        }
        Ok(())
    }

    fn report(&mut self, diagnostic: &str) -> Result<(), ShellError> {
        writeln!(self.out, "{diagnostic}").context(WriteSnafu)
    }

    fn write_prompt(&mut self) -> Result<(), ShellError> {
        write!(self.out, "{}> ", self.tree.display_path()).context(WriteSnafu)?;
        self.out.flush().context(WriteSnafu)
    }
}

#[derive(Debug, Snafu)]
pub enum ShellError {
    #[snafu(display("Failed to read from the input stream"))]
    ReadError { source: std::io::Error },
    #[snafu(display("Failed to write to the output stream"))]
    WriteError { source: std::io::Error },
}
