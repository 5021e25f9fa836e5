/// A tokenized input line: the leading verb and whatever arguments follow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub verb: String,
    pub args: Vec<String>,
}

impl Command {
    /// Split a raw line on whitespace. Returns `None` for a blank line. No
    /// quoting or escaping is recognized.
    pub fn parse(line: &str) -> Option<Self> {
        let mut tokens = line.split_whitespace().map(str::to_string);
        let verb = tokens.next()?;
        Some(Command {
            verb,
            args: tokens.collect(),
        })
    }
}
