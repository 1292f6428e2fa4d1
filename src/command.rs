use node::{MessageId, ParseIdError, ProcessId, Timestamp};
use std::str::FromStr;

pub const HELP: &str = "\
create <n>                  start a new simulation with n processes
clock <p>                   show the clock of process p
clocks                      show every clock
local <p>                   local event on p
send <p> [<recipient>...]   send event on p, one message per recipient
enqueue <p> <timestamp>     queue a message for p without a sender
pending [<p>]               list queued messages, optionally only those for p
deliver <p> <message-id>    deliver a queued message to p
deliver <p> @<position>     deliver the position-th (from 0) message pending for p
receive <p> <timestamp>     receive event on p with an explicit timestamp
snapshot                    capture every clock
history                     list captured snapshots
help                        show this text
quit                        leave

processes are given as a zero-based index (0) or a label (P1)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Create(usize),
    Clock(ProcessId),
    Clocks,
    Local(ProcessId),
    Send {
        sender: ProcessId,
        recipients: Vec<ProcessId>,
    },
    Enqueue {
        recipient: ProcessId,
        timestamp: Timestamp,
    },
    Pending(Option<ProcessId>),
    Deliver {
        receiver: ProcessId,
        message: MessageId,
    },
    DeliverAt {
        receiver: ProcessId,
        position: usize,
    },
    Receive {
        receiver: ProcessId,
        timestamp: Timestamp,
    },
    Snapshot,
    History,
    Help,
    Quit,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown command `{0}`, try `help`")]
    UnknownCommand(String),
    #[error("`{command}` expects {expected}")]
    Arity {
        command: &'static str,
        expected: &'static str,
    },
    #[error(transparent)]
    Id(#[from] ParseIdError),
    #[error("invalid number `{0}`")]
    Number(String),
    #[error("process count must be a positive integer, got `{0}`")]
    ProcessCount(String),
}

impl Command {
    /// Parses one input line. Blank lines and `#` comments yield `None`.
    pub fn parse_line(line: &str) -> Result<Option<Self>, ParseError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        line.parse().map(Some)
    }
}

impl FromStr for Command {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        let Some(name) = words.next() else {
            return Err(ParseError::UnknownCommand(String::new()));
        };
        let args = words.collect::<Vec<_>>();

        let command = match (name.to_ascii_lowercase().as_str(), args.as_slice()) {
            ("create", [n]) => Command::Create(
                n.parse()
                    .map_err(|_| ParseError::ProcessCount(n.to_string()))?,
            ),
            ("clock", [p]) => Command::Clock(p.parse()?),
            ("clocks", []) => Command::Clocks,
            ("local", [p]) => Command::Local(p.parse()?),
            ("send", [sender, recipients @ ..]) => Command::Send {
                sender: sender.parse()?,
                recipients: recipients
                    .iter()
                    .map(|r| r.parse::<ProcessId>())
                    .collect::<Result<Vec<_>, _>>()?,
            },
            ("enqueue", [p, ts]) => Command::Enqueue {
                recipient: p.parse()?,
                timestamp: number(ts)?,
            },
            ("pending", []) => Command::Pending(None),
            ("pending", [p]) => Command::Pending(Some(p.parse()?)),
            ("deliver", [p, pos]) if pos.starts_with('@') => Command::DeliverAt {
                receiver: p.parse()?,
                position: number(&pos[1..])?,
            },
            ("deliver", [p, id]) => Command::Deliver {
                receiver: p.parse()?,
                message: id.parse()?,
            },
            ("receive", [p, ts]) => Command::Receive {
                receiver: p.parse()?,
                timestamp: number(ts)?,
            },
            ("snapshot", []) => Command::Snapshot,
            ("history", []) => Command::History,
            ("help", _) => Command::Help,
            ("quit" | "exit", []) => Command::Quit,
            (name, _) => return Err(arity(name)),
        };

        Ok(command)
    }
}

fn number<T: FromStr>(s: &str) -> Result<T, ParseError> {
    s.parse().map_err(|_| ParseError::Number(s.to_string()))
}

fn arity(name: &str) -> ParseError {
    let (command, expected) = match name {
        "create" => ("create", "a process count"),
        "clock" => ("clock", "one process"),
        "local" => ("local", "one process"),
        "send" => ("send", "a sender followed by recipients"),
        "enqueue" => ("enqueue", "a process and a timestamp"),
        "pending" => ("pending", "at most one process"),
        "deliver" => ("deliver", "a process and a message id or @position"),
        "receive" => ("receive", "a process and a timestamp"),
        "clocks" => ("clocks", "no arguments"),
        "snapshot" => ("snapshot", "no arguments"),
        "history" => ("history", "no arguments"),
        "quit" | "exit" => ("quit", "no arguments"),
        other => return ParseError::UnknownCommand(other.to_string()),
    };

    ParseError::Arity { command, expected }
}
