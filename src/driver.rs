use crate::command::{Command, ParseError, HELP};
use crate::config::{DriverConfig, OutputFormat};
use node::{
    ErrorKind, Message, MessageId, ProcessId, SendOutcome, SharedSimulator, Simulator, SimulatorError,
    Snapshot, SnapshotHistory, Timestamp,
};
use std::collections::BTreeMap;
use std::fmt;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

#[derive(thiserror::Error, Debug)]
pub enum DriverError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Simulator(#[from] SimulatorError),
    #[error("input line is not valid UTF-8")]
    Encoding(#[from] std::str::Utf8Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DriverError {
    pub fn code(&self) -> &'static str {
        match self {
            DriverError::Parse(ParseError::ProcessCount(_)) => {
                ErrorKind::InvalidConfiguration.code()
            }
            DriverError::Parse(_) => "parse",
            DriverError::Simulator(e) => e.kind().code(),
            DriverError::Encoding(_) => "encoding",
            DriverError::Io(_) => "io",
            DriverError::Json(_) => "json",
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Response {
    Clock {
        process: ProcessId,
        value: Timestamp,
    },
    Clocks {
        clocks: BTreeMap<ProcessId, Timestamp>,
    },
    Sent(SendOutcome),
    Enqueued {
        message: MessageId,
        recipient: ProcessId,
        timestamp: Timestamp,
    },
    Pending {
        messages: Vec<Message>,
    },
    Snapshot(Snapshot),
    History {
        snapshots: SnapshotHistory,
    },
    Help {
        text: &'static str,
    },
    Quit,
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::Clock { process, value } => write!(f, "{process} = {value}"),
            Response::Clocks { clocks } => {
                let line = clocks
                    .iter()
                    .map(|(id, ts)| format!("{id}={ts}"))
                    .collect::<Vec<_>>()
                    .join(" ");
                f.write_str(&line)
            }
            Response::Sent(outcome) => {
                write!(f, "{} sent at {}", outcome.sender, outcome.timestamp)?;
                if outcome.messages.is_empty() {
                    return f.write_str(", no recipients");
                }
                f.write_str(", messages")?;
                for id in &outcome.messages {
                    write!(f, " {id}")?;
                }
                Ok(())
            }
            Response::Enqueued {
                message,
                recipient,
                timestamp,
            } => write!(f, "{message} -> {recipient} @ {timestamp} queued"),
            Response::Pending { messages } if messages.is_empty() => {
                f.write_str("no pending messages")
            }
            Response::Pending { messages } => {
                let lines = messages.iter().map(Message::to_string).collect::<Vec<_>>();
                f.write_str(&lines.join("\n"))
            }
            Response::Snapshot(snapshot) => write!(f, "{snapshot}"),
            Response::History { snapshots } if snapshots.is_empty() => {
                f.write_str("no snapshots")
            }
            Response::History { snapshots } => {
                let lines = snapshots
                    .iter()
                    .map(Snapshot::to_string)
                    .collect::<Vec<_>>();
                f.write_str(&lines.join("\n"))
            }
            Response::Help { text } => f.write_str(text),
            Response::Quit => f.write_str("bye"),
        }
    }
}

/// Executes commands against one shared simulation and renders their results.
#[derive(Debug, Clone)]
pub struct Driver {
    simulator: SharedSimulator,
    format: OutputFormat,
}

impl Driver {
    pub fn new(config: &DriverConfig) -> Result<Self, DriverError> {
        let simulator = match config.processes {
            Some(processes) => Simulator::new(processes)?,
            None => Simulator::default(),
        };

        Ok(Self {
            simulator: SharedSimulator::new(simulator),
            format: config.format,
        })
    }

    pub fn simulator(&self) -> &SharedSimulator {
        &self.simulator
    }

    pub async fn execute(&self, command: Command) -> Result<Response, SimulatorError> {
        self.simulator.with(|sim| apply(sim, command)).await
    }

    pub fn render(&self, result: &Result<Response, DriverError>) -> Result<String, DriverError> {
        let rendered = match (self.format, result) {
            (OutputFormat::Text, Ok(response)) => response.to_string(),
            (OutputFormat::Text, Err(e)) => format!("error[{}]: {e}", e.code()),
            (OutputFormat::Json, Ok(response)) => serde_json::to_string(response)?,
            (OutputFormat::Json, Err(e)) => serde_json::json!({
                "kind": "error",
                "code": e.code(),
                "message": e.to_string(),
            })
            .to_string(),
        };

        Ok(rendered)
    }

    /// Reads commands line by line until end of input or `quit`.
    ///
    /// Rejected commands, including lines that are not valid UTF-8, are reported on `output`
    /// and the session continues.
    pub async fn run<R, W>(&self, mut input: R, mut output: W) -> Result<(), DriverError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut buf = Vec::new();

        loop {
            buf.clear();
            if input.read_until(b'\n', &mut buf).await? == 0 {
                break;
            }

            let result = match std::str::from_utf8(&buf) {
                Ok(line) => match Command::parse_line(line) {
                    Ok(None) => continue,
                    Ok(Some(command)) => {
                        self.execute(command).await.map_err(DriverError::from)
                    }
                    Err(e) => Err(DriverError::from(e)),
                },
                Err(e) => Err(DriverError::from(e)),
            };

            if let Err(e) = &result {
                let line = String::from_utf8_lossy(&buf);
                tracing::warn!(error = %e, line = %line.trim_end(), "command rejected");
            }

            let quit = matches!(result, Ok(Response::Quit));

            let mut rendered = self.render(&result)?;
            rendered.push('\n');
            output.write_all(rendered.as_bytes()).await?;
            output.flush().await?;

            if quit {
                break;
            }
        }

        Ok(())
    }
}

fn apply(sim: &mut Simulator, command: Command) -> Result<Response, SimulatorError> {
    let clock = |process: ProcessId, value| Response::Clock { process, value };

    let response = match command {
        Command::Create(processes) => {
            sim.create(processes)?;
            clocks(sim)
        }
        Command::Clock(p) => clock(p, sim.get_clock_value(p.index())?),
        Command::Clocks => clocks(sim),
        Command::Local(p) => clock(p, sim.local_event(p.index())?),
        Command::Send { sender, recipients } => {
            let indices = recipients.iter().map(|r| r.index()).collect::<Vec<_>>();
            Response::Sent(sim.send_message(sender.index(), &indices)?)
        }
        Command::Enqueue {
            recipient,
            timestamp,
        } => Response::Enqueued {
            message: sim.enqueue(recipient.index(), timestamp)?,
            recipient,
            timestamp,
        },
        Command::Pending(None) => Response::Pending {
            messages: sim.pending().iter().cloned().collect(),
        },
        Command::Pending(Some(p)) => Response::Pending {
            messages: sim.pending_for(p.index())?.into_iter().cloned().collect(),
        },
        Command::Deliver { receiver, message } => {
            clock(receiver, sim.process_message(receiver.index(), message)?)
        }
        Command::DeliverAt { receiver, position } => {
            clock(receiver, sim.process_message_at(receiver.index(), position)?)
        }
        Command::Receive {
            receiver,
            timestamp,
        } => clock(receiver, sim.receive_event(receiver.index(), timestamp)?),
        Command::Snapshot => Response::Snapshot(sim.take_snapshot()?),
        Command::History => Response::History {
            snapshots: sim.snapshots().clone(),
        },
        Command::Help => Response::Help { text: HELP },
        Command::Quit => Response::Quit,
    };

    Ok(response)
}

fn clocks(sim: &Simulator) -> Response {
    Response::Clocks {
        clocks: sim.clock_values().into_iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn session(format: OutputFormat, processes: Option<usize>, script: &str) -> String {
        let mut config = DriverConfig::new(format);
        config.processes = processes;
        let driver = Driver::new(&config).unwrap();

        let mut output = Vec::new();
        driver.run(script.as_bytes(), &mut output).await.unwrap();

        String::from_utf8(output).unwrap()
    }

    #[tokio::test]
    async fn text_session_follows_lamport_rules() {
        let script = "\
# two processes, one message
create 2
local P1
send P1 P2
pending P2
deliver P2 #0
snapshot
history
";
        let output = session(OutputFormat::Text, None, script).await;

        let expected = "\
P1=0 P2=0
P1 = 1
P1 sent at 2, messages #0
#0 P1 -> P2 @ 2
P2 = 3
snapshot 0: P1=2 P2=3
snapshot 0: P1=2 P2=3
";
        assert_eq!(output, expected);
    }

    #[tokio::test]
    async fn errors_are_reported_and_session_continues() {
        let script = "\
local 0
create 0
create 2
clock 5
deliver 1 3
bogus
clock 1
";
        let output = session(OutputFormat::Text, None, script).await;
        let lines = output.lines().collect::<Vec<_>>();

        assert_eq!(lines.len(), 7);
        assert!(lines[0].starts_with("error[invalid-state]"));
        assert!(lines[1].starts_with("error[invalid-configuration]"));
        assert_eq!(lines[2], "P1=0 P2=0");
        assert!(lines[3].starts_with("error[out-of-range]"));
        assert!(lines[4].starts_with("error[out-of-range]"));
        assert!(lines[5].starts_with("error[parse]"));
        assert_eq!(lines[6], "P2 = 0");
    }

    #[tokio::test]
    async fn bad_process_count_is_invalid_configuration() {
        let output = session(OutputFormat::Text, None, "create -1\ncreate abc\ncreate 0\n").await;
        let lines = output.lines().collect::<Vec<_>>();

        assert_eq!(lines.len(), 3);
        for line in lines {
            assert!(line.starts_with("error[invalid-configuration]"), "{line}");
        }
    }

    #[tokio::test]
    async fn invalid_utf8_line_is_rejected_and_session_continues() {
        let driver = Driver::new(&DriverConfig::default().with_processes(1)).unwrap();

        let mut output = Vec::new();
        let input: &[u8] = b"local 0\n\xff\xfe\nlocal 0\n";
        driver.run(input, &mut output).await.unwrap();

        let output = String::from_utf8(output).unwrap();
        let lines = output.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "P1 = 1");
        assert!(lines[1].starts_with("error[encoding]"));
        assert_eq!(lines[2], "P1 = 2");
    }

    #[tokio::test]
    async fn deliver_by_position_uses_receivers_pending_list() {
        let script = "\
send P1 P3
send P2 P3
enqueue P2 9
deliver P3 @1
pending P3
deliver P3 @1
";
        let output = session(OutputFormat::Text, Some(3), script).await;
        let lines = output.lines().collect::<Vec<_>>();

        assert_eq!(lines[3], "P3 = 2");
        assert_eq!(lines[4], "#0 P1 -> P3 @ 1");
        assert!(lines[5].starts_with("error[out-of-range]"));
    }

    #[tokio::test]
    async fn quit_stops_reading() {
        let output = session(OutputFormat::Text, Some(1), "local 0\nquit\nlocal 0\n").await;

        assert_eq!(output, "P1 = 1\nbye\n");
    }

    #[tokio::test]
    async fn json_session_emits_one_document_per_command() {
        let script = "send 0 1 2\nsnapshot\nclock 9\n";
        let output = session(OutputFormat::Json, Some(3), script).await;
        let docs = output
            .lines()
            .map(|line| serde_json::from_str::<serde_json::Value>(line).unwrap())
            .collect::<Vec<_>>();

        assert_eq!(docs.len(), 3);

        assert_eq!(docs[0]["kind"], "sent");
        assert_eq!(docs[0]["sender"], "P1");
        assert_eq!(docs[0]["timestamp"], 1);
        assert_eq!(docs[0]["messages"], serde_json::json!([0, 1]));

        assert_eq!(docs[1]["kind"], "snapshot");
        assert_eq!(
            docs[1]["clocks"],
            serde_json::json!({"P1": 1, "P2": 0, "P3": 0})
        );

        assert_eq!(docs[2]["kind"], "error");
        assert_eq!(docs[2]["code"], "out-of-range");
    }

    #[tokio::test]
    async fn execute_shares_state_with_simulator_handle() {
        let driver = Driver::new(&DriverConfig::default().with_processes(2)).unwrap();

        driver.execute(Command::Local(ProcessId(1))).await.unwrap();

        let value = driver
            .simulator()
            .with(|sim| sim.get_clock_value(1))
            .await
            .unwrap();
        assert_eq!(value, 1);
    }
}
