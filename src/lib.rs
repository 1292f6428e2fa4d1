pub mod command;
pub mod config;
pub mod driver;

pub use command::{Command, ParseError};
pub use config::{DriverConfig, OutputFormat};
pub use driver::{Driver, DriverError, Response};

use node::workload::{self, WorkloadReport};
use node::Simulator;
use tokio::io::BufReader;

/// Runs an interactive (or piped) session over stdin and stdout.
pub async fn start(config: &DriverConfig) -> Result<(), DriverError> {
    let driver = Driver::new(config)?;

    tracing::info!(format = ?config.format, "reading commands from stdin");

    driver
        .run(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await
}

/// Creates a simulation and drives it with the configured random workload.
pub fn run_workload(config: &DriverConfig) -> Result<WorkloadReport, DriverError> {
    let mut simulator = Simulator::new(config.processes.unwrap_or(0))?;
    Ok(workload::run(&mut simulator, &config.workload)?)
}

pub fn render_report(report: &WorkloadReport, format: OutputFormat) -> Result<String, DriverError> {
    let rendered = match format {
        OutputFormat::Text => {
            let mut lines = vec![format!("seed {}", report.seed)];
            lines.extend(report.events.iter().map(ToString::to_string));
            lines.push(report.final_snapshot.to_string());
            lines.join("\n")
        }
        OutputFormat::Json => serde_json::to_string_pretty(report)?,
    };

    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use node::workload::WorkloadConfig;

    #[test]
    fn workload_report_renders_in_both_formats() {
        let config = DriverConfig::new(OutputFormat::Text)
            .with_processes(3)
            .with_workload(WorkloadConfig::default().with_seed(7).with_steps(20));

        let report = run_workload(&config).unwrap();
        assert_eq!(report.events.len(), 20);
        assert_eq!(report.final_snapshot.len(), 3);

        let text = render_report(&report, OutputFormat::Text).unwrap();
        let lines = text.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 22);
        assert_eq!(lines[0], "seed 7");
        assert!(lines[21].starts_with("snapshot "));

        let json = render_report(&report, OutputFormat::Json).unwrap();
        let value = serde_json::from_str::<serde_json::Value>(&json).unwrap();
        assert_eq!(value["seed"], 7);
        assert_eq!(value["events"].as_array().map(Vec::len), Some(20));
    }

    #[test]
    fn workload_without_processes_is_rejected() {
        let err = run_workload(&DriverConfig::default()).unwrap_err();
        assert_eq!(err.code(), "invalid-configuration");
    }
}
