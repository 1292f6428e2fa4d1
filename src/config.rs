use node::workload::WorkloadConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// One human readable line (or block) per command.
    #[default]
    Text,
    /// One JSON document per command.
    Json,
}

/// Settings for one driver session.
#[derive(Debug, Clone, Default)]
pub struct DriverConfig {
    pub format: OutputFormat,
    /// Processes to create before the first command. `None` starts uninitialized.
    pub processes: Option<usize>,
    pub workload: WorkloadConfig,
}

impl DriverConfig {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            ..Self::default()
        }
    }

    pub fn with_processes(mut self, processes: usize) -> Self {
        self.processes = Some(processes);
        self
    }

    pub fn with_workload(mut self, workload: WorkloadConfig) -> Self {
        self.workload = workload;
        self
    }
}
