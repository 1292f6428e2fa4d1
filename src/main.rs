use clap::{Parser, Subcommand};
use lamport_sim::{DriverConfig, OutputFormat};
use node::workload::WorkloadConfig;

#[derive(Parser)]
#[command(name = "lamport-sim")]
#[command(about = "Step-by-step Lamport logical clock simulator")]
#[command(version)]
struct Cli {
    /// Output format for command results
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read commands from stdin, one per line (`help` lists them)
    Repl {
        /// Create this many processes before reading commands
        #[arg(short, long)]
        processes: Option<usize>,
    },

    /// Drive a simulation with a seeded random workload
    Random {
        /// Number of processes
        #[arg(short, long)]
        processes: usize,

        /// Number of random actions
        #[arg(long, default_value = "100")]
        steps: usize,

        /// Seed for the workload; random when omitted
        #[arg(long)]
        seed: Option<u64>,

        /// Maximum recipients per send
        #[arg(long, default_value = "2")]
        max_fanout: usize,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = DriverConfig::new(cli.format);

    match cli.command {
        Commands::Repl { processes } => {
            let config = match processes {
                Some(processes) => config.with_processes(processes),
                None => config,
            };

            lamport_sim::start(&config).await?;
        }

        Commands::Random {
            processes,
            steps,
            seed,
            max_fanout,
        } => {
            let seed = seed.unwrap_or_else(rand::random);
            tracing::info!(%seed, processes, steps, "running random workload");

            let workload = WorkloadConfig::default()
                .with_seed(seed)
                .with_steps(steps)
                .with_max_fanout(max_fanout);
            let config = config.with_processes(processes).with_workload(workload);

            let report = lamport_sim::run_workload(&config)?;
            println!("{}", lamport_sim::render_report(&report, cli.format)?);
        }
    }

    Ok(())
}
