use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

#[derive(Parser)]
#[command(author, version, about)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Yaml,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Forecast start and end dates for every solution in a project
    Schedule {
        /// Project YAML file
        #[arg(short, long)]
        input: String,
        /// Output file for the computed schedule
        #[arg(short, long)]
        output: String,
        /// Number of Monte Carlo runs per backlog solution
        #[arg(short = 'n', long, default_value_t = 10000)]
        runs: usize,
        /// Confidence percentiles in (0, 1], comma separated
        #[arg(short, long, value_delimiter = ',', default_values_t = [0.5, 0.85])]
        percentiles: Vec<f64>,
        /// Iteration cap for a single simulation run
        #[arg(long, default_value_t = 10000)]
        overflow_limit: usize,
        /// Days per throughput-period week
        #[arg(long, default_value_t = 7)]
        period_days: i64,
        /// Output serialization format
        #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
        format: OutputFormat,
    },
    /// Run advisory health checks on a project's forecast inputs
    Check {
        /// Project YAML file
        #[arg(short, long)]
        input: String,
        /// Minimum healthy throughput sample count
        #[arg(long, default_value_t = 5)]
        min_samples: usize,
        /// Maximum healthy throughput sample count
        #[arg(long, default_value_t = 30)]
        max_samples: usize,
        /// Maximum age in days of the most recent sample
        #[arg(long, default_value_t = 84)]
        max_sample_age_days: i64,
        /// Maximum relative drift between sample halves
        #[arg(long, default_value_t = 0.25)]
        stability_ratio: f64,
        /// Minimum relative spread of the backlog guess range
        #[arg(long, default_value_t = 0.3)]
        backlog_spread_ratio: f64,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
