//! degreecheck CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "degreecheck", version, about = "Degree progress and graduation audit")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Audit a student plan against its major, double major and minors
    Check {
        /// Path to the plan .toml file
        #[arg(long)]
        plan: PathBuf,

        /// Data directory (overrides the config file)
        #[arg(long)]
        data: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output format: text, json, markdown, html
        #[arg(long, default_value = "text")]
        format: String,

        /// Directory for saved reports (default: output_dir from the config)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Exit code 1 if the major or double major is incomplete
        #[arg(long)]
        fail_on_incomplete: bool,
    },

    /// Show per-semester credit and GPA totals for a plan
    Summary {
        /// Path to the plan .toml file
        #[arg(long)]
        plan: PathBuf,

        /// Data directory (overrides the config file)
        #[arg(long)]
        data: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate catalogs and minor requirement files
    Validate {
        /// Data directory (overrides the config file)
        #[arg(long)]
        data: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create starter config, sample data and an example plan
    Init,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("degreecheck=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check {
            plan,
            data,
            config,
            format,
            output,
            fail_on_incomplete,
        } => commands::check::execute(plan, data, config, format, output, fail_on_incomplete),
        Commands::Summary { plan, data, config } => commands::summary::execute(plan, data, config),
        Commands::Validate { data, config } => commands::validate::execute(data, config),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
