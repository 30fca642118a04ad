use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use morphpack::writer::WriterConfig;

mod config;
mod demo;
mod extract;
mod info;
mod profile;
mod validate;

pub use profile::Profile;

/// morphpack - pack neuron morphologies into columnar containers
#[derive(Parser)]
#[command(name = "morphpack")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Packing profile for speed vs compression.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum ProfileArg {
    /// Prioritize speed over compression
    Fast,
    /// Balance between speed and compression
    #[default]
    Balanced,
    /// Maximum compression, slower packing
    MaxCompression,
}

impl From<ProfileArg> for Profile {
    fn from(arg: ProfileArg) -> Self {
        match arg {
            ProfileArg::Fast => Profile::Fast,
            ProfileArg::Balanced => Profile::Balanced,
            ProfileArg::MaxCompression => Profile::MaxCompression,
        }
    }
}

/// Writer settings shared by the commands that produce containers
#[derive(clap::Args)]
struct PackArgs {
    /// Packing profile (fast, balanced, max-compression)
    #[arg(short = 'p', long, default_value = "balanced", value_enum)]
    profile: ProfileArg,

    /// Load settings from a TOML config file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Container layout (auto, bare, archive)
    #[arg(long, value_name = "FORMAT")]
    format: Option<String>,

    /// Replace the output file if it exists
    #[arg(short = 'f', long)]
    force: bool,

    // === Advanced tuning flags (hidden from --help) ===
    /// Row group size (rows per row group)
    #[arg(short = 'r', long, hide = true)]
    row_group_size: Option<usize>,
}

impl PackArgs {
    /// Profile preset, then config file, then explicit flags
    fn writer_config(&self) -> Result<WriterConfig> {
        let mut writer = Profile::from(self.profile).writer_config();
        if let Some(path) = &self.config {
            config::Config::from_file(path)?.pack.apply_to(&mut writer)?;
        }
        if let Some(format) = &self.format {
            writer.container_format = config::parse_format(format)?;
        }
        if let Some(rows) = self.row_group_size {
            writer.row_group_size = rows;
        }
        if self.force {
            writer.overwrite = true;
        }
        Ok(writer)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a synthetic skeleton collection for testing
    Demo {
        /// Output container path
        #[arg(value_name = "OUTPUT", default_value = "demo_neurons.zip")]
        output: PathBuf,

        /// Number of skeletons
        #[arg(short = 'n', long, default_value = "100")]
        neurons: usize,

        /// Nodes per skeleton
        #[arg(long, default_value = "250")]
        nodes: usize,

        #[command(flatten)]
        pack: PackArgs,
    },

    /// Display information about a container
    Info {
        /// Input container path
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Print machine-readable JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate container integrity
    Validate {
        /// Input container path
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Copy selected records into a new container
    Extract {
        /// Input container path
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output container path
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,

        /// Record ids to extract (comma separated or repeated)
        #[arg(short = 'i', long = "ids", value_delimiter = ',', required = true)]
        ids: Vec<String>,

        #[command(flatten)]
        pack: PackArgs,
    },
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Demo {
            output,
            neurons,
            nodes,
            pack,
        } => demo::run(output, neurons, nodes, pack.writer_config()?),
        Commands::Info { file, json } => info::run(file, json),
        Commands::Validate { file } => validate::run(file),
        Commands::Extract {
            input,
            output,
            ids,
            pack,
        } => extract::run(input, output, ids, pack.writer_config()?),
    }
}
