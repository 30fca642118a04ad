//! # morphpack
//!
//! Command-line tool for neuron morphology containers.
//!
//! ## Usage
//!
//! ```bash
//! # Generate a synthetic collection with synapses
//! morphpack demo neurons.zip --neurons 500
//!
//! # Inspect and validate it
//! morphpack info neurons.zip --json
//! morphpack validate neurons.zip
//!
//! # Copy two records into a new container
//! morphpack extract neurons.zip subset.zip --ids 10000,10007
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::init_logging(cli.verbosity());
    cli::dispatch(cli)
}
