use anyhow::Result;
use log::info;
use std::path::PathBuf;

use morphpack::validator::validate_container;

/// Validate container integrity
pub fn run(file: PathBuf) -> Result<()> {
    info!("morphpack Validator");
    info!("File: {}", file.display());

    match validate_container(&file) {
        Ok(report) => {
            println!("{}", report.format_colored());

            // Exit with error code if validation failed
            if report.has_failures() {
                std::process::exit(1);
            }

            Ok(())
        }
        Err(e) => {
            eprintln!("Validation error: {:#}", e);
            std::process::exit(1);
        }
    }
}
