//! @acp:module "Validate Command"
//! @acp:summary "Validate variant configuration files without generating"
//! @acp:domain cli
//! @acp:layer handler

use std::path::PathBuf;

use anyhow::{bail, Result};
use console::style;

use crate::config::GeneratorConfig;
use crate::error::QuizError;

/// Options for the validate command
#[derive(Debug, Clone)]
pub struct ValidateOptions {
    /// Configuration files to validate
    pub configs: Vec<PathBuf>,
}

/// Execute the validate command
pub fn execute_validate(options: ValidateOptions) -> Result<()> {
    let mut invalid = 0;

    for path in &options.configs {
        match GeneratorConfig::load(path) {
            Ok(config) => {
                println!(
                    "{} {} is valid ({} variants)",
                    style("✓").green(),
                    path.display(),
                    config.variants.len()
                );
            }
            Err(QuizError::ConfigInvalid { issues, .. }) => {
                invalid += 1;
                eprintln!("{} {} is invalid", style("✗").red(), path.display());
                for issue in issues {
                    eprintln!("  - {}", issue);
                }
            }
            Err(e) => {
                invalid += 1;
                eprintln!("{} {:#}", style("✗").red(), anyhow::Error::new(e));
            }
        }
    }

    if invalid > 0 {
        bail!(
            "{} of {} configuration files are invalid",
            invalid,
            options.configs.len()
        );
    }

    Ok(())
}
