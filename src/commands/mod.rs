//! @acp:module "Commands"
//! @acp:summary "CLI command implementations"
//! @acp:domain cli
//! @acp:layer handler
//!
//! Provides implementations for all CLI commands.
//! Each command is in its own submodule for maintainability.

pub mod generate;
pub mod validate;

pub use generate::{
    execute_generate, load_jobs, prepare_output_dir, validate_bank_name, ConverterKind,
    GenerateOptions,
};
pub use validate::{execute_validate, ValidateOptions};
