#![forbid(unsafe_code)]
//! Quizgen Command Line Interface

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

use quizgen::commands::{
    execute_generate, execute_validate, ConverterKind, GenerateOptions, ValidateOptions,
};
use quizgen::LineEnding;

#[derive(Parser)]
#[command(name = "quizgen")]
#[command(about = "Generate fill-in-the-blank quiz variants as an importable question bank")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable more logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate quiz variants and package them as a question bank
    Generate {
        /// Quiz template (.md, .txt, .html), can be repeated
        #[arg(short, long = "input", required = true)]
        inputs: Vec<PathBuf>,

        /// Variant configuration for each --input, in the same order
        #[arg(short, long = "config", required = true)]
        configs: Vec<PathBuf>,

        /// Empty directory where generated files are placed
        #[arg(short, long)]
        output: PathBuf,

        /// Delete the contents of the output directory if it is not empty
        #[arg(long)]
        clear_output_dir: bool,

        /// Question bank name used for the generated files
        #[arg(long, default_value = "quiz_bank")]
        bank_name: String,

        /// Markdown converter (pandoc, builtin)
        #[arg(long, env = "QUIZGEN_CONVERTER", default_value = "pandoc")]
        converter: ConverterKind,

        /// Pandoc executable
        #[arg(long, env = "QUIZGEN_PANDOC", default_value = "pandoc")]
        pandoc: PathBuf,

        /// Line terminator in the quiz bank (native, lf, crlf)
        #[arg(long, env = "QUIZGEN_LINE_ENDING", default_value = "native")]
        line_ending: LineEnding,
    },

    /// Validate variant configuration files
    Validate {
        /// Configuration files to check
        #[arg(required = true)]
        configs: Vec<PathBuf>,
    },
}

/// Logs go to stdout; `--verbose` adds debug output with levels and targets.
/// `RUST_LOG` takes precedence when set.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stdout)
        .without_time();

    if verbose {
        builder.with_target(true).init();
    } else {
        builder.with_target(false).with_level(false).init();
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Generate {
            inputs,
            configs,
            output,
            clear_output_dir,
            bank_name,
            converter,
            pandoc,
            line_ending,
        } => {
            let options = GenerateOptions {
                inputs,
                configs,
                output,
                clear_output_dir,
                bank_name,
                converter,
                pandoc,
                line_ending,
            };
            execute_generate(options)
        }

        Commands::Validate { configs } => execute_validate(ValidateOptions { configs }),
    };

    if let Err(e) = result {
        tracing::debug!("{:?}", e);
        eprintln!("{} {:#}", style("✗").red(), e);
        std::process::exit(1);
    }
}
