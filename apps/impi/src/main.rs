//! impi CLI binary entry point.
//! Resolves configuration, runs the verification pipeline and maps the
//! outcome to an exit code.

use anyhow::Context;
use clap::Parser;
use impi::cli::Cli;
use impi::config;
use impi::error::RunError;
use impi::models::scheme::SchemeRegistry;
use impi::models::RunSummary;
use impi::output::{self, ConsoleReporter};
use impi::pipeline::Pipeline;
use impi::utils::error_prefix;
use log::debug;
use std::sync::Arc;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{} {:#}", error_prefix(), e);
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<i32> {
    // Setup problems exit with 2 before any file is read
    let eff = match config::resolve_effective(&cli.overrides()) {
        Ok(eff) => eff,
        Err(e) => {
            eprintln!("{} {}", error_prefix(), e);
            return Ok(2);
        }
    };
    match &eff.config_path {
        Some(p) => debug!("using config {}", p.display()),
        None => debug!("no impi config found from {}", eff.repo_root.display()),
    }
    let options = match eff.verify_options(&SchemeRegistry::builtin()) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("{} {}", error_prefix(), e);
            return Ok(2);
        }
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start the async runtime")?;
    let pipeline = Pipeline::new(eff.workers, options);
    let reporter = Arc::new(ConsoleReporter::new(&eff.output));
    match runtime.block_on(pipeline.run(&cli.packages, reporter)) {
        Ok(summary) => {
            output::print_summary(&summary, &eff.output);
            Ok(0)
        }
        Err(e) => {
            if let RunError::Failed { count, files } = &e {
                output::print_summary(
                    &RunSummary {
                        files: *files,
                        failed: *count,
                    },
                    &eff.output,
                );
            }
            eprintln!("{} impi verification failed: {}", error_prefix(), e);
            Ok(e.exit_code())
        }
    }
}
