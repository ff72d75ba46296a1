//! The Veritas command-line interface.
//!
//! Loads descriptor files, registers them against the built-in function and
//! contract registries, and runs or checks them. Configuration and loading errors
//! are rendered with `miette`; a run with any failing case exits with status 1.

use clap::Parser;
use env_logger::Env;
use log::info;
use miette::Report;
use std::path::Path;
use std::process;

use crate::cli::args::{Command, VeritasArgs};
use crate::config::RunConfig;
use crate::contract::build_default_contracts;
use crate::errors::VeritasError;
use crate::loader::{self, DescriptorSet};
use crate::registry::{build_default_registry, FunctionRegistry};
use crate::report;
use crate::suite::{Suite, SuiteResult};

pub mod args;

/// The main entry point for the CLI.
pub fn run() {
    let args = VeritasArgs::parse();
    let default_filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    let registry = build_default_registry();
    let result = match args.command {
        Command::Run {
            path,
            seed,
            iterations,
            fail_fast,
            filter,
            no_color,
            json,
        } => {
            let mut config = RunConfig::new()
                .with_default_iterations(iterations)
                .with_fail_fast(fail_fast);
            if let Some(seed) = seed {
                config = config.with_seed(seed);
            }
            if let Some(filter) = filter {
                config = config.with_filter(filter);
            }
            if no_color {
                config = config.with_colors(false);
            }
            handle_run(&path, &config, json, registry)
        }
        Command::Check { path } => handle_check(&path, registry),
        Command::Functions => {
            for name in registry.list() {
                println!("{name}");
            }
            Ok(true)
        }
        Command::Contracts => {
            let contracts = build_default_contracts();
            for name in contracts.list() {
                let rules = contracts.get(&name).map_or(0, |c| c.rules().len());
                println!("{name} ({rules} rule(s))");
            }
            Ok(true)
        }
    };

    match result {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(error) => {
            print_error(error);
            process::exit(1);
        }
    }
}

pub fn print_error(error: VeritasError) {
    let report = Report::new(error);
    eprintln!("{report:?}");
}

fn build_suite(set: &DescriptorSet, registry: &FunctionRegistry) -> Result<Suite, VeritasError> {
    let mut suite = Suite::new(set.name.as_str(), registry.clone());
    suite.add_all(&set.cases)?;
    Ok(suite)
}

/// Returns `Ok(false)` when any case failed.
fn handle_run(
    path: &Path,
    config: &RunConfig,
    json: bool,
    registry: FunctionRegistry,
) -> Result<bool, VeritasError> {
    let sets = loader::load_path(path)?;
    let suites = sets
        .iter()
        .map(|set| build_suite(set, &registry))
        .collect::<Result<Vec<_>, _>>()?;

    let mut all_results = Vec::with_capacity(suites.len());
    for suite in &suites {
        let mut results = SuiteResult::new();
        suite.run(config, &mut results);
        if !json {
            report::print_report(&results, config.use_colors).map_err(VeritasError::Output)?;
        }
        all_results.push(results);
    }

    if json {
        let rendered = report::render_json(&all_results).map_err(VeritasError::Render)?;
        println!("{rendered}");
    }
    Ok(!all_results.iter().any(SuiteResult::has_failures))
}

/// Registers every descriptor and reports each configuration error found.
fn handle_check(path: &Path, registry: FunctionRegistry) -> Result<bool, VeritasError> {
    let sets = loader::load_path(path)?;
    let mut ok = true;
    for set in &sets {
        let mut suite = Suite::new(set.name.as_str(), registry.clone());
        let mut errors = 0;
        for descriptor in &set.cases {
            if let Err(error) = suite.add(descriptor) {
                errors += 1;
                print_error(error.into());
            }
        }
        info!("checked {}", set.path.display());
        if errors == 0 {
            println!("{}: {} case(s) ok", set.path.display(), suite.len());
        } else {
            ok = false;
            println!(
                "{}: {} case(s) ok, {} invalid",
                set.path.display(),
                suite.len(),
                errors
            );
        }
    }
    Ok(ok)
}
