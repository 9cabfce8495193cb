//! Command line compiler for line-length programs.

mod cli;
mod driver;
mod scratch;
mod telemetry;
mod toolchain;

use clap::{CommandFactory, Parser};
use cli::{Args, EarlyRequest};
use len_core::{BuildInfo, Error};
use std::path::Path;
use std::process::ExitCode;
use tracing::debug;

fn main() -> ExitCode {
    telemetry::init_logging();

    let name = program_name();

    match cli::early_request(std::env::args_os()) {
        Some(EarlyRequest::Help) => {
            let _ = Args::command().print_help();
            return ExitCode::SUCCESS;
        }
        Some(EarlyRequest::Version) => {
            print_version(&name);
            return ExitCode::SUCCESS;
        }
        None => {}
    }

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            // --help is printed through the error path but is not a failure
            let failed = e.use_stderr();
            let _ = e.print();
            return if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS };
        }
    };

    if args.version {
        print_version(&name);
        return ExitCode::SUCCESS;
    }

    debug!(?args, "Starting");

    match driver::run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&name, &e);
            ExitCode::FAILURE
        }
    }
}

/// Executable name without directory or extension
fn program_name() -> String {
    std::env::args_os()
        .next()
        .and_then(|arg0| {
            Path::new(&arg0)
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "lenc".to_string())
}

fn print_version(name: &str) {
    println!("{}", BuildInfo::current().version_line(name));
    println!();
}

fn report(name: &str, error: &anyhow::Error) {
    match error.downcast_ref::<Error>() {
        Some(Error::Input(message)) => {
            eprintln!("{}: fatal error: {}", name, message);
            eprintln!("compilation terminated.");
        }
        _ => eprintln!("{}: error: {:#}", name, error),
    }
}
