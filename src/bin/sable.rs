#![allow(clippy::print_stderr)]

use anyhow::{Context, Result};
use clap::Parser;
use std::io::IsTerminal;

use sable::cli::args::{CliArgs, OutputFormat};
use sable::cli::driver::{self, CheckRun};
use sable::cli::reporter::Reporter;

const EXIT_SUCCESS: i32 = 0;
/// At least one diagnostic was reported as an error.
const EXIT_DIAGNOSTICS: i32 = 1;
/// Configuration, fixture or usage error.
const EXIT_INVALID_INPUT: i32 = 2;

fn main() {
    sable::tracing_config::init_tracing();

    let args = CliArgs::parse();
    let code = match run(&args) {
        Ok(run) if run.has_errors() => EXIT_DIAGNOSTICS,
        Ok(_) => EXIT_SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            EXIT_INVALID_INPUT
        }
    };
    std::process::exit(code);
}

fn run(args: &CliArgs) -> Result<CheckRun> {
    let cwd = std::env::current_dir().context("failed to resolve current directory")?;
    let run = driver::run(args, &cwd)?;

    match args.format {
        OutputFormat::Json => {
            let diagnostics: Vec<_> = run.diagnostics().collect();
            let json = serde_json::to_string_pretty(&diagnostics)
                .context("failed to serialize diagnostics")?;
            println!("{json}");
        }
        OutputFormat::Pretty => {
            let color = !args.no_color && std::io::stdout().is_terminal();
            let mut reporter = Reporter::new(color);
            for file in &run.files {
                if let Some(source) = &file.source {
                    reporter.add_source(&file.file_name, source);
                }
            }
            let diagnostics: Vec<_> = run.diagnostics().cloned().collect();
            if !diagnostics.is_empty() {
                println!("{}\n", reporter.render(&diagnostics));
            }
            if args.print_bindings {
                for file in &run.files {
                    for (name, ty) in &file.bindings {
                        println!("{}: {name}: {ty}", file.file_name);
                    }
                }
            }
            println!("{}", reporter.format_summary(&diagnostics, run.files.len()));
        }
    }
    Ok(run)
}
