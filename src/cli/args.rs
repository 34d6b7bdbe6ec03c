use clap::{Parser, ValueEnum};
use sable_checker::{LanguageMode, StrictConcurrency};
use std::path::PathBuf;

/// CLI arguments for the sable binary.
#[derive(Parser, Debug)]
#[command(
    name = "sable",
    version,
    about = "Sendable checking for key-path literals and values"
)]
pub struct CliArgs {
    /// Fixture files, or directories to search for `*.json` fixtures.
    pub inputs: Vec<PathBuf>,

    /// Path to sable.json or a directory containing it.
    #[arg(short = 'p', long = "project")]
    pub project: Option<PathBuf>,

    /// How aggressively concurrency diagnostics are reported.
    #[arg(
        long = "strictConcurrency",
        alias = "strict-concurrency",
        value_enum,
        ignore_case = true
    )]
    pub strict_concurrency: Option<StrictConcurrencyArg>,

    /// Language mode; Swift 6 reports Sendable violations as errors.
    #[arg(long = "languageMode", alias = "language-mode", value_enum)]
    pub language_mode: Option<LanguageModeArg>,

    /// Infer `& Sendable` for key-path literals whose captures all conform.
    #[arg(
        long = "inferSendableFromCaptures",
        alias = "infer-sendable-from-captures"
    )]
    pub infer_sendable_from_captures: Option<bool>,

    /// Diagnostic output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
    pub format: OutputFormat,

    /// Print the inferred type of every key-path binding.
    #[arg(long = "printBindings", alias = "print-bindings")]
    pub print_bindings: bool,

    /// Disable colored output.
    #[arg(long = "noColor", alias = "no-color")]
    pub no_color: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrictConcurrencyArg {
    Minimal,
    Targeted,
    Complete,
}

impl From<StrictConcurrencyArg> for StrictConcurrency {
    fn from(value: StrictConcurrencyArg) -> Self {
        match value {
            StrictConcurrencyArg::Minimal => Self::Minimal,
            StrictConcurrencyArg::Targeted => Self::Targeted,
            StrictConcurrencyArg::Complete => Self::Complete,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LanguageModeArg {
    #[value(name = "5", alias = "swift5")]
    Swift5,
    #[value(name = "6", alias = "swift6")]
    Swift6,
}

impl From<LanguageModeArg> for LanguageMode {
    fn from(value: LanguageModeArg) -> Self {
        match value {
            LanguageModeArg::Swift5 => Self::Swift5,
            LanguageModeArg::Swift6 => Self::Swift6,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Pretty,
    Json,
}
