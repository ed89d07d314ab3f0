// src/cli/args.rs
use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;

/// Instantiate a Go template package for concrete types.
#[derive(Parser, Debug, Clone)]
#[clap(name = "gotemplate", version, about, long_about = None)]
pub struct CliArgs {
    /// Log every step (debug level)
    #[clap(short, long)]
    pub verbose: bool,

    /// Only report warnings and errors
    #[clap(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Directory the instance is written to [default: current directory]
    #[clap(short = 'o', long = "out-dir", value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Package name of the generated file [default: package of the output directory]
    #[clap(long, value_name = "NAME")]
    pub package: Option<String>,

    /// Output file prefix [default: gotemplate]
    #[clap(long, value_name = "PREFIX")]
    pub prefix: Option<String>,

    /// Template package: a directory, or a path below a search root or $GOPATH/src
    #[clap(value_name = "PACKAGE")]
    pub module: String,

    /// Instance name and arguments, e.g. 'MySet(int)'
    #[clap(value_name = "NAME(ARGS)")]
    pub instance: String,
}

impl CliArgs {
    pub fn log_level(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::Debug
        } else if self.quiet {
            LevelFilter::Warn
        } else {
            LevelFilter::Info
        }
    }
}
