// src/cli/mod.rs

pub mod args;
pub mod colors;
pub mod output;

pub use args::CliArgs;
pub use colors::ColorSupport;
pub use output::OutputFormatter;
