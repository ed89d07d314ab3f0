// src/main.rs
use std::process;

use anyhow::{Context, Result};
use clap::Parser;

use gotemplate::cli::{CliArgs, OutputFormatter};
use gotemplate::config;
use gotemplate::diag::{render_diagnostics_colored, DiagSink, SourceMap};
use gotemplate::instantiate::{instantiate, Options, Request};
use gotemplate::resolve::{package_name_of_dir, DirResolver};

fn main() {
    let args = CliArgs::parse();
    env_logger::Builder::new()
        .filter_level(args.log_level())
        .parse_default_env()
        .format_timestamp(None)
        .format_target(false)
        .init();

    let out = OutputFormatter::new();
    match run(&args, &out) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            out.error(&format!("error: {e:#}"));
            process::exit(1);
        }
    }
}

/// Returns `Ok(false)` when the run failed; diagnostics are printed either way.
fn run(args: &CliArgs, out: &OutputFormatter) -> Result<bool> {
    let cfg = config::load_from_cwd()?;
    let out_dir = args.out_dir.clone().unwrap_or_else(|| cfg.root.clone());
    let out_dir = if out_dir.is_absolute() { out_dir } else { cfg.root.join(out_dir) };

    let mut sm = SourceMap::new();
    let mut diags = DiagSink::new();

    let package = match args.package.clone().or_else(|| cfg.package.clone()) {
        Some(p) => config::sanitize_pkg_name(&p),
        None => match package_name_of_dir(&out_dir) {
            Ok(p) => p,
            Err(e) => {
                diags.record(&out_dir.display().to_string(), &e);
                render_diagnostics_colored(&diags, &sm, out.colored());
                return Ok(false);
            }
        },
    };

    let req = match Request::from_call(&args.module, &args.instance, package) {
        Ok(req) => req,
        Err(e) => {
            diags.record("<command line>", &e);
            render_diagnostics_colored(&diags, &sm, out.colored());
            return Ok(false);
        }
    };

    let opts = Options {
        out_dir: out_dir.clone(),
        prefix: args.prefix.clone().unwrap_or_else(|| cfg.prefix.clone()),
    };
    let resolver = DirResolver::new(cfg.search_roots());

    let result = instantiate(&req, &resolver, &opts, &mut sm, &mut diags);
    if !diags.is_empty() {
        render_diagnostics_colored(&diags, &sm, out.colored());
    }
    let Ok(outcome) = result else { return Ok(false) };

    let bytes = std::fs::metadata(&outcome.path)
        .with_context(|| format!("stat `{}` failed", outcome.path.display()))?
        .len();
    if !args.quiet {
        out.success(&req.instance, &outcome.path, bytes);
    }
    Ok(!diags.has_errors())
}
