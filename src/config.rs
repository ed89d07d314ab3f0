// src/config.rs
use anyhow::{Context, Result};
use log::warn;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Output file prefix when none is configured
pub const DEFAULT_PREFIX: &str = "gotemplate";

pub const CONFIG_FILE: &str = "gotemplate.toml";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct GotemplateToml {
    #[serde(default)]
    output: OutputTable,
    #[serde(default)]
    resolve: ResolveTable,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct OutputTable {
    #[serde(default)]
    prefix: Option<String>,
    #[serde(default)]
    package: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ResolveTable {
    #[serde(default)]
    roots: Vec<String>,
}

/// Settings for one working directory
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding `gotemplate.toml` (the working directory)
    pub root: PathBuf,
    /// Output file prefix: `<prefix>_<Instance>.go`
    pub prefix: String,
    /// Forced output package name
    pub package: Option<String>,
    /// Extra module directories (absolute, or joined onto `root`)
    pub module_dirs: Vec<PathBuf>,
}

impl Config {
    pub fn defaults(root: &Path) -> Self {
        Config {
            root: root.to_path_buf(),
            prefix: DEFAULT_PREFIX.to_string(),
            package: None,
            module_dirs: Vec::new(),
        }
    }

    /// Module search roots: the working directory first, then `[resolve].roots`
    /// in the order they were listed.
    pub fn search_roots(&self) -> Vec<PathBuf> {
        let mut v = Vec::with_capacity(1 + self.module_dirs.len());
        v.push(self.root.clone());
        v.extend(self.module_dirs.iter().cloned());
        v
    }
}

pub fn load_from_cwd() -> Result<Config> {
    let root = std::env::current_dir().context("current_dir() failed")?;
    load_from_dir(&root)
}

/// Read `<root>/gotemplate.toml` if there is one. A file that does not parse
/// is reported and ignored.
pub fn load_from_dir(root: &Path) -> Result<Config> {
    let path = root.join(CONFIG_FILE);
    let mut cfg = Config::defaults(root);
    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(cfg),
        Err(e) => return Err(e).with_context(|| format!("read `{}` failed", path.display())),
    };

    let parsed = match toml::from_str::<GotemplateToml>(&text) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("ignoring `{}`: {e}", path.display());
            return Ok(cfg);
        }
    };

    if let Some(prefix) = parsed.output.prefix.filter(|p| !p.trim().is_empty()) {
        cfg.prefix = prefix.trim().to_string();
    }
    cfg.package = parsed
        .output
        .package
        .filter(|p| !p.trim().is_empty())
        .map(|p| sanitize_pkg_name(p.trim()));
    cfg.module_dirs = parsed.resolve.roots.into_iter().map(|r| root.join(r)).collect();
    Ok(cfg)
}

/// Make `s` usable as a Go package name: letters, digits and `_` only, not
/// starting with a digit.
pub fn sanitize_pkg_name(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 1);
    let mut chars = s.chars();
    if let Some(c0) = chars.next() {
        if c0.is_alphabetic() || c0 == '_' {
            out.push(c0);
        } else {
            out.push('p');
            if c0.is_alphanumeric() {
                out.push(c0);
            }
        }
    } else {
        out.push('p');
    }
    for ch in chars {
        if ch.is_alphanumeric() || ch == '_' {
            out.push(ch);
        } else {
            out.push('_');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_from_dir(dir.path()).unwrap();
        assert_eq!(cfg.prefix, DEFAULT_PREFIX);
        assert!(cfg.package.is_none());
        assert_eq!(cfg.search_roots(), vec![dir.path().to_path_buf()]);
    }

    #[test]
    fn reads_output_and_resolve_tables() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            "[output]\nprefix = \"gen\"\npackage = \"my-pkg\"\n\n[resolve]\nroots = [\"third_party\", \"vendor\"]\n",
        )
        .unwrap();
        let cfg = load_from_dir(dir.path()).unwrap();
        assert_eq!(cfg.prefix, "gen");
        assert_eq!(cfg.package.as_deref(), Some("my_pkg"));
        assert_eq!(
            cfg.search_roots(),
            vec![dir.path().to_path_buf(), dir.path().join("third_party"), dir.path().join("vendor")]
        );
    }

    #[test]
    fn broken_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "[output\nprefix = 3").unwrap();
        let cfg = load_from_dir(dir.path()).unwrap();
        assert_eq!(cfg.prefix, DEFAULT_PREFIX);
    }

    #[test]
    fn package_names_are_sanitized() {
        assert_eq!(sanitize_pkg_name("set"), "set");
        assert_eq!(sanitize_pkg_name("2d-tree"), "p2d_tree");
        assert_eq!(sanitize_pkg_name(""), "p");
    }
}
