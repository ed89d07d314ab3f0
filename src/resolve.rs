//! Finding the one source unit behind a template module reference.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::TemplateError;
use crate::frontend::parse_package_clause;
use crate::utils::fast::{fast_map, FastMap};

/// One template source: where it came from and its text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceUnit {
    pub path: PathBuf,
    pub text: String,
}

impl SourceUnit {
    /// Name used in logs and diagnostics
    pub fn display_name(&self) -> String {
        self.path.display().to_string()
    }
}

pub trait ModuleResolver {
    /// Return the single source unit of `module`.
    fn resolve(&self, module: &str) -> Result<SourceUnit, TemplateError>;
}

/// Looks modules up as directories on disk.
#[derive(Clone, Debug, Default)]
pub struct DirResolver {
    roots: Vec<PathBuf>,
    gopath: Vec<PathBuf>,
}

impl DirResolver {
    /// `roots` are tried in order; `$GOPATH/src` entries come after them.
    pub fn new(roots: Vec<PathBuf>) -> Self {
        let gopath = env::var_os("GOPATH")
            .map(|v| env::split_paths(&v).map(|p| p.join("src")).collect())
            .unwrap_or_default();
        DirResolver { roots, gopath }
    }

    /// Same as `new` but ignoring `$GOPATH`.
    pub fn with_roots(roots: Vec<PathBuf>) -> Self {
        DirResolver { roots, gopath: Vec::new() }
    }

    fn candidates(&self, module: &str) -> Vec<PathBuf> {
        let mut out = vec![PathBuf::from(module)];
        out.extend(self.roots.iter().map(|r| r.join(module)));
        out.extend(self.gopath.iter().map(|g| g.join(module)));
        out
    }

    pub fn find_dir(&self, module: &str) -> Result<PathBuf, TemplateError> {
        let candidates = self.candidates(module);
        if let Some(dir) = candidates.iter().find(|c| c.is_dir()) {
            debug!("module {module} -> {}", dir.display());
            return Ok(dir.clone());
        }
        let searched: Vec<String> = candidates.iter().map(|c| c.display().to_string()).collect();
        Err(TemplateError::Resolution(format!(
            "cannot find package '{module}' (searched {})",
            searched.join(", ")
        )))
    }
}

impl ModuleResolver for DirResolver {
    fn resolve(&self, module: &str) -> Result<SourceUnit, TemplateError> {
        let dir = self.find_dir(module)?;
        let files = go_files(&dir)?;
        debug!("go files in {}: {files:?}", dir.display());
        let path = match files.as_slice() {
            [] => {
                return Err(TemplateError::Resolution(format!("no go files found for package '{module}'")));
            }
            [one] => one.clone(),
            _ => {
                return Err(TemplateError::Resolution(format!(
                    "found more than one go file in '{}' - can only cope with 1",
                    dir.display()
                )));
            }
        };
        let text = fs::read_to_string(&path).map_err(|e| TemplateError::io(&path, e))?;
        Ok(SourceUnit { path, text })
    }
}

/// Non-test `.go` files directly inside `dir`, sorted by name.
pub fn go_files(dir: &Path) -> Result<Vec<PathBuf>, TemplateError> {
    let entries = fs::read_dir(dir).map_err(|e| TemplateError::io(dir, e))?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| TemplateError::io(dir, e))?;
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else { continue };
        if name.ends_with(".go") && !name.ends_with("_test.go") && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Package name of the Go files in `dir`, read from the first of them.
pub fn package_name_of_dir(dir: &Path) -> Result<String, TemplateError> {
    let files = go_files(dir)?;
    let Some(first) = files.first() else {
        return Err(TemplateError::Resolution(format!(
            "no go files in '{}' to take the package name from",
            dir.display()
        )));
    };
    let text = fs::read_to_string(first).map_err(|e| TemplateError::io(first, e))?;
    parse_package_clause(&text).map_err(|source| TemplateError::Parse { file: first.display().to_string(), source })
}

/// Serves units from memory; used by tests and embedders.
#[derive(Debug, Default)]
pub struct MemoryResolver {
    units: FastMap<String, SourceUnit>,
}

impl MemoryResolver {
    pub fn new() -> Self {
        MemoryResolver { units: fast_map() }
    }

    pub fn insert(&mut self, module: impl Into<String>, path: impl Into<PathBuf>, text: impl Into<String>) {
        self.units.insert(module.into(), SourceUnit { path: path.into(), text: text.into() });
    }
}

impl ModuleResolver for MemoryResolver {
    fn resolve(&self, module: &str) -> Result<SourceUnit, TemplateError> {
        self.units
            .get(module)
            .cloned()
            .ok_or_else(|| TemplateError::Resolution(format!("cannot find package '{module}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_single_go_file_under_a_root() {
        let dir = tempfile::tempdir().unwrap();
        let set = dir.path().join("set");
        fs::create_dir(&set).unwrap();
        fs::write(set.join("set.go"), "package set\n").unwrap();
        fs::write(set.join("set_test.go"), "package set\n").unwrap();
        fs::write(set.join("README"), "x").unwrap();

        let r = DirResolver::with_roots(vec![dir.path().to_path_buf()]);
        let unit = r.resolve("set").unwrap();
        assert_eq!(unit.path, set.join("set.go"));
        assert_eq!(unit.text, "package set\n");
    }

    #[test]
    fn zero_or_many_files_is_a_resolution_error() {
        let dir = tempfile::tempdir().unwrap();
        let r = DirResolver::with_roots(vec![dir.path().to_path_buf()]);

        fs::create_dir(dir.path().join("empty")).unwrap();
        let err = r.resolve("empty").unwrap_err();
        assert!(matches!(err, TemplateError::Resolution(_)), "{err}");

        let two = dir.path().join("two");
        fs::create_dir(&two).unwrap();
        fs::write(two.join("a.go"), "package two\n").unwrap();
        fs::write(two.join("b.go"), "package two\n").unwrap();
        let err = r.resolve("two").unwrap_err();
        assert!(err.to_string().contains("more than one"), "{err}");

        let err = r.resolve("missing").unwrap_err();
        assert_eq!(err.code(), "GT0004");
    }

    #[test]
    fn package_name_comes_from_first_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.go"), "package second\n").unwrap();
        fs::write(dir.path().join("a.go"), "// Copyright\n\npackage first\n\nfunc main() {}\n").unwrap();
        assert_eq!(package_name_of_dir(dir.path()).unwrap(), "first");

        let empty = tempfile::tempdir().unwrap();
        assert!(matches!(package_name_of_dir(empty.path()), Err(TemplateError::Resolution(_))));
    }

    #[test]
    fn memory_resolver_serves_registered_units() {
        let mut r = MemoryResolver::new();
        r.insert("github.com/x/set", "set.go", "package set\n");
        assert_eq!(r.resolve("github.com/x/set").unwrap().display_name(), "set.go");
        assert!(r.resolve("other").is_err());
    }
}
