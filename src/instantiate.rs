//! One instantiation run, from module reference to written file.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::config::DEFAULT_PREFIX;
use crate::diag::{DiagSink, SourceMap};
use crate::error::TemplateError;
use crate::frontend::tree::{Node, SyntaxTree};
use crate::frontend::{format_source, parse_expr, parse_file, print_file, print_node};
use crate::middle::{locate, parse_template_and_args, prune, Mangler, SubstitutionMapping};
use crate::resolve::{ModuleResolver, SourceUnit};

/// What to instantiate and where the result belongs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Request {
    /// Template module reference, e.g. `github.com/ncw/gotemplate/set`
    pub module: String,
    /// Name of the instance, e.g. `MySet`
    pub instance: String,
    /// Actual arguments as source text, one per formal parameter
    pub args: Vec<String>,
    /// Package name of the generated file
    pub package: String,
}

impl Request {
    /// Build a request from the textual form `Instance(arg, ...)`.
    pub fn from_call(module: impl Into<String>, call: &str, package: impl Into<String>) -> Result<Self, TemplateError> {
        let (instance, args) = parse_template_and_args(call, None)?;
        Ok(Request {
            module: module.into(),
            instance,
            args: args.iter().map(print_node).collect(),
            package: package.into(),
        })
    }
}

#[derive(Clone, Debug)]
pub struct Options {
    pub out_dir: PathBuf,
    /// Output file prefix: `<prefix>_<Instance>.go`
    pub prefix: String,
}

impl Default for Options {
    fn default() -> Self {
        Options { out_dir: PathBuf::from("."), prefix: DEFAULT_PREFIX.to_string() }
    }
}

/// A finished run
#[derive(Clone, Debug)]
pub struct Outcome {
    pub path: PathBuf,
    pub source: String,
}

/// Output file name for `instance`.
pub fn output_file_name(prefix: &str, instance: &str) -> String {
    format!("{prefix}_{instance}.go")
}

/// Resolve, expand and write one instance. Failures are also recorded in
/// `diags`; the template text is added to `sm` so reports can quote it.
pub fn instantiate(
    req: &Request,
    resolver: &dyn ModuleResolver,
    opts: &Options,
    sm: &mut SourceMap,
    diags: &mut DiagSink,
) -> Result<Outcome, TemplateError> {
    info!(
        "Substituting {:?} with {}({}) into package {}",
        req.module,
        req.instance,
        req.args.join(","),
        req.package
    );

    let unit = match resolver.resolve(&req.module) {
        Ok(unit) => unit,
        Err(e) => {
            diags.record(&req.module, &e);
            return Err(e);
        }
    };
    let file = unit.display_name();
    sm.add_file(file.clone(), unit.text.clone());

    let result = expand(req, &unit).and_then(|source| {
        let path = opts.out_dir.join(output_file_name(&opts.prefix, &req.instance));
        if path.exists() {
            diags.warn("GT0005", &file, None, format!("overwriting '{}'", path.display()));
        }
        write_output(&path, &source)?;
        info!("Written '{}'", path.display());
        Ok(Outcome { path, source })
    });
    if let Err(e) = &result {
        diags.record(&file, e);
    }
    result
}

/// Everything between the template text and the generated source.
pub fn expand(req: &Request, unit: &SourceUnit) -> Result<String, TemplateError> {
    let file = unit.display_name();
    debug!("parsing {file}");
    let mut tree = parse_file(&unit.text).map_err(|source| TemplateError::Parse { file: file.clone(), source })?;

    let def = locate(&tree, &file)?;
    def.check_arity(req.args.len())?;

    let registry = prune(&mut tree, &def);
    debug!("declared names: {:?}", registry.iter().collect::<Vec<_>>());

    let args = req
        .args
        .iter()
        .map(|a| parse_expr(a).map_err(|e| TemplateError::shape(format!("cannot parse argument {a:?}: {e}"), None)))
        .collect::<Result<Vec<Node>, _>>()?;

    let mangler = Mangler::new(&def.name, &req.instance);
    let mapping = SubstitutionMapping::build(&def, &args, &registry, &mangler)?;
    let root = mapping.apply(tree.root)?;

    let mut tree = SyntaxTree { root };
    tree.set_package(&req.package);
    normalize(&print_file(&tree))
}

/// Re-read printed output and print it again.
fn normalize(printed: &str) -> Result<String, TemplateError> {
    format_source(printed).map_err(|e| TemplateError::Internal(format!("generated source does not parse: {e}")))
}

fn write_output(path: &Path, source: &str) -> Result<(), TemplateError> {
    let mut fd = File::create(path).map_err(|e| TemplateError::io(path, e))?;
    fd.write_all(source.as_bytes()).map_err(|e| TemplateError::io(path, e))?;
    fd.flush().map_err(|e| TemplateError::io(path, e))
}
