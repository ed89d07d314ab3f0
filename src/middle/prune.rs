//! Removing stub declarations and recording every top-level name.

use log::debug;

use crate::frontend::tree::*;
use crate::middle::definition::TemplateDefinition;
use crate::utils::fast::{fast_set, FastSet};

/// Top-level names in the order they were first seen.
#[derive(Clone, Debug)]
pub struct DeclaredNameRegistry {
    names: Vec<String>,
    seen: FastSet<String>,
}

impl Default for DeclaredNameRegistry {
    fn default() -> Self {
        DeclaredNameRegistry { names: Vec::new(), seen: fast_set() }
    }
}

impl DeclaredNameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `name`; returns false if it was already there.
    pub fn insert(&mut self, name: &str) -> bool {
        if self.seen.contains(name) {
            return false;
        }
        self.seen.insert(name.to_string());
        self.names.push(name.to_string());
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.seen.contains(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Drop the declarations that stand in for formal parameters and return
/// every top-level name found, removed or kept.
pub fn prune(tree: &mut SyntaxTree, def: &TemplateDefinition) -> DeclaredNameRegistry {
    let mut registry = DeclaredNameRegistry::new();
    let Some(decls) = tree.decls_mut() else { return registry };

    decls.retain_mut(|decl| {
        let Some(agg) = decl.as_agg_mut() else { return true };
        match agg.kind {
            Kind::Import => true,
            Kind::GenDecl { keyword: DeclKeyword::Type, .. } => prune_types(agg, def, &mut registry),
            Kind::GenDecl { .. } => prune_values(agg, def, &mut registry),
            Kind::FuncDecl => keep_func(agg, def, &mut registry),
            other => {
                debug!("unexpected top-level {other:?}, kept");
                true
            }
        }
    });

    tree.link_scopes();
    registry
}

/// Returns whether any type spec is left.
fn prune_types(decl: &mut Aggregate, def: &TemplateDefinition, registry: &mut DeclaredNameRegistry) -> bool {
    let Some(specs) = decl.field_mut("specs").and_then(Node::as_seq_mut) else { return true };
    specs.retain(|spec| {
        let Some(name) = spec.as_agg().and_then(Aggregate::name) else { return true };
        debug!("type {name}");
        registry.insert(name);
        !def.is_param(name)
    });
    has_specs(specs)
}

/// Returns whether any value spec is left.
fn prune_values(decl: &mut Aggregate, def: &TemplateDefinition, registry: &mut DeclaredNameRegistry) -> bool {
    let Some(specs) = decl.field_mut("specs").and_then(Node::as_seq_mut) else { return true };
    specs.retain_mut(|spec| {
        let Some(spec) = spec.as_agg_mut() else { return true };
        remove_bindings(spec, def, registry)
    });
    has_specs(specs)
}

/// Remove `name = value` pairs bound to formal parameters from one spec.
/// Values are dropped positionally only when there is one per name.
fn remove_bindings(spec: &mut Aggregate, def: &TemplateDefinition, registry: &mut DeclaredNameRegistry) -> bool {
    let names: Vec<String> = spec
        .field("names")
        .and_then(Node::as_seq)
        .map(|ns| ns.iter().filter_map(Node::as_ident).map(|id| id.name.clone()).collect())
        .unwrap_or_default();
    let drop: Vec<bool> = names
        .iter()
        .map(|name| {
            debug!("var or const {name}");
            registry.insert(name);
            def.is_param(name)
        })
        .collect();
    if !drop.contains(&true) {
        return true;
    }

    if let Some(values) = spec.field_mut("values").and_then(Node::as_seq_mut) {
        if values.len() == drop.len() {
            let mut flags = drop.iter();
            values.retain(|_| !flags.next().copied().unwrap_or(false));
        }
    }
    if let Some(ns) = spec.field_mut("names").and_then(Node::as_seq_mut) {
        let mut flags = drop.iter();
        ns.retain(|_| !flags.next().copied().unwrap_or(false));
        return !ns.is_empty();
    }
    false
}

fn keep_func(func: &Aggregate, def: &TemplateDefinition, registry: &mut DeclaredNameRegistry) -> bool {
    let is_method = func.field("recv").is_some_and(|r| !r.is_empty());
    if is_method {
        return true;
    }
    let Some(name) = func.name() else { return true };
    debug!("func {name}");
    registry.insert(name);
    !def.is_param(name)
}

fn has_specs(specs: &[Node]) -> bool {
    specs.iter().any(|s| s.as_agg().is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::{parse_file, print_file};
    use crate::middle::definition::locate;

    fn run(src: &str) -> (String, Vec<String>) {
        let mut tree = parse_file(src).expect("parse");
        let def = locate(&tree, "t.go").expect("definition");
        let reg = prune(&mut tree, &def);
        (print_file(&tree), reg.iter().map(str::to_string).collect())
    }

    #[test]
    fn grouped_values_keep_unrelated_bindings_in_order() {
        let (out, names) = run(
            "package p\n// template type T(A, B)\nconst (\n\tx = 1\n\tA = 2\n\ty = 3\n\tB = 4\n\tz = 5\n)\n\nvar A, q = 1, 2\n",
        );
        assert_eq!(out, "package p\n// template type T(A, B)\nconst (\n\tx = 1\n\ty = 3\n\tz = 5\n)\n\nvar q = 2\n");
        assert_eq!(names, ["x", "A", "y", "B", "z", "q"]);
    }

    #[test]
    fn emptied_declarations_disappear() {
        let (out, names) = run("package p\n\n// template type T(A)\ntype A int\n\nvar (\n\tA = 3\n)\n\nfunc T() {}\n");
        assert_eq!(out, "package p\n\n// template type T(A)\n\nfunc T() {}\n");
        assert_eq!(names, ["A", "T"]);
    }

    #[test]
    fn free_functions_named_by_params_are_removed() {
        let (out, names) = run(
            "package sort\n// template type Sort(A, Less)\ntype A int\nfunc Less(a A, b A) bool {\n\treturn a < b\n}\nfunc Sort(data []A) {}\n",
        );
        assert!(!out.contains("func Less"), "{out}");
        assert!(out.contains("func Sort(data []A) {}"));
        assert_eq!(names, ["A", "Less", "Sort"]);
    }

    #[test]
    fn methods_are_kept_and_not_registered() {
        let (out, names) = run(
            "package p\n// template type Set(A)\ntype Set struct{}\nfunc (s *Set) A() {}\nfunc (s *Set) Len() int {\n\treturn 0\n}\n",
        );
        assert!(out.contains("func (s *Set) A() {}"));
        assert!(out.contains("func (s *Set) Len() int {"));
        assert_eq!(names, ["Set"]);
    }

    #[test]
    fn imports_are_untouched() {
        let (out, names) = run("package p\n\nimport \"fmt\"\n\n// template type T(A)\ntype A int\ntype T []A\n");
        assert!(out.contains("import \"fmt\""));
        assert_eq!(names, ["A", "T"]);
    }

    #[test]
    fn names_are_registered_once() {
        let mut reg = DeclaredNameRegistry::new();
        assert!(reg.insert("a"));
        assert!(reg.insert("b"));
        assert!(!reg.insert("a"));
        assert_eq!(reg.len(), 2);
        assert!(reg.contains("b"));
        assert_eq!(reg.iter().collect::<Vec<_>>(), ["a", "b"]);
    }

    #[test]
    fn scopes_are_relinked_after_pruning() {
        let mut tree = parse_file("package p\n// template type T(A)\ntype A int\ntype T []A\n").expect("parse");
        let def = locate(&tree, "t.go").expect("definition");
        prune(&mut tree, &def);
        for (i, decl) in tree.decls().iter().enumerate() {
            let Some(agg) = decl.as_agg() else { continue };
            let specs = agg.field("specs").and_then(Node::as_seq).expect("specs");
            for spec in specs.iter().filter_map(Node::as_agg) {
                assert!(matches!(spec.field("scope"), Some(Node::Ref(Some(NodeRef::Decl(j)))) if *j == i));
            }
        }
    }
}
